pub mod error;
pub mod mesh;
pub mod scene;
pub mod weights;

pub use gfx_maths::{Mat4, Vec3, Vec4};
