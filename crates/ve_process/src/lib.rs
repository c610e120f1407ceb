pub mod meta;
pub mod ptype;
pub mod scene_file;
pub mod step;
pub(crate) mod utils;

pub use meta::ProcessMeta;
pub use ptype::{DeterminePrimitiveTypes, SortByPrimitiveType, SortReport};
pub use step::{PostProcessor, ProcessError, ProcessFlags, ProcessStep};
