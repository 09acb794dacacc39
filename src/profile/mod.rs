//! Profiling of input data before the pipeline runs.

mod dataset;
mod library_size;

pub use dataset::{profile_dataset, DatasetProfile};
pub use library_size::{profile_library_size, LibrarySizeProfile};
