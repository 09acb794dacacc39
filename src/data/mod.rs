//! Input tables: abundance matrix, taxonomy and sample metadata.

mod abundance;
mod dataset;
pub mod metadata;
mod sample_id;
mod table;
pub mod taxonomy;

pub use abundance::AbundanceMatrix;
pub use dataset::{Dataset, InputPaths};
pub use metadata::{Disease, SampleMetadata, SampleRecord};
pub use sample_id::{Compartment, SampleId};
pub use taxonomy::{Annotation, TaxonRecord, TaxonomyTable};
