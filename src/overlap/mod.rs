//! Stool/blood reconciliation of vOTU presence.
//!
//! For every individual with both samples retained, the taxa present in
//! stool and in blood are intersected; the shared fraction of each
//! compartment is the quantity compared between healthy controls and
//! Crohn's disease. Independently of pairing, the union of taxa seen in any
//! stool sample and in any blood sample gives the overall overlap view.

mod individual;
mod pooled;

pub use individual::{overlap_percent, presence_set, reconcile_individuals, IndividualOverlap};
pub use pooled::{compartment_union, CompartmentUnion, VennCounts};
