//! Translation of filter structs into SQL.
//!
//! Entities describe their filters as a [`FilterPlan`] of [`Predicate`]s;
//! the plan renders onto sea-query statements for counting and fetching.

pub mod params;
pub mod plan;
pub mod predicate;
pub mod ranges;
pub mod search;

pub use params::{multi_value, split_values};
pub use plan::FilterPlan;
pub use predicate::{Bound, Field, Join, Predicate, SetSemantics, Stage};
pub use ranges::RangeSet;
