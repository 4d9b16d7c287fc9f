//! Derived views over record collections: search and sort.
//!
//! Neither operation mutates the records; both return borrowed views.

mod search;
mod sort;

pub use search::{Searchable, search};
pub use sort::{SortConfig, SortDirection, SortValue, Sortable, sort_records};
