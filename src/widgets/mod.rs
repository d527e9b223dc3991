//! Presentation-level controls bound to the table
//!
//! Widgets produce plain view structs for a renderer and turn user events
//! into store mutations. They never talk to the network.

pub mod pagination;
pub mod toolbar;

pub use pagination::{PageChange, PaginationWidget};
pub use toolbar::{FacetOptionView, FacetedFilterView, TextInputView, Toolbar};
