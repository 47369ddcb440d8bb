//! The set of selected transactions and the manager that keeps it in sync
//! with storage and the page across page loads.

mod manager;
mod set;

pub use manager::{Expansion, SelectionSetManager};
pub use set::SelectionSet;
