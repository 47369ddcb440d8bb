//! Contains the trait and implementations for the key-value store that plays
//! the role of the browser's local storage.

mod file;
mod memory;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

use crate::Error;

/// The key holding the selected transaction IDs as a JSON array of strings.
pub const SELECTED_TRANSACTIONS_KEY: &str = "selectedTransactions";

/// The key holding whether the filter panel is expanded, `"true"` or `"false"`.
pub const FILTER_VISIBLE_KEY: &str = "filter-visible";

/// A string key-value store that survives page loads.
///
/// Every operation is fallible because storage can be disabled or full.
pub trait Storage {
    /// Get the value stored under `key`, or `None` if nothing is stored.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete `key`. Removing a key that does not exist is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), Error>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), Error> {
        (**self).remove_item(key)
    }
}
