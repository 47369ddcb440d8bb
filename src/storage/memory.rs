//! An in-memory implementation of [Storage].

use std::collections::HashMap;

use crate::{Error, storage::Storage};

/// Stores items in a hash map for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    available: bool,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            available: true,
        }
    }

    /// Create a store that fails every operation, like a browser with
    /// storage disabled.
    pub fn unavailable() -> Self {
        Self {
            items: HashMap::new(),
            available: false,
        }
    }

    fn check_available(&self) -> Result<(), Error> {
        if self.available {
            Ok(())
        } else {
            Err(Error::Storage("storage is disabled".to_owned()))
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        self.check_available()?;
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.check_available()?;
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), Error> {
        self.check_available()?;
        self.items.remove(key);
        Ok(())
    }
}
