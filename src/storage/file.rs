//! A [Storage] implementation backed by a JSON file on disk.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{Error, storage::Storage};

/// Stores items as a single JSON object in a file.
///
/// The whole file is read once when the store is opened and rewritten after
/// every mutation, so the file always reflects the latest state.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl JsonFileStorage {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store. A file that cannot be read or
    /// does not contain a JSON object of strings is logged and also treated
    /// as empty; it will be overwritten by the next mutation.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let items = load_items(&path);

        Self { path, items }
    }

    /// The file that backs this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), Error> {
        let payload = serde_json::to_vec_pretty(&self.items)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

fn load_items(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!("failed to parse storage file {}: {error}", path.display());
                BTreeMap::new()
            }
        },
        Err(error) if error.kind() == ErrorKind::NotFound => BTreeMap::new(),
        Err(error) => {
            tracing::warn!("failed to read storage file {}: {error}", path.display());
            BTreeMap::new()
        }
    }
}

impl Storage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let previous = self.items.insert(key.to_owned(), value.to_owned());

        if let Err(error) = self.flush() {
            match previous {
                Some(previous) => self.items.insert(key.to_owned(), previous),
                None => self.items.remove(key),
            };
            return Err(error);
        }

        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), Error> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }

        Ok(())
    }
}
