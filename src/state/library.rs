use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::AppError;
use crate::state::response::{Response, ResponseDocument};
use crate::storage::library as storage;

/// Named, persisted responses with a cursor over their sorted names.
#[derive(Debug, Default)]
pub struct ResponsesList {
    list: HashMap<String, Response>,
    keys: Vec<String>,
    current: usize,
}

impl ResponsesList {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.list.clear();
        self.keys.clear();
        self.current = 0;
    }

    /// Replaces the list with the document at `path`. A missing file is
    /// created and loads as empty.
    pub fn load(&mut self, path: &Path) -> Result<(), AppError> {
        let docs = storage::load(path)?;
        let mut list = HashMap::with_capacity(docs.len());
        for (key, doc) in docs {
            list.insert(key, Response::try_from(doc)?);
        }

        self.reset();
        self.keys = list.keys().cloned().collect();
        self.keys.sort();
        self.list = list;
        tracing::debug!(path = %path.display(), count = self.keys.len(), "responses loaded");
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let docs: BTreeMap<String, ResponseDocument> = self
            .list
            .iter()
            .map(|(key, resp)| (key.clone(), ResponseDocument::from(resp)))
            .collect();
        storage::save(path, docs)?;
        tracing::debug!(path = %path.display(), count = self.keys.len(), "responses saved");
        Ok(())
    }

    /// Moves the cursor forward, wrapping at the end.
    ///
    /// # Panics
    /// Panics on an empty list; check `len()` first.
    pub fn next(&mut self) {
        self.current = (self.current + 1) % self.keys.len();
    }

    /// Moves the cursor back, wrapping at the start.
    ///
    /// # Panics
    /// Panics on an empty list; check `len()` first.
    pub fn prev(&mut self) {
        let len = self.keys.len();
        self.current = (self.current + len - 1) % len;
    }

    pub fn cur(&self) -> Option<&Response> {
        self.keys.get(self.current).and_then(|key| self.list.get(key))
    }

    pub fn cur_key(&self) -> Option<&str> {
        self.keys.get(self.current).map(String::as_str)
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&Response> {
        self.list.get(key)
    }

    /// Inserts or overwrites `key`, keeping the names sorted.
    pub fn add(&mut self, key: impl Into<String>, resp: Response) -> &mut Self {
        let key = key.into();
        if let Err(pos) = self.keys.binary_search(&key) {
            self.keys.insert(pos, key.clone());
        }
        self.list.insert(key, resp);
        self
    }

    /// Removes `key`, reporting whether it was there.
    pub fn del(&mut self, key: &str) -> bool {
        if self.list.remove(key).is_none() {
            return false;
        }
        if let Ok(pos) = self.keys.binary_search_by(|k| k.as_str().cmp(key)) {
            self.keys.remove(pos);
        }
        if self.current >= self.keys.len() {
            self.current = self.keys.len().saturating_sub(1);
        }
        true
    }
}
