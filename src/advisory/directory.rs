//! In-memory country directory.
//!
//! Maps identifiers to detail page URLs. The whole map is swapped on every
//! successful list refresh; entries are never updated or expired one by one.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::models::DirectoryEntry;

type Snapshot = Arc<HashMap<String, DirectoryEntry>>;

/// Identifier-keyed directory shared by the list and detail pipelines.
#[derive(Default)]
pub struct CountryDirectory {
    entries: RwLock<Snapshot>,
}

impl CountryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Snapshot {
        match self.entries.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace every entry at once.
    ///
    /// The first entry wins when identifiers repeat.
    pub fn replace_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = DirectoryEntry>,
    {
        let mut map = HashMap::new();
        for entry in entries {
            map.entry(entry.identifier.clone()).or_insert(entry);
        }
        let fresh = Arc::new(map);

        match self.entries.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }

    /// Find `identifier` as given, then with spaces replaced by underscores.
    pub fn lookup(&self, identifier: &str) -> Option<DirectoryEntry> {
        let snapshot = self.snapshot();
        snapshot
            .get(identifier)
            .or_else(|| snapshot.get(&identifier.replace(' ', "_")))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// All identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.snapshot().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn entry(identifier: &str) -> DirectoryEntry {
        DirectoryEntry {
            identifier: identifier.to_string(),
            url: Url::parse(&format!("https://advice.example.gov/info/{}.aspx", identifier))
                .unwrap(),
        }
    }

    #[test]
    fn test_starts_empty() {
        let directory = CountryDirectory::new();
        assert!(directory.is_empty());
        assert!(directory.lookup("fiji").is_none());
    }

    #[test]
    fn test_lookup_space_underscore() {
        let directory = CountryDirectory::new();
        directory.replace_all(vec![entry("new_zealand")]);

        assert_eq!(directory.lookup("new_zealand"), Some(entry("new_zealand")));
        assert_eq!(directory.lookup("new zealand"), Some(entry("new_zealand")));
        assert!(directory.lookup("New_Zealand").is_none());
    }

    #[test]
    fn test_replace_all_is_total() {
        let directory = CountryDirectory::new();
        directory.replace_all(vec![entry("a"), entry("b")]);
        directory.replace_all(vec![entry("x"), entry("y")]);

        assert!(directory.lookup("a").is_none());
        assert!(directory.lookup("b").is_none());
        assert!(directory.lookup("x").is_some());
        assert!(directory.lookup("y").is_some());
        assert_eq!(directory.identifiers(), vec!["x", "y"]);
    }

    #[test]
    fn test_replace_all_first_duplicate_wins() {
        let directory = CountryDirectory::new();
        let mut second = entry("fiji");
        second.url = Url::parse("https://advice.example.gov/other/fiji.aspx").unwrap();
        directory.replace_all(vec![entry("fiji"), second]);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.lookup("fiji"), Some(entry("fiji")));
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let directory = CountryDirectory::new();
        directory.replace_all(vec![entry("a")]);
        let before = directory.snapshot();
        directory.replace_all(vec![entry("x")]);

        assert!(before.contains_key("a"));
        assert!(!before.contains_key("x"));
        assert!(directory.lookup("x").is_some());
    }
}
