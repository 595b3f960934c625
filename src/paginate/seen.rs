use std::collections::HashSet;

/// Issue keys observed during one run.
#[derive(Debug, Default)]
pub struct SeenSet {
    keys: HashSet<String>,
    duplicates: usize,
}

impl SeenSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`; returns `false` (and counts a duplicate) if already seen.
    pub fn observe(&mut self, key: &str) -> bool {
        if self.keys.contains(key) {
            self.duplicates += 1;
            return false;
        }
        self.keys.insert(key.to_string());
        true
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
