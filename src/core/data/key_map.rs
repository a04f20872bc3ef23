use std::collections::HashMap;

/// Per-run index from candidate text to its assigned key, grouped by file.
///
/// Scoped to one generation pass and used only to drive the source rewriter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    files: HashMap<String, HashMap<String, String>>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_abs: &str, text: &str, key: &str) {
        self.files
            .entry(file_abs.to_string())
            .or_default()
            .insert(text.to_string(), key.to_string());
    }

    pub fn for_file(&self, file_abs: &str) -> Option<&HashMap<String, String>> {
        self.files.get(file_abs)
    }

    pub fn get(&self, file_abs: &str, text: &str) -> Option<&str> {
        self.files
            .get(file_abs)
            .and_then(|texts| texts.get(text))
            .map(String::as_str)
    }

    /// Drop every entry pointing at `key`. Returns how many were dropped.
    pub fn remove_key(&mut self, key: &str) -> usize {
        let mut removed = 0;
        for texts in self.files.values_mut() {
            let before = texts.len();
            texts.retain(|_, k| k != key);
            removed += before - texts.len();
        }
        self.files.retain(|_, texts| !texts.is_empty());
        removed
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map_lookup() {
        let mut map = KeyMap::new();
        map.insert("/p/a.ts", "Save", "A.SAVE");
        map.insert("/p/b.ts", "Save", "B.SAVE");

        assert_eq!(map.get("/p/a.ts", "Save"), Some("A.SAVE"));
        assert_eq!(map.get("/p/b.ts", "Save"), Some("B.SAVE"));
        assert_eq!(map.get("/p/c.ts", "Save"), None);
        assert_eq!(map.file_count(), 2);
    }

    #[test]
    fn test_remove_key() {
        let mut map = KeyMap::new();
        map.insert("/p/a.ts", "Save", "A.SAVE");
        map.insert("/p/a.ts", "Close", "A.CLOSE");
        map.insert("/p/b.ts", "Save", "A.SAVE");

        assert_eq!(map.remove_key("A.SAVE"), 2);
        assert_eq!(map.get("/p/a.ts", "Close"), Some("A.CLOSE"));
        assert_eq!(map.file_count(), 1);
    }
}
