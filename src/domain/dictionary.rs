/// Word list loader.
///
/// ## Sources:
///   1. File named by `general.dictionary` in config.toml
///   2. Built-in list (`data/words.txt`, compiled in)
///
/// ## Format:
///   Whitespace-separated words, any case. Tokens that are not purely
///   alphabetic are skipped. Words are uppercased and bucketed by length.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::TermlinkError;

const EMBEDDED_WORDS: &str = include_str!("../../data/words.txt");

/// A bucket must hold a secret plus at least one dud.
const MIN_BUCKET: usize = 2;

#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    buckets: BTreeMap<usize, Vec<String>>,
}

impl Dictionary {
    pub fn parse(text: &str) -> Self {
        let mut buckets: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for token in text.split_whitespace() {
            if !token.chars().all(char::is_alphabetic) {
                continue;
            }
            let word = token.to_uppercase();
            let bucket = buckets.entry(word.chars().count()).or_default();
            if !bucket.contains(&word) {
                bucket.push(word);
            }
        }
        Dictionary { buckets }
    }

    pub fn load(path: &Path) -> Result<Self, TermlinkError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TermlinkError::DictionaryUnavailable(format!("{}: {e}", path.display()))
        })?;
        Ok(Self::parse(&text))
    }

    pub fn embedded() -> Self {
        Self::parse(EMBEDDED_WORDS)
    }

    /// Load the configured file, or the built-in list when none is set.
    pub fn from_config(path: Option<&Path>) -> Result<Self, TermlinkError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::embedded()),
        }
    }

    /// Words of exactly `length` chars. Fails unless there are at least two.
    pub fn bucket(&self, length: usize) -> Result<&[String], TermlinkError> {
        match self.buckets.get(&length) {
            Some(words) if words.len() >= MIN_BUCKET => Ok(words),
            Some(words) => Err(TermlinkError::DictionaryUnavailable(format!(
                "only {} word(s) of length {length}, need {MIN_BUCKET}", words.len(),
            ))),
            None => Err(TermlinkError::DictionaryUnavailable(format!(
                "no words of length {length}",
            ))),
        }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_by_length_and_uppercases() {
        let d = Dictionary::parse("apple beacon\ngarden  planet\tsilver");
        assert_eq!(d.bucket(6).unwrap(), &["BEACON", "GARDEN", "PLANET", "SILVER"]);
        assert_eq!(d.len(), 5);
    }

    #[test]
    fn singleton_bucket_is_unavailable() {
        let d = Dictionary::parse("apple beacon garden");
        assert!(matches!(d.bucket(5), Err(TermlinkError::DictionaryUnavailable(_))));
    }

    #[test]
    fn missing_bucket_is_unavailable() {
        let d = Dictionary::parse("beacon garden");
        assert!(matches!(d.bucket(9), Err(TermlinkError::DictionaryUnavailable(_))));
    }

    #[test]
    fn skips_junk_and_duplicates() {
        let d = Dictionary::parse("garden GARDEN gar-den 123456 planet");
        assert_eq!(d.bucket(6).unwrap(), &["GARDEN", "PLANET"]);
    }

    #[test]
    fn missing_file_fails_fast() {
        let r = Dictionary::load(Path::new("/nonexistent/termlink/words.txt"));
        assert!(matches!(r, Err(TermlinkError::DictionaryUnavailable(_))));
    }

    #[test]
    fn embedded_list_covers_default_length() {
        let d = Dictionary::embedded();
        assert!(d.bucket(6).unwrap().len() > 50);
        assert!(d.bucket(6).unwrap().iter().all(|w| w.chars().count() == 6));
    }
}
