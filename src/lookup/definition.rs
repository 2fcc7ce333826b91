use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::lookup::ResolveMode;

/// Where a definition record came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionSource {
    BuiltIn,
    #[default]
    Dictionary,
    Ai,
    Combined,
}

impl DefinitionSource {
    pub fn label(self) -> &'static str {
        match self {
            DefinitionSource::BuiltIn => "built-in",
            DefinitionSource::Dictionary => "dictionary",
            DefinitionSource::Ai => "ai",
            DefinitionSource::Combined => "dictionary + ai",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    pub definitions: Vec<String>,
}

impl Meaning {
    pub fn new(part_of_speech: &str, definition: &str) -> Self {
        Self {
            part_of_speech: part_of_speech.to_string(),
            definitions: vec![definition.to_string()],
        }
    }

    /// First sense, used for display and fit checks.
    pub fn primary(&self) -> Option<&str> {
        self.definitions.first().map(|s| s.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDefinition {
    pub word: String,
    #[serde(default)]
    pub phonetic: String,
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub source: DefinitionSource,
}

impl WordDefinition {
    pub fn primary_senses(&self) -> impl Iterator<Item = &str> {
        self.meanings.iter().filter_map(Meaning::primary)
    }

    /// Drop meanings with no senses; `None` if nothing usable is left.
    pub fn into_usable(mut self) -> Option<Self> {
        self.meanings.retain(|m| !m.definitions.is_empty());
        if self.meanings.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Word -> definition map shared by the reading view and the drill.
///
/// A `None` value is a cached negative result ("looked up, not found"), which
/// is different from the key being absent ("never looked up").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionCache {
    #[serde(default)]
    entries: HashMap<String, Option<WordDefinition>>,
    #[serde(default)]
    concise_checked: HashSet<String>,
}

impl DefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// `None` when the word was never looked up, `Some(None)` for a cached miss.
    pub fn get(&self, word: &str) -> Option<Option<&WordDefinition>> {
        self.entries.get(word).map(|d| d.as_ref())
    }

    pub fn insert(&mut self, word: &str, definition: Option<WordDefinition>) {
        self.entries.insert(word.to_string(), definition);
    }

    /// Inserts only when the word has no entry yet.
    pub fn insert_if_absent(&mut self, word: &str, definition: Option<WordDefinition>) -> bool {
        if self.entries.contains_key(word) {
            return false;
        }
        self.entries.insert(word.to_string(), definition);
        true
    }

    /// Fold a resolution result in. A full result never replaces an existing
    /// entry; a concise one replaces it only with content. Returns whether
    /// the cache changed.
    pub fn merge(
        &mut self,
        word: &str,
        mode: ResolveMode,
        definition: Option<WordDefinition>,
    ) -> bool {
        match mode {
            ResolveMode::Full => self.insert_if_absent(word, definition),
            ResolveMode::Concise => {
                self.mark_concise_checked(word);
                match definition {
                    Some(definition) => {
                        self.insert(word, Some(definition));
                        true
                    }
                    None => self.insert_if_absent(word, None),
                }
            }
        }
    }

    pub fn mark_concise_checked(&mut self, word: &str) {
        self.concise_checked.insert(word.to_string());
    }

    pub fn concise_checked(&self, word: &str) -> bool {
        self.concise_checked.contains(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WordDefinition {
        WordDefinition {
            word: "terse".to_string(),
            phonetic: "/tɜːs/".to_string(),
            meanings: vec![Meaning::new("adjective", "Sparing in the use of words")],
            source: DefinitionSource::Dictionary,
        }
    }

    #[test]
    fn test_negative_entry_distinct_from_absent() {
        let mut cache = DefinitionCache::new();
        assert_eq!(cache.get("xyzzy"), None);
        cache.insert("xyzzy", None);
        assert_eq!(cache.get("xyzzy"), Some(None));
        assert!(cache.contains("xyzzy"));
    }

    #[test]
    fn test_insert_if_absent_keeps_first_writer() {
        let mut cache = DefinitionCache::new();
        assert!(cache.insert_if_absent("terse", Some(sample())));
        assert!(!cache.insert_if_absent("terse", None));
        assert!(cache.get("terse").unwrap().is_some());
    }

    #[test]
    fn test_concise_merge_upgrades_but_never_erases() {
        let mut cache = DefinitionCache::new();
        cache.merge("terse", ResolveMode::Full, Some(sample()));
        let mut short = sample();
        short.meanings = vec![Meaning::new("adjective", "Brief")];
        assert!(cache.merge("terse", ResolveMode::Concise, Some(short.clone())));
        assert_eq!(cache.get("terse"), Some(Some(&short)));
        assert!(!cache.merge("terse", ResolveMode::Concise, None));
        assert_eq!(cache.get("terse"), Some(Some(&short)));
        assert!(cache.concise_checked("terse"));
        // A late full result does not overwrite the concise one
        assert!(!cache.merge("terse", ResolveMode::Full, Some(sample())));
        assert_eq!(cache.get("terse"), Some(Some(&short)));
    }

    #[test]
    fn test_serializes_with_camel_case_and_null() {
        let mut cache = DefinitionCache::new();
        cache.insert("terse", Some(sample()));
        cache.insert("qwv", None);
        let json = serde_json::to_string(&cache).unwrap();
        assert!(json.contains("partOfSpeech"));
        assert!(json.contains("\"qwv\":null"));
        let back: DefinitionCache = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cache);
    }

    #[test]
    fn test_into_usable_drops_empty_meanings() {
        let mut def = sample();
        def.meanings.push(Meaning {
            part_of_speech: "noun".to_string(),
            definitions: Vec::new(),
        });
        let def = def.into_usable().unwrap();
        assert_eq!(def.meanings.len(), 1);

        let empty = WordDefinition {
            meanings: Vec::new(),
            ..sample()
        };
        assert!(empty.into_usable().is_none());
    }
}
