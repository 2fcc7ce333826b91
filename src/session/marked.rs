use serde::{Deserialize, Serialize};

const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']'];

/// Strip leading and trailing punctuation. Tokens that are nothing but
/// punctuation normalize to `None`.
pub fn normalize_token(token: &str) -> Option<String> {
    let trimmed = token.trim_matches(EDGE_PUNCTUATION);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Toggle {
    Added(String),
    Removed(String),
    /// The token normalized to nothing.
    Ignored,
}

/// Words the user marked as unfamiliar, in marking order, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkedWordSet {
    words: Vec<String>,
}

impl MarkedWordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted words, normalizing and dropping duplicates.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for word in words {
            if let Some(word) = normalize_token(word.as_ref())
                && !set.words.contains(&word)
            {
                set.words.push(word);
            }
        }
        set
    }

    pub fn toggle(&mut self, token: &str) -> Toggle {
        let Some(word) = normalize_token(token) else {
            return Toggle::Ignored;
        };
        if let Some(pos) = self.words.iter().position(|w| *w == word) {
            self.words.remove(pos);
            Toggle::Removed(word)
        } else {
            self.words.push(word.clone());
            Toggle::Added(word)
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        normalize_token(token).is_some_and(|w| self.words.contains(&w))
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_edge_punctuation_only() {
        assert_eq!(normalize_token("\"ubiquitous,\"").as_deref(), Some("ubiquitous"));
        assert_eq!(normalize_token("(e.g.)").as_deref(), Some("e.g"));
        assert_eq!(normalize_token("well-known").as_deref(), Some("well-known"));
        assert_eq!(normalize_token("...").as_deref(), None);
        assert_eq!(normalize_token("").as_deref(), None);
    }

    #[test]
    fn test_toggle_twice_restores_set() {
        let mut set = MarkedWordSet::from_words(["alpha"]);
        let before = set.clone();
        assert_eq!(set.toggle("beta."), Toggle::Added("beta".to_string()));
        assert_eq!(set.toggle("beta"), Toggle::Removed("beta".to_string()));
        assert_eq!(set, before);
    }

    #[test]
    fn test_punctuation_only_token_is_noop() {
        let mut set = MarkedWordSet::new();
        assert_eq!(set.toggle("—"), Toggle::Added("—".to_string()));
        let before = set.clone();
        assert_eq!(set.toggle("?!"), Toggle::Ignored);
        assert_eq!(set, before);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut set = MarkedWordSet::new();
        set.toggle("gamma");
        set.toggle("alpha");
        set.toggle("beta");
        set.toggle("alpha");
        set.toggle("alpha");
        let words: Vec<&str> = set.iter().collect();
        assert_eq!(words, vec!["gamma", "beta", "alpha"]);
    }

    #[test]
    fn test_same_word_with_different_punctuation_is_one_entry() {
        let mut set = MarkedWordSet::new();
        set.toggle("ephemeral,");
        assert!(set.contains("ephemeral."));
        set.toggle("(ephemeral)");
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_words_dedupes() {
        let set = MarkedWordSet::from_words(["a.", "a", "b", "!!"]);
        assert_eq!(set.as_slice(), &["a".to_string(), "b".to_string()]);
    }
}
