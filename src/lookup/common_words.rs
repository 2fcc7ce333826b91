use crate::lookup::definition::{DefinitionSource, Meaning, WordDefinition};

// The open dictionary source is unreliable for function words.
const COMMON_WORDS: &[(&str, &str, &str, &str)] = &[
    (
        "a",
        "/ə/",
        "article",
        "Used before singular nouns to indicate one example of something",
    ),
    (
        "an",
        "/ən/",
        "article",
        "Used before words beginning with a vowel sound to indicate one example",
    ),
    (
        "the",
        "/ðə/",
        "article",
        "Used before nouns to indicate a specific person, place, or thing",
    ),
    ("is", "/ɪz/", "verb", "Third person singular present tense of 'be'"),
    (
        "are",
        "/ɑr/",
        "verb",
        "Second person singular and plural present tense of 'be'",
    ),
    (
        "was",
        "/wəz/",
        "verb",
        "First and third person singular past tense of 'be'",
    ),
    (
        "were",
        "/wər/",
        "verb",
        "Second person singular and plural past tense of 'be'",
    ),
    (
        "be",
        "/bi/",
        "verb",
        "To exist or occur; to have a specific state or quality",
    ),
    ("been", "/bɪn/", "verb", "Past participle of 'be'"),
    ("being", "/ˈbiɪŋ/", "verb", "Present participle of 'be'"),
];

/// Case-sensitive lookup in the built-in function-word table.
pub fn lookup(word: &str) -> Option<WordDefinition> {
    COMMON_WORDS
        .iter()
        .find(|(w, ..)| *w == word)
        .map(|&(w, phonetic, pos, definition)| WordDefinition {
            word: w.to_string(),
            phonetic: phonetic.to_string(),
            meanings: vec![Meaning::new(pos, definition)],
            source: DefinitionSource::BuiltIn,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_articles_and_be_forms_present() {
        for word in ["a", "an", "the", "is", "are", "was", "were", "be", "been", "being"] {
            let def = lookup(word).unwrap_or_else(|| panic!("missing {word}"));
            assert_eq!(def.word, word);
            assert_eq!(def.source, DefinitionSource::BuiltIn);
            assert!(!def.meanings[0].definitions.is_empty());
        }
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(lookup("The").is_none());
        assert!(lookup("ubiquitous").is_none());
    }
}
