use std::time::Duration;

use serde::Deserialize;

use crate::lookup::definition::{DefinitionSource, Meaning, WordDefinition};
use crate::lookup::{DictionaryLookup, LookupError};

pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<EntryMeaning>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Phonetic {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMeaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<EntryDefinition>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EntryDefinition {
    pub definition: String,
}

impl DictionaryEntry {
    /// The entry's own phonetic, else the first variant that has text.
    pub fn best_phonetic(&self) -> String {
        self.phonetic
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| {
                self.phonetics
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .find(|t| !t.is_empty())
            })
            .unwrap_or_default()
            .to_string()
    }

    pub fn into_definition(self) -> Option<WordDefinition> {
        let phonetic = self.best_phonetic();
        let meanings = self
            .meanings
            .into_iter()
            .map(|m| Meaning {
                part_of_speech: m.part_of_speech,
                definitions: m.definitions.into_iter().map(|d| d.definition).collect(),
            })
            .collect();
        WordDefinition {
            word: self.word,
            phonetic,
            meanings,
            source: DefinitionSource::Dictionary,
        }
        .into_usable()
    }
}

/// Parse a dictionary response body and keep the first entry.
pub fn parse_entries(body: &str, word: &str) -> Result<DictionaryEntry, LookupError> {
    let entries: Vec<DictionaryEntry> =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    entries
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::NotFound(word.to_string()))
}

/// Client for the free dictionary API.
pub struct FreeDictionaryClient {
    base_url: String,
    #[cfg(feature = "network")]
    client: Option<reqwest::blocking::Client>,
}

impl FreeDictionaryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        #[cfg(not(feature = "network"))]
        let _ = timeout;
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            #[cfg(feature = "network")]
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .ok(),
        }
    }
}

#[cfg(feature = "network")]
impl DictionaryLookup for FreeDictionaryClient {
    fn lookup(&self, word: &str) -> Result<DictionaryEntry, LookupError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LookupError::Unavailable("http client not initialized".to_string()))?;

        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| LookupError::Unconfigured(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Unconfigured(self.base_url.clone()))?
            .push(word);

        let response = client
            .get(url)
            .send()
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(word.to_string()));
        }
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!("status {status}")));
        }
        let body = response
            .text()
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;
        parse_entries(&body, word)
    }
}

#[cfg(not(feature = "network"))]
impl DictionaryLookup for FreeDictionaryClient {
    fn lookup(&self, _word: &str) -> Result<DictionaryEntry, LookupError> {
        Err(LookupError::Unavailable(format!(
            "built without network support ({})",
            self.base_url
        )))
    }
}

/// Stand-in used in offline mode: every lookup is unavailable.
pub struct NoDictionary;

impl DictionaryLookup for NoDictionary {
    fn lookup(&self, _word: &str) -> Result<DictionaryEntry, LookupError> {
        Err(LookupError::Unconfigured("offline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UBIQUITOUS: &str = r#"[{
        "word": "ubiquitous",
        "phonetics": [{"audio": ""}, {"text": "/juːˈbɪk.wɪ.təs/"}],
        "meanings": [
            {"partOfSpeech": "adjective",
             "definitions": [{"definition": "Being everywhere at once: omnipresent."},
                             {"definition": "Appearing to be everywhere."}]}
        ]
    }, {"word": "ubiquitous", "meanings": []}]"#;

    #[test]
    fn test_first_entry_is_used() {
        let entry = parse_entries(UBIQUITOUS, "ubiquitous").unwrap();
        let def = entry.into_definition().unwrap();
        assert_eq!(def.word, "ubiquitous");
        assert_eq!(def.meanings.len(), 1);
        assert_eq!(def.meanings[0].definitions.len(), 2);
        assert_eq!(def.source, DefinitionSource::Dictionary);
    }

    #[test]
    fn test_phonetic_falls_back_to_first_variant_with_text() {
        let entry = parse_entries(UBIQUITOUS, "ubiquitous").unwrap();
        assert_eq!(entry.best_phonetic(), "/juːˈbɪk.wɪ.təs/");
    }

    #[test]
    fn test_direct_phonetic_wins() {
        let entry = DictionaryEntry {
            word: "x".to_string(),
            phonetic: Some("/eks/".to_string()),
            phonetics: vec![Phonetic {
                text: Some("/other/".to_string()),
            }],
            meanings: Vec::new(),
        };
        assert_eq!(entry.best_phonetic(), "/eks/");
    }

    #[test]
    fn test_empty_array_is_not_found() {
        assert!(matches!(
            parse_entries("[]", "zz"),
            Err(LookupError::NotFound(_))
        ));
    }

    #[test]
    fn test_not_found_object_is_malformed() {
        let body = r#"{"title":"No Definitions Found"}"#;
        assert!(matches!(
            parse_entries(body, "zz"),
            Err(LookupError::Malformed(_))
        ));
    }
}
