use log::{debug, warn};

use crate::lookup::ai_text;
use crate::lookup::common_words;
use crate::lookup::definition::{DefinitionSource, WordDefinition};
use crate::lookup::fit::DisplayBudget;
use crate::lookup::{Completion, DictionaryLookup, LookupError, ResolveMode};

/// Longest primary sense a concise request accepts from the dictionary as-is.
pub const CONCISE_TRUST_CHARS: usize = 100;

/// 2-5 ASCII uppercase letters, e.g. "NASA".
pub fn is_potential_acronym(word: &str) -> bool {
    (2..=5).contains(&word.len()) && word.bytes().all(|b| b.is_ascii_uppercase())
}

pub fn is_number(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

/// Turns a word into a definition using, in order, the built-in function-word
/// table, the dictionary collaborator and the LLM collaborator.
pub struct DefinitionResolver {
    dictionary: Box<dyn DictionaryLookup>,
    completion: Option<Box<dyn Completion>>,
    budget: DisplayBudget,
}

impl DefinitionResolver {
    pub fn new(
        dictionary: Box<dyn DictionaryLookup>,
        completion: Option<Box<dyn Completion>>,
    ) -> Self {
        Self {
            dictionary,
            completion,
            budget: DisplayBudget::default(),
        }
    }

    /// Card area a concise dictionary sense has to fit before it is trusted.
    pub fn with_display_budget(mut self, budget: DisplayBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    pub fn resolve(&self, word: &str, mode: ResolveMode) -> Option<WordDefinition> {
        if let Some(definition) = common_words::lookup(word) {
            debug!("{word:?}: built-in table");
            return Some(definition);
        }

        let dictionary = match self.dictionary.lookup(word) {
            Ok(entry) => entry.into_definition().map(|mut d| {
                d.word = word.to_string();
                d
            }),
            Err(LookupError::NotFound(_)) => {
                debug!("{word:?}: not in dictionary");
                None
            }
            Err(err) => {
                warn!("{word:?}: dictionary lookup failed: {err}");
                None
            }
        };

        let needs_clarification = is_potential_acronym(word) || is_number(word);
        let too_long = mode.is_concise()
            && dictionary.as_ref().is_some_and(|d| {
                !self.budget.fits_definition(d)
                    || d.primary_senses()
                        .any(|s| s.chars().count() > CONCISE_TRUST_CHARS)
            });

        if let Some(definition) = dictionary.as_ref()
            && !needs_clarification
            && !too_long
        {
            debug!("{word:?}: dictionary ({mode:?})");
            return Some(definition.clone());
        }

        let ai = self.ask_completion(word, mode);
        merge(dictionary, ai, needs_clarification || too_long)
    }

    fn ask_completion(&self, word: &str, mode: ResolveMode) -> Option<WordDefinition> {
        let completion = self.completion.as_ref()?;
        let request = ai_text::definition_prompt(word, mode);
        match completion.complete(&request) {
            Ok(reply) => {
                let parsed = ai_text::parse_reply(word, &reply);
                if parsed.is_none() {
                    debug!("{word:?}: completion had no usable text");
                }
                parsed.map(|p| p.into_definition(word))
            }
            Err(err) => {
                warn!("{word:?}: completion failed: {err}");
                None
            }
        }
    }
}

/// Combine dictionary and AI results. When `ai_authoritative` is set the AI
/// meaning replaces the dictionary's instead of being appended.
///
/// `resolve` only reaches here with a dictionary hit when the AI is
/// authoritative, so the append arm serves direct callers only.
pub fn merge(
    dictionary: Option<WordDefinition>,
    ai: Option<WordDefinition>,
    ai_authoritative: bool,
) -> Option<WordDefinition> {
    match (dictionary, ai) {
        (Some(dict), Some(mut ai)) if ai_authoritative => {
            if ai.phonetic.is_empty() {
                ai.phonetic = dict.phonetic;
            }
            Some(ai)
        }
        (Some(mut dict), Some(ai)) => {
            dict.meanings.extend(ai.meanings);
            dict.source = DefinitionSource::Combined;
            Some(dict)
        }
        (Some(dict), None) => Some(dict),
        (None, Some(ai)) => Some(ai),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::lookup::CompletionRequest;
    use crate::lookup::dictionary_api::{DictionaryEntry, EntryDefinition, EntryMeaning};

    struct FakeDictionary {
        definition: Option<String>,
        calls: Arc<AtomicUsize>,
    }

    impl DictionaryLookup for FakeDictionary {
        fn lookup(&self, word: &str) -> Result<DictionaryEntry, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.definition {
                Some(text) => Ok(DictionaryEntry {
                    word: word.to_lowercase(),
                    phonetic: Some("/dict/".to_string()),
                    phonetics: Vec::new(),
                    meanings: vec![EntryMeaning {
                        part_of_speech: "noun".to_string(),
                        definitions: vec![EntryDefinition {
                            definition: text.clone(),
                        }],
                    }],
                }),
                None => Err(LookupError::NotFound(word.to_string())),
            }
        }
    }

    struct FakeCompletion {
        reply: Result<String, ()>,
        requests: Arc<std::sync::Mutex<Vec<CompletionRequest>>>,
    }

    impl Completion for FakeCompletion {
        fn complete(&self, request: &CompletionRequest) -> Result<String, LookupError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .map_err(|_| LookupError::Unavailable("down".to_string()))
        }
    }

    struct Harness {
        resolver: DefinitionResolver,
        dictionary_calls: Arc<AtomicUsize>,
        completion_requests: Arc<std::sync::Mutex<Vec<CompletionRequest>>>,
    }

    fn harness(dictionary: Option<&str>, completion: Option<Result<&str, ()>>) -> Harness {
        harness_with_budget(dictionary, completion, DisplayBudget::default())
    }

    fn harness_with_budget(
        dictionary: Option<&str>,
        completion: Option<Result<&str, ()>>,
        budget: DisplayBudget,
    ) -> Harness {
        let dictionary_calls = Arc::new(AtomicUsize::new(0));
        let completion_requests = Arc::new(std::sync::Mutex::new(Vec::new()));
        let completion: Option<Box<dyn Completion>> = completion.map(|reply| {
            Box::new(FakeCompletion {
                reply: reply.map(str::to_string),
                requests: completion_requests.clone(),
            }) as Box<dyn Completion>
        });
        let resolver = DefinitionResolver::new(
            Box::new(FakeDictionary {
                definition: dictionary.map(str::to_string),
                calls: dictionary_calls.clone(),
            }),
            completion,
        )
        .with_display_budget(budget);
        Harness {
            resolver,
            dictionary_calls,
            completion_requests,
        }
    }

    #[test]
    fn test_predicates() {
        assert!(is_potential_acronym("NASA"));
        assert!(is_potential_acronym("UN"));
        assert!(!is_potential_acronym("A"));
        assert!(!is_potential_acronym("ABCDEF"));
        assert!(!is_potential_acronym("Nasa"));
        assert!(is_number("1984"));
        assert!(!is_number("19th"));
        assert!(!is_number(""));
    }

    #[test]
    fn test_function_word_skips_collaborators() {
        let h = harness(Some("unused"), Some(Ok("unused")));
        let def = h.resolver.resolve("the", ResolveMode::Full).unwrap();
        assert_eq!(def.source, DefinitionSource::BuiltIn);
        assert_eq!(h.dictionary_calls.load(Ordering::SeqCst), 0);
        assert!(h.completion_requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dictionary_hit_is_trusted() {
        let h = harness(Some("Present everywhere"), Some(Ok("Noun (x) ai text")));
        let def = h.resolver.resolve("ubiquitous", ResolveMode::Full).unwrap();
        assert_eq!(def.source, DefinitionSource::Dictionary);
        assert_eq!(def.meanings[0].definitions[0], "Present everywhere");
        assert!(h.completion_requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_not_found_falls_through_to_completion() {
        let h = harness(None, Some(Ok("Noun (zizzy) A magic word")));
        let def = h.resolver.resolve("xyzzy123", ResolveMode::Full).unwrap();
        assert_eq!(def.source, DefinitionSource::Ai);
        assert_eq!(def.phonetic, "zizzy");
        assert_eq!(def.meanings[0].definitions[0], "A magic word");
    }

    #[test]
    fn test_both_sources_failing_is_none() {
        let h = harness(None, Some(Err(())));
        assert!(h.resolver.resolve("xyzzy123", ResolveMode::Full).is_none());
        let unconfigured = harness(None, None);
        assert!(unconfigured.resolver.resolve("xyzzy123", ResolveMode::Full).is_none());
    }

    #[test]
    fn test_acronym_prefers_ai_over_dictionary() {
        let h = harness(Some("A space agency"), Some(Ok("Type: Acronym\nNational Aeronautics and Space Administration")));
        let def = h.resolver.resolve("NASA", ResolveMode::Full).unwrap();
        assert_eq!(def.source, DefinitionSource::Ai);
        assert_eq!(def.meanings.len(), 1);
        assert_eq!(def.meanings[0].part_of_speech, "Acronym");
        // AI gave no pronunciation, dictionary's is kept
        assert_eq!(def.phonetic, "/dict/");
    }

    #[test]
    fn test_acronym_keeps_dictionary_when_ai_down() {
        let h = harness(Some("A space agency"), Some(Err(())));
        let def = h.resolver.resolve("NASA", ResolveMode::Full).unwrap();
        assert_eq!(def.source, DefinitionSource::Dictionary);
    }

    #[test]
    fn test_concise_mode_asks_ai_for_long_dictionary_text() {
        let long = "x ".repeat(120);
        let h = harness(Some(&long), Some(Ok("Noun (x) Something short")));
        let def = h.resolver.resolve("verbose", ResolveMode::Concise).unwrap();
        assert_eq!(def.meanings[0].definitions[0], "Something short");
        let requests = h.completion_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 80);
    }

    #[test]
    fn test_concise_mode_trusts_short_dictionary_text() {
        let h = harness(Some("Brief"), Some(Ok("Noun (x) unused")));
        let def = h.resolver.resolve("terse", ResolveMode::Concise).unwrap();
        assert_eq!(def.meanings[0].definitions[0], "Brief");
        assert!(h.completion_requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_concise_mode_asks_ai_when_sense_overflows_small_card() {
        let sense = "Existing or being everywhere at the same time; constantly encountered";
        let h = harness_with_budget(
            Some(sense),
            Some(Ok("Adjective (yoo-BIK) Found everywhere")),
            DisplayBudget::new(20, 2),
        );
        let def = h.resolver.resolve("ubiquitous", ResolveMode::Concise).unwrap();
        assert_eq!(def.source, DefinitionSource::Ai);
        assert_eq!(def.meanings[0].definitions[0], "Found everywhere");
        assert_eq!(h.completion_requests.lock().unwrap().len(), 1);

        // Full mode still trusts the same sense
        let full = h.resolver.resolve("ubiquitous", ResolveMode::Full).unwrap();
        assert_eq!(full.source, DefinitionSource::Dictionary);
        assert_eq!(h.completion_requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_appends_ai_meaning() {
        let dict = WordDefinition {
            word: "w".to_string(),
            phonetic: "/w/".to_string(),
            meanings: vec![crate::lookup::definition::Meaning::new("noun", "dict")],
            source: DefinitionSource::Dictionary,
        };
        let ai = WordDefinition {
            source: DefinitionSource::Ai,
            meanings: vec![crate::lookup::definition::Meaning::new("Noun", "ai")],
            ..dict.clone()
        };
        let merged = merge(Some(dict), Some(ai), false).unwrap();
        assert_eq!(merged.source, DefinitionSource::Combined);
        assert_eq!(merged.meanings.len(), 2);
        assert_eq!(merged.meanings[0].definitions[0], "dict");
        assert_eq!(merged.meanings[1].definitions[0], "ai");
    }
}
