pub mod ai_text;
pub mod common_words;
pub mod completion;
pub mod definition;
pub mod dictionary_api;
pub mod fit;
pub mod resolver;
pub mod worker;

use thiserror::Error;

use crate::lookup::dictionary_api::DictionaryEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolveMode {
    Full,
    Concise,
}

impl ResolveMode {
    pub fn is_concise(self) -> bool {
        matches!(self, ResolveMode::Concise)
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no entry for {0:?}")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("service not configured: {0}")]
    Unconfigured(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Dictionary collaborator: returns the first entry for a word.
pub trait DictionaryLookup: Send + Sync {
    fn lookup(&self, word: &str) -> Result<DictionaryEntry, LookupError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// LLM collaborator used for definition fallback and passage generation.
pub trait Completion: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LookupError>;
}
