//! Prompting the LLM for a definition and turning its free-form reply into a
//! [`WordDefinition`].
//!
//! Replies are parsed with best-effort heuristics. Nothing here fails: a reply
//! that ignores the requested format still yields a (plainer) definition.

use std::sync::LazyLock;

use regex::Regex;

use crate::lookup::definition::{DefinitionSource, Meaning, WordDefinition};
use crate::lookup::{CompletionRequest, ResolveMode};

const FUNCTION_WORD_HINT: &str = r#"For common words like "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will", "would", "could", "should", "may", "might", "can", "must", "shall", provide simple, clear definitions that a student would understand.

For example:
- "a" should be defined as: "Used before singular nouns to indicate one example of something"
- "the" should be defined as: "Used before nouns to indicate a specific person, place, or thing"
- "is" should be defined as: "Third person singular present tense of 'be'""#;

const CONCISE_RULE: &str = "IMPORTANT: Provide extremely short definitions (under 50 characters) that still convey the essential meaning. Focus only on the core definition.";
const FULL_RULE: &str = "Always provide the part of speech first, then pronunciation in parentheses, then a clear, concise definition. Keep definitions under 100 characters when possible.";

static TYPE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Type:\s*(Noun|Verb|Adjective|Adverb|Acronym|Number)\s*\n?").unwrap()
});
// Only the prompted "PoS (pronunciation) body" shape; the match ends on the `(`.
static BARE_POS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Noun|Verb|Adjective|Adverb|Acronym|Number)\s*:?\s*\(").unwrap()
});
static PRONUNCIATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_`]").unwrap());
static LEAD_INS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^Pronunciation:\s*\n?",
        r#"(?i)^Definition:\s*"#,
        r#"(?i)^Here is the definition of\s*["']?[^"']*["']?:\s*"#,
        r"(?i)^Type:\s*(Noun|Verb|Adjective|Adverb|Acronym|Number)\s*\n?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Builds the definition prompt; concise mode asks for a much shorter text.
pub fn definition_prompt(word: &str, mode: ResolveMode) -> CompletionRequest {
    let (style, rule, length, max_tokens) = match mode {
        ResolveMode::Concise => ("very short and concise", CONCISE_RULE, "very short", 80),
        ResolveMode::Full => ("concise, accurate", FULL_RULE, "clear", 120),
    };
    CompletionRequest {
        system: Some(format!(
            "You are a helpful assistant that provides {style} definitions for words. {FUNCTION_WORD_HINT}\n\n{rule}"
        )),
        prompt: format!(
            "Define the word \"{word}\" with its part of speech, pronunciation, and a {length} definition. Format: Part of Speech (pronunciation) Definition"
        ),
        max_tokens,
        temperature: 0.3,
    }
}

/// Part of speech guessed from the word's suffix.
pub fn infer_part_of_speech(word: &str) -> &'static str {
    let word = word.to_lowercase();
    if word.ends_with("ly") {
        "Adverb"
    } else if word.ends_with("ing") || word.ends_with("ed") {
        "Verb"
    } else if ["al", "ous", "ful", "less"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        "Adjective"
    } else {
        "Noun"
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiDefinition {
    pub part_of_speech: String,
    pub phonetic: String,
    pub text: String,
}

impl AiDefinition {
    pub fn into_definition(self, word: &str) -> WordDefinition {
        WordDefinition {
            word: word.to_string(),
            phonetic: self.phonetic,
            meanings: vec![Meaning::new(&self.part_of_speech, &self.text)],
            source: DefinitionSource::Ai,
        }
    }
}

/// Parse an LLM reply; `None` when nothing is left after cleanup.
pub fn parse_reply(word: &str, raw: &str) -> Option<AiDefinition> {
    let raw = raw.trim();

    let (part_of_speech, mut body) = if let Some(caps) = TYPE_PREFIX.captures(raw) {
        (caps[1].to_string(), raw[caps[0].len()..].trim().to_string())
    } else if let Some(caps) = BARE_POS_PREFIX.captures(raw) {
        let paren = caps[0].len() - 1;
        (caps[1].to_string(), raw[paren..].trim().to_string())
    } else {
        (infer_part_of_speech(word).to_string(), raw.to_string())
    };

    let mut phonetic = String::new();
    if let Some(caps) = PRONUNCIATION.captures(&body) {
        phonetic = caps[1].trim().to_string();
        body = PRONUNCIATION.replace(&body, "").trim().to_string();
    }

    body = EMPHASIS.replace_all(&body, "").into_owned();
    for lead_in in LEAD_INS.iter() {
        body = lead_in.replace(&body, "").into_owned();
    }
    let body = BLANK_LINES.replace_all(&body, "\n").trim().to_string();

    if body.is_empty() {
        return None;
    }
    Some(AiDefinition {
        part_of_speech,
        phonetic,
        text: body,
    })
}
