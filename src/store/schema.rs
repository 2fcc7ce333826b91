use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lookup::definition::DefinitionCache;
use crate::session::result::DrillSummary;

pub const SCHEMA_VERSION: u32 = 1;

/// Drill summaries kept on disk.
pub const HISTORY_LIMIT: usize = 500;

/// Reading state handed to and from the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub passage: String,
    #[serde(default)]
    pub marked_words: Vec<String>,
    #[serde(default)]
    pub definition_cache: DefinitionCache,
}

impl SessionSnapshot {
    pub fn new(
        passage: &str,
        marked_words: Vec<String>,
        definition_cache: DefinitionCache,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at,
            passage: passage.to_string(),
            marked_words,
            definition_cache,
        }
    }

    /// Check if loaded data has a stale schema version and should be ignored.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrillHistoryData {
    pub schema_version: u32,
    pub drills: Vec<DrillSummary>,
}

impl Default for DrillHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            drills: Vec::new(),
        }
    }
}

impl DrillHistoryData {
    /// Append a summary, dropping the oldest beyond [`HISTORY_LIMIT`].
    pub fn push(&mut self, summary: DrillSummary) {
        self.drills.push(summary);
        if self.drills.len() > HISTORY_LIMIT {
            let excess = self.drills.len() - HISTORY_LIMIT;
            self.drills.drain(..excess);
        }
    }
}
