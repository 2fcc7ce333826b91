use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::lookup::completion::DEFAULT_LLM_URL;
use crate::lookup::dictionary_api::DEFAULT_DICTIONARY_URL;
use crate::lookup::fit::DisplayBudget;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_dictionary_base_url")]
    pub dictionary_base_url: String,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_api_key_env")]
    pub llm_api_key_env: String,
    #[serde(default = "default_definition_model")]
    pub definition_model: String,
    #[serde(default = "default_passage_model")]
    pub passage_model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_display_chars_per_line")]
    pub display_chars_per_line: usize,
    #[serde(default = "default_display_max_lines")]
    pub display_max_lines: usize,
    #[serde(default = "default_swipe_threshold_cols")]
    pub swipe_threshold_cols: u16,
    #[serde(default = "default_swipe_exit_ms")]
    pub swipe_exit_ms: u64,
    #[serde(default = "default_passage_cache_ttl_hours")]
    pub passage_cache_ttl_hours: u32,
    #[serde(default = "default_restore_session")]
    pub restore_session: bool,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_dictionary_base_url() -> String {
    DEFAULT_DICTIONARY_URL.to_string()
}
fn default_llm_base_url() -> String {
    DEFAULT_LLM_URL.to_string()
}
fn default_llm_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_definition_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_passage_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_display_chars_per_line() -> usize {
    96
}
fn default_display_max_lines() -> usize {
    8
}
fn default_swipe_threshold_cols() -> u16 {
    8
}
fn default_swipe_exit_ms() -> u64 {
    300
}
fn default_passage_cache_ttl_hours() -> u32 {
    24
}
fn default_restore_session() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            dictionary_base_url: default_dictionary_base_url(),
            llm_base_url: default_llm_base_url(),
            llm_api_key_env: default_llm_api_key_env(),
            definition_model: default_definition_model(),
            passage_model: default_passage_model(),
            request_timeout_secs: default_request_timeout_secs(),
            display_chars_per_line: default_display_chars_per_line(),
            display_max_lines: default_display_max_lines(),
            swipe_threshold_cols: default_swipe_threshold_cols(),
            swipe_exit_ms: default_swipe_exit_ms(),
            passage_cache_ttl_hours: default_passage_cache_ttl_hours(),
            restore_session: default_restore_session(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            // First run: write the defaults out so they can be edited
            let config = Config::default();
            if let Err(err) = config.save() {
                warn!("could not write default config: {err:#}");
            }
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lexdr")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn validate(&mut self) {
        self.request_timeout_secs = self.request_timeout_secs.clamp(1, 120);
        self.display_chars_per_line = self.display_chars_per_line.clamp(20, 400);
        self.display_max_lines = self.display_max_lines.clamp(1, 50);
        self.swipe_threshold_cols = self.swipe_threshold_cols.clamp(2, 60);
        self.swipe_exit_ms = self.swipe_exit_ms.min(2000);
        self.passage_cache_ttl_hours = self.passage_cache_ttl_hours.clamp(1, 24 * 30);
        if self.llm_api_key_env.trim().is_empty() {
            self.llm_api_key_env = default_llm_api_key_env();
        }
        if self.dictionary_base_url.trim().is_empty() {
            self.dictionary_base_url = default_dictionary_base_url();
        }
        if self.llm_base_url.trim().is_empty() {
            self.llm_base_url = default_llm_base_url();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn display_budget(&self) -> DisplayBudget {
        DisplayBudget::new(self.display_chars_per_line, self.display_max_lines)
    }
}
