use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::session::result::DrillSummary;
use crate::store::schema::{DrillHistoryData, SessionSnapshot};

const SESSION_FILE: &str = "session.json";
const HISTORY_FILE: &str = "drill_history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lexdr")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!("ignoring unreadable {name}: {err}");
                T::default()
            }),
            Err(err) => {
                warn!("could not read {name}: {err}");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// The saved reading session, if there is a usable one.
    pub fn load_session(&self) -> Option<SessionSnapshot> {
        let path = self.file_path(SESSION_FILE);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<SessionSnapshot>(&content) {
            Ok(snapshot) if !snapshot.needs_reset() => Some(snapshot),
            Ok(snapshot) => {
                warn!(
                    "ignoring session saved with schema {}",
                    snapshot.schema_version
                );
                None
            }
            Err(err) => {
                warn!("ignoring unreadable session: {err}");
                None
            }
        }
    }

    pub fn save_session(&self, snapshot: &SessionSnapshot) -> Result<()> {
        self.save(SESSION_FILE, snapshot)
    }

    pub fn clear_session(&self) -> Result<()> {
        let path = self.file_path(SESSION_FILE);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn load_drill_history(&self) -> DrillHistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_drill_history(&self, data: &DrillHistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    /// Append one summary to the history file.
    pub fn record_drill(&self, summary: DrillSummary) -> Result<DrillHistoryData> {
        let mut history = self.load_drill_history();
        history.push(summary);
        self.save_drill_history(&history)?;
        Ok(history)
    }
}
