use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Result;
use env_logger::{Builder, Env, Target};

/// Route log output to `<dir>/lexdr.log`. The terminal belongs to the UI, so
/// nothing is ever written to stderr. Level comes from `RUST_LOG`, default `info`.
pub fn init(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("lexdr.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()?;

    log::info!("logging to {}", path.display());
    Ok(path)
}
