pub mod script;
pub mod session;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use vantage_controls::ControlsConfig;

pub use script::{
    CameraSetup, ControlsKind, ObjectSetup, ProjectionSetup, Script, Step, TransformSetup,
};
pub use session::{CameraState, ObjectState, Report, replay};

pub fn load_config(path: impl AsRef<Path>) -> Result<ControlsConfig> {
    let path = path.as_ref();
    let config: ControlsConfig = read_json(path, "controls config")?;
    config
        .validate()
        .with_context(|| format!("validate controls config {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &ControlsConfig, path: impl AsRef<Path>) -> Result<()> {
    write_json(config, path.as_ref(), "controls config")
}

pub fn load_script(path: impl AsRef<Path>) -> Result<Script> {
    read_json(path.as_ref(), "script")
}

pub fn save_script(script: &Script, path: impl AsRef<Path>) -> Result<()> {
    write_json(script, path.as_ref(), "script")
}

pub fn save_report(report: &Report, path: impl AsRef<Path>) -> Result<()> {
    write_json(report, path.as_ref(), "report")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read {what} {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {what} {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {what}"))?;
    std::fs::write(path, text).with_context(|| format!("write {what} {}", path.display()))?;
    Ok(())
}
