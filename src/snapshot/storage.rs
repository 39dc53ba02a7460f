//! Scenario storage helpers
//!
//! Handles reading and writing scenario files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::scenario::Scenario;
use crate::core::{PolicyError, PolicyResult};

/// Reads and writes scenario JSON files
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioStorage;

impl ScenarioStorage {
    /// Load a scenario
    pub fn load(path: impl AsRef<Path>) -> PolicyResult<Scenario> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PolicyError::invalid_argument(format!(
                "scenario file not found: {}",
                path.display()
            )));
        }

        let file = File::open(path)?;
        let scenario = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!("Loaded scenario from {}", path.display());
        Ok(scenario)
    }

    /// Save a scenario, creating parent directories as needed
    pub fn save(path: impl AsRef<Path>, scenario: &Scenario) -> PolicyResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), scenario)?;
        Ok(())
    }
}
