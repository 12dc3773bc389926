use crate::chromosome::ActionSequence;
use crate::config::ConfigError;
use crate::physics::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to access snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("snapshot holds {found} agents but the population size is {expected}")]
    SizeMismatch { expected: usize, found: usize },
    #[error("agent {index} has a chromosome of length {found}, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// One exported agent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub generation: u32,
    pub chromosome: ActionSequence,
    /// Top-left of the hitbox when the record was taken
    pub position: Vec2,
}

/// Every record in a snapshot file, oldest first. A missing or empty file holds none.
pub fn load_records(path: &Path) -> Result<Vec<AgentRecord>, SnapshotError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Append `records` to the JSON array stored at `path`.
///
/// The file is rewritten whole, so it is always a single valid array.
pub fn append_records(path: &Path, records: &[AgentRecord]) -> Result<(), SnapshotError> {
    let mut all = load_records(path)?;
    all.extend_from_slice(records);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(&all)?)?;
    log::debug!(
        "Appended {} records to {} ({} total)",
        records.len(),
        path.display(),
        all.len()
    );
    Ok(())
}

/// The most recently appended block: the trailing records sharing the last generation number.
pub fn load_latest(path: &Path) -> Result<Option<Vec<AgentRecord>>, SnapshotError> {
    let mut all = load_records(path)?;
    let Some(last_generation) = all.last().map(|r| r.generation) else {
        return Ok(None);
    };
    let start = all
        .iter()
        .rposition(|r| r.generation != last_generation)
        .map_or(0, |i| i + 1);
    Ok(Some(all.split_off(start)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::Action;

    fn record(generation: u32, action: Action) -> AgentRecord {
        AgentRecord {
            generation,
            chromosome: ActionSequence::repeat(action, 3),
            position: Vec2::new(generation as f32, 1.5),
        }
    }

    #[test]
    fn missing_file_has_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.json");
        assert!(load_records(&path).unwrap().is_empty());
        assert!(load_latest(&path).unwrap().is_none());
    }

    #[test]
    fn append_accumulates_generations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots").join("population.json");

        append_records(&path, &[record(0, Action::Idle), record(0, Action::Jump)]).unwrap();
        append_records(&path, &[record(1, Action::MoveRight), record(1, Action::MoveLeft)])
            .unwrap();

        let all = load_records(&path).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], record(0, Action::Idle));

        let latest = load_latest(&path).unwrap().unwrap();
        assert_eq!(
            latest,
            vec![record(1, Action::MoveRight), record(1, Action::MoveLeft)]
        );
    }

    #[test]
    fn records_use_plain_json_shape() {
        let json = serde_json::to_value(record(2, Action::Jump)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "generation": 2,
                "chromosome": ["jump", "jump", "jump"],
                "position": {"x": 2.0, "y": 1.5}
            })
        );
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.json");
        fs::write(&path, "[{\"generation\": 1}]").unwrap();
        assert!(matches!(load_records(&path), Err(SnapshotError::Json(_))));
    }
}
