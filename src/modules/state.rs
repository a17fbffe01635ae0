use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Initialized,
    Running,
    Stopped,
}

/// Per-session bookkeeping, updated by the controller as it loops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub iterations: u64,
    pub extractions_attempted: u64,
    pub extractions_succeeded: u64,
    pub deposits: u64,
    pub discards: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    pub status: Status,
    #[serde(default)]
    pub counters: SessionCounters,
    pub message: Option<String>,
    pub updated_at: String,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            status: Status::Initialized,
            counters: SessionCounters::default(),
            message: None,
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}

fn state_dir() -> PathBuf {
    PathBuf::from(".prospector")
}

fn state_path() -> PathBuf {
    state_dir().join("state.json")
}

pub fn state_file_path() -> PathBuf {
    state_path()
}

pub fn init_state() -> io::Result<RuntimeState> {
    let state = RuntimeState::default();
    save_state(&state)?;
    Ok(state)
}

pub fn load_state() -> io::Result<Option<RuntimeState>> {
    let path = state_path();
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    let state: RuntimeState = serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "failed to parse state file {}; delete it or run `prospector init` to reset: {}",
                state_path().display(),
                e
            ),
        )
    })?;
    Ok(Some(state))
}

pub fn save_state(state: &RuntimeState) -> io::Result<()> {
    let dir = state_dir();
    fs::create_dir_all(&dir)?;
    let json = serde_json::to_vec_pretty(state)?;
    fs::write(state_path(), json)?;
    Ok(())
}

pub fn set_status(
    status: Status,
    counters: SessionCounters,
    message: Option<String>,
) -> io::Result<RuntimeState> {
    let mut state = load_state()?.unwrap_or_default();
    state.status = status;
    state.counters = counters;
    state.message = message;
    state.updated_at = Utc::now().to_rfc3339();
    save_state(&state)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_json() {
        let state = RuntimeState {
            status: Status::Running,
            counters: SessionCounters {
                iterations: 12,
                extractions_attempted: 9,
                extractions_succeeded: 7,
                deposits: 2,
                discards: 0,
            },
            message: Some("running, last phase InWorkArea".into()),
            updated_at: "2026-08-28T00:00:00+00:00".into(),
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: RuntimeState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, Status::Running);
        assert_eq!(back.counters, state.counters);
    }

    #[test]
    fn missing_counters_default_to_zero() {
        // state files written before counters existed still load
        let json = r#"{"status":"Initialized","message":null,"updated_at":"2026-08-28T00:00:00+00:00"}"#;
        let state: RuntimeState = serde_json::from_str(json).unwrap();
        assert_eq!(state.counters, SessionCounters::default());
    }
}
