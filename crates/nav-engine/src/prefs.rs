use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Persisted kill-switch record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefRecord {
    disabled: bool,
    disabled_at_ms: Option<u64>,
}

/// User preference for instant navigation, persisted across sessions.
///
/// Stored as a boolean plus the timestamp it was set. An absent record — or
/// one older than the expiry window — means enabled: a stale opt-out from a
/// long-past debugging session should not keep degrading the experience.
pub struct NavigationPrefs {
    path: PathBuf,
    expiry: Duration,
}

impl NavigationPrefs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expiry: Duration::from_secs(24 * 60 * 60),
        }
    }

    pub fn with_expiry(path: impl Into<PathBuf>, expiry: Duration) -> Self {
        Self {
            path: path.into(),
            expiry,
        }
    }

    /// Whether instant navigation should run at all.
    pub fn is_enabled(&self) -> bool {
        let Some(record) = self.load() else {
            return true;
        };
        if !record.disabled {
            return true;
        }
        match record.disabled_at_ms {
            Some(at_ms) => now_ms().saturating_sub(at_ms) >= self.expiry.as_millis() as u64,
            // Disabled with no timestamp: treat as expired
            None => true,
        }
    }

    /// Turn instant navigation off, remembering when.
    pub fn disable(&self) -> std::io::Result<()> {
        let record = PrefRecord {
            disabled: true,
            disabled_at_ms: Some(now_ms()),
        };
        let json = serde_json::to_string(&record).expect("pref record serializes");
        std::fs::write(&self.path, json)?;
        tracing::info!("instant navigation disabled by user");
        Ok(())
    }

    /// Turn instant navigation back on by forgetting the record.
    pub fn enable(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        tracing::info!("instant navigation enabled by user");
        Ok(())
    }

    fn load(&self) -> Option<PrefRecord> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&contents).ok()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap() // clock is after 1970
        .as_millis() as u64
}
