//! Save File Format & Migration
//!
//! Handles versioned save records with forward migration:
//! - v1: the legacy flat record (player fields at the top level, no envelope)
//! - v2: `{ version, checksum, state }` envelope with a SHA3-256 checksum
//! - Migration functions transform v(N) → v(N+1) → ... → v(current)
//! - Unknown future versions produce an error (no downgrade)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest, Sha3_256};

use crate::economy::PlayerState;
use crate::error::PersistenceError;

/// Current save format version
pub const CURRENT_SAVE_VERSION: u32 = 2;

/// Minimum supported version (anything below cannot be migrated)
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Error types for migration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrationError {
    /// Save version is newer than what we support (can't downgrade)
    FutureVersion {
        save_version: u32,
        max_supported: u32,
    },
    /// Save version is too old (below minimum)
    TooOldVersion {
        save_version: u32,
        min_supported: u32,
    },
    /// JSON parsing failed or the record is not an object
    InvalidFormat { detail: String },
    /// A specific migration step failed
    MigrationStepFailed { from_version: u32, detail: String },
}

impl std::fmt::Display for MigrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FutureVersion {
                save_version,
                max_supported,
            } => write!(f, "save version {save_version} is newer than {max_supported}"),
            Self::TooOldVersion {
                save_version,
                min_supported,
            } => write!(f, "save version {save_version} is older than {min_supported}"),
            Self::InvalidFormat { detail } => write!(f, "invalid save format: {detail}"),
            Self::MigrationStepFailed {
                from_version,
                detail,
            } => write!(f, "migration from v{from_version} failed: {detail}"),
        }
    }
}

/// Result of a migration attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    pub success: bool,
    pub original_version: u32,
    pub final_version: u32,
    pub steps_applied: Vec<String>,
    pub error: Option<MigrationError>,
    pub data: Option<Value>,
}

impl MigrationResult {
    fn failed(original_version: u32, final_version: u32, steps: Vec<String>, error: MigrationError) -> Self {
        Self {
            success: false,
            original_version,
            final_version,
            steps_applied: steps,
            error: Some(error),
            data: None,
        }
    }
}

/// On-disk envelope for the current version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub checksum: String,
    pub state: Value,
}

/// SHA3-256 over the canonical JSON text of the state, hex encoded
pub fn state_checksum(state: &Value) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(state.to_string().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Serialize a player state into the current envelope format
pub fn encode_save(state: &PlayerState) -> Result<String, PersistenceError> {
    let state = serde_json::to_value(state)?;
    let envelope = SaveEnvelope {
        version: CURRENT_SAVE_VERSION,
        checksum: state_checksum(&state),
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse, migrate, verify and sanitize a save record of any supported version
pub fn decode_save(json_str: &str) -> Result<PlayerState, PersistenceError> {
    let result = migrate_save(json_str);
    let data = match (result.success, result.data) {
        (true, Some(data)) => data,
        _ => {
            let detail = result
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown migration failure".to_string());
            return Err(PersistenceError::Migration(detail));
        }
    };

    let envelope: SaveEnvelope = serde_json::from_value(data)?;
    let computed = state_checksum(&envelope.state);
    if computed != envelope.checksum {
        return Err(PersistenceError::ChecksumMismatch {
            stored: envelope.checksum,
            computed,
        });
    }

    let state: PlayerState = serde_json::from_value(envelope.state)?;
    Ok(state.sanitized())
}

/// Detect the version of a parsed record. Records without a `version` field
/// that are objects are legacy v1 flat records.
fn detect_version(data: &Value) -> Option<u32> {
    match data.get("version") {
        Some(v) => v.as_u64().map(|v| v as u32),
        None if data.is_object() => Some(1),
        None => None,
    }
}

/// Migrate a save record from its version to CURRENT_SAVE_VERSION
pub fn migrate_save(json_str: &str) -> MigrationResult {
    let mut data: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(e) => {
            return MigrationResult::failed(
                0,
                0,
                vec![],
                MigrationError::InvalidFormat {
                    detail: e.to_string(),
                },
            );
        }
    };

    let version = match detect_version(&data) {
        Some(v) => v,
        None => {
            return MigrationResult::failed(
                0,
                0,
                vec![],
                MigrationError::InvalidFormat {
                    detail: "Record is not an object or has an invalid 'version' field".to_string(),
                },
            );
        }
    };

    if version > CURRENT_SAVE_VERSION {
        return MigrationResult::failed(
            version,
            version,
            vec![],
            MigrationError::FutureVersion {
                save_version: version,
                max_supported: CURRENT_SAVE_VERSION,
            },
        );
    }

    if version < MIN_SUPPORTED_VERSION {
        return MigrationResult::failed(
            version,
            version,
            vec![],
            MigrationError::TooOldVersion {
                save_version: version,
                min_supported: MIN_SUPPORTED_VERSION,
            },
        );
    }

    if version == CURRENT_SAVE_VERSION {
        return MigrationResult {
            success: true,
            original_version: version,
            final_version: version,
            steps_applied: vec!["No migration needed".to_string()],
            error: None,
            data: Some(data),
        };
    }

    let mut current_version = version;
    let mut steps = Vec::new();

    while current_version < CURRENT_SAVE_VERSION {
        match apply_migration_step(&mut data, current_version) {
            Ok(description) => {
                steps.push(description);
                current_version += 1;
                data["version"] = serde_json::json!(current_version);
            }
            Err(detail) => {
                return MigrationResult::failed(
                    version,
                    current_version,
                    steps,
                    MigrationError::MigrationStepFailed {
                        from_version: current_version,
                        detail,
                    },
                );
            }
        }
    }

    tracing::info!(
        target: "idle_core::persistence",
        from = version,
        to = current_version,
        "Migrated save record"
    );

    MigrationResult {
        success: true,
        original_version: version,
        final_version: current_version,
        steps_applied: steps,
        error: None,
        data: Some(data),
    }
}

fn apply_migration_step(data: &mut Value, from_version: u32) -> Result<String, String> {
    match from_version {
        1 => migrate_v1_to_v2(data),
        _ => Err(format!("No migration path from version {}", from_version)),
    }
}

/// Migration v1 → v2:
/// - Wrap the flat record in an envelope under `state`
/// - Drop a stray `version: 1` marker from the state itself
/// - Stamp a checksum computed from the wrapped state
fn migrate_v1_to_v2(data: &mut Value) -> Result<String, String> {
    let mut flat = data
        .as_object()
        .cloned()
        .ok_or("Save data is not an object")?;
    flat.remove("version");
    let state = Value::Object(flat);
    let checksum = state_checksum(&state);
    *data = serde_json::json!({
        "version": 1,
        "checksum": checksum,
        "state": state,
    });
    Ok("v1→v2: Wrapped flat record in checksummed envelope".to_string())
}

/// Validate that a save record is at the current version
pub fn validate_save(json_str: &str) -> bool {
    let data: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(_) => return false,
    };
    data.get("version")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32 == CURRENT_SAVE_VERSION)
        .unwrap_or(false)
}

/// Get the save version from a JSON string (legacy flat records report 1)
pub fn get_save_version(json_str: &str) -> Option<u32> {
    let data: Value = serde_json::from_str(json_str).ok()?;
    detect_version(&data)
}
