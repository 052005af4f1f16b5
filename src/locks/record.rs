//! Lock record structure, serialization and validation.

use super::identity::{IdentitySource, Provenance};
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Note recorded when an identity came from its natural source.
pub const SOURCE_OK: &str = "ok";

/// Warning recorded whenever any identity fell back to another source.
pub const FALLBACK_WARNING: &str = "WARNING: one or more environment variables were not found. \
     Use timestamp as reference to check the exact commit and pipeline ID.";

/// Provenance notes for the identity fields of a lock record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Where `lock_id` came from (`ok` or a fallback note).
    pub commit: String,

    /// Where `signer` came from (`ok` or a fallback note).
    pub signer: String,

    /// Free-form warning, empty unless a fallback was used.
    #[serde(default)]
    pub warning: String,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            commit: SOURCE_OK.to_string(),
            signer: SOURCE_OK.to_string(),
            warning: String::new(),
        }
    }
}

/// The persisted body of a lock object.
///
/// Records are immutable: they are created by acquire, read by check and
/// destroyed by release. Unknown fields are ignored when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Operation that took the lock (commit SHA or random UUID).
    pub lock_id: String,

    /// Creation time, RFC 3339 with second precision.
    pub timestamp: String,

    /// Who took the lock (pipeline run ID or random UUID).
    pub signer: String,

    /// Provenance of `lock_id` and `signer`.
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl LockRecord {
    /// Create a record with explicit identities and the current timestamp.
    pub fn new(lock_id: impl Into<String>, signer: impl Into<String>) -> Self {
        Self {
            lock_id: lock_id.into(),
            timestamp: now_rfc3339(),
            signer: signer.into(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Build a record from an identity source, applying the fallback chain.
    ///
    /// `lock_id` and `signer` are never empty: when no natural source is
    /// available a random UUID is substituted and the diagnostics say so.
    pub fn generate<I: IdentitySource + ?Sized>(source: &I) -> Self {
        let commit = Provenance::commit(source);
        let signer = Provenance::signer(source);

        let warning = if commit.is_fallback() || signer.is_fallback() {
            FALLBACK_WARNING.to_string()
        } else {
            String::new()
        };

        Self {
            lock_id: commit.value,
            timestamp: now_rfc3339(),
            signer: signer.value,
            diagnostics: Diagnostics {
                commit: commit.note,
                signer: signer.note,
                warning,
            },
        }
    }

    /// Serialize the record to the JSON body stored at the lock key.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate a lock body.
    ///
    /// Returns a human-readable reason on failure; the lock manager turns it
    /// into a corrupt-record error carrying the target.
    pub fn from_json(bytes: &[u8]) -> std::result::Result<Self, String> {
        let record: LockRecord = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.lock_id.trim().is_empty() {
            return Err("lock_id is empty".to_string());
        }
        if self.signer.trim().is_empty() {
            return Err("signer is empty".to_string());
        }
        if self.created_at().is_none() {
            return Err(format!(
                "timestamp '{}' is not an RFC 3339 date",
                self.timestamp
            ));
        }
        Ok(())
    }

    /// Parsed creation time.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Format the age of the lock as a human-readable string.
    pub fn age_string(&self) -> Option<String> {
        let age = Utc::now().signed_duration_since(self.created_at()?);
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        Some(if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        })
    }

    /// Whether either identity came from a fallback source.
    pub fn used_fallback(&self) -> bool {
        self.diagnostics.commit != SOURCE_OK || self.diagnostics.signer != SOURCE_OK
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
