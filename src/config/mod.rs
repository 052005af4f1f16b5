//! Configuration for statectl.
//!
//! The lock target and backend can come from three layers, highest first:
//! - command-line flags (or their environment variables, e.g. `BUCKET_NAME`)
//! - the YAML config file (`.statectl.yaml` by default)
//! - built-in defaults
//!
//! Resolution produces an explicit [`ResolvedTarget`] that is passed into
//! every command; nothing is kept in process-wide state.

mod model;
mod operations;
mod resolve;


// Re-export public API
pub use model::{BackendKind, Config, DEFAULT_CONFIG_FILE, DEFAULT_FS_ROOT};
pub use resolve::{BackendConfig, ResolvedManifest, ResolvedTarget, resolve, resolve_manifest};
