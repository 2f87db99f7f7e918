//! Durable per-project todo state: config, atomic persistence, the state
//! manager and the retention sweep.

pub mod atomic;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod log;
pub mod paths;
pub mod project;
pub mod state;

pub use atomic::{read_json, stage, write_atomic, write_json, StagedWrite};
pub use cleanup::{cleanup, plan_cleanup, sweep_stale_temps, StaleDocument, TEMP_FILE_MAX_AGE};
pub use config::{retention_days_to_duration, StoreConfig};
pub use error::StoreError;
pub use log::DebugLog;
pub use paths::StorePaths;
pub use project::{project_id, project_name, ProjectKey, PROJECT_DIR_ENV};
pub use state::{decode_document, now_rfc3339, StateManager, SESSION_ID_ENV};
