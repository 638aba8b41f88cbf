//! # iam-import
//!
//! Reads user records from a CSV file and provisions them in a Keycloak
//! realm: every row becomes one account (or resolves to the existing one on
//! re-runs) holding the realm role named in the row.
//!
//! The first failure aborts the whole import; there is no per-row
//! isolation and no retry.
mod error;
mod importer;
pub mod record;
mod report;

pub use error::{ImportError, ImportResult};
pub use importer::{EnsuredRole, Importer, UserResolution};
pub use record::{load_records, read_records, UserRecord, REQUIRED_COLUMNS};
pub use report::ImportReport;
