use std::io::Read;
use std::path::Path;

use iam_keycloak::{CredentialRepresentation, UserRepresentation};
use serde::Deserialize;

use crate::error::{ImportError, ImportResult};

/// Header names every input file has to provide.
pub const REQUIRED_COLUMNS: [&str; 5] = ["username", "email", "lastName", "password", "role"];

/// One data row of the import file.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("last_name", &self.last_name)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

impl UserRecord {
    /// Creation payload: enabled, email verified, first name set to the
    /// username and a single non-temporary password.
    pub fn to_representation(&self) -> UserRepresentation {
        UserRepresentation {
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            first_name: Some(self.username.clone()),
            last_name: Some(self.last_name.clone()),
            enabled: Some(true),
            email_verified: Some(true),
            credentials: Some(vec![CredentialRepresentation {
                type_: Some("password".to_string()),
                value: Some(self.password.clone()),
                temporary: Some(false),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }
}

/// Loads every record of the CSV file at `path`, in file order.
pub fn load_records(path: impl AsRef<Path>) -> ImportResult<Vec<UserRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ImportError::input(path, e))?;
    read_records(file, path)
}

/// Parses records from any reader; `source` only names the input in errors.
pub fn read_records<R: Read>(
    reader: R,
    source: impl AsRef<Path>,
) -> ImportResult<Vec<UserRecord>> {
    let source = source.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ImportError::input(source, format!("failed to read header row: {e}")))?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::input(
            source,
            format!("missing required column(s): {}", missing.join(", ")),
        ));
    }

    let mut records = Vec::new();
    for result in reader.deserialize::<UserRecord>() {
        let record = result.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line().to_string())
                .unwrap_or_else(|| "?".to_string());
            ImportError::input(source, format!("line {line}: {e}"))
        })?;
        records.push(record);
    }
    log::debug!("read {} record(s) from {}", records.len(), source.display());
    Ok(records)
}
