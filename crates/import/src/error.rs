use iam_keycloak::KeycloakHttpError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// The token endpoint refused the admin credentials.
    #[error("failed to acquire admin token: {0}")]
    Auth(#[source] KeycloakHttpError),
    /// The CSV input is missing or malformed.
    #[error("invalid input '{path}': {message}")]
    Input { path: String, message: String },
    #[error("failed to create user {username} ({status}): {body}")]
    CreateUser {
        username: String,
        status: u16,
        body: String,
    },
    /// The create request for a user did not get a usable answer.
    #[error("request to create user {username} failed: {source}")]
    UserRequest {
        username: String,
        #[source]
        source: KeycloakHttpError,
    },
    /// A 409 on create was followed by an empty username search.
    #[error("existing user not found: {username}")]
    NotFound { username: String },
    #[error("failed to look up user {username}: {source}")]
    UserLookup {
        username: String,
        #[source]
        source: KeycloakHttpError,
    },
    #[error("failed to create role {role}: {body}")]
    RoleCreate { role: String, body: String },
    /// Fetching or creating a role did not get a usable answer.
    #[error("request for role {role} failed: {source}")]
    RoleRequest {
        role: String,
        #[source]
        source: KeycloakHttpError,
    },
    #[error("failed to assign role {role} to {username}: {body}")]
    RoleAssign {
        role: String,
        username: String,
        body: String,
    },
    #[error("request to assign role {role} to {username} failed: {source}")]
    RoleAssignRequest {
        role: String,
        username: String,
        #[source]
        source: KeycloakHttpError,
    },
    #[error("invalid identity server address: {0}")]
    Address(#[source] KeycloakHttpError),
    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),
    #[error("unable to write progress: {0}")]
    Output(#[from] std::io::Error),
}

pub type ImportResult<T> = Result<T, ImportError>;

impl ImportError {
    pub(crate) fn input(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        ImportError::Input {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn role_request(role: &str) -> impl FnOnce(KeycloakHttpError) -> Self + '_ {
        move |source| ImportError::RoleRequest {
            role: role.to_string(),
            source,
        }
    }
}
