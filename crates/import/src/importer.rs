use std::io::Write;
use std::path::Path;

use iam_keycloak::{
    CreateUserOutcome, KeycloakAdminClient, KeycloakConfig, KeycloakSessionClient,
    RoleLookup, RoleRepresentation, StatusOutcome,
};

use crate::error::{ImportError, ImportResult};
use crate::record::{self, UserRecord};
use crate::report::ImportReport;

/// How a record was matched to a remote account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserResolution {
    Created(String),
    Existing(String),
}

impl UserResolution {
    pub fn id(&self) -> &str {
        match self {
            UserResolution::Created(id) | UserResolution::Existing(id) => id,
        }
    }
}

/// A realm role as returned by the server, plus whether this run created it.
#[derive(Debug, Clone)]
pub struct EnsuredRole {
    pub role: RoleRepresentation,
    pub created: bool,
}

/// Provisions CSV records into the configured realm. Requests are issued one
/// at a time; the first failure ends the run.
pub struct Importer {
    config: KeycloakConfig,
    client: reqwest::Client,
}

impl Importer {
    pub fn new(config: KeycloakConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Reads the connection settings from `{prefix}*` environment variables,
    /// optionally overriding the target realm.
    pub fn from_env(prefix: &str, realm: Option<&str>) -> ImportResult<Self> {
        let mut builder = KeycloakConfig::builder().with_prefix(prefix);
        if let Some(realm) = realm {
            builder = builder.with_realm(realm);
        }
        let config = builder.build()?;
        log::debug!("{config:?}");
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &KeycloakConfig {
        &self.config
    }

    /// Runs the password grant and returns an admin client bound to the
    /// target realm for the rest of the run.
    pub async fn authenticate(&self) -> ImportResult<KeycloakAdminClient> {
        let token = KeycloakSessionClient::from_config(&self.config, self.client.clone())
            .acquire(self.config.username(), self.config.password())
            .await
            .map_err(|e| {
                log::error!("{e:#?}");
                ImportError::Auth(e)
            })?;
        log::info!(
            "authenticated as '{}' against realm '{}'",
            self.config.username(),
            self.config.admin_realm()
        );
        KeycloakAdminClient::new(
            self.config.address(),
            self.config.realm(),
            self.client.clone(),
            token,
        )
        .map_err(ImportError::Address)
    }

    pub fn load_records(&self, path: impl AsRef<Path>) -> ImportResult<Vec<UserRecord>> {
        record::load_records(path)
    }

    /// Creates the account, or resolves it by username on a 409. The
    /// matching progress line is written as soon as the outcome is known.
    pub async fn create_user<W: Write>(
        &self,
        admin: &KeycloakAdminClient,
        record: &UserRecord,
        out: &mut W,
    ) -> ImportResult<UserResolution> {
        let outcome = admin
            .create_user(&record.to_representation())
            .await
            .map_err(|source| ImportError::UserRequest {
                username: record.username.clone(),
                source,
            })?;
        match outcome {
            CreateUserOutcome::Created(id) => {
                log::info!("user created: {} ({id})", record.username);
                writeln!(out, "User created: {}", record.username)?;
                Ok(UserResolution::Created(id))
            }
            CreateUserOutcome::Conflict => {
                log::info!("user already exists: {}", record.username);
                writeln!(out, "User already exists: {}", record.username)?;
                let id = self.find_user_by_username(admin, &record.username).await?;
                Ok(UserResolution::Existing(id))
            }
            CreateUserOutcome::Failed { status, body } => {
                log::error!("failed to create user {}: {status} {body}", record.username);
                Err(ImportError::CreateUser {
                    username: record.username.clone(),
                    status,
                    body,
                })
            }
        }
    }

    /// Id of the first exact match for `username`.
    pub async fn find_user_by_username(
        &self,
        admin: &KeycloakAdminClient,
        username: &str,
    ) -> ImportResult<String> {
        let users = admin
            .users_by_username(username)
            .await
            .map_err(|source| ImportError::UserLookup {
                username: username.to_string(),
                source,
            })?;
        users
            .into_iter()
            .next()
            .and_then(|user| user.id)
            .ok_or_else(|| ImportError::NotFound {
                username: username.to_string(),
            })
    }

    /// Fetches the realm role, creating it first when the lookup misses.
    pub async fn ensure_role<W: Write>(
        &self,
        admin: &KeycloakAdminClient,
        role_name: &str,
        out: &mut W,
    ) -> ImportResult<EnsuredRole> {
        let lookup = admin
            .realm_role_by_name(role_name)
            .await
            .map_err(ImportError::role_request(role_name))?;
        if let RoleLookup::Found(role) = lookup {
            return Ok(EnsuredRole {
                role,
                created: false,
            });
        }

        let rep = RoleRepresentation {
            name: Some(role_name.to_string()),
            ..RoleRepresentation::default()
        };
        let outcome = admin
            .create_role(&rep)
            .await
            .map_err(ImportError::role_request(role_name))?;
        if let StatusOutcome::Failed { status, body } = outcome {
            log::error!("failed to create role {role_name}: {status} {body}");
            return Err(ImportError::RoleCreate {
                role: role_name.to_string(),
                body,
            });
        }
        log::info!("role created: {role_name}");
        writeln!(out, "Role created: {role_name}")?;

        let lookup = admin
            .realm_role_by_name(role_name)
            .await
            .map_err(ImportError::role_request(role_name))?;
        match lookup {
            RoleLookup::Found(role) => Ok(EnsuredRole {
                role,
                created: true,
            }),
            RoleLookup::Missing { status } => Err(ImportError::RoleCreate {
                role: role_name.to_string(),
                body: format!("role is not readable after creation ({status})"),
            }),
        }
    }

    /// Maps the (ensured) realm role onto the user. Always attempted, even
    /// when the user already holds the role.
    pub async fn assign_role<W: Write>(
        &self,
        admin: &KeycloakAdminClient,
        user_id: &str,
        role_name: &str,
        username: &str,
        out: &mut W,
    ) -> ImportResult<EnsuredRole> {
        let ensured = self.ensure_role(admin, role_name, out).await?;
        let roles = std::slice::from_ref(&ensured.role);
        let outcome = admin
            .add_user_realm_roles(user_id, roles)
            .await
            .map_err(|source| ImportError::RoleAssignRequest {
                role: role_name.to_string(),
                username: username.to_string(),
                source,
            })?;
        match outcome {
            StatusOutcome::Accepted => {
                log::info!("role {role_name} assigned to {username}");
                writeln!(out, "Role {role_name} assigned to {username}")?;
                Ok(ensured)
            }
            StatusOutcome::Failed { status, body } => {
                log::error!("failed to assign role {role_name} to {username}: {status} {body}");
                Err(ImportError::RoleAssign {
                    role: role_name.to_string(),
                    username: username.to_string(),
                    body,
                })
            }
        }
    }

    /// Imports every record of the CSV at `path`, writing progress lines to
    /// `out`. The file is read before any request is made.
    pub async fn run<W: Write>(
        &self,
        path: impl AsRef<Path>,
        out: &mut W,
    ) -> ImportResult<ImportReport> {
        let path = path.as_ref();
        let mut report = ImportReport::default();
        writeln!(out, "Starting Keycloak user import...")?;

        let records = self.load_records(path)?;
        if records.is_empty() {
            writeln!(out, "No user records found in {}", path.display())?;
            return Ok(report);
        }

        let admin = self.authenticate().await?;
        log::info!(
            "importing {} record(s) into realm '{}'",
            records.len(),
            admin.realm()
        );
        for record in &records {
            let user = self.create_user(&admin, record, out).await?;
            match &user {
                UserResolution::Created(_) => report.users_created += 1,
                UserResolution::Existing(_) => report.users_existing += 1,
            }

            let role = self
                .assign_role(&admin, user.id(), &record.role, &record.username, out)
                .await?;
            if role.created {
                report.roles_created += 1;
            }
            report.processed += 1;
        }

        writeln!(out, "Users import completed successfully: {report}")?;
        Ok(report)
    }
}
