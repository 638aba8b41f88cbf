use std::sync::Arc;

pub use keycloak::types::{CredentialRepresentation, RoleRepresentation, UserRepresentation};
use reqwest::{header::LOCATION, StatusCode, Url};

use crate::session::{decode, error_check, AccessToken, KeycloakHttpError};

/// Result of `POST /admin/realms/{realm}/users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserOutcome {
    /// 201 with the id taken from the `Location` header.
    Created(String),
    /// 409, the username is taken.
    Conflict,
    Failed { status: u16, body: String },
}

/// Result of `GET /admin/realms/{realm}/roles/{role-name}`.
#[derive(Debug, Clone)]
pub enum RoleLookup {
    Found(RoleRepresentation),
    /// Any non-200 answer.
    Missing { status: u16 },
}

/// Result of a write that has no meaningful response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    Accepted,
    Failed { status: u16, body: String },
}

impl StatusOutcome {
    async fn from_response(
        response: reqwest::Response,
        accepted: &[StatusCode],
    ) -> Result<Self, KeycloakHttpError> {
        let status = response.status();
        if accepted.contains(&status) {
            return Ok(StatusOutcome::Accepted);
        }
        Ok(StatusOutcome::Failed {
            status: status.as_u16(),
            body: response.text().await?,
        })
    }
}

/// Extracts the resource id from a `Location` header value.
pub fn id_from_location(location: &str) -> Option<&str> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
}

struct Inner {
    admin_url: Url,
    realm: Arc<str>,
    client: reqwest::Client,
    token: AccessToken,
}

/// Admin API handle scoped to one realm and one bearer token.
#[derive(Clone)]
pub struct KeycloakAdminClient {
    inner: Arc<Inner>,
}

impl KeycloakAdminClient {
    pub fn new(
        address: &str,
        realm: &str,
        client: reqwest::Client,
        token: AccessToken,
    ) -> Result<Self, KeycloakHttpError> {
        let mut admin_url =
            Url::parse(address).map_err(|e| KeycloakHttpError::Url(format!("{address}: {e}")))?;
        admin_url
            .path_segments_mut()
            .map_err(|_| KeycloakHttpError::Url(address.to_string()))?
            .pop_if_empty()
            .extend(["admin", "realms", realm]);
        Ok(Self {
            inner: Arc::new(Inner {
                admin_url,
                realm: Arc::from(realm),
                client,
                token,
            }),
        })
    }

    pub fn realm(&self) -> &str {
        &self.inner.realm
    }

    fn url<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.inner.admin_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .get(url)
            .bearer_auth(self.inner.token.as_str())
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .post(url)
            .bearer_auth(self.inner.token.as_str())
    }

    pub async fn create_user(
        &self,
        user: &UserRepresentation,
    ) -> Result<CreateUserOutcome, KeycloakHttpError> {
        let response = self.post(self.url(["users"])).json(user).send().await?;
        let status = response.status();
        log::debug!("create user {:?}: {status}", user.username);
        match status {
            StatusCode::CREATED => {
                let id = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(id_from_location)
                    .map(String::from);
                match id {
                    Some(id) => Ok(CreateUserOutcome::Created(id)),
                    None => Ok(CreateUserOutcome::Failed {
                        status: status.as_u16(),
                        body: "response carries no usable Location header".to_string(),
                    }),
                }
            }
            StatusCode::CONFLICT => Ok(CreateUserOutcome::Conflict),
            _ => Ok(CreateUserOutcome::Failed {
                status: status.as_u16(),
                body: response.text().await?,
            }),
        }
    }

    pub async fn users_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<UserRepresentation>, KeycloakHttpError> {
        let response = self
            .get(self.url(["users"]))
            .query(&[("username", username), ("exact", "true")])
            .send()
            .await?;
        let body = error_check(response).await?.bytes().await?;
        decode(&body)
    }

    pub async fn realm_role_by_name(
        &self,
        role_name: &str,
    ) -> Result<RoleLookup, KeycloakHttpError> {
        let response = self.get(self.url(["roles", role_name])).send().await?;
        let status = response.status();
        log::debug!("lookup role '{role_name}': {status}");
        if status != StatusCode::OK {
            return Ok(RoleLookup::Missing {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        Ok(RoleLookup::Found(decode(&body)?))
    }

    /// 201 and 204 both count as created.
    pub async fn create_role(
        &self,
        role: &RoleRepresentation,
    ) -> Result<StatusOutcome, KeycloakHttpError> {
        let response = self.post(self.url(["roles"])).json(role).send().await?;
        StatusOutcome::from_response(response, &[StatusCode::CREATED, StatusCode::NO_CONTENT])
            .await
    }

    /// Only 204 counts as success.
    pub async fn add_user_realm_roles(
        &self,
        user_id: &str,
        roles: &[RoleRepresentation],
    ) -> Result<StatusOutcome, KeycloakHttpError> {
        let url = self.url(["users", user_id, "role-mappings", "realm"]);
        let response = self.post(url).json(roles).send().await?;
        StatusOutcome::from_response(response, &[StatusCode::NO_CONTENT]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn admin(server: &MockServer) -> KeycloakAdminClient {
        KeycloakAdminClient::new(
            &server.uri(),
            "library-realm",
            reqwest::Client::new(),
            AccessToken::new("tkn"),
        )
        .unwrap()
    }

    #[test]
    fn location_id_is_last_segment() {
        assert_eq!(
            id_from_location("http://kc/admin/realms/r/users/5f0c-11"),
            Some("5f0c-11")
        );
        assert_eq!(id_from_location("http://kc/admin/realms/r/users/abc/"), Some("abc"));
        assert_eq!(id_from_location(""), None);
    }

    #[tokio::test]
    async fn create_user_reads_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/realms/library-realm/users"))
            .and(header("authorization", "Bearer tkn"))
            .respond_with(ResponseTemplate::new(201).insert_header(
                "Location",
                format!("{}/admin/realms/library-realm/users/u-1", server.uri()).as_str(),
            ))
            .mount(&server)
            .await;
        let user = UserRepresentation {
            username: Some("jdoe".to_string()),
            ..Default::default()
        };
        let outcome = admin(&server).create_user(&user).await.unwrap();
        assert_eq!(outcome, CreateUserOutcome::Created("u-1".to_string()));
    }

    #[tokio::test]
    async fn create_user_maps_conflict_and_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/realms/library-realm/users"))
            .respond_with(ResponseTemplate::new(409))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/admin/realms/library-realm/users"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad email"))
            .mount(&server)
            .await;
        let client = admin(&server);
        let user = UserRepresentation::default();
        assert_eq!(
            client.create_user(&user).await.unwrap(),
            CreateUserOutcome::Conflict
        );
        assert_eq!(
            client.create_user(&user).await.unwrap(),
            CreateUserOutcome::Failed {
                status: 400,
                body: "bad email".to_string()
            }
        );
    }

    #[tokio::test]
    async fn users_by_username_uses_exact_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/library-realm/users"))
            .and(query_param("username", "jdoe"))
            .and(query_param("exact", "true"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "id": "u-7", "username": "jdoe" }])),
            )
            .expect(1)
            .mount(&server)
            .await;
        let users = admin(&server).users_by_username("jdoe").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id.as_deref(), Some("u-7"));
    }

    #[tokio::test]
    async fn role_names_are_path_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/library-realm/roles/staff%20member"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "r-1", "name": "staff member" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        match admin(&server).realm_role_by_name("staff member").await.unwrap() {
            RoleLookup::Found(role) => assert_eq!(role.name.as_deref(), Some("staff member")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn role_mapping_requires_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/realms/library-realm/users/u-1/role-mappings/realm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok?"))
            .mount(&server)
            .await;
        let outcome = admin(&server)
            .add_user_realm_roles("u-1", &[RoleRepresentation::default()])
            .await
            .unwrap();
        assert_eq!(
            outcome,
            StatusOutcome::Failed {
                status: 200,
                body: "ok?".to_string()
            }
        );
    }

    #[tokio::test]
    async fn undecodable_role_keeps_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/realms/library-realm/roles/member"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;
        let err = admin(&server)
            .realm_role_by_name("member")
            .await
            .unwrap_err();
        assert!(
            matches!(&err, KeycloakHttpError::Decode { body, .. } if body == "<html>proxy</html>"),
            "{err:?}"
        );
        assert!(err.to_string().contains("<html>proxy</html>"));
    }
}
