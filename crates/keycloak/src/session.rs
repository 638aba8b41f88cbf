use std::sync::Arc;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum KeycloakHttpError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("keycloak responded with {status}: {text}")]
    HttpFailure { status: u16, text: Arc<str> },
    #[error("unable to decode keycloak response ({source}): {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("invalid keycloak url '{0}'")]
    Url(String),
}

impl KeycloakHttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            KeycloakHttpError::HttpFailure { status, .. } => Some(*status),
            KeycloakHttpError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Deserializes a response body, keeping the raw text when it is not the
/// expected JSON.
pub(crate) fn decode<T>(body: &[u8]) -> Result<T, KeycloakHttpError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|source| KeycloakHttpError::Decode {
        source,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

pub(crate) async fn error_check(
    response: reqwest::Response,
) -> Result<reqwest::Response, KeycloakHttpError> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        return Err(KeycloakHttpError::HttpFailure {
            status,
            text: Arc::from(text),
        });
    }

    Ok(response)
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: Arc<str>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Bearer credential for the admin API. Lives for one import run and is
/// never refreshed.
#[derive(Clone)]
pub struct AccessToken {
    value: Arc<str>,
    expires_in: Option<u64>,
}

impl AccessToken {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self {
            value: value.into(),
            expires_in: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Lifetime in seconds as reported by the token endpoint.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"***")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

struct KeycloakSessionClientInner {
    url: Arc<str>,
    realm: Arc<str>,
    client_id: Arc<str>,
    client: reqwest::Client,
}

/// Talks to the OpenID Connect token endpoint of the admin realm.
#[derive(Clone)]
pub struct KeycloakSessionClient {
    inner: Arc<KeycloakSessionClientInner>,
}

impl KeycloakSessionClient {
    pub fn new<T>(url: T, realm: T, client_id: T, client: reqwest::Client) -> Self
    where
        T: Into<String>,
    {
        Self {
            inner: Arc::new(KeycloakSessionClientInner {
                url: Arc::from(url.into()),
                realm: Arc::from(realm.into()),
                client_id: Arc::from(client_id.into()),
                client,
            }),
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self::new(
            config.address(),
            config.admin_realm(),
            config.client_id(),
            client,
        )
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.inner.url, self.inner.realm
        )
    }

    /// Runs the password grant for the given admin credentials.
    pub async fn acquire(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, KeycloakHttpError> {
        log::debug!(
            "requesting admin token for '{username}' from realm '{}'",
            self.inner.realm
        );
        let response = self
            .inner
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "password"),
                ("client_id", &*self.inner.client_id),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;
        let body = error_check(response).await?.bytes().await?;
        let token: TokenResponse = decode(&body)?;
        log::debug!(
            "acquired {} token, expires in {:?}s",
            token.token_type.as_deref().unwrap_or("bearer"),
            token.expires_in
        );
        Ok(AccessToken {
            value: token.access_token,
            expires_in: token.expires_in,
        })
    }
}
