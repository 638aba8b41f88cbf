use std::sync::Arc;

#[derive(Default)]
pub struct ConfigBuilder<'a> {
    prefix: Option<&'a str>,
    address: Option<&'a str>,
    realm: Option<&'a str>,
}

impl<'a> ConfigBuilder<'a> {
    pub fn with_prefix(mut self, prefix: &'a str) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Overrides the server address read from the environment.
    pub fn with_address(mut self, address: &'a str) -> Self {
        self.address = Some(address);
        self
    }

    /// Overrides the target realm read from the environment.
    pub fn with_realm(mut self, realm: &'a str) -> Self {
        self.realm = Some(realm);
        self
    }

    pub fn build(self) -> envy::Result<Config> {
        let mut cfg: Config = if let Some(prefix) = self.prefix {
            envy::prefixed(prefix)
        } else {
            envy::prefixed("KEYCLOAK_")
        }
        .from_env()?;
        if let Some(address) = self.address {
            cfg.address = Some(Arc::from(address));
        }
        if let Some(realm) = self.realm {
            cfg.realm = Some(Arc::from(realm));
        }
        if cfg.realm.is_none() {
            cfg.realm = Some("library-realm".into());
        }
        if cfg.admin_realm.is_none() {
            cfg.admin_realm = Some("master".into());
        }
        if cfg.client_id.is_none() {
            cfg.client_id = Some("admin-cli".into());
        }
        if cfg.username.is_none() {
            cfg.username = Some("admin".into());
        }
        if cfg.password.is_none() {
            cfg.password = Some("admin".into());
        }
        let address = match cfg.address.take() {
            Some(address) => address,
            None => {
                let host = cfg.host.as_deref().unwrap_or("localhost");
                let port = cfg.port.unwrap_or(8080);
                Arc::from(format!("http://{}:{}", host, port))
            }
        };
        cfg.address = Some(Arc::from(address.trim_end_matches('/')));
        Ok(cfg)
    }
}

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    realm: Option<Arc<str>>,
    admin_realm: Option<Arc<str>>,
    client_id: Option<Arc<str>>,
    username: Option<Arc<str>>,
    password: Option<Arc<str>>,
    host: Option<Arc<str>>,
    port: Option<u16>,
    address: Option<Arc<str>>,
}

impl Config {
    pub fn new() -> envy::Result<Self> {
        ConfigBuilder::default().build()
    }

    pub fn builder<'a>() -> ConfigBuilder<'a> {
        ConfigBuilder::default()
    }

    pub fn realm(&self) -> &str {
        self.realm.as_deref().unwrap_or("library-realm")
    }

    pub fn admin_realm(&self) -> &str {
        self.admin_realm.as_deref().unwrap_or("master")
    }

    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or("admin-cli")
    }

    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or("http://localhost:8080")
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("admin")
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or("admin")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address())
            .field("realm", &self.realm())
            .field("admin_realm", &self.admin_realm())
            .field("client_id", &self.client_id())
            .field("username", &self.username())
            .field("password", &"***")
            .finish()
    }
}
