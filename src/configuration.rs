use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// How refresh tokens are written to the `refresh_tokens` table.
///
/// `Plaintext` keeps the raw signed token. `Sha256` stores a hex
/// fingerprint instead; switching an existing deployment invalidates every
/// stored refresh token.
#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenStorage {
    #[default]
    Plaintext,
    Sha256,
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,   // seconds (900 = 15 minutes)
    pub refresh_token_expiry: i64,  // seconds (604800 = 7 days)
    #[serde(default)]
    pub refresh_token_storage: RefreshTokenStorage,
}

impl JwtSettings {
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_expiry)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_token_expiry)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt token expiry must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load settings from `configuration.yaml` (optional) and `APP_*` environment
/// variables, e.g. `APP_JWT__SECRET=...` or `APP_APPLICATION__PORT=8080`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;

    settings
        .jwt
        .validate()
        .map_err(|e| config::ConfigError::Message(e.to_string()))?;

    Ok(settings)
}
