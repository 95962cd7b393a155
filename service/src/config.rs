use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl fmt::Display for RustEnvParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected one of: development, production, staging")
    }
}

impl StdError for RustEnvParseError {}

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth client ID issued by the identity provider.
    #[arg(long, env)]
    client_id: Option<String>,

    /// The OAuth client secret issued by the identity provider.
    #[arg(long, env, hide_env_values = true)]
    client_secret: Option<String>,

    /// The callback URL registered with the identity provider. Must point at this
    /// service's `/callback` route.
    #[arg(long, env)]
    redirect_uri: Option<String>,

    /// Where to send the browser after a successful callback when `/auth` was called
    /// without a `return_url`.
    #[arg(long, env, default_value = "http://localhost:3000")]
    default_return_url: String,

    /// OAuth scopes requested on the consent screen.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "openid,email,profile"
    )]
    pub scopes: Vec<String>,

    /// Override for the identity provider's authorization endpoint.
    /// Unset means the provider's own default.
    #[arg(long, env)]
    auth_url: Option<String>,

    /// Override for the identity provider's token endpoint.
    #[arg(long, env)]
    token_url: Option<String>,

    /// Override for the identity provider's userinfo endpoint.
    #[arg(long, env)]
    userinfo_url: Option<String>,

    /// Timeout in seconds for each request made to the identity provider
    #[arg(long, env, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub provider_timeout_secs: u64,

    /// Seconds an authorization attempt may stay pending before its state is rejected
    #[arg(long, env, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    pub state_ttl_secs: u64,

    /// Seconds between sweeps of expired pending states
    #[arg(long, env, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub state_sweep_interval_secs: u64,

    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .try_map(|s| s.parse::<LevelFilter>()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .try_map(|s| s.parse::<RustEnv>()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn set_client_id(mut self, client_id: String) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn set_client_secret(mut self, client_secret: String) -> Self {
        self.client_secret = Some(client_secret);
        self
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    pub fn set_redirect_uri(mut self, redirect_uri: String) -> Self {
        self.redirect_uri = Some(redirect_uri);
        self
    }

    /// Returns the return URL used when a flow is started without one.
    pub fn default_return_url(&self) -> &str {
        &self.default_return_url
    }

    pub fn set_default_return_url(mut self, default_return_url: String) -> Self {
        self.default_return_url = default_return_url;
        self
    }

    pub fn auth_url(&self) -> Option<&str> {
        self.auth_url.as_deref()
    }

    pub fn token_url(&self) -> Option<&str> {
        self.token_url.as_deref()
    }

    pub fn userinfo_url(&self) -> Option<&str> {
        self.userinfo_url.as_deref()
    }

    /// Point all three provider endpoints at `base_url` (`/auth`, `/token`, `/userinfo`).
    pub fn set_provider_base_url(mut self, base_url: &str) -> Self {
        self.auth_url = Some(format!("{base_url}/auth"));
        self.token_url = Some(format!("{base_url}/token"));
        self.userinfo_url = Some(format!("{base_url}/userinfo"));
        self
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_secs)
    }

    pub fn state_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.state_sweep_interval_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const BIN: &str = "oauth_relay";

    #[test]
    #[serial]
    fn test_defaults() {
        let config = Config::try_parse_from([BIN]).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.interface, "127.0.0.1");
        assert_eq!(config.default_return_url(), "http://localhost:3000");
        assert_eq!(config.scopes, vec!["openid", "email", "profile"]);
        assert_eq!(config.token_url(), None);
        assert_eq!(config.state_ttl_secs, 600);
        assert_eq!(config.state_sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.log_level_filter, LevelFilter::Info);
        assert_eq!(config.runtime_env(), RustEnv::Development);
    }

    #[test]
    #[serial]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            BIN,
            "--client-id",
            "client-123",
            "--redirect-uri",
            "https://relay.example/callback",
            "--scopes",
            "openid,email",
            "--port",
            "8080",
            "--log-level-filter",
            "DEBUG",
            "--runtime-env",
            "PRODUCTION",
        ])
        .unwrap();

        assert_eq!(config.client_id(), Some("client-123"));
        assert_eq!(config.redirect_uri(), Some("https://relay.example/callback"));
        assert_eq!(config.scopes, vec!["openid", "email"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert_eq!(config.runtime_env(), RustEnv::Production);
    }

    #[test]
    #[serial]
    fn test_environment_variables_are_read() {
        env::set_var("DEFAULT_RETURN_URL", "https://app.example/dash");
        env::set_var("CLIENT_SECRET", "shh");

        let config = Config::try_parse_from([BIN]).unwrap();

        env::remove_var("DEFAULT_RETURN_URL");
        env::remove_var("CLIENT_SECRET");

        assert_eq!(config.default_return_url(), "https://app.example/dash");
        assert_eq!(config.client_secret(), Some("shh"));
    }

    #[test]
    #[serial]
    fn test_invalid_runtime_env_is_rejected() {
        assert!(Config::try_parse_from([BIN, "--runtime-env", "qa"]).is_err());
    }

    #[test]
    #[serial]
    fn test_zero_durations_are_rejected() {
        for flag in [
            "--state-sweep-interval-secs",
            "--state-ttl-secs",
            "--provider-timeout-secs",
        ] {
            assert!(
                Config::try_parse_from([BIN, flag, "0"]).is_err(),
                "{flag} accepted 0"
            );
        }
        let config = Config::try_parse_from([BIN, "--state-sweep-interval-secs", "1"]).unwrap();
        assert_eq!(config.state_sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    #[serial]
    fn test_set_provider_base_url() {
        let config = Config::try_parse_from([BIN])
            .unwrap()
            .set_provider_base_url("http://127.0.0.1:1234");

        assert_eq!(config.auth_url(), Some("http://127.0.0.1:1234/auth"));
        assert_eq!(config.token_url(), Some("http://127.0.0.1:1234/token"));
        assert_eq!(config.userinfo_url(), Some("http://127.0.0.1:1234/userinfo"));
    }

    #[test]
    fn test_rust_env_round_trips_through_display() {
        for env in [RustEnv::Development, RustEnv::Production, RustEnv::Staging] {
            assert_eq!(env.to_string().parse::<RustEnv>(), Ok(env));
        }
    }
}
