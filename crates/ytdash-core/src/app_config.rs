use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// `None` disables every fetch action until a key is configured.
    pub youtube_api_key: Option<String>,
    pub youtube_base_url: String,
    pub youtube_timeout_secs: u64,
    pub user_agent: String,
    pub max_videos_per_channel: usize,
    pub session_ttl_secs: u64,
    pub allowed_email_domains: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "youtube_api_key",
                &self.youtube_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("youtube_base_url", &self.youtube_base_url)
            .field("youtube_timeout_secs", &self.youtube_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_videos_per_channel", &self.max_videos_per_channel)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("allowed_email_domains", &self.allowed_email_domains)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
