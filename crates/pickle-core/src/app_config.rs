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
    pub completion_url: String,
    pub completion_api_key: String,
    pub completion_timeout_secs: u64,
    pub news_base_url: String,
    pub news_api_key: String,
    pub news_timeout_secs: u64,
    pub email_base_url: String,
    pub email_server_token: String,
    pub email_from: String,
    pub email_timeout_secs: u64,
    pub subscription_ttl_days: i64,
    pub digest_retention_days: i64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub generate_cron: String,
    pub dispatch_cron: String,
    pub housekeeping_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("completion_url", &self.completion_url)
            .field("completion_api_key", &"[redacted]")
            .field("completion_timeout_secs", &self.completion_timeout_secs)
            .field("news_base_url", &self.news_base_url)
            .field("news_api_key", &"[redacted]")
            .field("news_timeout_secs", &self.news_timeout_secs)
            .field("email_base_url", &self.email_base_url)
            .field("email_server_token", &"[redacted]")
            .field("email_from", &self.email_from)
            .field("email_timeout_secs", &self.email_timeout_secs)
            .field("subscription_ttl_days", &self.subscription_ttl_days)
            .field("digest_retention_days", &self.digest_retention_days)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("generate_cron", &self.generate_cron)
            .field("dispatch_cron", &self.dispatch_cron)
            .field("housekeeping_cron", &self.housekeeping_cron)
            .finish()
    }
}
