/// Credentials for the Reddit OAuth client-credentials flow.
///
/// The Reddit source is only registered when all three values are present;
/// running without them simply leaves Reddit out of the source registry.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub newsapi_api_key: String,
    pub newsapi_language: String,
    pub reddit: Option<RedditCredentials>,
    pub wikipedia_project: String,
    pub wikipedia_access: String,
    pub wikipedia_agent: String,
    pub http_user_agent: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
    pub history_limit: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("newsapi_api_key", &"[redacted]")
            .field("newsapi_language", &self.newsapi_language)
            .field("reddit", &self.reddit.as_ref().map(|_| "[redacted]"))
            .field("wikipedia_project", &self.wikipedia_project)
            .field("wikipedia_access", &self.wikipedia_access)
            .field("wikipedia_agent", &self.wikipedia_agent)
            .field("http_user_agent", &self.http_user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_capacity", &self.cache_capacity)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
