//! Environment-supplied configuration, read once at startup.

/// Default base URL for a local development API server.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Process-wide configuration. All values are plain strings from the
/// environment; absent variables yield the default base URL or empty strings,
/// with no validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base API URL every request path is prefixed with.
    pub base_url: String,
    /// Display title for the hosting application.
    pub app_title: String,
    /// Analytics snippet identifier.
    pub analytics_code: String,
    /// ICP filing number shown in the footer.
    pub icp_code: String,
    /// Domain static assets are served from.
    pub asset_domain: String,
}

impl Config {
    /// Reads configuration from the environment, honoring a `.env` file.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            base_url: std::env::var("LLMOPS_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            app_title: std::env::var("LLMOPS_APP_TITLE").unwrap_or_default(),
            analytics_code: std::env::var("LLMOPS_ANALYTICS_CODE").unwrap_or_default(),
            icp_code: std::env::var("LLMOPS_ICP_CODE").unwrap_or_default(),
            asset_domain: std::env::var("LLMOPS_ASSET_DOMAIN").unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            app_title: String::new(),
            analytics_code: String::new(),
            icp_code: String::new(),
            asset_domain: String::new(),
        }
    }
}
