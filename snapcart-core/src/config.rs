//! Process configuration, read once from the environment at startup.
//!
//! Components never read environment variables at call time; everything
//! they need arrives through an [`AppConfig`] constructed in `main` and
//! shared by `Arc`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Default storefront domain when `STORE_DOMAIN` is unset.
const DEFAULT_STORE_DOMAIN: &str = "www.shopbiolinkdepot.org";

/// Default commerce platform API base when `COMMERCE_API_BASE` is unset.
const DEFAULT_API_BASE: &str = "https://commerce.zoho.com";

/// One method of obtaining catalog data. The orchestration over
/// strategies is driven by an ordered list of these, not by code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Credentialed commerce platform API.
    CommerceApi,
    /// Unauthenticated storefront search API.
    StorefrontSearch,
    /// Best-effort HTML scrape of the storefront search page.
    SiteScrape,
    /// Fixed, hardcoded catalog entries. Last resort only.
    StaticList,
}

impl Strategy {
    /// The default strategy order: dynamic sources first, static last.
    pub fn default_order() -> Vec<Strategy> {
        vec![
            Strategy::CommerceApi,
            Strategy::StorefrontSearch,
            Strategy::SiteScrape,
            Strategy::StaticList,
        ]
    }
}

/// Whether the pipeline auto-selects a best match or returns a candidate
/// list for the user to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Pick the single best match automatically.
    #[default]
    Auto,
    /// Present candidates and let the user confirm.
    Candidates,
}

/// Credentials for the authenticated commerce API. The strategy is
/// skipped entirely unless all three are present.
#[derive(Debug, Clone)]
pub struct CommerceCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
}

/// Process-wide configuration. Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenAI API key for the vision and ranking calls. When absent,
    /// identification short-circuits with a "service not configured"
    /// error instead of attempting the call.
    pub openai_api_key: Option<String>,
    /// Storefront domain, e.g. `www.shopbiolinkdepot.org`.
    pub store_domain: String,
    /// Commerce platform API base, e.g. `https://commerce.zoho.com`.
    pub api_base: String,
    /// Authenticated commerce API credentials, when fully configured.
    pub commerce: Option<CommerceCredentials>,
    /// Enabled catalog strategies, in the order they are tried.
    pub strategies: Vec<Strategy>,
    pub match_mode: MatchMode,
    /// Accept a "closest, not exact" fallback match in the final
    /// aggregate pass instead of requiring user confirmation.
    pub allow_fallback_match: bool,
    /// Gate `/upload` on the presence of a storefront session cookie.
    pub require_store_login: bool,
    /// Maximum candidates returned in [`MatchMode::Candidates`].
    pub max_candidates: usize,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            store_domain: DEFAULT_STORE_DOMAIN.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            commerce: None,
            strategies: Strategy::default_order(),
            match_mode: MatchMode::Auto,
            allow_fallback_match: false,
            require_store_login: false,
            max_candidates: 10,
            port: 5000,
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is present
    /// but uninterpretable (`MATCH_MODE`, `PORT`). Absent optional
    /// variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.openai_api_key = non_empty_var("OPENAI_API_KEY");

        if let Some(domain) = non_empty_var("STORE_DOMAIN") {
            config.store_domain = domain;
        }
        if let Some(base) = non_empty_var("COMMERCE_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        config.commerce = Self::commerce_from_env();

        if let Some(mode) = non_empty_var("MATCH_MODE") {
            config.match_mode = match mode.to_lowercase().as_str() {
                "auto" => MatchMode::Auto,
                "candidates" => MatchMode::Candidates,
                other => {
                    return Err(ConfigError::InvalidValue {
                        variable: "MATCH_MODE".to_string(),
                        message: format!("expected 'auto' or 'candidates', got '{other}'"),
                    });
                }
            };
        }

        config.allow_fallback_match = flag_var("ALLOW_FALLBACK_MATCH");
        config.require_store_login = flag_var("REQUIRE_STORE_LOGIN");

        if let Some(port) = non_empty_var("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                variable: "PORT".to_string(),
                message: format!("expected a port number, got '{port}'"),
            })?;
        }

        Ok(config)
    }

    /// Commerce credentials require all three variables. A partial set is
    /// treated as unconfigured, with a warning naming what is missing.
    fn commerce_from_env() -> Option<CommerceCredentials> {
        let client_id = non_empty_var("COMMERCE_CLIENT_ID");
        let client_secret = non_empty_var("COMMERCE_CLIENT_SECRET");
        let access_token = non_empty_var("COMMERCE_ACCESS_TOKEN");

        match (client_id, client_secret, access_token) {
            (Some(client_id), Some(client_secret), Some(access_token)) => {
                Some(CommerceCredentials { client_id, client_secret, access_token })
            }
            (None, None, None) => None,
            (id, secret, token) => {
                warn!(
                    client_id = id.is_some(),
                    client_secret = secret.is_some(),
                    access_token = token.is_some(),
                    "partial commerce credentials; authenticated API disabled"
                );
                None
            }
        }
    }

    /// The absolute origin of the storefront, for resolving relative
    /// product URLs.
    pub fn store_origin(&self) -> String {
        format!("https://{}", self.store_domain)
    }
}

/// Read a variable, trimming stray whitespace and newlines that tend to
/// sneak into pasted credentials. Empty values count as unset.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Boolean flag variable: `1`, `true`, `yes` (any case) enable it.
fn flag_var(name: &str) -> bool {
    non_empty_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
