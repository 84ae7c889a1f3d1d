use std::env;

use url::Url;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_INITIAL_STATUS_KEY: &str = "not_started";

/// Connection settings for the hosted Postgres REST endpoint.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: Url,
    pub service_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_org_id: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Url,
    pub llm_timeout_secs: u64,
    pub initial_status_key: String,
    pub store: Option<StoreConfig>,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns the name of the first variable that is missing or malformed.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns the name of the first variable that is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "OPENAI_API_KEY: environment variable not found".to_string())?;

        let base_raw =
            lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        let openai_base_url =
            Url::parse(&base_raw).map_err(|e| format!("OPENAI_BASE_URL: {e}"))?;

        let llm_timeout_secs = match lookup("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("LLM_TIMEOUT_SECS: {e}"))?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        let store = match lookup("SUPABASE_URL") {
            Some(raw) => {
                let url = Url::parse(&raw).map_err(|e| format!("SUPABASE_URL: {e}"))?;
                let service_key = lookup("SUPABASE_SERVICE_KEY").ok_or_else(|| {
                    "SUPABASE_SERVICE_KEY: required when SUPABASE_URL is set".to_string()
                })?;
                Some(StoreConfig { url, service_key })
            }
            None => None,
        };

        Ok(Self {
            openai_api_key,
            openai_org_id: lookup("OPENAI_ORG_ID"),
            openai_model: lookup("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url,
            llm_timeout_secs,
            initial_status_key: lookup("INITIAL_STATUS_KEY")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_INITIAL_STATUS_KEY.to_string()),
            store,
        })
    }
}
