use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub genai_base: String,
    pub insight_model: String,
    pub maps_model: String,
    pub search_model: String,
    pub thinking_budget: u32,
    /// Upper bound on the combined three-way request. `None` waits indefinitely.
    pub analysis_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            genai_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            insight_model: "gemini-3-pro-preview".to_string(),
            maps_model: "gemini-2.5-flash-lite-latest".to_string(),
            search_model: "gemini-3-flash-preview".to_string(),
            thinking_budget: 32_768,
            analysis_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.trim().is_empty()),
            genai_base: std::env::var("GENAI_BASE").unwrap_or(d.genai_base),
            insight_model: std::env::var("INSIGHT_MODEL").unwrap_or(d.insight_model),
            maps_model: std::env::var("MAPS_MODEL").unwrap_or(d.maps_model),
            search_model: std::env::var("SEARCH_MODEL").unwrap_or(d.search_model),
            thinking_budget: std::env::var("THINKING_BUDGET")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(d.thinking_budget),
            analysis_timeout: std::env::var("ANALYSIS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
