use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::insight::prompt;
use crate::insight::{
    extract_links, parse_prediction, GroundingChunk, GroundingKind, InsightService,
};
use crate::logging::{log_grounding, log_insight_request, log_usage, v_str, ProfileScope};
use crate::types::{GroundedNarrative, Parcel, PredictionResult};

pub struct Gemini {
    client: Client,
    base: String,
    api_key: String,
    insight_model: String,
    maps_model: String,
    search_model: String,
    thinking_budget: u32,
}

impl Gemini {
    pub fn new(cfg: &Config, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow!("missing API_KEY"));
        }
        Ok(Self {
            client: Client::new(),
            base: cfg.genai_base.trim_end_matches('/').to_string(),
            api_key,
            insight_model: cfg.insight_model.clone(),
            maps_model: cfg.maps_model.clone(),
            search_model: cfg.search_model.clone(),
            thinking_budget: cfg.thinking_budget,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base, model)
    }

    async fn generate(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(req)
            .send()
            .await
            .with_context(|| format!("request to {} failed", model))?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(anyhow!("{} HTTP {}: {}", model, status.as_u16(), api_error_message(&body)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .with_context(|| format!("{} returned an unreadable response envelope", model))?;
        if let Some(usage) = &parsed.usage_metadata {
            log_usage(model, usage.prompt_token_count, usage.total_token_count);
        }
        Ok(parsed)
    }

    async fn grounded(
        &self,
        call: &str,
        model: &str,
        text: String,
        tool: Tool,
        kind: GroundingKind,
    ) -> Result<GroundedNarrative> {
        log_insight_request(call, model, text.len());
        let req = GenerateContentRequest::new(text).with_tool(tool);
        let resp = self.generate(model, &req).await?;
        let chunks = resp.grounding_chunks();
        let links = extract_links(chunks, kind);
        log_grounding(call, model, chunks.len(), links.len());
        Ok(GroundedNarrative { text: resp.text(), links })
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

impl GenerateContentRequest {
    fn new(text: String) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text }],
            }],
            generation_config: None,
            tools: Vec::new(),
        }
    }

    fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    fn with_json_schema(mut self, schema: Value, thinking_budget: u32) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema,
            thinking_config: (thinking_budget > 0).then_some(ThinkingConfig { thinking_budget }),
        });
        self
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Tool {
    GoogleMaps {},
    GoogleSearch {},
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u64>,
    #[serde(default)]
    total_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    status: Option<String>,
    message: String,
}

impl GenerateContentResponse {
    /// Answer text of the first candidate, thought parts excluded. `None` when empty.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let joined: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!joined.is_empty()).then_some(joined)
    }

    fn grounding_chunks(&self) -> &[GroundingChunk] {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.as_slice())
            .unwrap_or(&[])
    }
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(status) => format!("{} ({})", env.error.message, status),
            None => env.error.message,
        },
        Err(_) => body.to_string(),
    }
}

// =============================================================================
// Service
// =============================================================================

#[async_trait::async_trait]
impl InsightService for Gemini {
    async fn predictive_insights(&self, parcel: &Parcel) -> Result<PredictionResult> {
        let _scope = ProfileScope::with_context(
            "predictive_insights",
            &[("tracking_id", v_str(&parcel.tracking_id))],
        );
        let text = prompt::insight_prompt(parcel);
        log_insight_request("predictive_insights", &self.insight_model, text.len());
        let req = GenerateContentRequest::new(text)
            .with_json_schema(prompt::prediction_schema(), self.thinking_budget);
        let resp = self.generate(&self.insight_model, &req).await?;
        Ok(parse_prediction(resp.text().as_deref())?)
    }

    async fn maps_context(
        &self,
        current_location: &str,
        destination: &str,
    ) -> Result<GroundedNarrative> {
        let _scope = ProfileScope::new("maps_context");
        let text = prompt::maps_prompt(current_location, destination);
        let model = &self.maps_model;
        self.grounded("maps_context", model, text, Tool::GoogleMaps {}, GroundingKind::Maps)
            .await
    }

    async fn search_grounding(&self, query: &str) -> Result<GroundedNarrative> {
        let _scope = ProfileScope::new("search_grounding");
        let text = prompt::search_prompt(query);
        let model = &self.search_model;
        self.grounded("search_grounding", model, text, Tool::GoogleSearch {}, GroundingKind::Web)
            .await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
