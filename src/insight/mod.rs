//! Facade over the external generative service.
//!
//! Three independent calls per parcel: a structured delay-risk analysis, a
//! maps-grounded route narrative, and a search-grounded news narrative. Each call
//! normalizes its response into domain types; [`combined::run_analysis`] joins them.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::types::{GroundedNarrative, Parcel, PredictionResult};

pub mod combined;
mod gemini;
mod null;
pub mod prompt;

pub use gemini::Gemini;
pub use null::OfflineInsights;

/// The structured-analysis call produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisFailure {
    #[error("analysis failed: response carried no text payload")]
    EmptyPayload,
    #[error("analysis failed: payload does not match the prediction schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("analysis failed: delay probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),
}

#[async_trait]
pub trait InsightService: Send + Sync {
    /// Structured delay-risk report for `parcel`.
    async fn predictive_insights(&self, parcel: &Parcel) -> Result<PredictionResult>;

    /// Route and traffic narrative with map links. An empty link list is not an error.
    async fn maps_context(&self, current_location: &str, destination: &str)
        -> Result<GroundedNarrative>;

    /// Current-events narrative with web links. An empty link list is not an error.
    async fn search_grounding(&self, query: &str) -> Result<GroundedNarrative>;

    fn name(&self) -> &str;
}

/// Live client when a credential is configured, otherwise the offline stub.
pub fn build(cfg: &Config) -> Result<Arc<dyn InsightService>> {
    match &cfg.api_key {
        Some(key) => Ok(Arc::new(Gemini::new(cfg, key.clone())?)),
        None => Ok(Arc::new(OfflineInsights)),
    }
}

/// Decode the structured-analysis payload. All fields are required, the risk level
/// must be one of the four known values and the probability must lie in [0, 1].
pub fn parse_prediction(text: Option<&str>) -> Result<PredictionResult, AnalysisFailure> {
    let text = match text.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return Err(AnalysisFailure::EmptyPayload),
    };
    let result: PredictionResult = serde_json::from_str(text)?;
    let p = result.delay_probability;
    if !(0.0..=1.0).contains(&p) {
        return Err(AnalysisFailure::ProbabilityOutOfRange(p));
    }
    Ok(result)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GroundingSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One citation from a grounded response. Either side may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<GroundingSource>,
    #[serde(default)]
    pub maps: Option<GroundingSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundingKind {
    Maps,
    Web,
}

/// URIs of the given kind, in response order. Chunks without one are skipped.
pub fn extract_links(chunks: &[GroundingChunk], kind: GroundingKind) -> Vec<String> {
    chunks
        .iter()
        .filter_map(|c| match kind {
            GroundingKind::Maps => c.maps.as_ref(),
            GroundingKind::Web => c.web.as_ref(),
        })
        .filter_map(|s| s.uri.as_deref())
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
        .collect()
}
