use anyhow::{anyhow, Result};

use crate::insight::InsightService;
use crate::types::{GroundedNarrative, Parcel, PredictionResult};

// Used when no API_KEY is configured. Every analysis fails, so cards stay idle.
pub struct OfflineInsights;

#[async_trait::async_trait]
impl InsightService for OfflineInsights {
    async fn predictive_insights(&self, _parcel: &Parcel) -> Result<PredictionResult> {
        Err(anyhow!("missing API_KEY"))
    }

    async fn maps_context(
        &self,
        _current_location: &str,
        _destination: &str,
    ) -> Result<GroundedNarrative> {
        Err(anyhow!("missing API_KEY"))
    }

    async fn search_grounding(&self, _query: &str) -> Result<GroundedNarrative> {
        Err(anyhow!("missing API_KEY"))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
