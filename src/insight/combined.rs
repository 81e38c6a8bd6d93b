use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::insight::{prompt, InsightService};
use crate::logging::{v_str, ProfileScope};
use crate::types::{GroundedNarrative, Parcel, PredictionResult};

/// Everything one analysis action produced. Only built when all three calls succeed.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub prediction: PredictionResult,
    pub maps: GroundedNarrative,
    pub search: GroundedNarrative,
}

impl AnalysisReport {
    pub fn map_links(&self) -> &[String] {
        &self.maps.links
    }

    pub fn search_links(&self) -> &[String] {
        &self.search.links
    }
}

/// Issue the three calls for `parcel` concurrently and combine them.
///
/// The first failure fails the whole analysis and whatever the other calls
/// returned is dropped. With `timeout` unset the join waits as long as the
/// slowest call takes.
pub async fn run_analysis(
    service: &dyn InsightService,
    parcel: &Parcel,
    timeout: Option<Duration>,
) -> Result<AnalysisReport> {
    let _scope = ProfileScope::with_context(
        "combined_analysis",
        &[("tracking_id", v_str(&parcel.tracking_id))],
    );
    let query = prompt::search_query_for(parcel);
    let joined = async {
        tokio::try_join!(
            service.predictive_insights(parcel),
            service.maps_context(&parcel.current_location, &parcel.destination),
            service.search_grounding(&query),
        )
    };

    let (prediction, maps, search) = match timeout {
        Some(limit) => tokio::time::timeout(limit, joined)
            .await
            .map_err(|_| anyhow!("analysis timed out after {}s", limit.as_secs_f64()))??,
        None => joined.await?,
    };

    Ok(AnalysisReport {
        prediction,
        maps,
        search,
    })
}
