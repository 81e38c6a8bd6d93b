use anyhow::Result;

use crate::insight::combined::AnalysisReport;
use crate::types::{Parcel, Tone};

#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    Idle,
    Loading { request_id: u64 },
    Ready { request_id: u64, report: Box<AnalysisReport> },
}

#[derive(Debug)]
pub enum CardEvent {
    AnalyzeRequested { request_id: u64 },
    Settled { request_id: u64, outcome: Result<AnalysisReport> },
}

/// What an event did to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Ready,
    Reverted,
    /// Settlement for a request the card no longer waits on.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Card {
    pub parcel: Parcel,
    pub state: CardState,
}

impl Card {
    pub fn new(parcel: Parcel) -> Self {
        Self {
            parcel,
            state: CardState::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, CardState::Loading { .. })
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match &self.state {
            CardState::Ready { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }
}

/// Every click starts a fresh request and supersedes any earlier one, including a
/// finished report. Only the settlement of the newest request is applied; a failed
/// one returns the card to idle.
pub fn apply_event(card: &mut Card, event: CardEvent) -> Transition {
    match (&card.state, event) {
        (_, CardEvent::AnalyzeRequested { request_id }) => {
            card.state = CardState::Loading { request_id };
            Transition::Started
        }
        (CardState::Loading { request_id: pending }, CardEvent::Settled { request_id, outcome })
            if *pending == request_id =>
        {
            match outcome {
                Ok(report) => {
                    card.state = CardState::Ready {
                        request_id,
                        report: Box::new(report),
                    };
                    Transition::Ready
                }
                Err(_) => {
                    card.state = CardState::Idle;
                    Transition::Reverted
                }
            }
        }
        (_, CardEvent::Settled { .. }) => Transition::Stale,
    }
}

/// Display fields for a ready card.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView {
    pub risk_badge: String,
    pub risk_tone: Tone,
    pub arrival: String,
    pub success_probability: String,
    pub weather: String,
    pub traffic: String,
    pub logistics: String,
    pub reasoning: String,
    pub recommendation: String,
    pub map_links: Vec<String>,
    pub search_links: Vec<String>,
}

impl ReadyView {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let p = &report.prediction;
        Self {
            risk_badge: p.risk_level.badge(),
            risk_tone: p.risk_level.tone(),
            arrival: p.estimated_arrival.clone(),
            success_probability: p.success_percent(),
            weather: p.external_factors.weather.clone(),
            traffic: p.external_factors.traffic.clone(),
            logistics: p.external_factors.logistics.clone(),
            reasoning: p.reasoning.clone(),
            recommendation: p.recommendation.clone(),
            map_links: report.map_links().to_vec(),
            search_links: report.search_links().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::find_parcel;
    use crate::types::{ExternalFactors, GroundedNarrative, PredictionResult, RiskLevel};
    use anyhow::anyhow;

    fn report(risk: RiskLevel, delay: f64) -> AnalysisReport {
        AnalysisReport {
            prediction: PredictionResult {
                estimated_arrival: "22 Dec 2024".to_string(),
                delay_probability: delay,
                risk_level: risk,
                reasoning: "r".to_string(),
                external_factors: ExternalFactors {
                    weather: "w".to_string(),
                    traffic: "t".to_string(),
                    logistics: "l".to_string(),
                },
                recommendation: "rec".to_string(),
            },
            maps: GroundedNarrative {
                text: None,
                links: vec!["https://maps.example/a".to_string()],
            },
            search: GroundedNarrative::default(),
        }
    }

    fn card() -> Card {
        Card::new(find_parcel("IP-MH-4001-A2").unwrap())
    }

    fn request(c: &mut Card, request_id: u64) -> Transition {
        apply_event(c, CardEvent::AnalyzeRequested { request_id })
    }

    fn settle(c: &mut Card, request_id: u64, outcome: Result<AnalysisReport>) -> Transition {
        apply_event(c, CardEvent::Settled { request_id, outcome })
    }

    #[test]
    fn test_idle_loading_ready() {
        let mut c = card();
        assert_eq!(request(&mut c, 1), Transition::Started);
        assert!(c.is_loading());
        let t = settle(&mut c, 1, Ok(report(RiskLevel::Medium, 0.35)));
        assert_eq!(t, Transition::Ready);
        let view = ReadyView::from_report(c.report().unwrap());
        assert_eq!(view.risk_badge, "Medium Risk");
        assert_eq!(view.success_probability, "65%");
        assert_eq!(view.map_links, vec!["https://maps.example/a"]);
    }

    #[test]
    fn test_failure_reverts_to_idle() {
        let mut c = card();
        request(&mut c, 4);
        let t = settle(&mut c, 4, Err(anyhow!("boom")));
        assert_eq!(t, Transition::Reverted);
        assert_eq!(c.state, CardState::Idle);
    }

    #[test]
    fn test_requery_discards_previous_report() {
        let mut c = card();
        request(&mut c, 1);
        settle(&mut c, 1, Ok(report(RiskLevel::Low, 0.1)));
        request(&mut c, 2);
        assert!(c.report().is_none());
        settle(&mut c, 2, Err(anyhow!("offline")));
        assert_eq!(c.state, CardState::Idle);
    }

    #[test]
    fn test_superseded_settlement_is_stale() {
        let mut c = card();
        request(&mut c, 1);
        request(&mut c, 2);
        let t = settle(&mut c, 1, Ok(report(RiskLevel::High, 0.7)));
        assert_eq!(t, Transition::Stale);
        assert_eq!(c.state, CardState::Loading { request_id: 2 });
    }

    #[test]
    fn test_settlement_without_request_is_stale() {
        let mut c = card();
        let t = settle(&mut c, 9, Ok(report(RiskLevel::Low, 0.0)));
        assert_eq!(t, Transition::Stale);
        assert_eq!(c.state, CardState::Idle);
    }
}
