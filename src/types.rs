use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Transit")]
    InTransit,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
    #[serde(rename = "Delayed")]
    Delayed,
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::InTransit => "In Transit",
            DeliveryStatus::OutForDelivery => "Out for Delivery",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Delayed => "Delayed",
        }
    }

    /// Delayed parcels get the alert badge, everything else the positive one.
    pub fn tone(&self) -> Tone {
        match self {
            DeliveryStatus::Delayed => Tone::Danger,
            _ => Tone::Good,
        }
    }
}

/// Four-point ordinal classification assigned by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    pub fn badge(&self) -> String {
        format!("{} Risk", self.as_str())
    }

    pub fn tone(&self) -> Tone {
        match self {
            RiskLevel::Low => Tone::Good,
            RiskLevel::Medium => Tone::Caution,
            RiskLevel::High => Tone::Warning,
            RiskLevel::Critical => Tone::Danger,
        }
    }
}

/// Visual emphasis for badges. The text renderer maps these to markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Caution,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: String,
    pub tracking_id: String,
    pub origin: String,
    pub destination: String,
    pub status: DeliveryStatus,
    pub current_location: String,
    pub expected_delivery: DateTime<Utc>,
    pub carrier: String,
    pub history: Vec<HistoryEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFactors {
    pub weather: String,
    pub traffic: String,
    pub logistics: String,
}

/// Structured delay-risk report for one parcel. Every field is required on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub estimated_arrival: String,
    pub delay_probability: f64,
    pub risk_level: RiskLevel,
    pub reasoning: String,
    pub external_factors: ExternalFactors,
    pub recommendation: String,
}

impl PredictionResult {
    /// `1 - delay_probability` as a whole percentage, e.g. "65%". Halves round up.
    pub fn success_percent(&self) -> String {
        format!("{:.0}%", ((1.0 - self.delay_probability) * 100.0).round())
    }
}

/// Narrative text plus the reference links pulled from its grounding metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundedNarrative {
    pub text: Option<String>,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalData {
    pub date: String,
    pub avg_delay: f64,
    pub volume: u64,
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Weather,
    Traffic,
    Update,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u32,
    pub kind: NotificationKind,
    pub message: String,
    pub time: String,
}

impl Notification {
    /// Weather alerts get the cloud glyph; everything else the traffic glyph.
    pub fn glyph(&self) -> &'static str {
        match self.kind {
            NotificationKind::Weather => "☁",
            NotificationKind::Traffic | NotificationKind::Update => "▤",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prediction() -> PredictionResult {
        PredictionResult {
            estimated_arrival: "23 Dec 2024, afternoon".to_string(),
            delay_probability: 0.35,
            risk_level: RiskLevel::Medium,
            reasoning: "Fog advisories on the Pune-Bengaluru corridor.".to_string(),
            external_factors: ExternalFactors {
                weather: "Light fog in the early hours".to_string(),
                traffic: "NH48 congestion near Satara".to_string(),
                logistics: "Bengaluru hub running at 90% capacity".to_string(),
            },
            recommendation: "Notify recipient of a possible half-day slip.".to_string(),
        }
    }

    #[test]
    fn test_prediction_roundtrip_is_lossless() {
        let original = sample_prediction();
        let text = serde_json::to_string(&original).unwrap();
        let back: PredictionResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_prediction_uses_camel_case_on_the_wire() {
        let value = serde_json::to_value(sample_prediction()).unwrap();
        assert!(value.get("estimatedArrival").is_some());
        assert!(value.get("delayProbability").is_some());
        assert_eq!(value["riskLevel"], "Medium");
        assert_eq!(value["externalFactors"]["traffic"], "NH48 congestion near Satara");
    }

    #[test]
    fn test_success_percent_rounds_to_whole_number() {
        let mut p = sample_prediction();
        assert_eq!(p.success_percent(), "65%");
        p.delay_probability = 0.0;
        assert_eq!(p.success_percent(), "100%");
        p.delay_probability = 0.123;
        assert_eq!(p.success_percent(), "88%");
    }

    #[test]
    fn test_success_percent_rounds_halves_up() {
        let mut p = sample_prediction();
        for (delay, expected) in [(0.375, "63%"), (0.875, "13%"), (0.125, "88%"), (0.625, "38%")] {
            p.delay_probability = delay;
            assert_eq!(p.success_percent(), expected, "delay {}", delay);
        }
    }

    #[test]
    fn test_risk_badge_and_order() {
        assert_eq!(RiskLevel::Medium.badge(), "Medium Risk");
        assert!(RiskLevel::Low < RiskLevel::Critical);
        assert_eq!(RiskLevel::ALL.len(), 4);
    }

    #[test]
    fn test_status_labels_match_wire_values() {
        let v = serde_json::to_value(DeliveryStatus::OutForDelivery).unwrap();
        assert_eq!(v, DeliveryStatus::OutForDelivery.label());
        assert_eq!(DeliveryStatus::Delayed.tone(), Tone::Danger);
        assert_eq!(DeliveryStatus::InTransit.tone(), Tone::Good);
    }
}
