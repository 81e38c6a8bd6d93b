//! Prompt text and the response schema for the structured call.

use serde_json::{json, Value};

use crate::types::{Parcel, RiskLevel};

pub fn insight_prompt(parcel: &Parcel) -> String {
    format!(
        "As an expert Indian logistics analyst for India Post, analyze this parcel's journey.\n\
         \n\
         Tracking ID: {id}\n\
         From: {origin}\n\
         To: {dest}\n\
         Current Location: {current}\n\
         Status: {status}\n\
         \n\
         Thinking about:\n\
         1. Potential regional disruptions (strikes, weather, festivals).\n\
         2. Infrastructure bottlenecks between {current} and {dest}.\n\
         3. Historical delay patterns for this route.\n\
         \n\
         Return a JSON response precisely matching the schema.",
        id = parcel.tracking_id,
        origin = parcel.origin,
        dest = parcel.destination,
        current = parcel.current_location,
        status = parcel.status.label(),
    )
}

pub fn maps_prompt(current_location: &str, destination: &str) -> String {
    format!(
        "Find real-time traffic and route status between {} and {} in India.",
        current_location, destination
    )
}

pub fn search_prompt(query: &str) -> String {
    format!(
        "Is there any major weather, strike, or logistics news affecting {} today?",
        query
    )
}

/// Free-text query the card hands to the search-grounded call.
pub fn search_query_for(parcel: &Parcel) -> String {
    format!("{} to {} logistics", parcel.current_location, parcel.destination)
}

/// Output schema for the structured call. Mirrors `PredictionResult`.
pub fn prediction_schema() -> Value {
    let levels: Vec<&str> = RiskLevel::ALL.iter().map(|l| l.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "estimatedArrival": { "type": "STRING" },
            "delayProbability": { "type": "NUMBER" },
            "riskLevel": { "type": "STRING", "enum": levels },
            "reasoning": { "type": "STRING" },
            "externalFactors": {
                "type": "OBJECT",
                "properties": {
                    "weather": { "type": "STRING" },
                    "traffic": { "type": "STRING" },
                    "logistics": { "type": "STRING" }
                },
                "required": ["weather", "traffic", "logistics"]
            },
            "recommendation": { "type": "STRING" }
        },
        "required": [
            "estimatedArrival",
            "delayProbability",
            "riskLevel",
            "reasoning",
            "externalFactors",
            "recommendation"
        ]
    })
}
