//! Hard-coded tracking data. These lists are the only data source; nothing here is
//! fetched or mutated.

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{
    DeliveryStatus, HistoricalData, HistoryEvent, Notification, NotificationKind, Parcel,
};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn event(ts: DateTime<Utc>, location: &str, description: &str) -> HistoryEvent {
    HistoryEvent {
        timestamp: ts,
        location: location.to_string(),
        description: description.to_string(),
    }
}

pub fn parcels() -> Vec<Parcel> {
    vec![
        Parcel {
            id: "1".to_string(),
            tracking_id: "IP-MH-4001-A2".to_string(),
            origin: "Mumbai, Maharashtra".to_string(),
            destination: "Bengaluru, Karnataka".to_string(),
            status: DeliveryStatus::InTransit,
            current_location: "Pune Hub, MH".to_string(),
            expected_delivery: at(2024, 12, 22, 12, 0),
            carrier: "India Post Speed Post".to_string(),
            history: vec![
                event(at(2024, 12, 18, 10, 0), "Mumbai GPO", "Item Booked"),
                event(at(2024, 12, 19, 4, 0), "Mumbai RMS", "Item Dispatched"),
                event(at(2024, 12, 19, 18, 30), "Pune Hub", "Item Received"),
            ],
        },
        Parcel {
            id: "2".to_string(),
            tracking_id: "IP-DL-1100-B9".to_string(),
            origin: "New Delhi, DL".to_string(),
            destination: "Kolkata, WB".to_string(),
            status: DeliveryStatus::Delayed,
            current_location: "Varanasi sorting center".to_string(),
            expected_delivery: at(2024, 12, 21, 10, 0),
            carrier: "India Post Registered Post".to_string(),
            history: vec![
                event(at(2024, 12, 17, 12, 0), "New Delhi GPO", "Item Booked"),
                event(at(2024, 12, 18, 22, 0), "Varanasi", "Delayed due to heavy fog"),
            ],
        },
        Parcel {
            id: "3".to_string(),
            tracking_id: "IP-TN-6000-C5".to_string(),
            origin: "Chennai, TN".to_string(),
            destination: "Hyderabad, TS".to_string(),
            status: DeliveryStatus::OutForDelivery,
            current_location: "Hyderabad Jubilee Hills".to_string(),
            expected_delivery: at(2024, 12, 20, 17, 0),
            carrier: "India Post Speed Post".to_string(),
            history: vec![
                event(at(2024, 12, 18, 9, 0), "Chennai Sorting", "Dispatched"),
                event(at(2024, 12, 19, 20, 0), "Hyderabad Hub", "Received"),
            ],
        },
    ]
}

pub fn historical_stats() -> Vec<HistoricalData> {
    [
        ("12 Dec", 2.0, 45_000, 92.0),
        ("13 Dec", 4.0, 52_000, 88.0),
        ("14 Dec", 7.0, 68_000, 82.0),
        ("15 Dec", 5.0, 75_000, 85.0),
        ("16 Dec", 3.0, 58_000, 94.0),
        ("17 Dec", 6.0, 62_000, 87.0),
        ("18 Dec", 2.0, 55_000, 96.0),
    ]
    .into_iter()
    .map(|(date, avg_delay, volume, on_time_rate)| HistoricalData {
        date: date.to_string(),
        avg_delay,
        volume,
        on_time_rate,
    })
    .collect()
}

pub fn notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: 1,
            kind: NotificationKind::Weather,
            message: "Heavy fog in North India may delay Delhi-bound shipments.".to_string(),
            time: "2h ago".to_string(),
        },
        Notification {
            id: 2,
            kind: NotificationKind::Traffic,
            message: "Traffic congestion on Mumbai-Pune Expressway: Expect 3h logistics delay."
                .to_string(),
            time: "4h ago".to_string(),
        },
        Notification {
            id: 3,
            kind: NotificationKind::Update,
            message: "Your parcel IP-MH-4001-A2 arrived at Pune Hub.".to_string(),
            time: "6h ago".to_string(),
        },
    ]
}

/// Look up a fixture parcel by tracking id (case-insensitive).
pub fn find_parcel(tracking_id: &str) -> Option<Parcel> {
    parcels()
        .into_iter()
        .find(|p| p.tracking_id.eq_ignore_ascii_case(tracking_id.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_chronological() {
        for parcel in parcels() {
            let stamps: Vec<_> = parcel.history.iter().map(|e| e.timestamp).collect();
            let mut sorted = stamps.clone();
            sorted.sort();
            assert_eq!(stamps, sorted, "{} history out of order", parcel.tracking_id);
        }
    }

    #[test]
    fn test_fixture_timestamps_resolved() {
        let p = find_parcel("ip-mh-4001-a2").unwrap();
        assert_eq!(p.expected_delivery.to_rfc3339(), "2024-12-22T12:00:00+00:00");
        assert_eq!(p.current_location, "Pune Hub, MH");
    }

    #[test]
    fn test_stats_cover_one_week() {
        let stats = historical_stats();
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].date, "12 Dec");
        assert_eq!(stats[6].on_time_rate, 96.0);
    }

    #[test]
    fn test_unknown_tracking_id() {
        assert!(find_parcel("IP-XX-0000-Z0").is_none());
    }
}
