//! Two-chart analytics panel over the static weekly stats.

use crate::types::HistoricalData;

/// On-time rate the network is held to.
pub const ON_TIME_TARGET: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnTimeBand {
    Strong,
    Steady,
    Weak,
}

impl OnTimeBand {
    pub fn of(rate: f64) -> Self {
        if rate > 90.0 {
            OnTimeBand::Strong
        } else if rate > 80.0 {
            OnTimeBand::Steady
        } else {
            OnTimeBand::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint<'a> {
    pub date: &'a str,
    pub avg_delay: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnTimeBar<'a> {
    pub date: &'a str,
    pub rate: f64,
    pub band: OnTimeBand,
}

pub fn delay_trend(stats: &[HistoricalData]) -> Vec<TrendPoint<'_>> {
    stats
        .iter()
        .map(|s| TrendPoint {
            date: &s.date,
            avg_delay: s.avg_delay,
        })
        .collect()
}

pub fn on_time_bars(stats: &[HistoricalData]) -> Vec<OnTimeBar<'_>> {
    stats
        .iter()
        .map(|s| OnTimeBar {
            date: &s.date,
            rate: s.on_time_rate,
            band: OnTimeBand::of(s.on_time_rate),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    /// Worst day by average delay. Ties keep the earliest day.
    pub peak_delay: Option<(String, f64)>,
    pub mean_on_time: f64,
    pub days_meeting_target: usize,
    pub total_volume: u64,
}

pub fn summarize(stats: &[HistoricalData]) -> AnalyticsSummary {
    let peak_delay = stats
        .iter()
        .fold(None::<&HistoricalData>, |best, s| match best {
            Some(b) if b.avg_delay >= s.avg_delay => Some(b),
            _ => Some(s),
        })
        .map(|s| (s.date.clone(), s.avg_delay));
    let mean_on_time = if stats.is_empty() {
        0.0
    } else {
        stats.iter().map(|s| s.on_time_rate).sum::<f64>() / stats.len() as f64
    };
    AnalyticsSummary {
        peak_delay,
        mean_on_time,
        days_meeting_target: stats.iter().filter(|s| s.on_time_rate >= ON_TIME_TARGET).count(),
        total_volume: stats.iter().map(|s| s.volume).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::historical_stats;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(OnTimeBand::of(96.0), OnTimeBand::Strong);
        assert_eq!(OnTimeBand::of(90.0), OnTimeBand::Steady);
        assert_eq!(OnTimeBand::of(82.0), OnTimeBand::Steady);
        assert_eq!(OnTimeBand::of(80.0), OnTimeBand::Weak);
    }

    #[test]
    fn test_series_follow_fixture_order() {
        let stats = historical_stats();
        let trend = delay_trend(&stats);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[2], TrendPoint { date: "14 Dec", avg_delay: 7.0 });
        let bars = on_time_bars(&stats);
        let bands: Vec<OnTimeBand> = bars.iter().map(|b| b.band).collect();
        use OnTimeBand::*;
        assert_eq!(bands, vec![Strong, Steady, Steady, Steady, Strong, Steady, Strong]);
    }

    #[test]
    fn test_summary_of_fixture_week() {
        let s = summarize(&historical_stats());
        assert_eq!(s.peak_delay, Some(("14 Dec".to_string(), 7.0)));
        assert_eq!(s.days_meeting_target, 1);
        assert_eq!(s.total_volume, 415_000);
        assert!((s.mean_on_time - 624.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_of_nothing() {
        let s = summarize(&[]);
        assert_eq!(s.peak_delay, None);
        assert_eq!(s.mean_on_time, 0.0);
        assert_eq!(s.total_volume, 0);
    }
}
