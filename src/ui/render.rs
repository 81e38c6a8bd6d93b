//! Plain-text rendering of the whole dashboard. Pure: state in, text out.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};

use crate::analytics::{delay_trend, on_time_bars, summarize, OnTimeBand, ON_TIME_TARGET};
use crate::types::{HistoricalData, Notification, Tone};
use crate::ui::board::TrackingBoard;
use crate::ui::card::{Card, CardState, ReadyView};
use crate::ui::dashboard::{DashboardState, Tab};

const RULE: &str = "────────────────────────────────────────────────────────────";

pub fn render(
    state: &DashboardState,
    board: &TrackingBoard,
    stats: &[HistoricalData],
    notifications: &[Notification],
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_dashboard(&mut out, state, board, stats, notifications);
    out
}

/// One card on its own, numbered as it appears in the grid.
pub fn render_card(position: usize, card: &Card) -> String {
    let mut out = String::new();
    let _ = write_card(&mut out, position, card);
    out
}

fn write_dashboard(
    out: &mut String,
    state: &DashboardState,
    board: &TrackingBoard,
    stats: &[HistoricalData],
    notifications: &[Notification],
) -> fmt::Result {
    write_header(out, state, notifications.len())?;
    match state.tab {
        Tab::Tracking => write_tracking(out, state, board)?,
        Tab::Analytics => write_analytics(out, stats)?,
    }
    if state.notifications_open {
        write_drawer(out, notifications)?;
    }
    write_footer(out)
}

fn write_header(out: &mut String, state: &DashboardState, unread: usize) -> fmt::Result {
    let tabs: Vec<String> = [Tab::Tracking, Tab::Analytics]
        .iter()
        .map(|t| {
            if *t == state.tab {
                format!("[{}]", t.label().to_uppercase())
            } else {
                t.label().to_uppercase()
            }
        })
        .collect();
    writeln!(out, "INDIA POST · AI Logistics Core    {}    bell({})", tabs.join("  "), unread)?;
    writeln!(out, "{}", RULE)
}

fn write_tracking(out: &mut String, state: &DashboardState, board: &TrackingBoard) -> fmt::Result {
    writeln!(out, "The future of Post is here.")?;
    let query = if state.query.is_empty() { "_" } else { &state.query };
    writeln!(out, "Search consignment: {}", query)?;
    writeln!(out)?;
    if board.cards().is_empty() {
        writeln!(out, "No consignments match \"{}\".", state.query)?;
    }
    for (i, card) in board.cards().iter().enumerate() {
        write_card(out, i + 1, card)?;
        writeln!(out)?;
    }
    Ok(())
}

fn tone_mark(tone: Tone) -> &'static str {
    match tone {
        Tone::Good => "+",
        Tone::Caution => "~",
        Tone::Warning => "!",
        Tone::Danger => "!!",
    }
}

fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.format("%d %b %Y %H:%M UTC").to_string()
}

fn write_card(out: &mut String, position: usize, card: &Card) -> fmt::Result {
    let p = &card.parcel;
    writeln!(
        out,
        "[{}] {}  ({} {})",
        position,
        p.tracking_id,
        p.status.label().to_uppercase(),
        tone_mark(p.status.tone())
    )?;
    writeln!(out, "    {}", p.carrier)?;
    writeln!(out, "    Last seen:   {}", p.current_location)?;
    writeln!(out, "    Destination: {}", p.destination)?;
    writeln!(out, "    Expected:    {}", fmt_ts(&p.expected_delivery))?;
    if let Some(last) = p.history.last() {
        writeln!(
            out,
            "    Latest:      {} at {} ({})",
            last.description,
            last.location,
            fmt_ts(&last.timestamp)
        )?;
    }
    writeln!(out, "    > Deep Analysis & Live Maps   (analyze {})", position)?;

    match &card.state {
        CardState::Idle => Ok(()),
        CardState::Loading { .. } => {
            writeln!(out, "    Consulting India Post Intelligence...")?;
            writeln!(out, "    Thinking about traffic, weather, and hub congestion...")
        }
        CardState::Ready { report, .. } => write_report(out, &ReadyView::from_report(report)),
    }
}

fn write_report(out: &mut String, v: &ReadyView) -> fmt::Result {
    writeln!(out, "    ── AI Logic Report ── [{} {}]", v.risk_badge, tone_mark(v.risk_tone))?;
    writeln!(out, "    Arrival Expectation: {}", v.arrival)?;
    writeln!(out, "    Success Probability: {}", v.success_probability)?;
    writeln!(out, "    Weather Impact:      {}", v.weather)?;
    writeln!(out, "    Traffic & NH Status: {}", v.traffic)?;
    writeln!(out, "    Logistics:           {}", v.logistics)?;
    writeln!(out, "    {}", v.reasoning)?;
    writeln!(out, "    Recommendation: {}", v.recommendation)?;
    if !v.map_links.is_empty() {
        writeln!(out, "    Live Map Verifications:")?;
        for (i, url) in v.map_links.iter().enumerate() {
            writeln!(out, "      View Route Map {}: {}", i + 1, url)?;
        }
    }
    if !v.search_links.is_empty() {
        writeln!(out, "    News Sources:")?;
        for (i, url) in v.search_links.iter().enumerate() {
            writeln!(out, "      Source {}: {}", i + 1, url)?;
        }
    }
    Ok(())
}

fn bar(value: f64, per_cell: f64) -> String {
    let cells = if per_cell > 0.0 { (value / per_cell).round().max(0.0) as usize } else { 0 };
    "█".repeat(cells)
}

fn write_analytics(out: &mut String, stats: &[HistoricalData]) -> fmt::Result {
    writeln!(out, "Regional Delay Trends (real-time)")?;
    for point in delay_trend(stats) {
        let cells = bar(point.avg_delay, 0.25);
        writeln!(out, "  {:>6}  {:<28} {:.0}h", point.date, cells, point.avg_delay)?;
    }
    writeln!(out, "  Average system delay in hours across major hubs")?;
    writeln!(out)?;

    writeln!(out, "On-Time Success Rate (target: {:.0}%)", ON_TIME_TARGET)?;
    for b in on_time_bars(stats) {
        let band = match b.band {
            OnTimeBand::Strong => "strong",
            OnTimeBand::Steady => "steady",
            OnTimeBand::Weak => "weak",
        };
        writeln!(out, "  {:>6}  {:<25} {:.0}% {}", b.date, bar(b.rate, 4.0), b.rate, band)?;
    }
    writeln!(out, "  Percentage of deliveries meeting original ETA")?;
    writeln!(out)?;

    let summary = summarize(stats);
    if let Some((date, delay)) = &summary.peak_delay {
        writeln!(out, "Peak delay: {} ({:.0}h)", date, delay)?;
    }
    writeln!(
        out,
        "Mean on-time: {:.1}%   Days at target: {}/{}   Volume: {}",
        summary.mean_on_time,
        summary.days_meeting_target,
        stats.len(),
        summary.total_volume
    )?;
    writeln!(out)?;
    writeln!(out, "OmniRoute Global Hub Monitor")?;
    writeln!(out, "  14.2k Active Trackers   98.2% AI Accuracy")?;
    writeln!(out, "  ● System Healthy   ● Hub Congestion: Chicago")?;
    writeln!(out)
}

fn write_drawer(out: &mut String, notifications: &[Notification]) -> fmt::Result {
    writeln!(out, "┌ Live Logistics Stream")?;
    for n in notifications {
        writeln!(out, "│ {} {}", n.glyph(), n.message)?;
        writeln!(out, "│   {}", n.time.to_uppercase())?;
    }
    writeln!(out, "└ (bell to close)")
}

fn write_footer(out: &mut String) -> fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "● Global Hubs Online   ● High Traffic: NH44        99.2% Prediction Accuracy")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{historical_stats, notifications, parcels};
    use crate::ui::dashboard::{reduce, DashboardEvent};

    fn rendered(state: &DashboardState) -> String {
        let fixtures = parcels();
        let mut board = TrackingBoard::new();
        board.sync(state, &fixtures);
        render(state, &board, &historical_stats(), &notifications())
    }

    #[test]
    fn test_tracking_view_lists_every_card() {
        let text = rendered(&DashboardState::default());
        assert!(text.contains("[TRACKING]"));
        assert!(text.contains("[1] IP-MH-4001-A2"));
        assert!(text.contains("[2] IP-DL-1100-B9  (DELAYED !!)"));
        assert!(text.contains("[3] IP-TN-6000-C5"));
        assert!(text.contains("Expected:    22 Dec 2024 12:00 UTC"));
        assert!(!text.contains("Live Logistics Stream"));
        assert!(text.contains("High Traffic: NH44"));
    }

    #[test]
    fn test_empty_search_result() {
        let state = reduce(&DashboardState::default(), DashboardEvent::SetQuery("zzz".into()));
        let text = rendered(&state);
        assert!(text.contains("No consignments match \"zzz\"."));
    }

    #[test]
    fn test_analytics_view() {
        let state = reduce(&DashboardState::default(), DashboardEvent::SetTab(Tab::Analytics));
        let text = rendered(&state);
        assert!(text.contains("[ANALYTICS]"));
        assert!(text.contains("Regional Delay Trends"));
        assert!(text.contains("96% strong"));
        assert!(text.contains("Peak delay: 14 Dec (7h)"));
        assert!(!text.contains("IP-MH-4001-A2"));
    }

    #[test]
    fn test_drawer_shows_notifications() {
        let state = reduce(&DashboardState::default(), DashboardEvent::ToggleNotifications);
        let text = rendered(&state);
        assert!(text.contains("Live Logistics Stream"));
        assert!(text.contains("☁ Heavy fog in North India"));
        assert!(text.contains("2H AGO"));
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar(2.0, 0.25).chars().count(), 8);
        assert_eq!(bar(0.0, 1.0), "");
        assert_eq!(bar(5.0, 0.0), "");
    }
}
