//! The card grid. Cards exist only while their parcel is visible; hiding a parcel
//! drops its card and anything it was waiting on.

use anyhow::Result;

use crate::filter::filter_parcels;
use crate::insight::combined::AnalysisReport;
use crate::logging::{
    log_analysis_discarded, log_analysis_failed, log_analysis_ready, log_analysis_started,
    log_filter, log_ui_event,
};
use crate::types::Parcel;
use crate::ui::card::{apply_event, Card, CardEvent, Transition};
use crate::ui::dashboard::{DashboardState, Tab};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardStats {
    pub started: u64,
    pub ready: u64,
    pub failed: u64,
    pub discarded: u64,
}

#[derive(Debug, Default)]
pub struct TrackingBoard {
    cards: Vec<Card>,
    next_request_id: u64,
    stats: BoardStats,
}

impl TrackingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount exactly the cards the dashboard shows: the filtered fixtures on the
    /// tracking tab, nothing on the analytics tab.
    pub fn sync(&mut self, state: &DashboardState, parcels: &[Parcel]) {
        match state.tab {
            Tab::Tracking => {
                let visible = filter_parcels(parcels, &state.query);
                log_filter(&state.query, parcels.len(), visible.len());
                self.mount(&visible);
            }
            Tab::Analytics => self.mount(&[]),
        }
        log_ui_event("board_sync", &state.query, self.cards.len());
    }

    /// Keep cards (and their state) for parcels still visible, add idle cards for
    /// new ones, drop the rest. Card order follows `visible`.
    pub fn mount(&mut self, visible: &[&Parcel]) {
        let mut previous = std::mem::take(&mut self.cards);
        self.cards = visible
            .iter()
            .map(|p| {
                match previous.iter().position(|c| c.parcel.tracking_id == p.tracking_id) {
                    Some(i) => previous.swap_remove(i),
                    None => Card::new((*p).clone()),
                }
            })
            .collect();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, tracking_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.parcel.tracking_id == tracking_id)
    }

    /// A 1-based position in the grid or a tracking id (case-insensitive).
    pub fn resolve(&self, selector: &str) -> Option<&Card> {
        let selector = selector.trim();
        if let Ok(n) = selector.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| self.cards.get(i));
        }
        self.cards
            .iter()
            .find(|c| c.parcel.tracking_id.eq_ignore_ascii_case(selector))
    }

    /// Put the card into loading under a fresh request id. Returns the id and the
    /// parcel to analyze, or `None` when no such card is mounted.
    pub fn begin_analysis(&mut self, tracking_id: &str) -> Option<(u64, Parcel)> {
        let request_id = self.next_request_id + 1;
        let card = self.cards.iter_mut().find(|c| c.parcel.tracking_id == tracking_id)?;
        self.next_request_id = request_id;
        apply_event(card, CardEvent::AnalyzeRequested { request_id });
        self.stats.started += 1;
        log_analysis_started(tracking_id, request_id);
        Some((request_id, card.parcel.clone()))
    }

    /// Apply a settled analysis. Failures are logged and swallowed.
    pub fn settle(
        &mut self,
        tracking_id: &str,
        request_id: u64,
        outcome: Result<AnalysisReport>,
    ) -> Transition {
        let Some(card) = self.cards.iter_mut().find(|c| c.parcel.tracking_id == tracking_id) else {
            self.stats.discarded += 1;
            log_analysis_discarded(tracking_id, request_id, "card unmounted");
            return Transition::Stale;
        };

        let summary = outcome.as_ref().map(|r| {
            (
                r.prediction.risk_level.as_str(),
                r.prediction.delay_probability,
                r.map_links().len(),
                r.search_links().len(),
            )
        });
        let failure = outcome.as_ref().err().map(|e| format!("{:#}", e));
        let summary = summary.ok();

        let transition = apply_event(card, CardEvent::Settled { request_id, outcome });
        match transition {
            Transition::Ready => {
                self.stats.ready += 1;
                if let Some((risk, p, maps, search)) = summary {
                    log_analysis_ready(tracking_id, request_id, risk, p, maps, search);
                }
            }
            Transition::Reverted => {
                self.stats.failed += 1;
                log_analysis_failed(tracking_id, request_id, failure.as_deref().unwrap_or(""));
            }
            Transition::Stale => {
                self.stats.discarded += 1;
                log_analysis_discarded(tracking_id, request_id, "superseded");
            }
            Transition::Started => {}
        }
        transition
    }

    pub fn stats(&self) -> BoardStats {
        self.stats
    }
}
