//! Root shell state: `(DashboardState, DashboardEvent) -> DashboardState`.
//!
//! The state record is never mutated in place. The board and the renderer both
//! read it; only [`reduce`] produces a new one.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Tracking,
    Analytics,
}

impl Tab {
    pub fn parse(s: &str) -> Option<Tab> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tracking" | "t" => Some(Tab::Tracking),
            "analytics" | "a" => Some(Tab::Analytics),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Tracking => "Tracking",
            Tab::Analytics => "Analytics",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardState {
    pub tab: Tab,
    pub query: String,
    pub notifications_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    SetTab(Tab),
    SetQuery(String),
    ToggleNotifications,
    DismissNotifications,
}

pub fn reduce(state: &DashboardState, event: DashboardEvent) -> DashboardState {
    let mut next = state.clone();
    match event {
        DashboardEvent::SetTab(tab) => next.tab = tab,
        DashboardEvent::SetQuery(query) => next.query = query,
        DashboardEvent::ToggleNotifications => next.notifications_open = !state.notifications_open,
        DashboardEvent::DismissNotifications => next.notifications_open = false,
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let s = DashboardState::default();
        assert_eq!(s.tab, Tab::Tracking);
        assert!(s.query.is_empty());
        assert!(!s.notifications_open);
    }

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let s0 = DashboardState::default();
        let s1 = reduce(&s0, DashboardEvent::SetQuery("kolkata".to_string()));
        assert_eq!(s0.query, "");
        assert_eq!(s1.query, "kolkata");
        assert_eq!(s1.tab, Tab::Tracking);
    }

    #[test]
    fn test_toggle_and_dismiss() {
        let s0 = DashboardState::default();
        let s1 = reduce(&s0, DashboardEvent::ToggleNotifications);
        assert!(s1.notifications_open);
        let s2 = reduce(&s1, DashboardEvent::ToggleNotifications);
        assert!(!s2.notifications_open);
        let s3 = reduce(&s1, DashboardEvent::DismissNotifications);
        assert!(!s3.notifications_open);
        assert_eq!(reduce(&s3, DashboardEvent::DismissNotifications), s3);
    }

    #[test]
    fn test_tab_switch_keeps_query() {
        let s = reduce(&DashboardState::default(), DashboardEvent::SetQuery("IP-".into()));
        let s = reduce(&s, DashboardEvent::SetTab(Tab::Analytics));
        assert_eq!(s.tab, Tab::Analytics);
        assert_eq!(s.query, "IP-");
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!(Tab::parse("Analytics"), Some(Tab::Analytics));
        assert_eq!(Tab::parse(" t "), Some(Tab::Tracking));
        assert_eq!(Tab::parse("map"), None);
    }
}
