use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use parcelwatch::config::Config;
use parcelwatch::fixtures;
use parcelwatch::insight::{self, combined::run_analysis, combined::AnalysisReport, InsightService};
use parcelwatch::logging::{self, log, log_session_summary, obj, v_str, Domain, Level};
use parcelwatch::types::{HistoricalData, Notification, Parcel};
use parcelwatch::ui::board::TrackingBoard;
use parcelwatch::ui::card::Transition;
use parcelwatch::ui::dashboard::{reduce, DashboardEvent, DashboardState, Tab};
use parcelwatch::ui::render::render;

const HELP: &str = "\
commands:
  search <text>        filter consignments by tracking id or destination
  clear                clear the search
  tab tracking|analytics
  analyze <n|id>       deep analysis for the n-th visible card or a tracking id
  bell                 open/close the live logistics stream
  close                close the live logistics stream
  help                 this text
  quit";

#[derive(Debug, PartialEq)]
enum Command {
    Dashboard(DashboardEvent),
    Analyze(String),
    Redraw,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    match head.to_ascii_lowercase().as_str() {
        "" => Command::Redraw,
        "search" | "s" => Command::Dashboard(DashboardEvent::SetQuery(rest.to_string())),
        "clear" => Command::Dashboard(DashboardEvent::SetQuery(String::new())),
        "tab" => match Tab::parse(rest) {
            Some(tab) => Command::Dashboard(DashboardEvent::SetTab(tab)),
            None => Command::Unknown(line.to_string()),
        },
        "tracking" => Command::Dashboard(DashboardEvent::SetTab(Tab::Tracking)),
        "analytics" => Command::Dashboard(DashboardEvent::SetTab(Tab::Analytics)),
        "analyze" | "a" if !rest.is_empty() => Command::Analyze(rest.to_string()),
        "bell" => Command::Dashboard(DashboardEvent::ToggleNotifications),
        "close" => Command::Dashboard(DashboardEvent::DismissNotifications),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// A finished analysis task, sent back to the shell loop.
struct Settled {
    tracking_id: String,
    request_id: u64,
    outcome: Result<AnalysisReport>,
}

enum Input {
    Line(Option<String>),
    Settled(Settled),
}

struct Shell {
    cfg: Config,
    service: Arc<dyn InsightService>,
    parcels: Vec<Parcel>,
    stats: Vec<HistoricalData>,
    notifications: Vec<Notification>,
    state: DashboardState,
    board: TrackingBoard,
    tx: mpsc::UnboundedSender<Settled>,
}

impl Shell {
    fn draw(&self, notice: Option<&str>) {
        let mut out = std::io::stdout().lock();
        let view = render(&self.state, &self.board, &self.stats, &self.notifications);
        let _ = write!(out, "{}", view);
        if let Some(notice) = notice {
            let _ = writeln!(out, "{}", notice);
        }
        let _ = write!(out, "> ");
        let _ = out.flush();
    }

    fn dispatch(&mut self, event: DashboardEvent) {
        self.state = reduce(&self.state, event);
        self.board.sync(&self.state, &self.parcels);
    }

    /// Start an analysis for the selected card. Returns a notice when nothing starts.
    fn analyze(&mut self, selector: &str) -> Option<String> {
        if self.state.tab != Tab::Tracking {
            return Some("Switch to the tracking tab to analyze a consignment.".to_string());
        }
        let tracking_id = match self.board.resolve(selector) {
            Some(card) => card.parcel.tracking_id.clone(),
            None => return Some(format!("No visible consignment matches '{}'.", selector)),
        };
        let (request_id, parcel) = self.board.begin_analysis(&tracking_id)?;

        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let timeout = self.cfg.analysis_timeout;
        tokio::spawn(async move {
            let outcome = run_analysis(service.as_ref(), &parcel, timeout).await;
            // The receiver only goes away on shutdown.
            let _ = tx.send(Settled {
                tracking_id: parcel.tracking_id,
                request_id,
                outcome,
            });
        });
        None
    }

    fn settle(&mut self, done: Settled) -> Option<String> {
        match self.board.settle(&done.tracking_id, done.request_id, done.outcome) {
            Transition::Reverted => Some(format!(
                "Failed to get AI insights for {}. Please check your API key.",
                done.tracking_id
            )),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let service = insight::build(&cfg)?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("run_id", v_str(logging::run_id())),
            ("service", v_str(service.name())),
            ("insight_model", v_str(&cfg.insight_model)),
            ("maps_model", v_str(&cfg.maps_model)),
            ("search_model", v_str(&cfg.search_model)),
            (
                "timeout_secs",
                cfg.analysis_timeout
                    .map(|d| json!(d.as_secs()))
                    .unwrap_or(serde_json::Value::Null),
            ),
        ]),
    );

    let (tx, mut rx) = mpsc::unbounded_channel::<Settled>();
    let mut shell = Shell {
        cfg,
        service,
        parcels: fixtures::parcels(),
        stats: fixtures::historical_stats(),
        notifications: fixtures::notifications(),
        state: DashboardState::default(),
        board: TrackingBoard::new(),
        tx,
    };
    shell.board.sync(&shell.state, &shell.parcels);
    let mut notices = Vec::new();
    if !shell.cfg.has_credential() {
        notices.push("API_KEY is not set: analyses will fail until it is.");
    }
    if std::env::var_os("LOG_DIR").is_none() {
        notices.push("Logs share this terminal; set LOG_DIR or LOG_LEVEL=warn to quiet them.");
    }
    let notice = notices.join("\n");
    shell.draw((!notice.is_empty()).then_some(notice.as_str()));

    let started = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            Some(done) = rx.recv() => Input::Settled(done),
        };

        let notice = match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => match parse_command(&line) {
                Command::Dashboard(event) => {
                    shell.dispatch(event);
                    None
                }
                Command::Analyze(selector) => shell.analyze(&selector),
                Command::Redraw => None,
                Command::Help => Some(HELP.to_string()),
                Command::Quit => break,
                Command::Unknown(cmd) => Some(format!("Unknown command '{}'. Type help.", cmd)),
            },
            Input::Settled(done) => shell.settle(done),
        };
        shell.draw(notice.as_deref());
    }

    let s = shell.board.stats();
    log_session_summary(started.elapsed().as_secs(), s.started, s.ready, s.failed, s.discarded);
    logging::flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_and_clear() {
        assert_eq!(
            parse_command("search  Kolkata "),
            Command::Dashboard(DashboardEvent::SetQuery("Kolkata".to_string()))
        );
        assert_eq!(
            parse_command("clear"),
            Command::Dashboard(DashboardEvent::SetQuery(String::new()))
        );
    }

    #[test]
    fn test_parse_tabs_and_bell() {
        assert_eq!(
            parse_command("tab analytics"),
            Command::Dashboard(DashboardEvent::SetTab(Tab::Analytics))
        );
        assert_eq!(parse_command("tab nowhere"), Command::Unknown("tab nowhere".to_string()));
        assert_eq!(
            parse_command("BELL"),
            Command::Dashboard(DashboardEvent::ToggleNotifications)
        );
    }

    #[test]
    fn test_parse_analyze() {
        assert_eq!(parse_command("analyze 2"), Command::Analyze("2".to_string()));
        assert_eq!(
            parse_command("a IP-DL-1100-B9"),
            Command::Analyze("IP-DL-1100-B9".to_string())
        );
        assert_eq!(parse_command("analyze"), Command::Unknown("analyze".to_string()));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("   "), Command::Redraw);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("help"), Command::Help);
    }
}
