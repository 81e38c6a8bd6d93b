//! Structured logging for the tracking dashboard.
//!
//! Every record is one JSON line:
//! `{ts, run_id, seq, lvl, component, event, msg, <correlation keys>, data}`.
//!
//! Records go to stderr so stdout stays free for the rendered dashboard. When
//! `LOG_DIR` is set they are appended under `<LOG_DIR>/<run_id>/` instead, and
//! only warn-and-above still reach stderr.
//!
//! Env knobs: `LOG_LEVEL`, `LOG_DOMAINS` (comma list or `all`), `LOG_DIR`, `RUN_ID`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains (categories for filtering)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Tracking, // Fixture lookups, filtering
    Analysis, // Combined three-way requests, card settlement
    Insight,  // Individual calls to the generative endpoint
    Ui,       // Dashboard events, board mounts
    System,   // Startup, shutdown
    Profile,  // Timing
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Tracking => "tracking",
            Domain::Analysis => "analysis",
            Domain::Insight => "insight",
            Domain::Ui => "ui",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    sink: Option<FileSink>,
}

#[derive(Debug)]
struct FileSink {
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

impl FileSink {
    fn open(base: &str, run_id: &str) -> Option<Self> {
        let run_dir = PathBuf::from(base).join(run_id);
        if let Err(err) = create_dir_all(&run_dir) {
            eprintln!("[log] failed to create run dir {}: {}", run_dir.display(), err);
            return None;
        }
        let open = |name: &str| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(run_dir.join(name))
                .map_err(|err| eprintln!("[log] failed to open {}: {}", name, err))
                .ok()
        };
        let events = open("events.jsonl")?;
        let trace = open("trace.jsonl")?;
        Some(Self {
            events: Mutex::new(BufWriter::new(events)),
            trace: Mutex::new(BufWriter::new(trace)),
        })
    }
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let sink = std::env::var("LOG_DIR")
            .ok()
            .and_then(|base| FileSink::open(&base, &run_id));
        RunContext { run_id, sink }
    })
}

/// Id shared by every record of this process.
pub fn run_id() -> &'static str {
    &ensure_run_context().run_id
}

/// Push buffered file records to disk. Call before exit.
pub fn flush() {
    if let Some(sink) = &ensure_run_context().sink {
        for writer in [&sink.events, &sink.trace] {
            if let Ok(mut w) = writer.lock() {
                let _ = w.flush();
            }
        }
    }
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in [
        "authorization",
        "Authorization",
        "x-goog-api-key",
        "api_key",
        "key",
    ] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

fn split_fields(mut fields: Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut top = Map::new();
    for key in ["tracking_id", "request_id", "model", "msg"] {
        if let Some(value) = fields.remove(key) {
            top.insert(key.to_string(), value);
        }
    }
    (top, fields)
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let min_level = Level::from_env();
    if level < min_level || !domain.is_enabled() {
        return;
    }

    emit_record(level, domain.as_str(), event, fields);
}

fn build_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) -> Value {
    let ctx = ensure_run_context();
    let fields = sanitize_fields(fields);
    let (mut top, data) = split_fields(fields);

    let msg = top.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    for (k, v) in top {
        entry.insert(k, v);
    }
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

/// Whether a record is echoed to stderr. A file sink takes over everything
/// below warn.
fn echoes_to_stderr(level: Level, has_sink: bool) -> bool {
    !has_sink || level >= Level::Warn
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let line = build_record(level, component, event, fields).to_string();
    let sink = &ensure_run_context().sink;
    if let Some(sink) = sink {
        match level {
            Level::Trace | Level::Debug => write_line(&sink.trace, &line),
            _ => write_line(&sink.events, &line),
        }
    }
    if echoes_to_stderr(level, sink.is_some()) {
        eprintln!("{}", line);
    }
}

// =============================================================================
// Analysis lifecycle
// =============================================================================

pub fn log_analysis_started(tracking_id: &str, request_id: u64) {
    log(
        Level::Info,
        Domain::Analysis,
        "analysis_started",
        obj(&[
            ("tracking_id", v_str(tracking_id)),
            ("request_id", json!(request_id)),
        ]),
    );
}

pub fn log_analysis_ready(
    tracking_id: &str,
    request_id: u64,
    risk_level: &str,
    delay_probability: f64,
    map_links: usize,
    search_links: usize,
) {
    log(
        Level::Info,
        Domain::Analysis,
        "analysis_ready",
        obj(&[
            ("tracking_id", v_str(tracking_id)),
            ("request_id", json!(request_id)),
            ("risk_level", v_str(risk_level)),
            ("delay_probability", v_num(delay_probability)),
            ("map_links", json!(map_links)),
            ("search_links", json!(search_links)),
        ]),
    );
}

/// The combined request failed; the card goes back to idle.
pub fn log_analysis_failed(tracking_id: &str, request_id: u64, error: &str) {
    log(
        Level::Error,
        Domain::Analysis,
        "analysis_failed",
        obj(&[
            ("tracking_id", v_str(tracking_id)),
            ("request_id", json!(request_id)),
            ("msg", v_str("Advanced AI Analysis failed")),
            ("error", v_str(error)),
        ]),
    );
}

/// A settlement arrived for a card that was unmounted or re-queried.
pub fn log_analysis_discarded(tracking_id: &str, request_id: u64, reason: &str) {
    log(
        Level::Debug,
        Domain::Analysis,
        "analysis_discarded",
        obj(&[
            ("tracking_id", v_str(tracking_id)),
            ("request_id", json!(request_id)),
            ("reason", v_str(reason)),
        ]),
    );
}

// =============================================================================
// Insight calls
// =============================================================================

pub fn log_insight_request(call: &str, model: &str, prompt_chars: usize) {
    log(
        Level::Debug,
        Domain::Insight,
        "request",
        obj(&[
            ("call", v_str(call)),
            ("model", v_str(model)),
            ("prompt_chars", json!(prompt_chars)),
        ]),
    );
}

pub fn log_grounding(call: &str, model: &str, chunks: usize, links: usize) {
    log(
        Level::Debug,
        Domain::Insight,
        "grounding_extracted",
        obj(&[
            ("call", v_str(call)),
            ("model", v_str(model)),
            ("chunks", json!(chunks)),
            ("links", json!(links)),
            ("dropped", json!(chunks.saturating_sub(links))),
        ]),
    );
}

pub fn log_usage(model: &str, prompt_tokens: Option<u64>, total_tokens: Option<u64>) {
    log(
        Level::Debug,
        Domain::Insight,
        "usage",
        obj(&[
            ("model", v_str(model)),
            ("prompt_tokens", json!(prompt_tokens)),
            ("total_tokens", json!(total_tokens)),
        ]),
    );
}

// =============================================================================
// Tracking
// =============================================================================

pub fn log_filter(query: &str, total: usize, matched: usize) {
    log(
        Level::Debug,
        Domain::Tracking,
        "filter_applied",
        obj(&[
            ("query", v_str(query)),
            ("total", json!(total)),
            ("matched", json!(matched)),
        ]),
    );
}

// =============================================================================
// UI
// =============================================================================

pub fn log_ui_event(event: &str, detail: &str, visible: usize) {
    log(
        Level::Debug,
        Domain::Ui,
        event,
        obj(&[("detail", v_str(detail)), ("visible", json!(visible))]),
    );
}

/// Session summary on shutdown
pub fn log_session_summary(
    duration_secs: u64,
    started: u64,
    ready: u64,
    failed: u64,
    discarded: u64,
) {
    log(
        Level::Info,
        Domain::System,
        "session_summary",
        obj(&[
            ("duration_secs", json!(duration_secs)),
            ("analyses_started", json!(started)),
            ("analyses_ready", json!(ready)),
            ("analyses_failed", json!(failed)),
            ("analyses_discarded", json!(discarded)),
        ]),
    );
}

// =============================================================================
// Field helpers
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits elapsed wall time as a trace record on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self::with_context(label, &[])
    }

    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self {
            label,
            context: obj(fields),
            started: Instant::now(),
        }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_obj_helper() {
        let m = obj(&[("key", v_str("value")), ("num", v_num(42.0))]);
        assert_eq!(m.get("key").unwrap(), "value");
        assert_eq!(m.get("num").unwrap(), 42.0);
    }

    #[test]
    fn test_seq_increments() {
        let s1 = next_seq();
        let s2 = next_seq();
        assert!(s2 > s1);
    }

    #[test]
    fn test_secrets_are_redacted() {
        let fields = sanitize_fields(obj(&[
            ("api_key", v_str("AIza-secret")),
            ("x-goog-api-key", v_str("AIza-secret")),
            ("model", v_str("gemini-3-flash-preview")),
        ]));
        assert_eq!(fields["api_key"], "[REDACTED]");
        assert_eq!(fields["x-goog-api-key"], "[REDACTED]");
        assert_eq!(fields["model"], "gemini-3-flash-preview");
    }

    #[test]
    fn test_record_hoists_correlation_keys() {
        let record = build_record(
            Level::Info,
            "analysis",
            "analysis_started",
            obj(&[
                ("tracking_id", v_str("IP-MH-4001-A2")),
                ("request_id", json!(7)),
                ("msg", v_str("hello")),
                ("extra", json!(true)),
            ]),
        );
        assert_eq!(record["lvl"], "INFO");
        assert_eq!(record["tracking_id"], "IP-MH-4001-A2");
        assert_eq!(record["request_id"], 7);
        assert_eq!(record["msg"], "hello");
        assert_eq!(record["data"]["extra"], true);
        assert!(record["data"].get("tracking_id").is_none());
    }

    #[test]
    fn test_sink_quiets_stderr_below_warn() {
        assert!(echoes_to_stderr(Level::Info, false));
        assert!(echoes_to_stderr(Level::Trace, false));
        assert!(!echoes_to_stderr(Level::Info, true));
        assert!(!echoes_to_stderr(Level::Debug, true));
        assert!(echoes_to_stderr(Level::Warn, true));
        assert!(echoes_to_stderr(Level::Error, true));
    }

    #[test]
    fn test_run_id_is_stable() {
        assert!(!run_id().is_empty());
        assert_eq!(run_id(), run_id());
    }

    #[test]
    fn test_file_sink_writes_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_string_lossy().to_string();
        let sink = FileSink::open(&base, "r-test").unwrap();
        write_line(&sink.events, r#"{"event":"a"}"#);
        write_line(&sink.trace, r#"{"event":"b"}"#);
        for w in [&sink.events, &sink.trace] {
            w.lock().unwrap().flush().unwrap();
        }
        let events = std::fs::read_to_string(dir.path().join("r-test/events.jsonl")).unwrap();
        let trace = std::fs::read_to_string(dir.path().join("r-test/trace.jsonl")).unwrap();
        assert_eq!(events.trim(), r#"{"event":"a"}"#);
        assert_eq!(trace.trim(), r#"{"event":"b"}"#);
    }
}
