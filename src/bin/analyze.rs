//! One-shot deep analysis for a single fixture consignment.
//!
//! Usage: analyze <tracking-id>
//! Exit codes: 1 usage, 2 unknown tracking id, 3 analysis failed.

use anyhow::Result;

use parcelwatch::config::Config;
use parcelwatch::fixtures::find_parcel;
use parcelwatch::insight::{self, combined::run_analysis};
use parcelwatch::logging;
use parcelwatch::ui::board::TrackingBoard;
use parcelwatch::ui::card::Transition;
use parcelwatch::ui::render::render_card;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Some(selector) = std::env::args().nth(1) else {
        eprintln!("usage: analyze <tracking-id>");
        std::process::exit(1);
    };
    let Some(parcel) = find_parcel(&selector) else {
        eprintln!("unknown tracking id: {}", selector);
        std::process::exit(2);
    };

    let cfg = Config::from_env();
    let service = insight::build(&cfg)?;

    let mut board = TrackingBoard::new();
    board.mount(&[&parcel]);
    let Some((request_id, parcel)) = board.begin_analysis(&parcel.tracking_id) else {
        std::process::exit(2);
    };

    let outcome = run_analysis(service.as_ref(), &parcel, cfg.analysis_timeout).await;
    let failure = outcome.as_ref().err().map(|e| format!("{:#}", e));
    let transition = board.settle(&parcel.tracking_id, request_id, outcome);

    if let Some(card) = board.card(&parcel.tracking_id) {
        print!("{}", render_card(1, card));
    }
    logging::flush();

    if transition != Transition::Ready {
        eprintln!(
            "analysis failed: {}",
            failure.as_deref().unwrap_or("no result")
        );
        std::process::exit(3);
    }
    Ok(())
}
