//! Dashboard shell: root state reducer, per-parcel cards, the card grid and the
//! text renderer.

pub mod board;
pub mod card;
pub mod dashboard;
pub mod render;
