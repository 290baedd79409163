/// Tokio driver for the per-round countdown.
pub mod countdown_service;
/// Game lifecycle: start, resume, round commits, cancel and acknowledge.
pub mod game_service;
