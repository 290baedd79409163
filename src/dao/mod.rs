/// Saved-game repository implementing the per-variant save/load/clear contract.
pub mod game;
/// Durable key-value backends.
pub mod game_store;
/// Persisted record shapes.
pub mod models;
/// Storage error types shared by every backend.
pub mod storage;
