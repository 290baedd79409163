pub mod countdown;
pub mod game;
pub mod round;
pub mod standings;
pub mod state_machine;

use std::sync::Arc;

use crate::{config::AppConfig, dao::game::GameRepository, dao::game_store::GameStore};

pub type SharedState = Arc<AppState>;

/// Long-lived handles shared by every game session.
pub struct AppState {
    config: AppConfig,
    repository: GameRepository,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn GameStore>) -> SharedState {
        Arc::new(Self {
            config,
            repository: GameRepository::new(store),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Saved-game repository.
    pub fn repository(&self) -> &GameRepository {
        &self.repository
    }
}
