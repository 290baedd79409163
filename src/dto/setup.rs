use serde::Deserialize;
use validator::Validate;

use crate::{
    dto::validation::validate_player_names,
    state::game::{Direction, Score, Variant},
};

/// Longest round timer accepted, in seconds.
pub const MAX_COUNTDOWN_SECONDS: u32 = 3600;

/// Payload used to start a brand-new game.
///
/// Omitted fields take the variant's preset. `direction` and the countdown
/// are only honored for customizable variants.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GameSetupRequest {
    pub variant: Variant,
    #[validate(
        length(min = 2, max = 8),
        custom(function = "validate_player_names")
    )]
    pub player_names: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub target_score: Option<Score>,
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Run a per-round timer.
    #[serde(default)]
    pub use_countdown: bool,
    /// Timer length; the preset applies when the timer is on and this is omitted.
    #[serde(default)]
    #[validate(range(min = 1, max = 3600))]
    pub countdown_seconds: Option<u32>,
}

impl GameSetupRequest {
    /// Request with only the variant and names set.
    pub fn new(variant: Variant, player_names: Vec<String>) -> Self {
        Self {
            variant,
            player_names,
            target_score: None,
            direction: None,
            use_countdown: false,
            countdown_seconds: None,
        }
    }
}
