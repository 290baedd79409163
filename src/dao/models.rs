use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::EngineError,
    state::game::{Direction, GameConfiguration, GameState, Score, Variant},
};

/// Value persisted in `countdown` when no timer runs.
pub const COUNTDOWN_DISABLED: i64 = -1;

/// Record stored under `"<Variant>GameData"`.
///
/// A flat camelCase JSON object: player count, target, ordered names, totals,
/// pending inputs and round number, plus `countdown` and `isScoreToWin` for
/// custom games only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Number of entries in `names`.
    pub number_of_players: usize,
    /// Target score (integral part is used).
    pub max_score: f64,
    /// Player names in join order.
    pub names: Vec<String>,
    /// Cumulative totals.
    pub name_and_score: IndexMap<String, Score>,
    /// Inputs of the round that was being committed.
    pub round_scores: IndexMap<String, Score>,
    /// Round the record was written in.
    pub round_number: u32,
    /// Countdown seconds, `-1` when disabled. Custom games only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<i64>,
    /// `true` when the highest total wins. Custom games only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_score_to_win: Option<bool>,
}

impl From<&GameState> for GameRecord {
    fn from(state: &GameState) -> Self {
        let config = state.configuration();
        let (countdown, is_score_to_win) = if config.variant.is_customizable() {
            (
                Some(
                    config
                        .countdown_seconds
                        .map(i64::from)
                        .unwrap_or(COUNTDOWN_DISABLED),
                ),
                Some(config.direction.is_score_to_win()),
            )
        } else {
            (None, None)
        };

        Self {
            number_of_players: config.player_names.len(),
            max_score: config.target_score as f64,
            names: config.player_names.clone(),
            name_and_score: state.totals().clone(),
            round_scores: state.pending_round().clone(),
            round_number: state.round_number(),
            countdown,
            is_score_to_win,
        }
    }
}

impl GameRecord {
    /// Rebuild the game state this record was written from.
    pub fn into_state(self, variant: Variant) -> Result<GameState, EngineError> {
        if self.number_of_players != self.names.len() {
            return Err(EngineError::InvalidConfiguration(format!(
                "record lists {} names for {} players",
                self.names.len(),
                self.number_of_players
            )));
        }

        if !self.max_score.is_finite() {
            return Err(EngineError::InvalidConfiguration(
                "record target score is not a finite number".into(),
            ));
        }

        let direction = self
            .is_score_to_win
            .filter(|_| variant.is_customizable())
            .map(Direction::from_score_to_win)
            .unwrap_or_else(|| variant.default_direction());

        let countdown_seconds = self
            .countdown
            .filter(|_| variant.is_customizable())
            .and_then(|seconds| u32::try_from(seconds).ok());

        let configuration = GameConfiguration::new(
            variant,
            self.names,
            self.max_score.trunc() as Score,
            direction,
            countdown_seconds,
        )?;

        GameState::from_parts(
            configuration,
            self.name_and_score,
            self.round_scores,
            self.round_number,
        )
    }
}
