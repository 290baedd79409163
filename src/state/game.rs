use std::{collections::HashSet, fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Integer type used for round inputs and cumulative totals.
pub type Score = i64;

/// Game families the companion knows about. Each one owns an independent
/// persistence namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Partnership card game, highest total wins.
    Belote,
    /// Card game where the lowest total wins once someone reaches the target.
    Skyjo,
    /// Free-form game with a user-chosen direction and optional countdown.
    Custom,
    /// Dice game, highest total wins.
    Yam,
}

impl Variant {
    /// Every variant, in menu order.
    pub const ALL: [Variant; 4] = [
        Variant::Belote,
        Variant::Skyjo,
        Variant::Custom,
        Variant::Yam,
    ];

    /// Stable name used in storage keys and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Belote => "Belote",
            Variant::Skyjo => "Skyjo",
            Variant::Custom => "Custom",
            Variant::Yam => "Yam",
        }
    }

    /// Direction used when the player does not pick one.
    pub fn default_direction(self) -> Direction {
        match self {
            Variant::Skyjo => Direction::DescendingWins,
            Variant::Belote | Variant::Custom | Variant::Yam => Direction::AscendingWins,
        }
    }

    /// Only the custom game lets the player choose direction and countdown,
    /// so only its records carry those fields.
    pub fn is_customizable(self) -> bool {
        matches!(self, Variant::Custom)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown game `{value}`"))
    }
}

/// Which side of the scoreboard wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Highest total wins.
    AscendingWins,
    /// Lowest total wins.
    DescendingWins,
}

impl Direction {
    /// Map the persisted `isScoreToWin` flag onto a direction.
    pub fn from_score_to_win(score_to_win: bool) -> Self {
        if score_to_win {
            Direction::AscendingWins
        } else {
            Direction::DescendingWins
        }
    }

    /// Inverse of [`Direction::from_score_to_win`].
    pub fn is_score_to_win(self) -> bool {
        matches!(self, Direction::AscendingWins)
    }
}

/// Settings fixed for the whole lifetime of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfiguration {
    /// Game family, used to scope persistence.
    pub variant: Variant,
    /// Player names in join order (not score order).
    pub player_names: Vec<String>,
    /// Total that ends the game once reached.
    pub target_score: Score,
    /// Whether the highest or lowest total wins.
    pub direction: Direction,
    /// Seconds allowed per round, `None` when no timer runs.
    pub countdown_seconds: Option<u32>,
}

impl GameConfiguration {
    /// Build a configuration, rejecting player lists the engine cannot score.
    pub fn new(
        variant: Variant,
        player_names: Vec<String>,
        target_score: Score,
        direction: Direction,
        countdown_seconds: Option<u32>,
    ) -> Result<Self, EngineError> {
        if player_names.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "a game requires at least one player".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(player_names.len());
        for name in &player_names {
            if name.trim().is_empty() {
                return Err(EngineError::InvalidConfiguration(
                    "player name must not be empty".into(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "duplicate player name `{name}`"
                )));
            }
        }

        Ok(Self {
            variant,
            player_names,
            target_score,
            direction,
            countdown_seconds: countdown_seconds.filter(|seconds| *seconds > 0),
        })
    }
}

/// Mutable record of one game: totals, the round being entered, and the
/// round counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) configuration: GameConfiguration,
    pub(crate) totals: IndexMap<String, Score>,
    pub(crate) pending_round: IndexMap<String, Score>,
    pub(crate) round_number: u32,
}

impl GameState {
    /// Fresh game: every total and pending input at zero, round 1.
    pub fn new(configuration: GameConfiguration) -> Self {
        let zeroed: IndexMap<String, Score> = configuration
            .player_names
            .iter()
            .map(|name| (name.clone(), 0))
            .collect();

        Self {
            configuration,
            totals: zeroed.clone(),
            pending_round: zeroed,
            round_number: 1,
        }
    }

    /// Rebuild a state from stored maps.
    ///
    /// Totals must cover exactly the configured players. Pending entries may
    /// be missing (read as zero) but must not name unknown players. Both maps
    /// are re-keyed in join order.
    pub fn from_parts(
        configuration: GameConfiguration,
        totals: IndexMap<String, Score>,
        pending_round: IndexMap<String, Score>,
        round_number: u32,
    ) -> Result<Self, EngineError> {
        let names = &configuration.player_names;

        if totals.len() != names.len() || names.iter().any(|name| !totals.contains_key(name)) {
            return Err(EngineError::InvalidConfiguration(format!(
                "totals cover {} players but {} are configured",
                totals.len(),
                names.len()
            )));
        }

        if let Some(stray) = pending_round.keys().find(|key| !names.contains(*key)) {
            return Err(EngineError::InvalidConfiguration(format!(
                "round input for unknown player `{stray}`"
            )));
        }

        let ordered_totals = names
            .iter()
            .map(|name| (name.clone(), totals[name]))
            .collect();
        let ordered_pending = names
            .iter()
            .map(|name| (name.clone(), pending_round.get(name).copied().unwrap_or(0)))
            .collect();

        Ok(Self {
            configuration,
            totals: ordered_totals,
            pending_round: ordered_pending,
            round_number: round_number.max(1),
        })
    }

    /// Immutable game settings.
    pub fn configuration(&self) -> &GameConfiguration {
        &self.configuration
    }

    /// Cumulative totals in join order.
    pub fn totals(&self) -> &IndexMap<String, Score> {
        &self.totals
    }

    /// Inputs entered for the round in progress.
    pub fn pending_round(&self) -> &IndexMap<String, Score> {
        &self.pending_round
    }

    /// Round currently being played, starting at 1.
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Overwrite the pending input for `name`. Returns `false` when the name
    /// is not part of the game.
    pub fn set_pending(&mut self, name: &str, value: Score) -> bool {
        match self.pending_round.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
