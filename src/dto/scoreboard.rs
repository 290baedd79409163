use serde::Serialize;

use crate::state::{
    game::{Direction, GameState, Score, Variant},
    standings::standings,
};

/// Rendering view of a game: standings best-first plus the round in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub variant: Variant,
    pub round: u32,
    pub target_score: Score,
    pub direction: Direction,
    pub rows: Vec<ScoreRow>,
}

/// One player's line on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRow {
    /// 1-based position; tied totals keep distinct positions in join order.
    pub rank: usize,
    pub name: String,
    pub total: Score,
    /// Input entered for the round in progress.
    pub pending: Score,
    pub is_leader: bool,
}

impl From<&GameState> for Scoreboard {
    fn from(state: &GameState) -> Self {
        let configuration = state.configuration();
        let rows = standings(state.totals(), configuration.direction)
            .into_iter()
            .enumerate()
            .map(|(index, standing)| ScoreRow {
                rank: index + 1,
                pending: state
                    .pending_round()
                    .get(&standing.name)
                    .copied()
                    .unwrap_or(0),
                name: standing.name,
                total: standing.total,
                is_leader: index == 0,
            })
            .collect();

        Self {
            variant: configuration.variant,
            round: state.round_number(),
            target_score: configuration.target_score,
            direction: configuration.direction,
            rows,
        }
    }
}
