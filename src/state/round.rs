//! Folding a round of inputs into the cumulative totals.

use serde::Serialize;
use tracing::debug;

use crate::{
    error::EngineError,
    state::{
        game::GameState,
        standings::{highest_total, leader, trailer},
    },
};

/// Result of committing a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Nobody reached the target; play continues with `round`.
    Continuing {
        /// Round number now in progress.
        round: u32,
    },
    /// The target was reached.
    Finished {
        /// Best player under the configured direction.
        winner: String,
        /// Worst player under the configured direction.
        loser: String,
    },
}

/// Add every pending input to its player's total, zero the inputs, then
/// decide whether the game is over.
///
/// The round counter only advances when play continues. The target is tested
/// against the highest total for both directions; the direction only decides
/// who wins.
pub fn commit_round(state: &mut GameState) -> Result<Outcome, EngineError> {
    ensure_consistent(state)?;

    let GameState {
        configuration,
        totals,
        pending_round,
        round_number,
    } = state;

    for name in &configuration.player_names {
        let delta = pending_round.get(name).copied().unwrap_or(0);
        if let Some(total) = totals.get_mut(name) {
            *total = total.saturating_add(delta);
        }
        pending_round.insert(name.clone(), 0);
    }

    let highest = highest_total(totals)?;
    debug!(
        variant = %configuration.variant,
        round = *round_number,
        highest,
        target = configuration.target_score,
        "round folded"
    );

    if highest >= configuration.target_score {
        let winner = leader(totals, configuration.direction)?;
        let loser = trailer(totals, configuration.direction)?;
        return Ok(Outcome::Finished {
            winner: winner.name,
            loser: loser.name,
        });
    }

    *round_number += 1;
    Ok(Outcome::Continuing {
        round: *round_number,
    })
}

fn ensure_consistent(state: &GameState) -> Result<(), EngineError> {
    let names = &state.configuration.player_names;
    if names.is_empty() || state.totals.is_empty() {
        return Err(EngineError::InvalidConfiguration(
            "a game requires at least one player".into(),
        ));
    }

    let totals_match =
        state.totals.len() == names.len() && names.iter().all(|name| state.totals.contains_key(name));
    let pending_match = state.pending_round.keys().all(|key| names.contains(key));

    if !totals_match || !pending_match {
        return Err(EngineError::InvalidConfiguration(
            "player names disagree with recorded scores".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::state::{
        game::{Direction, GameConfiguration, Score, Variant},
        standings::standings,
    };

    fn game(players: &[&str], target: Score, direction: Direction) -> GameState {
        let config = GameConfiguration::new(
            Variant::Custom,
            players.iter().map(|name| name.to_string()).collect(),
            target,
            direction,
            None,
        )
        .unwrap();
        GameState::new(config)
    }

    fn enter(state: &mut GameState, inputs: &[(&str, Score)]) {
        for (name, value) in inputs {
            assert!(state.set_pending(name, *value));
        }
    }

    #[test]
    fn two_round_scenario_ends_with_a_winner() {
        let mut state = game(&["A", "B"], 50, Direction::AscendingWins);

        enter(&mut state, &[("A", 20), ("B", 15)]);
        assert_eq!(commit_round(&mut state), Ok(Outcome::Continuing { round: 2 }));
        assert_eq!(state.totals()["A"], 20);
        assert_eq!(state.totals()["B"], 15);

        enter(&mut state, &[("A", 35), ("B", 10)]);
        assert_eq!(
            commit_round(&mut state),
            Ok(Outcome::Finished {
                winner: "A".into(),
                loser: "B".into()
            })
        );
        assert_eq!(state.totals()["A"], 55);
        assert_eq!(state.totals()["B"], 25);
        assert_eq!(state.round_number(), 2);
    }

    #[test]
    fn totals_equal_sum_of_committed_rounds() {
        let mut state = game(&["A", "B", "C"], 10_000, Direction::AscendingWins);
        let rounds: [[Score; 3]; 4] = [[3, 0, 7], [12, 5, 0], [0, 0, 0], [40, 9, 1]];
        let mut expected = [0; 3];

        for inputs in rounds {
            enter(&mut state, &[("A", inputs[0]), ("B", inputs[1]), ("C", inputs[2])]);
            for (slot, value) in expected.iter_mut().zip(inputs) {
                *slot += value;
            }
            assert!(matches!(commit_round(&mut state), Ok(Outcome::Continuing { .. })));
            assert!(state.pending_round().values().all(|value| *value == 0));
        }

        assert_eq!(state.totals().values().copied().collect::<Vec<_>>(), expected);
        assert_eq!(state.round_number(), 5);
    }

    #[test]
    fn negative_corrections_are_applied() {
        let mut state = game(&["A", "B"], 100, Direction::AscendingWins);
        enter(&mut state, &[("A", 30)]);
        commit_round(&mut state).unwrap();
        enter(&mut state, &[("A", -12), ("B", -3)]);
        commit_round(&mut state).unwrap();

        assert_eq!(state.totals()["A"], 18);
        assert_eq!(state.totals()["B"], -3);
    }

    #[test]
    fn descending_game_ends_when_anyone_crosses_the_target() {
        let mut state = game(&["A", "B"], 100, Direction::DescendingWins);
        enter(&mut state, &[("A", 105), ("B", 60)]);

        let outcome = commit_round(&mut state).unwrap();

        assert_eq!(
            outcome,
            Outcome::Finished {
                winner: "B".into(),
                loser: "A".into()
            }
        );
        let order: Vec<_> = standings(state.totals(), Direction::DescendingWins)
            .into_iter()
            .map(|row| row.name)
            .collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn reaching_the_target_exactly_ends_the_game() {
        let mut state = game(&["A", "B"], 100, Direction::AscendingWins);
        enter(&mut state, &[("A", 100)]);
        assert!(matches!(commit_round(&mut state), Ok(Outcome::Finished { .. })));
        assert_eq!(state.round_number(), 1);
    }

    #[test]
    fn tie_at_the_target_goes_to_the_earlier_joiner() {
        let mut state = game(&["Zoe", "Adam"], 50, Direction::AscendingWins);
        enter(&mut state, &[("Zoe", 50), ("Adam", 50)]);
        assert_eq!(
            commit_round(&mut state),
            Ok(Outcome::Finished {
                winner: "Zoe".into(),
                loser: "Adam".into()
            })
        );
    }

    #[test]
    fn empty_game_is_rejected() {
        let mut state = game(&["A"], 10, Direction::AscendingWins);
        state.configuration.player_names.clear();
        state.totals.clear();
        state.pending_round.clear();

        assert!(matches!(
            commit_round(&mut state),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn mismatched_maps_are_rejected() {
        let mut state = game(&["A", "B"], 10, Direction::AscendingWins);
        state.totals = IndexMap::from([("A".to_string(), 0)]);

        assert!(matches!(
            commit_round(&mut state),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }
}
