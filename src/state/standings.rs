//! Ordering of cumulative totals and leader selection.
//!
//! Ties keep join order: totals are stored in an [`IndexMap`] keyed in the
//! order players joined, and the sort below is stable.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    error::EngineError,
    state::game::{Direction, Score},
};

/// One row of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Player name.
    pub name: String,
    /// Cumulative total.
    pub total: Score,
}

/// Order totals best-first under `direction`.
pub fn standings(totals: &IndexMap<String, Score>, direction: Direction) -> Vec<Standing> {
    let mut rows: Vec<Standing> = totals
        .iter()
        .map(|(name, total)| Standing {
            name: name.clone(),
            total: *total,
        })
        .collect();

    match direction {
        Direction::AscendingWins => rows.sort_by(|a, b| b.total.cmp(&a.total)),
        Direction::DescendingWins => rows.sort_by(|a, b| a.total.cmp(&b.total)),
    }

    rows
}

/// Player currently winning under `direction`.
pub fn leader(totals: &IndexMap<String, Score>, direction: Direction) -> Result<Standing, EngineError> {
    standings(totals, direction)
        .into_iter()
        .next()
        .ok_or(EngineError::EmptyStandings)
}

/// Player currently losing under `direction`.
pub fn trailer(
    totals: &IndexMap<String, Score>,
    direction: Direction,
) -> Result<Standing, EngineError> {
    standings(totals, direction)
        .pop()
        .ok_or(EngineError::EmptyStandings)
}

/// Highest total regardless of direction; the end-of-game threshold is
/// always checked against it.
pub fn highest_total(totals: &IndexMap<String, Score>) -> Result<Score, EngineError> {
    totals
        .values()
        .copied()
        .max()
        .ok_or(EngineError::EmptyStandings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(entries: &[(&str, Score)]) -> IndexMap<String, Score> {
        entries
            .iter()
            .map(|(name, total)| (name.to_string(), *total))
            .collect()
    }

    fn names(rows: &[Standing]) -> Vec<&str> {
        rows.iter().map(|row| row.name.as_str()).collect()
    }

    #[test]
    fn ascending_orders_highest_first() {
        let rows = standings(&totals(&[("A", 60), ("B", 105), ("C", 80)]), Direction::AscendingWins);
        assert_eq!(names(&rows), vec!["B", "C", "A"]);
    }

    #[test]
    fn descending_orders_lowest_first() {
        let rows = standings(&totals(&[("A", 105), ("B", 60)]), Direction::DescendingWins);
        assert_eq!(names(&rows), vec!["B", "A"]);
    }

    #[test]
    fn ties_keep_join_order() {
        let table = totals(&[("Zoe", 10), ("Adam", 10), ("Mia", 3)]);

        let asc = standings(&table, Direction::AscendingWins);
        assert_eq!(names(&asc), vec!["Zoe", "Adam", "Mia"]);

        let desc = standings(&table, Direction::DescendingWins);
        assert_eq!(names(&desc), vec!["Mia", "Zoe", "Adam"]);
    }

    #[test]
    fn leader_and_trailer_follow_direction() {
        let table = totals(&[("A", 105), ("B", 60)]);

        assert_eq!(leader(&table, Direction::AscendingWins).unwrap().name, "A");
        assert_eq!(trailer(&table, Direction::AscendingWins).unwrap().name, "B");
        assert_eq!(leader(&table, Direction::DescendingWins).unwrap().name, "B");
        assert_eq!(trailer(&table, Direction::DescendingWins).unwrap().name, "A");
    }

    #[test]
    fn empty_totals_have_no_leader() {
        let table = IndexMap::new();
        assert_eq!(
            leader(&table, Direction::AscendingWins),
            Err(EngineError::EmptyStandings)
        );
        assert_eq!(highest_total(&table), Err(EngineError::EmptyStandings));
    }
}
