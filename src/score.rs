use itertools::Itertools;

use crate::graph::{Index, RelationGraph};
use crate::model::arrangement::{Arrangement, Score};
use crate::model::guest::GuestList;

/// Aggregate utility of an arrangement: both directions of every adjacent pair.
pub fn score(arrangement: &Arrangement, guests: &GuestList) -> Score {
    arrangement
        .names()
        .iter()
        .tuple_windows()
        .map(|(left, right)| Score::from(guests.utility(left, right)) + Score::from(guests.utility(right, left)))
        .sum()
}

impl RelationGraph {
    pub fn path_score(&self, path: &[Index]) -> Score {
        path.iter()
            .tuple_windows()
            .map(|(&left, &right)| self.pair(left, right))
            .sum()
    }
}
