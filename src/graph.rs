use tracing::debug;

use crate::model::arrangement::Score;
use crate::model::entity::{Name, Utility};
use crate::model::guest::GuestList;
use crate::model::ModelError;

pub type Index = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub to: Index,
    pub utility: Utility,
}

/// Directed utility graph over the guest list.
///
/// Vertices are indexed in ascending name order. Alongside the sparse edge
/// lists the graph keeps a dense table of bidirectional pair weights, so the
/// search can score an adjacency with one lookup.
#[derive(Debug, Clone)]
pub struct RelationGraph {
    names: Vec<Name>,
    edges: Vec<Vec<Edge>>,
    pairs: Vec<Score>,
}

impl RelationGraph {
    pub fn build(guests: &GuestList) -> Result<RelationGraph, ModelError> {
        let names: Vec<Name> = guests.names().cloned().collect();
        let n = names.len();
        let mut edges = vec![Vec::new(); n];
        let mut pairs = vec![0; n * n];

        for (from, person) in guests.people().enumerate() {
            for (other, utility) in person.utilities() {
                let to = names
                    .binary_search(other)
                    .map_err(|_| ModelError::ReferentialIntegrity {
                        person: person.name.clone(),
                        missing: other.clone(),
                    })?;
                edges[from].push(Edge { to, utility });
                pairs[from * n + to] += Score::from(utility);
                pairs[to * n + from] += Score::from(utility);
            }
        }

        debug!(
            vertices = n,
            edges = edges.iter().map(Vec::len).sum::<usize>(),
            "built relation graph"
        );
        Ok(RelationGraph { names, edges, pairs })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: Index) -> &Name {
        &self.names[index]
    }

    pub fn index_of(&self, name: &str) -> Option<Index> {
        self.names.binary_search_by(|probe| probe.as_str().cmp(name)).ok()
    }

    pub fn edges(&self, from: Index) -> &[Edge] {
        &self.edges[from]
    }

    /// Directed weight `from -> to`, 0 without an edge.
    pub fn utility(&self, from: Index, to: Index) -> Utility {
        self.edges[from]
            .iter()
            .find(|edge| edge.to == to)
            .map_or(0, |edge| edge.utility)
    }

    /// Sum of both directions between `a` and `b`.
    #[inline]
    pub fn pair(&self, a: Index, b: Index) -> Score {
        self.pairs[a * self.names.len() + b]
    }

    pub fn names_of(&self, path: &[Index]) -> Vec<Name> {
        path.iter().map(|&index| self.names[index].clone()).collect()
    }
}
