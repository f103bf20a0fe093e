use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::graph::{Index, RelationGraph};
use crate::model::arrangement::{Arrangement, Score};
use crate::model::guest::GuestList;
use crate::model::ModelError;

pub const DEFAULT_MAX_GUESTS: usize = 10;

/// Leaves visited between two cancellation/deadline checks.
const CHECK_INTERVAL: u64 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Largest guest list the exhaustive search will accept.
    pub max_guests: usize,
    /// Most tied arrangements kept in the result; the rest are only counted.
    ///
    /// Without a cap every tie is held in memory. When most utilities are
    /// zero nearly every order ties, and at ten guests that is 10! rows.
    pub max_winners: Option<usize>,
    pub timeout: Option<Duration>,
    /// Split the permutation space by first seat and search the parts on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_guests: DEFAULT_MAX_GUESTS,
            max_winners: None,
            timeout: None,
            parallel: false,
        }
    }
}

/// Shared flag that asks a running search to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Winning score and the complete arrangements reaching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seating {
    pub score: Score,
    /// Lexicographically smallest winners, at most `max_winners` of them.
    pub arrangements: Vec<Arrangement>,
    /// Number of arrangements tied at `score`, kept or not.
    pub winners: u64,
    #[serde(skip)]
    pub leaves: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("{guests} guests exceed the exhaustive search limit of {limit}")]
    ComplexityLimitExceeded { guests: usize, limit: usize },
    #[error("search was cancelled")]
    Cancelled,
    #[error("search did not finish within {after:?}")]
    TimedOut { after: Duration },
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub fn search(guests: &GuestList, config: &SearchConfig) -> Result<Seating, SearchError> {
    search_with_cancel(guests, config, &CancelToken::new())
}

pub fn search_with_cancel(
    guests: &GuestList,
    config: &SearchConfig,
    cancel: &CancelToken,
) -> Result<Seating, SearchError> {
    if guests.len() > config.max_guests {
        warn!(guests = guests.len(), limit = config.max_guests, "guest list too large");
        return Err(SearchError::ComplexityLimitExceeded {
            guests: guests.len(),
            limit: config.max_guests,
        });
    }
    let graph = RelationGraph::build(guests)?;
    if graph.is_empty() {
        return Ok(Seating {
            score: 0,
            arrangements: Vec::new(),
            winners: 0,
            leaves: 0,
        });
    }

    let stop = Stop {
        cancel,
        deadline: config.timeout.map(|timeout| (Instant::now() + timeout, timeout)),
    };
    let cap = config.max_winners.unwrap_or(usize::MAX).max(1);
    let run = |first: Index| Searcher::new(&graph, &stop, cap).run(first);
    let outcome = if config.parallel {
        (0..graph.len())
            .into_par_iter()
            .map(run)
            .try_reduce(|| Best::new(cap), |left, right| Ok(left.merge(right)))
    } else {
        (0..graph.len())
            .map(run)
            .try_fold(Best::new(cap), |acc, part| part.map(|part| acc.merge(part)))
    };
    let best = match outcome {
        Ok(best) => best,
        Err(err) => {
            warn!(error = %err, "search stopped");
            return Err(err);
        }
    };

    let mut paths = best.paths;
    // Vertices are in name order, so index order is name order.
    paths.sort_unstable();
    let seating = Seating {
        score: best.score.unwrap_or(0),
        arrangements: paths
            .iter()
            .map(|path| Arrangement(graph.names_of(path)))
            .collect(),
        winners: best.winners,
        leaves: best.leaves,
    };
    info!(
        guests = graph.len(),
        score = seating.score,
        winners = seating.winners,
        kept = seating.arrangements.len(),
        leaves = seating.leaves,
        "search finished"
    );
    Ok(seating)
}

struct Stop<'a> {
    cancel: &'a CancelToken,
    deadline: Option<(Instant, Duration)>,
}

impl Stop<'_> {
    fn check(&self) -> Result<(), SearchError> {
        if self.cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        match self.deadline {
            Some((deadline, after)) if Instant::now() >= deadline => Err(SearchError::TimedOut { after }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
struct Best {
    score: Option<Score>,
    paths: Vec<Vec<Index>>,
    winners: u64,
    leaves: u64,
    cap: usize,
}

impl Best {
    fn new(cap: usize) -> Best {
        Best {
            score: None,
            paths: Vec::new(),
            winners: 0,
            leaves: 0,
            cap,
        }
    }

    // Leaves arrive in lexicographic order within a partition, so the kept
    // paths are always the smallest ties seen so far.
    fn offer(&mut self, score: Score, path: &[Index]) {
        match self.score.map(|best| score.cmp(&best)) {
            Some(CmpOrdering::Less) => {}
            Some(CmpOrdering::Equal) => {
                self.winners += 1;
                if self.paths.len() < self.cap {
                    self.paths.push(path.to_vec());
                }
            }
            None | Some(CmpOrdering::Greater) => {
                self.score = Some(score);
                self.winners = 1;
                self.paths.clear();
                self.paths.push(path.to_vec());
            }
        }
    }

    fn merge(mut self, other: Best) -> Best {
        let leaves = self.leaves + other.leaves;
        let mut merged = match (self.score, other.score) {
            (_, None) => self,
            (None, Some(_)) => other,
            (Some(mine), Some(theirs)) => match mine.cmp(&theirs) {
                CmpOrdering::Greater => self,
                CmpOrdering::Less => other,
                CmpOrdering::Equal => {
                    self.winners += other.winners;
                    self.paths.extend(other.paths);
                    if self.paths.len() > self.cap {
                        self.paths.sort_unstable();
                        self.paths.truncate(self.cap);
                    }
                    self
                }
            },
        };
        merged.leaves = leaves;
        merged
    }
}

/// Backtracking over one first-seat partition.
struct Searcher<'a> {
    graph: &'a RelationGraph,
    stop: &'a Stop<'a>,
    path: Vec<Index>,
    placed: Vec<bool>,
    best: Best,
}

impl<'a> Searcher<'a> {
    fn new(graph: &'a RelationGraph, stop: &'a Stop<'a>, cap: usize) -> Searcher<'a> {
        Searcher {
            graph,
            stop,
            path: Vec::with_capacity(graph.len()),
            placed: vec![false; graph.len()],
            best: Best::new(cap),
        }
    }

    fn run(mut self, first: Index) -> Result<Best, SearchError> {
        self.stop.check()?;
        self.placed[first] = true;
        self.path.push(first);
        self.extend(first, 0)?;
        debug!(
            first = %self.graph.name(first),
            score = ?self.best.score,
            winners = self.best.winners,
            leaves = self.best.leaves,
            "partition finished"
        );
        Ok(self.best)
    }

    fn extend(&mut self, last: Index, partial: Score) -> Result<(), SearchError> {
        if self.path.len() == self.graph.len() {
            self.best.leaves += 1;
            if self.best.leaves % CHECK_INTERVAL == 0 {
                self.stop.check()?;
            }
            debug_assert_eq!(partial, self.graph.path_score(&self.path));
            self.best.offer(partial, &self.path);
            return Ok(());
        }
        for next in 0..self.graph.len() {
            if self.placed[next] {
                continue;
            }
            self.placed[next] = true;
            self.path.push(next);
            let result = self.extend(next, partial + self.graph.pair(last, next));
            self.path.pop();
            self.placed[next] = false;
            result?;
        }
        Ok(())
    }
}
