//! Optimal seating of a group of friends along a single theatre row.
//!
//! Each guest assigns a directed utility to sitting next to each other
//! guest. The score of a seating is the sum, over every adjacent pair, of
//! both directions' utility. [`search::search`] enumerates every order of
//! the whole group and returns the best score with all arrangements that
//! reach it.

pub mod config;
pub mod graph;
pub mod input;
pub mod logging;
pub mod model;
pub mod present;
pub mod score;
pub mod search;

pub use graph::RelationGraph;
pub use model::arrangement::{Arrangement, Score};
pub use model::entity::{Name, Person, Utility};
pub use model::guest::GuestList;
pub use model::ModelError;
pub use score::score;
pub use search::{search, search_with_cancel, CancelToken, Seating, SearchConfig, SearchError};
