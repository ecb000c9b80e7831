//! Queries over the action forest of a loaded capture.
//!
//! Every function here is pure: it takes the forest (and, for searches, the
//! provider) and returns a serialisable value. The router runs them on the
//! replay worker so the forest is never shared across threads.

mod details;
mod filter;
mod model;
mod search;
mod summary;
mod timings;

pub use self::details::{ActionDetails, action_details, find_action};
pub use self::filter::{ActionFilter, ActionNode, filter_actions};
#[cfg(test)]
pub(crate) use self::model::fixtures;
pub use self::model::{Action, ActionFlag, ActionFlags};
pub use self::search::{SearchMatch, SearchQuery, SearchResults, find_draws};
pub use self::summary::{FrameSummary, ResourceCounts, Statistics, TopLevelMarker, summarise};
pub use self::timings::{ActionTiming, ActionTimings, action_timings, scoped_leaves};
