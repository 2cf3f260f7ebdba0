//! Headless search core (query -> gate -> effects).

pub mod effect;
pub mod query;
pub mod search;
pub mod services;

pub use effect::SearchEffect;
pub use query::{normalize, CaseSensitivity, QueryMode, SearchQuery, SearchSpec};
pub use search::{GateState, SearchState};
