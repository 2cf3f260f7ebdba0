//! Service ports: data contracts shared by the kernel and the adapters.

pub mod search;
pub mod settings;

pub use search::{
    MatchRecord, NavigationTarget, PickerItem, SearchEnd, SearchError, SearchFailure, SearchMessage,
};
pub use settings::{ReadMode, SearchSettings, Settings};
