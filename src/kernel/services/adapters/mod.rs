//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod paths;
pub mod runtime;
pub mod search;
pub mod settings;
pub mod workspace;

pub use paths::{ensure_log_dir, get_log_dir};
pub use runtime::build_runtime;
pub use search::{
    parse_line, probe_read_strategy, ReadStrategy, RipgrepService, SearchCommand, SearchRun,
    SearchTask,
};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
pub use workspace::{resolve_search_root, roots_from_args, ConfigError};
