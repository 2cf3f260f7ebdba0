use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULTS: usize = 5000;
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default = "default_rg_path")]
    pub rg_path: String,
    #[serde(default)]
    pub read_mode: ReadMode,
}

/// stdout 读取策略。`Auto` 在启动时探测一次。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    #[default]
    Auto,
    Streaming,
    Buffered,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            include_hidden: false,
            rg_path: default_rg_path(),
            read_mode: ReadMode::Auto,
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_rg_path() -> String {
    "rg".to_string()
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
