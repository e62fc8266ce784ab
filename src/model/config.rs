use serde::{Deserialize, Serialize};

/// Fallback badge color when the palette is empty
pub const FALLBACK_COLOR: &str = "#2A3647";

/// Configuration from join.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `https://…` for a remote document store, `file:///…` for a local JSON file
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds. Absent means requests may wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Colors handed out to new contacts
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// Card descriptions are truncated to this many cells
    #[serde(default = "default_description_width")]
    pub description_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            palette: default_palette(),
            description_width: default_description_width(),
        }
    }
}

fn default_palette() -> Vec<String> {
    [
        "#FF7A00", "#FF5EB3", "#6E52FF", "#9327FF", "#00BEE8", "#1FD7C1", "#FF745E", "#FFA35E",
        "#FC71FF", "#FFC701", "#0038FF", "#C3FF2B", "#FFE62B", "#FF4646", "#FFBB2B",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_description_width() -> usize {
    48
}
