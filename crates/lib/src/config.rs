//! Engine configuration threaded through every entry point.

use serde::{Deserialize, Serialize};

/// Options controlling field lookup, element construction and batching.
///
/// # Example
///
/// ```
/// use ysync::Config;
///
/// let config = Config::default()
///     .with_case_insensitive(false)
///     .with_init_children(true);
/// assert!(config.tag_lookup);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolve struct fields through their declared alias.
    pub tag_lookup: bool,

    /// Resolve struct fields ignoring ASCII case, treating `-` and `_` as equal.
    pub case_insensitive: bool,

    /// Allocate every optional field deeply when building a list element
    /// from a structured key.
    pub init_children: bool,

    /// Match plain, non-empty list keys by content instead of as an index.
    pub find_by_content: bool,

    /// Queue events between batch begin and end and apply them at the end.
    pub buffer_batches: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_lookup: true,
            case_insensitive: true,
            init_children: false,
            find_by_content: false,
            buffer_batches: false,
        }
    }
}

impl Config {
    pub fn with_tag_lookup(mut self, enabled: bool) -> Self {
        self.tag_lookup = enabled;
        self
    }

    pub fn with_case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    pub fn with_init_children(mut self, enabled: bool) -> Self {
        self.init_children = enabled;
        self
    }

    pub fn with_find_by_content(mut self, enabled: bool) -> Self {
        self.find_by_content = enabled;
        self
    }

    pub fn with_buffer_batches(mut self, enabled: bool) -> Self {
        self.buffer_batches = enabled;
        self
    }
}
