//! Settings for a [`Filterable`](crate::Filterable) registry set.
//!
//! All fields have defaults, so an empty document is a valid configuration:
//!
//! ```rust,ignore
//! let config: FilterConfig = serde_json::from_str(r#"{
//!     "default_sort": "created_at",
//!     "direction": "desc",
//!     "placement": "last"
//! }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::sort::SortDirection;

/// Request field read by the sort dispatch unless configured otherwise
pub const DEFAULT_ORDER_BY_PARAM: &str = "order_by";

/// Where the `order_by` filter runs relative to the other filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderByPlacement {
    /// Keep the position of the first `apply()`; later calls overwrite in place
    #[default]
    FirstUse,
    /// Move the entry to the end on every `apply()`
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Request field naming the sort to apply
    pub order_by_param: String,
    /// Request field that may override the shared direction for one request
    pub direction_param: Option<String>,
    pub placement: OrderByPlacement,
    /// Initial shared sort direction
    pub direction: SortDirection,
    /// Default sort, validated by `Filterable::apply_config_defaults` once sorts exist
    pub default_sort: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order_by_param: DEFAULT_ORDER_BY_PARAM.to_string(),
            direction_param: None,
            placement: OrderByPlacement::default(),
            direction: SortDirection::default(),
            default_sort: None,
        }
    }
}
