//! Named, request-driven filters and sorts for Sea-ORM queries.
//!
//! Register filter and sort functions once on a shared [`Filterable`], then apply
//! the whole set to each request's query through a [`FilterContext`].

pub mod config;
pub mod errors;
pub mod filter;
pub mod filterable;
pub mod models;
pub mod operations;
pub mod registry;
pub mod sort;

pub use config::{FilterConfig, OrderByPlacement};
pub use errors::FilterError;
pub use filter::{FilterFn, FilterProvider, contains_filter, eq_filter, filter_fn};
pub use filterable::{FilterContext, Filterable, NoPreFilter, ORDER_BY_FILTER, PreFilter};
pub use models::{RequestData, RequestParams};
pub use operations::{count, fetch_all, filtered_select};
pub use registry::NamedRegistry;
pub use sort::{SortDirection, SortFn, SortProvider, column_sort, sort_fn};
