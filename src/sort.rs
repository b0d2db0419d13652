use sea_orm::{
    ColumnTrait, QueryOrder,
    sea_query::{Order, OrderedStatement},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};
use utoipa::ToSchema;

use crate::errors::FilterError;

/// Function applying one named sort to a query builder in the given direction
pub type SortFn<Q> = Arc<dyn Fn(&mut Q, SortDirection) -> Result<(), FilterError> + Send + Sync>;

/// Ascending or descending sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse `asc`/`desc` ignoring ASCII case, surrounding whitespace not allowed
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

impl FromStr for SortDirection {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| FilterError::InvalidDirection {
            value: value.to_string(),
        })
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// Wrap a closure as a [`SortFn`]
pub fn sort_fn<Q, F>(function: F) -> SortFn<Q>
where
    F: Fn(&mut Q, SortDirection) -> Result<(), FilterError> + Send + Sync + 'static,
{
    Arc::new(function)
}

/// Sort that orders a Sea-ORM query by `column`
///
/// ```rust,ignore
/// filters.add_sort("created_at", column_sort(order::Column::CreatedAt))?;
/// ```
pub fn column_sort<Q, C>(column: C) -> SortFn<Q>
where
    Q: QueryOrder + 'static,
    C: ColumnTrait + Send + Sync,
{
    sort_fn(move |query: &mut Q, direction: SortDirection| {
        QueryOrder::query(query).order_by(column, direction.into());
        Ok(())
    })
}

/// A type that hands over a set of named sorts for bulk registration
///
/// ```rust,ignore
/// struct OrderSorts;
///
/// impl SortProvider<Select<order::Entity>> for OrderSorts {
///     fn sorts(&self) -> Result<Vec<(String, SortFn<Select<order::Entity>>)>, FilterError> {
///         Ok(vec![
///             ("name".to_string(), column_sort(order::Column::Name)),
///             ("created_at".to_string(), column_sort(order::Column::CreatedAt)),
///         ])
///     }
/// }
/// ```
pub trait SortProvider<Q> {
    /// Named sorts in the order they should be registered
    ///
    /// # Errors
    ///
    /// Returns a `FilterError` if the provider cannot produce its sorts; nothing is
    /// registered in that case.
    fn sorts(&self) -> Result<Vec<(String, SortFn<Q>)>, FilterError>;

    /// Label used in logs and errors
    fn provider_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
