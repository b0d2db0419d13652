//! # Filtered Queries
//!
//! Helpers that start from `E::find()`, run a [`Filterable`] pass over it and
//! execute the result. Handlers that need more control (pagination, joins) can
//! take the [`filtered_select`] output and keep chaining on it.
//!
//! ```rust,ignore
//! async fn list_orders(
//!     State(app): State<AppState>,
//!     Query(params): Query<RequestParams>,
//! ) -> Result<Json<Vec<order::Model>>, FilterError> {
//!     let scope = |query: &mut Select<order::Entity>, _: &RequestParams| -> Result<(), FilterError> {
//!         QueryFilter::query(query).and_where(order::Column::Deleted.eq(false));
//!         Ok(())
//!     };
//!     Ok(Json(fetch_all(&app.db, &app.filters, &params, scope).await?))
//! }
//! ```

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};

use crate::{
    errors::FilterError,
    filterable::{Filterable, PreFilter},
    models::RequestData,
};

/// `E::find()` with every registered filter applied
///
/// # Errors
///
/// Returns the first error raised while applying filters.
pub fn filtered_select<E, R, P>(
    filterable: &Filterable<Select<E>, R>,
    request: &R,
    pre_filter: P,
) -> Result<Select<E>, FilterError>
where
    E: EntityTrait,
    R: RequestData + 'static,
    P: PreFilter<Select<E>, R>,
{
    let mut query = E::find();
    filterable.apply(&mut query, request, pre_filter)?;
    Ok(query)
}

/// Apply the filters and load every matching model
///
/// # Errors
///
/// Returns the first filter error, or [`FilterError::Database`] if the query fails.
pub async fn fetch_all<E, C, R, P>(
    db: &C,
    filterable: &Filterable<Select<E>, R>,
    request: &R,
    pre_filter: P,
) -> Result<Vec<E::Model>, FilterError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    R: RequestData + 'static,
    P: PreFilter<Select<E>, R>,
{
    let query = filtered_select(filterable, request, pre_filter)?;
    let models = query.all(db).await?;
    tracing::debug!(rows = models.len(), "Loaded filtered models");
    Ok(models)
}

/// Apply the filters and count the matching rows
///
/// # Errors
///
/// Returns the first filter error, or [`FilterError::Database`] if the query fails.
pub async fn count<E, C, R, P>(
    db: &C,
    filterable: &Filterable<Select<E>, R>,
    request: &R,
    pre_filter: P,
) -> Result<u64, FilterError>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
    R: RequestData + 'static,
    P: PreFilter<Select<E>, R>,
{
    let query = filtered_select(filterable, request, pre_filter)?;
    Ok(PaginatorTrait::count(query, db).await?)
}
