//! # Registry Set & Filtering Context
//!
//! [`Filterable`] owns the filter registry, the sort registry, the default sort
//! name and the shared sort direction. Build one at start-up, register filters
//! and sorts on it, then share it across requests behind an `Arc`.
//!
//! Each request builds a [`FilterContext`] over the shared set, its own query
//! builder and its own request values, and calls [`FilterContext::apply`]:
//!
//! 1. the context's [`PreFilter`] runs first;
//! 2. the sort dispatch is (re-)registered under [`ORDER_BY_FILTER`], capturing the
//!    current default sort, sorts and direction;
//! 3. every registered filter runs in registry order, `order_by` included.
//!
//! The first failing filter aborts the pass and its error is returned.
//!
//! ## Locking
//!
//! State sits behind one `RwLock`. The sort registry is kept behind an `Arc` and
//! copied on write, so the dispatch built by each `apply()` shares it instead of
//! cloning it. `apply()` only takes the write lock when `order_by` still has to be
//! inserted or moved; otherwise it copies the filter list under the read lock with
//! a fresh dispatch swapped in. Filters run after the lock is released and may
//! register new entries; those show up from the next `apply()` on.
//!
//! ```rust,ignore
//! let filters: Arc<Filterable<Select<order::Entity>, RequestParams>> = Arc::new(Filterable::new());
//! filters.add_filter("status", eq_filter("status", order::Column::Status))?;
//! filters.add_sort("created_at", column_sort(order::Column::CreatedAt))?;
//! filters.set_default_sort("created_at")?;
//!
//! let mut query = order::Entity::find();
//! filters.context(&mut query, &params, NoPreFilter).apply()?;
//! let orders = query.all(&db).await?;
//! ```

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    config::{FilterConfig, OrderByPlacement},
    errors::FilterError,
    filter::{FilterFn, FilterProvider, filter_fn},
    models::RequestData,
    registry::{NamedRegistry, validate_name},
    sort::{SortDirection, SortFn, SortProvider},
};

/// Filter registry key of the sort dispatch
pub const ORDER_BY_FILTER: &str = "order_by";

/// Hook run before the registered filters, for request-specific logic such as
/// scoping by tenant.
pub trait PreFilter<Q, R> {
    /// # Errors
    ///
    /// A failure aborts `apply()` before any registered filter runs.
    fn pre_filter(&self, query: &mut Q, request: &R) -> Result<(), FilterError>;
}

impl<Q, R, F> PreFilter<Q, R> for F
where
    F: Fn(&mut Q, &R) -> Result<(), FilterError>,
{
    fn pre_filter(&self, query: &mut Q, request: &R) -> Result<(), FilterError> {
        self(query, request)
    }
}

/// Pre-filter for contexts with nothing to add
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreFilter;

impl<Q, R> PreFilter<Q, R> for NoPreFilter {
    fn pre_filter(&self, _query: &mut Q, _request: &R) -> Result<(), FilterError> {
        Ok(())
    }
}

struct State<Q, R> {
    filters: NamedRegistry<FilterFn<Q, R>>,
    sorts: Arc<NamedRegistry<SortFn<Q>>>,
    default_sort: Option<String>,
    direction: SortDirection,
}

/// Shared filter and sort registries plus default-sort and direction state
pub struct Filterable<Q, R> {
    state: RwLock<State<Q, R>>,
    config: FilterConfig,
}

impl<Q, R> fmt::Debug for Filterable<Q, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Filterable")
            .field("filters", &state.filters.keys().collect::<Vec<_>>())
            .field("sorts", &state.sorts.keys().collect::<Vec<_>>())
            .field("default_sort", &state.default_sort)
            .field("direction", &state.direction)
            .field("config", &self.config)
            .finish()
    }
}

impl<Q, R> Default for Filterable<Q, R> {
    fn default() -> Self {
        Self::with_config(FilterConfig::default())
    }
}

impl<Q, R> Filterable<Q, R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty registry set; the shared direction starts at `config.direction`.
    ///
    /// `config.default_sort` cannot be checked yet, call
    /// [`apply_config_defaults`](Self::apply_config_defaults) once sorts are registered.
    #[must_use]
    pub fn with_config(config: FilterConfig) -> Self {
        Self {
            state: RwLock::new(State {
                filters: NamedRegistry::new(),
                sorts: Arc::new(NamedRegistry::new()),
                default_sort: None,
                direction: config.direction,
            }),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, State<Q, R>> {
        self.state.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Filter registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, State<Q, R>> {
        self.state.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Filter registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Register or overwrite the filter `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidName`] for an empty name.
    pub fn add_filter(
        &self,
        name: impl Into<String>,
        filter: FilterFn<Q, R>,
    ) -> Result<(), FilterError> {
        let name = name.into();
        self.write().filters.register(name.clone(), filter)?;
        tracing::debug!(filter = %name, "Registered filter");
        Ok(())
    }

    /// Register or overwrite the sort `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidName`] for an empty name.
    pub fn add_sort(&self, name: impl Into<String>, sort: SortFn<Q>) -> Result<(), FilterError> {
        let name = name.into();
        Arc::make_mut(&mut self.write().sorts).register(name.clone(), sort)?;
        tracing::debug!(sort = %name, "Registered sort");
        Ok(())
    }

    /// Register every filter of `provider`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns the provider's own error, or [`FilterError::InvalidName`] if any
    /// supplied name is empty. Nothing is registered on error.
    pub fn add_filters_from<P>(&self, provider: &P) -> Result<usize, FilterError>
    where
        P: FilterProvider<Q, R> + ?Sized,
    {
        let filters = provider.filters().inspect_err(|err| {
            tracing::warn!(
                provider = provider.provider_name(),
                error = %err,
                "Filter provider failed"
            );
        })?;
        for (name, _) in &filters {
            validate_name(name)?;
        }

        let count = filters.len();
        let mut state = self.write();
        for (name, filter) in filters {
            state.filters.register(name, filter)?;
        }
        tracing::debug!(
            provider = provider.provider_name(),
            count,
            "Registered filters from provider"
        );
        Ok(count)
    }

    /// Register every sort of `provider`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns the provider's own error, or [`FilterError::InvalidName`] if any
    /// supplied name is empty. Nothing is registered on error.
    pub fn add_sorts_from<P>(&self, provider: &P) -> Result<usize, FilterError>
    where
        P: SortProvider<Q> + ?Sized,
    {
        let sorts = provider.sorts().inspect_err(|err| {
            tracing::warn!(
                provider = provider.provider_name(),
                error = %err,
                "Sort provider failed"
            );
        })?;
        for (name, _) in &sorts {
            validate_name(name)?;
        }

        let count = sorts.len();
        let mut state = self.write();
        let registry = Arc::make_mut(&mut state.sorts);
        for (name, sort) in sorts {
            registry.register(name, sort)?;
        }
        tracing::debug!(
            provider = provider.provider_name(),
            count,
            "Registered sorts from provider"
        );
        Ok(count)
    }

    /// Set the shared sort direction from `asc`/`desc`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidDirection`] for any other input; the current
    /// direction is kept.
    pub fn set_direction(&self, value: &str) -> Result<SortDirection, FilterError> {
        let Some(direction) = SortDirection::parse(value) else {
            tracing::warn!(value, "Ignoring invalid sort direction");
            return Err(FilterError::InvalidDirection {
                value: value.to_string(),
            });
        };
        self.set_sort_direction(direction);
        Ok(direction)
    }

    pub fn set_sort_direction(&self, direction: SortDirection) {
        self.write().direction = direction;
        tracing::debug!(%direction, "Sort direction changed");
    }

    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.read().direction
    }

    /// Use the registered sort `name` when a request names no known sort.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownSort`] if `name` is not a registered sort;
    /// the previous default is kept.
    pub fn set_default_sort(&self, name: &str) -> Result<(), FilterError> {
        let mut state = self.write();
        if !state.sorts.contains(name) {
            tracing::warn!(sort = name, "Ignoring default sort that is not registered");
            return Err(FilterError::UnknownSort {
                name: name.to_string(),
            });
        }
        state.default_sort = Some(name.to_string());
        tracing::debug!(sort = name, "Default sort changed");
        Ok(())
    }

    #[must_use]
    pub fn default_sort(&self) -> Option<String> {
        self.read().default_sort.clone()
    }

    /// Apply `config.default_sort`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownSort`] if the configured name is not registered.
    pub fn apply_config_defaults(&self) -> Result<(), FilterError> {
        match self.config.default_sort.as_deref() {
            Some(name) => self.set_default_sort(name),
            None => Ok(()),
        }
    }

    /// Filter names in application order
    #[must_use]
    pub fn filter_names(&self) -> Vec<String> {
        self.read().filters.keys().map(str::to_string).collect()
    }

    /// Sort names in registration order
    #[must_use]
    pub fn sort_names(&self) -> Vec<String> {
        self.read().sorts.keys().map(str::to_string).collect()
    }

    #[must_use]
    pub fn has_filter(&self, name: &str) -> bool {
        self.read().filters.contains(name)
    }

    #[must_use]
    pub fn has_sort(&self, name: &str) -> bool {
        self.read().sorts.contains(name)
    }
}

impl<Q, R> Filterable<Q, R>
where
    Q: 'static,
    R: RequestData + 'static,
{
    /// Build the context for one request
    pub fn context<'a, P>(
        &'a self,
        query: &'a mut Q,
        request: &'a R,
        pre_filter: P,
    ) -> FilterContext<'a, Q, R, P>
    where
        P: PreFilter<Q, R>,
    {
        FilterContext::new(self, query, request, pre_filter)
    }

    /// Shorthand for `self.context(query, request, pre_filter).apply()`
    ///
    /// # Errors
    ///
    /// See [`FilterContext::apply`].
    pub fn apply<P>(&self, query: &mut Q, request: &R, pre_filter: P) -> Result<(), FilterError>
    where
        P: PreFilter<Q, R>,
    {
        self.context(query, request, pre_filter).apply()
    }

    /// Register the sort dispatch for this pass and copy the filter list
    fn prepare(&self) -> Result<Vec<(String, FilterFn<Q, R>)>, FilterError> {
        {
            let state = self.read();
            if self.order_by_in_place(&state) {
                let dispatch = self.sort_dispatch(&state);
                return Ok(state.filters.snapshot_with(ORDER_BY_FILTER, dispatch));
            }
        }

        let mut state = self.write();
        let dispatch = self.sort_dispatch(&state);
        match self.config.placement {
            OrderByPlacement::FirstUse => state.filters.register(ORDER_BY_FILTER, dispatch)?,
            OrderByPlacement::Last => state.filters.register_last(ORDER_BY_FILTER, dispatch)?,
        }
        Ok(state.filters.snapshot())
    }

    /// Whether `order_by` already sits where the configured placement wants it
    fn order_by_in_place(&self, state: &State<Q, R>) -> bool {
        let position = state.filters.position(ORDER_BY_FILTER);
        match self.config.placement {
            OrderByPlacement::FirstUse => position.is_some(),
            OrderByPlacement::Last => position.is_some_and(|at| at + 1 == state.filters.len()),
        }
    }

    fn sort_dispatch(&self, state: &State<Q, R>) -> FilterFn<Q, R> {
        let sorts = Arc::clone(&state.sorts);
        let default = state.default_sort.clone();
        let shared_direction = state.direction;
        let order_by_param = self.config.order_by_param.clone();
        let direction_param = self.config.direction_param.clone();

        filter_fn(move |query: &mut Q, request: &R| {
            let direction = direction_param
                .as_deref()
                .and_then(|param| request.input(param))
                .and_then(SortDirection::parse)
                .unwrap_or(shared_direction);
            let requested = request.input(&order_by_param);

            let chosen = requested
                .and_then(|name| sorts.get(name).map(|sort| (name, sort)))
                .or_else(|| {
                    default
                        .as_deref()
                        .and_then(|name| sorts.get(name).map(|sort| (name, sort)))
                });
            let Some((name, sort)) = chosen else {
                return Err(FilterError::SortNotFound {
                    requested: requested.map(str::to_string),
                    default: default.clone(),
                });
            };

            tracing::trace!(sort = name, %direction, "Applying sort");
            sort(query, direction)
        })
    }
}

/// One application of the registered filters to one query and one request
pub struct FilterContext<'a, Q, R, P> {
    filterable: &'a Filterable<Q, R>,
    query: &'a mut Q,
    request: &'a R,
    pre_filter: P,
}

impl<Q, R, P: fmt::Debug> fmt::Debug for FilterContext<'_, Q, R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterContext")
            .field("filterable", self.filterable)
            .field("pre_filter", &self.pre_filter)
            .finish_non_exhaustive()
    }
}

impl<'a, Q, R, P> FilterContext<'a, Q, R, P>
where
    Q: 'static,
    R: RequestData + 'static,
    P: PreFilter<Q, R>,
{
    pub fn new(
        filterable: &'a Filterable<Q, R>,
        query: &'a mut Q,
        request: &'a R,
        pre_filter: P,
    ) -> Self {
        Self {
            filterable,
            query,
            request,
            pre_filter,
        }
    }

    /// Run the pre-filter, refresh `order_by`, then run every registered filter in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the pre-filter or a filter, including
    /// [`FilterError::SortNotFound`] from the sort dispatch. Filters after the
    /// failing one do not run; mutations made before it stay on the query.
    pub fn apply(&mut self) -> Result<(), FilterError> {
        self.pre_filter.pre_filter(&mut *self.query, self.request)?;

        let filters = self.filterable.prepare()?;
        for (name, filter) in &filters {
            tracing::trace!(filter = %name, "Applying filter");
            filter(&mut *self.query, self.request).inspect_err(|err| {
                tracing::debug!(filter = %name, error = %err, "Filter aborted apply");
            })?;
        }
        Ok(())
    }

    #[must_use]
    pub fn query(&self) -> &Q {
        &*self.query
    }

    #[must_use]
    pub fn request(&self) -> &R {
        self.request
    }
}
