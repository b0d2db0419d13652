use sea_orm::{
    ColumnTrait, QueryFilter,
    sea_query::{BinOper, ConditionalStatement, Expr, Func, SimpleExpr},
};
use std::sync::Arc;

use crate::{errors::FilterError, models::RequestData};

/// Function applying one named filter to a query builder using request values
pub type FilterFn<Q, R> = Arc<dyn Fn(&mut Q, &R) -> Result<(), FilterError> + Send + Sync>;

// Basic safety limit on request values copied into conditions
pub const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// Escape character declared on every `LIKE` built by [`contains_filter`]
pub const LIKE_ESCAPE: char = '!';

/// Wrap a closure as a [`FilterFn`]
pub fn filter_fn<Q, R, F>(function: F) -> FilterFn<Q, R>
where
    F: Fn(&mut Q, &R) -> Result<(), FilterError> + Send + Sync + 'static,
{
    Arc::new(function)
}

/// Trimmed value of `param`, `None` when absent or blank
fn request_value<'r, R>(request: &'r R, param: &str) -> Result<Option<&'r str>, FilterError>
where
    R: RequestData + ?Sized,
{
    let Some(value) = request.input(param).map(str::trim) else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }
    if value.len() > MAX_FIELD_VALUE_LENGTH {
        return Err(FilterError::bad_request(format!(
            "Value for '{param}' exceeds {MAX_FIELD_VALUE_LENGTH} characters"
        )));
    }
    Ok(Some(value))
}

/// Make `%`, `_` and the escape character itself match literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Filter adding `column = value` when the request carries a non-blank `param`.
///
/// # Errors
///
/// The returned filter fails with [`FilterError::BadRequest`] when the value is
/// longer than [`MAX_FIELD_VALUE_LENGTH`].
pub fn eq_filter<Q, R, C>(param: impl Into<String>, column: C) -> FilterFn<Q, R>
where
    Q: QueryFilter + 'static,
    R: RequestData + 'static,
    C: ColumnTrait + Send + Sync,
{
    let param = param.into();
    filter_fn(move |query: &mut Q, request: &R| {
        if let Some(value) = request_value(request, &param)? {
            QueryFilter::query(query).and_where(column.eq(value));
        }
        Ok(())
    })
}

/// Case-insensitive substring filter on `column` when the request carries a
/// non-blank `param`.
///
/// Builds `UPPER(column) LIKE UPPER('%value%') ESCAPE '!'`; `%` and `_` in the
/// value match literally.
///
/// # Errors
///
/// The returned filter fails with [`FilterError::BadRequest`] when the value is
/// longer than [`MAX_FIELD_VALUE_LENGTH`].
pub fn contains_filter<Q, R, C>(param: impl Into<String>, column: C) -> FilterFn<Q, R>
where
    Q: QueryFilter + 'static,
    R: RequestData + 'static,
    C: ColumnTrait + Send + Sync,
{
    let param = param.into();
    filter_fn(move |query: &mut Q, request: &R| {
        if let Some(value) = request_value(request, &param)? {
            QueryFilter::query(query).and_where(contains_condition(column, value));
        }
        Ok(())
    })
}

fn contains_condition<C: ColumnTrait>(column: C, value: &str) -> SimpleExpr {
    let pattern = Func::upper(Expr::val(format!("%{}%", escape_like(value))));
    let escaped_pattern = SimpleExpr::Binary(
        Box::new(pattern.into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant(LIKE_ESCAPE.into())),
    );
    Expr::expr(Func::upper(Expr::col((column.entity_name(), column))))
        .binary(BinOper::Like, escaped_pattern)
}

/// A type that hands over a set of named filters for bulk registration.
///
/// Replaces member enumeration: the provider lists its filters explicitly and
/// reports failure through the return value.
///
/// ```rust,ignore
/// struct OrderFilters;
///
/// impl FilterProvider<Select<order::Entity>, RequestParams> for OrderFilters {
///     fn filters(&self) -> Result<Vec<(String, FilterFn<Select<order::Entity>, RequestParams>)>, FilterError> {
///         Ok(vec![("status".to_string(), eq_filter("status", order::Column::Status))])
///     }
/// }
/// ```
pub trait FilterProvider<Q, R> {
    /// Named filters in the order they should be registered
    ///
    /// # Errors
    ///
    /// Returns a `FilterError` if the provider cannot produce its filters; nothing is
    /// registered in that case.
    fn filters(&self) -> Result<Vec<(String, FilterFn<Q, R>)>, FilterError>;

    /// Label used in logs and errors
    fn provider_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
