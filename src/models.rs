use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Read-only access to named request values.
///
/// Registered filters receive the request through this trait and decide for
/// themselves which fields they read. The sort dispatch reads exactly one field,
/// `order_by` unless configured otherwise.
pub trait RequestData {
    /// Value of `key`, or `None` when the request does not carry it
    fn input(&self, key: &str) -> Option<&str>;

    fn has(&self, key: &str) -> bool {
        self.input(key).is_some()
    }
}

impl<T: RequestData + ?Sized> RequestData for &T {
    fn input(&self, key: &str) -> Option<&str> {
        (**self).input(key)
    }
}

impl RequestData for HashMap<String, String> {
    fn input(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl RequestData for BTreeMap<String, String> {
    fn input(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Query-string parameters of an incoming request.
///
/// Deserializes from any flat string map, so it can be extracted directly:
///
/// ```rust,ignore
/// async fn list(Query(params): Query<RequestParams>) -> impl IntoResponse {
///     // GET /orders?status=active&order_by=name
///     assert_eq!(params.input("order_by"), Some("name"));
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(HashMap<String, String>);

impl RequestParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and internal callers
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl RequestData for RequestParams {
    fn input(&self, key: &str) -> Option<&str> {
        self.0.input(key)
    }
}

impl From<HashMap<String, String>> for RequestParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self(values)
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
