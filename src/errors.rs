//! # Error Handling for Filtering
//!
//! Every fallible operation in this crate returns [`FilterError`]. The enum covers:
//! - Lookup failures while dispatching the sort filter
//! - Rejected configuration input (unknown directions, unknown default sorts, empty names)
//! - Provider failures during bulk registration
//! - Failures raised by individual filter functions
//! - Database errors when a filtered query is executed
//!
//! ## Responses
//!
//! `FilterError` implements [`IntoResponse`], so handlers can return it directly.
//!
//! | Variant | Status |
//! |---|---|
//! | `InvalidDirection`, `UnknownSort`, `InvalidName`, `BadRequest` | 400 |
//! | `SortNotFound`, `Provider`, `Filter`, `Database` | 500 |
//!
//! Rejected input, whether passed to a setter or carried by the request, is a 400
//! and its message is returned as is. Lookup, provider, filter and database
//! failures are reported as a generic 500; their details are logged through
//! `tracing` and never sent to clients.
//!
//! ```rust,ignore
//! async fn list_orders(
//!     State(app): State<AppState>,
//!     Query(params): Query<RequestParams>,
//! ) -> Result<Json<Vec<order::Model>>, FilterError> {
//!     let orders = fetch_all::<order::Entity, _, _>(&app.db, &app.filters, &params, NoPreFilter).await?;
//!     Ok(Json(orders))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// Errors produced while registering or applying filters
#[derive(Debug)]
pub enum FilterError {
    /// Neither the requested sort nor the default sort names a registered sort
    SortNotFound {
        /// Sort name read from the request, if any
        requested: Option<String>,
        /// Default sort name at the time `apply()` ran, if any
        default: Option<String>,
    },

    /// A direction other than `asc`/`desc` was passed to a setter
    InvalidDirection {
        /// The rejected input
        value: String,
    },

    /// A default sort was requested for a name that is not registered
    UnknownSort {
        /// The rejected name
        name: String,
    },

    /// A filter or sort was registered under an empty name
    InvalidName,

    /// A bulk-registration provider failed to produce its functions
    Provider {
        /// Provider type or label
        provider: String,
        /// Failure details (logged, not sent to the user)
        message: String,
    },

    /// A registered filter failed while being applied
    Filter {
        /// Name the filter is registered under
        name: String,
        /// Failure details (logged, not sent to the user)
        message: String,
    },

    /// The request carried input a filter refused to apply
    BadRequest {
        /// User-facing message
        message: String,
    },

    /// Executing the filtered query failed
    Database(DbErr),
}

impl FilterError {
    /// Create a failure for the filter registered under `name`
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(FilterError::filter("tenant", "missing tenant header"));
    /// ```
    pub fn filter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a 400 Bad Request error
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(FilterError::bad_request("status must not be blank"));
    /// ```
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a provider failure for bulk registration
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// HTTP status code used when this error becomes a response
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidDirection { .. }
            | Self::UnknownSort { .. }
            | Self::InvalidName
            | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::SortNotFound { .. }
            | Self::Provider { .. }
            | Self::Filter { .. }
            | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Sanitized message sent to clients
    fn user_message(&self) -> String {
        match self {
            Self::InvalidDirection { value } => {
                format!("Invalid sort direction '{value}', expected 'asc' or 'desc'")
            }
            Self::UnknownSort { name } => format!("Unknown sort '{name}'"),
            Self::InvalidName => "Filter and sort names must not be empty".to_string(),
            Self::BadRequest { message } => message.clone(),
            Self::Database(_) => "A database error occurred".to_string(),
            Self::SortNotFound { .. } | Self::Provider { .. } | Self::Filter { .. } => {
                "Failed to apply filters".to_string()
            }
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::SortNotFound { requested, default } => {
                tracing::error!(
                    requested = ?requested,
                    default = ?default,
                    "No registered sort matches the request or the default"
                );
            }
            Self::Provider { provider, message } => {
                tracing::error!(provider = %provider, details = %message, "Filter provider failed");
            }
            Self::Filter { name, message } => {
                tracing::error!(filter = %name, details = %message, "Filter failed");
            }
            Self::Database(internal) => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "Filter error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SortNotFound { requested, default } => write!(
                f,
                "no registered sort for requested {requested:?} or default {default:?}"
            ),
            Self::Provider { provider, message } => {
                write!(f, "provider '{provider}' failed: {message}")
            }
            Self::Filter { name, message } => write!(f, "filter '{name}' failed: {message}"),
            Self::Database(err) => write!(f, "database error: {err}"),
            _ => write!(f, "{}", self.user_message()),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for FilterError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}
