//! Conversions from external infrastructure errors into domain errors.

use passiae_domain::PassIaeError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub PassIaeError);

impl From<InfraError> for PassIaeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PassIaeError> for InfraError {
    fn from(value: PassIaeError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPassIaeError {
    fn into_passiae(self) -> PassIaeError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → PassIaeError */
/* -------------------------------------------------------------------------- */

impl IntoPassIaeError for SqlError {
    fn into_passiae(self) -> PassIaeError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => PassIaeError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        PassIaeError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        PassIaeError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        PassIaeError::Database("foreign key constraint violation".into())
                    }
                    _ => PassIaeError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => PassIaeError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                PassIaeError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                PassIaeError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => PassIaeError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidParameterName(parameter_name) => {
                PassIaeError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidPath(path) => PassIaeError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => PassIaeError::Database("invalid SQL query".into()),
            other => PassIaeError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_passiae())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → PassIaeError */
/* -------------------------------------------------------------------------- */

impl IntoPassIaeError for r2d2::Error {
    fn into_passiae(self) -> PassIaeError {
        PassIaeError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_passiae())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PassIaeError */
/* -------------------------------------------------------------------------- */

impl IntoPassIaeError for HttpError {
    fn into_passiae(self) -> PassIaeError {
        if self.is_builder() {
            return PassIaeError::Config(format!("invalid HTTP client configuration: {self}"));
        }

        if self.is_timeout() {
            return PassIaeError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return PassIaeError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => PassIaeError::Auth(message),
                404 => PassIaeError::NotFound(message),
                400..=499 if code != 429 => PassIaeError::InvalidInput(message),
                _ => PassIaeError::Network(message),
            };
        }

        PassIaeError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_passiae())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
