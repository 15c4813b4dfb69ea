use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use std::io::Error as IoError;
use thiserror::Error;

/// The record kinds the desk manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Guest,
    Service,
    Appointment,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Guest => "guest",
            Entity::Service => "service",
            Entity::Appointment => "appointment",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad classes of [`DeskError`], used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Format,
    Constraint,
    NotFound,
    Store,
}

/// Errors returned by the registry, catalog and ledger.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("a {0} must be selected")]
    SelectionRequired(Entity),
    #[error("{entity} #{id} does not exist")]
    UnknownReference { entity: Entity, id: i64 },
    #[error("{field} {value:?} is not a valid {expected}")]
    Format {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{entity} #{id} is still referenced by {count} appointment(s)")]
    StillReferenced { entity: Entity, id: i64, count: i64 },
    #[error("no {0} is selected")]
    NothingSelected(Entity),
    #[error("{entity} #{id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("database error: {0}")]
    Store(#[from] SqlxError),
}

pub type DeskResult<T> = std::result::Result<T, DeskError>;

impl DeskError {
    pub fn format(field: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        DeskError::Format {
            field,
            value: value.into(),
            expected,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DeskError::SelectionRequired(_) | DeskError::UnknownReference { .. } => {
                ErrorKind::Validation
            }
            DeskError::Format { .. } => ErrorKind::Format,
            DeskError::StillReferenced { .. } => ErrorKind::Constraint,
            DeskError::NothingSelected(_) | DeskError::NotFound { .. } => ErrorKind::NotFound,
            DeskError::Store(_) => ErrorKind::Store,
        }
    }
}

pub const VALIDATION_SELECTION_REQUIRED: &str = "VALIDATION/SELECTION_REQUIRED";
pub const VALIDATION_UNKNOWN_REFERENCE: &str = "VALIDATION/UNKNOWN_REFERENCE";
pub const FORMAT_INVALID: &str = "FORMAT/INVALID";
pub const CONSTRAINT_REFERENCED: &str = "CONSTRAINT/REFERENCED";
pub const NOT_FOUND_NO_SELECTION: &str = "NOT_FOUND/NO_SELECTION";
pub const NOT_FOUND_ROW: &str = "NOT_FOUND/ROW";

/// A structured application error that can be serialized and surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    /// Machine readable error code.
    pub code: String,
    /// Human friendly message that can be shown directly to the user.
    pub message: String,
    /// Arbitrary key/value pairs that provide additional context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError {
            code: code.into(),
            message: message.into(),
            context: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    /// Adds a contextual key/value pair to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Maps the code prefix back onto the error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        let prefix = self.code.split('/').next().unwrap_or_default();
        match prefix {
            "VALIDATION" => ErrorKind::Validation,
            "FORMAT" => ErrorKind::Format,
            "CONSTRAINT" => ErrorKind::Constraint,
            "NOT_FOUND" => ErrorKind::NotFound,
            _ => ErrorKind::Store,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            let mut pairs: Vec<_> = self.context.iter().collect();
            pairs.sort();
            write!(f, "[{}] {} ({:?})", self.code, self.message, pairs)
        }
    }
}

impl std::error::Error for AppError {}

impl From<IoError> for AppError {
    fn from(error: IoError) -> Self {
        let code = format!("IO/{:?}", error.kind());
        let mut app_error = AppError::new(code, error.to_string());
        if let Some(os_code) = error.raw_os_error() {
            app_error = app_error.with_context("os_code", os_code.to_string());
        }
        app_error
    }
}

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        match error {
            SqlxError::RowNotFound => AppError::new("SQLX/ROW_NOT_FOUND", "Record not found"),
            SqlxError::ColumnNotFound(name) => {
                AppError::new("SQLX/COLUMN_NOT_FOUND", format!("Column not found: {name}"))
            }
            SqlxError::PoolTimedOut => AppError::new(
                "SQLX/POOL_TIMEOUT",
                "Timed out acquiring a database connection",
            ),
            SqlxError::PoolClosed => AppError::new("SQLX/POOL_CLOSED", "Database pool is closed"),
            SqlxError::Io(err) => AppError::from(err).with_context("source", "sqlx"),
            SqlxError::Database(db) => {
                let code = db
                    .code()
                    .map(|code| format!("Sqlite/{code}"))
                    .unwrap_or_else(|| "SQLX/DATABASE".to_string());
                let mut app_error = AppError::new(code, db.message().to_string());
                if let Some(constraint) = db.constraint() {
                    app_error = app_error.with_context("constraint", constraint.to_string());
                }
                app_error
            }
            SqlxError::ColumnDecode { index, source } => {
                AppError::new("SQLX/COLUMN_DECODE", source.to_string())
                    .with_context("column_index", index.to_string())
            }
            SqlxError::Decode(decode_err) => AppError::new("SQLX/DECODE", decode_err.to_string()),
            other => AppError::new("SQLX/ERROR", other.to_string()),
        }
    }
}

impl From<DeskError> for AppError {
    fn from(error: DeskError) -> Self {
        let message = error.to_string();
        match error {
            DeskError::SelectionRequired(entity) => {
                AppError::new(VALIDATION_SELECTION_REQUIRED, message)
                    .with_context("entity", entity.as_str())
            }
            DeskError::UnknownReference { entity, id } => {
                AppError::new(VALIDATION_UNKNOWN_REFERENCE, message)
                    .with_context("entity", entity.as_str())
                    .with_context("id", id.to_string())
            }
            DeskError::Format {
                field,
                value,
                expected,
            } => AppError::new(FORMAT_INVALID, message)
                .with_context("field", field)
                .with_context("value", value)
                .with_context("expected", expected),
            DeskError::StillReferenced { entity, id, count } => {
                AppError::new(CONSTRAINT_REFERENCED, message)
                    .with_context("entity", entity.as_str())
                    .with_context("id", id.to_string())
                    .with_context("appointments", count.to_string())
            }
            DeskError::NothingSelected(entity) => AppError::new(NOT_FOUND_NO_SELECTION, message)
                .with_context("entity", entity.as_str()),
            DeskError::NotFound { entity, id } => AppError::new(NOT_FOUND_ROW, message)
                .with_context("entity", entity.as_str())
                .with_context("id", id.to_string()),
            DeskError::Store(err) => AppError::from(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desk_errors_map_to_codes_and_kinds() {
        let cases = [
            (
                DeskError::SelectionRequired(Entity::Guest),
                VALIDATION_SELECTION_REQUIRED,
                ErrorKind::Validation,
            ),
            (
                DeskError::format("price", "abc", "decimal number"),
                FORMAT_INVALID,
                ErrorKind::Format,
            ),
            (
                DeskError::StillReferenced {
                    entity: Entity::Service,
                    id: 3,
                    count: 2,
                },
                CONSTRAINT_REFERENCED,
                ErrorKind::Constraint,
            ),
            (
                DeskError::NothingSelected(Entity::Appointment),
                NOT_FOUND_NO_SELECTION,
                ErrorKind::NotFound,
            ),
        ];

        for (desk, code, kind) in cases {
            assert_eq!(desk.kind(), kind);
            let app = AppError::from(desk);
            assert_eq!(app.code(), code);
            assert_eq!(app.kind(), kind);
        }
    }

    #[test]
    fn format_error_keeps_offending_value() {
        let app = AppError::from(DeskError::format("date", "31.02.2024", "day.month.year date"));
        assert_eq!(app.context().get("value"), Some(&"31.02.2024".to_string()));
        assert!(app.message().contains("31.02.2024"));
    }

    #[test]
    fn sqlx_row_not_found_translates_to_specific_code() {
        let app_error = AppError::from(SqlxError::RowNotFound);
        assert_eq!(app_error.code(), "SQLX/ROW_NOT_FOUND");
        assert_eq!(app_error.kind(), ErrorKind::Store);
    }

    #[test]
    fn json_shape_is_flat_struct() {
        let error = AppError::new("VALIDATION/SELECTION_REQUIRED", "nope")
            .with_context("entity", "guest");
        let value = serde_json::to_value(&error).expect("serialize app error");
        assert_eq!(
            value.get("code").and_then(|v| v.as_str()),
            Some("VALIDATION/SELECTION_REQUIRED")
        );
        assert_eq!(
            value
                .get("context")
                .and_then(|c| c.get("entity"))
                .and_then(|v| v.as_str()),
            Some("guest")
        );
    }
}
