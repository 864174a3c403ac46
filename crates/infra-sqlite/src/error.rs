// sqlx::Error -> AppError mapping

use taskhub_core::error::AppError;

/// Convert sqlx::Error to AppError with structured information
///
/// UNIQUE violations become `Conflict` so callers can report duplicates;
/// everything else is a `Database` error.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let Some(code) = db_err.code() else {
                return AppError::Database(format!("Database error: {}", db_err.message()));
            };

            // SQLite extended result codes: https://www.sqlite.org/rescode.html
            match code.as_ref() {
                "2067" | "1555" => AppError::Conflict(format!(
                    "Unique constraint violation: {}",
                    db_err.message()
                )),
                "787" => AppError::Database(format!(
                    "Foreign key constraint violation: {}",
                    db_err.message()
                )),
                "5" | "517" => AppError::Database(format!(
                    "Database locked (SQLITE_BUSY): {}",
                    db_err.message()
                )),
                "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                other => AppError::Database(format!(
                    "Database error [{}]: {}",
                    other,
                    db_err.message()
                )),
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}

/// Stored value that no longer parses into its domain type
pub(crate) fn corrupt(column: &str, detail: impl std::fmt::Display) -> AppError {
    AppError::Database(format!("Corrupt value in column {}: {}", column, detail))
}
