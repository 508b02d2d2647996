//! Database repositories.

pub mod class;
pub mod person;
pub mod quote;
pub mod reaction;
pub mod user;

pub use class::ClassRepository;
pub use person::PersonRepository;
pub use quote::{QuoteFilter, QuoteRepository};
pub use reaction::ReactionRepository;
pub use user::UserRepository;

use quotebook_common::{AppError, ValidationKind};
use sea_orm::{DbErr, SqlErr};

/// Unique indexes whose violation is a caller-visible field error.
const UNIQUE_PATHS: &[(&str, &str)] = &[
    ("idx_user_username", "username"),
    ("idx_user_email", "email"),
    ("idx_class_name", "name"),
    ("idx_person_name", "name"),
];

/// Translate a write error: unique-constraint violations on known indexes
/// become field validation failures, everything else is a database fault.
pub(crate) fn map_write_err(err: DbErr) -> AppError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        if let Some(path) = unique_violation_path(&message) {
            return AppError::validation(path, ValidationKind::Unique);
        }
    }
    AppError::Database(err.to_string())
}

fn unique_violation_path(message: &str) -> Option<&'static str> {
    UNIQUE_PATHS
        .iter()
        .find(|(index, _)| message.contains(index))
        .map(|&(_, path)| path)
}
