use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", Multiline("Not found", .0))]
    NotFound(String),
    #[error("{}", Multiline("Invalid input", .0))]
    InvalidInput(String),
    #[error("{}", Multiline("Validation failed", .0))]
    Validation(String),
}

struct Multiline<'a>(&'a str, &'a String);

impl fmt::Display for Multiline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Multiline(label, message) = self;
        if message.contains('\n') {
            write!(f, "{label}:\n{message}")
        } else {
            write!(f, "{label}: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_messages_stay_inline() {
        let err = AppError::NotFound("goal id 7".to_string());
        assert_eq!(err.to_string(), "Not found: goal id 7");
    }

    #[test]
    fn multiline_messages_break_after_label() {
        let err = AppError::Validation("first\nsecond".to_string());
        assert_eq!(err.to_string(), "Validation failed:\nfirst\nsecond");
    }
}
