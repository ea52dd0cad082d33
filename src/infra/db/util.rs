use crate::application::repos::RepoError;

/// Normalize sqlx errors into the repository taxonomy by sniffing the
/// driver message, since sqlx surfaces most Postgres failures as opaque
/// database errors.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    let db = match err {
        sqlx::Error::RowNotFound => return RepoError::NotFound,
        sqlx::Error::Database(db) => db,
        other => return RepoError::from_persistence(other),
    };

    let message = db.message();
    if message.contains("duplicate key") {
        RepoError::Duplicate {
            constraint: db.constraint().unwrap_or("unknown").to_string(),
        }
    } else if message.contains("violates foreign key constraint")
        || message.contains("invalid input syntax")
    {
        RepoError::InvalidInput {
            message: message.to_string(),
        }
    } else if message.contains("violates") {
        RepoError::Integrity {
            message: message.to_string(),
        }
    } else if message.contains("canceling statement due to user request") {
        RepoError::Timeout
    } else {
        RepoError::from_persistence(message)
    }
}
