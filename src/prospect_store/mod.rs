use async_trait::async_trait;

use crate::domain::new_prospect::NewProspect;
use crate::domain::prospect::Prospect;
use crate::domain::prospect_email::ProspectEmail;

mod postgres;

pub use postgres::PgProspectStore;

/// Durable storage of prospects. Implementations must enforce email uniqueness
/// themselves: the service pre-check alone cannot prevent concurrent inserts.
#[async_trait]
pub trait ProspectStore: Send + Sync {
    async fn find_by_email(&self, email: &ProspectEmail) -> Result<Option<Prospect>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Prospect>, StoreError>;

    /// Assigns the id and creation date of the prospect and persists it.
    async fn save(&self, new_prospect: &NewProspect) -> Result<Prospect, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("A prospect with the same email is already stored.")]
    ConstraintViolation,
    #[error("Failed to execute a query against the prospect store.")]
    Database(#[source] sqlx::Error),
    #[error("Stored prospect is not valid: {0}")]
    CorruptRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let is_unique_violation = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map_or(false, |code| code == UNIQUE_VIOLATION);

        if is_unique_violation {
            StoreError::ConstraintViolation
        } else {
            StoreError::Database(err)
        }
    }
}

// SQLSTATE raised by Postgres when a UNIQUE constraint rejects a row.
const UNIQUE_VIOLATION: &str = "23505";
