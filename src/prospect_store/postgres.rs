use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};

use super::{ProspectStore, StoreError};
use crate::domain::new_prospect::NewProspect;
use crate::domain::prospect::Prospect;
use crate::domain::prospect_email::ProspectEmail;

pub struct PgProspectStore {
    db_pool: PgPool,
}

impl PgProspectStore {
    pub fn new(db_pool: PgPool) -> PgProspectStore {
        PgProspectStore { db_pool }
    }
}

#[async_trait]
impl ProspectStore for PgProspectStore {
    #[tracing::instrument(name = "Find a prospect by email", skip(self))]
    async fn find_by_email(&self, email: &ProspectEmail) -> Result<Option<Prospect>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, created_date
            FROM prospect
            WHERE email = $1
            "#,
        )
        .bind(email.as_ref())
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        row.map(parse_prospect).transpose()
    }

    #[tracing::instrument(name = "Find a prospect by id", skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<Prospect>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, created_date
            FROM prospect
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        row.map(parse_prospect).transpose()
    }

    #[tracing::instrument(
        name = "Insert a new prospect into the database",
        skip(self, new_prospect),
        fields(prospect_email = %new_prospect.email)
    )]
    async fn save(&self, new_prospect: &NewProspect) -> Result<Prospect, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO prospect (email, created_date)
            VALUES ($1, $2)
            RETURNING id, email, created_date
            "#,
        )
        .bind(new_prospect.email.as_ref())
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            err
        })?;

        parse_prospect(row)
    }

    #[tracing::instrument(name = "Delete a prospect from the database", skip(self))]
    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM prospect WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                err
            })?;

        Ok(())
    }
}

fn parse_prospect(row: PgRow) -> Result<Prospect, StoreError> {
    let email = ProspectEmail::parse(row.try_get("email")?).map_err(StoreError::CorruptRecord)?;

    Ok(Prospect {
        id: row.try_get("id")?,
        email,
        created_date: row.try_get("created_date")?,
    })
}
