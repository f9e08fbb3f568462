use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    normalize_email, AdminVerifier, Guess, NewPrediction, NewRegistry, Prediction,
    PredictionStore, Registry, RegistryStore, RevealState, RevealStateStore, RevealUpdate,
    StoreError, StoreResult,
};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(sqlx::FromRow)]
struct PredictionRow {
    id: Uuid,
    name: String,
    email: String,
    prediction: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PredictionRow> for Prediction {
    type Error = StoreError;

    fn try_from(r: PredictionRow) -> Result<Self, Self::Error> {
        // ---
        Ok(Prediction {
            id: r.id,
            name: r.name,
            email: r.email,
            prediction: parse_guess(&r.prediction)?,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RevealStateRow {
    id: Uuid,
    countdown_date: DateTime<Utc>,
    gender: Option<String>,
    is_revealed: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RevealStateRow> for RevealState {
    type Error = StoreError;

    fn try_from(r: RevealStateRow) -> Result<Self, Self::Error> {
        // ---
        Ok(RevealState {
            id: r.id,
            countdown_date: r.countdown_date,
            gender: r.gender.as_deref().map(parse_guess).transpose()?,
            is_revealed: r.is_revealed,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RegistryRow {
    id: Uuid,
    name: String,
    url: String,
    created_at: DateTime<Utc>,
}

fn parse_guess(value: &str) -> StoreResult<Guess> {
    // ---
    value
        .parse()
        .map_err(|err: anyhow::Error| StoreError::unavailable(err.to_string()))
}

/// Logs and wraps any unexpected sqlx failure.
fn unavailable(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    // ---
    move |err| {
        tracing::error!("{context}: {err}");
        StoreError::unavailable(err)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    // ---
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

pub fn create_postgres_repository(pool: PgPool) -> PostgresRepository {
    // ---
    PostgresRepository::new(pool)
}

/// One repository serves every gateway; they share the pool.
#[derive(Clone)]
pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PredictionStore for PostgresRepository {
    // ---
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Prediction>> {
        // ---
        let row = sqlx::query_as::<_, PredictionRow>(
            "SELECT id, name, email, prediction, created_at
             FROM predictions WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable("Error fetching prediction by email"))?;

        row.map(Prediction::try_from).transpose()
    }

    async fn create(&self, prediction: &NewPrediction) -> StoreResult<Prediction> {
        // ---
        let row = sqlx::query_as::<_, PredictionRow>(
            "INSERT INTO predictions (name, email, prediction)
             VALUES ($1, $2, $3)
             RETURNING id, name, email, prediction, created_at",
        )
        .bind(prediction.name())
        .bind(prediction.email())
        .bind(prediction.guess().as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::DuplicateEmail
            } else {
                unavailable("Error submitting prediction")(err)
            }
        })?;

        row.try_into()
    }

    async fn list(&self) -> StoreResult<Vec<Prediction>> {
        // ---
        let rows = sqlx::query_as::<_, PredictionRow>(
            "SELECT id, name, email, prediction, created_at
             FROM predictions ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable("Error fetching predictions"))?;

        rows.into_iter().map(Prediction::try_from).collect()
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<()> {
        // ---
        sqlx::query("DELETE FROM predictions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unavailable("Error deleting prediction"))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl RevealStateStore for PostgresRepository {
    // ---
    async fn read(&self) -> StoreResult<RevealState> {
        // ---
        let row = sqlx::query_as::<_, RevealStateRow>(
            "SELECT id, countdown_date, gender, is_revealed, updated_at
             FROM reveal_state LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable("Error fetching reveal state"))?;

        match row {
            Some(row) => row.try_into(),
            None => {
                tracing::error!("reveal_state has no row; seed it before starting the service");
                Err(StoreError::NotConfigured)
            }
        }
    }

    async fn update(&self, update: &RevealUpdate) -> StoreResult<RevealState> {
        // ---
        // The singleton id is whatever the seed assigned, so find it first.
        let id: Uuid = sqlx::query_scalar("SELECT id FROM reveal_state LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Error fetching reveal state id: {err}");
                StoreError::FetchSettings(err.into())
            })?
            .ok_or_else(|| {
                tracing::error!("Error fetching reveal state id: no row");
                StoreError::FetchSettings("reveal_state has no row".into())
            })?;

        let row = sqlx::query_as::<_, RevealStateRow>(
            "UPDATE reveal_state
             SET countdown_date = $1, gender = $2, is_revealed = $3, updated_at = now()
             WHERE id = $4
             RETURNING id, countdown_date, gender, is_revealed, updated_at",
        )
        .bind(update.countdown_date)
        .bind(update.gender.map(|g| g.as_str()))
        .bind(update.is_revealed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error updating reveal state: {err}");
            StoreError::SaveSettings(err.into())
        })?
        .ok_or_else(|| {
            tracing::error!("Error updating reveal state: row {id} vanished");
            StoreError::SaveSettings("update returned no row".into())
        })?;

        row.try_into()
    }
}

#[async_trait::async_trait]
impl RegistryStore for PostgresRepository {
    // ---
    async fn list(&self) -> StoreResult<Vec<Registry>> {
        // ---
        let rows = sqlx::query_as::<_, RegistryRow>(
            "SELECT id, name, url, created_at FROM registries ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable("Error fetching registries"))?;

        Ok(rows
            .into_iter()
            .map(|r| Registry {
                id: r.id,
                name: r.name,
                url: r.url,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn add(&self, registry: &NewRegistry) -> StoreResult<()> {
        // ---
        sqlx::query("INSERT INTO registries (name, url) VALUES ($1, $2)")
            .bind(registry.name())
            .bind(registry.url())
            .execute(&self.pool)
            .await
            .map_err(unavailable("Error adding registry"))?;

        Ok(())
    }

    async fn remove(&self, id: Uuid) -> StoreResult<()> {
        // ---
        sqlx::query("DELETE FROM registries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unavailable("Error deleting registry"))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl AdminVerifier for PostgresRepository {
    // ---
    async fn verify(&self, password: &str) -> StoreResult<bool> {
        // ---
        let verified: Option<bool> = sqlx::query_scalar("SELECT verify_admin_password($1)")
            .bind(password)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable("Error verifying admin password"))?;

        Ok(verified == Some(true))
    }
}
