use super::postgres_repository::*;
use crate::config::DatabaseConfig;
use crate::domain::{
    AdminVerifier, Guess, NewPrediction, NewRegistry, PredictionStore, RegistryStore,
    RevealStateStore, RevealUpdate, StoreError,
};
use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use std::time::Duration;
use tokio::runtime::Runtime;
use uuid::Uuid;

// One runtime to rule them all...
/// Shared tokio runtime for all database tests.
///
/// Every test shares this runtime so the pool outlives individual tests.
/// A per-test `#[tokio::test]` runtime would close pooled connections when
/// it drops, and later tests would time out waiting for new ones.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    // ---
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create TOKIO runtime")
});

static REPO: tokio::sync::OnceCell<Option<PostgresRepository>> =
    tokio::sync::OnceCell::const_new();

// Initialize tracing once for all tests
static TRACING_INIT: std::sync::Once = std::sync::Once::new();

fn init_tracing() {
    // ---
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_ansi(false) // No colorization, makes logs easier to read.
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Repository over the test database, or `None` when `DATABASE_URL` is unset.
async fn setup_repo() -> Option<PostgresRepository> {
    // ---
    init_tracing();

    REPO.get_or_init(|| async {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let config = DatabaseConfig {
            database_url,
            retry_count: 3,
            acquire_timeout: Duration::from_secs(5),
            min_connections: 1,
            max_connections: 5,
        };
        let pool = super::init_database_with_retry(&config)
            .await
            .expect("database init failed");
        Some(create_postgres_repository(pool))
    })
    .await
    .clone()
}

/// Unique email per test run so tests never collide on the constraint.
fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@Example.com", Uuid::new_v4().simple())
}

fn submission(name: &str, email: &str, guess: &str) -> NewPrediction {
    NewPrediction::parse(name, email, Some(guess)).expect("valid submission")
}

#[test]
fn test_create_and_find_prediction() {
    // ---
    RUNTIME.block_on(async {
        // --
        let Some(repo) = setup_repo().await else {
            eprintln!("DATABASE_URL not set; skipping");
            return;
        };

        let email = unique_email("ada");
        let created = repo
            .create(&submission("Ada", &email, "girl"))
            .await
            .expect("Failed to create prediction");

        assert_eq!(created.email, email.to_lowercase());
        assert_eq!(created.prediction, Guess::Girl);

        // Lookup ignores case and surrounding whitespace
        let padded = format!("  {}  ", email.to_uppercase());
        let found = repo
            .find_by_email(&padded)
            .await
            .expect("Lookup should succeed")
            .expect("Prediction not found");

        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Ada");

        repo.delete_by_id(created.id).await.expect("delete failed");
    });
}

#[test]
fn test_find_missing_prediction_is_none() {
    // ---
    RUNTIME.block_on(async {
        // ---
        let Some(repo) = setup_repo().await else {
            return;
        };

        let result = repo
            .find_by_email(&unique_email("nobody"))
            .await
            .expect("Query should succeed");

        assert!(result.is_none());
    });
}

#[test]
fn test_email_must_be_unique() {
    // ---
    RUNTIME.block_on(async {
        // ---
        let Some(repo) = setup_repo().await else {
            return;
        };

        let email = unique_email("fili");
        let first = repo
            .create(&submission("Fili", &email, "boy"))
            .await
            .expect("First prediction should succeed");

        let result = repo
            .create(&submission("Kili", &email.to_uppercase(), "girl"))
            .await;

        assert!(
            matches!(result, Err(StoreError::DuplicateEmail)),
            "Duplicate email should be reported as DuplicateEmail"
        );

        repo.delete_by_id(first.id).await.expect("delete failed");
    });
}

#[test]
fn test_concurrent_duplicates_exactly_one_wins() {
    // ---
    RUNTIME.block_on(async {
        // ---
        let Some(repo) = setup_repo().await else {
            return;
        };

        let email = unique_email("race");
        let variants = [email.clone(), email.to_uppercase(), format!(" {email} ")];

        let attempts = variants.iter().map(|variant| {
            let repo = repo.clone();
            let submission = submission("Racer", variant, "boy");
            async move { repo.create(&submission).await }
        });
        let results = futures::future::join_all(attempts).await;

        let winners = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::DuplicateEmail)))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 2);

        let survivor = repo.find_by_email(&email).await.unwrap().unwrap();
        repo.delete_by_id(survivor.id).await.unwrap();
    });
}

#[test]
fn test_delete_unknown_prediction_is_ok() {
    // ---
    RUNTIME.block_on(async {
        // ---
        let Some(repo) = setup_repo().await else {
            return;
        };

        repo.delete_by_id(Uuid::new_v4())
            .await
            .expect("Deleting a missing row is not an error");
    });
}

#[test]
fn test_reveal_state_update_round_trip() {
    // ---
    RUNTIME.block_on(async {
        // ---
        let Some(repo) = setup_repo().await else {
            return;
        };

        let before = repo.read().await.expect("Seeded reveal state missing");

        let update = RevealUpdate {
            countdown_date: Utc.with_ymd_and_hms(2031, 6, 1, 0, 0, 0).unwrap(),
            gender: Some(Guess::Boy),
            is_revealed: true,
        };
        let after = repo.update(&update).await.expect("Update failed");

        assert_eq!(after.id, before.id);
        assert_eq!(after.countdown_date, update.countdown_date);
        assert_eq!(after.gender, Some(Guess::Boy));
        assert!(after.is_revealed);
        assert!(after.updated_at >= before.updated_at);

        // Restore what was there so other suites see the seed values.
        let restore = RevealUpdate {
            countdown_date: before.countdown_date,
            gender: before.gender,
            is_revealed: before.is_revealed,
        };
        repo.update(&restore).await.expect("Restore failed");
    });
}

#[test]
fn test_registries_are_ordered_and_normalized() {
    // ---
    RUNTIME.block_on(async {
        // ---
        let Some(repo) = setup_repo().await else {
            return;
        };

        let tag = Uuid::new_v4().simple().to_string();
        let first = NewRegistry::parse(&format!("Amazon {tag}"), "example.com/registry").unwrap();
        let second = NewRegistry::parse(&format!("Target {tag}"), "https://t.com/r").unwrap();

        repo.add(&first).await.expect("add failed");
        repo.add(&second).await.expect("add failed");

        let ours: Vec<_> = RegistryStore::list(&repo)
            .await
            .expect("list failed")
            .into_iter()
            .filter(|r| r.name.ends_with(&tag))
            .collect();

        assert_eq!(ours.len(), 2);
        assert_eq!(ours[0].url, "https://example.com/registry");
        assert_eq!(ours[1].url, "https://t.com/r");

        for registry in ours {
            repo.remove(registry.id).await.expect("remove failed");
        }
    });
}

#[test]
fn test_admin_password_procedure() {
    // ---
    RUNTIME.block_on(async {
        // ---
        let Some(repo) = setup_repo().await else {
            return;
        };

        let verified = repo
            .verify("definitely-not-the-password")
            .await
            .expect("Procedure call failed");

        assert!(!verified);

        // Migrations provision no password, so the old placeholder never works.
        let verified = repo.verify("change-me").await.expect("Procedure call failed");
        assert!(!verified);
    });
}

#[test]
fn migrations_provision_no_admin_password() {
    // ---
    let schema = include_str!("../../../migrations/20250101000001_create_reveal_tables.sql");

    let seeds_secret = schema
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("--"))
        .any(|line| line.contains("INSERT INTO admin_secret"));

    assert!(!seeds_secret);
}
