use log::{error, info, warn};
use rocket::fairing::{self, AdHoc};
use rocket::{Build, Rocket};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;
use std::sync::Arc;
use thiserror::Error;
use zkvote::{Authority, BallotStore, Ciphertext};

pub type Db = sqlx::SqlitePool;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("zkvoted: database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("zkvoted: migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("zkvoted: stored ballot {id} is corrupt: {source}")]
    Corrupt {
        id: i64,
        #[source]
        source: zkvote::Error,
    },
}

pub async fn connect(path: &str) -> Result<Db, DbError> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .disable_statement_logging();

    let db = Db::connect_with(opts).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    Ok(db)
}

async fn init_db(rocket: Rocket<Build>) -> fairing::Result {
    let fingerprint = match rocket.state::<Arc<Authority>>() {
        Some(authority) => authority.public_key().fingerprint(),
        None => {
            error!("The tally authority must be staged before the database");
            return Err(rocket);
        }
    };

    let db = match connect(&crate::CONFIG.db_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize SQLx database: {}", e);
            return Err(rocket);
        }
    };

    // Fill the in-memory store
    if let Err(e) = fill_store(&db, &fingerprint).await {
        error!("Failed to load stored ballots: {}", e);
        return Err(rocket);
    }

    Ok(rocket.manage(db))
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket.attach(AdHoc::try_on_ignite("SQLx Database", init_db))
    })
}

/// Append one ballot encrypted under the key with `fingerprint`, returning its row id
pub async fn insert_vote(db: &Db, ciphertext: &Ciphertext, fingerprint: &str) -> Result<i64, DbError> {
    let (c1, c2) = ciphertext.to_hex();
    let result = sqlx::query("INSERT INTO votes (c1, c2, key_fingerprint) VALUES (?, ?, ?)")
        .bind(c1)
        .bind(c2)
        .bind(fingerprint)
        .execute(db)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Every ballot stored under the key with `fingerprint`, in insertion order
pub async fn list_votes(db: &Db, fingerprint: &str) -> Result<Vec<Ciphertext>, DbError> {
    let rows: Vec<(i64, String, String)> = sqlx::query_as(
        "SELECT id, c1, c2 FROM votes WHERE key_fingerprint = ? ORDER BY id",
    )
    .bind(fingerprint)
    .fetch_all(db)
    .await?;

    rows.into_iter()
        .map(|(id, c1, c2)| {
            Ciphertext::from_hex(&c1, &c2).map_err(|source| DbError::Corrupt { id, source })
        })
        .collect()
}

/// Number of stored ballots encrypted under any other key
pub async fn count_foreign_votes(db: &Db, fingerprint: &str) -> Result<i64, DbError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM votes WHERE key_fingerprint != ?")
        .bind(fingerprint)
        .fetch_one(db)
        .await?;
    Ok(count)
}

async fn fill_store(db: &Db, fingerprint: &str) -> Result<(), DbError> {
    let foreign = count_foreign_votes(db, fingerprint).await?;
    if foreign > 0 {
        warn!(
            "zkvoted: skipping {} stored ballots encrypted under earlier keys",
            foreign
        );
    }

    let records = list_votes(db, fingerprint).await?;
    info!(
        "zkvoted: loaded {} stored ballots for key {}",
        records.len(),
        fingerprint
    );

    let mut store = crate::MEM_STORE.lock().unwrap_or_else(|e| e.into_inner());
    for record in records {
        store.append(record);
    }
    Ok(())
}
