use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, instrument};

const CREATE_USERS: &str = "
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    role        TEXT NOT NULL CHECK (role IN ('manager', 'employee')),
    manager_id  INTEGER REFERENCES users (id),
    created_at  DATETIME NOT NULL
)";

const CREATE_FEEDBACKS: &str = "
CREATE TABLE IF NOT EXISTS feedbacks (
    id            INTEGER PRIMARY KEY,
    employee_id   INTEGER NOT NULL REFERENCES users (id),
    manager_id    INTEGER NOT NULL REFERENCES users (id),
    strengths     TEXT NOT NULL,
    improvements  TEXT NOT NULL,
    sentiment     TEXT NOT NULL CHECK (sentiment IN ('positive', 'neutral', 'negative')),
    acknowledged  BOOLEAN NOT NULL DEFAULT 0,
    created_at    DATETIME NOT NULL,
    updated_at    DATETIME NOT NULL
)";

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_users_manager_id ON users (manager_id)",
    "CREATE INDEX IF NOT EXISTS idx_feedbacks_manager_id ON feedbacks (manager_id)",
    "CREATE INDEX IF NOT EXISTS idx_feedbacks_employee_id ON feedbacks (employee_id)",
];

/// Opens a pool against a SQLite file, creating the file if it does not exist
#[instrument]
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!(database_url = %database_url, "Connected to SQLite database");
    Ok(pool)
}

/// Opens a single-connection pool over a private in-memory database.
///
/// The connection is never recycled, otherwise the database would vanish with it.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Creates the users and feedbacks tables when they are missing
#[instrument(skip(pool))]
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_FEEDBACKS).execute(pool).await?;
    for statement in CREATE_INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}
