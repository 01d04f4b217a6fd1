use anyhow::{Result, anyhow};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Migrations for the client-side card store (cards, settings, statistics)
const STORE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Migrations for the remote document store served by `flashsync-server`
const SERVER_MIGRATIONS: EmbeddedMigrations = embed_migrations!("server_migrations");

/// Per-connection SQLite pragmas
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates a connection pool for the given SQLite database URL
///
/// A plain `:memory:` URL gives every connection its own database, so the
/// pool is capped at a single connection in that case.
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let max_size = if database_url == ":memory:" { 1 } else { 8 };
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;
    debug!("Created pool for {} with {} connections", database_url, max_size);
    Ok(pool)
}

/// Applies the card store migrations
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(STORE_MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run store migrations: {}", e))?;
    info!("Applied {} store migrations", applied.len());
    Ok(())
}

/// Applies the document store migrations
pub fn run_server_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(SERVER_MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run server migrations: {}", e))?;
    info!("Applied {} server migrations", applied.len());
    Ok(())
}

/// Opens a pool and brings the card store schema up to date
pub fn open_store_pool(database_url: &str) -> Result<DbPool> {
    let pool = init_pool(database_url)?;
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;
    drop(conn);
    Ok(pool)
}

/// Opens a pool and brings the document store schema up to date
pub fn open_server_pool(database_url: &str) -> Result<DbPool> {
    let pool = init_pool(database_url)?;
    let mut conn = pool.get()?;
    run_server_migrations(&mut conn)?;
    drop(conn);
    Ok(pool)
}
