//! Database migration command.
//!
//! Applies `crates/auth/migrations/` to the auth database:
//!
//! ```text
//! migrations/
//! ├── 20250101000000_create_users.sql
//! └── 20250101000001_create_bags.sql
//! ```

use vieux_carre_auth::db::create_pool;

use super::{CliError, database_url};

/// Run auth database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database URL is missing, the connection fails
/// or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to auth database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running auth migrations...");
    sqlx::migrate!("../auth/migrations").run(&pool).await?;

    tracing::info!("Auth migrations complete!");
    Ok(())
}
