use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use slotbook_api::config::ApiConfig;
use slotbook_db::pg::PgStore;
use slotbook_db::store::Store;
use slotbook_db::{create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema and seed data
    initialize_database(&db_pool).await?;

    // Start API server over the PostgreSQL-backed store
    let store: Arc<dyn Store> = Arc::new(PgStore::new(db_pool));
    slotbook_api::start_server(config, store).await?;

    Ok(())
}
