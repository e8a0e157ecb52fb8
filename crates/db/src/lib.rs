//! # Slotbook DB
//!
//! Persistence for the Slotbook booking service. The [`store`] module defines
//! the storage traits the rest of the system programs against; [`pg`]
//! implements them on PostgreSQL via sqlx, and [`mock`] provides an in-memory
//! implementation used by tests and embedded deployments.

pub mod mock;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod schema;
pub mod store;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
