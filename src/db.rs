use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

use crate::store::StoreError;

/// Connects the pool and brings the schema up to date.
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<MySqlPool, StoreError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database schema is up to date");

    Ok(pool)
}
