//! Database related things.

use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use secrecy::{ExposeSecret, SecretString};
use tokio_postgres::NoTls;

use crate::prelude::*;


pub(crate) mod cmd;
mod migrations;
mod query;

pub(crate) use self::migrations::migrate;


#[derive(Debug, confique::Config, Clone)]
pub(crate) struct DbConfig {
    /// The username of the database user.
    #[config(default = "plenum")]
    pub(crate) user: String,

    /// The password of the database user.
    pub(crate) password: SecretString,

    /// The host the database server is running on.
    #[config(default = "127.0.0.1")]
    pub(crate) host: String,

    /// The port the database server is listening on. (Just useful if your
    /// database server is not running on the default PostgreSQL port).
    #[config(default = 5432)]
    pub(crate) port: u16,

    /// The name of the database to use.
    #[config(default = "plenum")]
    pub(crate) database: String,
}

/// Convenience type alias. Every function that needs to operate on the
/// database can just accept a `db: &Db` parameter.
pub(crate) type Db = deadpool_postgres::ClientWrapper;

/// Type alias for an owned DB connection.
pub(crate) type DbConnection = deadpool::managed::Object<deadpool_postgres::Manager>;


/// Creates a new database connection pool.
pub(crate) async fn create_pool(config: &DbConfig) -> Result<Pool> {
    let pool_config = PoolConfig {
        user: Some(config.user.clone()),
        password: Some(config.password.expose_secret().to_owned()),
        host: Some(config.host.clone()),
        port: Some(config.port),
        dbname: Some(config.database.clone()),
        ..PoolConfig::default()
    };

    debug!(
        "Connecting to postgresql://{}:*****@{}:{}/{}",
        config.user,
        config.host,
        config.port,
        config.database,
    );

    let pool = pool_config.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create DB pool")?;

    // Make sure we can actually connect, so that configuration errors show up
    // right away instead of on the first real query.
    let client = pool.get().await.context("failed to get connection from the DB pool")?;
    client.execute("select 1", &[]).await
        .context("failed to execute DB test query")?;
    info!("Connected to PostgreSQL");

    Ok(pool)
}
