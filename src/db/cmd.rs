use tokio_postgres::IsolationLevel;

use crate::{config::Config, prelude::*};
use super::{Db, create_pool, query};


#[derive(Debug, clap::Subcommand)]
pub(crate) enum DbCommand {
    /// Removes all data and tables from the database.
    Clear,

    /// Runs the database migrations.
    Migrate,

    /// Equivalent to `db clear` followed by `db migrate`.
    Reset,
}

/// Entry point for `db` commands.
pub(crate) async fn run(cmd: &DbCommand, config: &Config) -> Result<()> {
    let pool = create_pool(&config.db).await?;
    let mut db = pool.get().await?;

    match cmd {
        DbCommand::Clear => clear(&mut db, config).await?,
        DbCommand::Migrate => super::migrate(&mut db).await?,
        DbCommand::Reset => {
            clear(&mut db, config).await?;
            super::migrate(&mut db).await?;
        }
    }

    Ok(())
}

/// Clears the whole database by removing and re-creating the `public` schema.
///
/// Asks the user for confirmation on stdin before deleting anything.
async fn clear(db: &mut Db, config: &Config) -> Result<()> {
    let tx = db.build_transaction()
        .isolation_level(IsolationLevel::Serializable)
        .start()
        .await?;

    println!("Database host: {}", config.db.host);
    println!("Database name: {}", config.db.database);
    println!();
    println!("The database currently holds these tables:");
    for name in &query::all_table_names(&*tx).await? {
        let num_rows = tx.query_one(&format!("select count(*) from {name}"), &[])
            .await?
            .get::<_, i64>(0);
        println!(" - {name} ({num_rows} rows)");
    }

    println!();
    println!("Are you sure you want to completely remove everything in this database? \
        This completely drops the 'public' schema. \
        Please double-check the server you are running this on!\n\
        Type 'yes' to proceed to delete the data.");
    crate::cmd::prompt_for_yes()?;

    // We clear everything by dropping the 'public' schema, which includes all
    // tables, triggers and functions we ever create.
    tx.execute("drop schema public cascade", &[]).await?;
    tx.execute("create schema public", &[]).await?;
    tx.execute(&format!("grant all on schema public to {}", config.db.user), &[]).await?;
    tx.execute("grant all on schema public to public", &[]).await?;
    tx.execute("comment on schema public is 'standard public schema'", &[]).await?;
    tx.commit().await.context("failed to commit clear transaction")?;

    info!("Dropped and recreated schema 'public'");
    Ok(())
}
