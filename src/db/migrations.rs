use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tokio_postgres::IsolationLevel;

use crate::prelude::*;
use super::{Db, query};


/// Makes sure the database schema is up to date by checking the active
/// migrations and applying all missing ones.
///
/// If anything unexpected is noticed (a migration in the DB we don't know
/// about, or one whose script changed), an error is returned to notify the
/// user they have to manually deal with it.
pub(crate) async fn migrate(db: &mut Db) -> Result<()> {
    // The whole migration process is wrapped in one serializable transaction,
    // so concurrent processes can never apply migrations twice.
    let tx = db.build_transaction()
        .isolation_level(IsolationLevel::Serializable)
        .start()
        .await?;

    // Create the meta table `__db_migrations` if it doesn't exist yet.
    if !query::does_table_exist(&*tx, "__db_migrations").await? {
        // If there are any other tables in an otherwise unmigrated database,
        // something is fishy and we don't touch it.
        let tables = query::all_table_names(&*tx).await?;
        if !tables.is_empty() {
            bail!(
                "migration table '__db_migrations' does not exist, but some other \
                    tables ({}) do exist. This should not happen.",
                tables.join(", "),
            );
        }

        info!("Database is empty. Creating table '__db_migrations'...");
        tx.batch_execute(include_str!("db-migrations.sql"))
            .await
            .context("could not create migrations meta table")?;
    } else {
        debug!("Table '__db_migrations' already exists");
    }

    // Retrieve all active migrations and make sure they match the ones we
    // know about.
    let rows = tx.query("select id, name, script from __db_migrations order by id", &[]).await?;
    for row in &rows {
        let id = row.get::<_, i64>(0) as u64;
        let name = row.get::<_, String>(1);
        let script = row.get::<_, String>(2);

        let expected = MIGRATIONS.get(&id).ok_or_else(|| anyhow!(
            "migration '{id}-{name}' is active in the database, but no such migration \
                is known to this binary. This is unexpected.",
        ))?;
        if expected.name != name || expected.script != script {
            bail!(
                "active migration '{id}-{name}' does not match the migration expected \
                    by this binary. This is unexpected.",
            );
        }
    }

    // Apply everything that's missing, in order.
    let new_migrations = MIGRATIONS.range(rows.len() as u64 + 1..);
    let num_new = new_migrations.clone().count();
    if num_new == 0 {
        info!("All migrations are already applied: database schema is up to date.");
    } else {
        info!("The database is missing {num_new} migrations. Applying them now.");
        for (id, migration) in new_migrations {
            debug!("Applying migration '{}-{}' ...", id, migration.name);
            trace!("Executing:\n{}", migration.script);

            tx.batch_execute(migration.script)
                .await
                .context(format!("failed to run script for '{}-{}'", id, migration.name))?;

            let query = "insert into __db_migrations (id, name, applied_on, script) \
                values ($1, $2, now() at time zone 'utc', $3)";
            tx.execute(query, &[&(*id as i64), &migration.name, &migration.script])
                .await
                .context("failed to update __db_migrations")?;
        }
        info!("Applied {num_new} migrations. DB schema is up to date now.");
    }

    tx.commit().await.context("failed to commit migrations")?;
    Ok(())
}

// Helper macro to include migrations from the `migrations` folder and add
// them to a map. The `assert!` and `panic!` in there should ideally be
// compile errors, but panics are fine for now.
macro_rules! include_migrations {
    ( $( $id:literal : $name:literal ,)+ ) => {
        Lazy::new(|| {
            let mut m = BTreeMap::new();
            $(
                let prev = m.insert($id, Migration {
                    name: $name,
                    script: include_str!(
                        concat!("migrations/", stringify!($id), "-", $name, ".sql")
                    ),
                });

                assert!(prev.is_none(), "duplicate key in `include_migrations!`");
            )+

            if !m.keys().copied().eq(1..m.len() as u64 + 1) {
                panic!("migration IDs in `include_migrations!` are not consecutive");
            }

            m
        })
    };
}

#[derive(Debug)]
struct Migration {
    name: &'static str,
    script: &'static str,
}

static MIGRATIONS: Lazy<BTreeMap<u64, Migration>> = include_migrations![
    01: "users",
    02: "events",
];


#[cfg(test)]
mod tests {
    use super::MIGRATIONS;

    // Forces the `Lazy` and with it the consistency checks of
    // `include_migrations!` (consecutive IDs, no duplicates).
    #[test]
    fn migrations_are_consistent() {
        assert_eq!(MIGRATIONS.len(), 2);
        assert!(MIGRATIONS.values().all(|m| !m.script.trim().is_empty()));
    }
}
