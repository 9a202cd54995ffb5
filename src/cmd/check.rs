//! A subcommand making sure various things are working. Useful for updates
//! where you want to catch problems as early as possible, without restarting
//! the running process.

use deadpool_postgres::Pool;

use crate::{
    api,
    args,
    auth::SessionUser,
    config::Config,
    db,
    model::Key,
    prelude::*,
};


pub(crate) async fn run(shared: &args::Shared, args: &args::Args) -> Result<()> {
    let config = crate::load_config_and_init_logger(shared, args)
        .context("failed to load config: cannot proceed with `check` command")?;

    // Perform main checks
    info!("Starting to verify the environment of '{}'...", config.general.site_title);
    let db_pool = db::create_pool(&config.db).await;
    let api = match &db_pool {
        Ok(pool) => check_api(pool).await,
        Err(_) => Err(anyhow!("skipped: could not connect to the DB")),
    };
    info!("Done verifying");

    // Print summary after all log output
    let mut any_errors = false;
    println!();
    bunt::println!("{$bold+blue+intense}Summary{/$}");
    println!();
    print_outcome(&mut any_errors, "Load configuration", &Ok(()));
    print_outcome(&mut any_errors, "Connection to DB", &db_pool);
    print_outcome(&mut any_errors, "API smoke queries", &api);

    println!();
    if any_errors {
        bunt::println!("{$red+intense}➡  Errors have occured!{/$}");
        std::process::exit(1);
    } else {
        bunt::println!("{$green+intense}➡  Everything OK{/$}");
        Ok(())
    }
}

/// Runs one tiny query against the real schema, once anonymously and once
/// with a synthetic session. This catches DB schema problems (e.g. missing
/// migrations) that a bare connection check does not.
async fn check_api(pool: &Pool) -> Result<()> {
    const QUERY: &str = "{ allEvents(limit: 1) { id isOwner isEventAttended } }";
    let root = api::root_node();

    // Key 0 is never handed out by the DB (keys start at 1), so the derived
    // booleans have to resolve to `false` here, like for the anonymous run.
    let sessions = [
        None,
        Some(SessionUser { key: Key(0), username: "check".into() }),
    ];

    for session in sessions {
        let context = api::Context::new(pool.get().await?, session);
        let (_, errors) = juniper::execute(QUERY, None, &root, &juniper::Variables::new(), &context)
            .await
            .map_err(|e| anyhow!("GraphQL error: {e}"))?;
        if !errors.is_empty() {
            bail!("API smoke query returned errors: {errors:?}");
        }
    }

    Ok(())
}

fn print_outcome<T>(any_errors: &mut bool, label: &str, result: &Result<T>) {
    match result {
        Ok(_) => {
            bunt::println!(" ▸ {[bold+intense]}  {$green+bold}✔ ok{/$}", label);
        }
        Err(e) => {
            *any_errors = true;
            bunt::println!(" ▸ {[bold+intense]}  {$red+bold}✘ error{/$}", label);
            bunt::println!("      {$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
            println!();
            bunt::println!("      {$red+italic}Caused by:{/$}");

            for (i, cause) in e.chain().skip(1).enumerate() {
                print!("       {: >1$}", "", i * 2);
                println!("‣ {cause}");
            }
            println!();
        }
    }
}
