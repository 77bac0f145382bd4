use crate::cli::MigrateCommand;
use crate::db::MIGRATION_DESCRIPTIONS;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, command: Option<MigrateCommand>) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;

    match command {
        None => {
            db.migrate()?;
            tracing::info!("Database at {} is up to date", config.database.path);
        }
        Some(MigrateCommand::Status) => print_status(&db)?,
    }

    Ok(())
}

fn print_status(db: &Database) -> Result<()> {
    let statuses = db.get_migration_status()?;
    let mut pending = 0;

    println!();
    for (version, applied_at) in &statuses {
        let description = usize::try_from(*version)
            .ok()
            .and_then(|v| MIGRATION_DESCRIPTIONS.get(v.wrapping_sub(1)))
            .copied()
            .unwrap_or("?");

        match applied_at {
            Some(at) => println!("  [x] {:03}  {:<28} applied {}", version, description, at),
            None => {
                pending += 1;
                println!("  [ ] {:03}  {:<28} pending", version, description);
            }
        }
    }
    println!();

    if pending == 0 {
        println!("  Schema is current.");
    } else {
        println!("  {} migration(s) pending, run `almofasir migrate`.", pending);
    }
    println!();

    Ok(())
}
