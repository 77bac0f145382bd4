use crate::services::reslug::{reslug_articles, ReslugOptions};
use crate::{Config, Database};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub async fn run(
    config_path: &Path,
    options: ReslugOptions,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    db.migrate()?;

    let report = reslug_articles(&db, &config.slug, options)?;

    for entry in report.moved() {
        println!(
            "  {:<18} {} -> {}",
            entry.outcome.to_string(),
            entry.old_slug,
            entry.new_slug
        );
    }

    println!(
        "\n  {} article(s): {} kept, {} unchanged, {} changed, {} changed+collision, {} fallback{}",
        report.total,
        report.kept,
        report.unchanged,
        report.changed,
        report.collisions,
        report.fallbacks,
        if report.dry_run { " (dry run, nothing written)" } else { "" }
    );

    if let Some(path) = report_path {
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("Wrote report to {}", path.display());
    }

    Ok(())
}
