use crate::services::audit::audit_slugs;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, json: bool, samples: usize) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    db.migrate()?;

    let report = audit_slugs(&db, &config.slug, samples)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n  Slug Audit\n");
    println!("  {} article(s), {} valid, {} invalid", report.total, report.valid, report.invalid);

    if !report.by_reason.is_empty() {
        println!("\n  {:<25} {}", "Reason", "Count");
        println!("  {}", "-".repeat(35));
        for (reason, count) in &report.by_reason {
            println!("  {:<25} {}", reason, count);
        }
    }

    if !report.samples.is_empty() {
        println!("\n  Samples:");
        for sample in &report.samples {
            println!("    {}  {}  ({})", sample.id, sample.slug, sample.reason);
        }
    }
    println!();

    Ok(())
}
