use crate::config::SlugConfig;
use crate::services::slug::{self, SlugOptions};
use crate::Config;
use anyhow::Result;
use std::path::Path;

/// Slug settings from the config file, or the defaults outside a site
/// directory.
fn slug_config(config_path: &Path) -> Result<SlugConfig> {
    if config_path.exists() {
        Ok(Config::load(config_path)?.slug)
    } else {
        tracing::debug!("No config at {}, using default slug settings", config_path.display());
        Ok(SlugConfig::default())
    }
}

pub fn slugify(
    config_path: &Path,
    text: &str,
    max_length: Option<usize>,
    max_tokens: Option<usize>,
) -> Result<()> {
    let configured = slug_config(config_path)?.options();
    let options = SlugOptions {
        max_length: max_length.unwrap_or(configured.max_length),
        max_tokens: max_tokens.unwrap_or(configured.max_tokens),
    };

    let generated = slug::slugify_with(text, &options);
    if generated.is_empty() {
        anyhow::bail!("no slug could be derived from the given text");
    }
    println!("{}", generated);
    Ok(())
}

pub fn validate(config_path: &Path, slugs: &[String]) -> Result<()> {
    let options = slug_config(config_path)?.options();
    let mut invalid = 0;

    for candidate in slugs {
        match slug::validate_with(candidate, &options) {
            Ok(()) => println!("\x1b[32m✓\x1b[0m {}", candidate),
            Err(reason) => {
                invalid += 1;
                println!("\x1b[31m✗\x1b[0m {} ({})", candidate, reason);
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} slug(s) are invalid", invalid, slugs.len());
    }
    Ok(())
}
