use crate::config::SlugConfig;
use crate::models::{ArticleStatus, CreateArticle};
use crate::services::articles;
use crate::{Config, Database};
use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub async fn run(config_path: &Path, import_dir: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    db.migrate()?;

    let (imported, skipped) = import_dir_articles(&db, &config.slug, import_dir)?;

    tracing::info!("Import complete: {} imported, {} skipped", imported, skipped);
    Ok(())
}

/// Import every `*.md` file in `dir`, in file name order.
pub fn import_dir_articles(db: &Database, slugs: &SlugConfig, dir: &Path) -> Result<(usize, usize)> {
    if !dir.is_dir() {
        anyhow::bail!("Import directory not found: {}", dir.display());
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|e| e == "md").unwrap_or(false))
        .collect();
    paths.sort();

    let mut imported = 0;
    let mut skipped = 0;

    for path in paths {
        match import_markdown_file(db, slugs, &path) {
            Ok(true) => imported += 1,
            Ok(false) => skipped += 1,
            Err(e) => {
                tracing::warn!("Failed to import {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    Ok((imported, skipped))
}

fn import_markdown_file(db: &Database, slugs: &SlugConfig, path: &Path) -> Result<bool> {
    let file_content = fs::read_to_string(path)?;
    let (frontmatter, body) = parse_frontmatter(&file_content);

    let title = match frontmatter.get("title") {
        Some(title) if !title.is_empty() => title.clone(),
        _ => path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
    };

    let status = frontmatter
        .get("status")
        .and_then(|s| s.parse().ok())
        .unwrap_or(ArticleStatus::Draft);

    let input = CreateArticle {
        title,
        slug: frontmatter.get("slug").cloned(),
        body: body.to_string(),
        status,
    };

    match articles::import_article(db, slugs, frontmatter.get("id").cloned(), input)? {
        Some(article) => {
            tracing::info!("Imported: {} ({})", article.slug, article.id);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Split `---` delimited `key: value` frontmatter from the body. Files
/// without frontmatter are all body.
pub fn parse_frontmatter(content: &str) -> (HashMap<String, String>, &str) {
    let content = content.trim_start_matches('\u{FEFF}').trim_start();

    let Some(after_first) = content.strip_prefix("---") else {
        return (HashMap::new(), content);
    };

    let Some(pos) = after_first.find("\n---") else {
        return (HashMap::new(), content);
    };

    let header = &after_first[..pos];
    let body = after_first[pos + 4..].trim_start();

    let fields = header
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect();

    (fields, body)
}
