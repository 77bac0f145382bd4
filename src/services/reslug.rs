//! Bulk re-slugging of stored articles.
//!
//! Every article is run through the slug engine again, in creation order,
//! against one in-memory taken-set. Nothing is written until all slugs are
//! resolved, and then everything is written in one transaction.

use crate::config::SlugConfig;
use crate::services::articles::{list_all, list_redirects, record_redirect};
use crate::services::resolver::{SlugError, SlugRegistry};
use crate::services::slug;
use crate::Database;
use anyhow::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReslugOptions {
    pub dry_run: bool,
    /// Leave articles whose current slug already validates untouched.
    pub only_invalid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReslugOutcome {
    #[serde(rename = "kept")]
    Kept,
    #[serde(rename = "unchanged")]
    Unchanged,
    #[serde(rename = "changed")]
    Changed,
    #[serde(rename = "changed+collision")]
    ChangedCollision,
    #[serde(rename = "fallback")]
    Fallback,
}

impl std::fmt::Display for ReslugOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kept => write!(f, "kept"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Changed => write!(f, "changed"),
            Self::ChangedCollision => write!(f, "changed+collision"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReslugEntry {
    pub id: String,
    pub title: String,
    pub old_slug: String,
    pub new_slug: String,
    pub outcome: ReslugOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReslugReport {
    pub generated_at: String,
    pub dry_run: bool,
    pub total: usize,
    pub kept: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub collisions: usize,
    pub fallbacks: usize,
    pub entries: Vec<ReslugEntry>,
}

impl ReslugReport {
    fn new(dry_run: bool, entries: Vec<ReslugEntry>) -> Self {
        let count = |outcome| entries.iter().filter(|e| e.outcome == outcome).count();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            dry_run,
            total: entries.len(),
            kept: count(ReslugOutcome::Kept),
            unchanged: count(ReslugOutcome::Unchanged),
            changed: count(ReslugOutcome::Changed),
            collisions: count(ReslugOutcome::ChangedCollision),
            fallbacks: count(ReslugOutcome::Fallback),
            entries,
        }
    }

    /// Entries whose slug moves.
    pub fn moved(&self) -> impl Iterator<Item = &ReslugEntry> {
        self.entries.iter().filter(|e| e.old_slug != e.new_slug)
    }
}

/// Slugs handed out during this run, plus redirect history owned by other
/// articles.
struct BulkRegistry<'a> {
    taken: &'a mut HashSet<String>,
    redirects: &'a HashMap<String, String>,
    owner: &'a str,
}

impl SlugRegistry for BulkRegistry<'_> {
    fn is_taken(&mut self, slug: &str) -> Result<bool, SlugError> {
        if self.taken.contains(slug) {
            return Ok(true);
        }
        Ok(self
            .redirects
            .get(slug)
            .is_some_and(|article_id| article_id != self.owner))
    }

    fn claim(&mut self, slug: &str) -> Result<(), SlugError> {
        self.taken.insert(slug.to_string());
        Ok(())
    }
}

pub fn reslug_articles(
    db: &Database,
    slugs: &SlugConfig,
    options: ReslugOptions,
) -> Result<ReslugReport> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let articles = list_all(&tx)?;
    let redirects = list_redirects(&tx)?;
    let slug_options = slugs.options();
    let policy = slugs.policy();
    let keeps = |slug: &str| options.only_invalid && slug::validate_with(slug, &slug_options).is_ok();

    let mut taken: HashSet<String> = slugs.reserved.iter().cloned().collect();
    taken.extend(articles.iter().filter(|a| keeps(&a.slug)).map(|a| a.slug.clone()));

    let mut entries = Vec::with_capacity(articles.len());
    for article in articles {
        if keeps(&article.slug) {
            entries.push(ReslugEntry {
                new_slug: article.slug.clone(),
                id: article.id,
                title: article.title,
                old_slug: article.slug,
                outcome: ReslugOutcome::Kept,
            });
            continue;
        }

        let mut registry = BulkRegistry {
            taken: &mut taken,
            redirects: &redirects,
            owner: &article.id,
        };
        let resolution = policy.resolve(&article.title, &article.id, &mut registry)?;
        let outcome = if resolution.slug == article.slug {
            ReslugOutcome::Unchanged
        } else if resolution.fallback {
            ReslugOutcome::Fallback
        } else if resolution.collision {
            ReslugOutcome::ChangedCollision
        } else {
            ReslugOutcome::Changed
        };

        entries.push(ReslugEntry {
            id: article.id,
            title: article.title,
            old_slug: article.slug,
            new_slug: resolution.slug,
            outcome,
        });
    }

    let report = ReslugReport::new(options.dry_run, entries);

    if options.dry_run {
        tracing::info!("Dry run: {} of {} slugs would change", report.moved().count(), report.total);
        return Ok(report);
    }

    // Park moving rows on unique placeholders first so that swapping slugs
    // between two articles never trips the UNIQUE index.
    for entry in report.moved() {
        tx.execute(
            "UPDATE articles SET slug = '~reslug~' || id WHERE id = ?",
            [&entry.id],
        )?;
    }
    for entry in report.moved() {
        tx.execute(
            "UPDATE articles SET slug = ? WHERE id = ?",
            (&entry.new_slug, &entry.id),
        )?;
        record_redirect(&tx, &entry.old_slug, &entry.id)?;
    }
    // Redirects an article took back for itself, or that pointed at an
    // article whose old slug was handed on within this run.
    tx.execute(
        "DELETE FROM slug_redirects WHERE old_slug IN (SELECT slug FROM articles)",
        [],
    )?;
    tx.commit()?;

    tracing::info!(
        "Re-slugged {} article(s): {} changed, {} after collision, {} fallback",
        report.moved().count(),
        report.changed,
        report.collisions,
        report.fallbacks
    );

    Ok(report)
}
