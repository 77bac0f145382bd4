use crate::config::SlugConfig;
use crate::models::{
    Article, ArticleStatus, ArticleSummary, CreateArticle, SlugLookup, UpdateArticle,
};
use crate::services::resolver::{Resolution, SlugError, SlugRegistry};
use crate::services::slug::{self, InvalidSlug};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: InvalidSlug },
    #[error("slug '{0}' is already in use")]
    SlugTaken(String),
    #[error("article '{0}' not found")]
    NotFound(String),
}

const ARTICLE_COLUMNS: &str =
    "id, slug, title, body, status, published_at, created_at, updated_at";

/// Slugs held by live articles, by redirect history and by reserved routes.
pub struct DbSlugRegistry<'a> {
    conn: &'a Connection,
    reserved: &'a [String],
    /// An article may take back its own slugs.
    owner: Option<&'a str>,
}

impl<'a> DbSlugRegistry<'a> {
    pub fn new(conn: &'a Connection, reserved: &'a [String], owner: Option<&'a str>) -> Self {
        Self {
            conn,
            reserved,
            owner,
        }
    }
}

impl SlugRegistry for DbSlugRegistry<'_> {
    fn is_taken(&mut self, slug: &str) -> Result<bool, SlugError> {
        if self.reserved.iter().any(|r| r == slug) {
            return Ok(true);
        }
        let owner = self.owner.unwrap_or("");
        let taken: bool = self.conn.query_row(
            r#"
            SELECT EXISTS(SELECT 1 FROM articles WHERE slug = ?1 AND id != ?2)
                OR EXISTS(SELECT 1 FROM slug_redirects WHERE old_slug = ?1 AND article_id != ?2)
            "#,
            (slug, owner),
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    fn claim(&mut self, _slug: &str) -> Result<(), SlugError> {
        // The UNIQUE index on articles.slug settles races at insert time.
        Ok(())
    }
}

pub fn new_article_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn create_article(db: &Database, slugs: &SlugConfig, input: CreateArticle) -> Result<Article> {
    insert_article(db, slugs, &new_article_id(), input, false)
}

/// Bring in an article from an older system. A legacy slug is kept verbatim
/// as long as it is free, so that `audit` can report on it later; otherwise
/// the slug is derived from the title. Returns `None` when `id` already exists.
pub fn import_article(
    db: &Database,
    slugs: &SlugConfig,
    id: Option<String>,
    input: CreateArticle,
) -> Result<Option<Article>> {
    let id = id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(new_article_id);

    if get_article_by_id(db, &id)?.is_some() {
        tracing::info!("Skipping existing article {}", id);
        return Ok(None);
    }

    insert_article(db, slugs, &id, input, true).map(Some)
}

fn insert_article(
    db: &Database,
    slugs: &SlugConfig,
    id: &str,
    input: CreateArticle,
    keep_legacy_slug: bool,
) -> Result<Article> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let requested = input
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let slug = {
        let mut registry = DbSlugRegistry::new(&tx, &slugs.reserved, None);
        match requested {
            Some(slug) if keep_legacy_slug => {
                if registry.is_taken(&slug)? {
                    tracing::warn!("Legacy slug '{}' is taken, deriving a new one", slug);
                    slugs.policy().resolve(&input.title, id, &mut registry)?.slug
                } else {
                    slug
                }
            }
            Some(slug) => {
                check_requested_slug(&slug, slugs, &mut registry)?;
                slug
            }
            None => {
                let Resolution {
                    slug, collision, ..
                } = slugs.policy().resolve(&input.title, id, &mut registry)?;
                if collision {
                    tracing::info!("Slug collision for '{}', using {}", input.title, slug);
                }
                slug
            }
        }
    };

    let published_at = if input.status == ArticleStatus::Published {
        Some(chrono::Utc::now().to_rfc3339())
    } else {
        None
    };

    tx.execute(
        "INSERT INTO articles (id, slug, title, body, status, published_at) VALUES (?, ?, ?, ?, ?, ?)",
        (
            id,
            &slug,
            &input.title,
            &input.body,
            input.status.to_string(),
            &published_at,
        ),
    )
    .map_err(|e| unique_violation(e, &slug))?;

    let article = tx.query_row(
        &format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_COLUMNS),
        [id],
        row_to_article,
    )?;
    tx.commit()?;

    Ok(article)
}

fn check_requested_slug(
    slug: &str,
    slugs: &SlugConfig,
    registry: &mut DbSlugRegistry<'_>,
) -> Result<()> {
    if let Err(reason) = slug::validate_with(slug, &slugs.options()) {
        return Err(ArticleError::InvalidSlug {
            slug: slug.to_string(),
            reason,
        }
        .into());
    }
    if registry.is_taken(slug)? {
        return Err(ArticleError::SlugTaken(slug.to_string()).into());
    }
    Ok(())
}

fn unique_violation(err: rusqlite::Error, slug: &str) -> anyhow::Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            ArticleError::SlugTaken(slug.to_string()).into()
        }
        other => other.into(),
    }
}

pub fn update_article(
    db: &Database,
    slugs: &SlugConfig,
    id: &str,
    input: UpdateArticle,
) -> Result<Article> {
    let mut conn = db.get()?;
    let tx = conn.transaction()?;

    let current = tx
        .query_row(
            &format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_COLUMNS),
            [id],
            row_to_article,
        )
        .optional()?
        .ok_or_else(|| ArticleError::NotFound(id.to_string()))?;

    let title = input.title.unwrap_or_else(|| current.title.clone());
    let body = input.body.unwrap_or_else(|| current.body.clone());
    let status = input.status.unwrap_or(current.status);

    let slug = {
        let mut registry = DbSlugRegistry::new(&tx, &slugs.reserved, Some(id));
        match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(requested) if requested == current.slug => current.slug.clone(),
            Some(requested) => {
                check_requested_slug(requested, slugs, &mut registry)?;
                requested.to_string()
            }
            None if input.regenerate_slug => {
                slugs.policy().resolve(&title, id, &mut registry)?.slug
            }
            None => current.slug.clone(),
        }
    };

    let published_at = if status == ArticleStatus::Published && current.published_at.is_none() {
        Some(chrono::Utc::now().to_rfc3339())
    } else {
        current.published_at.clone()
    };

    tx.execute(
        "UPDATE articles SET slug = ?, title = ?, body = ?, status = ?, published_at = ? WHERE id = ?",
        (&slug, &title, &body, status.to_string(), &published_at, id),
    )
    .map_err(|e| unique_violation(e, &slug))?;

    if slug != current.slug {
        record_redirect(&tx, &current.slug, id)?;
        tracing::info!("Article {} moved from {} to {}", id, current.slug, slug);
    }
    // A slug that is live again must not keep redirecting.
    tx.execute("DELETE FROM slug_redirects WHERE old_slug = ?", [&slug])?;

    let article = tx.query_row(
        &format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_COLUMNS),
        [id],
        row_to_article,
    )?;
    tx.commit()?;

    Ok(article)
}

pub(crate) fn record_redirect(conn: &Connection, old_slug: &str, article_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO slug_redirects (old_slug, article_id) VALUES (?, ?)",
        (old_slug, article_id),
    )?;
    Ok(())
}

/// Redirect history as `old_slug -> article_id`.
pub fn list_redirects(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn.prepare("SELECT old_slug, article_id FROM slug_redirects")?;
    let redirects = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(redirects)
}

pub fn delete_article(db: &Database, id: &str) -> Result<bool> {
    let conn = db.get()?;
    let deleted = conn.execute("DELETE FROM articles WHERE id = ?", [id])?;
    Ok(deleted > 0)
}

pub fn get_article_by_id(db: &Database, id: &str) -> Result<Option<Article>> {
    let conn = db.get()?;
    let article = conn
        .query_row(
            &format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_COLUMNS),
            [id],
            row_to_article,
        )
        .optional()?;
    Ok(article)
}

pub fn get_article_by_slug(db: &Database, slug: &str) -> Result<Option<Article>> {
    let conn = db.get()?;
    let article = conn
        .query_row(
            &format!("SELECT {} FROM articles WHERE slug = ?", ARTICLE_COLUMNS),
            [slug],
            row_to_article,
        )
        .optional()?;
    Ok(article)
}

/// Find what `slug` refers to: a live article, or the slug it moved to.
pub fn lookup_slug(db: &Database, slug: &str) -> Result<Option<SlugLookup>> {
    lookup(db, slug, false)
}

/// Like [`lookup_slug`], but drafts and archived articles are invisible.
pub fn lookup_published_slug(db: &Database, slug: &str) -> Result<Option<SlugLookup>> {
    lookup(db, slug, true)
}

fn lookup(db: &Database, slug: &str, published_only: bool) -> Result<Option<SlugLookup>> {
    if let Some(article) = get_article_by_slug(db, slug)? {
        if published_only && article.status != ArticleStatus::Published {
            return Ok(None);
        }
        return Ok(Some(SlugLookup::Live(article)));
    }

    let conn = db.get()?;
    let current_slug: Option<String> = conn
        .query_row(
            r#"
            SELECT a.slug FROM slug_redirects r
            JOIN articles a ON a.id = r.article_id
            WHERE r.old_slug = ?1 AND (?2 = 0 OR a.status = 'published')
            "#,
            (slug, published_only),
            |row| row.get(0),
        )
        .optional()?;

    Ok(current_slug.map(|current_slug| SlugLookup::Moved { current_slug }))
}

pub fn list_published(db: &Database, limit: usize, offset: usize) -> Result<Vec<ArticleSummary>> {
    let conn = db.get()?;
    let mut stmt = conn.prepare(
        r#"
        SELECT id, slug, title, status, published_at, created_at FROM articles
        WHERE status = 'published'
        ORDER BY published_at DESC, created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )?;

    let articles = stmt
        .query_map((to_sql_int(limit), to_sql_int(offset)), |row| {
            Ok(ArticleSummary {
                id: row.get(0)?,
                slug: row.get(1)?,
                title: row.get(2)?,
                status: parse_status(row.get::<_, String>(3)?),
                published_at: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(articles)
}

pub fn count_published(db: &Database) -> Result<i64> {
    let conn = db.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM articles WHERE status = 'published'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Every article, oldest first. Ties on `created_at` fall back to the id so
/// the order is stable across runs.
pub fn list_all(conn: &Connection) -> Result<Vec<Article>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM articles ORDER BY created_at ASC, id ASC",
        ARTICLE_COLUMNS
    ))?;
    let articles = stmt
        .query_map([], row_to_article)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(articles)
}

/// SQLite integers are signed; anything past `i64::MAX` is clamped.
fn to_sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn parse_status(raw: String) -> ArticleStatus {
    raw.parse().unwrap_or_default()
}

fn row_to_article(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        status: parse_status(row.get(4)?),
        published_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
