use crate::config::SlugConfig;
use crate::services::articles::list_all;
use crate::services::slug;
use crate::Database;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct AuditSample {
    pub id: String,
    pub slug: String,
    pub reason: String,
}

/// Tally of stored slugs that fail validation, grouped by reason code.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub by_reason: BTreeMap<&'static str, usize>,
    pub samples: Vec<AuditSample>,
}

pub fn audit_slugs(db: &Database, slugs: &SlugConfig, max_samples: usize) -> Result<AuditReport> {
    let conn = db.get()?;
    let articles = list_all(&conn)?;
    let options = slugs.options();

    let mut report = AuditReport {
        total: articles.len(),
        valid: 0,
        invalid: 0,
        by_reason: BTreeMap::new(),
        samples: Vec::new(),
    };

    for article in articles {
        match slug::validate_with(&article.slug, &options) {
            Ok(()) => report.valid += 1,
            Err(reason) => {
                report.invalid += 1;
                *report.by_reason.entry(reason.code()).or_default() += 1;
                if report.samples.len() < max_samples {
                    report.samples.push(AuditSample {
                        id: article.id,
                        slug: article.slug,
                        reason: reason.to_string(),
                    });
                }
            }
        }
    }

    tracing::debug!("Audited {} slugs, {} invalid", report.total, report.invalid);
    Ok(report)
}
