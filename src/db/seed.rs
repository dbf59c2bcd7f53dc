//! Reference content seeding.
//!
//! The glossary, vitamins, symptoms, articles, quick facts and inspiration
//! quotes ship with the binary as YAML and are inserted at startup when
//! `SEED_CONTENT` is enabled. Every insert is `ON CONFLICT DO NOTHING`, so
//! re-running against a populated database only fills gaps.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::services::content::{ArticleCondition, ThyroidCondition, VitaminSource};

const SEED_YAML: &str = include_str!("seed_content.yaml");

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed content is malformed: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("seed content could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Deserialize)]
pub struct SeedContent {
    #[serde(default)]
    pub articles: Vec<SeedArticle>,
    #[serde(default)]
    pub glossary: Vec<SeedGlossaryTerm>,
    #[serde(default)]
    pub vitamins: Vec<SeedVitamin>,
    #[serde(default)]
    pub symptoms: Vec<SeedSymptom>,
    #[serde(default)]
    pub quick_facts: Vec<SeedQuickFact>,
    #[serde(default)]
    pub inspirations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub source: String,
    pub source_url: String,
    pub date: String,
    pub read_time: String,
    pub condition: ArticleCondition,
}

#[derive(Debug, Deserialize)]
pub struct SeedGlossaryTerm {
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub details: String,
    pub normal_range: Option<String>,
    #[serde(default)]
    pub related_terms: Vec<String>,
    pub condition: ThyroidCondition,
}

#[derive(Debug, Deserialize)]
pub struct SeedVitamin {
    pub key: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub sources: Vec<VitaminSource>,
    pub recommended_dosage: String,
    pub precautions: String,
    pub condition: ThyroidCondition,
}

#[derive(Debug, Deserialize)]
pub struct SeedSymptom {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub overview: String,
    #[serde(default)]
    pub management_tips: Vec<String>,
    #[serde(default)]
    pub when_to_seek_help: Vec<String>,
    #[serde(default)]
    pub related_symptoms: Vec<String>,
    pub condition: ThyroidCondition,
}

#[derive(Debug, Deserialize)]
pub struct SeedQuickFact {
    pub icon: String,
    pub text: String,
    pub condition: ThyroidCondition,
}

/// Rows actually inserted per table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub articles: u64,
    pub glossary: u64,
    pub vitamins: u64,
    pub symptoms: u64,
    pub quick_facts: u64,
    pub inspirations: u64,
}

/// Parse the bundled seed file.
///
/// # Errors
///
/// Returns [`SeedError::Parse`] if the YAML does not match the expected shape.
pub fn bundled() -> Result<SeedContent, SeedError> {
    Ok(serde_yaml::from_str(SEED_YAML)?)
}

/// Insert the bundled content inside one transaction.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or any insert fails; nothing
/// is committed in that case.
pub async fn seed_content(pool: &PgPool) -> Result<SeedReport, SeedError> {
    let content = bundled()?;
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    for a in &content.articles {
        report.articles += sqlx::query(
            "INSERT INTO articles (id, title, description, content, source, source_url, date, read_time, condition)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&a.id)
        .bind(&a.title)
        .bind(&a.description)
        .bind(&a.content)
        .bind(&a.source)
        .bind(&a.source_url)
        .bind(&a.date)
        .bind(&a.read_time)
        .bind(a.condition.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for g in &content.glossary {
        report.glossary += sqlx::query(
            "INSERT INTO glossary (term, definition, details, normal_range, related_terms, condition)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (condition, term) DO NOTHING",
        )
        .bind(&g.term)
        .bind(&g.definition)
        .bind(&g.details)
        .bind(g.normal_range.as_deref())
        .bind(&g.related_terms)
        .bind(g.condition.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for v in &content.vitamins {
        let sources = serde_json::to_value(&v.sources)?;
        report.vitamins += sqlx::query(
            "INSERT INTO vitamins (key, name, description, benefits, sources, recommended_dosage, precautions, condition)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (condition, key) DO NOTHING",
        )
        .bind(&v.key)
        .bind(&v.name)
        .bind(&v.description)
        .bind(&v.benefits)
        .bind(sources)
        .bind(&v.recommended_dosage)
        .bind(&v.precautions)
        .bind(v.condition.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for s in &content.symptoms {
        report.symptoms += sqlx::query(
            "INSERT INTO symptoms (slug, name, description, overview, management_tips, when_to_seek_help,
                                   related_symptoms, condition)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (condition, slug) DO NOTHING",
        )
        .bind(&s.slug)
        .bind(&s.name)
        .bind(&s.description)
        .bind(&s.overview)
        .bind(&s.management_tips)
        .bind(&s.when_to_seek_help)
        .bind(&s.related_symptoms)
        .bind(s.condition.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for f in &content.quick_facts {
        report.quick_facts += sqlx::query(
            "INSERT INTO quick_facts (icon, text, condition) VALUES ($1, $2, $3)
             ON CONFLICT (condition, text) DO NOTHING",
        )
        .bind(&f.icon)
        .bind(&f.text)
        .bind(f.condition.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for quote in &content.inspirations {
        report.inspirations += sqlx::query("INSERT INTO inspirations (quote) VALUES ($1) ON CONFLICT (quote) DO NOTHING")
            .bind(quote)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;
    info!(
        articles = report.articles,
        glossary = report.glossary,
        vitamins = report.vitamins,
        symptoms = report.symptoms,
        quick_facts = report.quick_facts,
        inspirations = report.inspirations,
        "seed: content inserted"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
