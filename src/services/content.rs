//! Content service: glossary, vitamins, symptoms, recipes, articles,
//! quick facts and inspirations.
//!
//! DESIGN
//! ======
//! Every list is a single equality-filtered read against its table. Rows are
//! flat records; the only value invariant is the thyroid condition enum,
//! which the schema enforces with CHECK constraints. Empty results are not
//! errors: they are logged as warnings and returned as empty lists.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

// =============================================================================
// CONDITIONS
// =============================================================================

/// The two conditions that drive content filtering throughout the app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThyroidCondition {
    #[default]
    Hypothyroidism,
    Hyperthyroidism,
}

impl ThyroidCondition {
    pub const ALL: [Self; 2] = [Self::Hypothyroidism, Self::Hyperthyroidism];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hypothyroidism => "hypothyroidism",
            Self::Hyperthyroidism => "hyperthyroidism",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hypothyroidism" => Some(Self::Hypothyroidism),
            "hyperthyroidism" => Some(Self::Hyperthyroidism),
            _ => None,
        }
    }
}

impl fmt::Display for ThyroidCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipe tagging: a specific condition, or suitable for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeCondition {
    Hypothyroidism,
    Hyperthyroidism,
    #[default]
    Both,
}

impl RecipeCondition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hypothyroidism => "hypothyroidism",
            Self::Hyperthyroidism => "hyperthyroidism",
            Self::Both => "both",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "both" => Some(Self::Both),
            other => ThyroidCondition::parse(other).map(Self::from),
        }
    }
}

impl From<ThyroidCondition> for RecipeCondition {
    fn from(c: ThyroidCondition) -> Self {
        match c {
            ThyroidCondition::Hypothyroidism => Self::Hypothyroidism,
            ThyroidCondition::Hyperthyroidism => Self::Hyperthyroidism,
        }
    }
}

/// Article tagging: a specific condition, or general thyroid health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleCondition {
    Hypothyroidism,
    Hyperthyroidism,
    General,
}

impl ArticleCondition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hypothyroidism => "hypothyroidism",
            Self::Hyperthyroidism => "hyperthyroidism",
            Self::General => "general",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hypothyroidism" => Some(Self::Hypothyroidism),
            "hyperthyroidism" => Some(Self::Hyperthyroidism),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlossaryTerm {
    pub id: Uuid,
    pub term: String,
    pub definition: String,
    pub details: String,
    pub normal_range: Option<String>,
    pub related_terms: Vec<String>,
    pub condition: ThyroidCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vitamin {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub description: String,
    pub benefits: Vec<String>,
    pub sources: Vec<VitaminSource>,
    pub recommended_dosage: String,
    pub precautions: String,
    pub condition: ThyroidCondition,
}

/// A food source for a vitamin. Stored sources may be bare strings (food
/// only) or objects carrying serving size and amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVitaminSource")]
pub struct VitaminSource {
    pub food: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVitaminSource {
    Food(String),
    Detailed {
        food: String,
        #[serde(default, alias = "servingSize")]
        serving_size: Option<String>,
        #[serde(default)]
        amount: Option<RawAmount>,
        #[serde(default)]
        unit: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl From<RawVitaminSource> for VitaminSource {
    fn from(raw: RawVitaminSource) -> Self {
        match raw {
            RawVitaminSource::Food(food) => Self { food, serving_size: None, amount: None, unit: None },
            RawVitaminSource::Detailed { food, serving_size, amount, unit } => {
                let amount = amount.map(|a| match a {
                    RawAmount::Number(n) => format_amount(n),
                    RawAmount::Text(t) => t,
                });
                Self { food, serving_size, amount, unit }
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_amount(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 { format!("{}", n as i64) } else { n.to_string() }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symptom {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub overview: String,
    pub management_tips: Vec<String>,
    pub when_to_seek_help: Vec<String>,
    pub related_symptoms: Vec<String>,
    pub condition: ThyroidCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub image_url: String,
    pub thyroid_condition: RecipeCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
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

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickFact {
    pub id: Uuid,
    pub icon: String,
    pub text: String,
    pub condition: ThyroidCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspiration {
    pub id: Uuid,
    pub quote: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// GLOSSARY
// =============================================================================

const GLOSSARY_COLUMNS: &str = "id, term, definition, details, normal_range, related_terms, condition";

fn glossary_from_row(r: &PgRow) -> GlossaryTerm {
    GlossaryTerm {
        id: r.get("id"),
        term: r.get("term"),
        definition: r.get("definition"),
        details: r.get("details"),
        normal_range: r.get("normal_range"),
        related_terms: r.get("related_terms"),
        condition: condition_from_row(r, "condition"),
    }
}

/// Fetch all glossary terms for a condition.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_glossary(pool: &PgPool, condition: ThyroidCondition) -> Result<Vec<GlossaryTerm>, ContentError> {
    let rows = sqlx::query(&format!("SELECT {GLOSSARY_COLUMNS} FROM glossary WHERE condition = $1 ORDER BY term"))
        .bind(condition.as_str())
        .fetch_all(pool)
        .await?;
    let terms: Vec<GlossaryTerm> = rows.iter().map(glossary_from_row).collect();
    log_fetched("glossary", Some(condition), terms.len());
    Ok(terms)
}

/// URL slug for a glossary term: lowercased, whitespace runs become `-`.
#[must_use]
pub fn term_slug(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    let mut in_space = false;
    for c in term.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.extend(c.to_lowercase());
            in_space = false;
        }
    }
    out
}

/// Find a glossary term by slug, looking in hypothyroidism first and then
/// hyperthyroidism.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn find_glossary_term(pool: &PgPool, slug: &str) -> Result<Option<GlossaryTerm>, ContentError> {
    let wanted = slug.to_lowercase();
    for condition in ThyroidCondition::ALL {
        let terms = list_glossary(pool, condition).await?;
        if let Some(term) = terms.into_iter().find(|t| term_slug(&t.term) == wanted) {
            return Ok(Some(term));
        }
    }
    Ok(None)
}

// =============================================================================
// VITAMINS
// =============================================================================

const VITAMIN_COLUMNS: &str =
    "id, key, name, description, benefits, sources, recommended_dosage, precautions, condition";

fn vitamin_from_row(r: &PgRow) -> Vitamin {
    let sources: serde_json::Value = r.get("sources");
    Vitamin {
        id: r.get("id"),
        key: r.get("key"),
        name: r.get("name"),
        description: r.get("description"),
        benefits: r.get("benefits"),
        sources: parse_sources(sources),
        recommended_dosage: r.get("recommended_dosage"),
        precautions: r.get("precautions"),
        condition: condition_from_row(r, "condition"),
    }
}

/// Decode the stored `sources` JSON. Anything other than an array yields no
/// sources; individual malformed entries are skipped.
#[must_use]
pub fn parse_sources(value: serde_json::Value) -> Vec<VitaminSource> {
    let serde_json::Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<VitaminSource>(item).ok())
        .collect()
}

/// Leading numeric prefix of an amount, the way a lenient float parser
/// reads `"55 mcg"` as `55`.
#[must_use]
pub fn leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            '+' | '-' if i == 0 => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse::<f64>().ok()
}

/// Sort sources by amount, highest first. Missing or unparsable amounts
/// count as zero; equal amounts keep their stored order.
pub fn sort_sources_by_amount(sources: &mut [VitaminSource]) {
    let amount = |s: &VitaminSource| s.amount.as_deref().and_then(leading_number).unwrap_or(0.0);
    sources.sort_by(|a, b| amount(b).total_cmp(&amount(a)));
}

/// Fetch all vitamins for a condition.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_vitamins(pool: &PgPool, condition: ThyroidCondition) -> Result<Vec<Vitamin>, ContentError> {
    let rows = sqlx::query(&format!("SELECT {VITAMIN_COLUMNS} FROM vitamins WHERE condition = $1 ORDER BY name"))
        .bind(condition.as_str())
        .fetch_all(pool)
        .await?;
    let vitamins: Vec<Vitamin> = rows.iter().map(vitamin_from_row).collect();
    log_fetched("vitamins", Some(condition), vitamins.len());
    Ok(vitamins)
}

/// Fetch one vitamin by UUID, or by `key` (optionally narrowed to a
/// condition), with its sources sorted by amount. A bare key present under
/// both conditions resolves to the hypothyroidism row, as glossary slugs do.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_vitamin(
    pool: &PgPool,
    id_or_key: &str,
    condition: Option<ThyroidCondition>,
) -> Result<Option<Vitamin>, ContentError> {
    let row = if let Ok(id) = Uuid::parse_str(id_or_key) {
        sqlx::query(&format!("SELECT {VITAMIN_COLUMNS} FROM vitamins WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
    } else {
        sqlx::query(&format!(
            "SELECT {VITAMIN_COLUMNS} FROM vitamins
             WHERE key = $1 AND ($2::text IS NULL OR condition = $2)
             ORDER BY CASE condition WHEN 'hypothyroidism' THEN 0 ELSE 1 END
             LIMIT 1"
        ))
        .bind(id_or_key)
        .bind(condition.map(ThyroidCondition::as_str))
        .fetch_optional(pool)
        .await?
    };

    let Some(row) = row else {
        return Ok(None);
    };
    let mut vitamin = vitamin_from_row(&row);
    if vitamin.sources.is_empty() {
        warn!(vitamin = %vitamin.key, "vitamins: no sources recorded");
    }
    sort_sources_by_amount(&mut vitamin.sources);
    Ok(Some(vitamin))
}

// =============================================================================
// SYMPTOMS
// =============================================================================

const SYMPTOM_COLUMNS: &str =
    "id, slug, name, description, overview, management_tips, when_to_seek_help, related_symptoms, condition";

fn symptom_from_row(r: &PgRow) -> Symptom {
    Symptom {
        id: r.get("id"),
        slug: r.get("slug"),
        name: r.get("name"),
        description: r.get("description"),
        overview: r.get("overview"),
        management_tips: r.get("management_tips"),
        when_to_seek_help: r.get("when_to_seek_help"),
        related_symptoms: r.get("related_symptoms"),
        condition: condition_from_row(r, "condition"),
    }
}

/// Fetch all symptoms for a condition.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_symptoms(pool: &PgPool, condition: ThyroidCondition) -> Result<Vec<Symptom>, ContentError> {
    let rows = sqlx::query(&format!("SELECT {SYMPTOM_COLUMNS} FROM symptoms WHERE condition = $1 ORDER BY name"))
        .bind(condition.as_str())
        .fetch_all(pool)
        .await?;
    let symptoms: Vec<Symptom> = rows.iter().map(symptom_from_row).collect();
    log_fetched("symptoms", Some(condition), symptoms.len());
    Ok(symptoms)
}

/// Fetch one symptom by condition and slug.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_symptom(
    pool: &PgPool,
    condition: ThyroidCondition,
    slug: &str,
) -> Result<Option<Symptom>, ContentError> {
    let row = sqlx::query(&format!("SELECT {SYMPTOM_COLUMNS} FROM symptoms WHERE condition = $1 AND slug = $2"))
        .bind(condition.as_str())
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(symptom_from_row))
}

// =============================================================================
// RECIPES
// =============================================================================

const RECIPE_COLUMNS: &str = "id, title, description, ingredients, instructions, prep_time, cook_time, servings, \
                              image_url, thyroid_condition";

fn recipe_from_row(r: &PgRow) -> Recipe {
    let raw: String = r.get("thyroid_condition");
    Recipe {
        id: r.get("id"),
        title: r.get("title"),
        description: r.get("description"),
        ingredients: r.get("ingredients"),
        instructions: r.get("instructions"),
        prep_time: r.get("prep_time"),
        cook_time: r.get("cook_time"),
        servings: r.get("servings"),
        image_url: r.get("image_url"),
        thyroid_condition: RecipeCondition::parse(&raw).unwrap_or_default(),
    }
}

/// Fetch recipes. `Both` returns every recipe; a specific condition returns
/// only recipes tagged with exactly that condition.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_recipes(pool: &PgPool, condition: RecipeCondition) -> Result<Vec<Recipe>, ContentError> {
    let rows = match condition {
        RecipeCondition::Both => {
            sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM friendlyrecipes ORDER BY title"))
                .fetch_all(pool)
                .await?
        }
        specific => {
            sqlx::query(&format!(
                "SELECT {RECIPE_COLUMNS} FROM friendlyrecipes
                 WHERE thyroid_condition = $1
                 ORDER BY title"
            ))
            .bind(specific.as_str())
            .fetch_all(pool)
            .await?
        }
    };
    let recipes: Vec<Recipe> = rows.iter().map(recipe_from_row).collect();
    if recipes.is_empty() {
        warn!(condition = condition.as_str(), "recipes: none found");
    } else {
        info!(condition = condition.as_str(), count = recipes.len(), "recipes: fetched");
    }
    Ok(recipes)
}

/// Fetch one recipe by id.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_recipe(pool: &PgPool, id: Uuid) -> Result<Option<Recipe>, ContentError> {
    let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM friendlyrecipes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(recipe_from_row))
}

// =============================================================================
// ARTICLES
// =============================================================================

const ARTICLE_COLUMNS: &str = "id, title, description, content, source, source_url, date, read_time, condition";

fn article_from_row(r: &PgRow) -> Article {
    let raw: String = r.get("condition");
    Article {
        id: r.get("id"),
        title: r.get("title"),
        description: r.get("description"),
        content: r.get("content"),
        source: r.get("source"),
        source_url: r.get("source_url"),
        date: r.get("date"),
        read_time: r.get("read_time"),
        condition: ArticleCondition::parse(&raw).unwrap_or(ArticleCondition::General),
    }
}

/// Fetch articles, newest first, optionally filtered by condition.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_articles(pool: &PgPool, condition: Option<ArticleCondition>) -> Result<Vec<Article>, ContentError> {
    let rows = sqlx::query(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles
         WHERE ($1::text IS NULL OR condition = $1)
         ORDER BY date DESC, title"
    ))
    .bind(condition.map(ArticleCondition::as_str))
    .fetch_all(pool)
    .await?;
    let articles: Vec<Article> = rows.iter().map(article_from_row).collect();
    info!(count = articles.len(), "articles: fetched");
    Ok(articles)
}

/// Fetch one article by its slug id.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn get_article(pool: &PgPool, id: &str) -> Result<Option<Article>, ContentError> {
    let row = sqlx::query(&format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(article_from_row))
}

// =============================================================================
// QUICK FACTS & INSPIRATIONS
// =============================================================================

/// Fetch all quick facts for a condition.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_quick_facts(pool: &PgPool, condition: ThyroidCondition) -> Result<Vec<QuickFact>, ContentError> {
    let rows = sqlx::query("SELECT id, icon, text, condition FROM quick_facts WHERE condition = $1")
        .bind(condition.as_str())
        .fetch_all(pool)
        .await?;
    let facts: Vec<QuickFact> = rows
        .iter()
        .map(|r| QuickFact {
            id: r.get("id"),
            icon: r.get("icon"),
            text: r.get("text"),
            condition: condition_from_row(r, "condition"),
        })
        .collect();
    log_fetched("quick_facts", Some(condition), facts.len());
    Ok(facts)
}

/// Shuffle and keep at most `limit` items.
#[must_use]
pub fn sample<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    use rand::seq::SliceRandom;
    items.shuffle(&mut rand::rng());
    items.truncate(limit);
    items
}

/// Fetch every inspiration quote.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_inspirations(pool: &PgPool) -> Result<Vec<Inspiration>, ContentError> {
    let rows = sqlx::query_as::<_, (Uuid, String)>("SELECT id, quote FROM inspirations")
        .fetch_all(pool)
        .await?;
    let quotes: Vec<Inspiration> = rows
        .into_iter()
        .map(|(id, quote)| Inspiration { id, quote })
        .collect();
    log_fetched("inspirations", None, quotes.len());
    Ok(quotes)
}

/// Pick one inspiration at random, or `None` when the table is empty.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn random_inspiration(pool: &PgPool) -> Result<Option<Inspiration>, ContentError> {
    let row = sqlx::query_as::<_, (Uuid, String)>("SELECT id, quote FROM inspirations ORDER BY random() LIMIT 1")
        .fetch_optional(pool)
        .await?;
    if row.is_none() {
        warn!("inspirations: none found");
    }
    Ok(row.map(|(id, quote)| Inspiration { id, quote }))
}

// =============================================================================
// HELPERS
// =============================================================================

/// Case-insensitive substring match; an absent or blank needle matches all.
#[must_use]
pub fn matches_search(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}

fn condition_from_row(r: &PgRow, column: &str) -> ThyroidCondition {
    let raw: String = r.get(column);
    ThyroidCondition::parse(&raw).unwrap_or_else(|| {
        warn!(value = %raw, column, "unexpected condition value; treating as hypothyroidism");
        ThyroidCondition::Hypothyroidism
    })
}

fn log_fetched(table: &'static str, condition: Option<ThyroidCondition>, count: usize) {
    let condition = condition.map_or("all", ThyroidCondition::as_str);
    if count == 0 {
        warn!(table, condition, "no rows found");
    } else {
        info!(table, condition, count, "fetched rows");
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
