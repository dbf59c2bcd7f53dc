//! Menu scanner: scores menu lines against a table of thyroid-friendly foods.
//!
//! Input is menu text already extracted from an image; every non-blank line
//! is one item. An item's score is the rounded mean of the foods it mentions,
//! capped at 10, or 0 when it mentions none.

use serde::Serialize;

/// (food, score, reason). Matched as case-insensitive substrings.
const THYROID_FRIENDLY_FOODS: &[(&str, u32, &str)] = &[
    ("salmon", 9, "High in omega-3 fatty acids and selenium"),
    ("spinach", 8, "Rich in iron and antioxidants"),
    ("quinoa", 7, "Good source of protein and fiber"),
    ("chicken", 7, "Lean protein source"),
    ("lentils", 8, "High in fiber and zinc"),
    ("sweet potato", 8, "Rich in vitamin A and fiber"),
    ("broccoli", 7, "High in antioxidants, but moderate in goitrogens"),
    ("olive oil", 8, "Healthy fats and anti-inflammatory properties"),
    ("eggs", 7, "Good source of iodine and selenium"),
    ("yogurt", 7, "Probiotic benefits, but watch for added sugars"),
];

const MAX_SCORE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItemScore {
    pub item: String,
    pub score: u32,
    pub recommendation: &'static str,
    pub details: String,
}

/// Split menu text into items: trimmed, non-blank lines.
#[must_use]
pub fn menu_items(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[must_use]
pub fn recommendation(score: u32) -> &'static str {
    match score {
        8.. => "Excellent choice for thyroid health!",
        6..=7 => "Good option, but be mindful of portion sizes.",
        4..=5 => "Moderate option. Consider healthier alternatives if available.",
        _ => "Less ideal for thyroid health. Consider other options if possible.",
    }
}

/// Score one menu item.
#[must_use]
pub fn score_item(item: &str) -> MenuItemScore {
    let lower = item.to_lowercase();
    let matches: Vec<&(&str, u32, &str)> = THYROID_FRIENDLY_FOODS
        .iter()
        .filter(|(food, _, _)| lower.contains(food))
        .collect();

    let score = if matches.is_empty() {
        0
    } else {
        let total: u32 = matches.iter().map(|(_, s, _)| s).sum();
        let count = u32::try_from(matches.len()).unwrap_or(u32::MAX);
        // Round half up, as integer arithmetic on non-negative values.
        ((2 * total + count) / (2 * count)).min(MAX_SCORE)
    };

    let details = matches
        .iter()
        .map(|(_, _, reason)| *reason)
        .collect::<Vec<_>>()
        .join(". ");

    MenuItemScore { item: item.to_owned(), score, recommendation: recommendation(score), details }
}

/// Score every item in a block of menu text.
#[must_use]
pub fn scan_menu(text: &str) -> Vec<MenuItemScore> {
    menu_items(text).into_iter().map(score_item).collect()
}

#[cfg(test)]
#[path = "menu_scan_test.rs"]
mod tests;
