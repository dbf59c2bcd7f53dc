use super::*;

#[test]
fn menu_items_skip_blank_lines() {
    let items = menu_items("Grilled Salmon\n\n   \n  Caesar Salad  \r\nFries");
    assert_eq!(items, vec!["Grilled Salmon", "Caesar Salad", "Fries"]);
}

#[test]
fn single_match_uses_food_score() {
    let scored = score_item("Grilled SALMON fillet");
    assert_eq!(scored.score, 9);
    assert_eq!(scored.recommendation, "Excellent choice for thyroid health!");
    assert_eq!(scored.details, "High in omega-3 fatty acids and selenium");
}

#[test]
fn multiple_matches_round_the_mean() {
    // (9 + 8) / 2 = 8.5 rounds to 9.
    let scored = score_item("Salmon with spinach");
    assert_eq!(scored.score, 9);
    assert_eq!(scored.details, "High in omega-3 fatty acids and selenium. Rich in iron and antioxidants");

    // (7 + 8) / 2 = 7.5 rounds to 8.
    assert_eq!(score_item("Chicken and lentils").score, 8);

    // (7 + 7 + 8) / 3 = 7.33 rounds to 7.
    assert_eq!(score_item("chicken, broccoli, sweet potato").score, 7);
}

#[test]
fn no_match_scores_zero() {
    let scored = score_item("Double cheeseburger");
    assert_eq!(scored.score, 0);
    assert_eq!(scored.details, "");
    assert_eq!(scored.recommendation, "Less ideal for thyroid health. Consider other options if possible.");
}

#[test]
fn multi_word_foods_match() {
    let scored = score_item("Roasted sweet potato drizzled with olive oil");
    assert_eq!(scored.score, 8);
    assert!(scored.details.contains("Rich in vitamin A and fiber"));
    assert!(scored.details.contains("Healthy fats"));
}

#[test]
fn recommendation_bands() {
    assert_eq!(recommendation(10), "Excellent choice for thyroid health!");
    assert_eq!(recommendation(8), "Excellent choice for thyroid health!");
    assert_eq!(recommendation(7), "Good option, but be mindful of portion sizes.");
    assert_eq!(recommendation(6), "Good option, but be mindful of portion sizes.");
    assert_eq!(recommendation(5), "Moderate option. Consider healthier alternatives if available.");
    assert_eq!(recommendation(4), "Moderate option. Consider healthier alternatives if available.");
    assert_eq!(recommendation(3), "Less ideal for thyroid health. Consider other options if possible.");
    assert_eq!(recommendation(0), "Less ideal for thyroid health. Consider other options if possible.");
}

#[test]
fn scan_menu_scores_each_line() {
    let results = scan_menu("Quinoa bowl\nPancakes\nGreek yogurt parfait");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].item, "Quinoa bowl");
    assert_eq!(results[0].score, 7);
    assert_eq!(results[1].score, 0);
    assert_eq!(results[2].score, 7);
}

#[test]
fn scan_menu_empty_text() {
    assert!(scan_menu("  \n \n").is_empty());
}
