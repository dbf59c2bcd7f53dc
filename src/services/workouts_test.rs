use super::*;

#[test]
fn workout_types_in_display_order() {
    let slugs: Vec<&str> = WORKOUT_TYPES.iter().map(|t| t.slug).collect();
    assert_eq!(slugs, ["cardio", "strength", "yoga", "hiit", "functional", "custom"]);
    assert!(WORKOUT_TYPES.iter().filter(|t| t.is_custom).count() == 1);
}

#[test]
fn cardio_unfiltered_is_sorted_by_name() {
    let names: Vec<&str> = find_exercises(ExerciseKind::Cardio, None, None)
        .iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["Burpees", "Cycling", "Jumping Jacks", "Mountain Climbers", "Running", "Swimming"]);
}

#[test]
fn search_is_case_insensitive_substring() {
    let found = find_exercises(ExerciseKind::Cardio, Some("ING"), None);
    let names: Vec<&str> = found.iter().map(|e| e.name).collect();
    assert_eq!(names, ["Cycling", "Jumping Jacks", "Running", "Swimming"]);
}

#[test]
fn difficulty_filter_is_exact() {
    let found = find_exercises(ExerciseKind::Cardio, None, Some(3));
    let names: Vec<&str> = found.iter().map(|e| e.name).collect();
    assert_eq!(names, ["Cycling", "Running", "Swimming"]);
    assert!(find_exercises(ExerciseKind::Cardio, None, Some(1)).is_empty());
}

#[test]
fn search_and_difficulty_combine() {
    let found = find_exercises(ExerciseKind::Cardio, Some("r"), Some(4));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Mountain Climbers");
}

#[test]
fn empty_search_matches_all() {
    assert_eq!(find_exercises(ExerciseKind::Yoga, Some(""), None).len(), 1);
}

#[test]
fn exercise_kind_parse() {
    assert_eq!(ExerciseKind::parse("cardio"), Some(ExerciseKind::Cardio));
    assert_eq!(ExerciseKind::parse("yoga"), Some(ExerciseKind::Yoga));
    assert_eq!(ExerciseKind::parse("strength"), None);
}

#[test]
fn strength_categories_have_lowercase_slugs() {
    assert_eq!(STRENGTH_CATEGORIES.len(), 6);
    for c in STRENGTH_CATEGORIES {
        assert_eq!(c.slug, c.name.to_lowercase());
    }
}

#[test]
fn exercise_serializes_snake_case() {
    let json = serde_json::to_value(CARDIO[0]).unwrap();
    assert_eq!(json["name"], "Burpees");
    assert_eq!(json["difficulty"], 5);
    assert!(json["image_url"].as_str().unwrap().starts_with("https://images.unsplash.com/"));
}
