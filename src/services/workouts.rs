//! Static workout catalog: workout types, cardio and yoga exercises, and
//! strength training categories. Nothing here touches the database.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkoutType {
    pub slug: &'static str,
    pub title: &'static str,
    pub is_custom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub image_url: &'static str,
    pub difficulty: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthCategory {
    pub name: &'static str,
    pub slug: &'static str,
    pub image_url: &'static str,
}

/// Exercise lists that support search and difficulty filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseKind {
    Cardio,
    Yoga,
}

impl ExerciseKind {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cardio" => Some(Self::Cardio),
            "yoga" => Some(Self::Yoga),
            _ => None,
        }
    }

    fn catalog(self) -> &'static [Exercise] {
        match self {
            Self::Cardio => CARDIO,
            Self::Yoga => YOGA,
        }
    }
}

pub const WORKOUT_TYPES: &[WorkoutType] = &[
    WorkoutType { slug: "cardio", title: "Cardio", is_custom: false },
    WorkoutType { slug: "strength", title: "Strength Training", is_custom: false },
    WorkoutType { slug: "yoga", title: "Yoga & Stretching", is_custom: false },
    WorkoutType { slug: "hiit", title: "HIIT", is_custom: false },
    WorkoutType { slug: "functional", title: "Functional", is_custom: false },
    WorkoutType { slug: "custom", title: "Custom", is_custom: true },
];

const CARDIO: &[Exercise] = &[
    Exercise {
        id: 1,
        name: "Burpees",
        description: "A full-body exercise that combines a squat, push-up, and jump.",
        image_url: "https://images.unsplash.com/photo-1587223075055-82e9a937ddff?auto=format&fit=crop&w=300&q=80",
        difficulty: 5,
    },
    Exercise {
        id: 2,
        name: "Cycling",
        description: "Riding a bicycle, either outdoors or on a stationary bike.",
        image_url: "https://images.unsplash.com/photo-1519350773302-075141b34e26?auto=format&fit=crop&w=300&q=80",
        difficulty: 3,
    },
    Exercise {
        id: 3,
        name: "Jumping Jacks",
        description: "A calisthenics exercise involving jumping to a position with legs spread wide and hands \
                      touching overhead.",
        image_url: "https://images.unsplash.com/photo-1534239283410-f3640fe2c140?auto=format&fit=crop&w=300&q=80",
        difficulty: 2,
    },
    Exercise {
        id: 4,
        name: "Mountain Climbers",
        description: "An exercise that mimics the motion of climbing a mountain, working your core and \
                      cardiovascular system.",
        image_url: "https://images.unsplash.com/photo-1590086782957-93c06ef21604?auto=format&fit=crop&w=300&q=80",
        difficulty: 4,
    },
    Exercise {
        id: 5,
        name: "Running",
        description: "Moving at a speed faster than a walk, never having both feet on the ground at the same time.",
        image_url: "https://images.unsplash.com/photo-1483721274302-3f77f59f5dd0?auto=format&fit=crop&w=300&q=80",
        difficulty: 3,
    },
    Exercise {
        id: 6,
        name: "Swimming",
        description: "Propelling yourself through water using your limbs.",
        image_url: "https://images.unsplash.com/photo-1520250497591-112f2f40a3f4?auto=format&fit=crop&w=300&q=80",
        difficulty: 3,
    },
];

// TODO: replace the placeholder entry once yoga poses and images are sourced.
const YOGA: &[Exercise] = &[Exercise {
    id: 1,
    name: "Burpees",
    description: "A full-body exercise that combines a squat, push-up, and jump.",
    image_url: "https://images.unsplash.com/photo-1587223075055-82e9a937ddff?auto=format&fit=crop&w=300&q=80",
    difficulty: 5,
}];

pub const STRENGTH_CATEGORIES: &[StrengthCategory] = &[
    StrengthCategory {
        name: "Shoulders",
        slug: "shoulders",
        image_url: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQFp-1r-JsDTZUkJXtEOyb7LT7-9sYMgut0AA&s",
    },
    StrengthCategory {
        name: "Back",
        slug: "back",
        image_url: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcT0eldvyYycx1JhT8BYtl-mi0iW6WtLbYDvPw&s",
    },
    StrengthCategory {
        name: "Chest",
        slug: "chest",
        image_url: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcS9dEm9EUjp5ieM4EnBdTAtwxoJZSNtDGEbhQ&s",
    },
    StrengthCategory {
        name: "Arms",
        slug: "arms",
        image_url: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcS0TckzEJiqJMpee4ElhH0WeS5FXeogkH50Qg&s",
    },
    StrengthCategory {
        name: "Legs",
        slug: "legs",
        image_url: "https://images.unsplash.com/photo-1574680178050-55c6a6a96e0a?auto=format&fit=crop&w=300&q=80",
    },
    StrengthCategory {
        name: "Core",
        slug: "core",
        image_url: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcSKME_vXphAlIh50Ptnj4vIPPPy6-D_-Zn-cQ&s",
    },
];

/// Exercises of `kind` whose name contains `search` (case-insensitive) and,
/// when `difficulty` is given, whose difficulty equals it. Sorted by name.
#[must_use]
pub fn find_exercises(kind: ExerciseKind, search: Option<&str>, difficulty: Option<u8>) -> Vec<Exercise> {
    let needle = search.unwrap_or_default().to_lowercase();
    let mut found: Vec<Exercise> = kind
        .catalog()
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .filter(|e| difficulty.is_none_or(|d| e.difficulty == d))
        .copied()
        .collect();
    found.sort_by(|a, b| a.name.cmp(b.name));
    found
}

#[cfg(test)]
#[path = "workouts_test.rs"]
mod tests;
