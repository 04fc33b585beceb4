use super::*;

fn module(title: &str, order: u32, duration: u32, difficulty: u8, exercises: &[&str]) -> CourseModule {
    CourseModule {
        title: Some(title.to_string()),
        order,
        duration,
        difficulty,
        exercises: Some(exercises.iter().map(|e| e.to_string()).collect()),
    }
}

fn sample_course() -> Vec<CourseModule> {
    vec![
        module(
            "Introduction to Python",
            1,
            60,
            3,
            &["Hello World", "Basic Calculations"],
        ),
        module(
            "Control Flow",
            2,
            90,
            4,
            &["If Statements", "Loops", "Function Practice"],
        ),
        module("Data Structures", 3, 120, 4, &["Lists", "Dictionaries"]),
    ]
}

#[test]
fn metrics_sum_durations_and_exercises() {
    let metrics = calculate_metrics(&sample_course());
    assert_eq!(metrics.total_duration, 270);
    assert_eq!(metrics.total_exercises, 7);
    assert!((metrics.average_difficulty - 3.67).abs() < 1e-9);
}

#[test]
fn metrics_for_empty_course_are_zero() {
    let metrics = calculate_metrics(&[]);
    assert_eq!(metrics.total_duration, 0);
    assert_eq!(metrics.total_exercises, 0);
    assert_eq!(metrics.average_difficulty, 0.0);
}

#[test]
fn organize_by_difficulty_is_stable() {
    let sorted = organize_modules(&sample_course(), SortBy::Difficulty);
    let titles: Vec<_> = sorted
        .iter()
        .map(|m| m.title.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(
        titles,
        ["Introduction to Python", "Control Flow", "Data Structures"]
    );
}

#[test]
fn organize_by_order_restores_authoring_sequence() {
    let mut shuffled = sample_course();
    shuffled.reverse();
    let sorted = organize_modules(&shuffled, SortBy::Order);
    assert_eq!(
        sorted.iter().map(|m| m.order).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn sample_course_has_no_warnings() {
    assert!(validate_structure(&sample_course()).is_empty());
}

#[test]
fn validation_flags_long_thin_and_untitled_modules() {
    let modules = vec![
        module("Marathon", 1, 150, 2, &["Only one"]),
        CourseModule {
            title: None,
            order: 2,
            duration: 30,
            difficulty: 1,
            exercises: None,
        },
    ];
    assert_eq!(
        validate_structure(&modules),
        vec![
            "Module 'Marathon' duration exceeds 2 hours".to_string(),
            "Module 'Marathon' has insufficient exercises".to_string(),
            "Module 2 missing title".to_string(),
        ]
    );
}

#[test]
fn sort_key_parses_from_cli_text() {
    assert_eq!("duration".parse::<SortBy>(), Ok(SortBy::Duration));
    assert!("alphabetical".parse::<SortBy>().is_err());
}

#[test]
fn modules_deserialize_from_toml() {
    #[derive(serde::Deserialize)]
    struct Doc {
        modules: Vec<CourseModule>,
    }
    let doc: Doc = toml::from_str(
        r#"
        [[modules]]
        title = "Intro"
        order = 1
        duration = 45
        difficulty = 2
        exercises = ["a", "b"]

        [[modules]]
        order = 2
        difficulty = 3
        "#,
    )
    .expect("toml");
    assert_eq!(doc.modules.len(), 2);
    assert_eq!(doc.modules[1].duration, 0);
    assert_eq!(doc.modules[1].title, None);
}
