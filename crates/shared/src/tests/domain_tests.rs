use super::*;

#[test]
fn percentage_is_share_of_completed_lessons() {
    let progress = CourseProgress::new(3, 10);
    assert!((progress.percentage() - 30.0).abs() < f64::EPSILON);
    assert_eq!(progress.rounded_percentage(), 30);
}

#[test]
fn empty_course_reports_zero_percent() {
    let progress = CourseProgress::new(0, 0);
    assert_eq!(progress.percentage(), 0.0);
    assert!(!progress.is_consistent());
}

#[test]
fn overcounted_completion_is_capped() {
    let progress = CourseProgress::new(12, 10);
    assert_eq!(progress.rounded_percentage(), 100);
    assert!(!progress.is_consistent());
}

#[test]
fn rounding_matches_whole_number_display() {
    assert_eq!(CourseProgress::new(1, 3).rounded_percentage(), 33);
    assert_eq!(CourseProgress::new(2, 3).rounded_percentage(), 67);
}

#[test]
fn summary_reads_like_the_stats_line() {
    assert_eq!(
        CourseProgress::new(4, 9).summary(),
        "4 of 9 lessons completed"
    );
}

#[test]
fn newtypes_serialize_as_plain_strings() {
    let token = IdentityToken::new("ada@example.com");
    assert_eq!(
        serde_json::to_string(&token).expect("json"),
        "\"ada@example.com\""
    );
    assert_eq!(CourseId::new("course1").to_string(), "course1");
}
