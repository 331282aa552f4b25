//! Host-facing surface beyond the core read loop: the log of `TODO:`
//! comments and warnings, and error message formatting.

use fabled::error::StoryError;
use fabled::Session;

#[test]
fn todo_comments_are_collected_without_affecting_the_story() {
    let source = "\
TODO: fix the pacing of this scene
Hello, world.
-> END
";
    let session = Session::from_string(source).unwrap();
    assert!(session.log().has_entries());
}

#[test]
fn a_story_with_nothing_to_report_has_an_empty_log() {
    let session = Session::from_string("Hello, world.\n-> END").unwrap();
    assert!(!session.log().has_entries());
}

#[test]
fn a_shuffle_alternative_without_the_random_feature_logs_a_warning() {
    let source = "{shuffle: a|b|c}\n-> END";
    let session = Session::from_string(source).unwrap();

    #[cfg(not(feature = "random"))]
    assert!(session.log().has_entries());

    #[cfg(feature = "random")]
    let _ = session;
}

#[test]
fn out_of_range_choice_selection_reports_the_valid_range() {
    let mut session = Session::from_string("* Only -> END").unwrap();
    session.start().unwrap();

    match session.choose(7) {
        Err(StoryError::OutOfRange(err)) => {
            assert_eq!(err.selection, 7);
            assert_eq!(err.num_choices, 1);
            assert!(err.to_string().contains("1"));
        }
        other => panic!("expected an out-of-range error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn reading_a_missing_variable_name_reports_the_name() {
    let mut session = Session::from_string("Hello.\n-> END").unwrap();
    session.start().unwrap();

    assert!(session.get_variable("does_not_exist").is_none());
    assert!(session.set_variable("does_not_exist", fabled::Value::Int(1)).is_err());
}
