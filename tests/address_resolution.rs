//! Runtime address resolution: unlike the grammar, divert targets are only
//! checked once they are actually followed during a playthrough.

use fabled::error::StoryError;
use fabled::Session;

#[test]
fn diverting_to_an_unknown_knot_fails_at_runtime_not_at_parse_time() {
    let source = "-> nowhere";

    // Compiling the story succeeds: the divert target is plain text until
    // it is actually followed.
    let mut session = Session::from_string(source).unwrap();

    match session.start() {
        Err(StoryError::Address(err)) => {
            assert_eq!(err.raw_address, "nowhere");
        }
        other => panic!("expected an address error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn a_divert_only_ever_followed_on_the_unchosen_branch_never_raises() {
    let source = "\
~ temp take_bad_path = false

* {take_bad_path} Go -> nowhere
* Stay -> END
";
    let mut session = Session::from_string(source).unwrap();
    assert!(session.start().is_ok());
}

#[test]
fn stitches_and_labels_resolve_relative_to_the_current_knot() {
    let source = "\
-> forest.clearing

== forest
= clearing
A clearing opens up. (here)
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert_eq!(session.get_num_visited("forest.clearing"), 1);
    assert_eq!(session.get_num_visited("forest.clearing.here"), 1);
}

#[test]
fn end_and_done_both_terminate_a_session() {
    let mut done = Session::from_string("Finished.\n-> DONE").unwrap();
    done.start().unwrap();
    assert!(done.is_over());

    let mut ended = Session::from_string("Finished.\n-> END").unwrap();
    ended.start().unwrap();
    assert!(ended.is_over());
}
