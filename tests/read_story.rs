//! End-to-end playthrough behaviour: paragraphs, diverts, glue, tags.

use fabled::Session;

fn lines(session: &mut Session) -> Vec<String> {
    session
        .resume(None)
        .unwrap()
        .into_iter()
        .map(|line| line.text)
        .collect()
}

#[test]
fn a_single_paragraph_is_read_and_ends_the_story() {
    let mut session = Session::from_string("Hello, world.\n-> END").unwrap();
    session.start().unwrap();

    assert_eq!(lines(&mut session), vec!["Hello, world.".to_string()]);
    assert!(session.is_over());
}

#[test]
fn diverts_move_reading_into_another_knot() {
    let source = "\
-> harbor

== harbor
The ship sails at dawn.
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert_eq!(lines(&mut session), vec!["The ship sails at dawn.".to_string()]);
    assert!(session.is_over());
}

#[test]
fn glue_merges_lines_ending_and_starting_with_the_marker() {
    let source = "Hello<>\n world.";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert_eq!(lines(&mut session), vec!["Hello world.".to_string()]);
}

#[test]
fn glue_merges_across_a_divert() {
    let source = "\
Hello<>
-> elsewhere

== elsewhere
<> world.
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert_eq!(lines(&mut session), vec!["Hello world.".to_string()]);
}

#[test]
fn tags_attach_to_their_paragraph() {
    let source = "An old castle heaves in front of you. # description\n-> END";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    let out = session.resume(None).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, "An old castle heaves in front of you.");
    assert_eq!(out[0].tags, vec!["description".to_string()]);
}

#[test]
fn resume_with_a_limit_returns_a_prefix_of_resume_all() {
    let source = "One.\nTwo.\nThree.\n-> END";

    let mut a = Session::from_string(source).unwrap();
    a.start().unwrap();
    let first = a.resume(Some(1)).unwrap();
    let rest = a.resume(None).unwrap();

    let mut b = Session::from_string(source).unwrap();
    b.start().unwrap();
    let all = b.resume(None).unwrap();

    let mut prefix = first;
    prefix.extend(rest);
    assert_eq!(prefix, all);
}

#[test]
fn can_continue_can_choose_and_is_over_are_mutually_exclusive() {
    let source = "\
Welcome.

* Stay -> staying
* Leave -> END

== staying
You stay.
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    // `canContinue`/`canChoose`/`isOver` are only meaningfully exclusive
    // once pending paragraphs have been fully drained: reaching the final
    // `-> END` leaves its preceding paragraph queued until the caller
    // drains it, exactly like calling `continueMaximally` before checking
    // whether the story has ended.
    loop {
        while session.can_continue() {
            session.resume(None).unwrap();
        }

        if session.is_over() {
            assert!(!session.can_choose());
            break;
        }

        assert!(session.can_choose());
        session.choose(1).unwrap();
    }
}

#[test]
fn output_accumulates_everything_narrated_so_far() {
    let source = "First.\nSecond.\n-> END";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();
    session.resume(None).unwrap();

    let texts: Vec<&str> = session.output().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["First.", "Second."]);
}

#[test]
fn resume_before_start_is_an_error() {
    let mut session = Session::from_string("Hello.").unwrap();
    assert!(session.resume(None).is_err());
}

#[test]
fn starting_twice_is_an_error() {
    let mut session = Session::from_string("Hello.\n-> END").unwrap();
    session.start().unwrap();
    assert!(session.start().is_err());
}
