//! Sticky vs one-shot choices, conditions, and fallback diverts.

use fabled::Session;

#[test]
fn a_one_shot_choice_disappears_after_being_taken() {
    let source = "\
-> hub

== hub
* [Ask] Something. -> hub
* [Leave] -> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    let choices = session.choices().unwrap();
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0].text, "Ask");
    assert_eq!(choices[1].text, "Leave");

    session.choose(1).unwrap();
    session.resume(None).unwrap();

    let choices = session.choices().unwrap();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].text, "Leave");
}

#[test]
fn sticky_choice_reappears_every_visit_while_non_sticky_appears_once() {
    let source = "\
-> hub

== hub
+ [Ask again] -> hub
* [Leave] -> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    for _ in 0..3 {
        let choices = session.choices().unwrap();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].text, "Ask again");
        assert_eq!(choices[1].text, "Leave");
        session.choose(1).unwrap();
    }

    // "Leave" is still available for the final visit, "Ask again" still
    // reappears because it is sticky.
    let choices = session.choices().unwrap();
    assert_eq!(choices.len(), 2);
    session.choose(2).unwrap();
    assert!(session.is_over());
}

#[test]
fn a_condition_hides_a_choice_from_the_menu() {
    let source = "\
~ temp can_fight = false

* {can_fight} Fight -> fought
* Flee -> fled

== fought
You fight.
-> END

== fled
You flee.
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    let choices = session.choices().unwrap();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].text, "Flee");
}

#[test]
fn fallback_choice_is_taken_silently_when_nothing_else_is_visible() {
    let source = "\
~ temp can_fight = false

* {can_fight} Fight -> fought
* -> fled

== fought
You fight.
-> END

== fled
You flee.
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert!(session.is_over());
    session.resume(None).unwrap();
    let texts: Vec<&str> = session.output().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["You flee."]);
}

#[test]
fn choosing_runs_the_choice_body_then_falls_through_to_the_gather() {
    // The choice carries no divert of its own, so once its body is read
    // control falls through into `Gathers` mode and picks up "Gathered."
    // as the next sibling content, rather than stopping at the choice.
    let source = "\
* Good
  You did well.
- Gathered.
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();
    session.choose(1).unwrap();
    session.resume(None).unwrap();

    let texts: Vec<&str> = session.output().iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["Good", "You did well.", "Gathered."]);
    assert!(session.is_over());
}

#[test]
fn choosing_an_out_of_range_selection_is_an_error() {
    let source = "* Only option -> END";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert!(session.choose(2).is_err());
    assert!(session.choose(0).is_err());
}

#[test]
fn choosing_with_no_menu_presented_is_an_error() {
    let source = "No choices here.\n-> END";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert!(session.choose(1).is_err());
}
