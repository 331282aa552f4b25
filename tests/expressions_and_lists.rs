//! Inline expression evaluation, condition switches, alternatives
//! sequencing, and LIST algebra, driven entirely through `Session`.

use fabled::{Session, Value};

fn next_line(session: &mut Session) -> String {
    session.resume(Some(1)).unwrap().remove(0).text
}

#[test]
fn condition_switch_picks_the_matching_arm() {
    let source = "\
VAR x = 2
{x == 1: one | x == 2: two | else: many}
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();
    assert_eq!(next_line(&mut session), "two");
}

#[test]
fn condition_switch_falls_back_to_else() {
    let source = "\
VAR x = 5
{x == 1: one | x == 2: two | else: many}
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();
    assert_eq!(next_line(&mut session), "many");
}

#[test]
fn stopping_alternatives_hold_on_the_last_entry() {
    let source = "\
-> loop

== loop
{stopping: a|b|c}
+ [Next] -> loop
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    let mut seen = Vec::new();
    for _ in 0..5 {
        seen.push(next_line(&mut session));
        session.choose(1).unwrap();
    }

    assert_eq!(seen, vec!["a", "b", "c", "c", "c"]);
}

#[test]
fn cycle_alternatives_wrap_around() {
    let source = "\
-> loop

== loop
{cycle: a|b|c}
+ [Next] -> loop
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    let mut seen = Vec::new();
    for _ in 0..6 {
        seen.push(next_line(&mut session));
        session.choose(1).unwrap();
    }

    assert_eq!(seen, vec!["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn list_membership_reflects_removal() {
    let source = "\
LIST colors = red, (green), blue
{colors has green}
~ colors = colors - green
{colors has green}
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    let out = session.resume(None).unwrap();
    assert_eq!(out[0].text, "1");
    assert_eq!(out[1].text, "0");
}

#[test]
fn variables_can_be_read_and_written_through_the_session() {
    let source = "\
VAR score = 0
~ score = score + 5
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    assert_eq!(session.get_variable("score"), Some(Value::Int(5)));
}

#[test]
fn assigning_to_a_constant_is_rejected() {
    let source = "\
CONST max_health = 100
-> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();

    let err = session.set_variable("max_health", Value::Int(1));
    assert!(err.is_err());
}

#[test]
fn observer_fires_only_when_a_tracked_value_actually_changes() {
    let source = "\
VAR flag = false
~ flag = false
~ flag = true
~ flag = true
-> END
";
    let mut session = Session::from_string(source).unwrap();

    let changes = std::rc::Rc::new(std::cell::RefCell::new(0));
    let changes_clone = changes.clone();
    session.observe("flag", move |_value| {
        *changes_clone.borrow_mut() += 1;
    });

    session.start().unwrap();

    assert_eq!(*changes.borrow(), 1);
}

#[test]
fn a_bound_host_function_is_callable_from_an_expression() {
    let source = "{double(21)}\n-> END";
    let mut session = Session::from_string(source).unwrap();

    session.bind_function("double", |args: &[Value]| match args {
        [Value::Int(n)] => Ok(Value::Int(n * 2)),
        _ => Err("double takes one int".to_string()),
    });

    session.start().unwrap();
    assert_eq!(next_line(&mut session), "42");
}

#[test]
fn visit_counts_increase_each_time_a_knot_is_entered() {
    let source = "\
-> hub

== hub
+ [Again] -> hub
+ [Stop] -> END
";
    let mut session = Session::from_string(source).unwrap();
    session.start().unwrap();
    assert_eq!(session.get_num_visited("hub"), 1);

    session.choose(1).unwrap();
    assert_eq!(session.get_num_visited("hub"), 2);

    session.choose(1).unwrap();
    assert_eq!(session.get_num_visited("hub"), 3);
}
