//! End-to-end duel scenarios through the public API
//!
//! Drives full games with scripted views and asserts on the render
//! trail, the captured transcript, and the reported result.

use duel_arena::core::PlayerConfig;
use duel_arena::game::{
    DuelSession, GameEndReason, OutputMode, VerbosityLevel, PARTICIPANT_A, PARTICIPANT_B,
};
use duel_arena::view::{ScriptedView, SharedView, ViewIntent};
use similar_asserts::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn scripted(script: Vec<ViewIntent>) -> (Rc<RefCell<ScriptedView>>, SharedView) {
    let concrete = Rc::new(RefCell::new(ScriptedView::with_script(script)));
    let shared: SharedView = concrete.clone();
    (concrete, shared)
}

/// Pump animations and the session until the game reports a result
fn run_to_result(
    session: &mut DuelSession,
    view_a: &Rc<RefCell<ScriptedView>>,
    view_b: &Rc<RefCell<ScriptedView>>,
) -> duel_arena::game::DuelResult {
    for _ in 0..1000 {
        view_a.borrow_mut().pump_animation();
        view_b.borrow_mut().pump_animation();
        if let Some(result) = session.pump().expect("pump failed") {
            return result;
        }
    }
    panic!("game did not terminate");
}

fn health_trail(view: &Rc<RefCell<ScriptedView>>) -> Vec<i32> {
    view.borrow()
        .renders()
        .iter()
        .map(|snapshot| snapshot.current_health)
        .collect()
}

#[test]
fn attack_duel_runs_to_defeat() {
    // Alice hits for 20, Bob hits for 30; both always attack.
    let (view_a, shared_a) = scripted(vec![]);
    let (view_b, shared_b) = scripted(vec![]);

    let mut session = DuelSession::new(
        PlayerConfig::new("Alice", 100, 20),
        PlayerConfig::new("Bob", 100, 30),
    );
    session.logger_mut().set_output_mode(OutputMode::Memory);
    session.start_game(shared_a, shared_b).unwrap();

    let result = run_to_result(&mut session, &view_a, &view_b);

    // Bob outdamages Alice: she falls to 0 (clamped from -20) in round 4.
    assert_eq!(result.winner.as_ref().map(|n| n.as_str()), Some("Bob"));
    assert_eq!(result.rounds, 4);
    assert_eq!(result.end_reason, GameEndReason::PlayerDefeat(PARTICIPANT_B));

    // Alice's surface saw every step of her decline, then the post-game
    // reset; health never left [0, 100].
    assert_eq!(health_trail(&view_a), vec![100, 70, 40, 10, 0, 100]);
    assert_eq!(health_trail(&view_b), vec![100, 80, 60, 40, 20, 100]);

    let transcript = session.logger().transcript();
    assert!(transcript.contains("Bob wins after 4 round(s)"));
}

#[test]
fn rotation_order_and_round_count_are_deterministic() {
    // Zero power keeps both alive; the round cap ends the game.
    let (view_a, shared_a) = scripted(vec![]);
    let (view_b, shared_b) = scripted(vec![]);

    let mut session = DuelSession::new(
        PlayerConfig::new("Alice", 100, 0),
        PlayerConfig::new("Bob", 100, 0),
    )
    .with_verbosity(VerbosityLevel::Verbose)
    .with_max_rounds(2);
    session.logger_mut().set_output_mode(OutputMode::Memory);
    session.start_game(shared_a, shared_b).unwrap();

    let result = run_to_result(&mut session, &view_a, &view_b);
    assert_eq!(result.rounds, 2);
    assert_eq!(result.end_reason, GameEndReason::RoundLimit);

    let expected = "\
Alice vs Bob
-- Round 1 --
P1 takes the turn
Alice attacks Bob for 0 (100/100 left)
P2 takes the turn
Bob attacks Alice for 0 (100/100 left)
-- Round 2 --
P1 takes the turn
Alice attacks Bob for 0 (100/100 left)
P2 takes the turn
Bob attacks Alice for 0 (100/100 left)
Draw after 2 round(s)
";
    assert_eq!(session.logger().transcript(), expected);
}

#[test]
fn healing_never_exceeds_max_health() {
    // Bob chips Alice for 10, Alice heals 30: she must cap at 100.
    let (view_a, shared_a) = scripted(vec![ViewIntent::Heal, ViewIntent::Heal]);
    let (view_b, shared_b) = scripted(vec![ViewIntent::Attack, ViewIntent::Attack]);

    let mut session = DuelSession::new(
        PlayerConfig::new("Alice", 100, 30),
        PlayerConfig::new("Bob", 100, 10),
    )
    .with_max_rounds(2);
    session.logger_mut().set_output_mode(OutputMode::Memory);
    session.start_game(shared_a, shared_b).unwrap();

    let result = run_to_result(&mut session, &view_a, &view_b);
    assert_eq!(result.end_reason, GameEndReason::RoundLimit);

    let trail = health_trail(&view_a);
    assert!(trail.contains(&90), "Bob's chip damage must land: {trail:?}");
    assert!(
        trail.iter().all(|&health| (0..=100).contains(&health)),
        "health must stay in [0, max]: {trail:?}"
    );
    // heals landed at exactly full, never past it
    assert!(trail.windows(2).any(|w| w == [90, 100]));
    assert_eq!(*trail.last().unwrap(), 100);
}

#[test]
fn active_participant_alternates_within_a_round() {
    let (view_a, shared_a) = scripted(vec![ViewIntent::Attack]);
    let (view_b, shared_b) = scripted(vec![]);

    let mut session = DuelSession::new(
        PlayerConfig::new("Alice", 100, 20),
        PlayerConfig::new("Bob", 100, 30),
    );
    session.logger_mut().set_output_mode(OutputMode::Memory);
    session.start_game(shared_a, shared_b).unwrap();

    assert_eq!(session.active_participant(), Some(PARTICIPANT_A));

    // finish only Alice's reveal: her turn resolves, Bob's cannot start
    view_a.borrow_mut().pump_animation();
    session.pump().unwrap();
    assert_eq!(session.active_participant(), Some(PARTICIPANT_B));
    assert_eq!(
        session.snapshot(PARTICIPANT_B).unwrap().current_health,
        80
    );

    // with both reveals complete the bots play each other out: Bob
    // replies, round 2 opens with Alice again, and the duel runs to its
    // round-4 defeat inside this one pump
    view_b.borrow_mut().pump_animation();
    let result = session
        .pump()
        .unwrap()
        .expect("bot duel runs to completion");
    assert_eq!(result.rounds, 4);
    assert_eq!(result.winner.as_ref().map(|n| n.as_str()), Some("Bob"));
}
