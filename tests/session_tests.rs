/// Session integration tests — whole playthroughs over RON fixtures with
/// scripted player input and a scripted oracle.

use adventure_engine::core::freeform::FreeformNarrator;
use adventure_engine::core::io::{Line, ScriptedIo};
use adventure_engine::core::library::ChapterLibrary;
use adventure_engine::core::narrator::NarratorError;
use adventure_engine::core::oracle::{OracleError, Role};
use adventure_engine::core::scripted::ScriptedNarrator;
use adventure_engine::core::session::{Session, SessionOutcome};
use adventure_engine::core::testing::ScriptedOracle;
use adventure_engine::schema::encounter::Encounter;
use adventure_engine::schema::status::{StatusKind, StatusManager};
use std::path::Path;

fn fixtures() -> ChapterLibrary {
    ChapterLibrary::load_dir(Path::new("tests/fixtures/chapters")).unwrap()
}

fn entry(library: &ChapterLibrary, name: &str) -> ScriptedNarrator {
    ScriptedNarrator::new(library.get(name).unwrap().clone()).unwrap()
}

fn encounter() -> FreeformNarrator {
    let mut encounters = Encounter::load_all(Path::new("tests/fixtures/encounters.ron")).unwrap();
    encounters.remove(0).into()
}

fn days(io: &ScriptedIo) -> Vec<u32> {
    io.transcript
        .iter()
        .filter_map(|line| match line {
            Line::Day(day) => Some(*day),
            _ => None,
        })
        .collect()
}

#[test]
fn chained_chapter_is_played_the_next_day() {
    let library = fixtures();
    let mut session = Session::builder()
        .seed(11)
        .narrator(entry(&library, "cellar.ron"))
        .build();
    let oracle = ScriptedOracle::new();
    let mut io = ScriptedIo::new(["2"]);

    let outcome = session.run(&oracle, &mut io, &library).unwrap();

    assert_eq!(outcome, SessionOutcome::Survived { days: 2 });
    assert_eq!(days(&io), vec![1, 2]);
    assert_eq!(
        io.narrations(),
        vec![
            "You wake in a cellar.",
            "The hatch creaks open onto the street.",
            "At the corner a patrol is checking papers.",
            "You duck into an alley and wait until they pass.",
        ]
    );
    assert_eq!(session.status(), &StatusManager::new());
}

#[test]
fn freeform_choice_reaches_hidden_option() {
    let library = fixtures();
    let mut session = Session::builder()
        .seed(3)
        .narrator(entry(&library, "cellar.ron"))
        .build();
    let oracle = ScriptedOracle::new().with_selection(
        3,
        "tearing at the wall is digging",
        "You tear at the crumbling wall until it gives.",
    );
    let mut io = ScriptedIo::new(["I tear at the wall with my hands"]);

    let outcome = session.run(&oracle, &mut io, &library).unwrap();

    assert_eq!(outcome, SessionOutcome::Survived { days: 1 });
    let requests = oracle.selection_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].action, "I tear at the wall with my hands");
    assert_eq!(requests[0].context, "You wake in a cellar.");
    assert_eq!(
        requests[0].options[2].outcome.as_deref(),
        Some("You tunnel into the neighbour's basement.")
    );
    assert_eq!(
        io.narrations()[1],
        "You tear at the crumbling wall until it gives."
    );
    assert_eq!(session.status().get(StatusKind::Health).value(), 2);
    assert_eq!(session.status().get(StatusKind::Mental).value(), 2);
}

#[test]
fn death_stops_the_session_early() {
    let library = fixtures();
    let mut session = Session::builder()
        .seed(0)
        .narrator(entry(&library, "ruin.ron"))
        .build();
    let mut io = ScriptedIo::default();

    let outcome = session
        .run(&ScriptedOracle::new(), &mut io, &library)
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Died { day: 1 });
    assert_eq!(io.narrations(), vec!["A building groans above you."]);
    assert!(session.status().is_dead());
}

#[test]
fn nothing_runs_after_death() {
    let library = fixtures();
    for seed in 0..6 {
        let mut session = Session::builder()
            .seed(seed)
            .narrator(entry(&library, "ruin.ron"))
            .narrator(encounter())
            .build();
        let oracle = ScriptedOracle::new()
            .with_situation("The stranger looks up.", ["Nod", "Wave", "Leave"])
            .with_result("The stranger nods back.", 0, 1, 0)
            .with_phase_end(true);
        let mut io = ScriptedIo::new(["a"]);

        let outcome = session.run(&oracle, &mut io, &library).unwrap();

        let narrations = io.narrations();
        let ruin_day = narrations
            .iter()
            .filter(|n| **n == "A building groans above you." || **n == "The stranger looks up.")
            .position(|n| *n == "A building groans above you.")
            .unwrap() as u32
            + 1;
        assert_eq!(outcome, SessionOutcome::Died { day: ruin_day });
        assert_eq!(narrations.last(), Some(&"A building groans above you."));
        assert_eq!(days(&io).len() as u32, ruin_day);
    }
}

#[test]
fn encounter_round_updates_status_and_history() {
    let mut session = Session::builder()
        .seed(8)
        .twist_chance(0.0)
        .narrator(encounter())
        .build();
    let oracle = ScriptedOracle::new()
        .with_situation("The stranger looks up.", ["Nod", "Wave", "Leave"])
        .with_result("You walk on. The fire fades behind you.", 0, 1, 0)
        .with_phase_end(true);
    let mut io = ScriptedIo::new(["c"]);

    let outcome = session
        .run(&oracle, &mut io, &ChapterLibrary::new())
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Survived { days: 1 });
    assert_eq!(oracle.pending(), 0);
    assert_eq!(session.status().get(StatusKind::Mental).value(), 4);
    assert_eq!(
        io.options(),
        vec!["Nod", "Wave", "Leave"]
    );

    let histories = oracle.result_histories();
    assert_eq!(histories.len(), 1);
    let history = &histories[0];
    assert_eq!(history[0].role, Role::System);
    assert!(history[0].content.contains("A stranger sits by a fire."));
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "The stranger looks up.\n1 : Nod\n2 : Wave\n3 : Leave");
    assert_eq!(history[2].role, Role::User);
    assert_eq!(history[2].content, "Leave");
}

#[test]
fn exhausted_oracle_surfaces_as_error() {
    let mut session = Session::builder().seed(2).narrator(encounter()).build();
    let mut io = ScriptedIo::default();

    let err = session
        .run(&ScriptedOracle::new(), &mut io, &ChapterLibrary::new())
        .unwrap_err();

    assert!(matches!(err, NarratorError::Oracle(OracleError::Protocol(_))));
}

#[test]
fn closed_input_surfaces_as_io_error() {
    let library = fixtures();
    let mut session = Session::builder()
        .seed(5)
        .narrator(entry(&library, "cellar.ron"))
        .build();
    let mut io = ScriptedIo::default();

    let err = session
        .run(&ScriptedOracle::new(), &mut io, &library)
        .unwrap_err();

    assert!(matches!(err, NarratorError::Io(_)));
}
