mod common;

use std::sync::Arc;
use std::thread;

use chrono::Duration;
use delvers_core::error::TurnError;
use delvers_phase::Phase;
use delvers_session::domain::commands::{
    CancelElection, ElectSelf, Intent, RegisterPlayer, RemovePlayer, SetPlayerReady, StartQuest,
};
use delvers_session::domain::events::SessionEventKind;
use delvers_session::{GameSession, SessionConfig};
use delvers_test_support::{ManualClock, RecordingPublisher};

use common::{begin_turn, cid, recorded_session, start_quest, start_time, GM};

fn elect(session: &GameSession, hero: &str) -> Result<(), TurnError> {
    session
        .elect_self(&ElectSelf {
            correlation_id: cid(),
            player_id: hero.to_owned(),
        })
        .map(|_| ())
}

#[test]
fn test_quest_waits_for_every_participant() {
    // Arrange
    let (session, _publisher) = recorded_session(SessionConfig::default());
    for id in ["a", "b"] {
        session
            .register_player(&RegisterPlayer {
                correlation_id: cid(),
                player_id: id.to_owned(),
            })
            .unwrap();
    }
    let ready = |id: &str, ready: bool| {
        session
            .set_player_ready(&SetPlayerReady {
                correlation_id: cid(),
                player_id: id.to_owned(),
                ready,
            })
            .unwrap();
    };
    let start = || {
        session.start_quest(&StartQuest {
            correlation_id: cid(),
            player_id: "a".to_owned(),
        })
    };

    // Act
    ready("a", true);
    ready("b", false);
    let early = start();
    ready("b", true);
    let started = start().unwrap();

    // Assert
    assert!(matches!(early.unwrap_err(), TurnError::NotReady));
    match &started[0].kind {
        SessionEventKind::QuestStarted(event) => assert_eq!(event.cycle, 1),
        other => panic!("expected QuestStarted, got {other:?}"),
    }
    assert_eq!(session.orchestrator().phase(), Phase::HeroElection);
}

#[test]
fn test_slot_holds_one_hero_until_cancelled() {
    let (session, _publisher) = recorded_session(SessionConfig::default());
    start_quest(&session, &["a", "b"]);

    elect(&session, "a").unwrap();
    let blocked = elect(&session, "b");
    session
        .cancel_election(&CancelElection {
            correlation_id: cid(),
            player_id: "a".to_owned(),
        })
        .unwrap();
    let after_cancel = elect(&session, "b");

    match blocked.unwrap_err() {
        TurnError::AlreadyElected(holder) => assert_eq!(holder, "a"),
        other => panic!("expected AlreadyElected, got {other:?}"),
    }
    assert!(after_cancel.is_ok());
    assert_eq!(session.orchestrator().elected_player().as_deref(), Some("b"));
}

#[test]
fn test_game_master_cannot_elect() {
    let (session, _publisher) = recorded_session(SessionConfig::default());
    start_quest(&session, &["a"]);

    let err = elect(&session, common::GM).unwrap_err();

    assert_eq!(err.code(), "not_eligible");
}

#[test]
fn test_concurrent_elections_have_one_winner() {
    // Arrange
    let heroes: Vec<String> = (0..16).map(|i| format!("hero-{i:02}")).collect();
    let (session, publisher) = recorded_session(SessionConfig::default());
    let names: Vec<&str> = heroes.iter().map(String::as_str).collect();
    start_quest(&session, &names);
    let session = Arc::new(session);
    let before = publisher.published_events().len();

    // Act
    let handles: Vec<_> = heroes
        .iter()
        .cloned()
        .map(|hero| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                let intent = Intent::ElectSelf(ElectSelf {
                    correlation_id: cid(),
                    player_id: hero.clone(),
                });
                (hero, session.dispatch(&intent))
            })
        })
        .collect();
    let results: Vec<(String, Result<_, TurnError>)> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Assert
    let winners: Vec<&String> = results
        .iter()
        .filter(|(_, result)| result.is_ok())
        .map(|(hero, _)| hero)
        .collect();
    assert_eq!(winners.len(), 1);
    let winner = winners[0].clone();
    for (_, result) in &results {
        if let Err(err) = result {
            match err {
                TurnError::AlreadyElected(holder) => assert_eq!(holder, &winner),
                other => panic!("expected AlreadyElected, got {other:?}"),
            }
        }
    }
    assert_eq!(session.orchestrator().elected_player(), Some(winner));
    assert_eq!(publisher.published_events().len(), before + 1);
}

#[test]
fn test_expired_election_auto_selects_first_eligible_hero() {
    // Arrange
    let mut config = SessionConfig::default();
    config.phase.election_timeout_secs = 30;
    let clock = Arc::new(ManualClock::new(start_time()));
    let publisher = Arc::new(RecordingPublisher::new());
    let session = common::build_session(config, clock.clone(), publisher.clone());
    start_quest(&session, &["wizard", "barbarian", "elf"]);
    begin_turn(&session, "barbarian");
    session
        .end_hero_turn(&delvers_session::domain::commands::EndHeroTurn {
            correlation_id: cid(),
            player_id: "barbarian".to_owned(),
        })
        .unwrap();

    // Act
    clock.advance(Duration::seconds(29));
    let too_early = session.auto_elect_on_timeout(cid()).unwrap();
    clock.advance(Duration::seconds(1));
    let events = session.auto_elect_on_timeout(cid()).unwrap();

    // Assert
    assert!(too_early.is_empty());
    assert_eq!(events.len(), 2);
    match &events[1].kind {
        SessionEventKind::HeroTurnStarted(started) => {
            assert_eq!(started.hero_id, "elf");
            assert!(started.auto_selected);
        }
        other => panic!("expected HeroTurnStarted, got {other:?}"),
    }
    assert_eq!(session.orchestrator().phase(), Phase::HeroActive);
    assert_eq!(session.orchestrator().active_hero().as_deref(), Some("elf"));
    assert!(session.heroes().get("elf").is_some());
}

#[test]
fn test_pending_election_is_not_overridden_by_timeout() {
    let mut config = SessionConfig::default();
    config.phase.election_timeout_secs = 10;
    let clock = Arc::new(ManualClock::new(start_time()));
    let session = common::build_session(config, clock.clone(), Arc::new(RecordingPublisher::new()));
    start_quest(&session, &["wizard", "elf"]);
    elect(&session, "wizard").unwrap();

    clock.advance(Duration::seconds(60));
    let events = session.auto_elect_on_timeout(cid()).unwrap();

    assert!(events.is_empty());
    assert_eq!(session.orchestrator().phase(), Phase::HeroElection);
    assert_eq!(
        session.orchestrator().elected_player().as_deref(),
        Some("wizard")
    );
}

#[test]
fn test_timeout_disabled_by_default() {
    let clock = Arc::new(ManualClock::new(start_time()));
    let session = common::build_session(
        SessionConfig::default(),
        clock.clone(),
        Arc::new(RecordingPublisher::new()),
    );
    start_quest(&session, &["elf"]);

    clock.advance(Duration::hours(1));

    assert!(session.auto_elect_on_timeout(cid()).unwrap().is_empty());
    assert_eq!(session.orchestrator().phase(), Phase::HeroElection);
}

fn remove(session: &GameSession, player_id: &str) -> Result<Phase, TurnError> {
    let events = session.remove_player(&RemovePlayer {
        correlation_id: cid(),
        player_id: player_id.to_owned(),
    })?;
    match &events[0].kind {
        SessionEventKind::PlayerRemoved(removed) => Ok(removed.phase),
        other => panic!("expected PlayerRemoved, got {other:?}"),
    }
}

#[test]
fn test_active_hero_leaving_reopens_the_election() {
    // Arrange
    let (session, _publisher) = recorded_session(SessionConfig::default());
    start_quest(&session, &["barbarian", "elf", "wizard"]);
    begin_turn(&session, "elf");

    // Act
    let phase = remove(&session, "elf").unwrap();

    // Assert
    assert_eq!(phase, Phase::HeroElection);
    assert_eq!(session.orchestrator().active_hero(), None);
    assert!(session.heroes().get("elf").is_none());
    elect(&session, "barbarian").unwrap();
}

#[test]
fn test_last_pending_hero_leaving_starts_gm_phase() {
    // Arrange
    let (session, _publisher) = recorded_session(SessionConfig::default());
    start_quest(&session, &["barbarian", "elf"]);
    begin_turn(&session, "barbarian");
    common::end_turn(&session, "barbarian");
    begin_turn(&session, "elf");

    // Act
    let phase = remove(&session, "elf").unwrap();

    // Assert
    assert_eq!(phase, Phase::GmPhase);
    assert_eq!(session.orchestrator().phase(), Phase::GmPhase);
}

#[test]
fn test_game_master_cannot_abandon_a_running_quest() {
    let (session, publisher) = recorded_session(SessionConfig::default());
    start_quest(&session, &["elf"]);
    let before = publisher.published_events().len();

    let err = remove(&session, GM).unwrap_err();

    match err {
        TurnError::Validation(_) => {}
        other => panic!("expected Validation, got {other:?}"),
    }
    assert_eq!(publisher.published_events().len(), before);
    assert_eq!(
        session
            .orchestrator()
            .read(|o| o.game_master_id().map(str::to_owned)),
        Some(GM.to_owned())
    );
}
