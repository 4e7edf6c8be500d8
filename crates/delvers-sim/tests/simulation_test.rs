use std::time::Duration;

use delvers_phase::Phase;
use delvers_sim::runner::{self, SimConfig, SimError};

fn seeded(cycles: u32) -> SimConfig {
    SimConfig {
        cycles,
        seed: Some(7),
        deadline: Duration::from_secs(10),
        ..SimConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scripted_quest_plays_requested_cycles() {
    // Arrange
    let config = seeded(2);

    // Act
    let report = runner::run(config).await.unwrap();

    // Assert
    assert_eq!(report.cycles_completed, 2);
    let view = &report.final_view;
    // Heroes may already be playing the next cycle when the run stops.
    assert_eq!(view.phase.cycle, 3);
    assert_ne!(view.phase.phase, Phase::QuestSetup);
    assert_eq!(view.monsters.len(), 2);
    for hero in &view.heroes {
        assert!(hero.turn_number >= 2, "{} played {} turns", hero.hero_id, hero.turn_number);
    }
}

#[tokio::test]
async fn test_zero_cycles_returns_immediately() {
    let report = runner::run(seeded(0)).await.unwrap();

    assert_eq!(report.cycles_completed, 0);
}

#[tokio::test]
async fn test_blank_hero_id_is_rejected_during_setup() {
    let config = SimConfig {
        heroes: vec!["elf".to_owned(), String::new()],
        ..seeded(1)
    };

    let err = runner::run(config).await.unwrap_err();

    match err {
        SimError::Turn(error) => assert_eq!(error.code(), "validation_error"),
        other => panic!("expected Turn, got {other:?}"),
    }
}
