//! End-to-end use of the facade crate: configuration, logging, building a
//! network and scoring a changing working solution.

use deltaforge::prelude::*;
use deltaforge::{ConstraintWeightOverrides, EnvironmentMode, IndictmentMap};
use deltaforge_test::{Entity, Visit};

const CONFIG: &str = r#"
environment_mode = "full_assert"
constraint_match_enabled = true

[constraint_weights]
"Shared value" = "0hard/3soft"
"Idle entity" = "0hard/0soft"
"#;

fn network(config: &SessionConfig) -> std::sync::Arc<ConstraintNetwork<HardSoftScore>> {
    let overrides = ConstraintWeightOverrides::from_config(config).unwrap();
    let factory = ConstraintFactory::<HardSoftScore>::new().with_weight_overrides(overrides);
    factory
        .for_each_unique_pair(joiner::equal(|e: &Entity| e.value()))
        .penalize(HardSoftScore::ONE_SOFT)
        .as_constraint("Shared value");
    factory
        .for_each::<Entity>()
        .if_not_exists(
            factory.for_each::<Visit>(),
            joiner::equal_bi(|e: &Entity| Some(e.id), |v: &Visit| v.vehicle()),
        )
        .penalize(HardSoftScore::ONE_SOFT)
        .as_constraint("Idle entity");
    factory
        .for_each::<Visit>()
        .filter(|v: &Visit| v.vehicle().is_none())
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Unassigned visit");
    factory.build().unwrap()
}

#[test]
fn test_configured_session_scores_and_explains() {
    deltaforge::logging::init();
    let config = SessionConfig::from_toml_str(CONFIG).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);

    let network = network(&config);
    // The zero-weight override removes "Idle entity" entirely.
    assert_eq!(network.constraint_count(), 2);

    let mut session = network.create_session(&config);
    let entities = Entity::pool(3);
    for entity in &entities {
        session.insert(entity).unwrap();
    }
    let visit = Visit::new(0, 1, None);
    session.insert(&visit).unwrap();
    assert_eq!(session.calculate_score(0).unwrap().score(), &HardSoftScore::of(-1, -9));

    visit.set_vehicle(Some(2));
    session.update(&visit).unwrap();
    entities[2].set_value(1);
    session.update(&entities[2]).unwrap();
    assert_eq!(session.calculate_score(0).unwrap().score(), &HardSoftScore::of(0, -3));

    let explanation = session.explain().unwrap();
    assert_eq!(explanation.non_zero_constraints().len(), 1);
    let indictments: IndictmentMap<HardSoftScore> = session.indictment_map();
    let worst = indictments.worst();
    assert_eq!(worst.len(), 2);
    assert!(worst.iter().all(|indictment| indictment.score == HardSoftScore::of(0, -3)));
}

#[test]
fn test_unassigned_count_is_reported_with_score() {
    let network = network(&SessionConfig::default());
    let mut session = network.create_session(&SessionConfig::default());
    session.insert(&Visit::new(0, 1, None)).unwrap();
    let score = session.calculate_score(2).unwrap();
    assert_eq!(score.score(), &HardSoftScore::of_hard(-1));
    assert_eq!(score.unassigned_count(), 2);
    assert!(!score.is_fully_assigned());
}
