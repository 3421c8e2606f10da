//! End-to-end behaviour of the diagnostic engine over in-memory stores.

mod common;

use std::io::Write;
use std::sync::Arc;

use diag_algo::{BeliefPoint, BeliefState, Outcome};
use diag_engine::{
    AnswerOption, BeliefStore, DiagnosticEngine, DiagnosticError, EngineConfig,
    InMemoryConceptCatalog, ResolutionKind, ResponseEvent,
};

use common::{
    assert_normalized, concept, engine, engine_with, engine_with_store, peaked_state,
    ScriptedSource,
};

// ============================================================================
// Responses
// ============================================================================

#[test]
fn correct_answer_shifts_mass_toward_high_ability() {
    let engine = engine_with(vec![concept("limits", 0.5)]);
    let result = engine
        .record_response("u1", "limits", "correct", 0.5)
        .unwrap();

    let first = result.updated_belief.first().unwrap();
    let last = result.updated_belief.last().unwrap();
    assert_eq!(first.ability, 0.0);
    assert!((last.ability - 0.9).abs() < 1e-12);
    assert!(last.probability > first.probability);
    assert!(result.expected_mastery > 0.45);
    assert_normalized(&result.updated_belief);
}

#[test]
fn novel_name_is_slugified_and_created() {
    let engine = engine();
    let result = engine
        .record_response("u1", "Derivative Rule", "incorrect", 0.5)
        .unwrap();
    assert_eq!(result.concept_key, "derivative_rule");

    let catalog = engine.list_concepts();
    let record = catalog.get("derivative_rule").unwrap();
    assert_eq!(record.title, "Derivative Rule");
    assert_eq!(record.difficulty, 0.5);
    assert_eq!(engine.metrics().concepts_created, 1);
}

#[test]
fn near_miss_name_resolves_to_existing_key() {
    let engine = engine_with(vec![concept("chain_rule", 0.6)]);
    let resolution = engine.resolve("Chain Rules");
    assert_eq!(resolution.key, "chain_rule");
    assert_eq!(resolution.kind, ResolutionKind::Fuzzy);
    assert_eq!(engine.list_concepts().len(), 1);
    assert_eq!(engine.metrics().fuzzy_matches, 1);
}

#[test]
fn fuzzy_match_scores_key_against_input() {
    let engine = engine_with(vec![concept("d_bdad", 0.5)]);
    let resolution = engine.resolve("ad_ad");
    assert_eq!(resolution.key, "d_bdad");
    assert_eq!(resolution.kind, ResolutionKind::Fuzzy);
    assert_eq!(engine.list_concepts().len(), 1);
}

#[test]
fn equally_close_keys_resolve_to_largest() {
    let engine = engine_with(vec![
        concept("cell_a", 0.5),
        concept("cell_b", 0.5),
        concept("cello_world", 0.5),
    ]);
    assert_eq!(engine.resolve("cell_x").key, "cell_b");
    assert_eq!(engine.list_concepts().len(), 3);
}

#[test]
fn counters_follow_outcomes() {
    let engine = engine_with(vec![concept("limits", 0.5)]);
    for outcome in ["correct", "incorrect", "Correct", "unsure"] {
        engine.record_response("u1", "limits", outcome, 0.5).unwrap();
    }

    let profile = engine.get_profile("u1").unwrap();
    let progress = &profile["limits"];
    assert_eq!(progress.attempts, 3);
    assert_eq!(progress.correct, 2);
    assert_normalized(&progress.belief);

    let metrics = engine.metrics();
    assert_eq!(metrics.responses_recorded, 4);
    assert_eq!(metrics.unsure_responses, 1);
    assert_eq!(metrics.degenerate_likelihoods, 0);
}

#[test]
fn unsure_materializes_prior_without_changing_it() {
    let engine = engine_with(vec![concept("limits", 0.5)]);
    let result = engine
        .record_response("u1", "limits", "unsure", 0.5)
        .unwrap();
    assert_eq!(result.attempts, 0);
    assert_eq!(result.correct, 0);

    let uniform = BeliefState::uniform(engine.scale());
    assert_eq!(result.updated_belief, uniform.distribution);

    let profile = engine.get_profile("u1").unwrap();
    assert_eq!(profile["limits"].belief, uniform.distribution);
    assert_eq!(profile["limits"].attempts, 0);
}

#[test]
fn out_of_range_difficulty_is_clamped() {
    let engine = engine_with(vec![concept("limits", 0.5)]);
    let clamped = engine
        .record_response("u1", "limits", "correct", 3.0)
        .unwrap();
    let bound = engine
        .record_response("u2", "limits", "correct", 0.9)
        .unwrap();
    assert_eq!(clamped.updated_belief, bound.updated_belief);
}

#[test]
fn invalid_inputs_are_rejected() {
    let engine = engine();
    assert!(matches!(
        engine.record_response("u1", "limits", "sometimes", 0.5),
        Err(DiagnosticError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.record_response("  ", "limits", "correct", 0.5),
        Err(DiagnosticError::InvalidInput(_))
    ));
    assert!(engine.list_concepts().is_empty());
}

#[test]
fn record_event_matches_record_response() {
    let engine = engine_with(vec![concept("limits", 0.4)]);
    let via_event = engine
        .record_event("u1", &ResponseEvent::new("limits", Outcome::Incorrect, 0.4))
        .unwrap();
    let via_wire = engine
        .record_response("u2", "limits", "incorrect", 0.4)
        .unwrap();
    assert_eq!(via_event.updated_belief, via_wire.updated_belief);
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn unknown_user_profile_is_not_found() {
    let engine = engine();
    assert_eq!(
        engine.get_profile("ghost").unwrap_err(),
        DiagnosticError::UserNotFound("ghost".to_string())
    );
}

#[test]
fn malformed_stored_belief_is_repaired_on_read() {
    let (engine, store) = engine_with_store(vec![concept("limits", 0.5)]);
    store.put(
        "u1",
        "limits",
        BeliefState {
            distribution: vec![BeliefPoint::new(0.0, f64::NAN), BeliefPoint::new(0.5, 0.5)],
            attempts: 2,
            correct_count: 1,
        },
    );

    let profile = engine.get_profile("u1").unwrap();
    let progress = &profile["limits"];
    assert_eq!(progress.belief, BeliefState::uniform(engine.scale()).distribution);
    assert_eq!(progress.attempts, 2);
    assert_eq!(progress.correct, 1);

    let result = engine
        .record_response("u1", "limits", "correct", 0.5)
        .unwrap();
    assert_eq!(result.updated_belief.len(), 10);
    assert_eq!(result.attempts, 3);
    assert_normalized(&result.updated_belief);
}

#[test]
fn zero_mass_prior_is_kept_and_counted_as_degenerate() {
    let (engine, store) = engine_with_store(vec![concept("limits", 0.5)]);
    let zeros: Vec<BeliefPoint> = engine
        .scale()
        .levels()
        .iter()
        .map(|&a| BeliefPoint::new(a, 0.0))
        .collect();
    store.put(
        "u1",
        "limits",
        BeliefState {
            distribution: zeros.clone(),
            attempts: 1,
            correct_count: 0,
        },
    );

    let result = engine
        .record_response("u1", "limits", "correct", 0.5)
        .unwrap();
    assert_eq!(result.updated_belief, zeros);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.correct, 1);
    assert_eq!(store.get("u1", "limits").unwrap().distribution, zeros);

    let metrics = engine.metrics();
    assert_eq!(metrics.degenerate_likelihoods, 1);
    assert_eq!(metrics.responses_recorded, 1);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn moderate_difficulty_wins_at_equal_mastery() {
    let (engine, store) = engine_with_store(vec![concept("a", 0.5), concept("b", 0.9)]);
    let scale = engine.scale().clone();
    store.put("u1", "a", peaked_state(&scale, 0.2, 1));
    store.put("u1", "b", peaked_state(&scale, 0.2, 1));

    assert_eq!(engine.select_next_concepts("u1", 1).unwrap(), vec!["a"]);
    assert_eq!(engine.select_next_concepts("u1", 2).unwrap(), vec!["a", "b"]);
}

#[test]
fn mastered_only_concept_is_not_eligible() {
    let (engine, store) = engine_with_store(vec![concept("limits", 0.5)]);
    store.put("u1", "limits", peaked_state(engine.scale(), 0.9, 2));

    assert_eq!(
        engine.select_next_concepts("u1", 1).unwrap_err(),
        DiagnosticError::NoEligibleConcept {
            user_id: "u1".to_string()
        }
    );
    assert_eq!(engine.metrics().no_eligible, 1);
}

#[test]
fn over_probed_concept_is_not_eligible() {
    let (engine, store) = engine_with_store(vec![concept("limits", 0.5), concept("series", 0.7)]);
    store.put("u1", "limits", peaked_state(engine.scale(), 0.1, 6));

    assert_eq!(engine.select_next_concepts("u1", 5).unwrap(), vec!["series"]);
}

#[test]
fn empty_catalog_has_no_eligible_concept() {
    let engine = engine();
    assert!(matches!(
        engine.select_next_concepts("anyone", 1),
        Err(DiagnosticError::NoEligibleConcept { .. })
    ));
}

#[test]
fn unseen_user_is_ranked_on_uniform_prior() {
    let engine = engine_with(vec![
        concept("hard", 0.9),
        concept("easy", 0.2),
        concept("middle", 0.5),
        concept("middle_two", 0.5),
    ]);
    let ranked = engine.ranked_concepts("new-user", 4).unwrap();
    let keys: Vec<&str> = ranked.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["middle", "middle_two", "easy", "hard"]);
    assert!(ranked.iter().all(|c| c.attempts == 0));
    assert!(engine.get_profile("new-user").is_err());
}

#[test]
fn batch_size_is_bounded() {
    let engine = engine_with((0..12).map(|i| concept(&format!("c{i:02}"), 0.5)).collect());
    assert!(matches!(
        engine.select_next_concepts("u1", 0),
        Err(DiagnosticError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.select_next_concepts("u1", 11),
        Err(DiagnosticError::InvalidInput(_))
    ));
    assert_eq!(engine.select_next_concepts("u1", 10).unwrap().len(), 10);
}

#[test]
fn weakest_concept_comes_first_after_responses() {
    let engine = engine_with(vec![concept("algebra", 0.5), concept("geometry", 0.5)]);
    engine.record_response("u1", "algebra", "correct", 0.5).unwrap();
    engine.record_response("u1", "geometry", "incorrect", 0.5).unwrap();

    assert_eq!(
        engine.select_next_concepts("u1", 2).unwrap(),
        vec!["geometry", "algebra"]
    );
}

// ============================================================================
// Questions
// ============================================================================

#[test]
fn next_questions_sanitizes_source_output() {
    let engine = engine_with(vec![concept("limits", 0.5)]);
    let source = ScriptedSource::sloppy();
    let questions = engine.next_questions("u1", 1, &source).unwrap();

    assert_eq!(questions.len(), 1);
    let question = &questions[0];
    assert_eq!(question.concept, "limits");
    assert_eq!(question.correct_answer, AnswerOption::A);
    assert_eq!(question.option_b, "Missing field: option_b");
    assert_eq!(question.explanation, "Missing field: explanation");
    assert_eq!(question.difficulty, 0.9);
}

#[test]
fn next_questions_skips_failed_concepts() {
    let engine = engine_with(vec![concept("a", 0.5), concept("b", 0.5), concept("c", 0.5)]);
    let source = ScriptedSource::failing_on(&["b"]);
    let questions = engine.next_questions("u1", 3, &source).unwrap();

    let concepts: Vec<&str> = questions.iter().map(|q| q.concept.as_str()).collect();
    assert_eq!(concepts, vec!["a", "c"]);
    assert_eq!(questions[0].correct_answer, AnswerOption::B);
    assert_eq!(source.calls(), 3);
    assert_eq!(engine.metrics().question_failures, 1);
}

#[test]
fn next_questions_fails_when_every_generation_fails() {
    let engine = engine_with(vec![concept("a", 0.5)]);
    let source = ScriptedSource::failing_on(&["a"]);
    assert!(matches!(
        engine.next_questions("u1", 1, &source),
        Err(DiagnosticError::QuestionGenerationFailed(_))
    ));

    let well_formed = ScriptedSource::well_formed();
    let empty = engine_with(vec![]);
    assert!(matches!(
        empty.next_questions("u1", 1, &well_formed),
        Err(DiagnosticError::NoEligibleConcept { .. })
    ));
    assert_eq!(well_formed.calls(), 0);
}

// ============================================================================
// Concurrency & Seeding
// ============================================================================

#[test]
fn concurrent_responses_lose_no_update() {
    let engine = Arc::new(engine_with(vec![concept("limits", 0.5)]));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let outcome = if i % 2 == 0 { "correct" } else { "incorrect" };
                for _ in 0..25 {
                    engine.record_response("u1", "limits", outcome, 0.5).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let profile = engine.get_profile("u1").unwrap();
    assert_eq!(profile["limits"].attempts, 200);
    assert_eq!(profile["limits"].correct, 100);
    assert_normalized(&profile["limits"].belief);
}

#[test]
fn concurrent_novel_names_create_one_record() {
    let engine = Arc::new(engine());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                engine
                    .record_response(&format!("u{i}"), "Photo Synthesis", "correct", 0.5)
                    .unwrap()
                    .concept_key
            })
        })
        .collect();
    let keys: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(keys.iter().all(|k| k == "photo_synthesis"));
    assert_eq!(engine.list_concepts().len(), 1);
    assert_eq!(engine.metrics().concepts_created, 1);
}

#[test]
fn seeded_catalog_drives_selection() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "fractions": {{"title": "Fractions", "description": "Adding fractions", "difficulty": 0.5}},
            "calculus": {{"title": "Calculus", "description": "Limits", "difficulty": 1.5}}
        }}"#
    )
    .unwrap();

    let catalog = InMemoryConceptCatalog::from_json_file(file.path()).unwrap();
    let engine = DiagnosticEngine::in_memory(EngineConfig::default(), catalog).unwrap();

    assert_eq!(engine.list_concepts()["calculus"].difficulty, 0.9);
    assert_eq!(
        engine.select_next_concepts("u1", 2).unwrap(),
        vec!["fractions", "calculus"]
    );
}

#[test]
fn custom_scale_size_is_honoured() {
    let config = EngineConfig {
        ability_levels: 20,
        ..Default::default()
    };
    let catalog = InMemoryConceptCatalog::with_records(vec![concept("k", 0.5)]);
    let engine = DiagnosticEngine::in_memory(config, catalog).unwrap();
    let result = engine.record_response("u1", "k", "correct", 0.5).unwrap();
    assert_eq!(result.updated_belief.len(), 20);
    assert_normalized(&result.updated_belief);

    let invalid = EngineConfig {
        ability_levels: 1,
        ..Default::default()
    };
    assert!(DiagnosticEngine::in_memory(invalid, InMemoryConceptCatalog::new()).is_err());
}

// ============================================================================
// Simulated learners
// ============================================================================

fn simulate(engine: &DiagnosticEngine, user_id: &str, true_ability: f64, rounds: usize) -> f64 {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut last = 0.0;
    for _ in 0..rounds {
        let difficulty: f64 = rng.gen_range(0.1..=0.9);
        let p_correct = diag_algo::sigmoid(true_ability - difficulty);
        let outcome = if rng.gen::<f64>() < p_correct {
            "correct"
        } else {
            "incorrect"
        };
        last = engine
            .record_response(user_id, "limits", outcome, difficulty)
            .unwrap()
            .expected_mastery;
    }
    last
}

#[test]
fn stronger_learner_ends_with_higher_mastery() {
    let engine = engine_with(vec![concept("limits", 0.5)]);
    let strong = simulate(&engine, "strong", 0.8, 300);
    let weak = simulate(&engine, "weak", 0.1, 300);

    assert!(strong > weak, "strong {strong} vs weak {weak}");
    let profile = engine.get_profile("weak").unwrap();
    assert_eq!(profile["limits"].attempts, 300);
    assert_normalized(&profile["limits"].belief);
}
