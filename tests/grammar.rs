// tests/grammar.rs
use std::collections::HashSet;

use lsys_tree::{
    DigitCursor, DigitStream, Error, Grammar, LSystemString, expand, survival_threshold_for,
};

fn pruning_grammar() -> Grammar {
    Grammar::new("AAAA")
        .stochastic('A', "A[B]A")
        .with_survival_threshold(5)
}

#[test]
fn test_zero_iterations_returns_axiom() {
    let stream = DigitStream::pi(100);
    let grammar = pruning_grammar();
    for seed in [0, 1, 42, 99] {
        let out = expand(&grammar, 0, &stream, seed).unwrap();
        assert_eq!(out.as_str(), "AAAA");
    }
}

#[test]
fn test_unconditional_rule() {
    let stream = DigitStream::pi(100);
    let grammar = Grammar::new("A").rule('A', "AB");
    let out = expand(&grammar, 2, &stream, 0).unwrap();
    assert_eq!(out.as_str(), "ABB");
}

#[test]
fn test_symbols_without_rules_are_copied() {
    let stream = DigitStream::pi(100);
    let grammar = Grammar::new("X[A]+").rule('A', "FA");
    let out = expand(&grammar, 3, &stream, 0).unwrap();
    assert_eq!(out.as_str(), "X[FFFA]+");
}

#[test]
fn test_staged_rule_switches_after_first_generation() {
    let stream = DigitStream::pi(100);
    let grammar = Grammar::new("A").staged('A', "AX", "AY");
    let out = expand(&grammar, 3, &stream, 0).unwrap();
    assert_eq!(out.as_str(), "AYYX");
}

#[test]
fn test_stochastic_expansion_is_deterministic() {
    let stream = DigitStream::pi(1000);
    let grammar = pruning_grammar();
    let a = expand(&grammar, 3, &stream, 618).unwrap();
    let b = expand(&grammar, 3, &stream, 618).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_seed_changes_output() {
    let stream = DigitStream::pi(1000);
    let grammar = pruning_grammar();
    let outputs: HashSet<LSystemString> = (1..20)
        .map(|seed| expand(&grammar, 3, &stream, seed).unwrap())
        .collect();
    assert!(outputs.len() > 1, "all seeds produced the same string");
}

#[test]
fn test_stochastic_draws_one_digit_per_occurrence() {
    let stream = DigitStream::from_digits(vec![9, 0, 9, 0]).unwrap();
    let grammar = Grammar::new("AAAA")
        .stochastic('A', "F")
        .with_survival_threshold(5);
    let mut cursor = DigitCursor::new(0);

    let out = grammar.expand(1, &stream, &mut cursor).unwrap();
    assert_eq!(out.as_str(), "FF");
    assert_eq!(cursor.position(), 4);
}

#[test]
fn test_threshold_extremes() {
    let stream = DigitStream::pi(100);
    let keep_all = Grammar::new("AB").stochastic('A', "AA");
    assert_eq!(expand(&keep_all, 2, &stream, 3).unwrap().as_str(), "AAAAB");

    let prune_all = keep_all.clone().with_survival_threshold(10);
    assert_eq!(expand(&prune_all, 1, &stream, 3).unwrap().as_str(), "B");

    let clamped = Grammar::new("A").with_survival_threshold(200);
    assert_eq!(clamped.survival_threshold, 10);
}

#[test]
fn test_survival_threshold_mapping() {
    assert_eq!(survival_threshold_for(0.0), 0);
    assert_eq!(survival_threshold_for(0.3), 3);
    assert_eq!(survival_threshold_for(0.35), 4);
    assert_eq!(survival_threshold_for(0.4), 4);
    assert_eq!(survival_threshold_for(1.0), 10);
    assert_eq!(survival_threshold_for(-2.0), 0);
    assert_eq!(survival_threshold_for(f32::NAN), 0);
}

#[test]
fn test_expansion_limit() {
    let stream = DigitStream::pi(100);
    let grammar = Grammar::new("A").rule('A', "AA").with_max_symbols(100);

    assert!(expand(&grammar, 6, &stream, 0).is_ok(), "64 symbols fit");
    match expand(&grammar, 10, &stream, 0) {
        Err(Error::ExpansionLimit {
            generation, limit, ..
        }) => {
            assert_eq!(generation, 7);
            assert_eq!(limit, 100);
        }
        other => panic!("expected ExpansionLimit, got {other:?}"),
    }
}

#[test]
fn test_lsystem_string_helpers() {
    let s = LSystemString::from("FF[+F]J");
    assert_eq!(s.len(), 7);
    assert_eq!(s.count('F'), 3);
    assert!(!s.is_empty());
    assert_eq!(s.to_string(), "FF[+F]J");
    assert!(LSystemString::default().is_empty());
}
