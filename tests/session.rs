use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use anyhow::{Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;

use jeopardy_terminal::category_fetch::{
    CategorySource, RemoteCategory, RemoteClue, fetch_category, fetch_category_ids,
};
use jeopardy_terminal::fallback_pool::{fallback_titles, is_fallback_title};
use jeopardy_terminal::session::{FallbackReason, build_session};
use jeopardy_terminal::state::{NUM_CATEGORIES, NUM_CLUES, Showing};

/// Listing and detail responses scripted per test. Detail calls are counted
/// from 1.
struct ScriptedSource {
    listing: Option<Vec<u64>>,
    fail_on_call: Option<usize>,
    clues_per_category: usize,
    calls: RefCell<Vec<u64>>,
    listing_calls: Cell<usize>,
}

impl ScriptedSource {
    fn new(listing: Option<Vec<u64>>) -> Self {
        Self {
            listing,
            fail_on_call: None,
            clues_per_category: 8,
            calls: RefCell::new(Vec::new()),
            listing_calls: Cell::new(0),
        }
    }

    fn calls(&self) -> Vec<u64> {
        self.calls.borrow().clone()
    }
}

fn remote_title(id: u64) -> String {
    format!("remote {id}")
}

impl CategorySource for ScriptedSource {
    fn list_category_ids(&self, _count: usize) -> Result<Vec<u64>> {
        self.listing_calls.set(self.listing_calls.get() + 1);
        self.listing
            .clone()
            .ok_or_else(|| anyhow!("connection refused"))
    }

    fn category_detail(&self, id: u64) -> Result<RemoteCategory> {
        self.calls.borrow_mut().push(id);
        if Some(self.calls.borrow().len()) == self.fail_on_call {
            return Err(anyhow!("http 500"));
        }
        Ok(RemoteCategory {
            title: remote_title(id),
            clues: (0..self.clues_per_category)
                .map(|i| RemoteClue {
                    question: format!("{id}-q{i}"),
                    answer: format!("{id}-a{i}"),
                })
                .collect(),
        })
    }
}

fn titles(outcome: &jeopardy_terminal::session::SessionOutcome) -> Vec<String> {
    outcome
        .board
        .categories()
        .iter()
        .map(|c| c.title().to_string())
        .collect()
}

#[test]
fn remote_success_builds_full_board_without_notice() {
    let source = ScriptedSource::new(Some((1..=10).collect()));
    let mut rng = StdRng::seed_from_u64(42);
    let outcome = build_session(&source, 10, &mut rng);

    assert_eq!(outcome.fallback, None);
    assert_eq!(outcome.board.categories().len(), NUM_CATEGORIES);
    let expected: Vec<String> = source.calls().into_iter().map(remote_title).collect();
    assert_eq!(titles(&outcome), expected);
    for category in outcome.board.categories() {
        assert_eq!(category.clues().len(), NUM_CLUES);
        assert!(category.clues().iter().all(|c| c.showing() == Showing::Hidden));
        let questions: HashSet<_> = category.clues().iter().map(|c| c.question()).collect();
        assert_eq!(questions.len(), NUM_CLUES);
    }
}

#[test]
fn listing_failure_falls_back_to_whole_pool() {
    let source = ScriptedSource::new(None);
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = build_session(&source, 10, &mut rng);

    assert_eq!(outcome.fallback, Some(FallbackReason::ApiUnavailable));
    assert!(outcome.fallback.is_some_and(|r| r.notice().contains("API unavailable")));
    assert!(source.calls().is_empty());

    let picked = titles(&outcome);
    assert_eq!(picked.len(), NUM_CATEGORIES);
    assert!(picked.iter().all(|t| is_fallback_title(t)));
    let unique: HashSet<_> = picked.iter().collect();
    assert_eq!(unique.len(), NUM_CATEGORIES);
}

#[test]
fn empty_listing_is_treated_as_unavailable() {
    let source = ScriptedSource::new(Some(Vec::new()));
    let mut rng = StdRng::seed_from_u64(5);
    let outcome = build_session(&source, 10, &mut rng);
    assert_eq!(outcome.fallback, Some(FallbackReason::ApiUnavailable));
    assert_eq!(source.listing_calls.get(), 1);
}

#[test]
fn short_listing_falls_back_as_setup_failure() {
    let source = ScriptedSource::new(Some(vec![7, 8, 9]));
    let mut rng = StdRng::seed_from_u64(9);
    let outcome = build_session(&source, 10, &mut rng);

    assert_eq!(outcome.fallback, Some(FallbackReason::SetupFailed));
    assert!(source.calls().is_empty());
    assert!(titles(&outcome).iter().all(|t| is_fallback_title(t)));
}

#[test]
fn third_detail_failure_substitutes_one_fallback_category() {
    let mut source = ScriptedSource::new(Some((1..=6).collect()));
    source.fail_on_call = Some(3);
    let mut rng = StdRng::seed_from_u64(3);
    let outcome = build_session(&source, 6, &mut rng);

    assert_eq!(outcome.fallback, None);
    let calls = source.calls();
    assert_eq!(calls.len(), NUM_CATEGORIES);
    let picked = titles(&outcome);
    assert_eq!(picked.len(), NUM_CATEGORIES);
    for (idx, title) in picked.iter().enumerate() {
        if idx == 2 {
            assert!(fallback_titles().iter().any(|t| *t == title.as_str()));
        } else {
            assert_eq!(title, &remote_title(calls[idx]));
        }
    }
    assert_eq!(picked.iter().filter(|t| is_fallback_title(t)).count(), 1);
}

#[test]
fn categories_with_too_few_clues_are_replaced() {
    let mut source = ScriptedSource::new(Some((1..=10).collect()));
    source.clues_per_category = NUM_CLUES;
    let mut rng = StdRng::seed_from_u64(8);
    let outcome = build_session(&source, 10, &mut rng);

    assert_eq!(outcome.fallback, None);
    assert_eq!(source.calls().len(), NUM_CATEGORIES);
    assert!(titles(&outcome).iter().all(|t| is_fallback_title(t)));
    for category in outcome.board.categories() {
        assert_eq!(category.clues().len(), NUM_CLUES);
    }
}

#[test]
fn listing_sample_has_no_repeats() {
    let source = ScriptedSource::new(Some((100..110).collect()));
    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let ids = fetch_category_ids(&source, 10, &mut rng);
        assert_eq!(ids.len(), NUM_CATEGORIES);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), NUM_CATEGORIES);
        assert!(ids.iter().all(|id| (100..110).contains(id)));
    }
}

#[test]
fn listing_failure_yields_empty_ids() {
    let source = ScriptedSource::new(None);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(fetch_category_ids(&source, 10, &mut rng).is_empty());
}

#[test]
fn clue_sample_has_no_repeats() {
    let mut source = ScriptedSource::new(Some(vec![1]));
    source.clues_per_category = 6;
    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let category = fetch_category(&source, 1, &mut rng);
        assert_eq!(category.title(), "remote 1");
        let questions: HashSet<_> = category.clues().iter().map(|c| c.question()).collect();
        assert_eq!(questions.len(), NUM_CLUES);
        for clue in category.clues() {
            let suffix = clue.question().trim_start_matches("1-q");
            assert_eq!(clue.answer(), format!("1-a{suffix}"));
        }
    }
}

#[test]
fn every_path_yields_six_by_five() {
    let mut failing = ScriptedSource::new(Some((1..=10).collect()));
    failing.fail_on_call = Some(1);
    let sources = [
        ScriptedSource::new(Some((1..=10).collect())),
        ScriptedSource::new(None),
        ScriptedSource::new(Some(vec![1, 2])),
        failing,
    ];
    for (seed, source) in sources.iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(seed as u64);
        let outcome = build_session(source, 10, &mut rng);
        assert_eq!(outcome.board.categories().len(), NUM_CATEGORIES);
        assert!(
            outcome
                .board
                .categories()
                .iter()
                .all(|c| c.clues().len() == NUM_CLUES)
        );
    }
}
