//! Question sampling
//!
//! Two modes:
//! 1. Per course outcome: uniform random sample from one outcome's pool.
//! 2. Balanced: round-robin over course outcomes, one random draw per
//!    turn, then a final shuffle so the rotation is not visible.
//!
//! Both work on a private copy of the matching questions and remove each
//! pick from it, so no question is drawn twice. Under-supply is never an
//! error here; the result is simply shorter.

use crate::types::{Marks, Question};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

fn candidates<'a>(
    pool: &'a [Question],
    marks: Marks,
    include_alternatives: bool,
) -> impl Iterator<Item = &'a Question> {
    pool.iter()
        .filter(move |q| q.marks == marks)
        .filter(move |q| include_alternatives || !q.is_alternative)
}

/// Up to `count` distinct questions of `marks` from one course outcome
pub fn select_for_outcome<R: Rng + ?Sized>(
    pool: &[Question],
    outcome: &str,
    marks: Marks,
    count: usize,
    include_alternatives: bool,
    rng: &mut R,
) -> Vec<Question> {
    let mut matching: Vec<Question> = candidates(pool, marks, include_alternatives)
        .filter(|q| q.course_outcome == outcome)
        .cloned()
        .collect();

    if matching.len() < count {
        debug!(
            outcome,
            marks = %marks,
            available = matching.len(),
            requested = count,
            "Returning fewer questions than requested"
        );
    }

    matching.shuffle(rng);
    matching.truncate(count);
    matching
}

/// Up to `count` distinct questions of `marks`, spread round-robin across
/// course outcomes in the order they first appear in `pool`
pub fn select_balanced<R: Rng + ?Sized>(
    pool: &[Question],
    marks: Marks,
    count: usize,
    include_alternatives: bool,
    rng: &mut R,
) -> Vec<Question> {
    let mut groups: Vec<(&str, Vec<Question>)> = Vec::new();
    for q in candidates(pool, marks, include_alternatives) {
        match groups.iter_mut().find(|(o, _)| *o == q.course_outcome) {
            Some((_, group)) => group.push(q.clone()),
            None => groups.push((q.course_outcome.as_str(), vec![q.clone()])),
        }
    }

    if groups.is_empty() {
        return Vec::new();
    }

    let turns = groups.len();
    let mut selected = Vec::with_capacity(count);
    for i in 0..count {
        let (_, group) = &mut groups[i % turns];
        // An exhausted outcome forfeits its turn
        if group.is_empty() {
            continue;
        }
        let idx = rng.gen_range(0..group.len());
        selected.push(group.remove(idx));
    }

    if selected.len() < count {
        debug!(
            marks = %marks,
            selected = selected.len(),
            requested = count,
            "Balanced selection ran short"
        );
    }

    selected.shuffle(rng);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CognitiveLevel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn marks(v: u32) -> Marks {
        Marks::new(v).unwrap()
    }

    fn question(id: u64, outcome: &str, m: u32, alt: bool) -> Question {
        Question {
            id,
            text: format!("Question {id}"),
            course_outcome: outcome.to_string(),
            marks: marks(m),
            level: CognitiveLevel::L2,
            is_alternative: alt,
        }
    }

    fn pool() -> Vec<Question> {
        vec![
            question(1, "CO1", 2, false),
            question(2, "CO1", 2, false),
            question(3, "CO1", 2, true),
            question(4, "CO2", 2, false),
            question(5, "CO2", 2, false),
            question(6, "CO2", 13, false),
            question(7, "CO3", 2, false),
        ]
    }

    fn ids(questions: &[Question]) -> HashSet<u64> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn test_select_for_outcome_filters_and_dedups() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_for_outcome(&pool(), "CO1", marks(2), 2, false, &mut rng);
            assert_eq!(picked.len(), 2);
            assert_eq!(ids(&picked).len(), 2);
            assert!(ids(&picked).is_subset(&HashSet::from([1, 2])));
        }
    }

    #[test]
    fn test_select_for_outcome_truncates_gracefully() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select_for_outcome(&pool(), "CO1", marks(2), 10, true, &mut rng);
        assert_eq!(ids(&picked), HashSet::from([1, 2, 3]));

        let none = select_for_outcome(&pool(), "CO9", marks(2), 3, true, &mut rng);
        assert!(none.is_empty());
    }

    #[test]
    fn test_select_for_outcome_reaches_every_candidate() {
        let mut seen = HashSet::new();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_for_outcome(&pool(), "CO1", marks(2), 1, true, &mut rng);
            seen.extend(ids(&picked));
        }
        assert_eq!(seen, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_select_balanced_one_per_outcome() {
        let pool = vec![
            question(1, "CO1", 4, false),
            question(2, "CO1", 4, false),
            question(3, "CO2", 4, false),
            question(4, "CO2", 4, false),
            question(5, "CO3", 4, false),
            question(6, "CO3", 4, false),
        ];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_balanced(&pool, marks(4), 3, false, &mut rng);
            let mut per_outcome: HashMap<&str, usize> = HashMap::new();
            for q in &picked {
                *per_outcome.entry(q.course_outcome.as_str()).or_default() += 1;
            }
            assert_eq!(per_outcome.len(), 3);
            assert!(per_outcome.values().all(|&n| n == 1));
        }
    }

    #[test]
    fn test_select_balanced_skips_exhausted_outcome() {
        // CO3 has one question; its second turn is forfeited, not refilled
        let mut rng = StdRng::seed_from_u64(3);
        let picked = select_balanced(&pool(), marks(2), 6, false, &mut rng);
        let chosen = ids(&picked);
        assert_eq!(picked.len(), 5);
        assert_eq!(chosen.len(), 5);
        assert_eq!(chosen, HashSet::from([1, 2, 4, 5, 7]));
    }

    #[test]
    fn test_select_balanced_short_round_robin() {
        // count 2 over outcomes CO1, CO2, CO3 in first-seen order
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select_balanced(&pool(), marks(2), 2, true, &mut rng);
            let outcomes: HashSet<&str> = picked.iter().map(|q| q.course_outcome.as_str()).collect();
            assert_eq!(outcomes, HashSet::from(["CO1", "CO2"]));
        }
    }

    #[test]
    fn test_select_balanced_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_balanced(&pool(), marks(16), 4, true, &mut rng).is_empty());
        assert!(select_balanced(&[], marks(2), 4, true, &mut rng).is_empty());
    }

    #[test]
    fn test_select_balanced_final_order_varies() {
        let pool: Vec<Question> = (1..=8)
            .map(|id| question(id, if id % 2 == 0 { "CO2" } else { "CO1" }, 8, false))
            .collect();
        let orders: HashSet<Vec<u64>> = (0..30)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                select_balanced(&pool, marks(8), 8, false, &mut rng)
                    .iter()
                    .map(|q| q.id)
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }
}
