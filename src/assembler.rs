//! Paper layout
//!
//! Takes the selected questions per mark-value and lays them out:
//! 2-mark questions form Part A, every other mark-value is concatenated
//! in ascending order into Part B. Question numbers run on from Part A
//! into Part B. Two adjacent OR-type questions get an "[OR]" row between
//! them, judged on the final shuffled order only.

use crate::types::{Marks, NumberedQuestion, Paper, PaperRow, Question, Section};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

pub const PART_A: &str = "Part A";
pub const PART_B: &str = "Part B";

/// Display code for a course outcome label.
///
/// A label starting with "CO" and digits ("co3: Trees") yields that code
/// uppercased ("CO3"). Anything else gets `CO<n>` from its 1-based
/// position in `outcomes`; a label not in the list gets `CO0`.
pub fn course_outcome_code(label: &str, outcomes: &[String]) -> String {
    let bytes = label.as_bytes();
    if bytes.len() > 2 && bytes[..2].eq_ignore_ascii_case(b"co") {
        let digits = bytes[2..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            return label[..2 + digits].to_ascii_uppercase();
        }
    }

    let position = outcomes
        .iter()
        .position(|o| o == label)
        .map_or(0, |i| i + 1);
    format!("CO{position}")
}

fn layout_section(
    label: &str,
    questions: Vec<Question>,
    first_number: usize,
    outcomes: &[String],
) -> Section {
    let mut mark_values: Vec<Marks> = questions.iter().map(|q| q.marks).collect();
    mark_values.sort();
    mark_values.dedup();

    let total_marks = questions.iter().map(|q| q.marks.value()).sum();

    let mut rows = Vec::with_capacity(questions.len());
    for (index, question) in questions.iter().enumerate() {
        rows.push(PaperRow::Question(NumberedQuestion {
            number: first_number + index,
            co_code: course_outcome_code(&question.course_outcome, outcomes),
            question: question.clone(),
        }));

        let next_is_alternative = questions
            .get(index + 1)
            .is_some_and(|next| next.is_alternative);
        if question.is_alternative && next_is_alternative {
            rows.push(PaperRow::Or);
        }
    }

    Section {
        label: label.to_string(),
        mark_values,
        rows,
        total_marks,
    }
}

/// Shuffle each mark-value's selection and lay the paper out.
/// Empty selections are left out; a paper with nothing selected has no
/// sections.
pub fn assemble<R: Rng + ?Sized>(
    selections: BTreeMap<Marks, Vec<Question>>,
    outcomes: &[String],
    rng: &mut R,
) -> Paper {
    let mut part_a = Vec::new();
    let mut part_b = Vec::new();

    // BTreeMap iteration gives ascending mark-values for Part B
    for (marks, mut questions) in selections {
        if questions.is_empty() {
            continue;
        }
        questions.shuffle(rng);
        if marks == Marks::PART_A {
            part_a = questions;
        } else {
            part_b.extend(questions);
        }
    }

    let mut sections = Vec::new();
    let mut next_number = 1;
    if !part_a.is_empty() {
        let section = layout_section(PART_A, part_a, next_number, outcomes);
        next_number += section.question_count();
        sections.push(section);
    }
    if !part_b.is_empty() {
        sections.push(layout_section(PART_B, part_b, next_number, outcomes));
    }

    let paper = Paper::new(sections);
    debug!(
        paper_id = %paper.id,
        questions = paper.question_count(),
        total_marks = paper.total_marks(),
        "Paper assembled"
    );
    paper
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CognitiveLevel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn marks(v: u32) -> Marks {
        Marks::new(v).unwrap()
    }

    fn question(id: u64, outcome: &str, m: u32, alt: bool) -> Question {
        Question {
            id,
            text: format!("Question {id}"),
            course_outcome: outcome.to_string(),
            marks: marks(m),
            level: CognitiveLevel::L3,
            is_alternative: alt,
        }
    }

    fn outcomes() -> Vec<String> {
        vec!["Basics".into(), "co2: Trees".into(), "Graphs".into()]
    }

    #[test]
    fn test_course_outcome_code() {
        let outcomes = outcomes();
        assert_eq!(course_outcome_code("co2: Trees", &outcomes), "CO2");
        assert_eq!(course_outcome_code("CO12 Hashing", &outcomes), "CO12");
        assert_eq!(course_outcome_code("Basics", &outcomes), "CO1");
        assert_eq!(course_outcome_code("Graphs", &outcomes), "CO3");
        assert_eq!(course_outcome_code("Cooking", &outcomes), "CO0");
        assert_eq!(course_outcome_code("CO", &outcomes), "CO0");
    }

    #[test]
    fn test_sections_and_numbering() {
        let mut selections = BTreeMap::new();
        selections.insert(marks(13), vec![question(10, "Graphs", 13, false)]);
        selections.insert(
            marks(2),
            vec![
                question(1, "Basics", 2, false),
                question(2, "Basics", 2, false),
                question(3, "Graphs", 2, false),
            ],
        );
        selections.insert(
            marks(4),
            vec![question(20, "Basics", 4, false), question(21, "Basics", 4, false)],
        );
        selections.insert(marks(8), vec![]);

        let mut rng = StdRng::seed_from_u64(11);
        let paper = assemble(selections, &outcomes(), &mut rng);

        assert_eq!(paper.sections.len(), 2);
        let (a, b) = (&paper.sections[0], &paper.sections[1]);
        assert_eq!(a.label, PART_A);
        assert_eq!(a.total_marks, 6);
        assert_eq!(a.mark_values, vec![marks(2)]);
        assert_eq!(b.label, PART_B);
        assert_eq!(b.total_marks, 4 + 4 + 13);
        assert_eq!(b.mark_values, vec![marks(4), marks(13)]);
        assert_eq!(b.summary(), "3 x 4/13 = 21 Marks");

        // 4-mark questions come before the 13-mark one
        let b_marks: Vec<u32> = b.questions().map(|q| q.question.marks.value()).collect();
        assert_eq!(b_marks, vec![4, 4, 13]);

        let numbers: Vec<usize> = paper.questions().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(paper.total_marks(), 27);
    }

    #[test]
    fn test_part_b_only_starts_at_one() {
        let mut selections = BTreeMap::new();
        selections.insert(marks(16), vec![question(1, "co2: Trees", 16, false)]);
        let mut rng = StdRng::seed_from_u64(0);
        let paper = assemble(selections, &outcomes(), &mut rng);

        assert_eq!(paper.sections.len(), 1);
        let q = paper.questions().next().unwrap();
        assert_eq!(q.number, 1);
        assert_eq!(q.co_code, "CO2");
    }

    #[test]
    fn test_empty_selection_has_no_sections() {
        let mut rng = StdRng::seed_from_u64(0);
        let paper = assemble(BTreeMap::new(), &outcomes(), &mut rng);
        assert!(paper.sections.is_empty());
        assert_eq!(paper.question_count(), 0);
    }

    #[test]
    fn test_or_marker_between_adjacent_alternatives() {
        let section = layout_section(
            PART_B,
            vec![
                question(1, "Basics", 13, true),
                question(2, "Graphs", 13, true),
                question(3, "Basics", 13, true),
                question(4, "Basics", 13, false),
                question(5, "Basics", 13, true),
            ],
            7,
            &outcomes(),
        );

        let shape: Vec<&str> = section
            .rows
            .iter()
            .map(|r| match r {
                PaperRow::Question(_) => "Q",
                PaperRow::Or => "OR",
            })
            .collect();
        assert_eq!(shape, vec!["Q", "OR", "Q", "OR", "Q", "Q", "Q"]);

        let numbers: Vec<usize> = section.questions().map(|q| q.number).collect();
        assert_eq!(numbers, vec![7, 8, 9, 10, 11]);
        assert_eq!(section.total_marks, 65);
    }

    #[test]
    fn test_or_markers_follow_final_order() {
        let mut selections = BTreeMap::new();
        selections.insert(
            marks(13),
            vec![
                question(1, "Basics", 13, true),
                question(2, "Basics", 13, false),
                question(3, "Graphs", 13, true),
                question(4, "Graphs", 13, false),
            ],
        );
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let paper = assemble(selections.clone(), &outcomes(), &mut rng);
            let rows = &paper.sections[0].rows;
            for (i, row) in rows.iter().enumerate() {
                if let PaperRow::Or = row {
                    let before = match &rows[i - 1] {
                        PaperRow::Question(q) => q.question.is_alternative,
                        PaperRow::Or => false,
                    };
                    let after = match &rows[i + 1] {
                        PaperRow::Question(q) => q.question.is_alternative,
                        PaperRow::Or => false,
                    };
                    assert!(before && after);
                }
            }
        }
    }
}
