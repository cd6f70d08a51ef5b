//! Paper generation engine
//!
//! Composes the pipeline: validate the request, check availability,
//! select per request cell, then assemble. A shortage is surfaced before
//! any question is drawn.

use crate::assembler;
use crate::availability;
use crate::error::{PaperError, ValidationError};
use crate::repository::QuestionBank;
use crate::selector;
use crate::types::{GenerationRequest, Marks, Paper, PaperHeader, Question};
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use tracing::info;

/// Generates papers from a borrowed question bank
pub struct PaperEngine<'a> {
    bank: &'a QuestionBank,
}

impl<'a> PaperEngine<'a> {
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self { bank }
    }

    /// Reject empty requests, cells naming an unknown course outcome, and
    /// cells that would draw from the same pool twice.
    ///
    /// Each (outcome, marks) pair may appear once, and a balanced cell
    /// owns its mark-value outright. Otherwise two cells could each pass
    /// the availability check and still compete for the same questions.
    pub fn validate(&self, request: &GenerationRequest) -> Result<(), ValidationError> {
        if request.total() == 0 {
            return Err(ValidationError::EmptyRequest);
        }

        let mut seen: HashSet<(Option<&str>, Marks)> = HashSet::new();
        for cell in request.cells.iter().filter(|c| c.count > 0) {
            if let Some(outcome) = &cell.outcome {
                if !self.bank.has_outcome(outcome) {
                    return Err(ValidationError::UnknownCourseOutcome(outcome.clone()));
                }
            }
            if !seen.insert((cell.outcome.as_deref(), cell.marks)) {
                return Err(ValidationError::DuplicateCell {
                    outcome: cell.outcome.clone(),
                    marks: cell.marks,
                });
            }
        }

        for &(outcome, marks) in &seen {
            if outcome.is_none() && seen.iter().any(|&(o, m)| o.is_some() && m == marks) {
                return Err(ValidationError::MixedCell(marks));
            }
        }
        Ok(())
    }

    /// Generate a paper with the thread-local random source
    pub fn generate(&self, request: &GenerationRequest) -> Result<Paper, PaperError> {
        self.generate_with_rng(request, &mut rand::thread_rng())
    }

    /// Validate the header first, then generate and attach it
    pub fn generate_with_header(
        &self,
        request: &GenerationRequest,
        header: PaperHeader,
    ) -> Result<Paper, PaperError> {
        header.validate()?;
        Ok(self.generate(request)?.with_header(header))
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<Paper, PaperError> {
        self.validate(request)?;
        availability::check(request, self.bank)?;

        let pool = self.bank.questions();
        let mut selections: BTreeMap<Marks, Vec<Question>> = BTreeMap::new();
        for cell in request.cells.iter().filter(|c| c.count > 0) {
            let picked = match &cell.outcome {
                Some(outcome) => selector::select_for_outcome(
                    pool,
                    outcome,
                    cell.marks,
                    cell.count,
                    request.include_alternatives,
                    rng,
                ),
                None => selector::select_balanced(
                    pool,
                    cell.marks,
                    cell.count,
                    request.include_alternatives,
                    rng,
                ),
            };
            selections.entry(cell.marks).or_default().extend(picked);
        }

        let paper = assembler::assemble(selections, self.bank.outcomes(), rng);
        info!(
            paper_id = %paper.id,
            questions = paper.question_count(),
            requested = request.total(),
            total_marks = paper.total_marks(),
            "Paper generated"
        );
        Ok(paper)
    }
}
