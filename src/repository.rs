//! In-memory question bank
//!
//! Owns the ordered course outcome list, the questions, and the id
//! counter. Every operation is a linear scan; banks are small.
//! Removing a course outcome removes its questions with it, so no
//! question ever points at an outcome the bank does not know.

use crate::classifier;
use crate::error::ValidationError;
use crate::types::{Marks, Question, QuestionDraft};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Questions of one course outcome, bucketed by mark-value
#[derive(Debug, Clone)]
pub struct OutcomeGroup<'a> {
    pub outcome: &'a str,
    pub by_marks: BTreeMap<Marks, Vec<&'a Question>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    outcomes: Vec<String>,
    questions: Vec<Question>,
    next_id: u64,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
            questions: Vec::new(),
            next_id: 1,
        }
    }
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a bank from persisted parts. The id counter never goes
    /// below one past the highest stored id. Questions whose course
    /// outcome is not in `outcomes` are dropped.
    pub fn from_parts(outcomes: Vec<String>, questions: Vec<Question>, next_id: u64) -> Self {
        let floor = questions.iter().map(|q| q.id + 1).max().unwrap_or(1);
        let stored = questions.len();
        let questions: Vec<Question> = questions
            .into_iter()
            .filter(|q| outcomes.contains(&q.course_outcome))
            .collect();
        if questions.len() < stored {
            warn!(
                dropped = stored - questions.len(),
                "Dropped questions with an unknown course outcome"
            );
        }
        Self {
            outcomes,
            questions,
            next_id: next_id.max(floor),
        }
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn has_outcome(&self, outcome: &str) -> bool {
        self.outcomes.iter().any(|o| o == outcome)
    }

    /// Register a new course outcome at the end of the ordered list
    pub fn add_outcome(&mut self, label: &str) -> Result<(), ValidationError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::MissingField("course outcome"));
        }
        if self.has_outcome(label) {
            return Err(ValidationError::DuplicateCourseOutcome(label.to_string()));
        }
        self.outcomes.push(label.to_string());
        info!(outcome = label, "Course outcome added");
        Ok(())
    }

    /// Delete a course outcome and every question tagged with it.
    /// Returns how many questions went with it.
    pub fn remove_outcome(&mut self, label: &str) -> Result<usize, ValidationError> {
        let pos = self
            .outcomes
            .iter()
            .position(|o| o == label)
            .ok_or_else(|| ValidationError::UnknownCourseOutcome(label.to_string()))?;
        self.outcomes.remove(pos);
        Ok(self.remove_by_course_outcome(label))
    }

    fn build_question(&mut self, text: String, draft: &QuestionDraft) -> Question {
        let level = draft.level.unwrap_or_else(|| classifier::classify(&text));
        let id = self.next_id;
        self.next_id += 1;
        Question {
            id,
            text,
            course_outcome: draft.course_outcome.clone(),
            marks: draft.marks,
            level,
            is_alternative: draft.is_alternative,
        }
    }

    fn check_draft(&self, draft: &QuestionDraft) -> Result<(), ValidationError> {
        if !self.has_outcome(&draft.course_outcome) {
            return Err(ValidationError::UnknownCourseOutcome(
                draft.course_outcome.clone(),
            ));
        }
        Ok(())
    }

    /// Add a single question; the text is stored trimmed as one question
    pub fn add(&mut self, draft: QuestionDraft) -> Result<u64, ValidationError> {
        self.check_draft(&draft)?;
        let text = draft.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::EmptyQuestionText);
        }
        let question = self.build_question(text, &draft);
        let id = question.id;
        debug!(id, level = %question.level, marks = %question.marks, "Question added");
        self.questions.push(question);
        Ok(id)
    }

    /// Add one question per non-blank line of the draft text.
    /// Each line is classified on its own unless the draft fixes a level.
    pub fn add_bulk(&mut self, draft: QuestionDraft) -> Result<Vec<u64>, ValidationError> {
        self.check_draft(&draft)?;
        let lines: Vec<String> = draft
            .text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if lines.is_empty() {
            return Err(ValidationError::EmptyQuestionText);
        }

        let mut ids = Vec::with_capacity(lines.len());
        for line in lines {
            let question = self.build_question(line, &draft);
            ids.push(question.id);
            self.questions.push(question);
        }
        info!(count = ids.len(), outcome = %draft.course_outcome, marks = %draft.marks, "Questions added");
        Ok(ids)
    }

    /// Replace a question's content in place, keeping its id
    pub fn update(&mut self, id: u64, draft: QuestionDraft) -> Result<(), ValidationError> {
        self.check_draft(&draft)?;
        let text = draft.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::EmptyQuestionText);
        }
        let question = self
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(ValidationError::UnknownQuestion(id))?;

        question.level = draft.level.unwrap_or_else(|| classifier::classify(&text));
        question.text = text;
        question.course_outcome = draft.course_outcome;
        question.marks = draft.marks;
        question.is_alternative = draft.is_alternative;
        debug!(id, "Question updated");
        Ok(())
    }

    pub fn get(&self, id: u64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn remove(&mut self, id: u64) -> Option<Question> {
        let pos = self.questions.iter().position(|q| q.id == id)?;
        Some(self.questions.remove(pos))
    }

    /// Cascade delete for a course outcome's questions
    pub fn remove_by_course_outcome(&mut self, outcome: &str) -> usize {
        let before = self.questions.len();
        self.questions.retain(|q| q.course_outcome != outcome);
        let removed = before - self.questions.len();
        info!(outcome, removed, "Questions removed with course outcome");
        removed
    }

    /// Drop every question; outcomes and the id counter stay
    pub fn clear_questions(&mut self) {
        self.questions.clear();
    }

    /// Questions matching both filters, in insertion order
    pub fn filter(&self, outcome: Option<&str>, marks: Option<Marks>) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| outcome.map_or(true, |o| q.course_outcome == o))
            .filter(|q| marks.map_or(true, |m| q.marks == m))
            .collect()
    }

    /// `None` counts across every course outcome
    pub fn count_by(&self, outcome: Option<&str>, marks: Marks) -> usize {
        self.questions
            .iter()
            .filter(|q| q.marks == marks)
            .filter(|q| outcome.map_or(true, |o| q.course_outcome == o))
            .count()
    }

    /// Per course outcome (first-seen order), per mark-value (ascending)
    pub fn group_by_outcome_then_marks(&self) -> Vec<OutcomeGroup<'_>> {
        let mut groups: Vec<OutcomeGroup<'_>> = Vec::new();
        for q in &self.questions {
            let idx = match groups.iter().position(|g| g.outcome == q.course_outcome) {
                Some(idx) => idx,
                None => {
                    groups.push(OutcomeGroup {
                        outcome: &q.course_outcome,
                        by_marks: BTreeMap::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[idx].by_marks.entry(q.marks).or_default().push(q);
        }
        groups
    }

    /// Question count per mark-value; every allowed value is present
    pub fn counts_by_marks(&self) -> BTreeMap<Marks, usize> {
        let mut counts: BTreeMap<Marks, usize> = Marks::all().map(|m| (m, 0)).collect();
        for q in &self.questions {
            *counts.entry(q.marks).or_default() += 1;
        }
        counts
    }
}
