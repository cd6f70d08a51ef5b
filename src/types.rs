//! Core types for the exam paper generator
//!
//! A question bank holds questions tagged by course outcome, mark-value
//! and cognitive level. A generation request asks for a number of
//! questions per (course outcome, mark-value) cell and produces a paper.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Point value of a question, restricted to the mark-values a paper uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Marks(u8);

impl Marks {
    /// Every mark-value a question may carry, ascending
    pub const ALLOWED: [u8; 7] = [2, 4, 8, 13, 14, 15, 16];

    /// The only mark-value that forms Part A
    pub const PART_A: Marks = Marks(2);

    pub fn new(value: u32) -> Result<Self, ValidationError> {
        Self::try_from(value)
    }

    pub fn value(self) -> u32 {
        self.0 as u32
    }

    pub fn all() -> impl Iterator<Item = Marks> {
        Self::ALLOWED.iter().map(|&m| Marks(m))
    }
}

impl TryFrom<u32> for Marks {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALLOWED
            .iter()
            .find(|&&m| m as u32 == value)
            .map(|&m| Marks(m))
            .ok_or(ValidationError::InvalidMarks(value))
    }
}

impl From<Marks> for u32 {
    fn from(marks: Marks) -> Self {
        marks.value()
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bloom's taxonomy level, L1 (Remember) through L6 (Create)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CognitiveLevel {
    L1,
    L2,
    L3,
    L4,
    L5,
    L6,
}

impl CognitiveLevel {
    /// All levels in classification order
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::L1,
        CognitiveLevel::L2,
        CognitiveLevel::L3,
        CognitiveLevel::L4,
        CognitiveLevel::L5,
        CognitiveLevel::L6,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CognitiveLevel::L1 => "L1",
            CognitiveLevel::L2 => "L2",
            CognitiveLevel::L3 => "L3",
            CognitiveLevel::L4 => "L4",
            CognitiveLevel::L5 => "L5",
            CognitiveLevel::L6 => "L6",
        }
    }

    /// Bloom's verb for the level
    pub fn label(self) -> &'static str {
        match self {
            CognitiveLevel::L1 => "Remember",
            CognitiveLevel::L2 => "Understand",
            CognitiveLevel::L3 => "Apply",
            CognitiveLevel::L4 => "Analyze",
            CognitiveLevel::L5 => "Evaluate",
            CognitiveLevel::L6 => "Create",
        }
    }

    /// Legend printed at the foot of a paper
    pub fn legend() -> String {
        Self::ALL
            .iter()
            .map(|l| format!("{} – {}", l.as_str(), l.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CognitiveLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidLevel(s.trim().to_string()))
    }
}

/// A question in the bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub text: String,
    pub course_outcome: String,
    pub marks: Marks,
    pub level: CognitiveLevel,
    /// May be printed as an OR-alternative to an adjacent question
    #[serde(default)]
    pub is_alternative: bool,
}

/// Input for adding or editing questions; the bank assigns ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub course_outcome: String,
    pub marks: Marks,
    /// Explicit level; classified from the text when absent
    #[serde(default)]
    pub level: Option<CognitiveLevel>,
    #[serde(default)]
    pub is_alternative: bool,
}

impl QuestionDraft {
    pub fn new(text: impl Into<String>, course_outcome: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            course_outcome: course_outcome.into(),
            marks,
            level: None,
            is_alternative: false,
        }
    }

    pub fn with_level(mut self, level: CognitiveLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn alternative(mut self, is_alternative: bool) -> Self {
        self.is_alternative = is_alternative;
        self
    }
}

/// Institution details printed in the paper header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollegeInfo {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub exam_type: String,
}

/// Subject details printed in the paper header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year_sem_branch: String,
    #[serde(default)]
    pub duration: String,
}

/// Everything above the first question of a paper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperHeader {
    pub college: CollegeInfo,
    pub subject: SubjectInfo,
    pub exam_date: String,
    pub max_marks: String,
}

impl PaperHeader {
    /// College name, subject code and exam date must be filled in
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.college.name.trim().is_empty() {
            return Err(ValidationError::MissingField("college name"));
        }
        if self.subject.code.trim().is_empty() {
            return Err(ValidationError::MissingField("subject code"));
        }
        if self.exam_date.trim().is_empty() {
            return Err(ValidationError::MissingField("exam date"));
        }
        Ok(())
    }
}

/// One quota line of a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCell {
    /// `None` asks for balanced selection across every course outcome
    pub outcome: Option<String>,
    pub marks: Marks,
    pub count: usize,
}

/// Quotas per (course outcome, mark-value) plus the OR-question flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub cells: Vec<RequestCell>,
    #[serde(default)]
    pub include_alternatives: bool,
}

impl GenerationRequest {
    pub fn new(include_alternatives: bool) -> Self {
        Self {
            cells: Vec::new(),
            include_alternatives,
        }
    }

    /// Ask for `count` questions of `marks` from one course outcome
    pub fn per_outcome(mut self, outcome: impl Into<String>, marks: Marks, count: usize) -> Self {
        self.cells.push(RequestCell {
            outcome: Some(outcome.into()),
            marks,
            count,
        });
        self
    }

    /// Ask for `count` questions of `marks` spread round-robin over outcomes
    pub fn balanced(mut self, marks: Marks, count: usize) -> Self {
        self.cells.push(RequestCell {
            outcome: None,
            marks,
            count,
        });
        self
    }

    pub fn total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }
}

/// A selected question with its position on the paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedQuestion {
    pub number: usize,
    pub co_code: String,
    pub question: Question,
}

/// A line in a section: either a question or an "[OR]" separator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaperRow {
    Question(NumberedQuestion),
    Or,
}

impl PaperRow {
    pub const OR_MARKER: &'static str = "[OR]";
}

/// "Part A" or "Part B" with its questions in print order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: String,
    /// Mark-values present in this section, ascending
    pub mark_values: Vec<Marks>,
    pub rows: Vec<PaperRow>,
    pub total_marks: u32,
}

impl Section {
    pub fn questions(&self) -> impl Iterator<Item = &NumberedQuestion> {
        self.rows.iter().filter_map(|row| match row {
            PaperRow::Question(q) => Some(q),
            PaperRow::Or => None,
        })
    }

    pub fn question_count(&self) -> usize {
        self.questions().count()
    }

    /// Heading tail such as "5 x 4/8 = 28 Marks"
    pub fn summary(&self) -> String {
        let values = self
            .mark_values
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{} x {} = {} Marks",
            self.question_count(),
            values,
            self.total_marks
        )
    }
}

/// A generated exam paper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub header: Option<PaperHeader>,
    pub sections: Vec<Section>,
    pub generated_at: DateTime<Utc>,
}

impl Paper {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            header: None,
            sections,
            generated_at: Utc::now(),
        }
    }

    pub fn with_header(mut self, header: PaperHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn questions(&self) -> impl Iterator<Item = &NumberedQuestion> {
        self.sections.iter().flat_map(|s| s.questions())
    }

    pub fn question_count(&self) -> usize {
        self.questions().count()
    }

    pub fn total_marks(&self) -> u32 {
        self.sections.iter().map(|s| s.total_marks).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_allowed_set() {
        for value in [2, 4, 8, 13, 14, 15, 16] {
            assert_eq!(Marks::new(value).unwrap().value(), value);
        }
        assert!(matches!(Marks::new(3), Err(ValidationError::InvalidMarks(3))));
        assert!(Marks::new(0).is_err());
    }

    #[test]
    fn test_marks_deserialize_rejects_unknown_value() {
        let ok: Marks = serde_json::from_str("13").unwrap();
        assert_eq!(ok.value(), 13);
        assert!(serde_json::from_str::<Marks>("5").is_err());
    }

    #[test]
    fn test_level_parse_and_legend() {
        assert_eq!("l3".parse::<CognitiveLevel>().unwrap(), CognitiveLevel::L3);
        assert!("L7".parse::<CognitiveLevel>().is_err());
        assert!(CognitiveLevel::legend().starts_with("L1 – Remember"));
    }

    #[test]
    fn test_header_validation() {
        let mut header = PaperHeader::default();
        assert!(matches!(
            header.validate(),
            Err(ValidationError::MissingField("college name"))
        ));
        header.college.name = "Example College".into();
        header.subject.code = "CS101".into();
        assert!(matches!(
            header.validate(),
            Err(ValidationError::MissingField("exam date"))
        ));
        header.exam_date = "12-03-2025 FN".into();
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_request_total() {
        let two = Marks::new(2).unwrap();
        let request = GenerationRequest::new(false)
            .per_outcome("CO1", two, 3)
            .balanced(Marks::new(13).unwrap(), 2);
        assert_eq!(request.total(), 5);
        assert_eq!(request.cells[1].outcome, None);
    }
}
