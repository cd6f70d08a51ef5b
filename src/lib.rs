//! exam-shuffler - Question bank and exam paper generator
//!
//! Keeps a bank of exam questions tagged by course outcome, mark-value and
//! Bloom's level, then assembles randomized papers that meet a quota per
//! (course outcome, mark-value) cell while balancing across outcomes.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use exam_shuffler::{GenerationRequest, Marks, PaperEngine, QuestionBank, QuestionDraft};
//!
//! let mut bank = QuestionBank::new();
//! bank.add_outcome("CO1: Thermodynamics")?;
//! bank.add_bulk(QuestionDraft::new(
//!     "Define entropy\nState the zeroth law",
//!     "CO1: Thermodynamics",
//!     Marks::new(2)?,
//! ))?;
//!
//! let request = GenerationRequest::new(false).balanced(Marks::new(2)?, 2);
//! let paper = PaperEngine::new(&bank).generate(&request)?;
//! ```
//!
//! # Pipeline
//!
//! ```text
//! GenerationRequest
//!        │
//!        ▼
//!  availability::check ──▶ Shortage (first short cell)
//!        │ ok
//!        ▼
//!  selector (per outcome | balanced round-robin)
//!        │
//!        ▼
//!  assembler ──▶ Paper { Part A, Part B }
//! ```
//!
//! The classifier runs when questions enter the bank, not during generation.

pub mod assembler;
pub mod availability;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod repository;
pub mod selector;
pub mod store;
pub mod types;

pub use classifier::{classify, confidence, KeywordClassifier};
pub use config::Config;
pub use engine::PaperEngine;
pub use error::{PaperError, Shortage, ValidationError};
pub use repository::QuestionBank;
pub use store::{init_store, load_bank, save_bank};
pub use types::*;
