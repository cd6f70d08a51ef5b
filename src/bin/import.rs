//! Import questions exported by the browser version of the tool
//!
//! Usage: cargo run --bin import -- <export.json | dir>...
//!
//! Accepts either `{"lessons": [...], "questions": [...]}` or a bare array
//! of questions. Missing course outcomes are created; ids are reassigned.

use anyhow::{Context, Result};
use exam_shuffler::{store, CognitiveLevel, Config, Marks, QuestionBank, QuestionDraft};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct ExportedQuestion {
    #[serde(alias = "question")]
    text: String,
    #[serde(alias = "lesson", alias = "courseOutcome")]
    course_outcome: String,
    marks: u32,
    #[serde(default, alias = "learningLevel")]
    level: Option<String>,
    #[serde(default, alias = "isOrType", alias = "isAlternative")]
    is_alternative: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportFile {
    // Full export with the outcome list
    Full {
        #[serde(default, alias = "courseOutcomes")]
        lessons: Vec<String>,
        questions: Vec<ExportedQuestion>,
    },
    // Just the questions
    Questions(Vec<ExportedQuestion>),
}

#[derive(Debug, Default)]
struct ImportTally {
    outcomes: usize,
    questions: usize,
    skipped: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("exam_shuffler=warn,import=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <export.json | directory>...", args[0]);
        eprintln!("Example: {} ~/Downloads/question-bank.json", args[0]);
        std::process::exit(1);
    }

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir)?;
    println!("Opening question store at {:?}", config.db_path);

    let mut conn = store::init_store(&config.db_path)?;
    let mut bank = store::load_bank(&conn)?;
    let mut total = ImportTally::default();

    for arg in &args[1..] {
        let path = PathBuf::from(arg);
        if !path.exists() {
            eprintln!("Warning: {} does not exist, skipping", arg);
            continue;
        }

        for file in json_files(&path) {
            println!("\nProcessing: {:?}", file);
            match import_file(&mut bank, &file) {
                Ok(tally) => {
                    println!(
                        "  {} outcome(s), {} question(s), {} skipped",
                        tally.outcomes, tally.questions, tally.skipped
                    );
                    total.outcomes += tally.outcomes;
                    total.questions += tally.questions;
                    total.skipped += tally.skipped;
                }
                Err(e) => eprintln!("  Failed: {:#}", e),
            }
        }
    }

    store::save_bank(&mut conn, &bank)?;

    println!("\n========================================");
    println!("Import complete!");
    println!("  Course outcomes: {}", total.outcomes);
    println!("  Questions: {}", total.questions);
    println!("  Skipped: {}", total.skipped);
    println!("  Bank now holds {} question(s)", bank.len());
    println!("========================================");

    Ok(())
}

fn json_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    walkdir::WalkDir::new(path)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|n| n.ends_with(".json"))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}

fn import_file(bank: &mut QuestionBank, path: &Path) -> Result<ImportTally> {
    let content = fs::read_to_string(path)?;
    import_export(bank, &content).with_context(|| format!("Not a question export: {:?}", path))
}

fn import_export(bank: &mut QuestionBank, content: &str) -> Result<ImportTally> {
    let export: ExportFile = serde_json::from_str(content)?;

    let (lessons, questions) = match export {
        ExportFile::Full { lessons, questions } => (lessons, questions),
        ExportFile::Questions(questions) => (Vec::new(), questions),
    };

    let mut tally = ImportTally::default();
    for label in lessons
        .iter()
        .map(|l| l.trim())
        .chain(questions.iter().map(|q| q.course_outcome.trim()))
    {
        if !label.is_empty() && !bank.has_outcome(label) {
            bank.add_outcome(label)?;
            tally.outcomes += 1;
        }
    }

    // A multi-line question is several questions, one per line
    for q in questions {
        match to_draft(q).and_then(|draft| Ok(bank.add_bulk(draft)?)) {
            Ok(ids) => tally.questions += ids.len(),
            Err(e) => {
                tracing::warn!("Skipping question: {}", e);
                tally.skipped += 1;
            }
        }
    }

    Ok(tally)
}

fn to_draft(q: ExportedQuestion) -> Result<QuestionDraft> {
    let marks = Marks::new(q.marks)?;
    let mut draft = QuestionDraft::new(q.text.trim(), q.course_outcome.trim(), marks)
        .alternative(q.is_alternative);
    if let Some(level) = q.level.filter(|l| !l.trim().is_empty()) {
        draft = draft.with_level(level.parse::<CognitiveLevel>()?);
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_export_with_aliases() {
        let json = r#"{
            "lessons": ["CO1: Mechanics", "CO2: Optics"],
            "questions": [
                {"question": "Define inertia", "lesson": "CO1: Mechanics", "marks": 2, "learningLevel": "L1", "isOrType": false},
                {"question": "Explain refraction\nState Snell's law", "lesson": "CO2: Optics", "marks": 2},
                {"question": "Design a periscope", "lesson": "CO2: Optics", "marks": 13, "isOrType": true}
            ]
        }"#;
        let mut bank = QuestionBank::new();
        let tally = import_export(&mut bank, json).unwrap();

        assert_eq!(tally.outcomes, 2);
        assert_eq!(tally.questions, 4);
        assert_eq!(tally.skipped, 0);
        assert_eq!(bank.outcomes(), ["CO1: Mechanics", "CO2: Optics"]);

        let optics: Vec<&str> = bank
            .filter(Some("CO2: Optics"), Marks::new(2).ok())
            .into_iter()
            .map(|q| q.text.as_str())
            .collect();
        assert_eq!(optics, vec!["Explain refraction", "State Snell's law"]);

        let periscope = bank.filter(None, Marks::new(13).ok());
        assert_eq!(periscope.len(), 1);
        assert!(periscope[0].is_alternative);
        assert_eq!(periscope[0].level, CognitiveLevel::L6);
    }

    #[test]
    fn test_bare_question_array() {
        let json = r#"[
            {"text": "List the noble gases", "courseOutcome": "CO3", "marks": 2, "isAlternative": true},
            {"question": "Evaluate the model", "lesson": "CO3", "marks": 15, "learningLevel": "l5"}
        ]"#;
        let mut bank = QuestionBank::new();
        let tally = import_export(&mut bank, json).unwrap();

        assert_eq!(tally.outcomes, 1);
        assert_eq!(tally.questions, 2);
        assert_eq!(bank.outcomes(), ["CO3"]);
        assert!(bank.questions()[0].is_alternative);
        assert_eq!(bank.questions()[1].level, CognitiveLevel::L5);
    }

    #[test]
    fn test_bad_questions_are_skipped() {
        let json = r#"[
            {"question": "Define torque", "lesson": "CO1", "marks": 3},
            {"question": "Define power", "lesson": "CO1", "marks": 2, "learningLevel": "L9"},
            {"question": "   ", "lesson": "CO1", "marks": 2},
            {"question": "Define work", "lesson": "CO1", "marks": 2}
        ]"#;
        let mut bank = QuestionBank::new();
        let tally = import_export(&mut bank, json).unwrap();

        assert_eq!(tally.questions, 1);
        assert_eq!(tally.skipped, 3);
        assert_eq!(bank.questions()[0].text, "Define work");
    }

    #[test]
    fn test_non_export_is_an_error() {
        let mut bank = QuestionBank::new();
        assert!(import_export(&mut bank, r#"{"title": "notes"}"#).is_err());
        assert!(bank.is_empty());
    }
}
