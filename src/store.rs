//! Persistence for the question bank
//!
//! A flat key-value table in a single SQLite file. Each key holds one
//! JSON document: the outcome list, the questions, the id counter, and
//! the college and subject details.

use crate::repository::QuestionBank;
use crate::types::{CollegeInfo, Question, SubjectInfo};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

const KEY_OUTCOMES: &str = "course_outcomes";
const KEY_QUESTIONS: &str = "questions";
const KEY_NEXT_ID: &str = "next_id";
const KEY_COLLEGE: &str = "college_info";
const KEY_SUBJECT: &str = "subject_info";

/// Open (or create) the store with its schema
pub fn init_store(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open question store at {:?}", path))?;

    conn.execute_batch(SCHEMA)?;

    Ok(conn)
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);
"#;

fn get_json<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;

    raw.map(|s| serde_json::from_str(&s).with_context(|| format!("Corrupt value for key {key}")))
        .transpose()
}

fn put_json<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, json],
    )?;
    Ok(())
}

/// Load the bank; missing keys give an empty bank
pub fn load_bank(conn: &Connection) -> Result<QuestionBank> {
    let outcomes: Vec<String> = get_json(conn, KEY_OUTCOMES)?.unwrap_or_default();
    let questions: Vec<Question> = get_json(conn, KEY_QUESTIONS)?.unwrap_or_default();
    let next_id: u64 = get_json(conn, KEY_NEXT_ID)?.unwrap_or(1);

    debug!(
        outcomes = outcomes.len(),
        questions = questions.len(),
        "Question bank loaded"
    );
    Ok(QuestionBank::from_parts(outcomes, questions, next_id))
}

/// Write the whole bank in one transaction
pub fn save_bank(conn: &mut Connection, bank: &QuestionBank) -> Result<()> {
    let tx = conn.transaction()?;
    put_json(&tx, KEY_OUTCOMES, bank.outcomes())?;
    put_json(&tx, KEY_QUESTIONS, bank.questions())?;
    put_json(&tx, KEY_NEXT_ID, &bank.next_id())?;
    tx.commit()?;
    debug!(questions = bank.len(), "Question bank saved");
    Ok(())
}

pub fn load_college_info(conn: &Connection) -> Result<CollegeInfo> {
    Ok(get_json(conn, KEY_COLLEGE)?.unwrap_or_default())
}

pub fn save_college_info(conn: &Connection, info: &CollegeInfo) -> Result<()> {
    put_json(conn, KEY_COLLEGE, info)
}

pub fn load_subject_info(conn: &Connection) -> Result<SubjectInfo> {
    Ok(get_json(conn, KEY_SUBJECT)?.unwrap_or_default())
}

pub fn save_subject_info(conn: &Connection, info: &SubjectInfo) -> Result<()> {
    put_json(conn, KEY_SUBJECT, info)
}
