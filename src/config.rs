//! Runtime configuration
//!
//! Read from the environment, with defaults that work out of the box:
//! - `EXAM_SHUFFLER_DATA_DIR`: data directory (default: platform data dir)
//! - `EXAM_SHUFFLER_DB`: full path of the store file (default: `<data dir>/papers.db`)

use crate::types::{CollegeInfo, PaperHeader, SubjectInfo};
use std::path::PathBuf;

pub const DEFAULT_EXAM_TYPE: &str = "INTERNAL EXAMINATION - I";
pub const DEFAULT_DURATION: &str = "3 Hrs";
pub const DEFAULT_MAX_MARKS: &str = "100";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var_os("EXAM_SHUFFLER_DATA_DIR").map(PathBuf::from),
            std::env::var_os("EXAM_SHUFFLER_DB").map(PathBuf::from),
        )
    }

    fn from_vars(data_dir: Option<PathBuf>, db_path: Option<PathBuf>) -> Self {
        // XDG data dir on Linux, ~/Library/Application Support on macOS
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("exam-shuffler")
        });
        let db_path = db_path.unwrap_or_else(|| data_dir.join("papers.db"));
        Self { data_dir, db_path }
    }
}

/// Build a paper header, filling blank fields with the usual defaults
pub fn header_with_defaults(
    mut college: CollegeInfo,
    mut subject: SubjectInfo,
    exam_date: String,
    max_marks: Option<String>,
) -> PaperHeader {
    if college.exam_type.trim().is_empty() {
        college.exam_type = DEFAULT_EXAM_TYPE.to_string();
    }
    if subject.duration.trim().is_empty() {
        subject.duration = DEFAULT_DURATION.to_string();
    }
    PaperHeader {
        college,
        subject,
        exam_date,
        max_marks: max_marks
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MAX_MARKS.to_string()),
    }
}
