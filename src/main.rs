//! exam-shuffler CLI
//!
//! Manage the question bank and generate papers from the terminal.
//!
//! Run with: cargo run -- help

use anyhow::{bail, Context, Result};
use exam_shuffler::{
    classifier, config, store, types::*, Config, PaperEngine, PaperError, ValidationError,
};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("exam_shuffler=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[2..];

    // Commands that never touch the store
    match command.as_str() {
        "classify" => return run_classify(&positional(rest).join(" ")),
        "help" | "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        _ => {}
    }

    let config = Config::from_env();
    let store_dir = config
        .db_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| config.data_dir.clone());
    std::fs::create_dir_all(&store_dir)
        .with_context(|| format!("Failed to create data directory {:?}", store_dir))?;
    let mut conn = store::init_store(&config.db_path)?;
    tracing::debug!("Store opened at {:?}", config.db_path);

    match command.as_str() {
        "outcome" => run_outcome(&mut conn, rest),
        "add" => run_add(&mut conn, rest),
        "edit" => run_edit(&mut conn, rest),
        "remove" => run_remove(&mut conn, rest),
        "list" => run_list(&conn, rest),
        "stats" => run_stats(&conn),
        "clear" => run_clear(&mut conn),
        "college" => run_college(&conn, rest),
        "subject" => run_subject(&conn, rest),
        "check" => run_check(&conn, rest),
        "generate" => run_generate(&conn, rest),
        other => {
            eprintln!("Unknown command: {other}\n");
            print_usage();
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    println!("exam-shuffler - question bank and exam paper generator");
    println!();
    println!("USAGE:");
    println!("  outcome add <label>            Add a course outcome");
    println!("  outcome list                   List course outcomes with their codes");
    println!("  outcome remove <label>         Remove a course outcome and its questions");
    println!("  add --co=<label> --marks=<n> [--level=L1..L6] [--or] [--file=<path>] [text]");
    println!("                                 Add questions, one per line");
    println!("  edit <id> --co=<label> --marks=<n> [--level=..] [--or] <text>");
    println!("  remove <id>                    Delete a question");
    println!("  list [--co=<label>] [--marks=<n>]");
    println!("  stats                          Question counts per mark-value");
    println!("  clear                          Delete every question");
    println!("  classify <text>                Show the inferred cognitive level");
    println!("  college --name=.. [--location=..] [--department=..] [--exam-type=..]");
    println!("  subject --code=.. [--name=..] [--year=..] [--duration=..]");
    println!("  check <cell>... [--or]         Check the bank can satisfy a request");
    println!("  generate <cell>... [--or] [--date=..] [--max-marks=..] [--no-header] [--json]");
    println!();
    println!("CELLS:");
    println!("  <marks>=<count>                Balanced across all course outcomes");
    println!("  <outcome>:<marks>=<count>      From one course outcome");
    println!();
    println!("ENVIRONMENT:");
    println!("  EXAM_SHUFFLER_DATA_DIR, EXAM_SHUFFLER_DB, RUST_LOG");
}

// ============================================================================
// Argument helpers
// ============================================================================

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("--{name}=");
    args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
}

fn has_flag(args: &[String], name: &str) -> bool {
    let bare = format!("--{name}");
    args.iter().any(|a| *a == bare)
}

fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .filter(|a| !a.starts_with("--"))
        .map(|a| a.as_str())
        .collect()
}

fn parse_marks(raw: &str) -> Result<Marks> {
    let value: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("Marks must be a number, got {raw:?}"))?;
    Ok(Marks::new(value)?)
}

/// Parse `<marks>=<count>` or `<outcome>:<marks>=<count>`
fn parse_cell(raw: &str) -> Result<RequestCell> {
    let (lhs, count) = raw
        .rsplit_once('=')
        .with_context(|| format!("Expected <marks>=<count>, got {raw:?}"))?;
    let count: usize = count
        .trim()
        .parse()
        .with_context(|| format!("Count must be a number in {raw:?}"))?;

    let (outcome, marks) = match lhs.rsplit_once(':') {
        Some((outcome, marks)) => (Some(outcome.trim().to_string()), parse_marks(marks)?),
        None => (None, parse_marks(lhs)?),
    };
    Ok(RequestCell { outcome, marks, count })
}

fn parse_request(args: &[String]) -> Result<GenerationRequest> {
    let mut request = GenerationRequest::new(has_flag(args, "or"));
    for raw in positional(args) {
        request.cells.push(parse_cell(raw)?);
    }
    Ok(request)
}

fn parse_draft(args: &[String], text: String) -> Result<QuestionDraft> {
    let outcome = flag(args, "co").context("--co=<course outcome> is required")?;
    let marks = parse_marks(flag(args, "marks").context("--marks=<n> is required")?)?;
    let mut draft = QuestionDraft::new(text, outcome, marks).alternative(has_flag(args, "or"));
    if let Some(level) = flag(args, "level") {
        draft = draft.with_level(level.parse()?);
    }
    Ok(draft)
}

// ============================================================================
// Bank commands
// ============================================================================

fn run_outcome(conn: &mut Connection, args: &[String]) -> Result<()> {
    let mut bank = store::load_bank(conn)?;
    let words = positional(args);
    let label = words.get(1..).map(|w| w.join(" ")).unwrap_or_default();

    match words.first().copied() {
        Some("add") => {
            bank.add_outcome(&label)?;
            store::save_bank(conn, &bank)?;
            println!("Course outcome \"{}\" added", label.trim());
        }
        Some("remove") => {
            let removed = bank.remove_outcome(&label)?;
            store::save_bank(conn, &bank)?;
            println!("Course outcome \"{label}\" removed along with {removed} question(s)");
        }
        Some("list") | None => {
            if bank.outcomes().is_empty() {
                println!("No course outcomes yet. Add one with: outcome add <label>");
            }
            for label in bank.outcomes() {
                let code = exam_shuffler::assembler::course_outcome_code(label, bank.outcomes());
                let count = bank.filter(Some(label), None).len();
                println!("{code:<6} {label}  ({count} questions)");
            }
        }
        Some(other) => bail!("Unknown outcome command: {other}"),
    }
    Ok(())
}

fn run_add(conn: &mut Connection, args: &[String]) -> Result<()> {
    let text = match flag(args, "file") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read questions from {path}"))?,
        None => positional(args).join(" "),
    };
    let draft = parse_draft(args, text)?;

    let mut bank = store::load_bank(conn)?;
    let ids = bank.add_bulk(draft)?;
    store::save_bank(conn, &bank)?;

    println!("{} question(s) added", ids.len());
    for id in ids {
        if let Some(q) = bank.get(id) {
            println!("  #{:<4} {}  {}", q.id, q.level, q.text);
        }
    }
    Ok(())
}

fn run_edit(conn: &mut Connection, args: &[String]) -> Result<()> {
    let words = positional(args);
    let id: u64 = words
        .first()
        .context("Usage: edit <id> --co=.. --marks=.. <text>")?
        .parse()
        .context("Question id must be a number")?;
    let draft = parse_draft(args, words[1..].join(" "))?;

    let mut bank = store::load_bank(conn)?;
    bank.update(id, draft)?;
    store::save_bank(conn, &bank)?;
    println!("Question #{id} updated");
    Ok(())
}

fn run_remove(conn: &mut Connection, args: &[String]) -> Result<()> {
    let id: u64 = positional(args)
        .first()
        .context("Usage: remove <id>")?
        .parse()
        .context("Question id must be a number")?;

    let mut bank = store::load_bank(conn)?;
    if bank.remove(id).is_none() {
        bail!("No question with id {id}");
    }
    store::save_bank(conn, &bank)?;
    println!("Question #{id} deleted");
    Ok(())
}

fn run_list(conn: &Connection, args: &[String]) -> Result<()> {
    let bank = store::load_bank(conn)?;
    let outcome = flag(args, "co");
    let marks = flag(args, "marks").map(parse_marks).transpose()?;

    if bank.is_empty() {
        println!("No questions added yet.");
        return Ok(());
    }

    for group in bank.group_by_outcome_then_marks() {
        if outcome.is_some_and(|o| o != group.outcome) {
            continue;
        }
        println!("\n{}", group.outcome);
        for (m, questions) in &group.by_marks {
            if marks.is_some_and(|wanted| wanted != *m) {
                continue;
            }
            println!("  {} Mark Questions ({})", m, questions.len());
            for q in questions {
                let or_badge = if q.is_alternative { " [OR type]" } else { "" };
                println!("    #{:<4} {}{}  {}", q.id, q.level, or_badge, q.text);
            }
        }
    }
    Ok(())
}

fn run_stats(conn: &Connection) -> Result<()> {
    let bank = store::load_bank(conn)?;
    println!("Question bank");
    println!("=============");
    for (marks, count) in bank.counts_by_marks() {
        println!("  {:>2}-mark: {}", marks, count);
    }
    println!("  Total:   {}", bank.len());
    println!("  Course outcomes: {}", bank.outcomes().len());
    Ok(())
}

fn run_clear(conn: &mut Connection) -> Result<()> {
    let mut bank = store::load_bank(conn)?;
    let count = bank.len();
    bank.clear_questions();
    store::save_bank(conn, &bank)?;
    println!("{count} question(s) cleared");
    Ok(())
}

fn run_classify(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Usage: classify <question text>");
    }
    let level = classifier::classify(text);
    let confidence = classifier::confidence(text, level);
    println!("{} ({}) - confidence {}%", level, level.label(), confidence);
    Ok(())
}

// ============================================================================
// Header commands
// ============================================================================

fn run_college(conn: &Connection, args: &[String]) -> Result<()> {
    let mut info = store::load_college_info(conn)?;
    if let Some(v) = flag(args, "name") {
        info.name = v.trim().to_string();
    }
    if let Some(v) = flag(args, "location") {
        info.location = v.trim().to_string();
    }
    if let Some(v) = flag(args, "department") {
        info.department = v.trim().to_string();
    }
    if let Some(v) = flag(args, "exam-type") {
        info.exam_type = v.trim().to_string();
    }
    store::save_college_info(conn, &info)?;
    println!("College information saved");
    Ok(())
}

fn run_subject(conn: &Connection, args: &[String]) -> Result<()> {
    let mut info = store::load_subject_info(conn)?;
    if let Some(v) = flag(args, "code") {
        info.code = v.trim().to_string();
    }
    if let Some(v) = flag(args, "name") {
        info.name = v.trim().to_string();
    }
    if let Some(v) = flag(args, "year") {
        info.year_sem_branch = v.trim().to_string();
    }
    if let Some(v) = flag(args, "duration") {
        info.duration = v.trim().to_string();
    }
    store::save_subject_info(conn, &info)?;
    println!("Subject information saved");
    Ok(())
}

// ============================================================================
// Generation
// ============================================================================

fn run_check(conn: &Connection, args: &[String]) -> Result<()> {
    let bank = store::load_bank(conn)?;
    let request = parse_request(args)?;
    PaperEngine::new(&bank).validate(&request)?;
    match exam_shuffler::availability::check(&request, &bank) {
        Ok(()) => println!("OK: {} question(s) can be drawn", request.total()),
        Err(shortage) => bail!("{shortage}"),
    }
    Ok(())
}

fn run_generate(conn: &Connection, args: &[String]) -> Result<()> {
    let bank = store::load_bank(conn)?;
    let request = parse_request(args)?;
    let engine = PaperEngine::new(&bank);

    let result = if has_flag(args, "no-header") {
        engine.generate(&request)
    } else {
        let header = config::header_with_defaults(
            store::load_college_info(conn)?,
            store::load_subject_info(conn)?,
            flag(args, "date").unwrap_or_default().trim().to_string(),
            flag(args, "max-marks").map(str::to_string),
        );
        engine.generate_with_header(&request, header)
    };

    let paper = match result {
        Ok(paper) => paper,
        Err(PaperError::Validation(ValidationError::MissingField(field))) => {
            bail!("Missing {field}: set it with `college`/`subject`, pass --date=.., or use --no-header")
        }
        Err(e) => return Err(e.into()),
    };

    if has_flag(args, "json") {
        println!("{}", serde_json::to_string_pretty(&paper)?);
    } else {
        print_paper(&paper);
    }
    Ok(())
}

fn print_paper(paper: &Paper) {
    if let Some(header) = &paper.header {
        println!("REG. NUMBER: {}", "[ ]".repeat(12));
        println!();
        println!("{}", header.college.name);
        if !header.college.location.is_empty() {
            println!("{}", header.college.location);
        }
        if !header.college.department.is_empty() {
            println!("DEPARTMENT OF {}", header.college.department);
        }
        println!("{}", header.college.exam_type);
        println!();
        println!(
            "Subject Code     : {:<24} Date & Session : {}",
            header.subject.code, header.exam_date
        );
        println!(
            "Subject Name     : {:<24} Duration       : {}",
            header.subject.name, header.subject.duration
        );
        println!(
            "Year/Sem./Branch : {:<24} Max. Marks     : {}",
            header.subject.year_sem_branch, header.max_marks
        );
    }

    for section in &paper.sections {
        println!();
        println!("{} ({})", section.label, section.summary());
        println!("{}", "-".repeat(72));
        for row in &section.rows {
            match row {
                PaperRow::Question(q) => println!(
                    "{:>3}. {}  [{}] [{}] ({})",
                    q.number, q.question.text, q.question.level, q.co_code, q.question.marks
                ),
                PaperRow::Or => println!("{:^72}", PaperRow::OR_MARKER),
            }
        }
    }

    println!();
    println!("{}", CognitiveLevel::legend());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        let cell = parse_cell("2=5").unwrap();
        assert_eq!(cell.outcome, None);
        assert_eq!(cell.marks.value(), 2);
        assert_eq!(cell.count, 5);

        let cell = parse_cell("CO1: Kinematics:13=2").unwrap();
        assert_eq!(cell.outcome.as_deref(), Some("CO1: Kinematics"));
        assert_eq!(cell.marks.value(), 13);

        assert!(parse_cell("3=1").is_err());
        assert!(parse_cell("2").is_err());
        assert!(parse_cell("2=x").is_err());
    }

    #[test]
    fn test_flags() {
        let args: Vec<String> = ["--co=CO2", "--or", "Define", "torque"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(flag(&args, "co"), Some("CO2"));
        assert!(has_flag(&args, "or"));
        assert!(!has_flag(&args, "json"));
        assert_eq!(positional(&args), vec!["Define", "torque"]);
    }
}
