//! Availability check run before any question is drawn
//!
//! The checker is the only gate against under-supply: it walks the
//! request cells in order and stops at the first one the bank cannot
//! fill. The selector downstream never fails on its own.

use crate::error::Shortage;
use crate::repository::QuestionBank;
use crate::types::GenerationRequest;
use tracing::warn;

/// Ok when every non-zero cell has at least as many matching questions
/// as it asks for; otherwise the first short cell.
///
/// Counts include OR-type questions whether or not the request includes
/// them.
pub fn check(request: &GenerationRequest, bank: &QuestionBank) -> Result<(), Shortage> {
    for cell in request.cells.iter().filter(|c| c.count > 0) {
        let available = bank.count_by(cell.outcome.as_deref(), cell.marks);
        if cell.count > available {
            let shortage = Shortage {
                outcome: cell.outcome.clone(),
                marks: cell.marks,
                available,
                requested: cell.count,
            };
            warn!("{}", shortage);
            return Err(shortage);
        }
    }
    Ok(())
}
