//! Append-only record of completed evaluation sessions.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::core::{CaseInput, CaseResult};

/// One completed session.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// The submitted case.
    pub input: CaseInput,
    /// What the session returned.
    pub result: CaseResult,
    /// Iterations the session used.
    pub iterations_used: usize,
}

/// In-memory session history, shared by every caller of one orchestrator.
///
/// Appends are serialized by an internal lock, so concurrent sessions on a
/// shared orchestrator never interleave entries.
#[derive(Debug, Default)]
pub struct ConversationLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl ConversationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn append(&self, entry: LedgerEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Returns a snapshot of all entries in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no session has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    pub fn reset(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CaseStatus;
    use std::sync::Arc;
    use std::time::Duration;

    fn entry(query: &str, iterations: usize) -> LedgerEntry {
        LedgerEntry {
            input: CaseInput::new(query),
            result: CaseResult {
                status: CaseStatus::Completed,
                confidence: 0.7,
                evaluation_text: Some("ok".to_string()),
                image_analysis: None,
                text_analysis: None,
                recommendations: Vec::new(),
                iterations_used: iterations,
                clarification: None,
                error: None,
                iteration_log: Vec::new(),
                total_tokens: 0,
                elapsed: Duration::ZERO,
            },
            iterations_used: iterations,
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let ledger = ConversationLedger::new();
        ledger.append(entry("first", 1));
        ledger.append(entry("second", 2));
        let all = ledger.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].input.query, "first");
        assert_eq!(all[1].input.query, "second");
        assert_eq!(all[1].iterations_used, 2);
    }

    #[test]
    fn test_reset_clears() {
        let ledger = ConversationLedger::new();
        ledger.append(entry("first", 1));
        ledger.reset();
        assert!(ledger.all().is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_concurrent_appends() {
        let ledger = Arc::new(ConversationLedger::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || ledger.append(entry(&format!("case-{i}"), 1)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap_or_else(|_| unreachable!());
        }
        assert_eq!(ledger.len(), 8);
    }
}
