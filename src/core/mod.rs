//! Core data types shared by the orchestrator, the collaborators, and the CLI.

pub mod action;
pub mod case;
pub mod level;
pub mod report;

pub use action::{ActionKind, ActionPlan};
pub use case::{
    ActOutcome, CaseInput, CaseResult, CaseStatus, ClarificationRequest, IterationRecord,
};
pub use level::Level;
pub use report::{AnalysisReport, AnalysisSource, AnalysisStatus};
