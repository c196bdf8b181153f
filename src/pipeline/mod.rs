//! The submission status pipeline: pure transition and gating logic.
//!
//! Nothing in here performs IO. Every operation takes the current records,
//! validates the requested change, and returns updated records for the caller
//! to persist.

mod approval;
mod assignment;
mod pricing;
mod transition;
mod translation;

use std::fmt::Display;

use thiserror::Error;

use crate::{
    languages::Language,
    models::{DeveloperId, SubmissionId},
};

pub use approval::{finalize_approval, is_ready_for_approval, reject_final, submit_approval};
pub use assignment::{assign_developer, unassign_developer};
pub use pricing::{build_pricing_record, compute_economics, save_pricing};
pub use transition::{advance, StagePayload};
pub use translation::{
    approve_translations, cancel_translation, complete_translation, derive_translation_status,
    request_translation, review_translation, start_translation,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("a rejection requires a non-empty reason")]
    MissingReason,
    #[error("cannot advance to {target}: missing {field}")]
    MissingRequiredField {
        target: &'static str,
        field: &'static str,
    },
    #[error("the release checklist is not complete")]
    IncompleteChecklist,
    #[error("invalid pricing input: {field}")]
    InvalidInput { field: &'static str },
    #[error("a {language} translation was already requested for submission {submission}")]
    DuplicateTranslation {
        submission: SubmissionId,
        language: Language,
    },
    #[error("developer {name} is at capacity ({current}/{max})")]
    DeveloperAtCapacity {
        name: String,
        current: u8,
        max: u8,
    },
    #[error("no submission with id {0}")]
    UnknownSubmission(SubmissionId),
    #[error("no developer with id {0}")]
    UnknownDeveloper(DeveloperId),
    #[error("no {language} translation request for submission {submission}")]
    UnknownTranslation {
        submission: SubmissionId,
        language: Language,
    },
}

impl PipelineError {
    pub(crate) fn invalid_transition(from: impl Display, to: impl Display) -> PipelineError {
        PipelineError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
