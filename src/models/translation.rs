use std::fmt;

use strum::{Display, EnumString};

use crate::languages::Language;

use super::{submission::SubmissionId, types::UtcDateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranslationRequestId(pub u64);

impl fmt::Display for TranslationRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
pub enum TranslationStatus {
    Pending,
    InProgress,
    Completed,
}

impl TranslationStatus {
    pub fn successor(&self) -> Option<TranslationStatus> {
        use TranslationStatus::*;

        match self {
            Pending => Some(InProgress),
            InProgress => Some(Completed),
            Completed => None,
        }
    }
}

/// One language's translation work for a submission. At most one request may
/// exist per (submission, language) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationRequest {
    pub id: TranslationRequestId,
    pub submission_id: SubmissionId,
    pub language: Language,
    pub status: TranslationStatus,
    pub translator: Option<String>,
    pub requested_at: UtcDateTime,
    pub completed_at: Option<UtcDateTime>,
    pub review: Option<TranslationReview>,
}

#[derive(Debug)]
pub struct NewTranslationRequest {
    pub submission_id: SubmissionId,
    pub language: Language,
    pub requested_at: UtcDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationReview {
    pub approved: bool,
    pub notes: String,
    pub reviewed_at: UtcDateTime,
}
