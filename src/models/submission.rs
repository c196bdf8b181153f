use std::fmt;

use strum::{Display, EnumString};

use super::{
    approval::ApprovalRecord, developer::AssignedDeveloper, pricing::PricingRecord,
    translation::TranslationStatus, types::UtcDateTime,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(pub u64);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A proposed game tracked through the publishing pipeline.
///
/// Stage payloads (`assigned_developer`, `pricing`, `approval`) are only ever
/// attached by the transition operations, so a payload never appears before
/// its predecessor stage has completed.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub id: SubmissionId,
    pub slug: String,
    pub title: String,
    pub status: SubmissionStatus,
    pub submission_message: String,
    pub game_details: GameDetails,
    pub submitted_at: UtcDateTime,
    pub reviewed_at: Option<UtcDateTime>,
    pub rejection_reason: Option<String>,
    pub assigned_developer: Option<AssignedDeveloper>,
    /// Coarse roll-up of the per-language translation requests.
    pub translation_status: TranslationStatus,
    pub pricing: Option<PricingRecord>,
    pub approval: Option<ApprovalRecord>,
    pub release_announced_at: Option<UtcDateTime>,
}

#[derive(Debug)]
pub struct NewSubmission {
    pub title: String,
    pub submission_message: String,
    pub game_details: GameDetails,
    pub submitted_at: UtcDateTime,
}

/// Descriptive attributes of the game itself. The pipeline treats these as an
/// opaque payload and never validates them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameDetails {
    pub theme: String,
    pub player_count: String,
    pub play_time: String,
    pub difficulty: String,
    pub components: Vec<String>,
    pub rules: String,
    pub goal: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
pub enum SubmissionStatus {
    Submitted,
    Approved,
    Rejected,
    DeveloperAssigned,
    TranslationApproved,
    PricingCompleted,
    FinalApproved,
    FinalRejected,
}

impl SubmissionStatus {
    /// The next stage in the pipeline order, if there is one.
    pub fn successor(&self) -> Option<SubmissionStatus> {
        use SubmissionStatus::*;

        match self {
            Submitted => Some(Approved),
            Approved => Some(DeveloperAssigned),
            DeveloperAssigned => Some(TranslationApproved),
            TranslationApproved => Some(PricingCompleted),
            PricingCompleted => Some(FinalApproved),
            Rejected | FinalApproved | FinalRejected => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        use SubmissionStatus::*;

        matches!(self, Rejected | FinalApproved | FinalRejected)
    }

    pub fn is_rejection(&self) -> bool {
        use SubmissionStatus::*;

        matches!(self, Rejected | FinalRejected)
    }
}
