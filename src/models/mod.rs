mod approval;
mod developer;
mod pricing;
mod submission;
mod translation;

pub mod types;

pub use approval::{ApprovalForm, ApprovalRecord, DistributionChannel, ReleaseChecklist};
pub use developer::{AssignedDeveloper, Developer, DeveloperId, NewDeveloper};
pub use pricing::{CostBreakdown, Economics, PricingRecord};
pub use submission::{GameDetails, NewSubmission, Submission, SubmissionId, SubmissionStatus};
pub use translation::{
    NewTranslationRequest, TranslationRequest, TranslationRequestId, TranslationReview,
    TranslationStatus,
};
