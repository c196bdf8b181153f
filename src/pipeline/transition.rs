use crate::models::{
    ApprovalRecord, AssignedDeveloper, PricingRecord, Submission, SubmissionStatus,
    TranslationStatus, types::UtcDateTime,
};

use super::PipelineError;

/// The stage-specific data an operator's decision carries into a transition.
#[derive(Clone, Debug)]
pub enum StagePayload {
    /// Plan review accepted the submission.
    PlanApproval { reviewed_at: UtcDateTime },
    /// Any rejection, at plan review or later. The reason is mandatory.
    Rejection { reason: String, at: UtcDateTime },
    /// A developer took the project on.
    Assignment { developer: AssignedDeveloper },
    /// All translation work was completed and signed off. The gate that
    /// verifies the per-language requests lives in the translation module.
    TranslationSignoff,
    /// The pricing evaluation was saved.
    Pricing { record: PricingRecord },
    /// The final-approval record, frozen by the approval gate.
    FinalApproval { record: ApprovalRecord },
}

/// Moves a submission to `target`, merging in the stage payload.
///
/// `target` must be the immediate successor of the current status, except for
/// the rejection statuses, which are reachable from any non-terminal state.
/// Returns the updated record; the caller owns persistence.
pub fn advance(
    submission: &Submission,
    target: SubmissionStatus,
    payload: StagePayload,
) -> Result<Submission, PipelineError> {
    if target.is_rejection() {
        return reject(submission, target, payload);
    }

    if submission.status.successor() != Some(target) {
        return Err(PipelineError::invalid_transition(submission.status, target));
    }

    let mut updated = submission.clone();
    updated.status = target;

    use SubmissionStatus::*;

    match (target, payload) {
        (Approved, StagePayload::PlanApproval { reviewed_at }) => {
            updated.reviewed_at = Some(reviewed_at);
        }
        (Approved, _) => {
            return Err(missing(Approved, "review decision"));
        }

        (DeveloperAssigned, StagePayload::Assignment { developer }) => {
            updated.assigned_developer = Some(developer);
        }
        (DeveloperAssigned, _) => {
            return Err(missing(DeveloperAssigned, "assigned developer"));
        }

        (TranslationApproved, StagePayload::TranslationSignoff) => {
            updated.translation_status = TranslationStatus::Completed;
        }
        (TranslationApproved, _) => {
            return Err(missing(TranslationApproved, "translation sign-off"));
        }

        (PricingCompleted, StagePayload::Pricing { record }) => {
            updated.pricing = Some(record);
        }
        (PricingCompleted, _) => {
            return Err(missing(PricingCompleted, "pricing record"));
        }

        (FinalApproved, StagePayload::FinalApproval { record }) => {
            updated.approval = Some(record);
        }
        (FinalApproved, _) => {
            return Err(missing(FinalApproved, "approval record"));
        }

        // Submitted has no predecessor and the rejections were handled above,
        // so the successor check has already ruled these out.
        (Submitted | Rejected | FinalRejected, _) => {
            return Err(PipelineError::invalid_transition(submission.status, target));
        }
    }

    Ok(updated)
}

fn reject(
    submission: &Submission,
    target: SubmissionStatus,
    payload: StagePayload,
) -> Result<Submission, PipelineError> {
    if submission.status.is_terminal() {
        return Err(PipelineError::invalid_transition(submission.status, target));
    }

    let StagePayload::Rejection { reason, at } = payload else {
        return Err(PipelineError::MissingReason);
    };

    if reason.trim().is_empty() {
        return Err(PipelineError::MissingReason);
    }

    let mut updated = submission.clone();
    updated.status = target;
    updated.rejection_reason = Some(reason);
    if updated.reviewed_at.is_none() {
        updated.reviewed_at = Some(at);
    }

    Ok(updated)
}

fn missing(target: SubmissionStatus, field: &'static str) -> PipelineError {
    PipelineError::MissingRequiredField {
        target: target_name(target),
        field,
    }
}

fn target_name(target: SubmissionStatus) -> &'static str {
    use SubmissionStatus::*;

    match target {
        Submitted => "Submitted",
        Approved => "Approved",
        Rejected => "Rejected",
        DeveloperAssigned => "DeveloperAssigned",
        TranslationApproved => "TranslationApproved",
        PricingCompleted => "PricingCompleted",
        FinalApproved => "FinalApproved",
        FinalRejected => "FinalRejected",
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        fixtures,
        models::{SubmissionStatus, types::UtcDateTime},
        pipeline::{advance, PipelineError, StagePayload},
    };

    fn at() -> UtcDateTime {
        UtcDateTime::assume_utc(datetime!(2024-01-20 12:00))
    }

    #[test]
    fn plan_review_approves_a_submitted_plan() {
        let submission = fixtures::submission_at(SubmissionStatus::Submitted);

        let approved = advance(
            &submission,
            SubmissionStatus::Approved,
            StagePayload::PlanApproval { reviewed_at: at() },
        )
        .unwrap();

        assert_eq!(approved.status, SubmissionStatus::Approved);
        assert_eq!(approved.reviewed_at, Some(at()));
    }

    #[test]
    fn skipping_a_stage_is_invalid() {
        let submission = fixtures::submission_at(SubmissionStatus::Submitted);

        let result = advance(
            &submission,
            SubmissionStatus::TranslationApproved,
            StagePayload::TranslationSignoff,
        );

        assert!(matches!(
            result,
            Err(PipelineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn moving_backwards_is_invalid() {
        let submission = fixtures::submission_at(SubmissionStatus::PricingCompleted);

        let result = advance(
            &submission,
            SubmissionStatus::Approved,
            StagePayload::PlanApproval { reviewed_at: at() },
        );

        assert!(matches!(
            result,
            Err(PipelineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn advancing_without_the_stage_payload_is_rejected() {
        let submission = fixtures::submission_at(SubmissionStatus::Approved);

        let result = advance(
            &submission,
            SubmissionStatus::DeveloperAssigned,
            StagePayload::TranslationSignoff,
        );

        assert_eq!(
            result,
            Err(PipelineError::MissingRequiredField {
                target: "DeveloperAssigned",
                field: "assigned developer",
            })
        );
    }

    #[test]
    fn rejection_is_reachable_from_every_non_terminal_state() {
        use SubmissionStatus::*;

        for status in [Submitted, Approved, DeveloperAssigned, TranslationApproved] {
            let submission = fixtures::submission_at(status);

            let rejected = advance(
                &submission,
                Rejected,
                StagePayload::Rejection {
                    reason: "Theme overlaps an existing title".to_string(),
                    at: at(),
                },
            )
            .unwrap();

            assert_eq!(rejected.status, Rejected);
            assert_eq!(
                rejected.rejection_reason.as_deref(),
                Some("Theme overlaps an existing title")
            );
        }
    }

    #[test]
    fn rejection_from_a_terminal_state_is_invalid() {
        use SubmissionStatus::*;

        for status in [Rejected, FinalApproved, FinalRejected] {
            let submission = fixtures::submission_at(status);

            let result = advance(
                &submission,
                FinalRejected,
                StagePayload::Rejection {
                    reason: "too late".to_string(),
                    at: at(),
                },
            );

            assert!(matches!(
                result,
                Err(PipelineError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn rejecting_without_a_reason_fails() {
        let submission = fixtures::submission_at(SubmissionStatus::Submitted);

        for reason in ["", "   ", "\n\t"] {
            let result = advance(
                &submission,
                SubmissionStatus::Rejected,
                StagePayload::Rejection {
                    reason: reason.to_string(),
                    at: at(),
                },
            );

            assert_eq!(result, Err(PipelineError::MissingReason));
        }
    }

    #[test]
    fn rejecting_with_a_non_rejection_payload_fails() {
        let submission = fixtures::submission_at(SubmissionStatus::Submitted);

        let result = advance(
            &submission,
            SubmissionStatus::Rejected,
            StagePayload::TranslationSignoff,
        );

        assert_eq!(result, Err(PipelineError::MissingReason));
    }

    #[test]
    fn earlier_payloads_survive_later_transitions() {
        let submission = fixtures::submission_at(SubmissionStatus::DeveloperAssigned);
        let developer = submission.assigned_developer.clone();
        assert!(developer.is_some());

        let signed_off = advance(
            &submission,
            SubmissionStatus::TranslationApproved,
            StagePayload::TranslationSignoff,
        )
        .unwrap();

        assert_eq!(signed_off.assigned_developer, developer);
        assert_eq!(signed_off.title, submission.title);
        assert_eq!(signed_off.game_details, submission.game_details);
    }
}
