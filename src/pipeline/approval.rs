use crate::models::{
    ApprovalForm, ApprovalRecord, Submission, SubmissionStatus, types::UtcDateTime,
};

use super::{pricing, transition::advance, PipelineError, StagePayload};

/// Whether the operator's draft can be submitted: a final price, a release
/// date, at least one distribution channel, and every checklist flag.
pub fn is_ready_for_approval(form: &ApprovalForm) -> bool {
    form.final_price.is_some()
        && form.release_date.is_some()
        && !form.distribution_channels.is_empty()
        && form.checklist.is_complete()
}

/// Freezes a complete draft into the release record.
pub fn finalize_approval(form: &ApprovalForm) -> Result<ApprovalRecord, PipelineError> {
    if !is_ready_for_approval(form) {
        return Err(PipelineError::IncompleteChecklist);
    }

    let final_price = form
        .final_price
        .expect("Readiness check guarantees a price");
    pricing::ensure_money("final price", final_price)?;

    Ok(ApprovalRecord {
        final_price,
        release_date: form
            .release_date
            .expect("Readiness check guarantees a release date"),
        distribution_channels: form.distribution_channels.clone(),
        marketing_plan: form.marketing_plan.clone(),
        notes: form.notes.clone(),
        checklist: form.checklist,
    })
}

/// Runs the final-approval gate and advances the submission to
/// `FinalApproved` with the frozen record attached.
pub fn submit_approval(
    submission: &Submission,
    form: &ApprovalForm,
) -> Result<Submission, PipelineError> {
    let record = finalize_approval(form)?;

    advance(
        submission,
        SubmissionStatus::FinalApproved,
        StagePayload::FinalApproval { record },
    )
}

/// Rejects a submission at the final gate (or anywhere before it).
pub fn reject_final(
    submission: &Submission,
    reason: &str,
    at: UtcDateTime,
) -> Result<Submission, PipelineError> {
    advance(
        submission,
        SubmissionStatus::FinalRejected,
        StagePayload::Rejection {
            reason: reason.to_string(),
            at,
        },
    )
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{
        fixtures,
        models::{
            ApprovalForm, DistributionChannel, ReleaseChecklist, SubmissionStatus,
            types::UtcDateTime,
        },
        pipeline::{
            finalize_approval, is_ready_for_approval, reject_final, submit_approval, PipelineError,
        },
    };

    fn release_date() -> UtcDateTime {
        UtcDateTime::assume_utc(datetime!(2024-03-15 0:00))
    }

    fn complete_form() -> ApprovalForm {
        ApprovalForm {
            final_price: Some(25_000.0),
            release_date: Some(release_date()),
            distribution_channels: vec![
                DistributionChannel::Steam,
                DistributionChannel::BoardGameGeek,
            ],
            marketing_plan: "Social campaign plus board-game cafe demo events".to_string(),
            notes: "All reviews passed".to_string(),
            checklist: ReleaseChecklist {
                quality_checked: true,
                legal_checked: true,
                marketing_approved: true,
            },
        }
    }

    #[test]
    fn a_complete_form_is_ready() {
        assert!(is_ready_for_approval(&complete_form()));
    }

    #[test]
    fn any_single_unchecked_flag_blocks_approval() {
        for clear in [
            |c: &mut ReleaseChecklist| c.quality_checked = false,
            |c: &mut ReleaseChecklist| c.legal_checked = false,
            |c: &mut ReleaseChecklist| c.marketing_approved = false,
        ] {
            let mut form = complete_form();
            clear(&mut form.checklist);

            assert!(!is_ready_for_approval(&form));
            assert_eq!(
                finalize_approval(&form),
                Err(PipelineError::IncompleteChecklist)
            );
        }
    }

    #[test]
    fn missing_fields_block_approval() {
        let mut no_price = complete_form();
        no_price.final_price = None;
        assert!(!is_ready_for_approval(&no_price));

        let mut no_date = complete_form();
        no_date.release_date = None;
        assert!(!is_ready_for_approval(&no_date));

        let mut no_channels = complete_form();
        no_channels.distribution_channels.clear();
        assert!(!is_ready_for_approval(&no_channels));
    }

    #[test]
    fn finalizing_freezes_the_draft() {
        let record = finalize_approval(&complete_form()).unwrap();

        assert_eq!(record.final_price, 25_000.0);
        assert_eq!(record.release_date, release_date());
        assert_eq!(record.distribution_channels.len(), 2);
        assert!(record.checklist.is_complete());
    }

    #[test]
    fn a_nonsensical_final_price_is_rejected() {
        let mut form = complete_form();
        form.final_price = Some(f64::NAN);

        assert_eq!(
            finalize_approval(&form),
            Err(PipelineError::InvalidInput {
                field: "final price"
            })
        );
    }

    #[test]
    fn submission_advances_with_the_record() {
        let submission = fixtures::submission_at(SubmissionStatus::PricingCompleted);

        let approved = submit_approval(&submission, &complete_form()).unwrap();

        assert_eq!(approved.status, SubmissionStatus::FinalApproved);
        let record = approved.approval.unwrap();
        assert_eq!(record.final_price, 25_000.0);
        // The pricing payload from the earlier stage is untouched.
        assert!(approved.pricing.is_some());
    }

    #[test]
    fn approval_requires_the_final_stage() {
        let submission = fixtures::submission_at(SubmissionStatus::TranslationApproved);

        assert!(matches!(
            submit_approval(&submission, &complete_form()),
            Err(PipelineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn final_rejection_records_the_reason() {
        let submission = fixtures::submission_at(SubmissionStatus::PricingCompleted);

        let rejected = reject_final(
            &submission,
            "Legal review flagged the artwork license",
            release_date(),
        )
        .unwrap();

        assert_eq!(rejected.status, SubmissionStatus::FinalRejected);
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("Legal review flagged the artwork license")
        );
    }
}
