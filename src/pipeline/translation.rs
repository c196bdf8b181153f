use crate::models::{
    NewTranslationRequest, Submission, SubmissionStatus, TranslationRequest, TranslationRequestId,
    TranslationReview, TranslationStatus, types::UtcDateTime,
};

use super::{transition::advance, PipelineError, StagePayload};

/// Opens a `Pending` translation request for one language of a submission.
///
/// Only a submission sitting in the translation stage accepts requests, and
/// a (submission, language) pair may be requested at most once.
pub fn request_translation(
    existing: &[TranslationRequest],
    submission: &Submission,
    id: TranslationRequestId,
    new: NewTranslationRequest,
) -> Result<TranslationRequest, PipelineError> {
    if submission.status != SubmissionStatus::DeveloperAssigned {
        return Err(PipelineError::invalid_transition(
            submission.status,
            SubmissionStatus::TranslationApproved,
        ));
    }

    let duplicate = existing
        .iter()
        .any(|request| request.submission_id == new.submission_id && request.language == new.language);
    if duplicate {
        return Err(PipelineError::DuplicateTranslation {
            submission: new.submission_id,
            language: new.language,
        });
    }

    Ok(TranslationRequest {
        id,
        submission_id: new.submission_id,
        language: new.language,
        status: TranslationStatus::Pending,
        translator: None,
        requested_at: new.requested_at,
        completed_at: None,
        review: None,
    })
}

/// `Pending -> InProgress`, recording who picked the work up.
pub fn start_translation(
    request: &TranslationRequest,
    translator: &str,
) -> Result<TranslationRequest, PipelineError> {
    expect_step(request, TranslationStatus::InProgress)?;

    if translator.trim().is_empty() {
        return Err(PipelineError::MissingRequiredField {
            target: "InProgress",
            field: "translator",
        });
    }

    let mut updated = request.clone();
    updated.status = TranslationStatus::InProgress;
    updated.translator = Some(translator.to_string());

    Ok(updated)
}

/// `InProgress -> Completed`.
pub fn complete_translation(
    request: &TranslationRequest,
    at: UtcDateTime,
) -> Result<TranslationRequest, PipelineError> {
    expect_step(request, TranslationStatus::Completed)?;

    let mut updated = request.clone();
    updated.status = TranslationStatus::Completed;
    updated.completed_at = Some(at);

    Ok(updated)
}

/// Verifies a request may be withdrawn. Only `Pending` requests qualify;
/// removal itself is the store's job.
pub fn cancel_translation(request: &TranslationRequest) -> Result<(), PipelineError> {
    if request.status != TranslationStatus::Pending {
        return Err(PipelineError::invalid_transition(request.status, "cancelled"));
    }

    Ok(())
}

/// Attaches a review verdict to a `Completed` request.
pub fn review_translation(
    request: &TranslationRequest,
    approved: bool,
    notes: &str,
    at: UtcDateTime,
) -> Result<TranslationRequest, PipelineError> {
    if request.status != TranslationStatus::Completed {
        return Err(PipelineError::invalid_transition(request.status, "reviewed"));
    }

    let mut updated = request.clone();
    updated.review = Some(TranslationReview {
        approved,
        notes: notes.to_string(),
        reviewed_at: at,
    });

    Ok(updated)
}

/// The coarse roll-up of a submission's translation requests:
/// `Completed` when every request (of at least one) is completed,
/// `InProgress` once any work has started, `Pending` otherwise.
pub fn derive_translation_status(requests: &[TranslationRequest]) -> TranslationStatus {
    if !requests.is_empty()
        && requests
            .iter()
            .all(|request| request.status == TranslationStatus::Completed)
    {
        return TranslationStatus::Completed;
    }

    if requests.iter().any(|request| {
        matches!(
            request.status,
            TranslationStatus::InProgress | TranslationStatus::Completed
        )
    }) {
        return TranslationStatus::InProgress;
    }

    TranslationStatus::Pending
}

/// Signs the translation stage off, advancing the submission to
/// `TranslationApproved`. Requires every request to be completed and carry an
/// approving review.
pub fn approve_translations(
    submission: &Submission,
    requests: &[TranslationRequest],
) -> Result<Submission, PipelineError> {
    if derive_translation_status(requests) != TranslationStatus::Completed {
        return Err(PipelineError::MissingRequiredField {
            target: "TranslationApproved",
            field: "completed translations",
        });
    }

    let all_approved = requests.iter().all(|request| {
        request
            .review
            .as_ref()
            .is_some_and(|review| review.approved)
    });
    if !all_approved {
        return Err(PipelineError::MissingRequiredField {
            target: "TranslationApproved",
            field: "approving reviews",
        });
    }

    advance(
        submission,
        SubmissionStatus::TranslationApproved,
        StagePayload::TranslationSignoff,
    )
}

fn expect_step(
    request: &TranslationRequest,
    target: TranslationStatus,
) -> Result<(), PipelineError> {
    if request.status.successor() != Some(target) {
        return Err(PipelineError::invalid_transition(request.status, target));
    }

    Ok(())
}
