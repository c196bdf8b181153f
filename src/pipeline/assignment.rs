use crate::models::{AssignedDeveloper, Developer, Submission, SubmissionStatus};

use super::{transition::advance, PipelineError, StagePayload};

/// Assigns a developer to an approved submission.
///
/// The submission must be in `Approved` status and the developer must have
/// spare capacity. Returns the advanced submission together with the
/// developer's updated project count.
pub fn assign_developer(
    submission: &Submission,
    developer: &Developer,
) -> Result<(Submission, Developer), PipelineError> {
    if submission.status != SubmissionStatus::Approved {
        return Err(PipelineError::invalid_transition(
            submission.status,
            SubmissionStatus::DeveloperAssigned,
        ));
    }

    if !developer.has_capacity() {
        return Err(PipelineError::DeveloperAtCapacity {
            name: developer.name.clone(),
            current: developer.current_projects,
            max: developer.max_projects.get(),
        });
    }

    let updated_submission = advance(
        submission,
        SubmissionStatus::DeveloperAssigned,
        StagePayload::Assignment {
            developer: AssignedDeveloper::from(developer),
        },
    )?;

    let mut updated_developer = developer.clone();
    updated_developer.current_projects += 1;

    Ok((updated_submission, updated_developer))
}

/// Takes a developer off a submission again, reverting it to `Approved`.
///
/// This is the one sanctioned backwards step in the pipeline, so it does not
/// go through `advance`. The developer's project count is decremented,
/// floored at zero.
pub fn unassign_developer(
    submission: &Submission,
    developer: &Developer,
) -> Result<(Submission, Developer), PipelineError> {
    if submission.status != SubmissionStatus::DeveloperAssigned {
        return Err(PipelineError::invalid_transition(
            submission.status,
            SubmissionStatus::Approved,
        ));
    }

    match &submission.assigned_developer {
        Some(assigned) if assigned.id == developer.id => (),
        _ => return Err(PipelineError::UnknownDeveloper(developer.id)),
    }

    let mut updated_submission = submission.clone();
    updated_submission.status = SubmissionStatus::Approved;
    updated_submission.assigned_developer = None;

    let mut updated_developer = developer.clone();
    updated_developer.current_projects = updated_developer.current_projects.saturating_sub(1);

    Ok((updated_submission, updated_developer))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU8;

    use crate::{
        fixtures,
        models::{Developer, DeveloperId, SubmissionStatus},
        pipeline::{assign_developer, unassign_developer, PipelineError},
    };

    fn developer(current: u8, max: u8) -> Developer {
        Developer {
            id: DeveloperId(1),
            name: "Ji-ho Kim".to_string(),
            specialty: "Card games".to_string(),
            experience_years: 5,
            rating: 4.8,
            completed_games: 12,
            current_projects: current,
            max_projects: NonZeroU8::new(max).unwrap(),
        }
    }

    #[test]
    fn assignment_advances_and_counts_the_project() {
        let submission = fixtures::submission_at(SubmissionStatus::Approved);
        let developer = developer(2, 5);

        let (submission, developer) = assign_developer(&submission, &developer).unwrap();

        assert_eq!(submission.status, SubmissionStatus::DeveloperAssigned);
        assert_eq!(
            submission.assigned_developer.as_ref().map(|d| d.id),
            Some(developer.id)
        );
        assert_eq!(developer.current_projects, 3);
    }

    #[test]
    fn a_full_developer_cannot_take_another_project() {
        let submission = fixtures::submission_at(SubmissionStatus::Approved);
        let developer = developer(3, 3);

        let result = assign_developer(&submission, &developer);

        assert_eq!(
            result,
            Err(PipelineError::DeveloperAtCapacity {
                name: "Ji-ho Kim".to_string(),
                current: 3,
                max: 3,
            })
        );
    }

    #[test]
    fn repeated_assignments_never_exceed_capacity() {
        let mut developer = developer(0, 2);

        for _ in 0..5 {
            let submission = fixtures::submission_at(SubmissionStatus::Approved);

            if let Ok((_, updated)) = assign_developer(&submission, &developer) {
                developer = updated;
            }
        }

        assert_eq!(developer.current_projects, 2);
    }

    #[test]
    fn only_approved_submissions_are_assignable() {
        let submission = fixtures::submission_at(SubmissionStatus::Submitted);
        let developer = developer(0, 3);

        assert!(matches!(
            assign_developer(&submission, &developer),
            Err(PipelineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn unassign_then_assign_round_trips_the_count() {
        let submission = fixtures::submission_at(SubmissionStatus::Approved);
        let developer = developer(1, 4);

        let (assigned, busier) = assign_developer(&submission, &developer).unwrap();
        let (reverted, freed) = unassign_developer(&assigned, &busier).unwrap();

        assert_eq!(reverted.status, SubmissionStatus::Approved);
        assert_eq!(reverted.assigned_developer, None);
        assert_eq!(freed.current_projects, developer.current_projects);

        let (reassigned, reloaded) = assign_developer(&reverted, &freed).unwrap();
        assert_eq!(reassigned.status, SubmissionStatus::DeveloperAssigned);
        assert_eq!(reloaded.current_projects, busier.current_projects);
    }

    #[test]
    fn unassigning_the_wrong_developer_is_rejected() {
        let submission = fixtures::submission_at(SubmissionStatus::DeveloperAssigned);
        let mut other = developer(1, 4);
        other.id = DeveloperId(99);

        assert_eq!(
            unassign_developer(&submission, &other),
            Err(PipelineError::UnknownDeveloper(DeveloperId(99)))
        );
    }

    #[test]
    fn unassignment_count_is_floored_at_zero() {
        let submission = fixtures::submission_at(SubmissionStatus::DeveloperAssigned);
        let developer = developer(0, 3);

        let (_, updated) = unassign_developer(&submission, &developer).unwrap();

        assert_eq!(updated.current_projects, 0);
    }
}
