//! The normalized client-side store: every record lives exactly once, keyed
//! by id, and all mutation goes through the pipeline operations. Stage views
//! are queries over the one copy instead of per-view duplicates.

use std::collections::HashMap;

use crate::{
    languages::Language,
    models::{
        ApprovalForm, CostBreakdown, Developer, DeveloperId, NewDeveloper, NewSubmission,
        NewTranslationRequest, Submission, SubmissionId, SubmissionStatus, TranslationRequest,
        TranslationRequestId, TranslationStatus, types::UtcDateTime,
    },
    pipeline::{self, PipelineError, StagePayload},
    slug::slugify_title,
};

#[derive(Debug, Default)]
pub struct PipelineStore {
    submissions: HashMap<SubmissionId, Submission>,
    developers: HashMap<DeveloperId, Developer>,
    translations: HashMap<TranslationRequestId, TranslationRequest>,
    next_submission_id: u64,
    next_developer_id: u64,
    next_translation_id: u64,
}

impl PipelineStore {
    pub fn new() -> PipelineStore {
        PipelineStore::default()
    }

    // --- intake -----------------------------------------------------------

    pub fn create_submission(&mut self, new: NewSubmission) -> SubmissionId {
        self.next_submission_id += 1;
        let id = SubmissionId(self.next_submission_id);

        let submission = Submission {
            id,
            slug: slugify_title(&new.title),
            title: new.title,
            status: SubmissionStatus::Submitted,
            submission_message: new.submission_message,
            game_details: new.game_details,
            submitted_at: new.submitted_at,
            reviewed_at: None,
            rejection_reason: None,
            assigned_developer: None,
            translation_status: TranslationStatus::Pending,
            pricing: None,
            approval: None,
            release_announced_at: None,
        };

        self.submissions.insert(id, submission);
        id
    }

    pub fn register_developer(&mut self, new: NewDeveloper) -> DeveloperId {
        self.next_developer_id += 1;
        let id = DeveloperId(self.next_developer_id);

        self.developers.insert(
            id,
            Developer {
                id,
                name: new.name,
                specialty: new.specialty,
                experience_years: new.experience_years,
                rating: new.rating,
                completed_games: new.completed_games,
                current_projects: new.current_projects,
                max_projects: new.max_projects,
            },
        );

        id
    }

    /// Absorbs an authoritative copy of a submission wholesale, replacing
    /// whatever the store held. This is the reconciliation point for server
    /// responses; it does not go through the transition checks.
    pub fn reconcile(&mut self, submission: Submission) {
        self.next_submission_id = self.next_submission_id.max(submission.id.0);
        self.submissions.insert(submission.id, submission);
    }

    // --- lookups and stage views ------------------------------------------

    pub fn submission(&self, id: SubmissionId) -> Option<&Submission> {
        self.submissions.get(&id)
    }

    pub fn developer(&self, id: DeveloperId) -> Option<&Developer> {
        self.developers.get(&id)
    }

    /// Developers with spare capacity, the roster the assignment stage shows.
    pub fn available_developers(&self) -> Vec<&Developer> {
        let mut developers: Vec<&Developer> = self
            .developers
            .values()
            .filter(|developer| developer.has_capacity())
            .collect();
        developers.sort_by_key(|developer| developer.id);
        developers
    }

    /// Plans waiting for review.
    pub fn pending_plans(&self) -> Vec<&Submission> {
        self.by_status(SubmissionStatus::Submitted)
    }

    /// Approved plans without a developer yet.
    pub fn assignable_submissions(&self) -> Vec<&Submission> {
        self.by_status(SubmissionStatus::Approved)
    }

    /// Projects whose translation work is open.
    pub fn translation_queue(&self) -> Vec<&Submission> {
        self.by_status(SubmissionStatus::DeveloperAssigned)
    }

    /// Games with approved translations awaiting a pricing evaluation.
    pub fn pricing_queue(&self) -> Vec<&Submission> {
        self.by_status(SubmissionStatus::TranslationApproved)
    }

    /// Priced games waiting for the final decision.
    pub fn approval_queue(&self) -> Vec<&Submission> {
        self.by_status(SubmissionStatus::PricingCompleted)
    }

    pub fn translations_for(&self, id: SubmissionId) -> Vec<&TranslationRequest> {
        let mut requests: Vec<&TranslationRequest> = self
            .translations
            .values()
            .filter(|request| request.submission_id == id)
            .collect();
        requests.sort_by_key(|request| request.id);
        requests
    }

    // --- plan review ------------------------------------------------------

    pub fn approve_plan(
        &mut self,
        id: SubmissionId,
        at: UtcDateTime,
    ) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let updated = pipeline::advance(
            submission,
            SubmissionStatus::Approved,
            StagePayload::PlanApproval { reviewed_at: at },
        )?;
        Ok(self.put(updated))
    }

    pub fn reject_plan(
        &mut self,
        id: SubmissionId,
        reason: &str,
        at: UtcDateTime,
    ) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let updated = pipeline::advance(
            submission,
            SubmissionStatus::Rejected,
            StagePayload::Rejection {
                reason: reason.to_string(),
                at,
            },
        )?;
        Ok(self.put(updated))
    }

    // --- developer assignment ---------------------------------------------

    pub fn assign_developer(
        &mut self,
        id: SubmissionId,
        developer_id: DeveloperId,
    ) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let developer = self
            .developers
            .get(&developer_id)
            .ok_or(PipelineError::UnknownDeveloper(developer_id))?;

        let (submission, developer) = pipeline::assign_developer(submission, developer)?;

        self.developers.insert(developer.id, developer);
        Ok(self.put(submission))
    }

    pub fn unassign_developer(&mut self, id: SubmissionId) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let developer_id = submission
            .assigned_developer
            .as_ref()
            .map(|assigned| assigned.id)
            .ok_or_else(|| {
                PipelineError::invalid_transition(submission.status, SubmissionStatus::Approved)
            })?;
        let developer = self
            .developers
            .get(&developer_id)
            .ok_or(PipelineError::UnknownDeveloper(developer_id))?;

        let (submission, developer) = pipeline::unassign_developer(submission, developer)?;

        self.developers.insert(developer.id, developer);
        Ok(self.put(submission))
    }

    // --- translation ------------------------------------------------------

    pub fn request_translation(
        &mut self,
        id: SubmissionId,
        language: Language,
        at: UtcDateTime,
    ) -> Result<TranslationRequestId, PipelineError> {
        let submission = self.get(id)?;
        let existing: Vec<TranslationRequest> = self
            .translations
            .values()
            .filter(|request| request.submission_id == id)
            .cloned()
            .collect();

        let request_id = TranslationRequestId(self.next_translation_id + 1);
        let request = pipeline::request_translation(
            &existing,
            submission,
            request_id,
            NewTranslationRequest {
                submission_id: id,
                language,
                requested_at: at,
            },
        )?;

        self.next_translation_id += 1;
        self.translations.insert(request.id, request);
        self.refresh_translation_status(id);

        Ok(request_id)
    }

    pub fn cancel_translation(
        &mut self,
        id: SubmissionId,
        language: Language,
    ) -> Result<(), PipelineError> {
        let request = self.get_request(id, language)?;
        pipeline::cancel_translation(request)?;

        let request_id = request.id;
        self.translations.remove(&request_id);
        self.refresh_translation_status(id);

        Ok(())
    }

    pub fn start_translation(
        &mut self,
        id: SubmissionId,
        language: Language,
        translator: &str,
    ) -> Result<(), PipelineError> {
        let request = self.get_request(id, language)?;
        let updated = pipeline::start_translation(request, translator)?;

        self.translations.insert(updated.id, updated);
        self.refresh_translation_status(id);

        Ok(())
    }

    pub fn complete_translation(
        &mut self,
        id: SubmissionId,
        language: Language,
        at: UtcDateTime,
    ) -> Result<(), PipelineError> {
        let request = self.get_request(id, language)?;
        let updated = pipeline::complete_translation(request, at)?;

        self.translations.insert(updated.id, updated);
        self.refresh_translation_status(id);

        Ok(())
    }

    pub fn review_translation(
        &mut self,
        id: SubmissionId,
        language: Language,
        approved: bool,
        notes: &str,
        at: UtcDateTime,
    ) -> Result<(), PipelineError> {
        let request = self.get_request(id, language)?;
        let updated = pipeline::review_translation(request, approved, notes, at)?;

        self.translations.insert(updated.id, updated);

        Ok(())
    }

    pub fn approve_translations(&mut self, id: SubmissionId) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let requests: Vec<TranslationRequest> = self
            .translations
            .values()
            .filter(|request| request.submission_id == id)
            .cloned()
            .collect();

        let updated = pipeline::approve_translations(submission, &requests)?;
        Ok(self.put(updated))
    }

    // --- pricing and final approval ---------------------------------------

    pub fn save_pricing(
        &mut self,
        id: SubmissionId,
        costs: CostBreakdown,
        suggested_price: f64,
        platform_fee_percent: f64,
        notes: &str,
    ) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let updated = pipeline::save_pricing(
            submission,
            costs,
            suggested_price,
            platform_fee_percent,
            notes,
        )?;
        Ok(self.put(updated))
    }

    pub fn submit_final_approval(
        &mut self,
        id: SubmissionId,
        form: &ApprovalForm,
    ) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let updated = pipeline::submit_approval(submission, form)?;
        Ok(self.put(updated))
    }

    pub fn reject_final(
        &mut self,
        id: SubmissionId,
        reason: &str,
        at: UtcDateTime,
    ) -> Result<Submission, PipelineError> {
        let submission = self.get(id)?;
        let updated = pipeline::reject_final(submission, reason, at)?;
        Ok(self.put(updated))
    }

    // --- internals --------------------------------------------------------

    fn by_status(&self, status: SubmissionStatus) -> Vec<&Submission> {
        let mut submissions: Vec<&Submission> = self
            .submissions
            .values()
            .filter(|submission| submission.status == status)
            .collect();
        submissions.sort_by_key(|submission| submission.id);
        submissions
    }

    fn get(&self, id: SubmissionId) -> Result<&Submission, PipelineError> {
        self.submissions
            .get(&id)
            .ok_or(PipelineError::UnknownSubmission(id))
    }

    fn put(&mut self, submission: Submission) -> Submission {
        self.submissions.insert(submission.id, submission.clone());
        submission
    }

    fn get_request(
        &self,
        id: SubmissionId,
        language: Language,
    ) -> Result<&TranslationRequest, PipelineError> {
        self.translations
            .values()
            .find(|request| request.submission_id == id && request.language == language)
            .ok_or(PipelineError::UnknownTranslation {
                submission: id,
                language,
            })
    }

    fn refresh_translation_status(&mut self, id: SubmissionId) {
        let derived = pipeline::derive_translation_status(
            &self
                .translations
                .values()
                .filter(|request| request.submission_id == id)
                .cloned()
                .collect::<Vec<_>>(),
        );

        if let Some(submission) = self.submissions.get_mut(&id) {
            if !submission.status.is_terminal() {
                submission.translation_status = derived;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU8;

    use time::macros::datetime;

    use crate::{
        fixtures,
        languages::Language,
        models::{
            ApprovalForm, CostBreakdown, DeveloperId, DistributionChannel, NewDeveloper,
            ReleaseChecklist, SubmissionId, SubmissionStatus, TranslationStatus,
            types::UtcDateTime,
        },
        pipeline::PipelineError,
        store::PipelineStore,
    };

    fn now() -> UtcDateTime {
        UtcDateTime::assume_utc(datetime!(2024-01-20 12:00))
    }

    fn approval_form() -> ApprovalForm {
        ApprovalForm {
            final_price: Some(15_000.0),
            release_date: Some(UtcDateTime::assume_utc(datetime!(2024-03-15 0:00))),
            distribution_channels: vec![DistributionChannel::Steam],
            marketing_plan: "Launch bundle with the demo events".to_string(),
            notes: String::new(),
            checklist: ReleaseChecklist {
                quality_checked: true,
                legal_checked: true,
                marketing_approved: true,
            },
        }
    }

    #[test]
    fn a_submission_walks_the_whole_pipeline() {
        let mut store = fixtures::seeded_store(now());
        let id = SubmissionId(1);

        // Seeded mid-translation: English and Japanese requested.
        store.start_translation(id, Language::English, "Dana Park").unwrap();
        store.complete_translation(id, Language::English, now()).unwrap();
        store.start_translation(id, Language::Japanese, "Yuki Tanaka").unwrap();

        let submission = store.submission(id).unwrap();
        assert_eq!(submission.translation_status, TranslationStatus::InProgress);

        store.complete_translation(id, Language::Japanese, now()).unwrap();
        store
            .review_translation(id, Language::English, true, "Reads well", now())
            .unwrap();
        store
            .review_translation(id, Language::Japanese, true, "", now())
            .unwrap();

        let signed_off = store.approve_translations(id).unwrap();
        assert_eq!(signed_off.status, SubmissionStatus::TranslationApproved);

        let priced = store
            .save_pricing(
                id,
                CostBreakdown {
                    development: 500_000.0,
                    translation: 200_000.0,
                    marketing: 300_000.0,
                },
                15_000.0,
                30.0,
                "Competitive price aimed at overseas markets",
            )
            .unwrap();
        assert_eq!(priced.status, SubmissionStatus::PricingCompleted);

        let approved = store.submit_final_approval(id, &approval_form()).unwrap();
        assert_eq!(approved.status, SubmissionStatus::FinalApproved);
        assert_eq!(approved.approval.unwrap().final_price, 15_000.0);
    }

    #[test]
    fn stage_views_partition_the_submissions() {
        let store = fixtures::seeded_store(now());

        let pending: Vec<SubmissionId> =
            store.pending_plans().iter().map(|s| s.id).collect();
        let assignable: Vec<SubmissionId> =
            store.assignable_submissions().iter().map(|s| s.id).collect();
        let translating: Vec<SubmissionId> =
            store.translation_queue().iter().map(|s| s.id).collect();

        assert_eq!(pending, vec![SubmissionId(3)]);
        assert_eq!(assignable, vec![SubmissionId(2)]);
        assert_eq!(translating, vec![SubmissionId(1)]);
        assert!(store.pricing_queue().is_empty());
        assert!(store.approval_queue().is_empty());
    }

    #[test]
    fn duplicate_translation_requests_are_rejected() {
        let mut store = fixtures::seeded_store(now());

        let result = store.request_translation(SubmissionId(1), Language::English, now());

        assert_eq!(
            result,
            Err(PipelineError::DuplicateTranslation {
                submission: SubmissionId(1),
                language: Language::English,
            })
        );
    }

    #[test]
    fn cancelling_a_pending_request_removes_it() {
        let mut store = fixtures::seeded_store(now());
        let id = SubmissionId(1);

        store.cancel_translation(id, Language::Japanese).unwrap();

        assert_eq!(store.translations_for(id).len(), 1);
        assert_eq!(
            store.cancel_translation(id, Language::Japanese),
            Err(PipelineError::UnknownTranslation {
                submission: id,
                language: Language::Japanese,
            })
        );
    }

    #[test]
    fn assignment_updates_the_developer_roster() {
        let mut store = fixtures::seeded_store(now());
        let id = SubmissionId(2);

        let before = store.developer(DeveloperId(4)).unwrap().current_projects;
        store.assign_developer(id, DeveloperId(4)).unwrap();
        let after = store.developer(DeveloperId(4)).unwrap().current_projects;
        assert_eq!(after, before + 1);

        let reverted = store.unassign_developer(id).unwrap();
        assert_eq!(reverted.status, SubmissionStatus::Approved);
        assert_eq!(
            store.developer(DeveloperId(4)).unwrap().current_projects,
            before
        );
    }

    #[test]
    fn the_assignment_roster_excludes_full_developers() {
        let mut store = fixtures::seeded_store(now());

        let id = store.register_developer(NewDeveloper {
            name: "Robin Seo".to_string(),
            specialty: "Dice games".to_string(),
            experience_years: 2,
            rating: 4.5,
            completed_games: 3,
            current_projects: 0,
            max_projects: NonZeroU8::new(1).expect("Hard-coded capacity is non-zero"),
        });
        assert!(store
            .available_developers()
            .iter()
            .any(|developer| developer.id == id));

        store.assign_developer(SubmissionId(2), id).unwrap();

        assert!(store
            .available_developers()
            .iter()
            .all(|developer| developer.id != id));
    }

    #[test]
    fn rejecting_a_plan_requires_a_reason() {
        let mut store = fixtures::seeded_store(now());

        assert_eq!(
            store.reject_plan(SubmissionId(3), "  ", now()),
            Err(PipelineError::MissingReason)
        );

        let rejected = store
            .reject_plan(SubmissionId(3), "Too close to an existing title", now())
            .unwrap();
        assert_eq!(rejected.status, SubmissionStatus::Rejected);
    }

    #[test]
    fn unknown_ids_do_not_panic() {
        let mut store = PipelineStore::new();

        assert_eq!(
            store.approve_plan(SubmissionId(42), now()),
            Err(PipelineError::UnknownSubmission(SubmissionId(42)))
        );
        assert!(store.submission(SubmissionId(42)).is_none());
    }

    #[test]
    fn reconcile_replaces_the_local_copy() {
        let mut store = fixtures::seeded_store(now());

        let mut authoritative = fixtures::submission_at(SubmissionStatus::PricingCompleted);
        authoritative.id = SubmissionId(1);
        store.reconcile(authoritative.clone());

        assert_eq!(store.submission(SubmissionId(1)), Some(&authoritative));

        // Ids allocated after reconciliation never collide with the server's.
        let mut far_ahead = fixtures::submission_at(SubmissionStatus::Submitted);
        far_ahead.id = SubmissionId(100);
        store.reconcile(far_ahead);

        let new_id = store.create_submission(
            fixtures::sample_submissions(now()).remove(0),
        );
        assert_eq!(new_id, SubmissionId(101));
    }
}
