//! The sample dataset, kept in one place so no other module defines inline
//! dummy records. Tests build on it, and a fresh database can be seeded from
//! it for local walkthroughs.

use std::num::NonZeroU8;

use time::macros::datetime;
use tracing::info;

use crate::{
    languages::Language,
    models::{
        ApprovalRecord, AssignedDeveloper, CostBreakdown, DeveloperId, DistributionChannel,
        GameDetails, NewDeveloper, NewSubmission, PricingRecord, ReleaseChecklist, Submission,
        SubmissionId, SubmissionStatus, TranslationStatus, types::UtcDateTime,
    },
    pipeline::compute_economics,
    repository::{DeveloperRepository, SubmissionRepository},
    slug::slugify_title,
    store::PipelineStore,
};

pub fn sample_submissions(now: UtcDateTime) -> Vec<NewSubmission> {
    vec![
        NewSubmission {
            title: "Fruit Frenzy".to_string(),
            submission_message:
                "The card text is meant to emphasize split-second decisions; feedback welcome."
                    .to_string(),
            game_details: GameDetails {
                theme: "Card game".to_string(),
                player_count: "2-6".to_string(),
                play_time: "15 min".to_string(),
                difficulty: "Easy".to_string(),
                components: vec!["56 cards".to_string(), "1 bell".to_string()],
                rules: "Ring the bell when exactly five of the same fruit are showing".to_string(),
                goal: "Win through reaction speed".to_string(),
            },
            submitted_at: now,
        },
        NewSubmission {
            title: "Harbor Barons".to_string(),
            submission_message: "Please take a close look at the resource balance.".to_string(),
            game_details: GameDetails {
                theme: "Strategy game".to_string(),
                player_count: "3-4".to_string(),
                play_time: "45 min".to_string(),
                difficulty: "Normal".to_string(),
                components: vec!["84 cards".to_string(), "20 tokens".to_string()],
                rules: "Collect resources to construct buildings".to_string(),
                goal: "Score the most points".to_string(),
            },
            submitted_at: now,
        },
        NewSubmission {
            title: "Summit Trek".to_string(),
            submission_message: String::new(),
            game_details: GameDetails {
                theme: "Adventure game".to_string(),
                player_count: "2-4".to_string(),
                play_time: "60 min".to_string(),
                difficulty: "Hard".to_string(),
                components: vec![
                    "1 board".to_string(),
                    "4 pawns".to_string(),
                    "2 dice".to_string(),
                ],
                rules: "An expedition race up the mountain".to_string(),
                goal: "Reach the summit first".to_string(),
            },
            submitted_at: now,
        },
    ]
}

pub fn sample_developers() -> Vec<NewDeveloper> {
    vec![
        NewDeveloper {
            name: "Ji-ho Kim".to_string(),
            specialty: "Card games".to_string(),
            experience_years: 5,
            rating: 4.8,
            completed_games: 12,
            current_projects: 2,
            max_projects: NonZeroU8::new(5).expect("Hard-coded capacity is non-zero"),
        },
        NewDeveloper {
            name: "Min-seo Park".to_string(),
            specialty: "Board games".to_string(),
            experience_years: 7,
            rating: 4.9,
            completed_games: 18,
            current_projects: 1,
            max_projects: NonZeroU8::new(4).expect("Hard-coded capacity is non-zero"),
        },
        NewDeveloper {
            name: "Alex Lee".to_string(),
            specialty: "Strategy games".to_string(),
            experience_years: 3,
            rating: 4.6,
            completed_games: 8,
            current_projects: 3,
            max_projects: NonZeroU8::new(6).expect("Hard-coded capacity is non-zero"),
        },
        NewDeveloper {
            name: "Sam Choi".to_string(),
            specialty: "Puzzle games".to_string(),
            experience_years: 4,
            rating: 4.7,
            completed_games: 10,
            current_projects: 0,
            max_projects: NonZeroU8::new(3).expect("Hard-coded capacity is non-zero"),
        },
    ]
}

/// A single submission staged at `status`, carrying payloads consistent with
/// every stage it has passed. The workhorse of the pipeline tests.
pub fn submission_at(status: SubmissionStatus) -> Submission {
    let submitted_at = UtcDateTime::assume_utc(datetime!(2024-01-15 10:30));
    let reviewed_at = UtcDateTime::assume_utc(datetime!(2024-01-16 9:00));

    let title = "Fruit Frenzy".to_string();
    let mut submission = Submission {
        id: SubmissionId(1),
        slug: slugify_title(&title),
        title,
        status,
        submission_message:
            "The card text is meant to emphasize split-second decisions; feedback welcome."
                .to_string(),
        game_details: GameDetails {
            theme: "Card game".to_string(),
            player_count: "2-6".to_string(),
            play_time: "15 min".to_string(),
            difficulty: "Easy".to_string(),
            components: vec!["56 cards".to_string(), "1 bell".to_string()],
            rules: "Ring the bell when exactly five of the same fruit are showing".to_string(),
            goal: "Win through reaction speed".to_string(),
        },
        submitted_at,
        reviewed_at: None,
        rejection_reason: None,
        assigned_developer: None,
        translation_status: TranslationStatus::Pending,
        pricing: None,
        approval: None,
        release_announced_at: None,
    };

    use SubmissionStatus::*;

    if status != Submitted {
        submission.reviewed_at = Some(reviewed_at);
    }

    if matches!(status, Rejected | FinalRejected) {
        submission.rejection_reason = Some("Needs another design pass".to_string());
        return submission;
    }

    if matches!(
        status,
        DeveloperAssigned | TranslationApproved | PricingCompleted | FinalApproved
    ) {
        submission.assigned_developer = Some(AssignedDeveloper {
            id: DeveloperId(1),
            name: "Ji-ho Kim".to_string(),
            specialty: "Card games".to_string(),
        });
    }

    if matches!(status, TranslationApproved | PricingCompleted | FinalApproved) {
        submission.translation_status = TranslationStatus::Completed;
    }

    if matches!(status, PricingCompleted | FinalApproved) {
        let costs = CostBreakdown {
            development: 500_000.0,
            translation: 200_000.0,
            marketing: 300_000.0,
        };
        let economics = compute_economics(&costs, 15_000.0, 30.0)
            .expect("Hard-coded pricing inputs are valid");
        submission.pricing = Some(PricingRecord {
            costs,
            platform_fee_percent: 30.0,
            suggested_price: 15_000.0,
            economics,
            notes: "Competitive price aimed at overseas markets".to_string(),
        });
    }

    if status == FinalApproved {
        submission.approval = Some(ApprovalRecord {
            final_price: 15_000.0,
            release_date: UtcDateTime::assume_utc(datetime!(2024-03-15 0:00)),
            distribution_channels: vec![
                DistributionChannel::Steam,
                DistributionChannel::BoardGameGeek,
            ],
            marketing_plan: "Social campaign plus board-game cafe demo events".to_string(),
            notes: "All reviews complete, ready to launch".to_string(),
            checklist: ReleaseChecklist {
                quality_checked: true,
                legal_checked: true,
                marketing_approved: true,
            },
        });
    }

    submission
}

/// A store with the dataset staged across the pipeline: one game in plan
/// review, one approved and waiting for a developer, and one mid-translation.
pub fn seeded_store(now: UtcDateTime) -> PipelineStore {
    let mut store = PipelineStore::new();

    for developer in sample_developers() {
        store.register_developer(developer);
    }

    let ids: Vec<SubmissionId> = sample_submissions(now)
        .into_iter()
        .map(|submission| store.create_submission(submission))
        .collect();
    let frenzy_id = ids[0];
    let barons_id = ids[1];

    store
        .approve_plan(frenzy_id, now)
        .expect("A fresh submission can be approved");
    store
        .assign_developer(frenzy_id, DeveloperId(1))
        .expect("Ji-ho Kim has spare capacity");
    store
        .request_translation(frenzy_id, Language::English, now)
        .expect("No English request exists yet");
    store
        .request_translation(frenzy_id, Language::Japanese, now)
        .expect("No Japanese request exists yet");

    store
        .approve_plan(barons_id, now)
        .expect("A fresh submission can be approved");

    store
}

/// Loads the sample dataset into an empty database. Does nothing when any
/// submissions already exist.
pub async fn seed_database(
    submissions: &SubmissionRepository,
    developers: &DeveloperRepository,
) -> Result<(), anyhow::Error> {
    if submissions.count().await? > 0 {
        info!("Database already has submissions, skipping fixture seeding");
        return Ok(());
    }

    let now = UtcDateTime::now();

    for developer in sample_developers() {
        developers.add_developer(&developer).await?;
    }

    for submission in sample_submissions(now) {
        submissions.add_submission(&submission).await?;
    }

    info!("Seeded the database with the fixture dataset");

    Ok(())
}
