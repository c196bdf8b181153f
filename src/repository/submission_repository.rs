use sqlx::{query, query_as, query_scalar, FromRow, Pool, Sqlite};
use tokio::sync::broadcast::{Receiver, Sender};

use crate::{
    models::{
        ApprovalRecord, AssignedDeveloper, CostBreakdown, NewSubmission, Submission, SubmissionId,
        SubmissionStatus, TranslationStatus, GameDetails, types::UtcDateTime,
    },
    pipeline::build_pricing_record,
    repository::conversion::DBConvertible,
    slug::slugify_title,
};

use super::conversion::{DBFromConversionError, DBToConversionError};

#[derive(Debug)]
pub struct SubmissionRepository {
    pool: Pool<Sqlite>,
    events: Sender<SubmissionStoreEvent>,
}

#[derive(Clone, Copy, Debug)]
pub enum SubmissionStoreEvent {
    SubmissionsUpdated,
}

impl SubmissionRepository {
    pub fn new(pool: Pool<Sqlite>) -> SubmissionRepository {
        SubmissionRepository {
            pool,
            events: tokio::sync::broadcast::channel(128).0,
        }
    }

    pub async fn add_submission(
        &self,
        new: &NewSubmission,
    ) -> Result<Submission, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let added = {
            let status = SubmissionStatus::Submitted.to_db()?;
            let translation_status = TranslationStatus::Pending.to_db()?;
            let components = new.game_details.components.to_db()?;
            let submitted_at = new.submitted_at.to_db()?;

            query_as::<_, SqlSubmission>(
                r#"
                INSERT INTO submissions (
                    slug, title, status, submission_message,
                    theme, player_count, play_time, difficulty, components, rules, goal,
                    submitted_at, translation_status)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                RETURNING *
                "#,
            )
            .bind(slugify_title(&new.title))
            .bind(&new.title)
            .bind(status)
            .bind(&new.submission_message)
            .bind(&new.game_details.theme)
            .bind(&new.game_details.player_count)
            .bind(&new.game_details.play_time)
            .bind(&new.game_details.difficulty)
            .bind(components)
            .bind(&new.game_details.rules)
            .bind(&new.game_details.goal)
            .bind(submitted_at)
            .bind(translation_status)
            .fetch_one(&mut *transaction)
            .await?
        };

        transaction.commit().await?;

        let _ = self.events.send(SubmissionStoreEvent::SubmissionsUpdated); // Don't care if it actually gets received

        Ok(Submission::from_db(&added)?)
    }

    pub async fn get_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<Submission>, anyhow::Error> {
        let row = query_as::<_, SqlSubmission>(r#"SELECT * FROM submissions WHERE id = $1"#)
            .bind(id.to_db()?)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Submission::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_submissions_by_status(
        &self,
        status: SubmissionStatus,
    ) -> Result<Vec<Submission>, anyhow::Error> {
        let rows = query_as::<_, SqlSubmission>(
            r#"SELECT * FROM submissions WHERE status = $1 ORDER BY id"#,
        )
        .bind(status.to_db()?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(Submission::from_db(row)?))
            .collect()
    }

    pub async fn count(&self) -> Result<i64, anyhow::Error> {
        let count: i64 = query_scalar(r#"SELECT COUNT(*) FROM submissions"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Persists every mutable column of a submission. The identity columns
    /// (slug, title, game details, submitted_at) are fixed at intake.
    pub async fn save(&self, submission: &Submission) -> Result<(), anyhow::Error> {
        let row = submission.to_db()?;

        let mut transaction = self.pool.begin().await?;

        query(
            r#"
            UPDATE submissions SET
                status = $2,
                reviewed_at = $3,
                rejection_reason = $4,
                developer_id = $5,
                developer_name = $6,
                developer_specialty = $7,
                translation_status = $8,
                development_cost = $9,
                translation_cost = $10,
                marketing_cost = $11,
                platform_fee_percent = $12,
                suggested_price = $13,
                pricing_notes = $14,
                final_price = $15,
                release_date = $16,
                distribution_channels = $17,
                marketing_plan = $18,
                approval_notes = $19,
                quality_checked = $20,
                legal_checked = $21,
                marketing_approved = $22,
                release_announced_at = $23
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(row.status)
        .bind(row.reviewed_at)
        .bind(row.rejection_reason)
        .bind(row.developer_id)
        .bind(row.developer_name)
        .bind(row.developer_specialty)
        .bind(row.translation_status)
        .bind(row.development_cost)
        .bind(row.translation_cost)
        .bind(row.marketing_cost)
        .bind(row.platform_fee_percent)
        .bind(row.suggested_price)
        .bind(row.pricing_notes)
        .bind(row.final_price)
        .bind(row.release_date)
        .bind(row.distribution_channels)
        .bind(row.marketing_plan)
        .bind(row.approval_notes)
        .bind(row.quality_checked)
        .bind(row.legal_checked)
        .bind(row.marketing_approved)
        .bind(row.release_announced_at)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        let _ = self.events.send(SubmissionStoreEvent::SubmissionsUpdated); // Don't care if it actually gets received

        Ok(())
    }

    pub async fn update_translation_status(
        &self,
        id: SubmissionId,
        status: TranslationStatus,
    ) -> Result<(), anyhow::Error> {
        query(r#"UPDATE submissions SET translation_status = $2 WHERE id = $1"#)
            .bind(id.to_db()?)
            .bind(status.to_db()?)
            .execute(&self.pool)
            .await?;

        let _ = self.events.send(SubmissionStoreEvent::SubmissionsUpdated); // Don't care if it actually gets received

        Ok(())
    }

    /// Approved games whose release date has arrived and which have not been
    /// announced yet.
    pub async fn get_due_releases(
        &self,
        now: UtcDateTime,
    ) -> Result<Vec<Submission>, anyhow::Error> {
        let rows = query_as::<_, SqlSubmission>(
            r#"
            SELECT * FROM submissions
            WHERE status = $1
                AND release_date IS NOT NULL
                AND release_date <= $2
                AND release_announced_at IS NULL
            ORDER BY release_date
            "#,
        )
        .bind(SubmissionStatus::FinalApproved.to_db()?)
        .bind(now.to_db()?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(Submission::from_db(row)?))
            .collect()
    }

    pub async fn mark_release_announced(
        &self,
        id: SubmissionId,
        at: UtcDateTime,
    ) -> Result<(), anyhow::Error> {
        query(r#"UPDATE submissions SET release_announced_at = $2 WHERE id = $1"#)
            .bind(id.to_db()?)
            .bind(at.to_db()?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The earliest unannounced release strictly after `after`, used to
    /// schedule the next service wake-up.
    pub async fn get_next_release_date(
        &self,
        after: UtcDateTime,
    ) -> Result<Option<UtcDateTime>, anyhow::Error> {
        let next: Option<String> = query_scalar(
            r#"
            SELECT MIN(release_date) FROM submissions
            WHERE status = $1 AND release_announced_at IS NULL AND release_date > $2
            "#,
        )
        .bind(SubmissionStatus::FinalApproved.to_db()?)
        .bind(after.to_db()?)
        .fetch_one(&self.pool)
        .await?;

        match next {
            Some(date) => Ok(Some(UtcDateTime::from_db(&date)?)),
            None => Ok(None),
        }
    }

    pub fn subscribe(&self) -> Receiver<SubmissionStoreEvent> {
        self.events.subscribe()
    }
}

#[derive(Debug, FromRow)]
pub struct SqlSubmission {
    id: i64,
    slug: String,
    title: String,
    status: String,
    submission_message: String,
    theme: String,
    player_count: String,
    play_time: String,
    difficulty: String,
    components: String,
    rules: String,
    goal: String,
    submitted_at: String,
    reviewed_at: Option<String>,
    rejection_reason: Option<String>,
    developer_id: Option<i64>,
    developer_name: Option<String>,
    developer_specialty: Option<String>,
    translation_status: String,
    development_cost: Option<f64>,
    translation_cost: Option<f64>,
    marketing_cost: Option<f64>,
    platform_fee_percent: Option<f64>,
    suggested_price: Option<f64>,
    pricing_notes: Option<String>,
    final_price: Option<f64>,
    release_date: Option<String>,
    distribution_channels: Option<String>,
    marketing_plan: Option<String>,
    approval_notes: Option<String>,
    quality_checked: Option<bool>,
    legal_checked: Option<bool>,
    marketing_approved: Option<bool>,
    release_announced_at: Option<String>,
}

impl DBConvertible for Submission {
    type DBType = SqlSubmission;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        let (developer_id, developer_name, developer_specialty) = match &self.assigned_developer {
            Some(developer) => (
                Some(developer.id.to_db()?),
                Some(developer.name.clone()),
                Some(developer.specialty.clone()),
            ),
            None => (None, None, None),
        };

        let (
            development_cost,
            translation_cost,
            marketing_cost,
            platform_fee_percent,
            suggested_price,
            pricing_notes,
        ) = match &self.pricing {
            Some(pricing) => (
                Some(pricing.costs.development),
                Some(pricing.costs.translation),
                Some(pricing.costs.marketing),
                Some(pricing.platform_fee_percent),
                Some(pricing.suggested_price),
                Some(pricing.notes.clone()),
            ),
            None => (None, None, None, None, None, None),
        };

        let (
            final_price,
            release_date,
            distribution_channels,
            marketing_plan,
            approval_notes,
            quality_checked,
            legal_checked,
            marketing_approved,
        ) = match &self.approval {
            Some(approval) => (
                Some(approval.final_price),
                Some(approval.release_date.to_db()?),
                Some(approval.distribution_channels.to_db()?),
                Some(approval.marketing_plan.clone()),
                Some(approval.notes.clone()),
                Some(approval.checklist.quality_checked),
                Some(approval.checklist.legal_checked),
                Some(approval.checklist.marketing_approved),
            ),
            None => (None, None, None, None, None, None, None, None),
        };

        Ok(SqlSubmission {
            id: self.id.to_db()?,
            slug: self.slug.clone(),
            title: self.title.clone(),
            status: self.status.to_db()?,
            submission_message: self.submission_message.clone(),
            theme: self.game_details.theme.clone(),
            player_count: self.game_details.player_count.clone(),
            play_time: self.game_details.play_time.clone(),
            difficulty: self.game_details.difficulty.clone(),
            components: self.game_details.components.to_db()?,
            rules: self.game_details.rules.clone(),
            goal: self.game_details.goal.clone(),
            submitted_at: self.submitted_at.to_db()?,
            reviewed_at: self.reviewed_at.map(|at| at.to_db()).transpose()?,
            rejection_reason: self.rejection_reason.clone(),
            developer_id,
            developer_name,
            developer_specialty,
            translation_status: self.translation_status.to_db()?,
            development_cost,
            translation_cost,
            marketing_cost,
            platform_fee_percent,
            suggested_price,
            pricing_notes,
            final_price,
            release_date,
            distribution_channels,
            marketing_plan,
            approval_notes,
            quality_checked,
            legal_checked,
            marketing_approved,
            release_announced_at: self.release_announced_at.map(|at| at.to_db()).transpose()?,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        let assigned_developer = match (
            &value.developer_id,
            &value.developer_name,
            &value.developer_specialty,
        ) {
            (Some(id), Some(name), Some(specialty)) => Some(AssignedDeveloper {
                id: crate::models::DeveloperId::from_db(id)?,
                name: name.clone(),
                specialty: specialty.clone(),
            }),
            (None, None, None) => None,
            _ => return Err(DBFromConversionError::InconsistentStage("assigned developer")),
        };

        let pricing = match (
            value.development_cost,
            value.translation_cost,
            value.marketing_cost,
            value.platform_fee_percent,
            value.suggested_price,
        ) {
            (Some(development), Some(translation), Some(marketing), Some(fee), Some(price)) => {
                let costs = CostBreakdown {
                    development,
                    translation,
                    marketing,
                };
                let notes = value.pricing_notes.clone().unwrap_or_default();
                Some(build_pricing_record(costs, price, fee, &notes)?)
            }
            (None, None, None, None, None) => None,
            _ => return Err(DBFromConversionError::InconsistentStage("pricing")),
        };

        let approval = match (
            value.final_price,
            &value.release_date,
            &value.distribution_channels,
        ) {
            (Some(final_price), Some(release_date), Some(channels)) => {
                let (quality_checked, legal_checked, marketing_approved) = match (
                    value.quality_checked,
                    value.legal_checked,
                    value.marketing_approved,
                ) {
                    (Some(quality), Some(legal), Some(marketing)) => (quality, legal, marketing),
                    _ => return Err(DBFromConversionError::InconsistentStage("approval checklist")),
                };

                Some(ApprovalRecord {
                    final_price,
                    release_date: UtcDateTime::from_db(release_date)?,
                    distribution_channels: Vec::from_db(channels)?,
                    marketing_plan: value.marketing_plan.clone().unwrap_or_default(),
                    notes: value.approval_notes.clone().unwrap_or_default(),
                    checklist: crate::models::ReleaseChecklist {
                        quality_checked,
                        legal_checked,
                        marketing_approved,
                    },
                })
            }
            (None, None, None) => None,
            _ => return Err(DBFromConversionError::InconsistentStage("approval")),
        };

        Ok(Submission {
            id: SubmissionId::from_db(&value.id)?,
            slug: value.slug.clone(),
            title: value.title.clone(),
            status: SubmissionStatus::from_db(&value.status)?,
            submission_message: value.submission_message.clone(),
            game_details: GameDetails {
                theme: value.theme.clone(),
                player_count: value.player_count.clone(),
                play_time: value.play_time.clone(),
                difficulty: value.difficulty.clone(),
                components: Vec::from_db(&value.components)?,
                rules: value.rules.clone(),
                goal: value.goal.clone(),
            },
            submitted_at: UtcDateTime::from_db(&value.submitted_at)?,
            reviewed_at: value
                .reviewed_at
                .as_ref()
                .map(UtcDateTime::from_db)
                .transpose()?,
            rejection_reason: value.rejection_reason.clone(),
            assigned_developer,
            translation_status: TranslationStatus::from_db(&value.translation_status)?,
            pricing,
            approval,
            release_announced_at: value
                .release_announced_at
                .as_ref()
                .map(UtcDateTime::from_db)
                .transpose()?,
        })
    }
}
