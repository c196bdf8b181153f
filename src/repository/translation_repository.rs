use sqlx::{query, query_as, FromRow, Pool, Sqlite};

use crate::{
    languages::Language,
    models::{
        NewTranslationRequest, SubmissionId, TranslationRequest, TranslationRequestId,
        TranslationReview, TranslationStatus, types::UtcDateTime,
    },
    repository::conversion::DBConvertible,
};

use super::conversion::{DBFromConversionError, DBToConversionError};

#[derive(Debug)]
pub struct TranslationRepository {
    pool: Pool<Sqlite>,
}

impl TranslationRepository {
    pub fn new(pool: Pool<Sqlite>) -> TranslationRepository {
        TranslationRepository { pool }
    }

    pub async fn add_request(
        &self,
        new: &NewTranslationRequest,
    ) -> Result<TranslationRequest, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let added = {
            let submission_id = new.submission_id.to_db()?;
            let language = new.language.to_db()?;
            let status = TranslationStatus::Pending.to_db()?;
            let requested_at = new.requested_at.to_db()?;

            query_as::<_, SqlTranslationRequest>(
                r#"
                INSERT INTO translation_requests (submission_id, language, status, requested_at)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(submission_id)
            .bind(language)
            .bind(status)
            .bind(requested_at)
            .fetch_one(&mut *transaction)
            .await?
        };

        transaction.commit().await?;

        Ok(TranslationRequest::from_db(&added)?)
    }

    pub async fn get_requests_for(
        &self,
        submission_id: SubmissionId,
    ) -> Result<Vec<TranslationRequest>, anyhow::Error> {
        let rows = query_as::<_, SqlTranslationRequest>(
            r#"SELECT * FROM translation_requests WHERE submission_id = $1 ORDER BY id"#,
        )
        .bind(submission_id.to_db()?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(TranslationRequest::from_db(row)?))
            .collect()
    }

    pub async fn update_request(
        &self,
        request: &TranslationRequest,
    ) -> Result<(), anyhow::Error> {
        let row = request.to_db()?;

        query(
            r#"
            UPDATE translation_requests SET
                status = $2,
                translator = $3,
                completed_at = $4,
                review_approved = $5,
                review_notes = $6,
                reviewed_at = $7
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(row.status)
        .bind(row.translator)
        .bind(row.completed_at)
        .bind(row.review_approved)
        .bind(row.review_notes)
        .bind(row.reviewed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_request(&self, id: TranslationRequestId) -> Result<bool, anyhow::Error> {
        let result = query(r#"DELETE FROM translation_requests WHERE id = $1"#)
            .bind(id.to_db()?)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, FromRow)]
pub struct SqlTranslationRequest {
    id: i64,
    submission_id: i64,
    language: String,
    status: String,
    translator: Option<String>,
    requested_at: String,
    completed_at: Option<String>,
    review_approved: Option<bool>,
    review_notes: Option<String>,
    reviewed_at: Option<String>,
}

impl DBConvertible for TranslationRequest {
    type DBType = SqlTranslationRequest;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        let (review_approved, review_notes, reviewed_at) = match &self.review {
            Some(review) => (
                Some(review.approved),
                Some(review.notes.clone()),
                Some(review.reviewed_at.to_db()?),
            ),
            None => (None, None, None),
        };

        Ok(SqlTranslationRequest {
            id: self.id.to_db()?,
            submission_id: self.submission_id.to_db()?,
            language: self.language.to_db()?,
            status: self.status.to_db()?,
            translator: self.translator.clone(),
            requested_at: self.requested_at.to_db()?,
            completed_at: self.completed_at.map(|at| at.to_db()).transpose()?,
            review_approved,
            review_notes,
            reviewed_at,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        let review = match (&value.review_approved, &value.review_notes, &value.reviewed_at) {
            (Some(approved), Some(notes), Some(reviewed_at)) => Some(TranslationReview {
                approved: *approved,
                notes: notes.clone(),
                reviewed_at: UtcDateTime::from_db(reviewed_at)?,
            }),
            (None, None, None) => None,
            _ => return Err(DBFromConversionError::InconsistentStage("translation review")),
        };

        Ok(TranslationRequest {
            id: TranslationRequestId::from_db(&value.id)?,
            submission_id: SubmissionId::from_db(&value.submission_id)?,
            language: Language::from_db(&value.language)?,
            status: TranslationStatus::from_db(&value.status)?,
            translator: value.translator.clone(),
            requested_at: UtcDateTime::from_db(&value.requested_at)?,
            completed_at: value
                .completed_at
                .as_ref()
                .map(UtcDateTime::from_db)
                .transpose()?,
            review,
        })
    }
}
