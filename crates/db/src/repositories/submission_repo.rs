//! Repository for the `submissions` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::submission::{CreateSubmission, Submission, SubmissionSummary};

const COLUMNS: &str = "id, salon_id, form_id, client_id, client_form_id, answers, created_at";

const SUMMARY_SELECT: &str = "\
    SELECT sub.id, sub.salon_id, sub.form_id, f.name AS form_name, sub.client_id, \
           sub.client_form_id, sub.answers, sub.created_at \
    FROM submissions sub \
    JOIN forms f ON f.id = sub.form_id";

pub struct SubmissionRepo;

impl SubmissionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubmission,
    ) -> Result<Submission, sqlx::Error> {
        let query = format!(
            "INSERT INTO submissions (salon_id, form_id, client_id, client_form_id, answers)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(input.salon_id)
            .bind(input.form_id)
            .bind(input.client_id)
            .bind(input.client_form_id)
            .bind(&input.answers)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE salon_id = $1 AND id = $2");
        sqlx::query_as::<_, Submission>(&query)
            .bind(salon_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A client's submissions, newest first.
    pub async fn list_by_client(
        pool: &PgPool,
        salon_id: DbId,
        client_id: DbId,
    ) -> Result<Vec<SubmissionSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE sub.salon_id = $1 AND sub.client_id = $2
             ORDER BY sub.created_at DESC, sub.id DESC"
        );
        sqlx::query_as::<_, SubmissionSummary>(&query)
            .bind(salon_id)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Every submission of a form, including public ones without a client.
    pub async fn list_by_form(
        pool: &PgPool,
        salon_id: DbId,
        form_id: DbId,
    ) -> Result<Vec<SubmissionSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE sub.salon_id = $1 AND sub.form_id = $2
             ORDER BY sub.created_at DESC, sub.id DESC"
        );
        sqlx::query_as::<_, SubmissionSummary>(&query)
            .bind(salon_id)
            .bind(form_id)
            .fetch_all(pool)
            .await
    }

    /// Submissions of every client record linked to a portal user.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SubmissionSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             JOIN clients c ON c.id = sub.client_id
             WHERE c.user_id = $1
             ORDER BY sub.created_at DESC, sub.id DESC"
        );
        sqlx::query_as::<_, SubmissionSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Which of `form_ids` the client has at least one submission for.
    pub async fn submitted_form_ids(
        pool: &PgPool,
        client_id: DbId,
        form_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if form_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT form_id FROM submissions
             WHERE client_id = $1 AND form_id = ANY($2)",
        )
        .bind(client_id)
        .bind(form_ids)
        .fetch_all(pool)
        .await
    }

    /// Delete a submission, returning the removed row.
    pub async fn delete(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!(
            "DELETE FROM submissions WHERE salon_id = $1 AND id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(salon_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
