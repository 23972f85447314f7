//! Repository for the `client_forms` table (tokenized assignments).

use atelier_core::form_delivery::{CLIENT_FORM_COMPLETED, CLIENT_FORM_PENDING};
use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::client_form::{ClientForm, ClientFormSummary, CreateClientForm};
use crate::models::submission::Submission;

const COLUMNS: &str =
    "id, salon_id, client_id, form_id, token, status, filled_at, filled_by, created_at";

const SUMMARY_SELECT: &str = "\
    SELECT cf.id, cf.salon_id, s.name AS salon_name, cf.client_id, cf.form_id, \
           f.name AS form_name, cf.token, cf.status, cf.filled_at, cf.filled_by, cf.created_at \
    FROM client_forms cf \
    JOIN salons s ON s.id = cf.salon_id \
    JOIN forms f ON f.id = cf.form_id";

const SUBMISSION_COLUMNS: &str =
    "id, salon_id, form_id, client_id, client_form_id, answers, created_at";

pub struct ClientFormRepo;

impl ClientFormRepo {
    /// Insert a pending assignment.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClientForm,
    ) -> Result<ClientForm, sqlx::Error> {
        let query = format!(
            "INSERT INTO client_forms (salon_id, client_id, form_id, token)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClientForm>(&query)
            .bind(input.salon_id)
            .bind(input.client_id)
            .bind(input.form_id)
            .bind(&input.token)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
    ) -> Result<Option<ClientForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_forms WHERE salon_id = $1 AND id = $2");
        sqlx::query_as::<_, ClientForm>(&query)
            .bind(salon_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an assignment by its public token, whatever its status.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<ClientForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client_forms WHERE token = $1");
        sqlx::query_as::<_, ClientForm>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// A client's assignments, newest first.
    pub async fn list_by_client(
        pool: &PgPool,
        salon_id: DbId,
        client_id: DbId,
    ) -> Result<Vec<ClientFormSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE cf.salon_id = $1 AND cf.client_id = $2
             ORDER BY cf.created_at DESC, cf.id DESC"
        );
        sqlx::query_as::<_, ClientFormSummary>(&query)
            .bind(salon_id)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Pending assignments of every client record linked to a portal user.
    pub async fn list_pending_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ClientFormSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             JOIN clients c ON c.id = cf.client_id
             WHERE c.user_id = $1 AND cf.status = $2
             ORDER BY cf.created_at DESC, cf.id DESC"
        );
        sqlx::query_as::<_, ClientFormSummary>(&query)
            .bind(user_id)
            .bind(CLIENT_FORM_PENDING)
            .fetch_all(pool)
            .await
    }

    /// Complete a pending assignment and record its submission atomically.
    ///
    /// Returns `None` without writing anything when the token does not name a
    /// pending assignment, including when a concurrent request completed it
    /// first.
    pub async fn complete_with_submission(
        pool: &PgPool,
        token: &str,
        filled_by: &str,
        answers: &serde_json::Value,
    ) -> Result<Option<(ClientForm, Submission)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(client_form) = Self::mark_completed(&mut tx, token, filled_by).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO submissions (salon_id, form_id, client_id, client_form_id, answers)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SUBMISSION_COLUMNS}"
        );
        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(client_form.salon_id)
            .bind(client_form.form_id)
            .bind(client_form.client_id)
            .bind(client_form.id)
            .bind(answers)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((client_form, submission)))
    }

    /// Conditional `pending -> completed` transition inside a transaction.
    async fn mark_completed(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        token: &str,
        filled_by: &str,
    ) -> Result<Option<ClientForm>, sqlx::Error> {
        let query = format!(
            "UPDATE client_forms
             SET status = $3, filled_at = NOW(), filled_by = $4
             WHERE token = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClientForm>(&query)
            .bind(token)
            .bind(CLIENT_FORM_PENDING)
            .bind(CLIENT_FORM_COMPLETED)
            .bind(filled_by)
            .fetch_optional(&mut **tx)
            .await
    }

    pub async fn delete(pool: &PgPool, salon_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM client_forms WHERE salon_id = $1 AND id = $2")
            .bind(salon_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
