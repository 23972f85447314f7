//! Integration tests for tokenized form delivery at the repository level.

use assert_matches::assert_matches;
use sqlx::PgPool;

use atelier_core::form_delivery::{generate_form_token, CLIENT_FORM_COMPLETED, CLIENT_FORM_PENDING};
use atelier_db::models::client::CreateClient;
use atelier_db::models::client_form::CreateClientForm;
use atelier_db::models::form::CreateForm;
use atelier_db::models::salon::CreateSalon;
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{
    ClientFormRepo, ClientRepo, FormRepo, SalonRepo, SubmissionRepo, UserRepo,
};

struct Fixture {
    salon_id: i64,
    client_id: i64,
    form_id: i64,
}

async fn setup(pool: &PgPool) -> Fixture {
    let owner = UserRepo::create(
        pool,
        &CreateUser {
            email: "owner@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "owner".to_string(),
        },
    )
    .await
    .unwrap();
    let salon = SalonRepo::create(
        pool,
        &CreateSalon {
            owner_id: owner.id,
            name: "Studio".to_string(),
            phone: None,
            email: None,
            address: None,
        },
    )
    .await
    .unwrap();
    let client = ClientRepo::create(
        pool,
        &CreateClient {
            salon_id: salon.id,
            first_name: "Ana".to_string(),
            last_name: None,
            email: None,
            phone: None,
            date_of_birth: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let form = FormRepo::create(
        pool,
        &CreateForm {
            salon_id: salon.id,
            name: "Consent".to_string(),
            description: None,
            fields: None,
            is_active: None,
        },
    )
    .await
    .unwrap();

    Fixture {
        salon_id: salon.id,
        client_id: client.id,
        form_id: form.id,
    }
}

async fn assign(pool: &PgPool, fx: &Fixture) -> String {
    let token = generate_form_token();
    let assignment = ClientFormRepo::create(
        pool,
        &CreateClientForm {
            salon_id: fx.salon_id,
            client_id: fx.client_id,
            form_id: fx.form_id,
            token: token.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(assignment.status, CLIENT_FORM_PENDING);
    assert!(assignment.filled_at.is_none());
    token
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_completes_once(pool: PgPool) {
    let fx = setup(&pool).await;
    let token = assign(&pool, &fx).await;
    let answers = serde_json::json!({"agree": true});

    let first = ClientFormRepo::complete_with_submission(&pool, &token, "Ana", &answers)
        .await
        .unwrap();
    let (assignment, submission) = first.expect("pending token should complete");
    assert_eq!(assignment.status, CLIENT_FORM_COMPLETED);
    assert_eq!(assignment.filled_by.as_deref(), Some("Ana"));
    assert!(assignment.filled_at.is_some());
    assert_eq!(submission.client_id, Some(fx.client_id));
    assert_eq!(submission.client_form_id, Some(assignment.id));

    let second = ClientFormRepo::complete_with_submission(&pool, &token, "Ana", &answers)
        .await
        .unwrap();
    assert_matches!(second, None);

    let rows = SubmissionRepo::list_by_client(&pool, fx.salon_id, fx.client_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "second attempt must not insert a submission");
    assert_eq!(rows[0].form_name, "Consent");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_token_writes_nothing(pool: PgPool) {
    let fx = setup(&pool).await;
    let result = ClientFormRepo::complete_with_submission(
        &pool,
        &generate_form_token(),
        "client",
        &serde_json::json!({}),
    )
    .await
    .unwrap();
    assert!(result.is_none());
    assert!(SubmissionRepo::list_by_form(&pool, fx.salon_id, fx.form_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_assignment_survives_submission_delete(pool: PgPool) {
    let fx = setup(&pool).await;
    let token = assign(&pool, &fx).await;
    let (assignment, submission) = ClientFormRepo::complete_with_submission(
        &pool,
        &token,
        "client",
        &serde_json::json!({"agree": true}),
    )
    .await
    .unwrap()
    .unwrap();

    let removed = SubmissionRepo::delete(&pool, fx.salon_id, submission.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(removed.client_form_id, Some(assignment.id));

    let kept = ClientFormRepo::find_by_token(&pool, &token).await.unwrap().unwrap();
    assert_eq!(kept.status, CLIENT_FORM_COMPLETED);

    assert!(ClientFormRepo::delete(&pool, fx.salon_id, assignment.id)
        .await
        .unwrap());
    assert!(ClientFormRepo::find_by_id(&pool, fx.salon_id, assignment.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_portal_pending_listing(pool: PgPool) {
    let fx = setup(&pool).await;
    let portal_user = UserRepo::create(
        &pool,
        &CreateUser {
            email: "ana@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "client".to_string(),
        },
    )
    .await
    .unwrap();
    ClientRepo::link_user(&pool, fx.salon_id, fx.client_id, portal_user.id)
        .await
        .unwrap()
        .unwrap();

    let done = assign(&pool, &fx).await;
    let open = assign(&pool, &fx).await;
    ClientFormRepo::complete_with_submission(&pool, &done, "client", &serde_json::json!({}))
        .await
        .unwrap()
        .unwrap();

    let pending = ClientFormRepo::list_pending_for_user(&pool, portal_user.id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].token, open);
    assert_eq!(pending[0].salon_name, "Studio");

    let all = ClientFormRepo::list_by_client(&pool, fx.salon_id, fx.client_id)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}
