//! Salon scoping, role checks and the client portal.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_as, delete_auth, form_body, get_auth, next_week, post_json,
    post_json_auth, put_json_auth, register_owner, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn owners_cannot_reach_other_salons(pool: PgPool) {
    let app = common::build_test_app(pool);
    let alice = register_owner(app.clone(), "alice@lumen.test").await;
    let bob = register_owner(app.clone(), "bob@lumen.test").await;
    let client = create_as(app.clone(), &alice, "/clients", json!({ "first_name": "Eva" })).await;

    let uri = format!("/api/v1/salons/{}/clients", alice.salon_id);
    let response = get_auth(app.clone(), &uri, &bob.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Bob's salon id with Alice's client id: scoped lookup finds nothing.
    let uri = format!("/api/v1/salons/{}/clients/{}", bob.salon_id, client["id"]);
    let response = get_auth(app.clone(), &uri, &bob.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, "/api/v1/salons/999999", &bob.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_search_matches_name_email_and_phone(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "search@lumen.test").await;
    create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Joana", "email": "joana@mail.test" })).await;
    create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Marta", "phone": "+351 912" })).await;

    let uri = format!("/api/v1/salons/{}/clients?search=joana", owner.salon_id);
    let json = body_json(get_auth(app.clone(), &uri, &owner.token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/salons/{}/clients?search=912", owner.salon_id);
    let json = body_json(get_auth(app, &uri, &owner.token).await).await;
    assert_eq!(json["data"][0]["first_name"], "Marta");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn forms_with_submissions_cannot_be_deleted(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "keep@lumen.test").await;
    let client = create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Lia" })).await;
    let form = create_as(app.clone(), &owner, "/forms", form_body("Consent")).await;
    create_as(
        app.clone(),
        &owner,
        &format!("/clients/{}/submissions", client["id"]),
        json!({ "form_id": form["id"], "answers": { "full_name": "Lia" } }),
    )
    .await;

    let uri = format!("/api/v1/salons/{}/forms/{}", owner.salon_id, form["id"]);
    let response = delete_auth(app.clone(), &uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = common::put_json_auth(
        app,
        &uri,
        json!({ "fields": [{ "name": "other", "type": "text" }] }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn portal_lists_only_the_clients_own_records(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "portal@lumen.test").await;
    let client = create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Nuno" })).await;
    let stranger = create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Other" })).await;
    let form = create_as(app.clone(), &owner, "/forms", form_body("Consent")).await;

    for c in [&client, &stranger] {
        create_as(
            app.clone(),
            &owner,
            &format!("/clients/{}/forms", c["id"]),
            json!({ "form_id": form["id"] }),
        )
        .await;
        create_as(
            app.clone(),
            &owner,
            "/appointments",
            json!({ "client_id": c["id"], "starts_at": common::next_week() }),
        )
        .await;
    }

    let uri = format!(
        "/api/v1/salons/{}/clients/{}/portal-access",
        owner.salon_id, client["id"]
    );
    let response = post_json_auth(
        app.clone(),
        &uri,
        json!({ "email": "nuno@mail.test", "password": TEST_PASSWORD }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let again = post_json_auth(
        app.clone(),
        &uri,
        json!({ "email": "nuno@mail.test" }),
        &owner.token,
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let login = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "email": "nuno@mail.test", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let token = body_json(login).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let forms = body_json(get_auth(app.clone(), "/api/v1/portal/forms", &token).await).await;
    let forms = forms["data"].as_array().unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["client_id"], client["id"]);
    assert!(forms[0]["link"].as_str().unwrap().starts_with("http://forms.test/f/"));

    let appts =
        body_json(get_auth(app.clone(), "/api/v1/portal/appointments", &token).await).await;
    let appts = appts["data"].as_array().unwrap();
    assert_eq!(appts.len(), 1);
    assert_eq!(appts[0]["status"], "scheduled");

    let subs = body_json(get_auth(app.clone(), "/api/v1/portal/submissions", &token).await).await;
    assert!(subs["data"].as_array().unwrap().is_empty());

    // Client tokens cannot reach owner routes, and owners cannot use the portal.
    let response = get_auth(app.clone(), "/api/v1/salons", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = get_auth(app, "/api/v1/portal/forms", &owner.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_submission_removes_its_assignment(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "undo@lumen.test").await;
    let client = create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Teo" })).await;
    let form = create_as(app.clone(), &owner, "/forms", form_body("Consent")).await;
    let assignment = create_as(
        app.clone(),
        &owner,
        &format!("/clients/{}/forms", client["id"]),
        json!({ "form_id": form["id"] }),
    )
    .await;
    let token = assignment["token"].as_str().unwrap();
    let response = post_json(
        app.clone(),
        &format!("/f/{token}"),
        json!({ "answers": { "full_name": "Teo" } }),
    )
    .await;
    let submission_id = body_json(response).await["data"]["submission_id"].clone();

    let uri = format!("/api/v1/salons/{}/submissions/{submission_id}", owner.salon_id);
    let response = delete_auth(app.clone(), &uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let uri = format!("/api/v1/salons/{}/clients/{}/forms", owner.salon_id, client["id"]);
    let json = body_json(get_auth(app, &uri, &owner.token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_required_submission_reopens_the_appointment(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "reopen@lumen.test").await;
    let client = create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Lia" })).await;
    let form = create_as(app.clone(), &owner, "/forms", form_body("Consent")).await;
    let treatment = create_as(app.clone(), &owner, "/treatments", json!({ "name": "Laser" })).await;
    let uri = format!(
        "/api/v1/salons/{}/treatments/{}/forms",
        owner.salon_id, treatment["id"]
    );
    let response =
        put_json_auth(app.clone(), &uri, json!({ "form_ids": [form["id"]] }), &owner.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let appointment = create_as(
        app.clone(),
        &owner,
        "/appointments",
        json!({
            "client_id": client["id"],
            "treatment_id": treatment["id"],
            "starts_at": next_week(),
        }),
    )
    .await;
    assert_eq!(appointment["status"], "pending_forms");
    let appointment_uri = format!(
        "/api/v1/salons/{}/appointments/{}",
        owner.salon_id, appointment["id"]
    );

    let assignment = create_as(
        app.clone(),
        &owner,
        &format!("/clients/{}/forms", client["id"]),
        json!({ "form_id": form["id"] }),
    )
    .await;
    let token = assignment["token"].as_str().unwrap();
    let response = post_json(
        app.clone(),
        &format!("/f/{token}"),
        json!({ "answers": { "full_name": "Lia" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let submission_id = body_json(response).await["data"]["submission_id"].clone();

    let json = body_json(get_auth(app.clone(), &appointment_uri, &owner.token).await).await;
    assert_eq!(json["data"]["status"], "scheduled");

    let uri = format!("/api/v1/salons/{}/submissions/{submission_id}", owner.salon_id);
    let response = delete_auth(app.clone(), &uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app, &appointment_uri, &owner.token).await).await;
    assert_eq!(json["data"]["status"], "pending_forms");
}
