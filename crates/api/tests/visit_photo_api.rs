//! Visit photo upload, download and deletion.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_json, create_as, delete_auth, get_auth, register_owner, send, Owner};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;

const BOUNDARY: &str = "atelier-test-boundary";

fn multipart_body(filename: &str, bytes: &[u8], caption: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
    if let Some(caption) = caption {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\n{caption}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(
    app: axum::Router,
    owner: &Owner,
    appointment_id: i64,
    body: Vec<u8>,
) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!(
            "/api/v1/salons/{}/appointments/{appointment_id}/photos",
            owner.salon_id
        ))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", owner.token))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn appointment(app: axum::Router, owner: &Owner) -> i64 {
    let client = create_as(app.clone(), owner, "/clients", json!({ "first_name": "Bia" })).await;
    let appt = create_as(
        app,
        owner,
        "/appointments",
        json!({ "client_id": client["id"], "starts_at": common::next_week() }),
    )
    .await;
    appt["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn photo_round_trip(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "photo@lumen.test").await;
    let appointment_id = appointment(app.clone(), &owner).await;
    let bytes = b"\x89PNG fake image bytes";

    let response = upload(
        app.clone(),
        &owner,
        appointment_id,
        multipart_body("After.PNG", bytes, Some("after treatment")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let photo = body_json(response).await["data"].clone();
    assert_eq!(photo["content_type"], "image/png");
    assert_eq!(photo["caption"], "after treatment");
    assert_eq!(photo["file_size_bytes"], bytes.len());

    let base = format!(
        "/api/v1/salons/{}/appointments/{appointment_id}/photos",
        owner.salon_id
    );
    let list = body_json(get_auth(app.clone(), &base, &owner.token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let photo_uri = format!("{base}/{}", photo["id"]);
    let response = get_auth(app.clone(), &photo_uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], bytes);

    let response = delete_auth(app.clone(), &photo_uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app, &photo_uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unsupported_and_empty_uploads_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "reject@lumen.test").await;
    let appointment_id = appointment(app.clone(), &owner).await;

    let response = upload(
        app.clone(),
        &owner,
        appointment_id,
        multipart_body("notes.pdf", b"%PDF", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = upload(
        app.clone(),
        &owner,
        appointment_id,
        multipart_body("empty.jpg", b"", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let base = format!(
        "/api/v1/salons/{}/appointments/{appointment_id}/photos",
        owner.salon_id
    );
    let list = body_json(get_auth(app, &base, &owner.token).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_an_appointment_removes_its_photo_files(pool: PgPool) {
    let (app, storage_root) = common::build_test_app_with_storage(pool);
    let owner = register_owner(app.clone(), "cleanup@lumen.test").await;
    let removed = appointment(app.clone(), &owner).await;
    let kept = appointment(app.clone(), &owner).await;

    for appointment_id in [removed, kept] {
        let response = upload(
            app.clone(),
            &owner,
            appointment_id,
            multipart_body("a.png", b"png", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let salon_dir = storage_root
        .join("visit-photos")
        .join(owner.salon_id.to_string());
    assert_eq!(common::count_files(&salon_dir.join(removed.to_string())), 1);

    let uri = format!("/api/v1/salons/{}/appointments/{removed}", owner.salon_id);
    let response = delete_auth(app, &uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(!salon_dir.join(removed.to_string()).exists());
    assert_eq!(common::count_files(&salon_dir.join(kept.to_string())), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_client_removes_photo_files_of_their_appointments(pool: PgPool) {
    let (app, storage_root) = common::build_test_app_with_storage(pool);
    let owner = register_owner(app.clone(), "client-cleanup@lumen.test").await;
    let client = create_as(app.clone(), &owner, "/clients", json!({ "first_name": "Rui" })).await;
    let appt = create_as(
        app.clone(),
        &owner,
        "/appointments",
        json!({ "client_id": client["id"], "starts_at": common::next_week() }),
    )
    .await;
    let appointment_id = appt["id"].as_i64().unwrap();

    let response = upload(
        app.clone(),
        &owner,
        appointment_id,
        multipart_body("before.jpg", b"jpeg", None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/api/v1/salons/{}/clients/{}", owner.salon_id, client["id"]);
    let response = delete_auth(app, &uri, &owner.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let salon_dir = storage_root
        .join("visit-photos")
        .join(owner.salon_id.to_string());
    assert_eq!(common::count_files(&salon_dir), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn photos_of_unknown_appointment_are_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_owner(app.clone(), "ghost@lumen.test").await;

    let response = upload(
        app,
        &owner,
        424_242,
        multipart_body("a.jpg", b"jpeg", None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
