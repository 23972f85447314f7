use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    atelier_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "sessions",
        "salons",
        "clients",
        "forms",
        "client_forms",
        "submissions",
        "treatments",
        "treatment_forms",
        "appointments",
        "visit_photos",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Appointment status values outside the lifecycle are rejected by the schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_appointment_status_check_constraint(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO users (email, password_hash, role) VALUES ('x@example.com', 'h', 'admin')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "unknown role should violate ck_users_role");

    let user_id: (i64,) = sqlx::query_as(
        "INSERT INTO users (email, password_hash, role)
         VALUES ('owner@example.com', 'h', 'owner') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let salon_id: (i64,) =
        sqlx::query_as("INSERT INTO salons (owner_id, name) VALUES ($1, 'S') RETURNING id")
            .bind(user_id.0)
            .fetch_one(&pool)
            .await
            .unwrap();
    let client_id: (i64,) = sqlx::query_as(
        "INSERT INTO clients (salon_id, first_name) VALUES ($1, 'Ana') RETURNING id",
    )
    .bind(salon_id.0)
    .fetch_one(&pool)
    .await
    .unwrap();

    let result = sqlx::query(
        "INSERT INTO appointments (salon_id, client_id, starts_at, status)
         VALUES ($1, $2, NOW(), 'no_show')",
    )
    .bind(salon_id.0)
    .bind(client_id.0)
    .execute(&pool)
    .await;
    assert!(result.is_err(), "unknown status should be rejected");
}
