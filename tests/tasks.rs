use actix_cors::Cors;
use actix_web::{http::header, test, web, App};
use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use taskvault::auth::{AuthMiddleware, TokenResponse};
use taskvault::config::AuthConfig;
use taskvault::middleware::{RequestLogging, SecurityHeaders};
use taskvault::models::{Task, TaskStatus};
use taskvault::routes;
use taskvault::routes::health;
use taskvault::state::AppState;

fn test_state() -> AppState {
    AppState::in_memory(AuthConfig {
        jwt_secret: "integration-test-secret".to_string(),
        token_ttl_minutes: 60,
        bcrypt_cost: 4,
    })
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(SecurityHeaders)
                .wrap(RequestLogging)
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

struct TestUser {
    id: Uuid,
    token: String,
}

async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "failed to register {}",
        email
    );
    let registered: serde_json::Value = test::read_body_json(resp).await;
    let id = registered["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("registration response must carry a uuid");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::OK,
        "failed to log in {}",
        email
    );
    let login: TokenResponse = test::read_body_json(resp).await;

    TestUser {
        id,
        token: login.access_token,
    }
}

#[actix_rt::test]
async fn test_task_routes_require_authentication() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(json!({ "title": "unauthorized task" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let state = test_state();
    let app = test_app!(state);
    let user = register_and_login(&app, "alice@x.com", "password123").await;

    // A fresh account has no tasks.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let tasks: Vec<Task> = test::read_body_json(resp).await;
    assert!(tasks.is_empty());

    // Create with only a title: status defaults to pending, the rest is
    // absent.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "buy milk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.title, "buy milk");
    assert_eq!(created.status, TaskStatus::Pending);
    assert_eq!(created.owner_id, user.id);
    assert!(created.description.is_none());
    assert!(created.due_date.is_none());

    // Fetch it back.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let fetched: Task = test::read_body_json(resp).await;
    assert_eq!(fetched.id, created.id);

    // Patch only the status: title untouched, updated_at advanced.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.title, "buy milk");
    assert!(updated.description.is_none());
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);

    // A second task; the list keeps insertion order.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "walk the dog", "description": "around the block" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let second: Task = test::read_body_json(resp).await;

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let tasks: Vec<Task> = test::read_body_json(resp).await;
    assert_eq!(
        tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![created.id, second.id]
    );

    // Delete, then the task is gone; deleting again is still 404.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_task_ownership_isolation() {
    let state = test_state();
    let app = test_app!(state);

    let alice = register_and_login(&app, "alice@x.com", "password123").await;
    let bob = register_and_login(&app, "bob@x.com", "password123").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", alice.token)))
        .set_json(json!({ "title": "alice's task" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let task: Task = test::read_body_json(resp).await;

    // Bob's list does not contain it.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let tasks: Vec<Task> = test::read_body_json(resp).await;
    assert!(tasks.is_empty());

    // Get, patch, and delete through Bob's token all answer 404; the
    // task's existence is not revealed.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", bob.token)))
        .set_json(json!({ "title": "bob's now" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    // Alice still owns an unmodified task.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let still_there: Task = test::read_body_json(resp).await;
    assert_eq!(still_there.title, "alice's task");
}

#[actix_rt::test]
async fn test_task_validation() {
    let state = test_state();
    let app = test_app!(state);
    let user = register_and_login(&app, "alice@x.com", "password123").await;

    let past: DateTime<Utc> = Utc::now() - Duration::hours(1);
    let future: DateTime<Utc> = Utc::now() + Duration::hours(1);

    let rejected = vec![
        (json!({ "title": "" }), "empty title"),
        (json!({ "title": "   " }), "whitespace-only title"),
        (json!({ "title": "a".repeat(121) }), "title above 120 chars"),
        (
            json!({ "title": "ok", "description": "b".repeat(401) }),
            "description above 400 chars",
        ),
        (
            json!({ "title": "ok", "due_date": past }),
            "due date in the past",
        ),
        (
            json!({ "title": "ok", "status": "archived" }),
            "unknown status value",
        ),
    ];

    for (payload, description) in rejected {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::BAD_REQUEST,
            "test case failed: {}",
            description
        );
    }

    // A future due date and a trimmed title are accepted.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "  trimmed  ", "due_date": future, "description": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let task: Task = test::read_body_json(resp).await;
    assert_eq!(task.title, "trimmed");
    assert!(
        task.description.is_none(),
        "blank description must normalize to absent"
    );
    assert!(task.due_date.is_some());

    // Past due date on update is rejected the same way as on create.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "due_date": past }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_noop_update_does_not_bump_updated_at() {
    let state = test_state();
    let app = test_app!(state);
    let user = register_and_login(&app, "alice@x.com", "password123").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "buy milk", "description": "two liters" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let created: Task = test::read_body_json(resp).await;

    // Supplying the stored values verbatim succeeds but changes nothing.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "buy milk", "status": "pending" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let noop: Task = test::read_body_json(resp).await;
    assert_eq!(noop.updated_at, created.updated_at);

    // An actual change does advance the timestamp.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let changed: Task = test::read_body_json(resp).await;
    assert!(changed.updated_at > created.updated_at);
}

#[actix_rt::test]
async fn test_patch_can_clear_description() {
    let state = test_state();
    let app = test_app!(state);
    let user = register_and_login(&app, "alice@x.com", "password123").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "title": "buy milk", "description": "two liters" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.description.as_deref(), Some("two liters"));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", created.id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(json!({ "description": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let cleared: Task = test::read_body_json(resp).await;
    assert!(cleared.description.is_none());
    assert_eq!(cleared.title, "buy milk");
}
