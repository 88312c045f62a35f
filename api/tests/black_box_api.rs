use std::time::Duration;

use api::{RateLimit, SESSION_COOKIE};
use app::storage::{MemoryBackend, Storage, EXPENSES_FILE, INCOME_FILE, USERS_FILE};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

async fn client_with(rate_limit: RateLimit) -> Client {
    client_over(Storage::in_memory(), rate_limit).await
}

async fn client_over(storage: Storage, rate_limit: RateLimit) -> Client {
    let rocket = api::register(rocket::build(), storage, rate_limit);
    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn client() -> Client {
    client_with(RateLimit::new(100, Duration::from_secs(60))).await
}

async fn post_json(client: &Client, uri: &'static str, body: Value) -> (Status, Value) {
    let response = client
        .post(uri)
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json().await.expect("json body"))
}

async fn get_json(client: &Client, uri: &'static str) -> (Status, Value) {
    let response = client.get(uri).dispatch().await;
    let status = response.status();
    (status, response.into_json().await.expect("json body"))
}

async fn register_ana(client: &Client) {
    let (status, body) = post_json(
        client,
        "/registro",
        json!({"nombre": "Ana", "correo": "ana@x.com", "contraseña": "pw1"}),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body, json!({"ok": true}));
}

#[rocket::async_test]
async fn register_save_and_read_back() {
    let client = client().await;
    register_ana(&client).await;

    let (status, body) = post_json(
        &client,
        "/datos",
        json!({"ingresos": [{"monto": 100}], "gastos": [], "ahorro": 100}),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = get_json(&client, "/datos").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(
        body,
        json!({"ingresos": [{"monto": 100}], "gastos": [], "ahorro": 100})
    );
}

#[rocket::async_test]
async fn new_user_starts_empty() {
    let client = client().await;
    register_ana(&client).await;

    let (status, body) = get_json(&client, "/datos").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body, json!({"ingresos": [], "gastos": [], "ahorro": 0}));
}

#[rocket::async_test]
async fn missing_fields_in_save_are_defaulted() {
    let client = client().await;
    register_ana(&client).await;
    post_json(
        &client,
        "/datos",
        json!({"ingresos": [{"monto": 1}], "gastos": [{"monto": 2}], "ahorro": 5}),
    )
    .await;

    let (status, _) = post_json(&client, "/datos", json!({"gastos": [{"monto": 3}]})).await;
    assert_eq!(status, Status::Ok);

    let (_, body) = get_json(&client, "/datos").await;
    assert_eq!(
        body,
        json!({"ingresos": [], "gastos": [{"monto": 3}], "ahorro": 0})
    );
}

#[rocket::async_test]
async fn data_requires_a_session() {
    let client = client().await;

    let (status, body) = get_json(&client, "/datos").await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(body, json!({"error": "No autorizado"}));

    let (status, body) = post_json(
        &client,
        "/datos",
        json!({"ingresos": [], "gastos": [], "ahorro": 1}),
    )
    .await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(body, json!({"error": "No autorizado"}));
}

#[rocket::async_test]
async fn session_is_an_encrypted_cookie() {
    let client = client().await;
    register_ana(&client).await;

    let jar = client.cookies();
    let private = jar.get_private(SESSION_COOKIE).expect("session cookie");
    assert_eq!(private.value(), "ana@x.com");
    let raw = jar.get(SESSION_COOKIE).expect("raw cookie");
    assert_ne!(raw.value(), "ana@x.com");
}

#[rocket::async_test]
async fn login_with_registered_credentials() {
    let client = client().await;
    register_ana(&client).await;
    client.get("/logout").dispatch().await;

    let (status, _) = get_json(&client, "/datos").await;
    assert_eq!(status, Status::Unauthorized);

    let (status, body) = post_json(
        &client,
        "/login",
        json!({"correo": "ana@x.com", "contraseña": "pw1"}),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body, json!({"ok": true}));

    let (status, _) = get_json(&client, "/datos").await;
    assert_eq!(status, Status::Ok);
}

#[rocket::async_test]
async fn login_failures_say_what_went_wrong() {
    let client = client().await;
    register_ana(&client).await;
    client.get("/logout").dispatch().await;

    let (status, body) = post_json(
        &client,
        "/login",
        json!({"correo": "ana@x.com", "contraseña": "wrong"}),
    )
    .await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("Contraseña incorrecta"));
    assert_eq!(body["code"], json!("WRONG_PASSWORD"));

    let (status, body) = post_json(
        &client,
        "/login",
        json!({"correo": "nadie@x.com", "contraseña": "pw1"}),
    )
    .await;
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(body["error"], json!("Correo no registrado"));
    assert_eq!(body["code"], json!("UNKNOWN_EMAIL"));

    let (status, body) = post_json(&client, "/login", json!({"correo": "ana@x.com"})).await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], json!("Rellene todos los campos"));
    assert_eq!(body["code"], json!("MISSING_FIELD"));

    // None of the failures started a session.
    let (status, _) = get_json(&client, "/datos").await;
    assert_eq!(status, Status::Unauthorized);
}

#[rocket::async_test]
async fn duplicate_registration_does_not_log_in() {
    let client = client().await;
    register_ana(&client).await;

    client.get("/logout").dispatch().await;
    let (status, body) = post_json(
        &client,
        "/registro",
        json!({"nombre": "Otra", "correo": "ana@x.com", "contraseña": "pw2"}),
    )
    .await;
    assert_eq!(status, Status::Conflict);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("Ese correo ya está registrado"));
    assert_eq!(body["code"], json!("DUPLICATE_EMAIL"));

    let (status, _) = get_json(&client, "/datos").await;
    assert_eq!(status, Status::Unauthorized);

    // The original password still works, the new one doesn't.
    let (status, _) = post_json(
        &client,
        "/login",
        json!({"correo": "ana@x.com", "contraseña": "pw2"}),
    )
    .await;
    assert_eq!(status, Status::Unauthorized);
    let (status, _) = post_json(
        &client,
        "/login",
        json!({"correo": "ana@x.com", "contraseña": "pw1"}),
    )
    .await;
    assert_eq!(status, Status::Ok);
}

#[rocket::async_test]
async fn registration_requires_every_field() {
    let client = client().await;
    let (status, body) = post_json(
        &client,
        "/registro",
        json!({"nombre": "", "correo": "ana@x.com", "contraseña": "pw1"}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["code"], json!("MISSING_FIELD"));
}

#[rocket::async_test]
async fn panel_needs_a_session() {
    let client = client().await;
    register_ana(&client).await;

    let response = client.get("/panel").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let page = response.into_string().await.expect("html body");
    assert!(page.contains("Ana"));
    assert!(page.contains("ana@x.com"));

    let response = client.get("/logout").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/"));

    let response = client.get("/panel").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/"));
}

#[rocket::async_test]
async fn logout_without_session_is_harmless() {
    let client = client().await;
    let response = client.get("/logout").dispatch().await;
    assert_eq!(response.status(), Status::SeeOther);
    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));
}

#[rocket::async_test]
async fn panel_escapes_user_input() {
    let client = client().await;
    post_json(
        &client,
        "/registro",
        json!({"nombre": "<script>", "correo": "x@x.com", "contraseña": "pw"}),
    )
    .await;
    let page = client
        .get("/panel")
        .dispatch()
        .await
        .into_string()
        .await
        .expect("html body");
    assert!(page.contains("&lt;script&gt;"));
    assert!(!page.contains("<script>"));
}

#[rocket::async_test]
async fn repeated_logins_are_rate_limited() {
    let client = client_with(RateLimit::new(2, Duration::from_secs(60))).await;
    register_ana(&client).await;

    for _ in 0..2 {
        let (status, _) = post_json(
            &client,
            "/login",
            json!({"correo": "ana@x.com", "contraseña": "wrong"}),
        )
        .await;
        assert_eq!(status, Status::Unauthorized);
    }
    let (status, body) = post_json(
        &client,
        "/login",
        json!({"correo": "ana@x.com", "contraseña": "pw1"}),
    )
    .await;
    assert_eq!(status, Status::TooManyRequests);
    assert_eq!(body["code"], json!("RATE_LIMITED"));
}

#[rocket::async_test]
async fn session_of_unknown_user_is_rejected() {
    let client = client().await;
    register_ana(&client).await;
    client.get("/logout").dispatch().await;

    let response = client
        .get("/datos")
        .private_cookie((SESSION_COOKIE, "nadie@x.com"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(
        response.into_json::<Value>().await,
        Some(json!({"error": "No autorizado"}))
    );
}

#[rocket::async_test]
async fn openapi_document_lists_json_routes() {
    let client = client().await;
    let (status, body) = get_json(&client, "/openapi.json").await;
    assert_eq!(status, Status::Ok);
    for path in ["/login", "/registro", "/datos"] {
        assert!(body["paths"].get(path).is_some(), "missing {}", path);
    }
}

#[rocket::async_test]
async fn broken_users_file_is_an_internal_error() {
    let storage = Storage::new(
        MemoryBackend::with_contents(USERS_FILE, "{bad"),
        MemoryBackend::new(INCOME_FILE),
        MemoryBackend::new(EXPENSES_FILE),
    );
    let client = client_over(storage, RateLimit::new(100, Duration::from_secs(60))).await;

    let (status, body) = post_json(
        &client,
        "/login",
        json!({"correo": "ana@x.com", "contraseña": "pw1"}),
    )
    .await;
    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("Error interno"));

    let response = client
        .get("/datos")
        .private_cookie((SESSION_COOKIE, "ana@x.com"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::InternalServerError);
    assert_eq!(
        response.into_json::<Value>().await,
        Some(json!({"error": "Error interno"}))
    );
}
