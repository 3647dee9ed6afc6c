use accounts::{Accounts, seed, users};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use server::{CookieSettings, ServerConfig, ServerState, types::session::SessionStatus};
use tempfile::TempDir;
use tower::ServiceExt;

const SPA_ORIGIN: &str = "https://andrew-chen-wang.github.io";
const INDEX: &str = "<html><body>{% if user %}Hello, {{ user }}!{% else %}Hello, stranger!{% endif %}</body></html>";
const ROBOTS: &str = "# https://www.robotstxt.org/robotstxt.html\nUser-agent: *\nDisallow:\n";
const MANIFEST: &str = r#"{"short_name": "React App", "start_url": "."}"#;
const BUNDLE: &[u8] = b"console.log(\"hi\");\n\x00\xff";

struct TestApp {
    app: Router,
    db: DatabaseConnection,
    _dir: TempDir,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let accounts = Accounts::builder().database(db.clone()).build().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    let static_dir = dir.path().join("public");
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::create_dir_all(static_dir.join("static/js")).unwrap();
    std::fs::write(templates.join("index.html"), INDEX).unwrap();
    std::fs::write(static_dir.join("robots.txt"), ROBOTS).unwrap();
    std::fs::write(static_dir.join("manifest.json"), MANIFEST).unwrap();
    std::fs::write(static_dir.join("static/js/main.js"), BUNDLE).unwrap();

    let config = ServerConfig {
        templates,
        static_dir,
        allowed_origins: vec![SPA_ORIGIN.to_string()],
        cookie: CookieSettings::default(),
    };
    let state = ServerState::new(accounts, &config);
    let app = server::router(state, &config).unwrap();

    TestApp {
        app,
        db,
        _dir: dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie missing")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of the set-cookie header, ready for a `Cookie` header.
fn session_pair(response: &Response<Body>) -> String {
    set_cookie(response)
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn session_status(app: &Router, cookie: Option<&str>) -> SessionStatus {
    let response = send(app, get("/api/session/", cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn index_renders_for_anonymous_visitors() {
    let t = test_app().await;

    let response = send(&t.app, get("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Hello, stranger!"));
}

#[tokio::test]
async fn authenticated_logs_the_seed_user_in() {
    let t = test_app().await;

    let response = send(&t.app, get("/authenticated/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("sessionid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=1209600"));

    let text = body_text(response).await;
    assert!(text.contains(&format!("Hello, {}!", seed::USERNAME)));
}

#[tokio::test]
async fn session_cookie_is_recognized_afterwards() {
    let t = test_app().await;

    let response = send(&t.app, get("/authenticated/", None)).await;
    let cookie = session_pair(&response);

    let status = session_status(&t.app, Some(&cookie)).await;
    assert_eq!(
        status,
        SessionStatus {
            authenticated: true,
            username: Some(seed::USERNAME.to_string()),
        }
    );

    let response = send(&t.app, get("/", Some(&cookie))).await;
    assert!(
        body_text(response)
            .await
            .contains(&format!("Hello, {}!", seed::USERNAME))
    );
}

#[tokio::test]
async fn authenticating_again_cycles_the_key() {
    let t = test_app().await;

    let first = session_pair(&send(&t.app, get("/authenticated/", None)).await);
    let second = session_pair(&send(&t.app, get("/authenticated/", Some(&first))).await);

    assert_ne!(first, second);
    assert!(!session_status(&t.app, Some(&first)).await.authenticated);
    assert!(session_status(&t.app, Some(&second)).await.authenticated);
}

#[tokio::test]
async fn unknown_cookie_is_anonymous() {
    let t = test_app().await;

    let status = session_status(&t.app, Some("sessionid=deadbeef")).await;
    assert!(!status.authenticated);
    assert_eq!(status.username, None);

    assert!(!session_status(&t.app, None).await.authenticated);
}

#[tokio::test]
async fn authenticated_without_seed_user_is_not_found() {
    let t = test_app().await;
    users::Entity::delete_many()
        .filter(users::Column::Username.eq(seed::USERNAME))
        .exec(&t.db)
        .await
        .unwrap();

    let response = send(&t.app, get("/authenticated/", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn api_login_checks_credentials() {
    let t = test_app().await;

    let response = send(
        &t.app,
        post_json(
            "/api/login/",
            None,
            serde_json::json!({"username": seed::USERNAME, "password": "nope"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = send(
        &t.app,
        post_json(
            "/api/login/",
            None,
            serde_json::json!({"username": seed::USERNAME, "password": seed::PASSWORD}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_pair(&response);
    let status: SessionStatus = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(status.authenticated);

    assert!(session_status(&t.app, Some(&cookie)).await.authenticated);
}

#[tokio::test]
async fn api_login_requires_both_fields() {
    let t = test_app().await;

    let response = send(
        &t.app,
        post_json(
            "/api/login/",
            None,
            serde_json::json!({"username": "", "password": ""}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn error_of(response: Response<Body>) -> String {
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn api_login_incomplete_body_is_a_json_error() {
    let t = test_app().await;

    let response = send(
        &t.app,
        post_json(
            "/api/login/",
            None,
            serde_json::json!({"username": seed::USERNAME}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_of(response).await.contains("password"));
}

#[tokio::test]
async fn api_login_malformed_body_is_a_json_error() {
    let t = test_app().await;

    let request = Request::post("/api/login/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let response = send(&t.app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!error_of(response).await.is_empty());

    let request = Request::post("/api/login/")
        .body(Body::from("username=demo"))
        .unwrap();
    let response = send(&t.app, request).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(!error_of(response).await.is_empty());
}

#[tokio::test]
async fn logout_ends_the_session() {
    let t = test_app().await;
    let cookie = session_pair(&send(&t.app, get("/authenticated/", None)).await);

    let response = send(
        &t.app,
        Request::post("/api/logout/")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(set_cookie(&response).contains("Max-Age=0"));

    assert!(!session_status(&t.app, Some(&cookie)).await.authenticated);
}

#[tokio::test]
async fn static_files_are_served_verbatim() {
    let t = test_app().await;

    let response = send(&t.app, get("/robots.txt", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, ROBOTS);

    let response = send(&t.app, get("/manifest.json", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, MANIFEST);

    let response = send(&t.app, get("/static/js/main.js", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, BUNDLE);
}

#[tokio::test]
async fn missing_static_files_are_404() {
    let t = test_app().await;

    let response = send(&t.app, get("/logo192.png", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&t.app, get("/static/js/missing.js", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_allows_credentials_for_the_spa_origin() {
    let t = test_app().await;

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/session/")
        .header(header::ORIGIN, SPA_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = send(&t.app, preflight).await;

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        SPA_ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn cors_ignores_other_origins() {
    let t = test_app().await;

    let request = Request::get("/api/session/")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = send(&t.app, request).await;

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn serve_answers_over_tcp() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let t = test_app().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(t.app.clone(), listener));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /robots.txt HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK"));
    assert!(raw.ends_with(ROBOTS));
}
