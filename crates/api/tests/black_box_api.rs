use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = rolegate_api::app::build_app();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn get(&self, path: &str, authorization: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(value) = authorization {
            req = req.header(reqwest::header::AUTHORIZATION, value);
        }

        let res = req.send().await.unwrap();
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    email: String,
    roles: Vec<String>,
    exp: i64,
    iat: i64,
}

/// Mint an HS256 token with a throwaway secret; the server never checks it.
fn mint_jwt(sub: &str, roles: &[&str], ttl: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = TestClaims {
        sub: sub.to_string(),
        email: format!("{sub}@example.com"),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"nobody-verifies-this"),
    )
    .expect("failed to encode jwt")
}

fn bearer(sub: &str, roles: &[&str]) -> String {
    format!("Bearer {}", mint_jwt(sub, roles, ChronoDuration::minutes(10)))
}

fn raw_bearer(payload: Value) -> String {
    format!("Bearer e30.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
}

fn assert_error(body: &Value, status: u16, code: &str) {
    assert_eq!(body["statusCode"], status, "body: {body}");
    assert_eq!(body["error"], code, "body: {body}");
    assert!(body["message"].is_string(), "body: {body}");
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let (status, _) = server.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn whoami_returns_decoded_identity() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .get("/whoami", Some(&bearer("alice", &["admin", "user"])))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["roles"], json!(["admin", "user"]));
    assert!(body["expiresAt"].is_i64());
    assert!(body["issuedAt"].is_i64());
}

#[tokio::test]
async fn header_problems_are_401_invalid_token() {
    let server = TestServer::spawn().await;

    for header in [
        None,
        Some("Basic dXNlcjpwYXNz"),
        Some("bearer a.b.c"),
        Some("Bearer "),
        Some("Bearer invalid.token"),
        Some("Bearer a.@@@.c"),
    ] {
        let (status, body) = server.get("/whoami", header).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header: {header:?}");
        assert_error(&body, 401, "INVALID_TOKEN");
    }
}

#[tokio::test]
async fn non_text_header_is_rejected() {
    let server = TestServer::spawn().await;

    let res = server
        .client
        .get(format!("{}/whoami", server.base_url))
        .header(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_required_claims_are_401() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .get("/whoami", Some(&raw_bearer(json!({"email": "x@example.com"}))))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "INVALID_TOKEN");

    let (status, _) = server
        .get("/whoami", Some(&raw_bearer(json!({"sub": "x", "email": "  "}))))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_still_accepted() {
    let server = TestServer::spawn().await;
    let token = mint_jwt("late", &[], ChronoDuration::hours(-1));

    let (status, body) = server.get("/whoami", Some(&format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "late");
}

#[tokio::test]
async fn claim_accessor_reads_single_fields() {
    let server = TestServer::spawn().await;
    let header = bearer("bob", &["viewer"]);

    let (status, body) = server.get("/whoami/email", Some(&header)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"field": "email", "value": "bob@example.com"}));

    let (_, body) = server.get("/whoami/roles", Some(&header)).await;
    assert_eq!(body["value"], json!(["viewer"]));

    let (status, body) = server.get("/whoami/password", Some(&header)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, 404, "UNKNOWN_CLAIM");
}

#[tokio::test]
async fn any_of_group_requirement() {
    let server = TestServer::spawn().await;

    for roles in [&["admin"][..], &["moderator"][..]] {
        let (status, body) = server
            .get("/admin/dashboard", Some(&bearer("mod", roles)))
            .await;
        assert_eq!(status, StatusCode::OK, "roles: {roles:?}");
        assert_eq!(body["area"], "dashboard");
    }

    let (status, body) = server
        .get("/admin/dashboard", Some(&bearer("pleb", &["user"])))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, 403, "INSUFFICIENT_PERMISSIONS");
    assert_eq!(body["message"], "Requires one of the roles: admin, moderator");
}

#[tokio::test]
async fn role_matching_is_case_sensitive() {
    let server = TestServer::spawn().await;

    let (status, _) = server
        .get("/admin/dashboard", Some(&bearer("shouty", &["Admin"])))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_roles_claim_means_no_roles() {
    let server = TestServer::spawn().await;
    let header = raw_bearer(json!({"sub": "s", "email": "s@example.com", "roles": "admin"}));

    let (status, body) = server.get("/whoami", Some(&header)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!([]));

    let (status, _) = server.get("/admin/dashboard", Some(&header)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn operation_requirement_overrides_group() {
    let server = TestServer::spawn().await;

    // Holds neither admin nor moderator, but satisfies the route's own ALL_OF.
    let (status, body) = server
        .get("/admin/system", Some(&bearer("ops", &["operator", "superuser"])))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"], "system");

    let (status, body) = server
        .get("/admin/system", Some(&bearer("admin", &["admin", "superuser"])))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Missing required roles: operator");
}

#[tokio::test]
async fn empty_requirement_allows_any_authenticated_caller() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .get("/public-notes", Some(&bearer("nobody", &[])))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["viewer"], "nobody");

    let (status, _) = server.get("/public-notes", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
