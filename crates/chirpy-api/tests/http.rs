use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use argon2::{Algorithm, Argon2, Params, Version};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use chirpy_api::service::{Accounts, Chirps};
use chirpy_api::tokens::AccessTokens;
use chirpy_api::{AppStateInner, router};
use chirpy_db::Database;

const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

struct TestApp {
    _dir: tempfile::TempDir,
    app: Router,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(Database::open(&dir.path().join("database.json")).unwrap());

    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();

    let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None).unwrap();
    let state = Arc::new(AppStateInner {
        accounts: Accounts::with_hasher(
            db.clone(),
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        ),
        chirps: Chirps::new(db),
        tokens: AccessTokens::new("integration-secret", Duration::hours(1)),
        polka_api_key: POLKA_KEY.into(),
        file_server_hits: AtomicUsize::new(0),
    });

    TestApp {
        app: router(state, &static_dir),
        _dir: dir,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        self.dispatch(req).await
    }

    /// Sends `body` verbatim, so it need not be valid JSON.
    async fn send_raw(&self, uri: &str, auth: &str, body: &str) -> StatusCode {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.dispatch(req).await.0
    }

    async fn dispatch(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn json(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, auth, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(&self, email: &str, password: &str) -> Value {
        let (status, user) = self
            .json(
                Method::POST,
                "/api/users",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        user
    }

    async fn login(&self, email: &str, password: &str) -> Value {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

fn bearer(token: &Value) -> String {
    format!("Bearer {}", token.as_str().unwrap())
}

#[tokio::test]
async fn health_and_metrics() {
    let t = test_app();

    let (status, body) = t.send(Method::GET, "/api/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, body) = t.send(Method::GET, "/app/index.html", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Welcome to Chirpy"));
    t.send(Method::GET, "/app/index.html", None, None).await;

    let (_, body) = t.send(Method::GET, "/api/metrics", None, None).await;
    assert_eq!(body, b"Hits: 2");

    let (_, body) = t.send(Method::GET, "/admin/metrics", None, None).await;
    assert!(String::from_utf8(body).unwrap().contains("visited 2 times"));

    let (status, _) = t.send(Method::POST, "/api/reset", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = t.send(Method::GET, "/api/metrics", None, None).await;
    assert_eq!(body, b"Hits: 0");
}

#[tokio::test]
async fn register_and_login() {
    let t = test_app();

    let user = t.register("walt@example.com", "hunter2").await;
    assert_eq!(user, json!({ "id": 1, "email": "walt@example.com", "is_chirpy_red": false }));

    let (status, body) = t
        .json(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "walt@example.com", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email already registered");

    let login = t.login("walt@example.com", "hunter2").await;
    assert_eq!(login["id"], 1);
    assert!(login["token"].as_str().unwrap().contains('.'));
    assert_eq!(login["refresh_token"].as_str().unwrap().len(), 64);

    for (email, password) in [("walt@example.com", "wrong"), ("nobody@example.com", "hunter2")] {
        let (status, _) = t
            .json(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn chirp_lifecycle() {
    let t = test_app();
    t.register("walt@example.com", "hunter2").await;
    t.register("jesse@example.com", "yo").await;
    let walt = bearer(&t.login("walt@example.com", "hunter2").await["token"]);
    let jesse = bearer(&t.login("jesse@example.com", "yo").await["token"]);

    let (status, _) = t
        .json(Method::POST, "/api/chirps", None, Some(json!({ "body": "hi" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, chirp) = t
        .json(
            Method::POST,
            "/api/chirps",
            Some(&walt),
            Some(json!({ "body": "What a Kerfuffle today" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp, json!({ "id": 1, "body": "What a **** today", "author_id": 1 }));

    let (status, body) = t
        .json(
            Method::POST,
            "/api/chirps",
            Some(&walt),
            Some(json!({ "body": "x".repeat(141) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Chirp is too long");

    t.json(Method::POST, "/api/chirps", Some(&jesse), Some(json!({ "body": "yo" })))
        .await;
    t.json(Method::POST, "/api/chirps", Some(&walt), Some(json!({ "body": "again" })))
        .await;

    let (status, list) = t.json(Method::GET, "/api/chirps?sort=desc", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = list.as_array().unwrap().iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let (_, list) = t.json(Method::GET, "/api/chirps?author_id=1", None, None).await;
    let ids: Vec<u64> = list.as_array().unwrap().iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 3]);

    let (status, _) = t.json(Method::GET, "/api/chirps?author_id=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = t.json(Method::DELETE, "/api/chirps/1", Some(&jesse), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = t.json(Method::GET, "/api/chirps/1", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t.json(Method::DELETE, "/api/chirps/1", Some(&walt), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = t.json(Method::GET, "/api/chirps/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn refresh_and_revoke() {
    let t = test_app();
    t.register("walt@example.com", "hunter2").await;
    let login = t.login("walt@example.com", "hunter2").await;
    let refresh = bearer(&login["refresh_token"]);

    let (status, body) = t.json(Method::POST, "/api/refresh", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::OK);
    let access = bearer(&body["token"]);

    // The fresh access token works.
    let (status, _) = t
        .json(Method::POST, "/api/chirps", Some(&access), Some(json!({ "body": "hi" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Access tokens are not refresh tokens.
    let (status, _) = t.json(Method::POST, "/api/refresh", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t.json(Method::POST, "/api/revoke", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t.json(Method::POST, "/api/refresh", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = t.json(Method::POST, "/api/revoke", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_user_requires_token() {
    let t = test_app();
    t.register("walt@example.com", "hunter2").await;
    let access = bearer(&t.login("walt@example.com", "hunter2").await["token"]);
    let body = json!({ "email": "heisenberg@example.com", "password": "blue" });

    let (status, _) = t.json(Method::PUT, "/api/users", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, user) = t.json(Method::PUT, "/api/users", Some(&access), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "heisenberg@example.com");

    t.login("heisenberg@example.com", "blue").await;
}

#[tokio::test]
async fn polka_webhook_upgrades_user() {
    let t = test_app();
    t.register("walt@example.com", "hunter2").await;
    let key = format!("ApiKey {POLKA_KEY}");
    let upgraded = json!({ "event": "user.upgraded", "data": { "user_id": 1 } });

    let (status, _) = t
        .json(Method::POST, "/api/polka/webhooks", Some("ApiKey wrong"), Some(upgraded.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .json(
            Method::POST,
            "/api/polka/webhooks",
            Some(&key),
            Some(json!({ "event": "user.payment_failed", "data": { "user_id": 1 } })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(t.login("walt@example.com", "hunter2").await["is_chirpy_red"], false);

    let (status, _) = t
        .json(Method::POST, "/api/polka/webhooks", Some(&key), Some(upgraded))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(t.login("walt@example.com", "hunter2").await["is_chirpy_red"], true);

    let (status, _) = t
        .json(
            Method::POST,
            "/api/polka/webhooks",
            Some(&key),
            Some(json!({ "event": "user.upgraded", "data": { "user_id": 99 } })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn polka_webhook_checks_key_before_body() {
    let t = test_app();
    let key = format!("ApiKey {POLKA_KEY}");

    for body in ["{not json", r#"{"event": "user.upgraded"}"#] {
        assert_eq!(
            t.send_raw("/api/polka/webhooks", "ApiKey wrong", body).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            t.send_raw("/api/polka/webhooks", &key, body).await,
            StatusCode::BAD_REQUEST
        );
    }
}
