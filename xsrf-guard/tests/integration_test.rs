//! Integration tests for xsrf-guard

use async_trait::async_trait;
use http::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use xsrf_guard::*;
use xsrf_secret::{
    CachedSecretProvider, MemorySecretCache, SecretConfig, SecretError, SecretResult, SecretStore,
    StaticSecretProvider,
};
use xsrf_token::{Secret, XsrfConfig, generate_token_at, now_secs};

/// Handler that counts how often it runs.
#[derive(Clone, Default)]
struct Counting {
    calls: Arc<AtomicUsize>,
}

impl Counting {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler for Counting {
    async fn call(&self, _request: Request<Vec<u8>>) -> Response<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Response::new(b"ok".to_vec())
    }
}

struct OfflineStore;

#[async_trait]
impl SecretStore for OfflineStore {
    async fn load(&self) -> SecretResult<Option<Secret>> {
        Err(SecretError::Connection("datastore offline".to_string()))
    }

    async fn create_if_absent(&self, _candidate: Secret) -> SecretResult<Secret> {
        Err(SecretError::Connection("datastore offline".to_string()))
    }
}

fn secret() -> Secret {
    Secret::try_from("k1").unwrap()
}

fn static_guard() -> XsrfGuard<StaticSecretProvider> {
    XsrfGuard::new(XsrfConfig::default(), StaticSecretProvider::new(secret()))
}

fn post(uri: &str, body: &[u8], user: Option<&str>) -> Request<Vec<u8>> {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(body.to_vec())
        .unwrap();
    if let Some(user) = user {
        request.extensions_mut().insert(Principal::new(user));
    }
    request
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let counter = Counting::default();
    let protected = static_guard().protect(counter.clone());

    let token = generate_token_at(&secret(), "u42", "/submit", now_secs());
    let response = protected
        .call(post("/submit", format!("xsrf={}", token).as_bytes(), Some("u42")))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(counter.calls(), 1);
}

#[tokio::test]
async fn test_missing_token_is_forbidden() {
    let counter = Counting::default();
    let protected = static_guard().protect(counter.clone());

    let response = protected.call(post("/submit", b"", Some("u42"))).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn test_token_for_other_user_is_forbidden() {
    let counter = Counting::default();
    let protected = static_guard().protect(counter.clone());

    let token = generate_token_at(&secret(), "alice", "/submit", now_secs());
    let response = protected
        .call(post(
            &format!("/submit?xsrf={}", token),
            b"",
            Some("bob"),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn test_anonymous_requests_use_anonymous_identity() {
    let guard = static_guard();
    let token = generate_token_at(&secret(), "anonymous", "/comment", now_secs());

    assert!(
        guard
            .check(&post(&format!("/comment?xsrf={}", token), b"", None))
            .await
            .is_ok()
    );
    assert!(matches!(
        guard
            .check(&post(&format!("/comment?xsrf={}", token), b"", Some("u1")))
            .await,
        Err(GuardError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let guard = XsrfGuard::new(
        XsrfConfig::default().with_timeout_secs(60),
        StaticSecretProvider::new(secret()),
    );
    let token = generate_token_at(&secret(), "u42", "/submit", now_secs() - 3600);

    let result = guard
        .check(&post("/submit", format!("xsrf={}", token).as_bytes(), Some("u42")))
        .await;
    assert!(matches!(result, Err(GuardError::InvalidToken)));
}

#[tokio::test]
async fn test_rejection_body_does_not_leak_reason() {
    let protected = static_guard().protect(Counting::default());

    let missing = protected.call(post("/submit", b"", None)).await;
    let forged = protected.call(post("/submit", b"xsrf=Zm9vOjE", None)).await;

    assert_eq!(missing.status(), forged.status());
    assert_eq!(missing.body(), forged.body());
}

#[tokio::test]
async fn test_secret_failure_is_server_error() {
    let guard = XsrfGuard::new(
        XsrfConfig::default(),
        CachedSecretProvider::new(OfflineStore, MemorySecretCache::new(), SecretConfig::default()),
    );
    let counter = Counting::default();
    let protected = guard.protect(counter.clone());

    let response = protected.call(post("/submit", b"xsrf=anything", None)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(counter.calls(), 0);
    assert!(matches!(
        guard.check(&post("/submit", b"xsrf=anything", None)).await,
        Err(GuardError::Secret(_))
    ));
}

#[tokio::test]
async fn test_safe_method_skips_check() {
    let guard = XsrfGuard::new(
        XsrfConfig::default().with_safe_methods(vec!["GET".to_string()]),
        StaticSecretProvider::new(secret()),
    );
    let counter = Counting::default();
    let protected = guard.protect(counter.clone());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/page")
        .body(Vec::new())
        .unwrap();
    assert_eq!(protected.call(request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_generated_secret_end_to_end() {
    let guard = XsrfGuard::new(XsrfConfig::default(), CachedSecretProvider::in_memory())
        .with_identity_resolver(|req: &Request<Vec<u8>>| {
            req.headers()
                .get("x-user-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        });

    let page = Request::builder()
        .uri("/settings")
        .header("x-user-id", "u7")
        .body(Vec::new())
        .unwrap();
    let token = guard.token_for(&page, None).await.unwrap();

    let submit = Request::builder()
        .method(Method::POST)
        .uri("/settings")
        .header("x-user-id", "u7")
        .header("content-type", "application/json")
        .body(format!(r#"{{"xsrf":"{}"}}"#, token).into_bytes())
        .unwrap();
    assert!(guard.check(&submit).await.is_ok());
}
