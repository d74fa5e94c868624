//! Integration tests for the request signature stages.
//!
//! Known vectors use the secret `abcdefgh`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Extension, Router};
use shopify_app_auth::auth::oauth::hmac::{sign_query, sign_query_legacy};
use shopify_app_auth::middleware::{verify_signature, ShopifyApp, FORBIDDEN_BODY};
use shopify_app_auth::store::{CredentialStore, MemoryCredentialStore};
use shopify_app_auth::{
    ApiKey, ApiSecretKey, AppConfig, AuthenticatedShop, Credential, PublicUrl, QueryParams,
    ShopDomain,
};
use tower::ServiceExt;

const SECRET: &str = "abcdefgh";
const CALLBACK_QUERY: &str = "code=0907a61c0c8d55e99db179b68161bc00&shop=some-shop.myshopify.com&state=0.6784241404160823&timestamp=1337178173";
const CALLBACK_HMAC: &str = "26015c6ad20dccdc7017bc4ad3b7c7b239a18db8c79e26945e13d0ca551ae996";
const LEGACY_QUERY: &str = "shop=some-shop.myshopify.com&timestamp=1337178173";
const LEGACY_SIGNATURE: &str = "d8c4ffaafc38564cea3d017dc8cfea9ab11355ea0b2b14984e66d32c39dbb5dc";

fn config_with(secret: &str, old_secret: Option<&str>) -> AppConfig {
    let mut builder = AppConfig::builder()
        .api_key(ApiKey::new("test-api-key").unwrap())
        .api_secret_key(ApiSecretKey::new(secret).unwrap())
        .public_url(PublicUrl::new("https://myapp.example.com").unwrap());
    if let Some(old) = old_secret {
        builder = builder.old_api_secret_key(ApiSecretKey::new(old).unwrap());
    }
    builder.build().unwrap()
}

fn app_with(config: AppConfig, store: Arc<MemoryCredentialStore>) -> ShopifyApp {
    ShopifyApp::builder(config, store).build().unwrap()
}

fn signed_router(app: &ShopifyApp) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .layer(from_fn_with_state(app.clone(), verify_signature))
}

async fn get_query(router: Router, query: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/?{query}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_known_hmac_vector_is_accepted() {
    let app = app_with(config_with(SECRET, None), Arc::new(MemoryCredentialStore::new()));

    let (status, body) = get_query(
        signed_router(&app),
        &format!("{CALLBACK_QUERY}&hmac={CALLBACK_HMAC}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_known_legacy_vector_is_accepted() {
    let app = app_with(config_with(SECRET, None), Arc::new(MemoryCredentialStore::new()));

    let (status, _) = get_query(
        signed_router(&app),
        &format!("{LEGACY_QUERY}&signature={LEGACY_SIGNATURE}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_tampered_query_is_forbidden() {
    let app = app_with(config_with(SECRET, None), Arc::new(MemoryCredentialStore::new()));
    let tampered = CALLBACK_QUERY.replace("some-shop", "other-shop");

    let (status, body) = get_query(
        signed_router(&app),
        &format!("{tampered}&hmac={CALLBACK_HMAC}"),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, FORBIDDEN_BODY);
}

#[tokio::test]
async fn test_unsigned_query_is_bad_request() {
    let app = app_with(config_with(SECRET, None), Arc::new(MemoryCredentialStore::new()));

    let (status, body) = get_query(signed_router(&app), CALLBACK_QUERY).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing `hmac` parameter.");
}

#[tokio::test]
async fn test_hmac_takes_precedence_over_signature() {
    let app = app_with(config_with(SECRET, None), Arc::new(MemoryCredentialStore::new()));

    let (status, _) = get_query(
        signed_router(&app),
        &format!("{CALLBACK_QUERY}&hmac=deadbeef&signature={LEGACY_SIGNATURE}"),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_old_secret_is_accepted_during_rotation() {
    let app = app_with(
        config_with("new-secret", Some(SECRET)),
        Arc::new(MemoryCredentialStore::new()),
    );

    let (status, _) = get_query(
        signed_router(&app),
        &format!("{CALLBACK_QUERY}&hmac={CALLBACK_HMAC}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

async fn proxied(Extension(session): Extension<AuthenticatedShop>) -> String {
    session.shop.to_string()
}

#[tokio::test]
async fn test_proxy_admits_installed_shop() {
    let store = Arc::new(MemoryCredentialStore::new());
    let shop = ShopDomain::new("some-shop").unwrap();
    store
        .update(&shop, Credential::new("shpat_1", "read_products".parse().unwrap()))
        .await
        .unwrap();
    let app = app_with(config_with(SECRET, None), store);
    let router = app.proxy_router(Router::new().route("/", get(proxied)));

    let (status, body) = get_query(router, &format!("{LEGACY_QUERY}&signature={LEGACY_SIGNATURE}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "some-shop.myshopify.com");
}

#[tokio::test]
async fn test_proxy_rejects_unknown_shop() {
    let app = app_with(config_with(SECRET, None), Arc::new(MemoryCredentialStore::new()));
    let router = app.proxy_router(Router::new().route("/", get(proxied)));

    let (status, body) = get_query(router, &format!("{LEGACY_QUERY}&signature={LEGACY_SIGNATURE}")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, FORBIDDEN_BODY);
}

#[tokio::test]
async fn test_proxy_requires_legacy_signature() {
    let store = Arc::new(MemoryCredentialStore::new());
    let shop = ShopDomain::new("some-shop").unwrap();
    store
        .update(&shop, Credential::new("shpat_1", "read_products".parse().unwrap()))
        .await
        .unwrap();
    let app = app_with(config_with(SECRET, None), store);

    let mut hmac_only = QueryParams::parse(LEGACY_QUERY);
    sign_query(&mut hmac_only, SECRET);
    let router = app.proxy_router(Router::new().route("/", get(proxied)));
    let (status, body) = get_query(router, &hmac_only.encode()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Missing `signature` parameter.");

    let mut wrong = QueryParams::parse(LEGACY_QUERY);
    sign_query_legacy(&mut wrong, "wrong-secret");
    let router = app.proxy_router(Router::new().route("/", get(proxied)));
    let (status, _) = get_query(router, &wrong.encode()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
