//! Integration tests for script tag reconciliation against a mocked Admin API.

use std::sync::Arc;

use serde_json::json;
use shopify_app_auth::clients::{AdminClient, AdminClientConfig};
use shopify_app_auth::script_tags::{
    FieldSelection, Pagination, ScriptTag, ScriptTagApi, ScriptTagReconciler,
};
use shopify_app_auth::{AuthenticatedShop, Credential, ShopDomain};
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WIDGET: &str = "https://cdn.example.com/widget.js";

fn session() -> AuthenticatedShop {
    AuthenticatedShop::new(
        ShopDomain::new("test-shop").unwrap(),
        Credential::new("shpat_abc", "write_script_tags".parse().unwrap()),
    )
}

fn client_for(server: &MockServer) -> AdminClient {
    AdminClient::new(
        AdminClientConfig::builder()
            .api_base_url(Url::parse(&server.uri()).unwrap())
            .build(),
    )
    .unwrap()
}

fn reconciler_for(server: &MockServer) -> ScriptTagReconciler<dyn ScriptTagApi> {
    let api: Arc<dyn ScriptTagApi> = Arc::new(client_for(server));
    ScriptTagReconciler::new(api)
}

fn remote_tag(id: u64, src: &str, display_scope: &str) -> serde_json::Value {
    json!({
        "id": id,
        "src": src,
        "event": "onload",
        "display_scope": display_scope,
        "cache": false,
        "created_at": "2024-01-10T11:00:00-05:00",
        "updated_at": "2024-01-10T11:00:00-05:00"
    })
}

async fn mount_listing(server: &MockServer, tags: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/admin/script_tags/count.json"))
        .and(header("X-Shopify-Access-Token", "shpat_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": tags.len()})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/script_tags.json"))
        .and(query_param("limit", "250"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"script_tags": tags})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_duplicates_are_collapsed_onto_lowest_id() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        vec![
            remote_tag(7, WIDGET, "all"),
            remote_tag(3, WIDGET, "all"),
            remote_tag(5, WIDGET, "online_store"),
            remote_tag(9, "https://cdn.example.com/other.js", "all"),
        ],
    )
    .await;
    for (id, expected) in [(7, 1), (5, 1), (3, 0), (9, 0)] {
        Mock::given(method("DELETE"))
            .and(path(format!("/admin/script_tags/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(expected)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/admin/script_tags.json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let kept = reconciler_for(&server)
        .ensure(&session(), ScriptTag::new(WIDGET))
        .await
        .unwrap();

    assert_eq!(kept.id, Some(3));
    assert_eq!(kept.src.as_deref(), Some(WIDGET));
}

#[tokio::test]
async fn test_missing_tag_is_created() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        vec![remote_tag(9, "https://cdn.example.com/other.js", "all")],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/admin/script_tags.json"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"script_tag": remote_tag(10, WIDGET, "all")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = reconciler_for(&server)
        .ensure(&session(), ScriptTag::new(WIDGET))
        .await
        .unwrap();

    assert_eq!(created.id, Some(10));
}

#[tokio::test]
async fn test_known_id_skips_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/script_tags/11.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"script_tag": remote_tag(11, WIDGET, "all")})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/script_tags/count.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
        .expect(0)
        .mount(&server)
        .await;

    let tag = reconciler_for(&server)
        .ensure(&session(), ScriptTag::new(WIDGET).with_id(11))
        .await
        .unwrap();

    assert_eq!(tag.id, Some(11));
}

#[tokio::test]
async fn test_stale_id_falls_back_to_creation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/script_tags/11.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errors": "Not Found"})))
        .mount(&server)
        .await;
    mount_listing(&server, vec![]).await;
    Mock::given(method("POST"))
        .and(path("/admin/script_tags.json"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"script_tag": remote_tag(12, WIDGET, "all")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tag = reconciler_for(&server)
        .ensure(&session(), ScriptTag::new(WIDGET).with_id(11))
        .await
        .unwrap();

    assert_eq!(tag.id, Some(12));
}

#[tokio::test]
async fn test_failed_deletion_does_not_fail_reconciliation() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        vec![remote_tag(1, WIDGET, "all"), remote_tag(2, WIDGET, "all")],
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/script_tags/2.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let kept = reconciler_for(&server)
        .ensure(&session(), ScriptTag::new(WIDGET))
        .await
        .unwrap();

    assert_eq!(kept.id, Some(1));
}

#[tokio::test]
async fn test_listing_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/script_tags/count.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"errors": "Invalid API key"})))
        .mount(&server)
        .await;

    let result = reconciler_for(&server)
        .ensure(&session(), ScriptTag::new(WIDGET))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_tag_with_id_is_updated_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/script_tags/11.json"))
        .and(header("X-Shopify-Access-Token", "shpat_abc"))
        .and(body_json(json!({"script_tag": {"id": 11, "src": WIDGET}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"script_tag": remote_tag(11, WIDGET, "all")})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/script_tags.json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let tag = client_for(&server)
        .create_or_update_script_tag(&session(), &ScriptTag::new(WIDGET).with_id(11))
        .await
        .unwrap();

    assert_eq!(tag.id, Some(11));
    assert_eq!(tag.src.as_deref(), Some(WIDGET));
}

#[tokio::test]
async fn test_listing_forwards_since_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/script_tags.json"))
        .and(query_param("since_id", "5"))
        .and(query_param("limit", "250"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"script_tags": [remote_tag(6, WIDGET, "all")]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = Pagination::full_page(1).unwrap().with_since_id(5);
    let tags = client_for(&server)
        .list_script_tags(&session(), &page, &FieldSelection::all())
        .await
        .unwrap();

    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, Some(6));
}
