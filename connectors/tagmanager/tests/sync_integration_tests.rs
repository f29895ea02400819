//! Read-side integration tests against a fake Tag Manager API.

use std::time::Duration;

use idsync_core::{
    Resource, ResourceId, ResourceSyncer, SyncError, Token, grants_all, list_all,
};
use idsync_tagmanager::{TagManagerConfig, TagManagerConnector, resource_types};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PERMISSIONS: &str = "/tagmanager/v2/accounts/123/user_permissions";

fn connector(server: &MockServer, accounts: &[&str]) -> TagManagerConnector {
    TagManagerConnector::new(TagManagerConfig {
        base_url: server.uri(),
        access_token: Some("test-token".into()),
        accounts: accounts.iter().map(ToString::to_string).collect(),
        ..TagManagerConfig::default()
    })
    .expect("connector")
}

fn record(id: u32, email: &str, role: &str, containers: &[(&str, &str)]) -> Value {
    json!({
        "path": format!("accounts/123/user_permissions/{id}"),
        "accountId": "123",
        "emailAddress": email,
        "accountAccess": { "permission": role },
        "containerAccess": containers
            .iter()
            .map(|(c, p)| json!({ "containerId": c, "permission": p }))
            .collect::<Vec<_>>(),
    })
}

fn account() -> Resource {
    Resource::new("Main", &resource_types::account(), "123")
}

fn container(id: &str) -> Resource {
    Resource::new(id, &resource_types::container(), id).with_parent(ResourceId::new("account", "123"))
}

fn summary(grants: &[idsync_core::Grant]) -> Vec<(String, String)> {
    grants
        .iter()
        .map(|g| (g.entitlement.slug.clone(), g.principal.resource.clone()))
        .collect()
}

async fn mount_page(server: &MockServer, token: Option<&str>, records: Vec<Value>, next: &str) {
    let body = json!({ "userPermission": records, "nextPageToken": next });
    let mock = Mock::given(method("GET")).and(path(PERMISSIONS));
    match token {
        Some(token) => {
            mock.and(query_param("pageToken", token))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .with_priority(1)
                .mount(server)
                .await;
        }
        None => {
            mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(server)
                .await;
        }
    }
}

#[tokio::test]
async fn account_grants_walk_three_pages_to_empty_cursor() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![record(1, "alice@example.com", "admin", &[])],
        "p2",
    )
    .await;
    mount_page(
        &server,
        Some("p2"),
        vec![
            record(2, "eve@example.com", "owner", &[]),
            record(3, "bob@example.com", "user", &[]),
        ],
        "p3",
    )
    .await;
    mount_page(
        &server,
        Some("p3"),
        vec![record(4, "carol@example.com", "noAccess", &[])],
        "",
    )
    .await;

    let syncer = connector(&server, &[]).syncer("account").expect("account syncer");
    let account = account();

    let first = syncer.grants(&account, &Token::first()).await.unwrap();
    assert_eq!(
        summary(&first.items),
        vec![("admin".into(), "123:alice@example.com".into())]
    );
    assert!(first.has_more());

    let second = syncer
        .grants(&account, &Token::resume(first.next_page_token))
        .await
        .unwrap();
    assert_eq!(
        summary(&second.items),
        vec![("user".into(), "123:bob@example.com".into())]
    );
    assert!(second.has_more());

    let third = syncer
        .grants(&account, &Token::resume(second.next_page_token))
        .await
        .unwrap();
    assert_eq!(
        summary(&third.items),
        vec![("noAccess".into(), "123:carol@example.com".into())]
    );
    assert_eq!(third.next_page_token, "");
}

#[tokio::test]
async fn account_grants_reject_record_of_other_account() {
    let server = MockServer::start().await;
    let mut foreign = record(9, "mallory@example.com", "admin", &[]);
    foreign["accountId"] = json!("999");
    mount_page(&server, None, vec![foreign], "").await;

    let syncer = connector(&server, &[]).syncer("account").unwrap();
    let err = syncer.grants(&account(), &Token::first()).await.unwrap_err();
    assert!(matches!(err, SyncError::Inconsistency { .. }), "got {err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn container_grants_read_parent_account_records() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        None,
        vec![
            record(1, "alice@example.com", "user", &[("A", "edit"), ("B", "read")]),
            record(2, "bob@example.com", "user", &[("A", "superpower"), ("A", "publish")]),
        ],
        "",
    )
    .await;

    let syncer = connector(&server, &[]).syncer("container").unwrap();
    let grants = grants_all(&syncer, &container("A")).await.unwrap();
    assert_eq!(
        summary(&grants),
        vec![
            ("edit".into(), "123:alice@example.com".into()),
            ("publish".into(), "123:bob@example.com".into()),
        ]
    );
}

#[tokio::test]
async fn malformed_cursor_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    let syncer = connector(&server, &[]).syncer("account").unwrap();

    let err = syncer
        .grants(&account(), &Token::resume("%%% garbage %%%"))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidPageToken { .. }), "got {err:?}");
    assert!(!err.is_retryable());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failure_is_retryable_with_hint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PERMISSIONS))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({
                    "error": {
                        "code": 429,
                        "message": "Quota exceeded for quota metric 'Queries'",
                        "status": "RESOURCE_EXHAUSTED"
                    }
                })),
        )
        .mount(&server)
        .await;

    let syncer = connector(&server, &[]).syncer("account").unwrap();
    let err = syncer.grants(&account(), &Token::first()).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(err.to_string().contains("Quota exceeded"), "got {err}");
}

#[tokio::test]
async fn account_listing_honours_allow_list_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tagmanager/v2/accounts"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": [
                { "path": "accounts/123", "accountId": "123", "name": "Main" },
                { "path": "accounts/456", "accountId": "456", "name": "Other" }
            ],
            "nextPageToken": "more"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tagmanager/v2/accounts"))
        .and(query_param("pageToken", "more"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": [{ "path": "accounts/789", "accountId": "789", "name": "Third" }]
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    let syncer = connector(&server, &["123", "789"]).syncer("account").unwrap();
    let accounts = list_all(&syncer, None).await.unwrap();

    let ids: Vec<_> = accounts.iter().map(|r| r.id.resource.as_str()).collect();
    assert_eq!(ids, vec!["123", "789"]);
    assert_eq!(accounts[0].display_name, "Main");
    assert_eq!(
        accounts[0].annotations.child_resource_types().collect::<Vec<_>>(),
        vec!["user", "container", "role"]
    );
}

#[tokio::test]
async fn containers_and_users_nest_under_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tagmanager/v2/accounts/123/containers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "container": [
                { "accountId": "123", "containerId": "A", "name": "Web", "publicId": "GTM-AAAA" }
            ]
        })))
        .mount(&server)
        .await;
    mount_page(
        &server,
        None,
        vec![record(1, "alice@example.com", "user", &[])],
        "",
    )
    .await;

    let connector = connector(&server, &[]);
    let parent = ResourceId::new("account", "123");

    let containers = list_all(&connector.syncer("container").unwrap(), Some(&parent))
        .await
        .unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].display_name, "Web");
    assert_eq!(containers[0].parent_resource_id, Some(parent.clone()));

    let users = list_all(&connector.syncer("user").unwrap(), Some(&parent))
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, ResourceId::new("user", "123:alice@example.com"));

    let orphans = list_all(&connector.syncer("container").unwrap(), None)
        .await
        .unwrap();
    assert!(orphans.is_empty());
}

#[tokio::test]
async fn entitlements_follow_resource_kind() {
    let server = MockServer::start().await;
    let connector = connector(&server, &[]);

    let account_ents = connector
        .syncer("account")
        .unwrap()
        .entitlements(&account(), &Token::first())
        .await
        .unwrap();
    let slugs: Vec<_> = account_ents.items.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["accountPermissionUnspecified", "admin", "noAccess", "user"]);

    let container_ents = connector
        .syncer("container")
        .unwrap()
        .entitlements(&container("A"), &Token::first())
        .await
        .unwrap();
    assert_eq!(container_ents.items.len(), 6);
    assert_eq!(container_ents.items[2].display_name, "edit permission");

    assert!(server.received_requests().await.unwrap().is_empty());
}
