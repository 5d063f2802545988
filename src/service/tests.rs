//! Tests for the resource clients

use super::*;
use crate::auth::{ManualClock, TokenCache};
use crate::http::{AuthenticatedRequestExecutor, ReqwestTransport, Transport};
use crate::test_support::{credentials, respond, t0, CountingBroker, ScriptedTransport};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://connector.example.com";

fn context_with(transport: Arc<dyn Transport>, base: &str) -> ServiceContext {
    let clock = ManualClock::new(t0());
    let broker = Arc::new(CountingBroker::new(clock.clone()));
    let cache = Arc::new(TokenCache::with_clock(credentials(), broker, Arc::new(clock)));
    let executor = Arc::new(AuthenticatedRequestExecutor::new(transport, cache));
    ServiceContext::new(executor, url::Url::parse(base).unwrap())
}

fn scripted(script: Vec<crate::test_support::Scripted>) -> (ServiceContext, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(script));
    (context_with(transport.clone(), BASE), transport)
}

fn sent_json(transport: &ScriptedTransport, index: usize) -> Value {
    serde_json::from_slice(transport.seen()[index].body.as_deref().unwrap()).unwrap()
}

// ============================================================================
// URL building
// ============================================================================

#[test]
fn test_resource_url_encodes_segments_and_query() {
    let (context, _) = scripted(Vec::new());
    let url = context
        .resource_url(&["Items", "ExternalId", "a/b c"], &[("connectorId", "x&y")])
        .unwrap();
    assert_eq!(
        url,
        "https://connector.example.com/connector/api/Items/ExternalId/a%2Fb%20c?connectorId=x%26y"
    );
}

#[test]
fn test_resource_url_keeps_base_path() {
    let transport = Arc::new(ScriptedTransport::new(Vec::new()));
    let context = context_with(transport, "https://gateway.example.com/tenant-a/");
    let url = context.resource_url(&["Notifications"], &[]).unwrap();
    assert_eq!(
        url,
        "https://gateway.example.com/tenant-a/connector/api/Notifications"
    );
}

// ============================================================================
// Models
// ============================================================================

#[test]
fn test_submission_omits_absent_fields() {
    let submission = AggregationSubmission {
        external_id: "agg-1".into(),
        connector_id: "conn".into(),
        title: "Folder".into(),
        source_created_date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        source_properties: vec![Metadata::new("Owner", "String", "alice")],
        media_type: Some(RecordMediaType::Electronic),
        ..Default::default()
    };

    let value = serde_json::to_value(&submission).unwrap();
    assert_eq!(
        value,
        json!({
            "externalId": "agg-1",
            "connectorId": "conn",
            "title": "Folder",
            "sourceCreatedDate": "2024-01-02T03:04:05Z",
            "sourceProperties": [{"name": "Owner", "type": "String", "value": "alice"}],
            "mediaType": "Electronic"
        })
    );
}

#[test]
fn test_notification_tolerates_bad_dates_and_unknown_fields() {
    let notification: Notification = serde_json::from_value(json!({
        "id": "n-1",
        "notificationType": "ItemDestroyed",
        "timestamp": "not a date",
        "item": {"externalId": "item-9", "nextDisposalDate": "2030-01-01T00:00:00Z"},
        "connectorConfig": {"id": "cfg", "properties": [{"name": "Mode", "value": "Full"}]},
        "somethingNew": true
    }))
    .unwrap();

    assert_eq!(notification.timestamp, Some(chrono::DateTime::<Utc>::default()));
    let item = notification.item.unwrap();
    assert_eq!(item.external_id.as_deref(), Some("item-9"));
    assert_eq!(
        notification.connector_config.unwrap().property("Mode"),
        Some("Full")
    );
}

#[test]
fn test_metadata_optional_value() {
    let metadata = Metadata::optional("Keywords", "String", None);
    assert_eq!(metadata.value.as_deref(), Some(""));
}

// ============================================================================
// Clients
// ============================================================================

#[tokio::test]
async fn test_aggregation_client() {
    let (context, transport) = scripted(vec![
        respond(200, Some("application/json"), r#"[{"externalId":"a1","title":"One"}]"#),
        respond(200, Some("application/json"), "[]"),
        respond(200, None, ""),
    ]);
    let client = AggregationClient::new(context);

    let found = client.get("ExternalId", "a1").await.unwrap();
    assert_eq!(found[0].title.as_deref(), Some("One"));

    let none = client.get_multi_tenanted("ExternalId", "a1", "conn").await.unwrap();
    assert!(none.is_empty());

    client
        .submit(&AggregationSubmission {
            external_id: "a2".into(),
            connector_id: "conn".into(),
            title: "Two".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let seen = transport.seen();
    assert_eq!(seen[0].url, format!("{BASE}/connector/api/Aggregations/ExternalId/a1"));
    assert_eq!(
        seen[1].url,
        format!("{BASE}/connector/api/Aggregations/MultiTenanted/ExternalId/a1?connectorId=conn")
    );
    assert_eq!(seen[2].method, Method::POST);
    assert_eq!(seen[2].url, format!("{BASE}/connector/api/Aggregations"));
    assert_eq!(sent_json(&transport, 2)["externalId"], "a2");
}

#[tokio::test]
async fn test_item_client() {
    let (context, transport) = scripted(vec![
        respond(
            200,
            Some("application/json"),
            r#"{"externalId":"i1","aggregationStatus":"Created","sourceLastModifiedDate":"2024-05-01T00:00:00Z"}"#,
        ),
        respond(200, Some("application/json"), r#"[{"externalId":"i1"}]"#),
        respond(200, Some("application/json"), "[]"),
        respond(200, Some("application/json"), "[]"),
    ]);
    let client = ItemClient::new(context);

    let acceptance = client
        .submit(&ItemSubmission {
            external_id: "i1".into(),
            connector_id: "conn".into(),
            title: "Doc".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(acceptance.aggregation_status.as_deref(), Some("Created"));

    let items = client.get("ExternalId", "i1", None).await.unwrap();
    assert_eq!(items[0].external_id.as_deref(), Some("i1"));
    client.get("ExternalId", "i1", Some(5)).await.unwrap();
    client.get_multi_tenanted("ExternalId", "i1", "conn").await.unwrap();

    let seen = transport.seen();
    assert_eq!(seen[0].url, format!("{BASE}/connector/api/Items"));
    assert_eq!(
        seen[1].url,
        format!("{BASE}/connector/api/Items/ExternalId/i1?pagesize=20")
    );
    assert_eq!(
        seen[2].url,
        format!("{BASE}/connector/api/Items/ExternalId/i1?pagesize=5")
    );
    assert_eq!(
        seen[3].url,
        format!("{BASE}/connector/api/Items/ExternalId/i1?connectorId=conn")
    );
}

#[tokio::test]
async fn test_audit_event_client_uses_put() {
    let (context, transport) = scripted(vec![respond(204, None, "")]);

    AuditEventClient::new(context)
        .submit(&AuditEvent {
            event_external_id: "e1".into(),
            connector_id: "conn".into(),
            item_external_id: "i1".into(),
            event_type: "Viewed".into(),
            user_name: Some("alice".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let seen = transport.seen();
    assert_eq!(seen[0].method, Method::PUT);
    assert_eq!(seen[0].url, format!("{BASE}/connector/api/AuditEvents"));
    assert_eq!(sent_json(&transport, 0)["userName"], "alice");
    assert!(sent_json(&transport, 0).get("description").is_none());
}

#[tokio::test]
async fn test_notification_client() {
    let (context, transport) = scripted(vec![
        respond(
            200,
            Some("application/json"),
            r#"[{"id":"n1","notificationType":"ItemDestroyed","connectorId":"conn"}]"#,
        ),
        respond(200, None, ""),
    ]);
    let client = NotificationClient::new(context);

    let pending = client.list("conn").await.unwrap();
    assert_eq!(pending.len(), 1);

    client
        .acknowledge(&NotificationAcknowledge::new("conn", "n1", "OK").with_message("done"))
        .await
        .unwrap();

    let seen = transport.seen();
    assert_eq!(
        seen[0].url,
        format!("{BASE}/connector/api/Notifications?connectorId=conn")
    );
    assert_eq!(
        sent_json(&transport, 1),
        json!({
            "connectorId": "conn",
            "notificationId": "n1",
            "processingResult": "OK",
            "connectorStatusMessage": "done"
        })
    );
}

#[tokio::test]
async fn test_connector_config_client() {
    let (context, transport) = scripted(vec![
        respond(200, Some("application/json"), r#"{"id":"c1","displayName":"Share"}"#),
        respond(200, Some("application/json"), r#"{"id":"c2"}"#),
        respond(200, Some("application/json"), r#"[{"id":"c1"},{"id":"c2"}]"#),
    ]);
    let client = ConnectorConfigClient::new(context);

    assert_eq!(
        client.get("c1").await.unwrap().display_name.as_deref(),
        Some("Share")
    );
    assert_eq!(
        client.get_multi_tenanted("conn").await.unwrap().id.as_deref(),
        Some("c2")
    );
    assert_eq!(client.list().await.unwrap().len(), 2);

    let seen = transport.seen();
    assert_eq!(seen[0].url, format!("{BASE}/connector/api/ConnectorConfigurations/c1"));
    assert_eq!(
        seen[1].url,
        format!("{BASE}/connector/api/ConnectorConfigurations/GetMultiTenanted?connectorId=conn")
    );
    assert_eq!(seen[2].url, format!("{BASE}/connector/api/ConnectorConfigurations"));
}

#[tokio::test]
async fn test_binary_submit_posts_without_body() {
    let (context, transport) = scripted(vec![respond(200, None, "")]);

    BinaryClient::new(context)
        .submit("conn", "item 1", "bin-1")
        .await
        .unwrap();

    let seen = transport.seen();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(
        seen[0].url,
        format!(
            "{BASE}/connector/api/Binaries?ConnectorId=conn&ItemExternalId=item+1&BinaryExternalId=bin-1"
        )
    );
    assert!(seen[0].body.is_none());
}

#[tokio::test]
async fn test_binary_submit_file_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connector/api/Binaries/GetSASToken"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": format!("{}/blob/container/bin-1?sig=abc", server.uri()),
            "maxFileSize": 1048576
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/blob/container/bin-1"))
        .and(query_param("sig", "abc"))
        .and(header("x-ms-blob-type", "BlockBlob"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello blob"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/connector/api/Binaries/NotifyBinarySubmission"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"hello blob").unwrap();

    let context = context_with(Arc::new(ReqwestTransport::new().unwrap()), &server.uri());
    let submission = DirectBinarySubmission {
        connector_id: "conn".into(),
        item_external_id: "item-1".into(),
        binary_external_id: "bin-1".into(),
        mime_type: Some("text/plain".into()),
        file_size: 10,
        ..Default::default()
    };

    BinaryClient::new(context)
        .submit_file(&submission, file.path())
        .await
        .unwrap();

    // the blob store never sees the bearer token
    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    assert!(upload.headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_binary_submit_file_stops_when_upload_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connector/api/Binaries/GetSASToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": format!("{}/blob/x", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_string("AuthenticationFailed"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/connector/api/Binaries/NotifyBinarySubmission"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"content").unwrap();

    let context = context_with(Arc::new(ReqwestTransport::new().unwrap()), &server.uri());
    let err = BinaryClient::new(context)
        .submit_file(&DirectBinarySubmission::default(), file.path())
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
}
