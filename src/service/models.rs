//! Wire models for the connector API
//!
//! All models are plain values: build them with struct update syntax
//! (`..Default::default()`) and they are never mutated after deserialization.
//! Absent optional fields are omitted from serialized payloads.

use crate::decode::lenient_datetime;
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Shared
// ============================================================================

/// Name/type/value property attached to records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys_admin_only: Option<bool>,
}

impl Metadata {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind.into()),
            value: Some(value.into()),
            sys_admin_only: None,
        }
    }

    /// Property whose value may be absent; `None` values are sent as `""`
    pub fn optional(name: impl Into<String>, kind: impl Into<String>, value: Option<&str>) -> Self {
        Self::new(name, kind, value.unwrap_or_default())
    }
}

/// Link from one record to another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_item_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
}

/// Whether a record describes electronic content or a physical object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordMediaType {
    #[default]
    Electronic,
    Physical,
}

// ============================================================================
// Aggregations
// ============================================================================

/// Aggregation (container) submitted by a connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSubmission {
    pub external_id: String,
    pub connector_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_datetime")]
    pub source_last_modified_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_datetime")]
    pub source_created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_properties: Vec<Metadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<RecordMediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Aggregation as stored by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub item_number: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub last_modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default)]
    pub content_source: Option<String>,
    #[serde(default)]
    pub is_vital_record: Option<bool>,
    #[serde(default)]
    pub source_properties: Vec<Metadata>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub connector_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub source_last_modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_last_modified_by: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub source_created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_created_by: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub parent_external_id: Option<String>,
    #[serde(default)]
    pub barcode_type: Option<String>,
    #[serde(default)]
    pub barcode_value: Option<String>,
    #[serde(default)]
    pub record_category_id: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

// ============================================================================
// Items
// ============================================================================

/// Item (leaf record) submitted by a connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSubmission {
    pub external_id: String,
    pub connector_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_profile_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_properties: Vec<Metadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binaries_submitted: Vec<DirectBinarySubmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_datetime")]
    pub source_last_modified_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_datetime")]
    pub source_created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<RecordMediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Platform answer to an item submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAcceptance {
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub source_last_modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub aggregation_status: Option<String>,
}

/// Item as stored by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub item_number: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub connector_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub content_version: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub source_last_modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_last_modified_by: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub source_created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_created_by: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub parent_external_id: Option<String>,
    #[serde(default)]
    pub source_properties: Vec<Metadata>,
}

// ============================================================================
// Audit events
// ============================================================================

/// Event that happened to content in the source system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event_external_id: String,
    pub connector_id: String,
    pub item_external_id: String,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_properties: Vec<Metadata>,
}

// ============================================================================
// Binaries
// ============================================================================

/// Binary content attached to an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectBinarySubmission {
    pub connector_id: String,
    pub item_external_id: String,
    pub binary_external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "lenient_datetime")]
    pub source_last_modified_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub old_version: bool,
    #[serde(default)]
    pub skip_enrichment: bool,
}

/// Pre-authorized upload target for a binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectBinarySubmissionOutput {
    pub url: String,
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

// ============================================================================
// Notifications
// ============================================================================

/// Event pushed by the platform that a connector must acknowledge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub connector_id: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub item: Option<NotificationItem>,
    #[serde(default)]
    pub connector_config: Option<ConnectorConfig>,
}

/// Record a notification refers to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub item_number: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub connector_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub parent_external_id: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub source_last_modified_date: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_datetime")]
    pub source_created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_disposal_status: Option<String>,
    #[serde(default)]
    pub next_disposal_action: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub next_disposal_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_properties: Vec<Metadata>,
}

/// Outcome reported back for a processed notification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAcknowledge {
    pub connector_id: String,
    pub notification_id: String,
    pub processing_result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_status_message: Option<String>,
}

impl NotificationAcknowledge {
    pub fn new(
        connector_id: impl Into<String>,
        notification_id: impl Into<String>,
        processing_result: impl Into<String>,
    ) -> Self {
        Self {
            connector_id: connector_id.into(),
            notification_id: notification_id.into(),
            processing_result: processing_result.into(),
            connector_status_message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.connector_status_message = Some(message.into());
        self
    }
}

// ============================================================================
// Connector configuration
// ============================================================================

/// Connector registration as configured on the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub connector_type_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default, with = "lenient_datetime")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_datetime")]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub tenant_domain_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub has_submitted_data: Option<bool>,
    #[serde(default)]
    pub properties: Vec<Metadata>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub protection_enabled: Option<String>,
    /// Notification filter tree, kept as raw JSON
    #[serde(default)]
    pub filters: Option<JsonValue>,
}

impl ConnectorConfig {
    /// Value of a named property
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .and_then(|p| p.value.as_deref())
    }
}
