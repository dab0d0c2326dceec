//! Wire model for EventGrid event subscriptions
//!
//! Closed sum types for the API's tagged unions. The serde attributes
//! mirror ARM's JSON contract: destinations carry an `endpointType`
//! discriminator next to a `properties` object, advanced filters carry an
//! inline `operatorType`, and all property names are camelCase. Keeping the
//! unions closed means a newly added API variant is a compile error in
//! every match instead of a silently ignored branch.

use serde::{Deserialize, Serialize};

/// Where matching events are delivered. Exactly one variant per
/// subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "endpointType", content = "properties")]
pub enum Destination {
    AzureFunction(AzureFunctionProperties),
    EventHub(EventHubProperties),
    HybridConnection(HybridConnectionProperties),
    ServiceBusQueue(ServiceBusQueueProperties),
    ServiceBusTopic(ServiceBusTopicProperties),
    StorageQueue(StorageQueueProperties),
    WebHook(WebHookProperties),
}

impl Destination {
    /// The wire discriminator for this variant
    pub fn endpoint_type(&self) -> &'static str {
        match self {
            Destination::AzureFunction(_) => "AzureFunction",
            Destination::EventHub(_) => "EventHub",
            Destination::HybridConnection(_) => "HybridConnection",
            Destination::ServiceBusQueue(_) => "ServiceBusQueue",
            Destination::ServiceBusTopic(_) => "ServiceBusTopic",
            Destination::StorageQueue(_) => "StorageQueue",
            Destination::WebHook(_) => "WebHook",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureFunctionProperties {
    pub resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_events_per_batch: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_batch_size_in_kilobytes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHubProperties {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridConnectionProperties {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBusQueueProperties {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBusTopicProperties {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageQueueProperties {
    pub resource_id: String,
    pub queue_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_message_time_to_live_in_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebHookProperties {
    pub endpoint_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_events_per_batch: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_batch_size_in_kilobytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_active_directory_tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_active_directory_application_id_or_uri: Option<String>,
}

/// One predicate over an event-payload field. Scalar operators carry one
/// typed value; set operators carry an ordered list of at most
/// [`MAX_FILTER_VALUES_PER_BLOCK`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operatorType")]
pub enum AdvancedFilter {
    BoolEquals { key: String, value: bool },
    NumberGreaterThan { key: String, value: f64 },
    NumberGreaterThanOrEquals { key: String, value: f64 },
    NumberLessThan { key: String, value: f64 },
    NumberLessThanOrEquals { key: String, value: f64 },
    NumberIn { key: String, values: Vec<f64> },
    NumberNotIn { key: String, values: Vec<f64> },
    StringBeginsWith { key: String, values: Vec<String> },
    StringEndsWith { key: String, values: Vec<String> },
    StringContains { key: String, values: Vec<String> },
    StringIn { key: String, values: Vec<String> },
    StringNotIn { key: String, values: Vec<String> },
}

impl AdvancedFilter {
    pub fn key(&self) -> &str {
        match self {
            AdvancedFilter::BoolEquals { key, .. }
            | AdvancedFilter::NumberGreaterThan { key, .. }
            | AdvancedFilter::NumberGreaterThanOrEquals { key, .. }
            | AdvancedFilter::NumberLessThan { key, .. }
            | AdvancedFilter::NumberLessThanOrEquals { key, .. }
            | AdvancedFilter::NumberIn { key, .. }
            | AdvancedFilter::NumberNotIn { key, .. }
            | AdvancedFilter::StringBeginsWith { key, .. }
            | AdvancedFilter::StringEndsWith { key, .. }
            | AdvancedFilter::StringContains { key, .. }
            | AdvancedFilter::StringIn { key, .. }
            | AdvancedFilter::StringNotIn { key, .. } => key,
        }
    }

    /// How many values this filter contributes to the per-subscription cap
    pub fn value_count(&self) -> usize {
        match self {
            AdvancedFilter::BoolEquals { .. }
            | AdvancedFilter::NumberGreaterThan { .. }
            | AdvancedFilter::NumberGreaterThanOrEquals { .. }
            | AdvancedFilter::NumberLessThan { .. }
            | AdvancedFilter::NumberLessThanOrEquals { .. } => 1,
            AdvancedFilter::NumberIn { values, .. }
            | AdvancedFilter::NumberNotIn { values, .. } => values.len(),
            AdvancedFilter::StringBeginsWith { values, .. }
            | AdvancedFilter::StringEndsWith { values, .. }
            | AdvancedFilter::StringContains { values, .. }
            | AdvancedFilter::StringIn { values, .. }
            | AdvancedFilter::StringNotIn { values, .. } => values.len(),
        }
    }
}

/// Per set-operator block value limit
pub const MAX_FILTER_VALUES_PER_BLOCK: usize = 5;

/// Total advanced-filter value limit per subscription
pub const MAX_FILTER_VALUES_TOTAL: usize = 25;

/// Event matching rules for a subscription
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_begins_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_ends_with: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subject_case_sensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_event_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advanced_filters: Vec<AdvancedFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_advanced_filtering_on_arrays: Option<bool>,
}

/// Where undeliverable events are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "endpointType", content = "properties")]
pub enum DeadLetterDestination {
    StorageBlob(StorageBlobDeadLetterProperties),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageBlobDeadLetterProperties {
    pub resource_id: String,
    pub blob_container_name: String,
}

/// Delivery retry tuning; both fields are required when the policy is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_delivery_attempts: i64,
    pub event_time_to_live_in_minutes: i64,
}

/// The full translated shape of one event subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSubscriptionProperties {
    pub destination: Destination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SubscriptionFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_letter_destination: Option<DeadLetterDestination>,
}
