//! Typed configuration model for event subscriptions
//!
//! The flat configuration document is decoded once, at this boundary, into
//! the structs below; the translator never touches untyped maps. Optional
//! integers use the zero-as-unset convention of the configuration surface
//! (a user cannot ask for batch size 0), and optional strings use `""`.
//! Flatten always produces a fully populated struct, so zero values stand
//! in for absent keys.

use std::collections::HashMap;

use lyra_core::value::Value;
use serde::Serialize;

/// The mutually exclusive endpoint fields, in expand priority order.
/// The two deprecated block forms are legacy encodings of their `_id`
/// siblings and share a variant with them.
pub const ENDPOINT_FIELDS: [&str; 9] = [
    "azure_function_endpoint",
    "eventhub_endpoint_id",
    "eventhub_endpoint",
    "hybrid_connection_endpoint_id",
    "hybrid_connection_endpoint",
    "service_bus_queue_endpoint_id",
    "service_bus_topic_endpoint_id",
    "storage_queue_endpoint",
    "webhook_endpoint",
];

/// Configuration decode error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("attribute {field:?}: expected {expected}, got {got}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("attribute {field:?} is required")]
    MissingField { field: String },

    #[error("advanced_filter block {operator:?}: the filter key must not be empty")]
    EmptyFilterKey { operator: &'static str },

    #[error(
        "advanced_filter {operator:?} for key {key:?}: value {value:?} is not numeric"
    )]
    TypeCoercion {
        operator: &'static str,
        key: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EventSubscriptionConfig {
    pub azure_function_endpoint: Option<AzureFunctionEndpoint>,
    pub eventhub_endpoint_id: String,
    pub eventhub_endpoint: Option<EventHubEndpoint>,
    pub hybrid_connection_endpoint_id: String,
    pub hybrid_connection_endpoint: Option<HybridConnectionEndpoint>,
    pub service_bus_queue_endpoint_id: String,
    pub service_bus_topic_endpoint_id: String,
    pub storage_queue_endpoint: Option<StorageQueueEndpoint>,
    pub webhook_endpoint: Option<WebHookEndpoint>,
    pub included_event_types: Vec<String>,
    pub labels: Vec<String>,
    pub advanced_filtering_on_arrays_enabled: bool,
    pub subject_filter: Option<SubjectFilterConfig>,
    pub advanced_filter: Option<AdvancedFilterConfig>,
    pub retry_policy: Option<RetryPolicyConfig>,
    pub storage_blob_dead_letter_destination: Option<DeadLetterConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AzureFunctionEndpoint {
    pub function_id: String,
    pub max_events_per_batch: i64,
    pub preferred_batch_size_in_kilobytes: i64,
}

/// Deprecated block form of `eventhub_endpoint_id`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EventHubEndpoint {
    pub eventhub_id: String,
}

/// Deprecated block form of `hybrid_connection_endpoint_id`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HybridConnectionEndpoint {
    pub hybrid_connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StorageQueueEndpoint {
    pub storage_account_id: String,
    pub queue_name: String,
    pub queue_message_time_to_live_in_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WebHookEndpoint {
    pub url: String,
    /// Populated from the API on flatten; ignored on expand
    pub base_url: String,
    pub max_events_per_batch: i64,
    pub preferred_batch_size_in_kilobytes: i64,
    pub active_directory_tenant_id: String,
    pub active_directory_app_id_or_uri: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SubjectFilterConfig {
    pub subject_begins_with: String,
    pub subject_ends_with: String,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RetryPolicyConfig {
    pub max_delivery_attempts: i64,
    pub event_time_to_live: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeadLetterConfig {
    pub storage_account_id: String,
    pub storage_blob_container_name: String,
}

/// One scalar filter block: `{ key, value }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolFilter {
    pub key: String,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberFilter {
    pub key: String,
    pub value: f64,
}

/// One set filter block: `{ key, values }`, 1-5 values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberListFilter {
    pub key: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringListFilter {
    pub key: String,
    pub values: Vec<String>,
}

/// The twelve operator blocks, in their fixed declaration order.
///
/// Expand walks the fields in this order and each Vec in input order, so
/// the produced filter list is deterministic regardless of how the source
/// document stored its keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AdvancedFilterConfig {
    pub bool_equals: Vec<BoolFilter>,
    pub number_greater_than: Vec<NumberFilter>,
    pub number_greater_than_or_equals: Vec<NumberFilter>,
    pub number_less_than: Vec<NumberFilter>,
    pub number_less_than_or_equals: Vec<NumberFilter>,
    pub number_in: Vec<NumberListFilter>,
    pub number_not_in: Vec<NumberListFilter>,
    pub string_begins_with: Vec<StringListFilter>,
    pub string_ends_with: Vec<StringListFilter>,
    pub string_contains: Vec<StringListFilter>,
    pub string_in: Vec<StringListFilter>,
    pub string_not_in: Vec<StringListFilter>,
}

impl AdvancedFilterConfig {
    pub fn is_empty(&self) -> bool {
        self.bool_equals.is_empty()
            && self.number_greater_than.is_empty()
            && self.number_greater_than_or_equals.is_empty()
            && self.number_less_than.is_empty()
            && self.number_less_than_or_equals.is_empty()
            && self.number_in.is_empty()
            && self.number_not_in.is_empty()
            && self.string_begins_with.is_empty()
            && self.string_ends_with.is_empty()
            && self.string_contains.is_empty()
            && self.string_in.is_empty()
            && self.string_not_in.is_empty()
    }
}

impl EventSubscriptionConfig {
    /// Decode a configuration document into the typed model. This is the
    /// single place untyped values are inspected; all later stages work on
    /// the typed structs.
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let map = expect_map(value, "event_subscription")?;

        Ok(Self {
            azure_function_endpoint: decode_block(map, "azure_function_endpoint", |block| {
                Ok(AzureFunctionEndpoint {
                    function_id: require_str(block, "azure_function_endpoint", "function_id")?,
                    max_events_per_batch: optional_i64(block, "max_events_per_batch")?,
                    preferred_batch_size_in_kilobytes: optional_i64(
                        block,
                        "preferred_batch_size_in_kilobytes",
                    )?,
                })
            })?,
            eventhub_endpoint_id: optional_str(map, "eventhub_endpoint_id")?,
            eventhub_endpoint: decode_block(map, "eventhub_endpoint", |block| {
                Ok(EventHubEndpoint {
                    eventhub_id: optional_str(block, "eventhub_id")?,
                })
            })?,
            hybrid_connection_endpoint_id: optional_str(map, "hybrid_connection_endpoint_id")?,
            hybrid_connection_endpoint: decode_block(map, "hybrid_connection_endpoint", |block| {
                Ok(HybridConnectionEndpoint {
                    hybrid_connection_id: optional_str(block, "hybrid_connection_id")?,
                })
            })?,
            service_bus_queue_endpoint_id: optional_str(map, "service_bus_queue_endpoint_id")?,
            service_bus_topic_endpoint_id: optional_str(map, "service_bus_topic_endpoint_id")?,
            storage_queue_endpoint: decode_block(map, "storage_queue_endpoint", |block| {
                Ok(StorageQueueEndpoint {
                    storage_account_id: require_str(
                        block,
                        "storage_queue_endpoint",
                        "storage_account_id",
                    )?,
                    queue_name: require_str(block, "storage_queue_endpoint", "queue_name")?,
                    queue_message_time_to_live_in_seconds: optional_i64(
                        block,
                        "queue_message_time_to_live_in_seconds",
                    )?,
                })
            })?,
            webhook_endpoint: decode_block(map, "webhook_endpoint", |block| {
                Ok(WebHookEndpoint {
                    url: require_str(block, "webhook_endpoint", "url")?,
                    base_url: optional_str(block, "base_url")?,
                    max_events_per_batch: optional_i64(block, "max_events_per_batch")?,
                    preferred_batch_size_in_kilobytes: optional_i64(
                        block,
                        "preferred_batch_size_in_kilobytes",
                    )?,
                    active_directory_tenant_id: optional_str(block, "active_directory_tenant_id")?,
                    active_directory_app_id_or_uri: optional_str(
                        block,
                        "active_directory_app_id_or_uri",
                    )?,
                })
            })?,
            included_event_types: string_list(map, "included_event_types")?,
            labels: string_list(map, "labels")?,
            advanced_filtering_on_arrays_enabled: optional_bool(
                map,
                "advanced_filtering_on_arrays_enabled",
            )?,
            subject_filter: decode_block(map, "subject_filter", |block| {
                Ok(SubjectFilterConfig {
                    subject_begins_with: optional_str(block, "subject_begins_with")?,
                    subject_ends_with: optional_str(block, "subject_ends_with")?,
                    case_sensitive: optional_bool(block, "case_sensitive")?,
                })
            })?,
            advanced_filter: decode_block(map, "advanced_filter", decode_advanced_filter)?,
            retry_policy: decode_block(map, "retry_policy", |block| {
                Ok(RetryPolicyConfig {
                    max_delivery_attempts: require_i64(
                        block,
                        "retry_policy",
                        "max_delivery_attempts",
                    )?,
                    event_time_to_live: require_i64(block, "retry_policy", "event_time_to_live")?,
                })
            })?,
            storage_blob_dead_letter_destination: decode_block(
                map,
                "storage_blob_dead_letter_destination",
                |block| {
                    Ok(DeadLetterConfig {
                        storage_account_id: require_str(
                            block,
                            "storage_blob_dead_letter_destination",
                            "storage_account_id",
                        )?,
                        storage_blob_container_name: require_str(
                            block,
                            "storage_blob_dead_letter_destination",
                            "storage_blob_container_name",
                        )?,
                    })
                },
            )?,
        })
    }

    /// Fold the deprecated block encodings into their canonical `_id`
    /// fields. The ID field wins when both forms are populated. Expand and
    /// flatten both work on the canonical form, so
    /// `flatten(expand(c)) == c.canonicalize()`.
    pub fn canonicalize(mut self) -> Self {
        if let Some(block) = self.eventhub_endpoint.take()
            && self.eventhub_endpoint_id.is_empty()
        {
            self.eventhub_endpoint_id = block.eventhub_id;
        }
        if let Some(block) = self.hybrid_connection_endpoint.take()
            && self.hybrid_connection_endpoint_id.is_empty()
        {
            self.hybrid_connection_endpoint_id = block.hybrid_connection_id;
        }
        self
    }
}

fn decode_advanced_filter(map: &HashMap<String, Value>) -> Result<AdvancedFilterConfig, DecodeError> {
    Ok(AdvancedFilterConfig {
        bool_equals: decode_blocks(map, "bool_equals", |block| {
            Ok(BoolFilter {
                key: filter_key(block, "bool_equals")?,
                value: optional_bool(block, "value")?,
            })
        })?,
        number_greater_than: decode_scalar_number(map, "number_greater_than")?,
        number_greater_than_or_equals: decode_scalar_number(map, "number_greater_than_or_equals")?,
        number_less_than: decode_scalar_number(map, "number_less_than")?,
        number_less_than_or_equals: decode_scalar_number(map, "number_less_than_or_equals")?,
        number_in: decode_number_list(map, "number_in")?,
        number_not_in: decode_number_list(map, "number_not_in")?,
        string_begins_with: decode_string_list(map, "string_begins_with")?,
        string_ends_with: decode_string_list(map, "string_ends_with")?,
        string_contains: decode_string_list(map, "string_contains")?,
        string_in: decode_string_list(map, "string_in")?,
        string_not_in: decode_string_list(map, "string_not_in")?,
    })
}

fn decode_scalar_number(
    map: &HashMap<String, Value>,
    operator: &'static str,
) -> Result<Vec<NumberFilter>, DecodeError> {
    decode_blocks(map, operator, |block| {
        let key = filter_key(block, operator)?;
        let value = match block.get("value") {
            Some(v) => v.as_f64().ok_or_else(|| DecodeError::TypeCoercion {
                operator,
                key: key.clone(),
                value: render(v),
            })?,
            None => return Err(DecodeError::MissingField {
                field: format!("{operator}.value"),
            }),
        };
        Ok(NumberFilter { key, value })
    })
}

fn decode_number_list(
    map: &HashMap<String, Value>,
    operator: &'static str,
) -> Result<Vec<NumberListFilter>, DecodeError> {
    decode_blocks(map, operator, |block| {
        let key = filter_key(block, operator)?;
        let items = match block.get("values") {
            Some(Value::List(items)) => items,
            Some(other) => {
                return Err(DecodeError::UnexpectedType {
                    field: format!("{operator}.values"),
                    expected: "List",
                    got: other.type_name(),
                });
            }
            None => {
                return Err(DecodeError::MissingField {
                    field: format!("{operator}.values"),
                });
            }
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let value = item.as_f64().ok_or_else(|| DecodeError::TypeCoercion {
                operator,
                key: key.clone(),
                value: render(item),
            })?;
            values.push(value);
        }
        Ok(NumberListFilter { key, values })
    })
}

fn decode_string_list(
    map: &HashMap<String, Value>,
    operator: &'static str,
) -> Result<Vec<StringListFilter>, DecodeError> {
    decode_blocks(map, operator, |block| {
        let key = filter_key(block, operator)?;
        let items = match block.get("values") {
            Some(Value::List(items)) => items,
            Some(other) => {
                return Err(DecodeError::UnexpectedType {
                    field: format!("{operator}.values"),
                    expected: "List",
                    got: other.type_name(),
                });
            }
            None => {
                return Err(DecodeError::MissingField {
                    field: format!("{operator}.values"),
                });
            }
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) => values.push(s.clone()),
                other => {
                    return Err(DecodeError::UnexpectedType {
                        field: format!("{operator}.values"),
                        expected: "String",
                        got: other.type_name(),
                    });
                }
            }
        }
        Ok(StringListFilter { key, values })
    })
}

fn filter_key(
    block: &HashMap<String, Value>,
    operator: &'static str,
) -> Result<String, DecodeError> {
    let key = optional_str(block, "key")?;
    if key.is_empty() {
        return Err(DecodeError::EmptyFilterKey { operator });
    }
    Ok(key)
}

fn expect_map<'a>(
    value: &'a Value,
    field: &str,
) -> Result<&'a HashMap<String, Value>, DecodeError> {
    value.as_map().ok_or_else(|| DecodeError::UnexpectedType {
        field: field.to_string(),
        expected: "Map",
        got: value.type_name(),
    })
}

/// A block is a single nested object, written either inline or as a
/// one-element list (the flat configuration model allows both spellings)
fn decode_block<T>(
    map: &HashMap<String, Value>,
    field: &str,
    decode: impl FnOnce(&HashMap<String, Value>) -> Result<T, DecodeError>,
) -> Result<Option<T>, DecodeError> {
    let Some(value) = map.get(field) else {
        return Ok(None);
    };
    match value {
        Value::Map(block) => decode(block).map(Some),
        Value::List(items) if items.is_empty() => Ok(None),
        Value::List(items) if items.len() == 1 => {
            let block = expect_map(&items[0], field)?;
            decode(block).map(Some)
        }
        other => Err(DecodeError::UnexpectedType {
            field: field.to_string(),
            expected: "Map or single-element List",
            got: other.type_name(),
        }),
    }
}

/// A repeated block: a list of nested objects, order preserved
fn decode_blocks<T>(
    map: &HashMap<String, Value>,
    field: &'static str,
    decode: impl Fn(&HashMap<String, Value>) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    let Some(value) = map.get(field) else {
        return Ok(Vec::new());
    };
    let items = match value {
        Value::List(items) => items,
        other => {
            return Err(DecodeError::UnexpectedType {
                field: field.to_string(),
                expected: "List",
                got: other.type_name(),
            });
        }
    };
    let mut decoded = Vec::with_capacity(items.len());
    for item in items {
        decoded.push(decode(expect_map(item, field)?)?);
    }
    Ok(decoded)
}

fn optional_str(map: &HashMap<String, Value>, field: &str) -> Result<String, DecodeError> {
    match map.get(field) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(DecodeError::UnexpectedType {
            field: field.to_string(),
            expected: "String",
            got: other.type_name(),
        }),
    }
}

fn require_str(
    map: &HashMap<String, Value>,
    block: &str,
    field: &str,
) -> Result<String, DecodeError> {
    let value = optional_str(map, field)?;
    if value.is_empty() {
        return Err(DecodeError::MissingField {
            field: format!("{block}.{field}"),
        });
    }
    Ok(value)
}

fn optional_i64(map: &HashMap<String, Value>, field: &str) -> Result<i64, DecodeError> {
    match map.get(field) {
        None => Ok(0),
        Some(Value::Int(n)) => Ok(*n),
        Some(other) => Err(DecodeError::UnexpectedType {
            field: field.to_string(),
            expected: "Int",
            got: other.type_name(),
        }),
    }
}

fn require_i64(
    map: &HashMap<String, Value>,
    block: &str,
    field: &str,
) -> Result<i64, DecodeError> {
    match map.get(field) {
        Some(Value::Int(n)) => Ok(*n),
        Some(other) => Err(DecodeError::UnexpectedType {
            field: field.to_string(),
            expected: "Int",
            got: other.type_name(),
        }),
        None => Err(DecodeError::MissingField {
            field: format!("{block}.{field}"),
        }),
    }
}

fn optional_bool(map: &HashMap<String, Value>, field: &str) -> Result<bool, DecodeError> {
    match map.get(field) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(DecodeError::UnexpectedType {
            field: field.to_string(),
            expected: "Bool",
            got: other.type_name(),
        }),
    }
}

fn string_list(map: &HashMap<String, Value>, field: &str) -> Result<Vec<String>, DecodeError> {
    match map.get(field) {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    other => {
                        return Err(DecodeError::UnexpectedType {
                            field: field.to_string(),
                            expected: "String",
                            got: other.type_name(),
                        });
                    }
                }
            }
            Ok(out)
        }
        Some(other) => Err(DecodeError::UnexpectedType {
            field: field.to_string(),
            expected: "List",
            got: other.type_name(),
        }),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.type_name().to_string(),
    }
}
