//! Configuration to wire model translation

use super::config::{
    AdvancedFilterConfig, DeadLetterConfig, ENDPOINT_FIELDS, EventSubscriptionConfig,
    RetryPolicyConfig,
};
use super::wire::{
    AdvancedFilter, AzureFunctionProperties, DeadLetterDestination, Destination,
    EventHubProperties, EventSubscriptionProperties, HybridConnectionProperties,
    MAX_FILTER_VALUES_PER_BLOCK, MAX_FILTER_VALUES_TOTAL, RetryPolicy,
    ServiceBusQueueProperties, ServiceBusTopicProperties, StorageBlobDeadLetterProperties,
    StorageQueueProperties, SubscriptionFilter, WebHookProperties,
};

pub const MIN_DELIVERY_ATTEMPTS: i64 = 1;
pub const MAX_DELIVERY_ATTEMPTS: i64 = 30;
pub const MIN_EVENT_TTL_MINUTES: i64 = 1;
pub const MAX_EVENT_TTL_MINUTES: i64 = 1440;

/// Translation failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslateError {
    #[error("no endpoint configured; exactly one of {alternatives:?} must be set")]
    MissingEndpoint { alternatives: Vec<String> },

    #[error("conflicting endpoints {set:?}; exactly one endpoint may be set")]
    ConflictingEndpoints { set: Vec<String> },

    #[error(
        "advanced_filter {operator:?} for key {key:?} has {count} values; at most {max} are allowed per block"
    )]
    TooManyFilterValues {
        operator: &'static str,
        key: String,
        count: usize,
        max: usize,
    },

    #[error("advanced_filter {operator:?} for key {key:?} has no values")]
    EmptyFilterValues { operator: &'static str, key: String },

    #[error(
        "advanced_filter blocks hold {count} values in total; at most {max} are allowed per subscription"
    )]
    TotalFilterValuesExceeded { count: usize, max: usize },

    #[error("retry_policy.{field} is {got}; allowed range is [{min}, {max}]")]
    RetryPolicyOutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        got: i64,
    },
}

/// Translate a whole configuration into the wire shape. The input is
/// canonicalized first, so deprecated block encodings behave exactly like
/// their `_id` fields.
pub fn expand_event_subscription(
    config: &EventSubscriptionConfig,
) -> Result<EventSubscriptionProperties, TranslateError> {
    let config = config.clone().canonicalize();
    Ok(EventSubscriptionProperties {
        destination: destination_of(&config)?,
        filter: expand_subscription_filter(&config)?,
        labels: config.labels.clone(),
        retry_policy: expand_retry_policy(config.retry_policy.as_ref())?,
        dead_letter_destination: expand_dead_letter(
            config.storage_blob_dead_letter_destination.as_ref(),
        ),
    })
}

/// Pick the single configured endpoint. Zero endpoints and more than one
/// endpoint are both errors, and the conflict error names every field that
/// was set. Standalone entry point; the input is canonicalized here, while
/// [`expand_event_subscription`] passes the already-canonical form down.
pub fn expand_destination(
    config: &EventSubscriptionConfig,
) -> Result<Destination, TranslateError> {
    destination_of(&config.clone().canonicalize())
}

/// `config` must already be canonical
fn destination_of(config: &EventSubscriptionConfig) -> Result<Destination, TranslateError> {
    let mut set: Vec<&'static str> = Vec::new();
    if config.azure_function_endpoint.is_some() {
        set.push("azure_function_endpoint");
    }
    if !config.eventhub_endpoint_id.is_empty() {
        set.push("eventhub_endpoint_id");
    }
    if !config.hybrid_connection_endpoint_id.is_empty() {
        set.push("hybrid_connection_endpoint_id");
    }
    if !config.service_bus_queue_endpoint_id.is_empty() {
        set.push("service_bus_queue_endpoint_id");
    }
    if !config.service_bus_topic_endpoint_id.is_empty() {
        set.push("service_bus_topic_endpoint_id");
    }
    if config.storage_queue_endpoint.is_some() {
        set.push("storage_queue_endpoint");
    }
    if config.webhook_endpoint.is_some() {
        set.push("webhook_endpoint");
    }

    match set.len() {
        0 => {
            return Err(TranslateError::MissingEndpoint {
                alternatives: ENDPOINT_FIELDS.iter().map(|f| f.to_string()).collect(),
            });
        }
        1 => {}
        _ => {
            return Err(TranslateError::ConflictingEndpoints {
                set: set.iter().map(|f| f.to_string()).collect(),
            });
        }
    }

    if let Some(endpoint) = &config.azure_function_endpoint {
        return Ok(Destination::AzureFunction(AzureFunctionProperties {
            resource_id: endpoint.function_id.clone(),
            max_events_per_batch: opt(endpoint.max_events_per_batch),
            preferred_batch_size_in_kilobytes: opt(endpoint.preferred_batch_size_in_kilobytes),
        }));
    }
    if !config.eventhub_endpoint_id.is_empty() {
        return Ok(Destination::EventHub(EventHubProperties {
            resource_id: config.eventhub_endpoint_id.clone(),
        }));
    }
    if !config.hybrid_connection_endpoint_id.is_empty() {
        return Ok(Destination::HybridConnection(HybridConnectionProperties {
            resource_id: config.hybrid_connection_endpoint_id.clone(),
        }));
    }
    if !config.service_bus_queue_endpoint_id.is_empty() {
        return Ok(Destination::ServiceBusQueue(ServiceBusQueueProperties {
            resource_id: config.service_bus_queue_endpoint_id.clone(),
        }));
    }
    if !config.service_bus_topic_endpoint_id.is_empty() {
        return Ok(Destination::ServiceBusTopic(ServiceBusTopicProperties {
            resource_id: config.service_bus_topic_endpoint_id.clone(),
        }));
    }
    if let Some(endpoint) = &config.storage_queue_endpoint {
        return Ok(Destination::StorageQueue(StorageQueueProperties {
            resource_id: endpoint.storage_account_id.clone(),
            queue_name: endpoint.queue_name.clone(),
            queue_message_time_to_live_in_seconds: opt(
                endpoint.queue_message_time_to_live_in_seconds,
            ),
        }));
    }
    if let Some(endpoint) = &config.webhook_endpoint {
        return Ok(Destination::WebHook(WebHookProperties {
            endpoint_url: endpoint.url.clone(),
            max_events_per_batch: opt(endpoint.max_events_per_batch),
            preferred_batch_size_in_kilobytes: opt(endpoint.preferred_batch_size_in_kilobytes),
            azure_active_directory_tenant_id: opt_str(&endpoint.active_directory_tenant_id),
            azure_active_directory_application_id_or_uri: opt_str(
                &endpoint.active_directory_app_id_or_uri,
            ),
        }));
    }

    unreachable!("endpoint count was checked above")
}

/// Build the wire filter, or None when nothing filter-related is set
pub fn expand_subscription_filter(
    config: &EventSubscriptionConfig,
) -> Result<Option<SubscriptionFilter>, TranslateError> {
    let advanced_filters = match &config.advanced_filter {
        Some(filter) => expand_filter(filter)?,
        None => Vec::new(),
    };

    let subject = config.subject_filter.as_ref();
    let filter = SubscriptionFilter {
        subject_begins_with: subject.and_then(|s| opt_str(&s.subject_begins_with)),
        subject_ends_with: subject.and_then(|s| opt_str(&s.subject_ends_with)),
        is_subject_case_sensitive: subject.map(|s| s.case_sensitive),
        included_event_types: if config.included_event_types.is_empty() {
            None
        } else {
            Some(config.included_event_types.clone())
        },
        advanced_filters,
        enable_advanced_filtering_on_arrays: if config.advanced_filtering_on_arrays_enabled {
            Some(true)
        } else {
            None
        },
    };

    if filter == SubscriptionFilter::default() {
        return Ok(None);
    }
    Ok(Some(filter))
}

/// Flatten the twelve operator blocks into one ordered wire list. Blocks
/// are emitted in field declaration order, and within a field in input
/// order, so the result is deterministic.
pub fn expand_filter(
    config: &AdvancedFilterConfig,
) -> Result<Vec<AdvancedFilter>, TranslateError> {
    let mut filters = Vec::new();

    for block in &config.bool_equals {
        filters.push(AdvancedFilter::BoolEquals {
            key: block.key.clone(),
            value: block.value,
        });
    }
    for block in &config.number_greater_than {
        filters.push(AdvancedFilter::NumberGreaterThan {
            key: block.key.clone(),
            value: block.value,
        });
    }
    for block in &config.number_greater_than_or_equals {
        filters.push(AdvancedFilter::NumberGreaterThanOrEquals {
            key: block.key.clone(),
            value: block.value,
        });
    }
    for block in &config.number_less_than {
        filters.push(AdvancedFilter::NumberLessThan {
            key: block.key.clone(),
            value: block.value,
        });
    }
    for block in &config.number_less_than_or_equals {
        filters.push(AdvancedFilter::NumberLessThanOrEquals {
            key: block.key.clone(),
            value: block.value,
        });
    }
    for block in &config.number_in {
        check_values("number_in", &block.key, block.values.len())?;
        filters.push(AdvancedFilter::NumberIn {
            key: block.key.clone(),
            values: block.values.clone(),
        });
    }
    for block in &config.number_not_in {
        check_values("number_not_in", &block.key, block.values.len())?;
        filters.push(AdvancedFilter::NumberNotIn {
            key: block.key.clone(),
            values: block.values.clone(),
        });
    }
    for block in &config.string_begins_with {
        check_values("string_begins_with", &block.key, block.values.len())?;
        filters.push(AdvancedFilter::StringBeginsWith {
            key: block.key.clone(),
            values: block.values.clone(),
        });
    }
    for block in &config.string_ends_with {
        check_values("string_ends_with", &block.key, block.values.len())?;
        filters.push(AdvancedFilter::StringEndsWith {
            key: block.key.clone(),
            values: block.values.clone(),
        });
    }
    for block in &config.string_contains {
        check_values("string_contains", &block.key, block.values.len())?;
        filters.push(AdvancedFilter::StringContains {
            key: block.key.clone(),
            values: block.values.clone(),
        });
    }
    for block in &config.string_in {
        check_values("string_in", &block.key, block.values.len())?;
        filters.push(AdvancedFilter::StringIn {
            key: block.key.clone(),
            values: block.values.clone(),
        });
    }
    for block in &config.string_not_in {
        check_values("string_not_in", &block.key, block.values.len())?;
        filters.push(AdvancedFilter::StringNotIn {
            key: block.key.clone(),
            values: block.values.clone(),
        });
    }

    let total: usize = filters.iter().map(AdvancedFilter::value_count).sum();
    if total > MAX_FILTER_VALUES_TOTAL {
        return Err(TranslateError::TotalFilterValuesExceeded {
            count: total,
            max: MAX_FILTER_VALUES_TOTAL,
        });
    }

    Ok(filters)
}

fn check_values(operator: &'static str, key: &str, count: usize) -> Result<(), TranslateError> {
    if count == 0 {
        return Err(TranslateError::EmptyFilterValues {
            operator,
            key: key.to_string(),
        });
    }
    if count > MAX_FILTER_VALUES_PER_BLOCK {
        return Err(TranslateError::TooManyFilterValues {
            operator,
            key: key.to_string(),
            count,
            max: MAX_FILTER_VALUES_PER_BLOCK,
        });
    }
    Ok(())
}

pub fn expand_retry_policy(
    config: Option<&RetryPolicyConfig>,
) -> Result<Option<RetryPolicy>, TranslateError> {
    let Some(config) = config else {
        return Ok(None);
    };
    if !(MIN_DELIVERY_ATTEMPTS..=MAX_DELIVERY_ATTEMPTS).contains(&config.max_delivery_attempts) {
        return Err(TranslateError::RetryPolicyOutOfRange {
            field: "max_delivery_attempts",
            min: MIN_DELIVERY_ATTEMPTS,
            max: MAX_DELIVERY_ATTEMPTS,
            got: config.max_delivery_attempts,
        });
    }
    if !(MIN_EVENT_TTL_MINUTES..=MAX_EVENT_TTL_MINUTES).contains(&config.event_time_to_live) {
        return Err(TranslateError::RetryPolicyOutOfRange {
            field: "event_time_to_live",
            min: MIN_EVENT_TTL_MINUTES,
            max: MAX_EVENT_TTL_MINUTES,
            got: config.event_time_to_live,
        });
    }
    Ok(Some(RetryPolicy {
        max_delivery_attempts: config.max_delivery_attempts,
        event_time_to_live_in_minutes: config.event_time_to_live,
    }))
}

pub fn expand_dead_letter(config: Option<&DeadLetterConfig>) -> Option<DeadLetterDestination> {
    config.map(|c| {
        DeadLetterDestination::StorageBlob(StorageBlobDeadLetterProperties {
            resource_id: c.storage_account_id.clone(),
            blob_container_name: c.storage_blob_container_name.clone(),
        })
    })
}

/// Zero means unset for optional configuration integers
fn opt(n: i64) -> Option<i64> {
    if n == 0 { None } else { Some(n) }
}

fn opt_str(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::config::{
        AzureFunctionEndpoint, NumberListFilter, StorageQueueEndpoint, StringListFilter,
        WebHookEndpoint,
    };
    use super::*;

    #[test]
    fn storage_queue_endpoint_expands_with_zero_ttl_as_unset() {
        let config = EventSubscriptionConfig {
            storage_queue_endpoint: Some(StorageQueueEndpoint {
                storage_account_id: "/sa1".to_string(),
                queue_name: "q1".to_string(),
                queue_message_time_to_live_in_seconds: 0,
            }),
            ..Default::default()
        };
        let dest = expand_destination(&config).unwrap();
        assert_eq!(
            dest,
            Destination::StorageQueue(StorageQueueProperties {
                resource_id: "/sa1".to_string(),
                queue_name: "q1".to_string(),
                queue_message_time_to_live_in_seconds: None,
            })
        );
    }

    #[test]
    fn no_endpoint_is_an_error_naming_all_alternatives() {
        let err = expand_destination(&EventSubscriptionConfig::default()).unwrap_err();
        match err {
            TranslateError::MissingEndpoint { alternatives } => {
                assert_eq!(alternatives.len(), ENDPOINT_FIELDS.len());
                assert!(alternatives.contains(&"webhook_endpoint".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn two_endpoints_conflict() {
        let config = EventSubscriptionConfig {
            eventhub_endpoint_id: "/eh1".to_string(),
            service_bus_queue_endpoint_id: "/sbq1".to_string(),
            ..Default::default()
        };
        let err = expand_destination(&config).unwrap_err();
        assert_eq!(
            err,
            TranslateError::ConflictingEndpoints {
                set: vec![
                    "eventhub_endpoint_id".to_string(),
                    "service_bus_queue_endpoint_id".to_string(),
                ],
            }
        );
    }

    #[test]
    fn deprecated_eventhub_block_expands_like_the_id_field() {
        let config = EventSubscriptionConfig {
            eventhub_endpoint: Some(super::super::config::EventHubEndpoint {
                eventhub_id: "/eh1".to_string(),
            }),
            ..Default::default()
        };
        let dest = expand_destination(&config).unwrap();
        assert_eq!(
            dest,
            Destination::EventHub(EventHubProperties {
                resource_id: "/eh1".to_string(),
            })
        );
    }

    #[test]
    fn subscription_expand_accepts_deprecated_block() {
        // The orchestrated path canonicalizes once up front and the
        // destination step still sees the folded form.
        let config = EventSubscriptionConfig {
            eventhub_endpoint: Some(super::super::config::EventHubEndpoint {
                eventhub_id: "/eh1".to_string(),
            }),
            ..Default::default()
        };
        let props = expand_event_subscription(&config).unwrap();
        assert_eq!(
            props.destination,
            Destination::EventHub(EventHubProperties {
                resource_id: "/eh1".to_string(),
            })
        );
    }

    #[test]
    fn webhook_expands_optional_batch_fields() {
        let config = EventSubscriptionConfig {
            webhook_endpoint: Some(WebHookEndpoint {
                url: "https://example.com/hook".to_string(),
                max_events_per_batch: 10,
                ..Default::default()
            }),
            ..Default::default()
        };
        let dest = expand_destination(&config).unwrap();
        match dest {
            Destination::WebHook(props) => {
                assert_eq!(props.endpoint_url, "https://example.com/hook");
                assert_eq!(props.max_events_per_batch, Some(10));
                assert_eq!(props.preferred_batch_size_in_kilobytes, None);
                assert_eq!(props.azure_active_directory_tenant_id, None);
            }
            other => panic!("unexpected destination: {other:?}"),
        }
    }

    #[test]
    fn azure_function_priority_beats_later_endpoints_only_via_conflict() {
        let config = EventSubscriptionConfig {
            azure_function_endpoint: Some(AzureFunctionEndpoint {
                function_id: "/fn1".to_string(),
                max_events_per_batch: 0,
                preferred_batch_size_in_kilobytes: 64,
            }),
            ..Default::default()
        };
        let dest = expand_destination(&config).unwrap();
        assert_eq!(
            dest,
            Destination::AzureFunction(AzureFunctionProperties {
                resource_id: "/fn1".to_string(),
                max_events_per_batch: None,
                preferred_batch_size_in_kilobytes: Some(64),
            })
        );
    }

    #[test]
    fn filter_blocks_expand_in_declaration_order() {
        let config = AdvancedFilterConfig {
            string_in: vec![StringListFilter {
                key: "subject".to_string(),
                values: vec!["a".to_string()],
            }],
            number_in: vec![NumberListFilter {
                key: "data.contentLength".to_string(),
                values: vec![0.0, 1.0, 1.0, 2.0, 3.0],
            }],
            ..Default::default()
        };
        let filters = expand_filter(&config).unwrap();
        assert_eq!(filters.len(), 2);
        // number_in is declared before string_in
        assert!(matches!(&filters[0], AdvancedFilter::NumberIn { values, .. } if values.len() == 5));
        assert!(matches!(&filters[1], AdvancedFilter::StringIn { .. }));
    }

    #[test]
    fn six_values_in_one_block_is_rejected() {
        let config = AdvancedFilterConfig {
            number_in: vec![NumberListFilter {
                key: "data.contentLength".to_string(),
                values: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            }],
            ..Default::default()
        };
        let err = expand_filter(&config).unwrap_err();
        assert_eq!(
            err,
            TranslateError::TooManyFilterValues {
                operator: "number_in",
                key: "data.contentLength".to_string(),
                count: 6,
                max: MAX_FILTER_VALUES_PER_BLOCK,
            }
        );
    }

    #[test]
    fn twenty_six_values_in_total_are_rejected() {
        // Five full set blocks plus one scalar: 5 * 5 + 1 = 26
        let full = |key: &str| StringListFilter {
            key: key.to_string(),
            values: vec!["a", "b", "c", "d", "e"]
                .into_iter()
                .map(String::from)
                .collect(),
        };
        let config = AdvancedFilterConfig {
            bool_equals: vec![super::super::config::BoolFilter {
                key: "data.ok".to_string(),
                value: true,
            }],
            string_begins_with: vec![full("k1")],
            string_ends_with: vec![full("k2")],
            string_contains: vec![full("k3")],
            string_in: vec![full("k4")],
            string_not_in: vec![full("k5")],
            ..Default::default()
        };
        let err = expand_filter(&config).unwrap_err();
        assert_eq!(
            err,
            TranslateError::TotalFilterValuesExceeded {
                count: 26,
                max: MAX_FILTER_VALUES_TOTAL,
            }
        );
    }

    #[test]
    fn twenty_five_values_in_total_are_accepted() {
        let full = |key: &str| StringListFilter {
            key: key.to_string(),
            values: vec!["a", "b", "c", "d", "e"]
                .into_iter()
                .map(String::from)
                .collect(),
        };
        let config = AdvancedFilterConfig {
            string_begins_with: vec![full("k1")],
            string_ends_with: vec![full("k2")],
            string_contains: vec![full("k3")],
            string_in: vec![full("k4")],
            string_not_in: vec![full("k5")],
            ..Default::default()
        };
        let filters = expand_filter(&config).unwrap();
        assert_eq!(
            filters.iter().map(AdvancedFilter::value_count).sum::<usize>(),
            25
        );
    }

    #[test]
    fn empty_set_block_is_rejected() {
        let config = AdvancedFilterConfig {
            string_in: vec![StringListFilter {
                key: "subject".to_string(),
                values: Vec::new(),
            }],
            ..Default::default()
        };
        let err = expand_filter(&config).unwrap_err();
        assert_eq!(
            err,
            TranslateError::EmptyFilterValues {
                operator: "string_in",
                key: "subject".to_string(),
            }
        );
    }

    #[test]
    fn retry_policy_bounds_are_inclusive() {
        let ok = RetryPolicyConfig {
            max_delivery_attempts: 30,
            event_time_to_live: 1440,
        };
        assert!(expand_retry_policy(Some(&ok)).is_ok());

        let too_many = RetryPolicyConfig {
            max_delivery_attempts: 31,
            event_time_to_live: 60,
        };
        assert_eq!(
            expand_retry_policy(Some(&too_many)).unwrap_err(),
            TranslateError::RetryPolicyOutOfRange {
                field: "max_delivery_attempts",
                min: 1,
                max: 30,
                got: 31,
            }
        );

        let zero_ttl = RetryPolicyConfig {
            max_delivery_attempts: 3,
            event_time_to_live: 0,
        };
        assert_eq!(
            expand_retry_policy(Some(&zero_ttl)).unwrap_err(),
            TranslateError::RetryPolicyOutOfRange {
                field: "event_time_to_live",
                min: 1,
                max: 1440,
                got: 0,
            }
        );
    }

    #[test]
    fn empty_filter_config_produces_no_wire_filter() {
        let config = EventSubscriptionConfig {
            webhook_endpoint: Some(WebHookEndpoint {
                url: "https://example.com/hook".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(expand_subscription_filter(&config).unwrap(), None);
    }

    #[test]
    fn full_subscription_expands() {
        let config = EventSubscriptionConfig {
            storage_queue_endpoint: Some(StorageQueueEndpoint {
                storage_account_id: "/sa1".to_string(),
                queue_name: "q1".to_string(),
                queue_message_time_to_live_in_seconds: 300,
            }),
            labels: vec!["tier1".to_string()],
            included_event_types: vec!["Microsoft.Storage.BlobCreated".to_string()],
            retry_policy: Some(RetryPolicyConfig {
                max_delivery_attempts: 5,
                event_time_to_live: 120,
            }),
            storage_blob_dead_letter_destination: Some(DeadLetterConfig {
                storage_account_id: "/sa2".to_string(),
                storage_blob_container_name: "dead-letters".to_string(),
            }),
            ..Default::default()
        };
        let props = expand_event_subscription(&config).unwrap();
        assert!(matches!(props.destination, Destination::StorageQueue(_)));
        assert_eq!(props.labels, vec!["tier1".to_string()]);
        let filter = props.filter.unwrap();
        assert_eq!(
            filter.included_event_types,
            Some(vec!["Microsoft.Storage.BlobCreated".to_string()])
        );
        assert!(props.retry_policy.is_some());
        assert!(props.dead_letter_destination.is_some());
    }
}
