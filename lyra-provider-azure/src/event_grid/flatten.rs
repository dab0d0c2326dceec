//! Wire model to configuration translation
//!
//! Flatten is total: every wire value the API can return maps to a
//! configuration, so these functions never fail. Unset optional wire fields
//! become the zero values of the configuration surface, and the two
//! deprecated block forms are never produced; an EventHub or
//! HybridConnection destination always flattens to its `_id` field.

use super::config::{
    AdvancedFilterConfig, BoolFilter, DeadLetterConfig, EventSubscriptionConfig, NumberFilter,
    NumberListFilter, RetryPolicyConfig, StringListFilter, SubjectFilterConfig,
};
use super::wire::{
    AdvancedFilter, DeadLetterDestination, Destination, EventSubscriptionProperties, RetryPolicy,
    SubscriptionFilter,
};

/// Translate a wire subscription back into the canonical configuration
pub fn flatten_event_subscription(
    properties: &EventSubscriptionProperties,
) -> EventSubscriptionConfig {
    let mut config = flatten_destination(&properties.destination);
    config.labels = properties.labels.clone();
    if let Some(filter) = &properties.filter {
        flatten_filter_into(filter, &mut config);
    }
    config.retry_policy = properties.retry_policy.as_ref().map(flatten_retry_policy);
    config.storage_blob_dead_letter_destination = properties
        .dead_letter_destination
        .as_ref()
        .map(flatten_dead_letter);
    config
}

/// Populate the one endpoint field matching the destination variant. All
/// other endpoint fields stay at their zero values.
pub fn flatten_destination(destination: &Destination) -> EventSubscriptionConfig {
    use super::config::{AzureFunctionEndpoint, StorageQueueEndpoint, WebHookEndpoint};

    let mut config = EventSubscriptionConfig::default();
    match destination {
        Destination::AzureFunction(props) => {
            config.azure_function_endpoint = Some(AzureFunctionEndpoint {
                function_id: props.resource_id.clone(),
                max_events_per_batch: props.max_events_per_batch.unwrap_or(0),
                preferred_batch_size_in_kilobytes: props
                    .preferred_batch_size_in_kilobytes
                    .unwrap_or(0),
            });
        }
        Destination::EventHub(props) => {
            config.eventhub_endpoint_id = props.resource_id.clone();
        }
        Destination::HybridConnection(props) => {
            config.hybrid_connection_endpoint_id = props.resource_id.clone();
        }
        Destination::ServiceBusQueue(props) => {
            config.service_bus_queue_endpoint_id = props.resource_id.clone();
        }
        Destination::ServiceBusTopic(props) => {
            config.service_bus_topic_endpoint_id = props.resource_id.clone();
        }
        Destination::StorageQueue(props) => {
            config.storage_queue_endpoint = Some(StorageQueueEndpoint {
                storage_account_id: props.resource_id.clone(),
                queue_name: props.queue_name.clone(),
                queue_message_time_to_live_in_seconds: props
                    .queue_message_time_to_live_in_seconds
                    .unwrap_or(0),
            });
        }
        Destination::WebHook(props) => {
            config.webhook_endpoint = Some(WebHookEndpoint {
                url: props.endpoint_url.clone(),
                base_url: String::new(),
                max_events_per_batch: props.max_events_per_batch.unwrap_or(0),
                preferred_batch_size_in_kilobytes: props
                    .preferred_batch_size_in_kilobytes
                    .unwrap_or(0),
                active_directory_tenant_id: props
                    .azure_active_directory_tenant_id
                    .clone()
                    .unwrap_or_default(),
                active_directory_app_id_or_uri: props
                    .azure_active_directory_application_id_or_uri
                    .clone()
                    .unwrap_or_default(),
            });
        }
    }
    config
}

fn flatten_filter_into(filter: &SubscriptionFilter, config: &mut EventSubscriptionConfig) {
    config.subject_filter = flatten_subject_filter(filter);
    config.included_event_types = filter.included_event_types.clone().unwrap_or_default();
    config.advanced_filtering_on_arrays_enabled =
        filter.enable_advanced_filtering_on_arrays.unwrap_or(false);
    config.advanced_filter = flatten_filters(&filter.advanced_filters);
}

/// None when nothing subject-related was returned
pub fn flatten_subject_filter(filter: &SubscriptionFilter) -> Option<SubjectFilterConfig> {
    let begins = filter.subject_begins_with.clone().unwrap_or_default();
    let ends = filter.subject_ends_with.clone().unwrap_or_default();
    let case_sensitive = filter.is_subject_case_sensitive.unwrap_or(false);
    if begins.is_empty() && ends.is_empty() && !case_sensitive {
        return None;
    }
    Some(SubjectFilterConfig {
        subject_begins_with: begins,
        subject_ends_with: ends,
        case_sensitive,
    })
}

/// Bucket the ordered wire list back into the twelve operator blocks.
/// Relative order within each operator is preserved.
pub fn flatten_filters(filters: &[AdvancedFilter]) -> Option<AdvancedFilterConfig> {
    if filters.is_empty() {
        return None;
    }

    let mut config = AdvancedFilterConfig::default();
    for filter in filters {
        match filter {
            AdvancedFilter::BoolEquals { key, value } => config.bool_equals.push(BoolFilter {
                key: key.clone(),
                value: *value,
            }),
            AdvancedFilter::NumberGreaterThan { key, value } => {
                config.number_greater_than.push(NumberFilter {
                    key: key.clone(),
                    value: *value,
                })
            }
            AdvancedFilter::NumberGreaterThanOrEquals { key, value } => {
                config.number_greater_than_or_equals.push(NumberFilter {
                    key: key.clone(),
                    value: *value,
                })
            }
            AdvancedFilter::NumberLessThan { key, value } => {
                config.number_less_than.push(NumberFilter {
                    key: key.clone(),
                    value: *value,
                })
            }
            AdvancedFilter::NumberLessThanOrEquals { key, value } => {
                config.number_less_than_or_equals.push(NumberFilter {
                    key: key.clone(),
                    value: *value,
                })
            }
            AdvancedFilter::NumberIn { key, values } => {
                config.number_in.push(NumberListFilter {
                    key: key.clone(),
                    values: values.clone(),
                })
            }
            AdvancedFilter::NumberNotIn { key, values } => {
                config.number_not_in.push(NumberListFilter {
                    key: key.clone(),
                    values: values.clone(),
                })
            }
            AdvancedFilter::StringBeginsWith { key, values } => {
                config.string_begins_with.push(StringListFilter {
                    key: key.clone(),
                    values: values.clone(),
                })
            }
            AdvancedFilter::StringEndsWith { key, values } => {
                config.string_ends_with.push(StringListFilter {
                    key: key.clone(),
                    values: values.clone(),
                })
            }
            AdvancedFilter::StringContains { key, values } => {
                config.string_contains.push(StringListFilter {
                    key: key.clone(),
                    values: values.clone(),
                })
            }
            AdvancedFilter::StringIn { key, values } => config.string_in.push(StringListFilter {
                key: key.clone(),
                values: values.clone(),
            }),
            AdvancedFilter::StringNotIn { key, values } => {
                config.string_not_in.push(StringListFilter {
                    key: key.clone(),
                    values: values.clone(),
                })
            }
        }
    }
    Some(config)
}

pub fn flatten_retry_policy(policy: &RetryPolicy) -> RetryPolicyConfig {
    RetryPolicyConfig {
        max_delivery_attempts: policy.max_delivery_attempts,
        event_time_to_live: policy.event_time_to_live_in_minutes,
    }
}

pub fn flatten_dead_letter(destination: &DeadLetterDestination) -> DeadLetterConfig {
    match destination {
        DeadLetterDestination::StorageBlob(props) => DeadLetterConfig {
            storage_account_id: props.resource_id.clone(),
            storage_blob_container_name: props.blob_container_name.clone(),
        },
    }
}
