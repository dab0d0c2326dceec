//! Resource schema for event subscriptions
//!
//! Declares every attribute of the configuration surface, including the
//! mutual exclusion of the endpoint fields. The conflict lists are built
//! from [`ENDPOINT_FIELDS`] with a fresh Vec per attribute, so registering
//! one endpoint never corrupts a sibling's list.

use lyra_core::schema::{
    AttributeSchema, AttributeType, ResourceSchema, conflicts_excluding, types,
};

use super::config::ENDPOINT_FIELDS;
use super::expand::{
    MAX_DELIVERY_ATTEMPTS, MAX_EVENT_TTL_MINUTES, MIN_DELIVERY_ATTEMPTS, MIN_EVENT_TTL_MINUTES,
};
use crate::validation;

/// Schema for the `event_subscription` resource
pub fn event_subscription() -> ResourceSchema {
    let mut schema = ResourceSchema::new("event_subscription")
        .attribute(
            AttributeSchema::new("name", validation::event_subscription_name())
                .required()
                .with_description("Name of the event subscription"),
        )
        .attribute(
            AttributeSchema::new("scope", validation::resource_id())
                .required()
                .with_description("Resource ID the subscription is attached to"),
        )
        .attribute(AttributeSchema::new(
            "included_event_types",
            AttributeType::List(Box::new(types::non_empty_string())),
        ))
        .attribute(AttributeSchema::new(
            "labels",
            AttributeType::List(Box::new(AttributeType::String)),
        ))
        .attribute(AttributeSchema::new(
            "advanced_filtering_on_arrays_enabled",
            AttributeType::Bool,
        ))
        .attribute(AttributeSchema::new(
            "subject_filter",
            AttributeType::Block(Box::new(subject_filter())),
        ))
        .attribute(AttributeSchema::new(
            "advanced_filter",
            AttributeType::Block(Box::new(advanced_filter())),
        ))
        .attribute(AttributeSchema::new(
            "retry_policy",
            AttributeType::Block(Box::new(retry_policy())),
        ))
        .attribute(AttributeSchema::new(
            "storage_blob_dead_letter_destination",
            AttributeType::Block(Box::new(dead_letter())),
        ));

    for endpoint in endpoint_attributes() {
        schema = schema.attribute(endpoint);
    }
    schema
}

/// One attribute per endpoint field, each conflicting with all the others
fn endpoint_attributes() -> Vec<AttributeSchema> {
    let block = |schema: ResourceSchema| AttributeType::Block(Box::new(schema));

    let typed: [(&str, AttributeType); 9] = [
        ("azure_function_endpoint", block(azure_function_endpoint())),
        ("eventhub_endpoint_id", validation::resource_id()),
        ("eventhub_endpoint", block(eventhub_endpoint())),
        ("hybrid_connection_endpoint_id", validation::resource_id()),
        ("hybrid_connection_endpoint", block(hybrid_connection_endpoint())),
        ("service_bus_queue_endpoint_id", validation::resource_id()),
        ("service_bus_topic_endpoint_id", validation::resource_id()),
        ("storage_queue_endpoint", block(storage_queue_endpoint())),
        ("webhook_endpoint", block(webhook_endpoint())),
    ];

    typed
        .into_iter()
        .map(|(name, attr_type)| {
            // A deprecated block form does not conflict with its own `_id`
            // sibling; canonicalization folds the pair together instead.
            let mut conflicts = conflicts_excluding(&ENDPOINT_FIELDS, name);
            if let Some(sibling) = deprecated_sibling(name) {
                conflicts.retain(|f| f != sibling);
            }
            AttributeSchema::new(name, attr_type).conflicts_with(conflicts)
        })
        .collect()
}

fn deprecated_sibling(name: &str) -> Option<&'static str> {
    match name {
        "eventhub_endpoint_id" => Some("eventhub_endpoint"),
        "eventhub_endpoint" => Some("eventhub_endpoint_id"),
        "hybrid_connection_endpoint_id" => Some("hybrid_connection_endpoint"),
        "hybrid_connection_endpoint" => Some("hybrid_connection_endpoint_id"),
        _ => None,
    }
}

fn azure_function_endpoint() -> ResourceSchema {
    ResourceSchema::new("azure_function_endpoint")
        .attribute(AttributeSchema::new("function_id", validation::resource_id()).required())
        .attribute(AttributeSchema::new(
            "max_events_per_batch",
            AttributeType::Int,
        ))
        .attribute(AttributeSchema::new(
            "preferred_batch_size_in_kilobytes",
            AttributeType::Int,
        ))
}

fn eventhub_endpoint() -> ResourceSchema {
    ResourceSchema::new("eventhub_endpoint")
        .attribute(AttributeSchema::new("eventhub_id", validation::resource_id()))
}

fn hybrid_connection_endpoint() -> ResourceSchema {
    ResourceSchema::new("hybrid_connection_endpoint").attribute(AttributeSchema::new(
        "hybrid_connection_id",
        validation::resource_id(),
    ))
}

fn storage_queue_endpoint() -> ResourceSchema {
    ResourceSchema::new("storage_queue_endpoint")
        .attribute(AttributeSchema::new("storage_account_id", validation::resource_id()).required())
        .attribute(AttributeSchema::new("queue_name", types::non_empty_string()).required())
        .attribute(AttributeSchema::new(
            "queue_message_time_to_live_in_seconds",
            AttributeType::Int,
        ))
}

fn webhook_endpoint() -> ResourceSchema {
    ResourceSchema::new("webhook_endpoint")
        .attribute(AttributeSchema::new("url", validation::https_url()).required())
        .attribute(AttributeSchema::new(
            "max_events_per_batch",
            types::int_between(1, 5000),
        ))
        .attribute(AttributeSchema::new(
            "preferred_batch_size_in_kilobytes",
            types::int_between(1, 1024),
        ))
        .attribute(AttributeSchema::new(
            "active_directory_tenant_id",
            AttributeType::String,
        ))
        .attribute(AttributeSchema::new(
            "active_directory_app_id_or_uri",
            AttributeType::String,
        ))
}

fn subject_filter() -> ResourceSchema {
    ResourceSchema::new("subject_filter")
        .attribute(AttributeSchema::new(
            "subject_begins_with",
            AttributeType::String,
        ))
        .attribute(AttributeSchema::new(
            "subject_ends_with",
            AttributeType::String,
        ))
        .attribute(AttributeSchema::new("case_sensitive", AttributeType::Bool))
}

fn advanced_filter() -> ResourceSchema {
    let scalar = |value_type: AttributeType| {
        ResourceSchema::new("filter")
            .attribute(AttributeSchema::new("key", types::non_empty_string()).required())
            .attribute(AttributeSchema::new("value", value_type).required())
    };
    let set = |value_type: AttributeType| {
        ResourceSchema::new("filter")
            .attribute(AttributeSchema::new("key", types::non_empty_string()).required())
            .attribute(
                AttributeSchema::new("values", AttributeType::List(Box::new(value_type)))
                    .required(),
            )
    };
    let blocks = |schema: ResourceSchema| {
        AttributeType::List(Box::new(AttributeType::Block(Box::new(schema))))
    };

    ResourceSchema::new("advanced_filter")
        .attribute(AttributeSchema::new(
            "bool_equals",
            blocks(scalar(AttributeType::Bool)),
        ))
        .attribute(AttributeSchema::new(
            "number_greater_than",
            blocks(scalar(AttributeType::Float)),
        ))
        .attribute(AttributeSchema::new(
            "number_greater_than_or_equals",
            blocks(scalar(AttributeType::Float)),
        ))
        .attribute(AttributeSchema::new(
            "number_less_than",
            blocks(scalar(AttributeType::Float)),
        ))
        .attribute(AttributeSchema::new(
            "number_less_than_or_equals",
            blocks(scalar(AttributeType::Float)),
        ))
        .attribute(AttributeSchema::new(
            "number_in",
            blocks(set(AttributeType::Float)),
        ))
        .attribute(AttributeSchema::new(
            "number_not_in",
            blocks(set(AttributeType::Float)),
        ))
        .attribute(AttributeSchema::new(
            "string_begins_with",
            blocks(set(AttributeType::String)),
        ))
        .attribute(AttributeSchema::new(
            "string_ends_with",
            blocks(set(AttributeType::String)),
        ))
        .attribute(AttributeSchema::new(
            "string_contains",
            blocks(set(AttributeType::String)),
        ))
        .attribute(AttributeSchema::new(
            "string_in",
            blocks(set(AttributeType::String)),
        ))
        .attribute(AttributeSchema::new(
            "string_not_in",
            blocks(set(AttributeType::String)),
        ))
}

fn retry_policy() -> ResourceSchema {
    ResourceSchema::new("retry_policy")
        .attribute(
            AttributeSchema::new(
                "max_delivery_attempts",
                types::int_between(MIN_DELIVERY_ATTEMPTS, MAX_DELIVERY_ATTEMPTS),
            )
            .required(),
        )
        .attribute(
            AttributeSchema::new(
                "event_time_to_live",
                types::int_between(MIN_EVENT_TTL_MINUTES, MAX_EVENT_TTL_MINUTES),
            )
            .required(),
        )
}

fn dead_letter() -> ResourceSchema {
    ResourceSchema::new("storage_blob_dead_letter_destination")
        .attribute(AttributeSchema::new("storage_account_id", validation::resource_id()).required())
        .attribute(
            AttributeSchema::new("storage_blob_container_name", types::non_empty_string())
                .required(),
        )
}
