//! End-to-end scenarios for the event subscription resource: decode a
//! configuration document, validate it against the schema, expand it to the
//! wire shape, and flatten the wire shape back.

use lyra_core::value::Value;
use lyra_provider_azure::event_grid::config::EventSubscriptionConfig;
use lyra_provider_azure::event_grid::expand::{TranslateError, expand_event_subscription};
use lyra_provider_azure::event_grid::flatten::flatten_event_subscription;
use lyra_provider_azure::event_grid::schema;
use lyra_provider_azure::event_grid::wire::Destination;
use lyra_provider_azure::resource_id::event_grid::{
    DomainTopicId, EventSubscriptionId, SystemTopicEventSubscriptionId,
};

const SUB: &str = "12345678-1234-9876-4563-123456789012";

fn decode(json: serde_json::Value) -> EventSubscriptionConfig {
    EventSubscriptionConfig::from_value(&Value::from(json)).unwrap()
}

fn validate(json: &serde_json::Value) {
    let map = match Value::from(json.clone()) {
        Value::Map(map) => map,
        other => panic!("expected map, got {other:?}"),
    };
    if let Err(errors) = schema::event_subscription().validate(&map) {
        panic!("schema rejected configuration: {errors:?}");
    }
}

#[test]
fn storage_queue_subscription_round_trips() {
    let storage_account = format!(
        "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acc1"
    );
    let doc = serde_json::json!({
        "name": "storage-queue-sub",
        "scope": storage_account,
        "storage_queue_endpoint": {
            "storage_account_id": storage_account,
            "queue_name": "mysamplequeue",
            "queue_message_time_to_live_in_seconds": 300
        },
        "labels": ["test", "test1"],
        "retry_policy": {
            "max_delivery_attempts": 11,
            "event_time_to_live": 11
        },
        "storage_blob_dead_letter_destination": {
            "storage_account_id": storage_account,
            "storage_blob_container_name": "dead-letters"
        }
    });
    validate(&doc);

    let config = decode(doc);
    let wire = expand_event_subscription(&config).unwrap();

    match &wire.destination {
        Destination::StorageQueue(props) => {
            assert_eq!(props.resource_id, storage_account);
            assert_eq!(props.queue_name, "mysamplequeue");
            assert_eq!(props.queue_message_time_to_live_in_seconds, Some(300));
        }
        other => panic!("unexpected destination: {other:?}"),
    }
    assert_eq!(wire.retry_policy.as_ref().unwrap().max_delivery_attempts, 11);

    let back = flatten_event_subscription(&wire);
    assert_eq!(back, config.canonicalize());
}

#[test]
fn list_spelled_block_passes_schema_and_expands() {
    let storage_account = format!(
        "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acc1"
    );
    // The schema and the decoder must agree on the single-element-list
    // spelling of a block.
    let doc = serde_json::json!({
        "name": "list-spelled-sub",
        "scope": storage_account,
        "storage_queue_endpoint": [{
            "storage_account_id": storage_account,
            "queue_name": "q1"
        }]
    });
    validate(&doc);

    let config = decode(doc);
    let wire = expand_event_subscription(&config).unwrap();
    assert!(matches!(&wire.destination, Destination::StorageQueue(p) if p.queue_name == "q1"));
}

#[test]
fn number_in_filter_preserves_order_and_duplicates() {
    let doc = serde_json::json!({
        "webhook_endpoint": { "url": "https://example.com/hook" },
        "advanced_filter": {
            "number_in": [
                { "key": "data.contentLength", "values": [0, 1, 1, 2, 3] }
            ]
        }
    });
    let config = decode(doc);
    let wire = expand_event_subscription(&config).unwrap();

    let json = serde_json::to_value(&wire).unwrap();
    let filters = &json["filter"]["advancedFilters"];
    assert_eq!(filters[0]["operatorType"], "NumberIn");
    assert_eq!(
        filters[0]["values"],
        serde_json::json!([0.0, 1.0, 1.0, 2.0, 3.0])
    );

    let back = flatten_event_subscription(&wire);
    assert_eq!(back, config.canonicalize());
}

#[test]
fn deprecated_eventhub_block_round_trips_to_id_field() {
    let eventhub = format!(
        "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.EventHub/namespaces/ns1/eventhubs/eh1"
    );
    let config = decode(serde_json::json!({
        "eventhub_endpoint": { "eventhub_id": eventhub }
    }));
    let wire = expand_event_subscription(&config).unwrap();
    assert!(matches!(&wire.destination, Destination::EventHub(p) if p.resource_id == eventhub));

    let back = flatten_event_subscription(&wire);
    assert_eq!(back.eventhub_endpoint_id, eventhub);
    assert!(back.eventhub_endpoint.is_none());
}

#[test]
fn zero_endpoints_and_two_endpoints_are_rejected() {
    let none = decode(serde_json::json!({}));
    assert!(matches!(
        expand_event_subscription(&none).unwrap_err(),
        TranslateError::MissingEndpoint { .. }
    ));

    let both = decode(serde_json::json!({
        "service_bus_queue_endpoint_id": "/sbq1",
        "service_bus_topic_endpoint_id": "/sbt1"
    }));
    match expand_event_subscription(&both).unwrap_err() {
        TranslateError::ConflictingEndpoints { set } => {
            assert_eq!(
                set,
                vec![
                    "service_bus_queue_endpoint_id".to_string(),
                    "service_bus_topic_endpoint_id".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn filter_value_caps_are_enforced_across_blocks() {
    let six_in_one_block = decode(serde_json::json!({
        "webhook_endpoint": { "url": "https://example.com/hook" },
        "advanced_filter": {
            "string_in": [
                { "key": "subject", "values": ["a", "b", "c", "d", "e", "f"] }
            ]
        }
    }));
    assert!(matches!(
        expand_event_subscription(&six_in_one_block).unwrap_err(),
        TranslateError::TooManyFilterValues { count: 6, .. }
    ));

    let twenty_six_total = decode(serde_json::json!({
        "webhook_endpoint": { "url": "https://example.com/hook" },
        "advanced_filter": {
            "string_begins_with": [ { "key": "k1", "values": ["a", "b", "c", "d", "e"] } ],
            "string_ends_with":   [ { "key": "k2", "values": ["a", "b", "c", "d", "e"] } ],
            "string_contains":    [ { "key": "k3", "values": ["a", "b", "c", "d", "e"] } ],
            "string_in":          [ { "key": "k4", "values": ["a", "b", "c", "d", "e"] } ],
            "string_not_in":      [ { "key": "k5", "values": ["a", "b", "c", "d", "e"] } ],
            "bool_equals":        [ { "key": "data.ok", "value": true } ]
        }
    }));
    assert!(matches!(
        expand_event_subscription(&twenty_six_total).unwrap_err(),
        TranslateError::TotalFilterValuesExceeded { count: 26, .. }
    ));
}

#[test]
fn wire_json_matches_arm_contract() {
    let config = decode(serde_json::json!({
        "webhook_endpoint": {
            "url": "https://example.com/hook",
            "max_events_per_batch": 10,
            "active_directory_tenant_id": "tenant-1"
        },
        "subject_filter": {
            "subject_begins_with": "/blobServices/default/containers/mycontainer",
            "case_sensitive": true
        },
        "included_event_types": ["Microsoft.Storage.BlobCreated"]
    }));
    let wire = expand_event_subscription(&config).unwrap();
    let json = serde_json::to_value(&wire).unwrap();

    assert_eq!(json["destination"]["endpointType"], "WebHook");
    assert_eq!(
        json["destination"]["properties"]["endpointUrl"],
        "https://example.com/hook"
    );
    assert_eq!(json["destination"]["properties"]["maxEventsPerBatch"], 10);
    assert_eq!(
        json["destination"]["properties"]["azureActiveDirectoryTenantId"],
        "tenant-1"
    );
    assert_eq!(
        json["filter"]["subjectBeginsWith"],
        "/blobServices/default/containers/mycontainer"
    );
    assert_eq!(json["filter"]["isSubjectCaseSensitive"], true);
    assert_eq!(
        json["filter"]["includedEventTypes"][0],
        "Microsoft.Storage.BlobCreated"
    );
}

#[test]
fn domain_topic_id_parses_and_formats() {
    let input = format!(
        "/subscriptions/{SUB}/resourceGroups/resGroup1/providers/Microsoft.EventGrid/domains/domain1/topics/topic1"
    );
    let id = DomainTopicId::parse(&input).unwrap();
    assert_eq!(id.domain, "domain1");
    assert_eq!(id.name, "topic1");
    assert_eq!(id.to_string(), input);
}

#[test]
fn system_topic_event_subscription_id_parses() {
    let input = format!(
        "/subscriptions/{SUB}/resourceGroups/resGroup1/providers/Microsoft.EventGrid/systemTopics/systemTopic1/eventSubscriptions/subscription1"
    );
    let id = SystemTopicEventSubscriptionId::parse(&input).unwrap();
    assert_eq!(id.system_topic, "systemTopic1");
    assert_eq!(id.name, "subscription1");
}

#[test]
fn scoped_event_subscription_id_splits_on_marker() {
    let scope = format!(
        "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acc1"
    );
    let input = format!("{scope}/providers/Microsoft.EventGrid/eventSubscriptions/sub1");
    let id = EventSubscriptionId::parse(&input).unwrap();
    assert_eq!(id.scope, scope);
    assert_eq!(id.name, "sub1");
    assert_eq!(id.to_string(), input);
}
