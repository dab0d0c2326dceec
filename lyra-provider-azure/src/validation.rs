//! Attribute validators shared across resource schemas

use std::sync::LazyLock;

use lyra_core::schema::AttributeType;
use lyra_core::value::Value;
use regex::Regex;

static EVENT_SUBSCRIPTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9]{3,64}$").unwrap());

/// EventGrid subscription name: 3-64 ASCII letters, digits, or dashes
pub fn event_subscription_name() -> AttributeType {
    AttributeType::Custom {
        name: "EventSubscriptionName".to_string(),
        validate: |value| match value {
            Value::String(s) if EVENT_SUBSCRIPTION_NAME.is_match(s) => Ok(()),
            Value::String(s) => Err(format!(
                "{s:?} must be 3-64 characters long and contain only letters, digits, and dashes"
            )),
            other => Err(format!("expected string, got {}", other.type_name())),
        },
    }
}

/// ARM resource ID shape: absolute path of non-empty segments
pub fn resource_id() -> AttributeType {
    AttributeType::Custom {
        name: "ResourceId".to_string(),
        validate: |value| match value {
            Value::String(s) => check_resource_id(s),
            other => Err(format!("expected string, got {}", other.type_name())),
        },
    }
}

fn check_resource_id(s: &str) -> Result<(), String> {
    if !s.starts_with('/') {
        return Err(format!("{s:?} is not an absolute resource ID"));
    }
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(format!("{s:?} is not a resource ID"));
    }
    for segment in trimmed[1..].split('/') {
        if segment.is_empty() {
            return Err(format!("{s:?} contains an empty path segment"));
        }
    }
    Ok(())
}

/// Webhook endpoint URL; only https is accepted
pub fn https_url() -> AttributeType {
    AttributeType::Custom {
        name: "HttpsUrl".to_string(),
        validate: |value| match value {
            Value::String(s) if s.starts_with("https://") && s.len() > "https://".len() => Ok(()),
            Value::String(s) => Err(format!("{s:?} is not an https URL")),
            other => Err(format!("expected string, got {}", other.type_name())),
        },
    }
}
