//! Typed identifiers for EventGrid resources (`Microsoft.EventGrid`)

use std::fmt;

use super::{ArmId, CaseMode, IdParseError, format_prefix};

pub const NAMESPACE: &str = "Microsoft.EventGrid";

/// Marker separating an event subscription's scope from its own segment.
/// The scope is an arbitrary nested ARM resource ID whose shape is not
/// known in advance, so scoped IDs split on this literal instead of
/// popping structured segments.
pub const EVENT_SUBSCRIPTION_MARKER: &str = "/providers/Microsoft.EventGrid/eventSubscriptions/";

/// An EventGrid domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl DomainId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Strict)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Insensitive)
    }

    fn parse_with(input: &str, mode: CaseMode) -> Result<Self, IdParseError> {
        let mut id = ArmId::parse(input, mode)?;
        id.expect_provider(NAMESPACE)?;
        let name = id.pop_segment("domains")?;
        id.finish()?;
        Ok(Self {
            subscription_id: id.subscription_id,
            resource_group: id.resource_group,
            name,
        })
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_prefix(f, &self.subscription_id, &self.resource_group, NAMESPACE)?;
        write!(f, "/domains/{}", self.name)
    }
}

/// A topic nested under an EventGrid domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTopicId {
    pub subscription_id: String,
    pub resource_group: String,
    pub domain: String,
    pub name: String,
}

impl DomainTopicId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        domain: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            domain: domain.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Strict)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Insensitive)
    }

    fn parse_with(input: &str, mode: CaseMode) -> Result<Self, IdParseError> {
        let mut id = ArmId::parse(input, mode)?;
        id.expect_provider(NAMESPACE)?;
        let domain = id.pop_segment("domains")?;
        let name = id.pop_segment("topics")?;
        id.finish()?;
        Ok(Self {
            subscription_id: id.subscription_id,
            resource_group: id.resource_group,
            domain,
            name,
        })
    }
}

impl fmt::Display for DomainTopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_prefix(f, &self.subscription_id, &self.resource_group, NAMESPACE)?;
        write!(f, "/domains/{}/topics/{}", self.domain, self.name)
    }
}

/// A standalone EventGrid topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl TopicId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Strict)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Insensitive)
    }

    fn parse_with(input: &str, mode: CaseMode) -> Result<Self, IdParseError> {
        let mut id = ArmId::parse(input, mode)?;
        id.expect_provider(NAMESPACE)?;
        let name = id.pop_segment("topics")?;
        id.finish()?;
        Ok(Self {
            subscription_id: id.subscription_id,
            resource_group: id.resource_group,
            name,
        })
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_prefix(f, &self.subscription_id, &self.resource_group, NAMESPACE)?;
        write!(f, "/topics/{}", self.name)
    }
}

/// An EventGrid system topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTopicId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl SystemTopicId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Strict)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Insensitive)
    }

    fn parse_with(input: &str, mode: CaseMode) -> Result<Self, IdParseError> {
        let mut id = ArmId::parse(input, mode)?;
        id.expect_provider(NAMESPACE)?;
        let name = id.pop_segment("systemTopics")?;
        id.finish()?;
        Ok(Self {
            subscription_id: id.subscription_id,
            resource_group: id.resource_group,
            name,
        })
    }
}

impl fmt::Display for SystemTopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_prefix(f, &self.subscription_id, &self.resource_group, NAMESPACE)?;
        write!(f, "/systemTopics/{}", self.name)
    }
}

/// An event subscription attached to a system topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTopicEventSubscriptionId {
    pub subscription_id: String,
    pub resource_group: String,
    pub system_topic: String,
    pub name: String,
}

impl SystemTopicEventSubscriptionId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        system_topic: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            system_topic: system_topic.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Strict)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Insensitive)
    }

    fn parse_with(input: &str, mode: CaseMode) -> Result<Self, IdParseError> {
        let mut id = ArmId::parse(input, mode)?;
        id.expect_provider(NAMESPACE)?;
        let system_topic = id.pop_segment("systemTopics")?;
        let name = id.pop_segment("eventSubscriptions")?;
        id.finish()?;
        Ok(Self {
            subscription_id: id.subscription_id,
            resource_group: id.resource_group,
            system_topic,
            name,
        })
    }
}

impl fmt::Display for SystemTopicEventSubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_prefix(f, &self.subscription_id, &self.resource_group, NAMESPACE)?;
        write!(
            f,
            "/systemTopics/{}/eventSubscriptions/{}",
            self.system_topic, self.name
        )
    }
}

/// An event subscription attached to an arbitrary scope (a resource group,
/// a storage account, an EventGrid domain or topic, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSubscriptionId {
    /// The ARM ID of the resource the subscription is attached to
    pub scope: String,
    pub name: String,
}

impl EventSubscriptionId {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Strict)
    }

    pub fn parse_insensitively(input: &str) -> Result<Self, IdParseError> {
        Self::parse_with(input, CaseMode::Insensitive)
    }

    fn parse_with(input: &str, mode: CaseMode) -> Result<Self, IdParseError> {
        let split_at = match mode {
            CaseMode::Strict => input.find(EVENT_SUBSCRIPTION_MARKER),
            CaseMode::Insensitive => input
                .to_ascii_lowercase()
                .find(&EVENT_SUBSCRIPTION_MARKER.to_ascii_lowercase()),
        };
        let Some(split_at) = split_at else {
            return Err(IdParseError::MissingMarker {
                input: input.to_string(),
                marker: EVENT_SUBSCRIPTION_MARKER.to_string(),
            });
        };

        let scope = &input[..split_at];
        let name = &input[split_at + EVENT_SUBSCRIPTION_MARKER.len()..];

        if scope.is_empty() || !scope.starts_with('/') {
            return Err(IdParseError::EmptyScope {
                input: input.to_string(),
            });
        }
        if name.is_empty() || name.contains('/') {
            return Err(IdParseError::EmptySegment {
                input: input.to_string(),
                segment: "eventSubscriptions".to_string(),
            });
        }

        Ok(Self {
            scope: scope.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for EventSubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scope, EVENT_SUBSCRIPTION_MARKER, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUB: &str = "00000000-0000-0000-0000-000000000000";

    #[test]
    fn domain_round_trip() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/resGroup1/providers/Microsoft.EventGrid/domains/domain1"
        );
        let id = DomainId::parse(&input).unwrap();
        assert_eq!(id, DomainId::new(SUB, "resGroup1", "domain1"));
        assert_eq!(id.to_string(), input);
    }

    #[test]
    fn domain_topic_round_trip() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/resGroup1/providers/Microsoft.EventGrid/domains/domain1/topics/topic1"
        );
        let id = DomainTopicId::parse(&input).unwrap();
        assert_eq!(id.resource_group, "resGroup1");
        assert_eq!(id.domain, "domain1");
        assert_eq!(id.name, "topic1");
        assert_eq!(id.to_string(), input);
    }

    #[test]
    fn domain_topic_rejects_plain_domain_id() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/rg/providers/Microsoft.EventGrid/domains/domain1"
        );
        let err = DomainTopicId::parse(&input).unwrap_err();
        assert!(matches!(err, IdParseError::MissingSegment { segment, .. } if segment == "topics"));
    }

    #[test]
    fn topic_rejects_trailing_segments() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/rg/providers/Microsoft.EventGrid/topics/t1/extra/e1"
        );
        let err = TopicId::parse(&input).unwrap_err();
        assert!(
            matches!(err, IdParseError::TrailingSegments { segments, .. } if segments == vec!["extra"])
        );
    }

    #[test]
    fn system_topic_event_subscription_round_trip() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/resGroup1/providers/Microsoft.EventGrid/systemTopics/topic1/eventSubscriptions/subscription1"
        );
        let id = SystemTopicEventSubscriptionId::parse(&input).unwrap();
        assert_eq!(id.resource_group, "resGroup1");
        assert_eq!(id.system_topic, "topic1");
        assert_eq!(id.name, "subscription1");
        assert_eq!(id.to_string(), input);
    }

    #[test]
    fn insensitive_parse_yields_same_fields_as_canonical() {
        let canonical = format!(
            "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.EventGrid/systemTopics/st1/eventSubscriptions/sub1"
        );
        let sloppy = format!(
            "/subscriptions/{SUB}/resourcegroups/rg1/providers/microsoft.eventgrid/systemtopics/st1/eventsubscriptions/sub1"
        );
        let from_canonical = SystemTopicEventSubscriptionId::parse(&canonical).unwrap();
        let from_sloppy = SystemTopicEventSubscriptionId::parse_insensitively(&sloppy).unwrap();
        assert_eq!(from_canonical, from_sloppy);
        // Formatting normalizes to canonical casing.
        assert_eq!(from_sloppy.to_string(), canonical);
    }

    #[test]
    fn strict_parse_rejects_sloppy_casing() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.EventGrid/systemtopics/st1"
        );
        assert!(SystemTopicId::parse(&input).is_err());
    }

    #[test]
    fn scoped_event_subscription_on_storage_account() {
        let scope = format!(
            "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acc1"
        );
        let input = format!("{scope}/providers/Microsoft.EventGrid/eventSubscriptions/sub1");
        let id = EventSubscriptionId::parse(&input).unwrap();
        assert_eq!(id.scope, scope);
        assert_eq!(id.name, "sub1");
        assert_eq!(id.to_string(), input);
    }

    #[test]
    fn scoped_event_subscription_on_resource_group() {
        let scope = format!("/subscriptions/{SUB}/resourceGroups/rg1");
        let input = format!("{scope}/providers/Microsoft.EventGrid/eventSubscriptions/sub1");
        let id = EventSubscriptionId::parse(&input).unwrap();
        assert_eq!(id.scope, scope);
        assert_eq!(id.name, "sub1");
    }

    #[test]
    fn scoped_event_subscription_requires_marker() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acc1"
        );
        let err = EventSubscriptionId::parse(&input).unwrap_err();
        assert!(matches!(err, IdParseError::MissingMarker { .. }));
    }

    #[test]
    fn scoped_event_subscription_marker_is_case_sensitive_by_default() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/rg1/providers/microsoft.eventgrid/eventsubscriptions/sub1"
        );
        assert!(EventSubscriptionId::parse(&input).is_err());
        let id = EventSubscriptionId::parse_insensitively(&input).unwrap();
        assert_eq!(id.name, "sub1");
    }

    #[test]
    fn scoped_event_subscription_rejects_empty_name() {
        let input = format!(
            "/subscriptions/{SUB}/resourceGroups/rg1/providers/Microsoft.EventGrid/eventSubscriptions/"
        );
        assert!(EventSubscriptionId::parse(&input).is_err());
    }
}
