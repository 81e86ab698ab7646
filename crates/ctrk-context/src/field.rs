//! # Context Fields — Closed Field Taxonomy
//!
//! Every named slot in the context store is a [`Field`] variant. Names arriving
//! as strings (configuration, adapters, CLI) are resolved through
//! [`Field::from_str`], which rejects anything unknown with
//! [`ContextError::UnknownField`]. Keys outside this set go into the metadata
//! map instead.
//!
//! Adding a field here forces every exhaustive `match` in the workspace to
//! handle it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// A named slot in the correlation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The propagated tracing token for this operation chain.
    CorrelationId,
    /// Correlation id of the upstream operation that caused this one.
    ParentId,
    /// How this execution unit was triggered (`http`, `job`, `queue`, ...).
    OriginType,
    /// The authenticated principal on whose behalf the work runs.
    ActorId,
    /// The customer account the work belongs to.
    CustomerId,
    /// Background job class or name.
    JobName,
    /// Third-party system that delivered a webhook.
    WebhookSource,
    /// Request identifier assigned by an external caller.
    ExternalRequestId,
    /// Outbound email template or category.
    EmailType,
    /// Client device identifier.
    DeviceId,
    /// Scheduled task or rake-style task name.
    TaskType,
    /// Message-queue topic the current record came from.
    QueueName,
    /// Partition of the current queue record.
    QueuePartition,
    /// Offset of the current queue record.
    QueueOffset,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 14] = [
        Self::CorrelationId,
        Self::ParentId,
        Self::OriginType,
        Self::ActorId,
        Self::CustomerId,
        Self::JobName,
        Self::WebhookSource,
        Self::ExternalRequestId,
        Self::EmailType,
        Self::DeviceId,
        Self::TaskType,
        Self::QueueName,
        Self::QueuePartition,
        Self::QueueOffset,
    ];

    /// Stable snake_case name, used as the key in exported maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CorrelationId => "correlation_id",
            Self::ParentId => "parent_id",
            Self::OriginType => "origin_type",
            Self::ActorId => "actor_id",
            Self::CustomerId => "customer_id",
            Self::JobName => "job_name",
            Self::WebhookSource => "webhook_source",
            Self::ExternalRequestId => "external_request_id",
            Self::EmailType => "email_type",
            Self::DeviceId => "device_id",
            Self::TaskType => "task_type",
            Self::QueueName => "queue_name",
            Self::QueuePartition => "queue_partition",
            Self::QueueOffset => "queue_offset",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ContextError;

    /// Resolves canonical names plus the adapter-facing aliases
    /// `parent_correlation_id`, `user_id`, `kafka_topic`, `kafka_partition`,
    /// and `kafka_offset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "parent_correlation_id" => Self::ParentId,
            "user_id" => Self::ActorId,
            "kafka_topic" => Self::QueueName,
            "kafka_partition" => Self::QueuePartition,
            "kafka_offset" => Self::QueueOffset,
            other => {
                return Self::ALL
                    .into_iter()
                    .find(|f| f.as_str() == other)
                    .ok_or_else(|| ContextError::UnknownField(other.to_string()))
            }
        };
        Ok(field)
    }
}
