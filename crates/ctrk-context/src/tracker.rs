//! # Tracker — The Context Facade
//!
//! [`Tracker`] is what adapters (HTTP middleware, job runners, queue consumers)
//! call. It combines identifier generation with the scoped store:
//!
//! - [`Tracker::establish`] adopts a supplied identifier or mints one, and
//!   writes the correlation triple (`correlation_id`, `parent_id`,
//!   `origin_type`) plus any extra fields into the current store.
//! - [`Tracker::with_temporary`] does the same for the duration of a closure,
//!   then restores the prior store exactly.
//! - [`Tracker::export`] flattens the store for log and telemetry enrichment.
//!
//! The correlation triple is always written as a unit. A parent that is not
//! supplied is cleared rather than inherited, and a missing origin falls back
//! to [`TrackerConfig::default_origin_type`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::{ConfigError, TrackerConfig};
use crate::error::ContextError;
use crate::field::Field;
use crate::inbound;
use crate::scope;
use crate::state::{ContextSnapshot, Overrides};

/// A caller-supplied identifier source that replaces the configured family.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

// ─── Establish ───────────────────────────────────────────────────────

/// What to write when establishing context.
#[derive(Debug, Clone, Default)]
pub struct Establish {
    correlation_id: Option<String>,
    parent_id: Option<String>,
    origin_type: Option<String>,
    extra: Overrides,
}

impl Establish {
    /// An empty request: generate an id and use the default origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt this identifier instead of generating one. Blank values count as absent.
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = non_blank(id.into());
        self
    }

    /// Record the id of the unit of work that caused this one. Blank values count as absent.
    pub fn parent_id(mut self, id: impl Into<String>) -> Self {
        self.parent_id = non_blank(id.into());
        self
    }

    /// Override [`TrackerConfig::default_origin_type`]. Blank values count as absent.
    pub fn origin_type(mut self, origin: impl Into<String>) -> Self {
        self.origin_type = non_blank(origin.into());
        self
    }

    /// Set any named field. The triple fields route to their dedicated slots.
    pub fn field(mut self, field: Field, value: impl Into<Value>) -> Self {
        let value = value.into();
        match field {
            Field::CorrelationId => self.correlation_id = value_text(value).and_then(non_blank),
            Field::ParentId => self.parent_id = value_text(value).and_then(non_blank),
            Field::OriginType => self.origin_type = value_text(value).and_then(non_blank),
            other => self.extra = self.extra.field(other, value),
        }
        self
    }

    /// Attach an open-ended metadata entry. `Value::Null` removes the key.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra = self.extra.metadata(key, value);
        self
    }

    /// Build from `(name, value)` pairs as received at an adapter boundary.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::UnknownField`] for the first name that is not a
    /// [`Field`]. Open-ended keys must go through [`Establish::metadata`].
    pub fn from_named<I, K>(pairs: I) -> Result<Self, ContextError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        pairs.into_iter().try_fold(Self::new(), |est, (name, value)| {
            Ok(est.field(name.as_ref().parse()?, value))
        })
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// ─── Tracker ─────────────────────────────────────────────────────────

/// Correlation facade over the current execution unit's store.
///
/// Cheap to clone; clones share configuration and the custom generator.
#[derive(Clone, Default)]
pub struct Tracker {
    config: Arc<TrackerConfig>,
    generator: Option<IdGenerator>,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.config)
            .field("custom_generator", &self.generator.is_some())
            .finish()
    }
}

impl Tracker {
    /// Tracker using `config` and family-based generation.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config: Arc::new(config),
            generator: None,
        }
    }

    /// Tracker configured from `CTRK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(TrackerConfig::from_env()?))
    }

    /// Replace family-based generation with a custom source.
    pub fn with_generator(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// The configuration this tracker was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Mint a fresh identifier from the custom generator or the configured family.
    ///
    /// # Errors
    ///
    /// Propagates [`ctrk_core::IdentifierError::RandomSourceExhausted`].
    pub fn generate_id(&self) -> Result<String, ContextError> {
        match &self.generator {
            Some(generator) => Ok(generator()),
            None => Ok(ctrk_core::generate(self.config.family)?.to_string()),
        }
    }

    /// Turn an [`Establish`] into the concrete writes, generating an id if needed.
    fn resolve(&self, est: Establish) -> Result<(String, bool, Overrides), ContextError> {
        let (id, generated) = match est.correlation_id {
            Some(id) => (id, false),
            None => (self.generate_id()?, true),
        };
        let origin = est
            .origin_type
            .unwrap_or_else(|| self.config.default_origin_type.clone());
        let writes = Overrides::new()
            .field(Field::CorrelationId, id.clone())
            .field(Field::ParentId, est.parent_id.map_or(Value::Null, Value::from))
            .field(Field::OriginType, origin)
            .extend(est.extra);
        Ok((id, generated, writes))
    }

    /// Adopt or generate an identifier and write it, with the rest of `est`,
    /// into the current store. Returns the effective identifier.
    ///
    /// # Caveats
    ///
    /// Outside a tokio task scope the current store is the OS thread's.
    /// Async adapters must run each unit of work inside [`scope::in_task`],
    /// otherwise every task polled on the same worker thread reads and
    /// overwrites this context.
    pub fn establish(&self, est: Establish) -> Result<String, ContextError> {
        let (id, generated, writes) = self.resolve(est)?;
        scope::merge(&writes);
        tracing::debug!(
            correlation_id = %id,
            origin_type = ?scope::get(Field::OriginType),
            generated,
            "established correlation context"
        );
        Ok(id)
    }

    /// Run `body` under a temporary context, restoring the prior one afterwards.
    ///
    /// # Errors
    ///
    /// Fails only if an identifier had to be generated and generation failed;
    /// in that case `body` does not run. The body's own outcome is returned
    /// inside `Ok` unchanged.
    pub fn with_temporary<T>(
        &self,
        est: Establish,
        body: impl FnOnce() -> T,
    ) -> Result<T, ContextError> {
        let (_, _, writes) = self.resolve(est)?;
        Ok(scope::run_scoped(&writes, body))
    }

    /// Async counterpart of [`Tracker::with_temporary`].
    pub async fn with_temporary_async<F: Future>(
        &self,
        est: Establish,
        body: F,
    ) -> Result<F::Output, ContextError> {
        let (_, _, writes) = self.resolve(est)?;
        Ok(scope::run_scoped_async(&writes, body).await)
    }

    /// Accept an inbound identifier under the configured format policy, or
    /// generate a fresh one if it is missing or rejected.
    pub fn resolve_inbound(&self, raw: Option<&str>) -> Result<String, ContextError> {
        match inbound::accept(raw, self.config.strict_format) {
            Some(id) => Ok(id),
            None => self.generate_id(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────

    /// The current correlation id, if one is established.
    pub fn current_id(&self) -> Option<String> {
        scope::get(Field::CorrelationId).and_then(value_text)
    }

    /// The current parent id, if the unit of work has one.
    pub fn parent_id(&self) -> Option<String> {
        scope::get(Field::ParentId).and_then(value_text)
    }

    /// The kind of entry point that started the unit of work.
    pub fn origin_type(&self) -> Option<String> {
        scope::get(Field::OriginType).and_then(value_text)
    }

    /// Read any named field from the current store.
    pub fn get(&self, field: Field) -> Option<Value> {
        scope::get(field)
    }

    /// Write a named field. `Value::Null` removes it.
    pub fn set(&self, field: Field, value: impl Into<Value>) {
        scope::set(field, value);
    }

    /// Set a field named by string.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::UnknownField`] and writes nothing if `name` is
    /// not a [`Field`].
    pub fn set_by_name(&self, name: &str, value: impl Into<Value>) -> Result<(), ContextError> {
        let field: Field = name.parse()?;
        scope::set(field, value);
        Ok(())
    }

    /// Write an open-ended metadata entry. `Value::Null` removes it.
    pub fn add_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
        scope::set_metadata(key, value);
    }

    /// Flatten the current store for log enrichment. See [`scope::export`].
    pub fn export(&self) -> Map<String, Value> {
        scope::export()
    }

    /// Clear the current store at the end of a unit of work.
    pub fn reset(&self) {
        scope::reset();
    }

    /// The current context as a value, ready to install in another task.
    pub fn handoff(&self) -> ContextSnapshot {
        scope::snapshot()
    }

    /// A `correlation` span carrying the current triple and the service name.
    pub fn span(&self) -> tracing::Span {
        let span = tracing::info_span!(
            "correlation",
            correlation_id = tracing::field::Empty,
            parent_id = tracing::field::Empty,
            origin_type = tracing::field::Empty,
            service = %self.config.service_name,
        );
        if let Some(id) = self.current_id() {
            span.record("correlation_id", id.as_str());
        }
        if let Some(parent) = self.parent_id() {
            span.record("parent_id", parent.as_str());
        }
        if let Some(origin) = self.origin_type() {
            span.record("origin_type", origin.as_str());
        }
        span
    }
}
