//! Marshal and unmarshal options
//!
//! Options carry the replaceable parts of the engine: the name transform, the
//! multi-value collapse function, the default presence policies and the codec
//! factories. [`QsMarshaler`](crate::QsMarshaler) and
//! [`QsUnmarshaler`](crate::QsUnmarshaler) prepare their options once, which
//! wraps both factories in a per-instance codec cache.

use std::fmt;
use std::sync::Arc;

use crate::cache::{
    MarshalerCache, UnmarshalerCache, ValuesMarshalerCache, ValuesUnmarshalerCache,
};
use crate::config::{CollapseStrategy, NamingStrategy, QsConfig};
use crate::error::{QsError, QsResult};
use crate::factory::{
    BuiltinMarshalerFactory, BuiltinUnmarshalerFactory, BuiltinValuesMarshalerFactory,
    BuiltinValuesUnmarshalerFactory, MarshalerFactory, UnmarshalerFactory,
    ValuesMarshalerFactory, ValuesUnmarshalerFactory,
};
use crate::naming;
use crate::presence::{MarshalPresence, UnmarshalPresence};

/// Maps a declared field name to its default wire key
pub type NameTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Reduces the values of one wire key to the single string a scalar needs
pub type CollapseFn = Arc<dyn Fn(&[String]) -> QsResult<String> + Send + Sync>;

/// Default collapse: exactly one value is required
pub fn collapse_exactly_one(values: &[String]) -> QsResult<String> {
    match values {
        [single] => Ok(single.clone()),
        _ => Err(QsError::Collapse {
            values: values.to_vec(),
        }),
    }
}

/// Collapse that keeps the first value
pub fn collapse_first(values: &[String]) -> QsResult<String> {
    values.first().cloned().ok_or(QsError::Collapse { values: Vec::new() })
}

/// Collapse that keeps the last value
pub fn collapse_last(values: &[String]) -> QsResult<String> {
    values.last().cloned().ok_or(QsError::Collapse { values: Vec::new() })
}

/// Collapse that joins all values with `separator`
pub fn collapse_join(separator: impl Into<String>) -> CollapseFn {
    let separator = separator.into();
    Arc::new(move |values: &[String]| -> QsResult<String> { Ok(values.join(&separator)) })
}

fn name_transform(naming: NamingStrategy) -> NameTransform {
    match naming {
        NamingStrategy::SnakeCase => Arc::new(naming::snake_case),
        NamingStrategy::Verbatim => Arc::new(naming::verbatim),
    }
}

fn collapse_fn(strategy: &CollapseStrategy) -> CollapseFn {
    match strategy {
        CollapseStrategy::ExactlyOne => Arc::new(collapse_exactly_one),
        CollapseStrategy::First => Arc::new(collapse_first),
        CollapseStrategy::Last => Arc::new(collapse_last),
        CollapseStrategy::Join { separator } => collapse_join(separator.clone()),
    }
}

/// Options used when encoding values
#[derive(Clone)]
pub struct MarshalOptions {
    pub name_transform: NameTransform,

    /// Produces codecs for whole records and maps
    pub values_marshaler_factory: Arc<dyn ValuesMarshalerFactory>,

    /// Produces codecs for fields, elements and map values
    pub marshaler_factory: Arc<dyn MarshalerFactory>,

    /// Presence of fields without an explicit marshal option
    pub default_marshal_presence: MarshalPresence,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self {
            name_transform: Arc::new(naming::snake_case),
            values_marshaler_factory: Arc::new(BuiltinValuesMarshalerFactory),
            marshaler_factory: Arc::new(BuiltinMarshalerFactory),
            default_marshal_presence: MarshalPresence::Unspecified,
        }
    }
}

impl MarshalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a settings document
    pub fn from_config(config: &QsConfig) -> Self {
        Self {
            name_transform: name_transform(config.naming),
            default_marshal_presence: config.marshal_presence,
            ..Self::default()
        }
    }

    pub fn with_name_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.name_transform = Arc::new(transform);
        self
    }

    pub fn with_values_marshaler_factory<F>(mut self, factory: F) -> Self
    where
        F: ValuesMarshalerFactory + 'static,
    {
        self.values_marshaler_factory = Arc::new(factory);
        self
    }

    pub fn with_marshaler_factory<F>(mut self, factory: F) -> Self
    where
        F: MarshalerFactory + 'static,
    {
        self.marshaler_factory = Arc::new(factory);
        self
    }

    pub fn with_default_presence(mut self, presence: MarshalPresence) -> Self {
        self.default_marshal_presence = presence;
        self
    }

    /// Wrap the factories in caches and resolve the default presence
    pub(crate) fn prepare(mut self) -> Self {
        self.values_marshaler_factory =
            Arc::new(ValuesMarshalerCache::new(self.values_marshaler_factory));
        self.marshaler_factory = Arc::new(MarshalerCache::new(self.marshaler_factory));
        self.default_marshal_presence = self.default_marshal_presence.or(MarshalPresence::DEFAULT);
        self
    }
}

impl fmt::Debug for MarshalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshalOptions")
            .field("default_marshal_presence", &self.default_marshal_presence)
            .finish_non_exhaustive()
    }
}

/// Options used when decoding values
#[derive(Clone)]
pub struct UnmarshalOptions {
    pub name_transform: NameTransform,

    /// Applied when a single-valued field receives a list of values
    pub collapse: CollapseFn,

    /// Produces codecs for whole records and maps
    pub values_unmarshaler_factory: Arc<dyn ValuesUnmarshalerFactory>,

    /// Produces codecs for fields, elements and map values
    pub unmarshaler_factory: Arc<dyn UnmarshalerFactory>,

    /// Presence of fields without an explicit unmarshal option
    pub default_unmarshal_presence: UnmarshalPresence,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        Self {
            name_transform: Arc::new(naming::snake_case),
            collapse: Arc::new(collapse_exactly_one),
            values_unmarshaler_factory: Arc::new(BuiltinValuesUnmarshalerFactory),
            unmarshaler_factory: Arc::new(BuiltinUnmarshalerFactory),
            default_unmarshal_presence: UnmarshalPresence::Unspecified,
        }
    }
}

impl UnmarshalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a settings document
    pub fn from_config(config: &QsConfig) -> Self {
        Self {
            name_transform: name_transform(config.naming),
            collapse: collapse_fn(&config.collapse),
            default_unmarshal_presence: config.unmarshal_presence,
            ..Self::default()
        }
    }

    pub fn with_name_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.name_transform = Arc::new(transform);
        self
    }

    pub fn with_collapse<F>(mut self, collapse: F) -> Self
    where
        F: Fn(&[String]) -> QsResult<String> + Send + Sync + 'static,
    {
        self.collapse = Arc::new(collapse);
        self
    }

    pub fn with_values_unmarshaler_factory<F>(mut self, factory: F) -> Self
    where
        F: ValuesUnmarshalerFactory + 'static,
    {
        self.values_unmarshaler_factory = Arc::new(factory);
        self
    }

    pub fn with_unmarshaler_factory<F>(mut self, factory: F) -> Self
    where
        F: UnmarshalerFactory + 'static,
    {
        self.unmarshaler_factory = Arc::new(factory);
        self
    }

    pub fn with_default_presence(mut self, presence: UnmarshalPresence) -> Self {
        self.default_unmarshal_presence = presence;
        self
    }

    /// Wrap the factories in caches and resolve the default presence
    pub(crate) fn prepare(mut self) -> Self {
        self.values_unmarshaler_factory =
            Arc::new(ValuesUnmarshalerCache::new(self.values_unmarshaler_factory));
        self.unmarshaler_factory = Arc::new(UnmarshalerCache::new(self.unmarshaler_factory));
        self.default_unmarshal_presence =
            self.default_unmarshal_presence.or(UnmarshalPresence::DEFAULT);
        self
    }
}

impl fmt::Debug for UnmarshalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmarshalOptions")
            .field("default_unmarshal_presence", &self.default_unmarshal_presence)
            .finish_non_exhaustive()
    }
}
