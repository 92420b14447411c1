//! Memoizing factory decorators
//!
//! Each cache wraps one factory and remembers, per type, whichever outcome the
//! first resolution produced: the codec or the construction error. Lookups
//! take a shared lock. A miss builds the codec without holding any lock, so
//! recursive resolution of nested types never deadlocks, and then stores the
//! result unless a concurrent caller stored one first. The first stored
//! outcome always wins.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::codec::{Marshaler, Unmarshaler, ValuesMarshaler, ValuesUnmarshaler};
use crate::error::QsResult;
use crate::factory::{
    MarshalerFactory, UnmarshalerFactory, ValuesMarshalerFactory, ValuesUnmarshalerFactory,
};
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::reflect::TypeDescriptor;

/// Per-type store of construction outcomes
struct TypeCache<V> {
    entries: RwLock<HashMap<TypeId, QsResult<V>>>,
}

impl<V: Clone> TypeCache<V> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn get_or_build<F>(&self, desc: &TypeDescriptor, build: F) -> QsResult<V>
    where
        F: FnOnce() -> QsResult<V>,
    {
        if let Some(entry) = self.entries.read().get(&desc.type_id()) {
            tracing::trace!(type_name = desc.name(), "codec cache hit");
            return entry.clone();
        }

        let built = build();
        match &built {
            Ok(_) => tracing::debug!(type_name = desc.name(), "codec built"),
            Err(err) => {
                tracing::debug!(type_name = desc.name(), error = %err, "codec construction failed")
            }
        }

        self.entries
            .write()
            .entry(desc.type_id())
            .or_insert(built)
            .clone()
    }
}

macro_rules! factory_cache {
    (
        $(#[$meta:meta])*
        $cache:ident, $factory:ident, $method:ident, $codec:ident, $opts:ty
    ) => {
        $(#[$meta])*
        pub struct $cache {
            inner: Arc<dyn $factory>,
            cache: TypeCache<Arc<dyn $codec>>,
        }

        impl $cache {
            pub fn new(inner: Arc<dyn $factory>) -> Self {
                Self {
                    inner,
                    cache: TypeCache::new(),
                }
            }

            /// Number of types resolved so far, successfully or not
            pub fn len(&self) -> usize {
                self.cache.len()
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        impl $factory for $cache {
            fn $method(&self, desc: &TypeDescriptor, opts: &$opts) -> QsResult<Arc<dyn $codec>> {
                self.cache.get_or_build(desc, || self.inner.$method(desc, opts))
            }
        }

        impl fmt::Debug for $cache {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($cache))
                    .field("entries", &self.len())
                    .finish()
            }
        }
    };
}

factory_cache!(
    /// Caching decorator for a [`ValuesMarshalerFactory`]
    ValuesMarshalerCache,
    ValuesMarshalerFactory,
    values_marshaler,
    ValuesMarshaler,
    MarshalOptions
);

factory_cache!(
    /// Caching decorator for a [`MarshalerFactory`]
    MarshalerCache,
    MarshalerFactory,
    marshaler,
    Marshaler,
    MarshalOptions
);

factory_cache!(
    /// Caching decorator for a [`ValuesUnmarshalerFactory`]
    ValuesUnmarshalerCache,
    ValuesUnmarshalerFactory,
    values_unmarshaler,
    ValuesUnmarshaler,
    UnmarshalOptions
);

factory_cache!(
    /// Caching decorator for an [`UnmarshalerFactory`]
    UnmarshalerCache,
    UnmarshalerFactory,
    unmarshaler,
    Unmarshaler,
    UnmarshalOptions
);

#[cfg(test)]
#[path = "cache/cache_tests.rs"]
mod cache_tests;
