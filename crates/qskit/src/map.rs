//! Composite codecs for string-keyed maps and optional composites

use std::fmt;
use std::sync::Arc;

use crate::codec::{Marshaler, Unmarshaler, Values, ValuesMarshaler, ValuesUnmarshaler};
use crate::error::{QsError, QsResult};
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::presence::MarshalPresence;
use crate::reflect::{MapAccess, OptionalAccess, TypeDescriptor, Value};

/// Encodes every entry under its own key
///
/// Entries holding an empty value are dropped when the default marshal
/// presence is `OmitEmpty`.
#[derive(Clone)]
pub struct MapMarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn MapAccess>,
    value_desc: TypeDescriptor,
    presence: MarshalPresence,
    marshaler: Arc<dyn Marshaler>,
}

impl MapMarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn MapAccess>,
        opts: &MarshalOptions,
    ) -> QsResult<Self> {
        let value_desc = access.value();
        let marshaler = opts
            .marshaler_factory
            .marshaler(&value_desc, opts)
            .map_err(|source| QsError::MapValueConstruction {
                value: value_desc.name(),
                source: Box::new(source),
            })?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            value_desc,
            presence: opts.default_marshal_presence.or(MarshalPresence::DEFAULT),
            marshaler,
        })
    }
}

impl ValuesMarshaler for MapMarshaler {
    fn marshal_values(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Values> {
        self.desc.check(value)?;
        let mut out = Values::new();
        for (key, entry) in self.access.entries(value)? {
            if self.presence == MarshalPresence::OmitEmpty && self.value_desc.is_empty(entry) {
                continue;
            }
            let encoded = self
                .marshaler
                .marshal(entry, opts)
                .map_err(|err| QsError::map_entry(key, err))?;
            if !encoded.is_empty() {
                out.insert(key.to_string(), encoded);
            }
        }
        Ok(out)
    }
}

/// Decodes every wire key into a map entry
///
/// Each entry starts from a fresh zero value. Existing entries under other
/// keys are kept.
#[derive(Clone)]
pub struct MapUnmarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn MapAccess>,
    unmarshaler: Arc<dyn Unmarshaler>,
}

impl MapUnmarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn MapAccess>,
        opts: &UnmarshalOptions,
    ) -> QsResult<Self> {
        let value_desc = access.value();
        let unmarshaler = opts
            .unmarshaler_factory
            .unmarshaler(&value_desc, opts)
            .map_err(|source| QsError::MapValueConstruction {
                value: value_desc.name(),
                source: Box::new(source),
            })?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            unmarshaler,
        })
    }
}

impl ValuesUnmarshaler for MapUnmarshaler {
    fn unmarshal_values(
        &self,
        value: &mut dyn Value,
        values: &Values,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        for (key, input) in values {
            self.access
                .insert_with(value, key, &mut |item| {
                    self.unmarshaler.unmarshal(item, Some(input.as_slice()), opts)
                })
                .map_err(|err| QsError::map_entry(key, err))?;
        }
        Ok(())
    }
}

/// Encodes `None` as an empty multimap and `Some(v)` as the encoding of `v`
#[derive(Clone)]
pub struct OptionalValuesMarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn OptionalAccess>,
    inner: Arc<dyn ValuesMarshaler>,
}

impl OptionalValuesMarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn OptionalAccess>,
        opts: &MarshalOptions,
    ) -> QsResult<Self> {
        let inner = opts.values_marshaler_factory.values_marshaler(&access.inner(), opts)?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            inner,
        })
    }
}

impl ValuesMarshaler for OptionalValuesMarshaler {
    fn marshal_values(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Values> {
        self.desc.check(value)?;
        match self.access.get(value)? {
            Some(inner) => self.inner.marshal_values(inner, opts),
            None => Ok(Values::new()),
        }
    }
}

/// Allocates the inner composite if needed and decodes into it
#[derive(Clone)]
pub struct OptionalValuesUnmarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn OptionalAccess>,
    inner: Arc<dyn ValuesUnmarshaler>,
}

impl OptionalValuesUnmarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn OptionalAccess>,
        opts: &UnmarshalOptions,
    ) -> QsResult<Self> {
        let inner = opts
            .values_unmarshaler_factory
            .values_unmarshaler(&access.inner(), opts)?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            inner,
        })
    }
}

impl ValuesUnmarshaler for OptionalValuesUnmarshaler {
    fn unmarshal_values(
        &self,
        value: &mut dyn Value,
        values: &Values,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        let inner = self.access.get_or_insert(value)?;
        self.inner.unmarshal_values(inner, values, opts)
    }
}

macro_rules! debug_by_type {
    ($($codec:ident),+) => {
        $(
            impl fmt::Debug for $codec {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($codec))
                        .field("type", &self.desc.name())
                        .finish()
                }
            }
        )+
    };
}

debug_by_type!(
    MapMarshaler,
    MapUnmarshaler,
    OptionalValuesMarshaler,
    OptionalValuesUnmarshaler
);
