//! Scalar-ish codecs for optionals and sequences

use std::fmt;
use std::slice;
use std::sync::Arc;

use crate::codec::{Marshaler, Unmarshaler};
use crate::dispatch::classify;
use crate::error::{QsError, QsResult};
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::reflect::{OptionalAccess, SeqAccess, TypeDescriptor, Value};

/// Encodes `None` as no values and `Some(v)` as the encoding of `v`
#[derive(Clone)]
pub struct OptionalMarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn OptionalAccess>,
    inner: Arc<dyn Marshaler>,
}

impl OptionalMarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn OptionalAccess>,
        opts: &MarshalOptions,
    ) -> QsResult<Self> {
        let inner = opts.marshaler_factory.marshaler(&access.inner(), opts)?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            inner,
        })
    }
}

impl Marshaler for OptionalMarshaler {
    fn marshal(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Vec<String>> {
        self.desc.check(value)?;
        match self.access.get(value)? {
            Some(inner) => self.inner.marshal(inner, opts),
            None => Ok(Vec::new()),
        }
    }
}

/// Leaves the option untouched for an absent key, otherwise allocates the
/// inner value if needed and decodes into it
#[derive(Clone)]
pub struct OptionalUnmarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn OptionalAccess>,
    inner: Arc<dyn Unmarshaler>,
}

impl OptionalUnmarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn OptionalAccess>,
        opts: &UnmarshalOptions,
    ) -> QsResult<Self> {
        let inner = opts.unmarshaler_factory.unmarshaler(&access.inner(), opts)?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            inner,
        })
    }
}

impl Unmarshaler for OptionalUnmarshaler {
    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        if values.is_none() {
            return Ok(());
        }
        let inner = self.access.get_or_insert(value)?;
        self.inner.unmarshal(inner, values, opts)
    }
}

/// Sequences of sequences have no flat encoding
fn element_descriptor(desc: &TypeDescriptor, access: &dyn SeqAccess) -> QsResult<TypeDescriptor> {
    let element = access.element();
    if classify(&element).is_ok_and(|dispatch| dispatch.is_sequence()) {
        return Err(QsError::NestedSequence {
            sequence: desc.name(),
            element: element.name(),
        });
    }
    Ok(element)
}

/// Encodes each element as exactly one string
#[derive(Clone)]
pub struct SeqMarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn SeqAccess>,
    element: Arc<dyn Marshaler>,
}

impl SeqMarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn SeqAccess>,
        opts: &MarshalOptions,
    ) -> QsResult<Self> {
        let element = element_descriptor(desc, access.as_ref())?;
        let element = opts.marshaler_factory.marshaler(&element, opts)?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            element,
        })
    }
}

impl Marshaler for SeqMarshaler {
    fn marshal(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Vec<String>> {
        self.desc.check(value)?;
        let len = self.access.len(value)?;
        let mut out = Vec::with_capacity(len);
        for index in 0..len {
            let item = self.access.get(value, index)?;
            let encoded = self
                .element
                .marshal(item, opts)
                .map_err(|err| QsError::element(index, err))?;
            let [single] = <[String; 1]>::try_from(encoded).map_err(|rest| {
                QsError::ElementArity {
                    index,
                    count: rest.len(),
                }
            })?;
            out.push(single);
        }
        Ok(out)
    }
}

/// Decodes one element per string; fixed-length sequences require an exact
/// count
#[derive(Clone)]
pub struct SeqUnmarshaler {
    desc: TypeDescriptor,
    access: Arc<dyn SeqAccess>,
    element: Arc<dyn Unmarshaler>,
}

impl SeqUnmarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        access: &Arc<dyn SeqAccess>,
        opts: &UnmarshalOptions,
    ) -> QsResult<Self> {
        let element = element_descriptor(desc, access.as_ref())?;
        let element = opts.unmarshaler_factory.unmarshaler(&element, opts)?;
        Ok(Self {
            desc: desc.clone(),
            access: access.clone(),
            element,
        })
    }
}

impl Unmarshaler for SeqUnmarshaler {
    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        let Some(values) = values else {
            return Ok(());
        };
        if let Some(expected) = self.access.fixed_len() {
            if values.len() != expected {
                return Err(QsError::LengthMismatch {
                    expected,
                    actual: values.len(),
                });
            }
        }
        self.access.resize(value, values.len())?;
        for (index, text) in values.iter().enumerate() {
            let item = self.access.get_mut(value, index)?;
            self.element
                .unmarshal(item, Some(slice::from_ref(text)), opts)
                .map_err(|err| QsError::element(index, err))?;
        }
        Ok(())
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

debug_by_type!(OptionalMarshaler, OptionalUnmarshaler, SeqMarshaler, SeqUnmarshaler);

#[cfg(test)]
#[path = "sequence/sequence_tests.rs"]
mod sequence_tests;
