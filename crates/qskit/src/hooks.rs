//! Codec for self-describing types

use std::fmt;
use std::sync::Arc;

use crate::codec::{Marshaler, Unmarshaler};
use crate::error::QsResult;
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::reflect::{SelfDescribingHook, TypeDescriptor, Value};

/// Hands the whole value list to the type's own
/// [`SelfDescribing`](crate::SelfDescribing) implementation, including the
/// absent-key case.
#[derive(Clone)]
pub struct SelfDescribingCodec {
    desc: TypeDescriptor,
    hook: Arc<dyn SelfDescribingHook>,
}

impl SelfDescribingCodec {
    pub fn new(desc: &TypeDescriptor, hook: Arc<dyn SelfDescribingHook>) -> Self {
        Self {
            desc: desc.clone(),
            hook,
        }
    }
}

impl Marshaler for SelfDescribingCodec {
    fn marshal(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Vec<String>> {
        self.desc.check(value)?;
        self.hook.marshal(value, opts)
    }
}

impl Unmarshaler for SelfDescribingCodec {
    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        self.hook.unmarshal(value, values, opts)
    }
}

impl fmt::Debug for SelfDescribingCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfDescribingCodec")
            .field("type", &self.desc.name())
            .finish()
    }
}
