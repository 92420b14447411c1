//! Codec factories
//!
//! A factory turns a [`TypeDescriptor`] into a codec or explains why it
//! cannot. The built-in factories resolve nested types through the factories
//! in the options they receive, so a custom factory installed in the options
//! sees every nested type too. A custom factory usually handles the types it
//! knows and delegates everything else to the matching built-in one.

use std::sync::Arc;

use crate::codec::{Marshaler, Unmarshaler, ValuesMarshaler, ValuesUnmarshaler};
use crate::dispatch::{Dispatch, classify, classify_shape};
use crate::error::{QsError, QsResult};
use crate::hooks::SelfDescribingCodec;
use crate::map::{
    MapMarshaler, MapUnmarshaler, OptionalValuesMarshaler, OptionalValuesUnmarshaler,
};
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::record::{RecordMarshaler, RecordUnmarshaler};
use crate::reflect::TypeDescriptor;
use crate::scalar::{ScalarCodec, TextCodec, WellKnownCodec};
use crate::sequence::{OptionalMarshaler, OptionalUnmarshaler, SeqMarshaler, SeqUnmarshaler};

/// Creates composite encoders for records, maps and optional composites
pub trait ValuesMarshalerFactory: Send + Sync {
    fn values_marshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &MarshalOptions,
    ) -> QsResult<Arc<dyn ValuesMarshaler>>;
}

/// Creates scalar-ish encoders for fields, elements and map values
pub trait MarshalerFactory: Send + Sync {
    fn marshaler(&self, desc: &TypeDescriptor, opts: &MarshalOptions)
    -> QsResult<Arc<dyn Marshaler>>;
}

/// Creates composite decoders for records, maps and optional composites
pub trait ValuesUnmarshalerFactory: Send + Sync {
    fn values_unmarshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &UnmarshalOptions,
    ) -> QsResult<Arc<dyn ValuesUnmarshaler>>;
}

/// Creates scalar-ish decoders for fields, elements and map values
pub trait UnmarshalerFactory: Send + Sync {
    fn unmarshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &UnmarshalOptions,
    ) -> QsResult<Arc<dyn Unmarshaler>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinValuesMarshalerFactory;

impl ValuesMarshalerFactory for BuiltinValuesMarshalerFactory {
    fn values_marshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &MarshalOptions,
    ) -> QsResult<Arc<dyn ValuesMarshaler>> {
        match classify_shape(desc)? {
            Dispatch::Optional(access) => {
                Ok(Arc::new(OptionalValuesMarshaler::new(desc, access, opts)?))
            }
            Dispatch::Record(fields) => Ok(Arc::new(RecordMarshaler::new(desc, fields, opts)?)),
            Dispatch::Map(access) => Ok(Arc::new(MapMarshaler::new(desc, access, opts)?)),
            _ => Err(QsError::UnhandledType(desc.name())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMarshalerFactory;

impl MarshalerFactory for BuiltinMarshalerFactory {
    fn marshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &MarshalOptions,
    ) -> QsResult<Arc<dyn Marshaler>> {
        match classify(desc)? {
            Dispatch::SelfDescribing(hook) => {
                Ok(Arc::new(SelfDescribingCodec::new(desc, hook.clone())))
            }
            Dispatch::Optional(access) => Ok(Arc::new(OptionalMarshaler::new(desc, access, opts)?)),
            Dispatch::Array(access) | Dispatch::Seq(access) => {
                Ok(Arc::new(SeqMarshaler::new(desc, access, opts)?))
            }
            Dispatch::WellKnown(kind) => Ok(Arc::new(WellKnownCodec::new(desc, kind))),
            Dispatch::Scalar(kind) => Ok(Arc::new(ScalarCodec::new(kind))),
            Dispatch::Text(hook) => Ok(Arc::new(TextCodec::new(desc, hook.clone()))),
            Dispatch::Record(_) | Dispatch::Map(_) => Err(QsError::UnhandledType(desc.name())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinValuesUnmarshalerFactory;

impl ValuesUnmarshalerFactory for BuiltinValuesUnmarshalerFactory {
    fn values_unmarshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &UnmarshalOptions,
    ) -> QsResult<Arc<dyn ValuesUnmarshaler>> {
        match classify_shape(desc)? {
            Dispatch::Optional(access) => {
                Ok(Arc::new(OptionalValuesUnmarshaler::new(desc, access, opts)?))
            }
            Dispatch::Record(fields) => Ok(Arc::new(RecordUnmarshaler::new(desc, fields, opts)?)),
            Dispatch::Map(access) => Ok(Arc::new(MapUnmarshaler::new(desc, access, opts)?)),
            _ => Err(QsError::UnhandledType(desc.name())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinUnmarshalerFactory;

impl UnmarshalerFactory for BuiltinUnmarshalerFactory {
    fn unmarshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &UnmarshalOptions,
    ) -> QsResult<Arc<dyn Unmarshaler>> {
        match classify(desc)? {
            Dispatch::SelfDescribing(hook) => {
                Ok(Arc::new(SelfDescribingCodec::new(desc, hook.clone())))
            }
            Dispatch::Optional(access) => {
                Ok(Arc::new(OptionalUnmarshaler::new(desc, access, opts)?))
            }
            Dispatch::Array(access) | Dispatch::Seq(access) => {
                Ok(Arc::new(SeqUnmarshaler::new(desc, access, opts)?))
            }
            Dispatch::WellKnown(kind) => Ok(Arc::new(WellKnownCodec::new(desc, kind))),
            Dispatch::Scalar(kind) => Ok(Arc::new(ScalarCodec::new(kind))),
            Dispatch::Text(hook) => Ok(Arc::new(TextCodec::new(desc, hook.clone()))),
            Dispatch::Record(_) | Dispatch::Map(_) => Err(QsError::UnhandledType(desc.name())),
        }
    }
}
