//! Composite codecs for records
//!
//! A record codec is built once per type by walking the declared fields in
//! order. Skipped fields disappear, flattened fields get a composite codec
//! whose keys are merged into the parent, and every other field gets a
//! scalar-ish codec bound to its wire key.

use std::fmt;
use std::sync::Arc;

use crate::codec::{Marshaler, Unmarshaler, Values, ValuesMarshaler, ValuesUnmarshaler};
use crate::error::{ErrorKind, QsError, QsResult};
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::presence::{MarshalPresence, UnmarshalPresence};
use crate::reflect::{FieldInfo, TypeDescriptor, Value};
use crate::tag::{FieldTag, ParsedTag, parse_field_tag};

struct FieldMarshaler {
    info: FieldInfo,
    key: String,
    presence: MarshalPresence,
    descriptor: TypeDescriptor,
    marshaler: Arc<dyn Marshaler>,
}

struct EmbeddedMarshaler {
    info: FieldInfo,
    marshaler: Arc<dyn ValuesMarshaler>,
}

enum BuiltMarshaler {
    Field(FieldMarshaler),
    Embedded(EmbeddedMarshaler),
}

/// Encodes a record into one wire multimap
pub struct RecordMarshaler {
    desc: TypeDescriptor,
    fields: Vec<FieldMarshaler>,
    embedded: Vec<EmbeddedMarshaler>,
}

impl RecordMarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        fields: &[FieldInfo],
        opts: &MarshalOptions,
    ) -> QsResult<Self> {
        let mut record = Self {
            desc: desc.clone(),
            fields: Vec::new(),
            embedded: Vec::new(),
        };
        for info in fields {
            let built = build_field_marshaler(desc, info, opts).map_err(|source| {
                QsError::FieldConstruction {
                    owner: desc.name(),
                    field: info.name,
                    source: Box::new(source),
                }
            })?;
            match built {
                Some(BuiltMarshaler::Field(field)) => record.fields.push(field),
                Some(BuiltMarshaler::Embedded(embedded)) => record.embedded.push(embedded),
                None => {}
            }
        }
        Ok(record)
    }
}

fn field_tag(
    info: &FieldInfo,
    transform: &dyn Fn(&str) -> String,
    default_marshal: MarshalPresence,
    default_unmarshal: UnmarshalPresence,
) -> QsResult<Option<ParsedTag>> {
    match parse_field_tag(info.name, info.tag, transform, default_marshal, default_unmarshal)? {
        FieldTag::Skip => Ok(None),
        FieldTag::Field(tag) => Ok(Some(tag)),
    }
}

fn build_field_marshaler(
    owner: &TypeDescriptor,
    info: &FieldInfo,
    opts: &MarshalOptions,
) -> QsResult<Option<BuiltMarshaler>> {
    let default = opts.default_marshal_presence.or(MarshalPresence::DEFAULT);
    let Some(tag) = field_tag(info, &*opts.name_transform, default, UnmarshalPresence::Opt)? else {
        return Ok(None);
    };
    let descriptor = (info.descriptor)();

    if info.flatten {
        match opts.values_marshaler_factory.values_marshaler(&descriptor, opts) {
            Ok(marshaler) => {
                return Ok(Some(BuiltMarshaler::Embedded(EmbeddedMarshaler {
                    info: *info,
                    marshaler,
                })));
            }
            Err(err) => tracing::debug!(
                owner = owner.name(),
                field = info.name,
                error = %err,
                "flattened field is not composite, encoding it under its own key"
            ),
        }
    }

    let marshaler = opts.marshaler_factory.marshaler(&descriptor, opts)?;
    Ok(Some(BuiltMarshaler::Field(FieldMarshaler {
        info: *info,
        key: tag.name,
        presence: tag.marshal_presence,
        descriptor,
        marshaler,
    })))
}

impl ValuesMarshaler for RecordMarshaler {
    fn marshal_values(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Values> {
        self.desc.check(value)?;
        let owner = self.desc.name();
        let mut out = Values::new();

        for field in &self.fields {
            let field_value = field_ref(&self.desc, &field.info, value)?;
            if field.presence == MarshalPresence::OmitEmpty
                && field.descriptor.is_empty(field_value)
            {
                continue;
            }
            let encoded = field
                .marshaler
                .marshal(field_value, opts)
                .map_err(|err| QsError::field(owner, &field.key, err))?;
            if !encoded.is_empty() {
                out.insert(field.key.clone(), encoded);
            }
        }

        for embedded in &self.embedded {
            let field_value = field_ref(&self.desc, &embedded.info, value)?;
            let encoded = embedded
                .marshaler
                .marshal_values(field_value, opts)
                .map_err(|source| QsError::Embedded {
                    owner,
                    field: embedded.info.name,
                    source: Box::new(source),
                })?;
            out.extend(encoded);
        }

        Ok(out)
    }
}

struct FieldUnmarshaler {
    info: FieldInfo,
    key: String,
    presence: UnmarshalPresence,
    unmarshaler: Arc<dyn Unmarshaler>,
}

struct EmbeddedUnmarshaler {
    info: FieldInfo,
    unmarshaler: Arc<dyn ValuesUnmarshaler>,
}

enum BuiltUnmarshaler {
    Field(FieldUnmarshaler),
    Embedded(EmbeddedUnmarshaler),
}

/// Decodes one wire multimap into a record
pub struct RecordUnmarshaler {
    desc: TypeDescriptor,
    fields: Vec<FieldUnmarshaler>,
    embedded: Vec<EmbeddedUnmarshaler>,
}

impl RecordUnmarshaler {
    pub fn new(
        desc: &TypeDescriptor,
        fields: &[FieldInfo],
        opts: &UnmarshalOptions,
    ) -> QsResult<Self> {
        let mut record = Self {
            desc: desc.clone(),
            fields: Vec::new(),
            embedded: Vec::new(),
        };
        for info in fields {
            let built = build_field_unmarshaler(desc, info, opts).map_err(|source| {
                QsError::FieldConstruction {
                    owner: desc.name(),
                    field: info.name,
                    source: Box::new(source),
                }
            })?;
            match built {
                Some(BuiltUnmarshaler::Field(field)) => record.fields.push(field),
                Some(BuiltUnmarshaler::Embedded(embedded)) => record.embedded.push(embedded),
                None => {}
            }
        }
        Ok(record)
    }
}

fn build_field_unmarshaler(
    owner: &TypeDescriptor,
    info: &FieldInfo,
    opts: &UnmarshalOptions,
) -> QsResult<Option<BuiltUnmarshaler>> {
    let default = opts.default_unmarshal_presence.or(UnmarshalPresence::DEFAULT);
    let Some(tag) = field_tag(info, &*opts.name_transform, MarshalPresence::KeepEmpty, default)?
    else {
        return Ok(None);
    };
    let descriptor = (info.descriptor)();

    if info.flatten {
        match opts.values_unmarshaler_factory.values_unmarshaler(&descriptor, opts) {
            Ok(unmarshaler) => {
                return Ok(Some(BuiltUnmarshaler::Embedded(EmbeddedUnmarshaler {
                    info: *info,
                    unmarshaler,
                })));
            }
            Err(err) => tracing::debug!(
                owner = owner.name(),
                field = info.name,
                error = %err,
                "flattened field is not composite, decoding it from its own key"
            ),
        }
    }

    let unmarshaler = opts.unmarshaler_factory.unmarshaler(&descriptor, opts)?;
    Ok(Some(BuiltUnmarshaler::Field(FieldUnmarshaler {
        info: *info,
        key: tag.name,
        presence: tag.unmarshal_presence,
        unmarshaler,
    })))
}

impl ValuesUnmarshaler for RecordUnmarshaler {
    fn unmarshal_values(
        &self,
        value: &mut dyn Value,
        values: &Values,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        let owner = self.desc.name();

        for field in &self.fields {
            let input = values.get(&field.key).map(Vec::as_slice);
            if input.is_none() {
                match field.presence {
                    UnmarshalPresence::Req => {
                        return Err(QsError::RequiredFieldMissing {
                            field: field.key.clone(),
                            owner,
                        });
                    }
                    UnmarshalPresence::Nil => continue,
                    UnmarshalPresence::Opt | UnmarshalPresence::Unspecified => {}
                }
            }
            let slot = field_mut(&self.desc, &field.info, value)?;
            field
                .unmarshaler
                .unmarshal(slot, input, opts)
                .map_err(|err| QsError::field(owner, &field.key, err))?;
        }

        for embedded in &self.embedded {
            let slot = field_mut(&self.desc, &embedded.info, value)?;
            embedded
                .unmarshaler
                .unmarshal_values(slot, values, opts)
                .map_err(|source| {
                    let field = embedded.info.name;
                    let source = Box::new(source);
                    if source.kind() == ErrorKind::RequiredFieldMissing {
                        QsError::RequiredEmbeddedField {
                            field,
                            owner,
                            source,
                        }
                    } else {
                        QsError::Embedded {
                            owner,
                            field,
                            source,
                        }
                    }
                })?;
        }

        Ok(())
    }
}

fn field_ref<'a>(
    owner: &TypeDescriptor,
    info: &FieldInfo,
    value: &'a dyn Value,
) -> QsResult<&'a dyn Value> {
    (info.get)(value).ok_or_else(|| QsError::type_mismatch(value.type_name(), owner.name()))
}

fn field_mut<'a>(
    owner: &TypeDescriptor,
    info: &FieldInfo,
    value: &'a mut dyn Value,
) -> QsResult<&'a mut dyn Value> {
    let actual = value.type_name();
    (info.get_mut)(value).ok_or_else(|| QsError::type_mismatch(actual, owner.name()))
}

impl fmt::Debug for RecordMarshaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordMarshaler")
            .field("type", &self.desc.name())
            .field("keys", &self.fields.iter().map(|field| &field.key).collect::<Vec<_>>())
            .field(
                "embedded",
                &self.embedded.iter().map(|field| field.info.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Debug for RecordUnmarshaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordUnmarshaler")
            .field("type", &self.desc.name())
            .field("keys", &self.fields.iter().map(|field| &field.key).collect::<Vec<_>>())
            .field(
                "embedded",
                &self.embedded.iter().map(|field| field.info.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
