//! `Reflect` implementations for standard and well-known types

use std::any::{Any, type_name};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use url::Url;

use crate::error::{QsError, QsResult};
use crate::reflect::{
    MapAccess, OptionalAccess, Reflect, ScalarKind, SeqAccess, Shape, TypeDescriptor, Value,
    WellKnown, downcast_mut, downcast_ref, zero_of,
};

macro_rules! scalar_reflect {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::new::<Self>(Shape::Scalar(ScalarKind::$kind))
                }

                fn zero() -> Option<Self> {
                    Some(Default::default())
                }
            }
        )+
    };
}

scalar_reflect!(Bool => bool);
scalar_reflect!(Int => i8, i16, i32, i64, isize);
scalar_reflect!(Uint => u8, u16, u32, u64, usize);
scalar_reflect!(Float => f32, f64);
scalar_reflect!(String => String);

impl Reflect for OffsetDateTime {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::WellKnown(WellKnown::Timestamp))
    }

    fn zero() -> Option<Self> {
        Some(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Reflect for Url {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::WellKnown(WellKnown::Url))
    }

    fn zero() -> Option<Self> {
        Url::parse("about:blank").ok()
    }
}

// No built-in encoding; a custom factory can add one.
impl Reflect for Duration {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::opaque::<Self>()
    }

    fn zero() -> Option<Self> {
        Some(Duration::ZERO)
    }
}

struct OptionAccess<T>(PhantomData<fn() -> T>);

impl<T: Reflect> OptionalAccess for OptionAccess<T> {
    fn inner(&self) -> TypeDescriptor {
        T::descriptor()
    }

    fn get<'a>(&self, value: &'a dyn Value) -> QsResult<Option<&'a dyn Value>> {
        let option = downcast_ref::<Option<T>>(value)?;
        Ok(option.as_ref().map(|inner| inner as &dyn Value))
    }

    fn get_or_insert<'a>(&self, value: &'a mut dyn Value) -> QsResult<&'a mut dyn Value> {
        let option = downcast_mut::<Option<T>>(value)?;
        let inner = match option.take() {
            Some(inner) => inner,
            None => zero_of::<T>()?,
        };
        Ok(option.insert(inner))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Optional(Arc::new(OptionAccess::<T>(PhantomData))))
    }

    fn zero() -> Option<Self> {
        Some(None)
    }
}

struct VecAccess<T>(PhantomData<fn() -> T>);

impl<T: Reflect> SeqAccess for VecAccess<T> {
    fn element(&self) -> TypeDescriptor {
        T::descriptor()
    }

    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn len(&self, value: &dyn Value) -> QsResult<usize> {
        Ok(downcast_ref::<Vec<T>>(value)?.len())
    }

    fn get<'a>(&self, value: &'a dyn Value, index: usize) -> QsResult<&'a dyn Value> {
        let items = downcast_ref::<Vec<T>>(value)?;
        let len = items.len();
        items
            .get(index)
            .map(|item| item as &dyn Value)
            .ok_or(QsError::LengthMismatch { expected: index + 1, actual: len })
    }

    fn get_mut<'a>(&self, value: &'a mut dyn Value, index: usize) -> QsResult<&'a mut dyn Value> {
        let items = downcast_mut::<Vec<T>>(value)?;
        let len = items.len();
        items
            .get_mut(index)
            .map(|item| item as &mut dyn Value)
            .ok_or(QsError::LengthMismatch { expected: index + 1, actual: len })
    }

    fn resize(&self, value: &mut dyn Value, len: usize) -> QsResult<()> {
        let items = downcast_mut::<Vec<T>>(value)?;
        items.truncate(len);
        items.reserve(len - items.len());
        while items.len() < len {
            items.push(zero_of::<T>()?);
        }
        Ok(())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Seq(Arc::new(VecAccess::<T>(PhantomData))))
    }

    fn zero() -> Option<Self> {
        Some(Vec::new())
    }
}

struct ArrayAccess<T, const N: usize>(PhantomData<fn() -> T>);

impl<T: Reflect, const N: usize> SeqAccess for ArrayAccess<T, N> {
    fn element(&self) -> TypeDescriptor {
        T::descriptor()
    }

    fn fixed_len(&self) -> Option<usize> {
        Some(N)
    }

    fn len(&self, value: &dyn Value) -> QsResult<usize> {
        downcast_ref::<[T; N]>(value)?;
        Ok(N)
    }

    fn get<'a>(&self, value: &'a dyn Value, index: usize) -> QsResult<&'a dyn Value> {
        downcast_ref::<[T; N]>(value)?
            .get(index)
            .map(|item| item as &dyn Value)
            .ok_or(QsError::LengthMismatch { expected: N, actual: index + 1 })
    }

    fn get_mut<'a>(&self, value: &'a mut dyn Value, index: usize) -> QsResult<&'a mut dyn Value> {
        downcast_mut::<[T; N]>(value)?
            .get_mut(index)
            .map(|item| item as &mut dyn Value)
            .ok_or(QsError::LengthMismatch { expected: N, actual: index + 1 })
    }

    fn resize(&self, value: &mut dyn Value, len: usize) -> QsResult<()> {
        downcast_mut::<[T; N]>(value)?;
        if len != N {
            return Err(QsError::LengthMismatch { expected: N, actual: len });
        }
        Ok(())
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new::<Self>(Shape::Array(Arc::new(ArrayAccess::<T, N>(PhantomData))))
    }

    fn zero() -> Option<Self> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::zero()?);
        }
        items.try_into().ok()
    }
}

fn key_str<K: Any>(key: &K) -> QsResult<&str> {
    (key as &dyn Any)
        .downcast_ref::<String>()
        .map(String::as_str)
        .ok_or(QsError::MapKeyTypeInvalid(type_name::<K>()))
}

fn key_from_str<K: Any>(key: &str) -> QsResult<K> {
    let boxed: Box<dyn Any> = Box::new(key.to_string());
    boxed
        .downcast::<K>()
        .map(|key| *key)
        .map_err(|_| QsError::MapKeyTypeInvalid(type_name::<K>()))
}

macro_rules! map_reflect {
    ($access:ident, $map:ident, $($bound:path),+) => {
        struct $access<K, V>(PhantomData<fn() -> (K, V)>);

        impl<K, V> MapAccess for $access<K, V>
        where
            K: Reflect $(+ $bound)+,
            V: Reflect,
        {
            fn key(&self) -> TypeDescriptor {
                K::descriptor()
            }

            fn value(&self) -> TypeDescriptor {
                V::descriptor()
            }

            fn len(&self, map: &dyn Value) -> QsResult<usize> {
                Ok(downcast_ref::<$map<K, V>>(map)?.len())
            }

            fn entries<'a>(&self, map: &'a dyn Value) -> QsResult<Vec<(&'a str, &'a dyn Value)>> {
                downcast_ref::<$map<K, V>>(map)?
                    .iter()
                    .map(|(key, value)| Ok((key_str(key)?, value as &dyn Value)))
                    .collect()
            }

            fn insert_with(
                &self,
                map: &mut dyn Value,
                key: &str,
                fill: &mut dyn FnMut(&mut dyn Value) -> QsResult<()>,
            ) -> QsResult<()> {
                let map = downcast_mut::<$map<K, V>>(map)?;
                let key = key_from_str::<K>(key)?;
                let mut item = zero_of::<V>()?;
                fill(&mut item)?;
                map.insert(key, item);
                Ok(())
            }
        }

        impl<K, V> Reflect for $map<K, V>
        where
            K: Reflect $(+ $bound)+,
            V: Reflect,
        {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::new::<Self>(Shape::Map(Arc::new($access::<K, V>(PhantomData))))
            }

            fn zero() -> Option<Self> {
                Some($map::new())
            }
        }
    };
}

map_reflect!(HashMapAccess, HashMap, Eq, Hash);
map_reflect!(BTreeMapAccess, BTreeMap, Ord);

#[cfg(test)]
#[path = "impls/impls_tests.rs"]
mod impls_tests;
