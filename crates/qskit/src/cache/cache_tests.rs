#![allow(non_snake_case)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Barrier, Mutex};
use std::thread;
use std::time::Duration;

use super::*;
use crate::error::ErrorKind;
use crate::factory::{BuiltinMarshalerFactory, BuiltinUnmarshalerFactory};

/// Delegates to the built-in factory and counts constructions
#[derive(Default)]
struct CountingFactory {
    builds: AtomicUsize,
}

impl MarshalerFactory for CountingFactory {
    fn marshaler(
        &self,
        desc: &TypeDescriptor,
        opts: &MarshalOptions,
    ) -> QsResult<Arc<dyn Marshaler>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        BuiltinMarshalerFactory.marshaler(desc, opts)
    }
}

fn counting_cache() -> (Arc<CountingFactory>, MarshalerCache) {
    let factory = Arc::new(CountingFactory::default());
    let cache = MarshalerCache::new(factory.clone());
    (factory, cache)
}

fn same_codec<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[test]
fn MarshalerCache___new___is_empty() {
    let (_, cache) = counting_cache();

    assert!(cache.is_empty());
    assert_eq!(format!("{cache:?}"), "MarshalerCache { entries: 0 }");
}

#[test]
fn MarshalerCache___repeated_lookup___builds_once() {
    let (factory, cache) = counting_cache();
    let opts = MarshalOptions::default();
    let desc = TypeDescriptor::of::<i32>();

    let first = cache.marshaler(&desc, &opts).unwrap();
    let second = cache.marshaler(&desc, &opts).unwrap();

    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
    assert!(same_codec(&first, &second));
}

#[test]
fn MarshalerCache___distinct_types___get_distinct_entries() {
    let (factory, cache) = counting_cache();
    let opts = MarshalOptions::default();

    cache.marshaler(&TypeDescriptor::of::<i32>(), &opts).unwrap();
    cache.marshaler(&TypeDescriptor::of::<i64>(), &opts).unwrap();
    cache.marshaler(&TypeDescriptor::of::<String>(), &opts).unwrap();

    assert_eq!(factory.builds.load(Ordering::SeqCst), 3);
    assert_eq!(cache.len(), 3);
}

#[test]
fn MarshalerCache___construction_error___is_cached() {
    let (factory, cache) = counting_cache();
    let opts = MarshalOptions::default();
    let desc = TypeDescriptor::of::<Duration>();

    let first = cache.marshaler(&desc, &opts).err().unwrap();
    let second = cache.marshaler(&desc, &opts).err().unwrap();

    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    assert_eq!(first.kind(), ErrorKind::UnhandledType);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn MarshalerCache___concurrent_first_lookups___return_one_codec() {
    const THREADS: usize = 8;
    let (factory, cache) = counting_cache();
    let cache = Arc::new(cache);
    let barrier = Arc::new(Barrier::new(THREADS));
    let results = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            let results = results.clone();
            thread::spawn(move || {
                barrier.wait();
                let codec = cache
                    .marshaler(&TypeDescriptor::of::<Vec<u64>>(), &MarshalOptions::default())
                    .unwrap();
                results.lock().unwrap().push(codec);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let results = results.lock().unwrap();
    assert_eq!(results.len(), THREADS);
    assert!(results.iter().all(|codec| same_codec(codec, &results[0])));
    assert_eq!(cache.len(), 1);
    assert!(factory.builds.load(Ordering::SeqCst) >= 1);
}

#[test]
fn UnmarshalerCache___repeated_lookup___returns_same_codec() {
    let cache = UnmarshalerCache::new(Arc::new(BuiltinUnmarshalerFactory));
    let opts = UnmarshalOptions::default();
    let desc = TypeDescriptor::of::<Option<bool>>();

    let first = cache.unmarshaler(&desc, &opts).unwrap();
    let second = cache.unmarshaler(&desc, &opts).unwrap();

    assert!(same_codec(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn ValuesUnmarshalerCache___unhandled_type___caches_failure() {
    let cache = ValuesUnmarshalerCache::new(Arc::new(crate::BuiltinValuesUnmarshalerFactory));
    let opts = UnmarshalOptions::default();

    let result = cache.values_unmarshaler(&TypeDescriptor::of::<i32>(), &opts);

    assert_eq!(result.err().unwrap().kind(), ErrorKind::UnhandledType);
    assert_eq!(cache.len(), 1);
}
