//! Codec resolution and round-trip benchmarks
//!
//! Measures the cost the codec cache saves: building a record codec from
//! scratch versus fetching it from a warm cache, plus full encode and decode
//! of a typical search request.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use qskit::{
    BuiltinValuesMarshalerFactory, MarshalOptions, QsMarshaler, QsUnmarshaler, Reflect,
    TypeDescriptor, ValuesMarshalerFactory,
};

#[derive(Debug, Default, Reflect)]
struct SearchRequest {
    #[qs(tag = "q")]
    query: String,
    page: u32,
    page_size: u32,
    #[qs(tag = "category,omitempty")]
    categories: Vec<String>,
    sort: Option<String>,
    #[qs(flatten)]
    filters: Filters,
}

#[derive(Debug, Default, Reflect)]
struct Filters {
    min_price: Option<f64>,
    max_price: Option<f64>,
    in_stock: bool,
}

fn sample() -> SearchRequest {
    SearchRequest {
        query: "mechanical keyboard".into(),
        page: 3,
        page_size: 50,
        categories: vec!["electronics".into(), "peripherals".into()],
        sort: Some("price".into()),
        filters: Filters {
            min_price: Some(25.0),
            max_price: None,
            in_stock: true,
        },
    }
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let desc = TypeDescriptor::of::<SearchRequest>();

    group.bench_function("uncached", |b| {
        let opts = MarshalOptions::default();
        b.iter(|| {
            BuiltinValuesMarshalerFactory
                .values_marshaler(black_box(&desc), &opts)
                .map(|_| ())
        })
    });

    group.bench_function("cached", |b| {
        let marshaler = QsMarshaler::default();
        b.iter(|| marshaler.check_marshal::<SearchRequest>())
    });

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    let marshaler = QsMarshaler::default();
    let unmarshaler = QsUnmarshaler::default();
    let value = sample();
    let text = marshaler.marshal(&value).unwrap_or_default();

    group.bench_function("marshal", |b| b.iter(|| marshaler.marshal(black_box(&value))));

    group.bench_function("unmarshal", |b| {
        b.iter(|| {
            let mut decoded = SearchRequest::default();
            unmarshaler
                .unmarshal(&mut decoded, black_box(&text))
                .map(|()| decoded)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_resolution, bench_roundtrip);
criterion_main!(benches);
