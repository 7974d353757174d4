use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_codable::{codable, from_str, from_str_with_context, to_string, to_string_with_context};
use serde_codable::{Context, KeyStrategy, Serde};

codable! {
    #[derive(Serialize, Deserialize, Clone)]
    struct Vegetable {
        name: String,
        water_content: f64,
        harvest_count: u32,
        color: Option<String>,
    }
}

codable! {
    #[derive(Clone)]
    struct Retailer {
        id: u32,
        name: String,
        vegetables: Vec<Vegetable>,
        tags: Vec<String>,
    }
}

fn vegetables(count: u32) -> Vec<Vegetable> {
    (0..count)
        .map(|i| Vegetable {
            name: format!("Vegetable {}", i),
            water_content: 80.5 + f64::from(i % 10),
            harvest_count: i,
            color: (i % 2 == 0).then(|| "green".to_string()),
        })
        .collect()
}

fn benchmark_encode_simple(c: &mut Criterion) {
    let carrot = Vegetable {
        name: "Carrot".to_string(),
        water_content: 88.0,
        harvest_count: 12,
        color: Some("orange".to_string()),
    };

    c.bench_function("encode_simple_struct", |b| b.iter(|| to_string(black_box(&carrot))));
}

fn benchmark_decode_simple(c: &mut Criterion) {
    let json = r#"{"name":"Carrot","water_content":88.0,"harvest_count":12,"color":"orange"}"#;

    c.bench_function("decode_simple_struct", |b| {
        b.iter(|| from_str::<Vegetable>(black_box(json)))
    });
}

fn benchmark_encode_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_array");

    for size in [10, 50, 100, 500].iter() {
        let items = vegetables(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&items)))
        });
    }
    group.finish();
}

fn benchmark_decode_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_array");

    for size in [10, 50, 100, 500].iter() {
        let json = to_string(&vegetables(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &json, |b, json| {
            b.iter(|| from_str::<Vec<Vegetable>>(black_box(json)))
        });
    }
    group.finish();
}

fn benchmark_nested(c: &mut Criterion) {
    let retailer = Retailer {
        id: 42,
        name: "Farmer's Market".to_string(),
        vegetables: vegetables(20),
        tags: vec!["organic".to_string(), "local".to_string()],
    };
    let json = to_string(&retailer).unwrap();

    c.bench_function("encode_nested_struct", |b| b.iter(|| to_string(black_box(&retailer))));
    c.bench_function("decode_nested_struct", |b| {
        b.iter(|| from_str::<Retailer>(black_box(&json)))
    });
}

fn benchmark_key_strategy(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_strategy");
    let items = vegetables(100);
    let identity = Context::new();
    let camel = Context::new().with_key_strategy(KeyStrategy::SnakeToCamel);

    for (label, context) in [("identity", &identity), ("snake_to_camel", &camel)] {
        let json = to_string_with_context(&items, context).unwrap();
        group.bench_function(format!("encode_{}", label), |b| {
            b.iter(|| to_string_with_context(black_box(&items), context))
        });
        group.bench_function(format!("decode_{}", label), |b| {
            b.iter(|| from_str_with_context::<Vec<Vegetable>>(black_box(&json), context))
        });
    }
    group.finish();
}

fn benchmark_comparison_with_serde_json(c: &mut Criterion) {
    let items = vegetables(100);
    let json = serde_json::to_string(&items).unwrap();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("containers_encode", |b| b.iter(|| to_string(black_box(&items))));
    group.bench_function("serde_bridge_encode", |b| {
        b.iter(|| to_string(black_box(&Serde(&items))))
    });
    group.bench_function("serde_json_encode", |b| {
        b.iter(|| serde_json::to_string(black_box(&items)))
    });

    group.bench_function("containers_decode", |b| {
        b.iter(|| from_str::<Vec<Vegetable>>(black_box(&json)))
    });
    group.bench_function("serde_bridge_decode", |b| {
        b.iter(|| from_str::<Serde<Vec<Vegetable>>>(black_box(&json)))
    });
    group.bench_function("serde_json_decode", |b| {
        b.iter(|| serde_json::from_str::<Vec<Vegetable>>(black_box(&json)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_encode_simple,
    benchmark_decode_simple,
    benchmark_encode_array,
    benchmark_decode_array,
    benchmark_nested,
    benchmark_key_strategy,
    benchmark_comparison_with_serde_json
);
criterion_main!(benches);
