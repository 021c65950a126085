use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridstate::pipeline::run;
use gridstate::*;
use serde_json::json;

const AGENTS: [&str; 5] = ["Ava Realtors", "BlueBrick Realty", "Joseph Estates", "LuxeSpaces", "Metro Realty"];
const STATUSES: [&str; 3] = ["Completed", "Pending", "Failed"];

fn schema() -> Schema {
    Schema::new(vec![
        ColumnDef::new("propertyName", ValueKind::Text),
        ColumnDef::new("agentName", ValueKind::Text),
        ColumnDef::new("date", ValueKind::Date),
        ColumnDef::new("amount", ValueKind::Number),
        ColumnDef::new("status", ValueKind::Text),
    ])
}

fn generate(size: usize) -> RecordSet {
    let rows: Vec<_> = (0..size)
        .map(|i| {
            json!({
                "id": i,
                "propertyName": format!("Property {}", i),
                "agentName": AGENTS[i % AGENTS.len()],
                "date": format!("2024-{:02}-{:02}T09:00:00", i % 12 + 1, i % 28 + 1),
                "amount": ((i * 7919) % 20000) as f64 - 5000.0,
                "status": STATUSES[i % STATUSES.len()],
            })
        })
        .collect();
    RecordSet::from_json(&rows, &schema(), &IngestOptions::default()).unwrap()
}

fn bench_global_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("global_search");

    for size in [100, 1000, 10000].iter() {
        let records = generate(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| apply_filters(records.records(), black_box("metro"), &ColumnFilters::new()));
        });
    }
    group.finish();
}

fn bench_column_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_filters");
    let filters: ColumnFilters = vec![
        ColumnFilter::new("amount", Operator::GreaterThan, "5000"),
        ColumnFilter::new("status", Operator::Equals, "completed"),
    ]
    .into_iter()
    .collect();

    for size in [100, 1000, 10000].iter() {
        let records = generate(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| apply_filters(records.records(), "", black_box(&filters)));
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_by_date");
    let key = SortKey::descending("date");
    let schema = schema();

    for size in [100, 1000, 10000].iter() {
        let records = generate(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| apply_sort(records.records(), (0..size).collect(), Some(black_box(&key)), &schema));
        });
    }
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    let schema = schema();
    let mut state = TableState::default();
    state.apply(TableAction::SetGlobalFilter("realty".to_string()));
    state.apply(TableAction::SortBy("amount".to_string()));
    state.apply(TableAction::SetPage(2));

    for size in [100, 1000, 10000].iter() {
        let records = generate(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| run(records.records(), &schema, black_box(&state), &RecordingSink::new()));
        });
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let codec = UrlCodec::new("p", TableState::default());
    let mut state = TableState::default();
    state.apply(TableAction::SetGlobalFilter("sunset villa".to_string()));
    state.apply(TableAction::SetColumnFilter(ColumnFilter::new("amount", Operator::GreaterThan, "5000")));
    state.apply(TableAction::SortBy("date".to_string()));
    state.apply(TableAction::SelectIds((0..50).map(RecordId::synthesized).collect()));
    let query = codec.encode(&state);

    c.bench_function("codec_encode", |b| b.iter(|| codec.encode(black_box(&state))));
    c.bench_function("codec_decode", |b| b.iter(|| codec.decode(black_box(&query))));
}

criterion_group!(
    benches,
    bench_global_search,
    bench_column_filters,
    bench_sort,
    bench_full_pipeline,
    bench_codec,
);

criterion_main!(benches);
