//! Benchmarks for the inference engine.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use stride_tools::reports::{create_reporter, ReportConfig, ReportFormat};
use stride_tools::{analyze, AnalysisInput, DataFlow, DiagramRef, TrustBoundary};

fn generate_input(flows: usize) -> AnalysisInput {
    let mut input = AnalysisInput::new(
        "Public facing web application with login and an API, storing PII in a cloud database",
    )
    .with_diagram(DiagramRef::new("dfd.png"));
    for i in 0..flows {
        let source = if i % 3 == 0 { format!("User {i}") } else { format!("Service {i}") };
        let destination = if i % 2 == 0 { format!("API Server {i}") } else { format!("Queue {i}") };
        let data_type = if i % 4 == 0 { "PII" } else { "events" };
        input = input.with_flow(DataFlow::new(source, destination, data_type));
    }
    for i in 0..flows / 10 {
        input = input.with_boundary(TrustBoundary::new(format!("DMZ {i}"), "user api server"));
    }
    input
}

fn benchmark_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    for flows in [10, 100, 1_000, 10_000] {
        let input = generate_input(flows);
        group.bench_with_input(BenchmarkId::from_parameter(flows), &input, |b, input| {
            b.iter(|| analyze(black_box(input)));
        });
    }
    group.finish();
}

fn benchmark_reports(c: &mut Criterion) {
    let input = generate_input(1_000);
    let model = analyze(&input);
    let config = ReportConfig::default();

    let mut group = c.benchmark_group("report");
    for format in [ReportFormat::Json, ReportFormat::Sarif, ReportFormat::Markdown, ReportFormat::Csv] {
        let reporter = create_reporter(format);
        group.bench_function(format.to_string(), |b| {
            b.iter(|| reporter.generate(black_box(&input), black_box(&model), &config));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_analyze, benchmark_reports);
criterion_main!(benches);
