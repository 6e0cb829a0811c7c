use analyze_config::AnalyzeConfig;
use analyze_core::FunctionRegistry;
use analyze_report::exporters::PrometheusExporter;
use analyze_report::{parse_records, RecordAnalyzer, Report};
use analyze_targets::{FakePrometheus, FakeSeries};
use std::sync::Arc;

async fn analyzer_for(fake: &FakePrometheus) -> RecordAnalyzer {
    let addr = fake.spawn("127.0.0.1:0").await.unwrap();
    let mut config = AnalyzeConfig::default();
    config.prometheus.address = format!("http://{}", addr);
    RecordAnalyzer::from_config(&config, Arc::new(FunctionRegistry::with_builtins())).unwrap()
}

#[tokio::test]
async fn test_records_are_analyzed_against_backend() {
    let fake = FakePrometheus::new(vec![
        FakeSeries::new(&[1.0, 2.0, 3.0]),
        FakeSeries::new(&[3.0, 4.0, 5.0]),
    ]);
    let analyzer = analyzer_for(&fake).await;

    let mut records = parse_records(
        r#"{"workload":"tpcc","start_ts":"1630381080","end_ts":"1630386080"}
{"workload":"ycsb","end_ts":"1630390000"}"#,
    )
    .unwrap();
    analyzer.analyze_all(&mut records).await.unwrap();

    for record in &records {
        assert_eq!(record.metrics.len(), 3);
        let mean = record.index("tikv_cpu", "mean").unwrap();
        assert_eq!(mean.data, vec![2.0, 3.0, 4.0]);
        assert_eq!(mean.mean, 3.0);
        let std = record.index("tikv_read", "std").unwrap();
        assert!(std.data.iter().all(|v| (*v - std::f64::consts::SQRT_2).abs() < 1e-12));
    }

    // Three metrics times two operators per record.
    let requests = fake.requests().await;
    assert_eq!(requests.len(), 12);
    assert!(requests.iter().any(|r| r.start == "1630381080"));
    assert!(requests.iter().any(|r| r.start == "1630389880"));

    let text = PrometheusExporter::format(&Report::new(records));
    assert!(text.contains("analyze_tikv_cpu_mean_max{workload=\"ycsb\"} 4\n"));
}

#[tokio::test]
async fn test_backend_failure_names_metric() {
    let fake = FakePrometheus::new(vec![FakeSeries::raw(&["1", "oops"])]);
    let addr = fake.spawn("127.0.0.1:0").await.unwrap();

    let mut config = AnalyzeConfig::default();
    config.prometheus.address = format!("http://{}", addr);
    config.prometheus.sample_policy = analyze_core::SamplePolicy::Strict;
    let analyzer =
        RecordAnalyzer::from_config(&config, Arc::new(FunctionRegistry::with_builtins())).unwrap();

    let mut record = analyze_report::Record::new("tpcc", "", "1630386080");
    let err = analyzer.analyze(&mut record).await.unwrap_err();

    assert!(err.to_string().contains("tikv_cpu"));
}
