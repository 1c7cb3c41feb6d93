//! End-to-end pipeline tests.

use std::io::Write;

use tempfile::NamedTempFile;

use adlens::{
    AdlensError, AnalysisOutcome, Analyst, InputFormat, IssueSeverity, MockBackend, Report,
    Severity,
};

const HEADER: &str = "campaign_name,impressions,clicks,ctr,conversions,cost,cpa,channel";

fn csv(body: &str) -> Vec<u8> {
    format!("{HEADER}\n{body}").into_bytes()
}

fn expect_report(outcome: AnalysisOutcome) -> Box<Report> {
    match outcome {
        AnalysisOutcome::Report(report) => report,
        AnalysisOutcome::Rejected(result) => {
            panic!("unexpected rejection: {:#?}", result.issues)
        }
    }
}

// =============================================================================
// Happy Path
// =============================================================================

#[test]
fn test_single_row_report() {
    let data = csv("\"A\",1000,50,5.0,2,100.0,50.0,\"Google Ads\"\n");
    let report = expect_report(Analyst::new().analyze_bytes(&data).unwrap());

    let metrics = &report.metrics_summary;
    assert_eq!(metrics.total_campaigns, 1);
    assert_eq!(metrics.total_spend, 100.0);
    assert_eq!(metrics.total_conversions, 2);
    assert_eq!(metrics.by_channel.len(), 1);
    assert_eq!(metrics.by_channel[0].channel, "Google Ads");
    assert_eq!(metrics.by_channel[0].avg_cpa, 50.0);

    assert!(!report.executive_summary.is_empty());
    assert!(!report.recommendations.is_empty());
}

#[test]
fn test_analyze_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&csv("A,1000,50,5.0,2,100.0,50.0,Google Ads\n"))
        .unwrap();

    let outcome = Analyst::new().analyze_file(file.path()).unwrap();
    assert!(matches!(outcome, AnalysisOutcome::Report(_)));
}

#[test]
fn test_report_serializes_to_json() {
    let data = csv("A,1000,50,5.0,2,100.0,50.0,Google Ads\n");
    let report = expect_report(Analyst::new().analyze_bytes(&data).unwrap());

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["executive_summary"].is_string());
    assert!(json["metrics_summary"]["by_channel"].is_array());
    assert!(json["generated_at"].is_string());
}

// =============================================================================
// Rejections and Parse Errors
// =============================================================================

#[test]
fn test_clicks_exceeding_impressions_rejected_with_row() {
    let data = csv("A,10,50,5.0,2,100.0,50.0,Google Ads\n");
    let outcome = Analyst::new().analyze_bytes(&data).unwrap();

    let AnalysisOutcome::Rejected(result) = outcome else {
        panic!("expected rejection");
    };
    assert!(!result.is_valid);

    let errors: Vec<_> = result.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "clicks");
    assert_eq!(errors[0].row, Some(2));
}

#[test]
fn test_zero_rows_rejected_before_metrics() {
    let outcome = Analyst::new().analyze_bytes(&csv("")).unwrap();

    let AnalysisOutcome::Rejected(result) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(result.rows_processed, 0);
    assert!(result.errors().any(|i| i.field == "rows"));
}

#[test]
fn test_inconsistent_columns_is_parse_error() {
    let data = b"campaign_name,impressions,clicks\nA,1000\n";
    assert!(matches!(
        Analyst::new().analyze_bytes(data),
        Err(AdlensError::Csv(_))
    ));
}

#[test]
fn test_empty_input_is_parse_error() {
    assert!(matches!(
        Analyst::new().analyze_bytes(b""),
        Err(AdlensError::EmptyData(_))
    ));
}

#[test]
fn test_warnings_do_not_block_analysis() {
    let mut body = String::new();
    for i in 0..7 {
        body.push_str(&format!("C{i},5000,100,2.0,5,100.0,20.0,Google Ads\n"));
    }
    body.push_str("Spike,5000,100,2.0,5,100.0,900.0,Google Ads\n");

    let outcome = Analyst::new().analyze_bytes(&csv(&body)).unwrap();
    assert!(matches!(outcome, AnalysisOutcome::Report(_)));
}

#[test]
fn test_rejection_lists_warnings_alongside_errors() {
    let mut body = String::new();
    for i in 0..7 {
        body.push_str(&format!("C{i},5000,100,2.0,5,100.0,20.0,Google Ads\n"));
    }
    // One row with an outlier CPA and a cross-field error.
    body.push_str("Broken,10,100,2.0,5,100.0,900.0,Google Ads\n");

    let outcome = Analyst::new().analyze_bytes(&csv(&body)).unwrap();
    let AnalysisOutcome::Rejected(result) = outcome else {
        panic!("expected rejection");
    };

    assert!(result.errors().any(|i| i.field == "clicks"));
    assert!(
        result
            .warnings()
            .any(|i| i.severity == IssueSeverity::Warning && i.field == "cpa")
    );
}

// =============================================================================
// Fallback Insights
// =============================================================================

#[test]
fn test_meta_channel_high_cpa_scenario() {
    // Two "Meta" campaigns at three times the overall average CPA across
    // ten rows: the fallback produces exactly one high-severity issue
    // naming them, plus a matching recommendation.
    let mut body = String::new();
    for i in 0..8 {
        body.push_str(&format!("G{i},5000,100,2.0,5,100.0,10.0,Google Ads\n"));
    }
    body.push_str("Meta One,5000,100,2.0,5,300.0,60.0,Meta\n");
    body.push_str("Meta Two,5000,100,2.0,5,300.0,60.0,Meta\n");

    let report = expect_report(Analyst::new().analyze_bytes(&csv(&body)).unwrap());

    let high_issues: Vec<_> = report
        .key_issues
        .iter()
        .filter(|i| i.severity == Severity::High)
        .collect();
    assert_eq!(high_issues.len(), 1);
    assert_eq!(
        high_issues[0].affected_campaigns,
        vec!["Meta One", "Meta Two"]
    );

    assert!(
        report
            .recommendations
            .iter()
            .any(|r| r.title.contains("high-CPA"))
    );
}

#[test]
fn test_fallback_idempotence() {
    let data = csv(
        "A,500,100,20.0,0,300.0,0.0,Google Ads\n\
         B,5000,100,2.0,5,100.0,20.0,Meta Ads\n",
    );

    let analyst = Analyst::new();
    let first = expect_report(analyst.analyze_bytes(&data).unwrap());
    let mut second = expect_report(analyst.analyze_bytes(&data).unwrap());

    // Identical byte input, identical report — narrative sections included.
    // `generated_at` is the report's only wall-clock field.
    second.generated_at = first.generated_at;
    assert_eq!(first, second);
}

#[test]
fn test_always_failing_backend_never_propagates() {
    let data = csv("A,1000,50,5.0,2,100.0,50.0,Google Ads\n");
    let analyst = Analyst::new().with_backend(MockBackend::failing("unreachable"));

    let report = expect_report(analyst.analyze_bytes(&data).unwrap());
    assert!(!report.executive_summary.is_empty());
    assert!(!report.recommendations.is_empty());
}

#[test]
fn test_backend_narrative_used_when_valid() {
    let response = r#"{
        "executive_summary": "One campaign, performing adequately.",
        "key_issues": [],
        "recommendations": [
            {
                "title": "Scale up",
                "description": "Increase the budget gradually.",
                "rationale": "CPA is stable.",
                "priority": "medium",
                "expected_outcome": "More conversions at similar CPA."
            }
        ],
        "risk_alerts": []
    }"#;
    let data = csv("A,1000,50,5.0,2,100.0,50.0,Google Ads\n");
    let analyst = Analyst::new().with_backend(MockBackend::with_response(response));

    let report = expect_report(analyst.analyze_bytes(&data).unwrap());
    assert_eq!(
        report.executive_summary,
        "One campaign, performing adequately."
    );
    assert_eq!(report.recommendations[0].title, "Scale up");
}

// =============================================================================
// Meta Ads Format
// =============================================================================

#[test]
fn test_meta_ads_export_end_to_end() {
    let data = "Nome da campanha,Impressões,Valor usado (EUR),Resultados,CPC (custo por clique no link)\n\
                Campanha Inverno,20000,400.0,16,2.0\n\
                Campanha Verão,15000,300.0,10,3.0\n";

    let analyst = Analyst::new();
    let table = adlens::Loader::new().parse_bytes(data.as_bytes()).unwrap();
    assert_eq!(table.format, InputFormat::MetaAds);

    let report = expect_report(analyst.analyze_bytes(data.as_bytes()).unwrap());
    assert_eq!(report.metrics_summary.total_campaigns, 2);
    assert_eq!(report.metrics_summary.by_channel.len(), 1);
    assert_eq!(report.metrics_summary.by_channel[0].channel, "Meta Ads");
}
