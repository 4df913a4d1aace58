//! End-to-end scenarios for the allotment service.
//!
//! Live data is supplied by in-process sources so the scenarios are
//! deterministic.

use sme_allotment::{
    Advisory, AllotmentRequest, AllotmentService, ConfidenceBand, HistoricalLedger,
    HistoricalObservation, SourceError, SubscriptionOrigin, SubscriptionRecord,
    SubscriptionSource,
};
use sme_common::config::{Config, EstimationMode};

// ============================================================================
// Test Sources
// ============================================================================

/// Source returning a fixed live table.
struct StaticSource(Vec<SubscriptionRecord>);

impl SubscriptionSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn try_fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError> {
        Ok(self.0.clone())
    }
}

/// Source whose report page is always down.
struct DownSource;

impl SubscriptionSource for DownSource {
    fn name(&self) -> &'static str {
        "down"
    }

    fn try_fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError> {
        Err(SourceError::Network("connection refused".into()))
    }
}

fn live_table() -> Vec<SubscriptionRecord> {
    vec![
        SubscriptionRecord::new("Acme Fabrics SME", 245.5).unwrap(),
        SubscriptionRecord::new("Bolt Logistics", 12.0).unwrap(),
    ]
}

fn service_with(source: impl SubscriptionSource + 'static) -> AllotmentService {
    AllotmentService::with_source(Config::default(), Box::new(source)).unwrap()
}

fn request(capital_budget: u64) -> AllotmentRequest {
    AllotmentRequest {
        capital_budget,
        ..AllotmentRequest::default()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_source_down_falls_back_to_default_multiple() {
    let service = service_with(DownSource);
    let report = service.predict(&request(500_000));

    assert_eq!(report.subscription, 100.0);
    assert_eq!(report.subscription_origin, SubscriptionOrigin::Default);
    assert!(report.live_subscriptions.is_empty());
    assert!(report.advisories.contains(&Advisory::LiveDataUnavailable {
        default_subscription: 100.0
    }));

    let first = &report.rows[0];
    assert_eq!(first.lots, 2);
    assert!((first.allotment_probability - 0.002).abs() < 1e-12);
    assert_eq!(first.confidence_band, ConfidenceBand::Low);
    assert_eq!(report.rows.len(), 5);
}

#[test]
fn test_low_subscription_clamps_to_certainty() {
    let service = service_with(DownSource);
    let report = service.predict(&AllotmentRequest {
        capital_budget: 160_000,
        subscription_override: Some(0.1),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.subscription_origin, SubscriptionOrigin::Override);
    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.allotment_probability, 1.0);
    assert_eq!(row.confidence_band, ConfidenceBand::High);
    assert_eq!(row.expected_shares, 200.0);
    assert_eq!(row.cost_per_expected_share, Some(800.0));
}

#[test]
fn test_empirical_mode_uses_observed_ratio() {
    let service = service_with(DownSource);
    let report = service.predict(&AllotmentRequest {
        capital_budget: 800_000,
        selected_ipo: "Delta Autocorp".into(),
        mode: Some(EstimationMode::Empirical),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.mode, EstimationMode::Empirical);
    assert_eq!(report.grey_market_premium, Some(45));

    let by_lots = |lots: u32| {
        report
            .rows
            .iter()
            .find(|r| r.lots == lots)
            .map(|r| r.allotment_probability)
            .unwrap()
    };
    assert_eq!(by_lots(2), 1.0 / 43.0);
    assert_eq!(by_lots(10), 1.0 / 6.0);
    assert!((by_lots(3) - 1.0 / 30.0).abs() < 1e-12);
    assert!(!report
        .advisories
        .iter()
        .any(|a| matches!(a, Advisory::NoHistoricalData { .. })));
}

#[test]
fn test_override_with_source_down_does_not_claim_default() {
    let service = service_with(DownSource);
    let report = service.predict(&AllotmentRequest {
        capital_budget: 500_000,
        subscription_override: Some(50.0),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.subscription, 50.0);
    assert_eq!(report.subscription_origin, SubscriptionOrigin::Override);
    assert!(!report
        .advisories
        .iter()
        .any(|a| matches!(a, Advisory::LiveDataUnavailable { .. })));
    // 1 / (50 * 2.5 * 2)
    assert!((report.rows[0].allotment_probability - 0.004).abs() < 1e-12);
}

#[test]
fn test_live_spelling_matches_ledger_ignoring_case() {
    let live = vec![SubscriptionRecord::new("DELTA AUTOCORP", 240.0).unwrap()];
    let service = service_with(StaticSource(live));
    let report = service.predict(&AllotmentRequest {
        capital_budget: 160_000,
        selected_ipo: "Delta Autocorp".into(),
        mode: Some(EstimationMode::Empirical),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.ipo_name, "DELTA AUTOCORP");
    assert_eq!(report.rows[0].allotment_probability, 1.0 / 43.0);
    assert_eq!(report.grey_market_premium, Some(45));
    assert!(!report
        .advisories
        .iter()
        .any(|a| matches!(a, Advisory::NoHistoricalData { .. })));
}

#[test]
fn test_empirical_mode_ignores_negative_override() {
    let service = service_with(DownSource);
    let report = service.predict(&AllotmentRequest {
        capital_budget: 160_000,
        selected_ipo: "Delta Autocorp".into(),
        subscription_override: Some(-5.0),
        mode: Some(EstimationMode::Empirical),
    });

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].allotment_probability, 1.0 / 43.0);
    assert!(!report
        .advisories
        .iter()
        .any(|a| matches!(a, Advisory::InvalidSubscription { .. })));
}

#[test]
fn test_empirical_mode_without_history_advises() {
    let service = service_with(StaticSource(live_table()));
    let report = service.predict(&AllotmentRequest {
        capital_budget: 500_000,
        mode: Some(EstimationMode::Empirical),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.ipo_name, "Acme Fabrics SME");
    assert!(report.advisories.contains(&Advisory::NoHistoricalData {
        ipo: "Acme Fabrics SME".into()
    }));
    assert!((report.rows[0].allotment_probability - 0.05).abs() < 1e-12);
}

#[test]
fn test_budget_below_smallest_application() {
    let service = service_with(DownSource);
    let report = service.predict(&request(150_000));

    assert!(report.rows.is_empty());
    assert!(report.advisories.contains(&Advisory::NoEligibleLots {
        capital_budget: 150_000,
        minimum_capital: Some(160_000),
    }));
}

#[test]
fn test_first_live_ipo_selected_by_default() {
    let service = service_with(StaticSource(live_table()));
    let report = service.predict(&request(500_000));

    assert_eq!(report.ipo_name, "Acme Fabrics SME");
    assert_eq!(report.subscription, 245.5);
    assert_eq!(report.subscription_origin, SubscriptionOrigin::Live);
    assert_eq!(report.live_subscriptions.len(), 2);
    assert!(report.advisories.is_empty());
}

#[test]
fn test_selected_live_ipo_is_case_insensitive() {
    let service = service_with(StaticSource(live_table()));
    let report = service.predict(&AllotmentRequest {
        capital_budget: 500_000,
        selected_ipo: "bolt logistics".into(),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.ipo_name, "Bolt Logistics");
    assert_eq!(report.subscription, 12.0);
    // 1 / (12 * 2.5 * 2)
    assert!((report.rows[0].allotment_probability - 1.0 / 60.0).abs() < 1e-12);
}

#[test]
fn test_selected_ipo_missing_from_live_report() {
    let service = service_with(StaticSource(live_table()));
    let report = service.predict(&AllotmentRequest {
        capital_budget: 500_000,
        selected_ipo: "Zeta Metals".into(),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.ipo_name, "Zeta Metals");
    assert_eq!(report.subscription_origin, SubscriptionOrigin::Default);
    assert!(report.advisories.contains(&Advisory::SelectedIpoNotLive {
        ipo: "Zeta Metals".into()
    }));
}

#[test]
fn test_negative_override_yields_no_rows() {
    let service = service_with(StaticSource(live_table()));
    let report = service.predict(&AllotmentRequest {
        capital_budget: 500_000,
        subscription_override: Some(-5.0),
        ..AllotmentRequest::default()
    });

    assert!(report.rows.is_empty());
    assert!(report
        .advisories
        .contains(&Advisory::InvalidSubscription { value: -5.0 }));
}

#[test]
fn test_report_lists_ledger_ipos() {
    let service = service_with(DownSource);
    let report = service.predict(&request(500_000));
    assert_eq!(
        report.ledger_ipos,
        vec!["Delta Autocorp", "Rikhav Securities", "CapitalNumbers"]
    );
}

#[test]
fn test_custom_ledger() {
    let ledger = HistoricalLedger::new(vec![
        HistoricalObservation::new("Acme Fabrics SME", 2, 4).unwrap(),
    ])
    .with_premiums(vec![("Acme Fabrics SME".to_string(), 12)]);
    let service = service_with(StaticSource(live_table())).with_ledger(ledger);

    let report = service.predict(&AllotmentRequest {
        capital_budget: 160_000,
        mode: Some(EstimationMode::Empirical),
        ..AllotmentRequest::default()
    });

    assert_eq!(report.ledger_ipos, vec!["Acme Fabrics SME"]);
    assert_eq!(report.grey_market_premium, Some(12));
    assert_eq!(report.rows[0].allotment_probability, 0.25);
    assert_eq!(report.rows[0].confidence_band, ConfidenceBand::Medium);
}

#[test]
fn test_rows_respect_budget_and_order() {
    let service = service_with(StaticSource(live_table()));
    for budget in [0, 159_999, 160_000, 1_000_000, 1_999_999, 2_000_000, u64::MAX] {
        let report = service.predict(&request(budget));
        assert!(report.rows.iter().all(|r| r.capital_required <= budget));
        assert!(report.rows.windows(2).all(|w| w[0].lots < w[1].lots));
        assert!(report.rows.len() <= 24);
    }
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = Config::default();
    config.planner.lot_price = 0;
    let err = AllotmentService::with_source(config, Box::new(DownSource))
        .err()
        .unwrap();
    assert!(err.is_config());
}

#[test]
fn test_report_serializes_undefined_cost_as_null() {
    let service = service_with(DownSource);
    let report = service.predict(&AllotmentRequest {
        capital_budget: 160_000,
        subscription_override: Some(1e305),
        ..AllotmentRequest::default()
    });

    // A vanishingly small probability still classifies as Low, but the cost
    // per expected share overflows and is reported as undefined.
    let row = &report.rows[0];
    assert!(row.allotment_probability > 0.0);
    assert_eq!(row.confidence_band, ConfidenceBand::Low);
    assert_eq!(row.cost_per_expected_share, None);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["rows"][0]["cost_per_expected_share"], serde_json::Value::Null);
    assert_eq!(json["subscription_origin"], "override");
}
