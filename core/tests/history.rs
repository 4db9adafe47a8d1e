use market_radar_core::{
    filter::EntityKey,
    history::build_history,
    period::PeriodFields,
    record::RawRecord,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn record(region: &str, period: u32) -> RawRecord {
    RawRecord {
        region: Some(region.into()),
        neighborhood: None,
        industry: None,
        period: PeriodFields { combined: Some(period), year: None, quarter: None },
        total_sales: 0.0,
        weekend_sales: 0.0,
        age_sales: [0.0; 6],
        time_slot_sales: [0.0; 6],
        day_sales: [0.0; 7],
        closure_rate: 0.0,
        store_count: 0.0,
    }
}

fn sale(region: &str, period: u32, sales: f64, weekend: f64) -> RawRecord {
    RawRecord { total_sales: sales, weekend_sales: weekend, ..record(region, period) }
}

fn closure(region: &str, period: u32, rate: f64) -> RawRecord {
    RawRecord { closure_rate: rate, store_count: 10.0, ..record(region, period) }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn sales_rows_of_one_period_accumulate() {
    let sales = vec![
        sale("Gangnam-gu", 20231, 100.0, 10.0),
        sale("Gangnam-gu", 20231, 200.0, 20.0),
    ];
    let history = build_history(&sales, &[], &EntityKey::Region);

    let points = &history["Gangnam-gu"];
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].period, 20231);
    assert_eq!(points[0].sales, 300.0);
    assert_eq!(points[0].weekend_sales, 30.0);
    assert_eq!(points[0].record_count, 2);
    assert_eq!(points[0].survival, None);
}

#[test]
fn closure_without_matching_sales_period_is_dropped() {
    let sales = vec![sale("Gangnam-gu", 20231, 100.0, 10.0)];
    let closures = vec![
        closure("Gangnam-gu", 20232, 4.0),
        closure("Mapo-gu", 20231, 2.0),
    ];
    let history = build_history(&sales, &closures, &EntityKey::Region);

    assert_eq!(history.len(), 1, "closure rows must not create entities");
    let points = &history["Gangnam-gu"];
    assert_eq!(points.len(), 1, "closure rows must not create periods");
    assert_eq!(points[0].survival, None);
}

#[test]
fn matching_closure_attaches_survival() {
    let sales = vec![sale("Gangnam-gu", 20231, 100.0, 10.0)];
    let closures = vec![closure("Gangnam-gu", 20231, 3.5)];
    let history = build_history(&sales, &closures, &EntityKey::Region);

    let p = &history["Gangnam-gu"][0];
    assert_eq!(p.closure_rate, Some(3.5));
    assert_eq!(p.survival, Some(96.5));
}

#[test]
fn points_are_ascending_without_duplicates() {
    let sales = vec![
        sale("Mapo-gu", 20241, 1.0, 0.0),
        sale("Mapo-gu", 20231, 1.0, 0.0),
        sale("Mapo-gu", 20234, 1.0, 0.0),
        sale("Mapo-gu", 20231, 1.0, 0.0),
    ];
    let history = build_history(&sales, &[], &EntityKey::Region);
    let periods: Vec<u32> = history["Mapo-gu"].iter().map(|p| p.period).collect();
    assert_eq!(periods, vec![20231, 20234, 20241]);
}

#[test]
fn grouping_conserves_sales_totals() {
    let sales = vec![
        sale("A", 20231, 10.0, 1.0),
        sale("B", 20231, 20.0, 2.0),
        sale("A", 20232, 30.0, 3.0),
        sale("C", 20233, 40.0, 4.0),
    ];
    let history = build_history(&sales, &[], &EntityKey::Region);
    let grouped: f64 = history.values().flatten().map(|p| p.sales).sum();
    let raw: f64 = sales.iter().map(|r| r.total_sales).sum();
    assert_eq!(grouped, raw);
}

#[test]
fn records_without_entity_id_are_skipped() {
    let mut orphan = sale("A", 20231, 10.0, 1.0);
    orphan.region = None;
    let history = build_history(&[orphan], &[], &EntityKey::Region);
    assert!(history.is_empty());
}
