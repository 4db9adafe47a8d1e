use market_radar_core::{
    config::DisplayUnits,
    deep_dive::build_deep_dive,
    filter::{EntityKey, FilterCriteria},
    metrics::{build_metrics, Axis, MetricReport, FLAT_AXIS_VALUE},
    period::{period_key, PeriodFields},
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
        age_sales: [1.0; 6],
        time_slot_sales: [1.0; 6],
        day_sales: [1.0; 7],
        closure_rate: 0.0,
        store_count: 0.0,
    }
}

fn sale(region: &str, period: u32, sales: f64, weekend: f64) -> RawRecord {
    RawRecord { total_sales: sales, weekend_sales: weekend, ..record(region, period) }
}

fn closure(region: &str, period: u32, rate: f64, stores: f64) -> RawRecord {
    RawRecord { closure_rate: rate, store_count: stores, ..record(region, period) }
}

fn run(sales: &[RawRecord], closures: &[RawRecord], criteria: &FilterCriteria) -> MetricReport {
    let key = EntityKey::Region;
    let dd = build_deep_dive(sales, &key);
    build_metrics(sales, closures, criteria, &key, &dd, &DisplayUnits::default())
}

const EOK: f64 = 100_000_000.0;

fn population() -> (Vec<RawRecord>, Vec<RawRecord>) {
    let sales = vec![
        // Older period: ignored by the latest-period metrics.
        sale("강남구", 20233, 50.0 * EOK, 0.0),
        sale("강남구", 20234, 8.0 * EOK, 2.0 * EOK),
        sale("강남구", 20234, 2.0 * EOK, 1.0 * EOK),
        sale("마포구", 20234, 4.0 * EOK, 2.0 * EOK),
        sale("종로구", 20234, 1.0 * EOK, 0.1 * EOK),
    ];
    let closures = vec![
        closure("강남구", 20234, 4.0, 100.0),
        closure("강남구", 20234, 2.0, 100.0),
        closure("마포구", 20234, 5.0, 50.0),
        closure("종로구", 20234, 1.0, 10.0),
        // No sales entity: ignored.
        closure("중구", 20234, 9.0, 999.0),
    ];
    (sales, closures)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn raw_metrics_use_latest_period_only() {
    let (sales, closures) = population();
    let report = run(&sales, &closures, &FilterCriteria::all());

    assert_eq!(report.latest_sales_period, 20234);
    let gangnam = report.districts.iter().find(|d| d.id == "강남구").unwrap();
    assert_eq!(gangnam.raw.sales, 10.0 * EOK);
    assert_eq!(gangnam.record_count, 2);
    assert_eq!(gangnam.raw.survival, 97.0);
    assert_eq!(gangnam.raw.saturation, 200.0);
    assert_eq!(gangnam.raw.efficiency, 10.0 * EOK / 200.0);
    assert!((gangnam.raw.weekend_share - 30.0).abs() < 1e-9);
    assert!(report.districts.iter().all(|d| d.id != "중구"));
}

#[test]
fn grouping_conserves_latest_period_sales() {
    let (mut sales, closures) = population();
    // Rows without an entity id are not counted anywhere.
    sales.push(RawRecord { region: None, ..sale("", 20234, 7.0 * EOK, 0.0) });
    let report = run(&sales, &closures, &FilterCriteria::all());

    let counted: f64 = sales
        .iter()
        .filter(|r| period_key(r) == report.latest_sales_period && r.region.is_some())
        .map(|r| r.total_sales)
        .sum();
    let grouped: f64 = report.districts.iter().map(|d| d.raw.sales).sum();
    assert!((grouped - counted).abs() < 1e-6);
    assert_eq!(grouped, 15.0 * EOK);

    let rows: u32 = report.districts.iter().map(|d| d.record_count).sum();
    assert_eq!(rows, 4);
}

#[test]
fn normalized_values_span_0_to_100() {
    let (sales, closures) = population();
    let report = run(&sales, &closures, &FilterCriteria::all());

    for axis in Axis::ALL {
        let values: Vec<f64> = report.districts.iter().map(|d| d.stat(axis).value).collect();
        assert!(values.iter().all(|v| (0.0..=100.0).contains(v)), "{axis:?}: {values:?}");
        assert!(values.contains(&0.0), "{axis:?} min should scale to 0");
        assert!(values.contains(&100.0), "{axis:?} max should scale to 100");
    }
}

#[test]
fn baseline_lies_within_entity_range() {
    let (sales, closures) = population();
    let report = run(&sales, &closures, &FilterCriteria::all());

    for axis in Axis::ALL {
        let values = report.districts.iter().map(|d| d.stat(axis).value);
        let lo = values.clone().fold(f64::INFINITY, f64::min);
        let hi = values.fold(f64::NEG_INFINITY, f64::max);
        let avg = report.baseline.stat(axis).value;
        assert!(lo <= avg && avg <= hi, "{axis:?}: {avg} outside [{lo}, {hi}]");
    }
    assert!(report.baseline.deep_dive.is_none());
    assert!((report.baseline.raw.sales - 5.0 * EOK).abs() < 1e-3);
}

#[test]
fn single_entity_scores_50_everywhere() {
    let sales = vec![sale("강남구", 20234, 3.0 * EOK, 1.0 * EOK)];
    let report = run(&sales, &[], &FilterCriteria::all());

    assert_eq!(report.districts.len(), 1);
    for axis in Axis::ALL {
        assert_eq!(report.districts[0].stat(axis).value, FLAT_AXIS_VALUE);
        assert_eq!(report.baseline.stat(axis).value, FLAT_AXIS_VALUE);
    }
}

#[test]
fn min_revenue_excludes_entities_from_list_and_extents() {
    let (sales, closures) = population();
    let criteria = FilterCriteria::all().with_min_revenue_units(5.0, &DisplayUnits::default());
    assert_eq!(criteria.min_revenue, 500_000_000.0);

    let report = run(&sales, &closures, &criteria);
    let ids: Vec<&str> = report.districts.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["강남구"]);
    // Only survivors define the extent, so the lone survivor sits at 50.
    assert_eq!(report.districts[0].stat(Axis::Sales).value, FLAT_AXIS_VALUE);
}

#[test]
fn threshold_is_inclusive() {
    let (sales, closures) = population();
    let criteria = FilterCriteria { min_revenue: 4.0 * EOK, ..FilterCriteria::all() };
    let report = run(&sales, &closures, &criteria);
    assert_eq!(report.districts.len(), 2);
}

#[test]
fn sales_and_closures_use_their_own_latest_period() {
    let sales = vec![
        sale("A", 20241, 10.0, 1.0),
        sale("B", 20241, 20.0, 1.0),
    ];
    let closures = vec![
        closure("A", 20234, 10.0, 5.0),
        closure("B", 20234, 20.0, 5.0),
        closure("B", 20231, 90.0, 5.0),
    ];
    let report = run(&sales, &closures, &FilterCriteria::all());
    assert_eq!(report.latest_closure_period, 20234);
    assert_eq!(report.districts[0].raw.survival, 90.0);
    assert_eq!(report.districts[1].raw.survival, 80.0);
}

#[test]
fn empty_input_gives_empty_report() {
    let report = run(&[], &[], &FilterCriteria::all());
    assert!(report.districts.is_empty());
    assert_eq!(report.latest_sales_period, 0);
    assert!(Axis::ALL.iter().all(|a| report.baseline.stat(*a).value == 0.0));
}

#[test]
fn districts_carry_their_deep_dive() {
    let (sales, closures) = population();
    let report = run(&sales, &closures, &FilterCriteria::all());
    for d in &report.districts {
        assert!((d.deep_dive.day.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }
}
