//! Running the pipeline twice on the same rows and criteria must produce
//! byte-identical snapshots. Any divergence means hidden state leaked
//! between runs.

use market_radar_core::{
    config::RadarConfig,
    engine::RadarEngine,
    filter::FilterCriteria,
    record::RawRow,
};

fn row(pairs: &[(&str, String)]) -> RawRow {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn dataset() -> (Vec<RawRow>, Vec<RawRow>) {
    let codes = ["11110515", "11440660", "11680640", "11680650", "11710631"];
    let mut sales = Vec::new();
    let mut closures = Vec::new();
    for (i, code) in codes.iter().enumerate() {
        for q in 1..=4 {
            let amount = ((i + 1) * 1_000 + q * 37) as f64 * 100_000.0;
            sales.push(row(&[
                ("행정동_코드", code.to_string()),
                ("행정동_코드_명", format!("동{i}")),
                ("기준_년_코드", "2023".into()),
                ("기준_분기_코드", q.to_string()),
                ("당월_매출_금액", amount.to_string()),
                ("주말_매출_금액", (amount / 3.0).to_string()),
                ("월요일_매출_금액", (amount / 7.0).to_string()),
                ("토요일_매출_금액", (amount / 5.0).to_string()),
                ("연령대_30_매출_금액", (amount / 2.0).to_string()),
                ("시간대_17~21_매출_금액", (amount / 4.0).to_string()),
            ]));
            closures.push(row(&[
                ("행정동_코드", code.to_string()),
                ("행정동_코드_명", format!("동{i}")),
                ("기준_년분기_코드", format!("2023{q}")),
                ("폐업_률", format!("{}.{}", i + 1, q)),
                ("점포_수", (10 * (i + q)).to_string()),
            ]));
        }
    }
    (sales, closures)
}

#[test]
fn same_input_produces_identical_snapshots() {
    let (sales, closures) = dataset();
    let engine = RadarEngine::new(RadarConfig::seoul(), &sales, &closures).expect("engine");

    for criteria in [
        FilterCriteria::all(),
        FilterCriteria { region: "강남구".into(), ..FilterCriteria::all() },
        FilterCriteria { min_revenue: 3_000_000_000.0, ..FilterCriteria::all() },
    ] {
        let a = engine.run(&criteria).to_json().expect("json a");
        let b = engine.run(&criteria).to_json().expect("json b");
        assert_eq!(a, b, "snapshot diverged for {criteria:?}");
    }
}

#[test]
fn separate_engines_agree() {
    let (sales, closures) = dataset();
    let engine_a = RadarEngine::new(RadarConfig::seoul(), &sales, &closures).expect("engine a");
    let engine_b = RadarEngine::new(RadarConfig::seoul(), &sales, &closures).expect("engine b");

    let criteria = FilterCriteria::all();
    assert_eq!(engine_a.run(&criteria), engine_b.run(&criteria));
}

#[test]
fn runs_do_not_leak_between_criteria() {
    let (sales, closures) = dataset();
    let engine = RadarEngine::new(RadarConfig::seoul(), &sales, &closures).expect("engine");

    let first = engine.run(&FilterCriteria::all());
    let _narrow = engine.run(&FilterCriteria { region: "마포구".into(), ..FilterCriteria::all() });
    let again = engine.run(&FilterCriteria::all());
    assert_eq!(first, again);
}
