//! radar-runner: headless driver for the market radar core.
//!
//! Usage:
//!   radar-runner --sales sales.csv --closures stores.csv
//!   radar-runner --sales sales.csv --closures stores.csv --region 강남구 --json
//!   radar-runner --sales sales.csv --closures stores.csv --ipc-mode
//!   radar-runner --sales sales.csv --closures stores.csv --encoding utf-8

mod loader;

use anyhow::Result;
use market_radar_core::{
    command::RadarCommand,
    config::RadarConfig,
    deep_dive::AgeBracket,
    engine::RadarEngine,
    filter::{FilterCriteria, FilterOptions, Selection},
    grid::{DemographicFilter, GRID_CELLS},
    history::HistoryPoint,
    metrics::{AverageBaseline, Axis, DistrictMetric},
    session::RadarSession,
    snapshot::RadarSnapshot,
};
use std::collections::BTreeMap;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Options,
    Command {
        command: RadarCommand,
    },
    Grid {
        id: String,
        #[serde(default)]
        baseline: Option<String>,
        #[serde(default)]
        ages: Option<Vec<AgeBracket>>,
    },
    Playback {
        id: String,
        #[serde(default)]
        start: usize,
        frames: usize,
        #[serde(default)]
        ages: Option<Vec<AgeBracket>>,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    criteria: &'a FilterCriteria,
    time_range: usize,
    latest_period: u32,
    selected: &'a [String],
    districts: &'a [DistrictMetric],
    baseline: &'a AverageBaseline,
    history: BTreeMap<&'a str, &'a [HistoryPoint]>,
}

#[derive(serde::Serialize)]
struct Report<'a> {
    generated_at: String,
    snapshot: &'a RadarSnapshot,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let json = args.iter().any(|a| a == "--json");
    let sales_path = arg_value(&args, "--sales")
        .ok_or_else(|| anyhow::anyhow!("--sales <csv> is required"))?;
    let closures_path = arg_value(&args, "--closures")
        .ok_or_else(|| anyhow::anyhow!("--closures <csv> is required"))?;
    let encoding = loader::encoding_for_label(
        arg_value(&args, "--encoding").unwrap_or(loader::DEFAULT_ENCODING),
    )?;

    let config = match arg_value(&args, "--config") {
        Some(path) => RadarConfig::load(path)?,
        None => RadarConfig::seoul(),
    };

    let criteria = FilterCriteria {
        region: selection_arg(&args, "--region"),
        neighborhood: selection_arg(&args, "--neighborhood"),
        industry: selection_arg(&args, "--industry"),
        min_revenue: 0.0,
    }
    .with_min_revenue_units(parse_arg(&args, "--min-revenue", 0.0f64), &config.units);

    if !ipc_mode && !json {
        println!("Market Radar: radar-runner");
        println!("  sales:     {sales_path}");
        println!("  closures:  {closures_path}");
        println!();
    }

    let sales = loader::load_rows_file(sales_path, encoding)?;
    let closures = loader::load_rows_file(closures_path, encoding)?;
    let engine = RadarEngine::new(config, &sales, &closures)?;

    if ipc_mode {
        let mut session = RadarSession::with_criteria(engine, criteria);
        run_ipc_loop(&mut session)?;
    } else {
        let snapshot = engine.run(&criteria);
        if json {
            let report = Report {
                generated_at: chrono::Utc::now().to_rfc3339(),
                snapshot: &snapshot,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(&snapshot);
        }
    }

    Ok(())
}

fn run_ipc_loop(session: &mut RadarSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                reply_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => reply_state(&mut stdout, session)?,
            IpcCommand::Options => {
                let options: &FilterOptions = session.engine().filter_options();
                writeln!(stdout, "{}", serde_json::to_string(options)?)?;
            }
            IpcCommand::Command { command } => match session.apply(command) {
                Ok(()) => reply_state(&mut stdout, session)?,
                Err(e) => reply_error(&mut stdout, &e.to_string())?,
            },
            IpcCommand::Grid { id, baseline, ages } => {
                let filter = ages.map(DemographicFilter::from).unwrap_or_default();
                let snapshot = session.snapshot();
                let grids = snapshot
                    .activity_grids(&id, baseline.as_deref(), &filter)
                    .and_then(|pair| Ok((pair, snapshot.cohort(&id, &filter)?)));
                match grids {
                    Ok(((grid, baseline), cohort)) => {
                        let reply = serde_json::json!({
                            "grid": grid,
                            "baseline": baseline,
                            "cohort": cohort,
                        });
                        writeln!(stdout, "{reply}")?;
                    }
                    Err(e) => reply_error(&mut stdout, &e.to_string())?,
                }
            }
            IpcCommand::Playback { id, start, frames, ages } => {
                let filter = ages.map(DemographicFilter::from).unwrap_or_default();
                match session.snapshot().playback_frames(&id, &filter, start, frames) {
                    Ok(cells) => {
                        let next = (start + cells.len()) % GRID_CELLS;
                        let reply = serde_json::json!({ "frames": cells, "next": next });
                        writeln!(stdout, "{reply}")?;
                    }
                    Err(e) => reply_error(&mut stdout, &e.to_string())?,
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn reply_state(out: &mut impl Write, session: &RadarSession) -> Result<()> {
    let snapshot = session.snapshot();
    let history = session
        .selected()
        .iter()
        .map(|id| (id.as_str(), snapshot.history_window(id, session.time_range())))
        .collect();
    let state = UiState {
        criteria: session.criteria(),
        time_range: session.time_range(),
        latest_period: snapshot.latest_sales_period,
        selected: session.selected(),
        districts: &snapshot.districts,
        baseline: &snapshot.baseline,
        history,
    };
    writeln!(out, "{}", serde_json::to_string(&state)?)?;
    Ok(())
}

fn reply_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn print_summary(snapshot: &RadarSnapshot) {
    println!("=== MARKET SUMMARY ===");
    println!("  criteria:       {:?}", snapshot.criteria);
    println!("  grouped by:     {:?}", snapshot.entity_key);
    println!("  latest period:  {}", snapshot.latest_sales_period);
    println!("  districts:      {}", snapshot.districts.len());

    if snapshot.is_empty() {
        println!();
        println!("  (No data matches these filters)");
        return;
    }

    println!();
    print!("  {:<16}", "district");
    for axis in Axis::ALL {
        print!(" {:>18}", axis.label());
    }
    println!();
    for d in &snapshot.districts {
        print!("  {:<16}", d.id);
        for s in &d.stats {
            print!(" {:>10} ({:>5.1})", s.display, s.value);
        }
        println!();
    }
    print!("  {:<16}", "average");
    for s in &snapshot.baseline.stats {
        print!(" {:>10} ({:>5.1})", s.display, s.value);
    }
    println!();
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn selection_arg(args: &[String], flag: &str) -> Selection {
    arg_value(args, flag).map(Selection::from).unwrap_or_default()
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
