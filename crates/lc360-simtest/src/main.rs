//! LC360 Headless Simulation Harness
//!
//! Validates tracking logic and mock data without any UI.
//! Runs entirely in-process. No network, no rendering.
//!
//! Usage:
//!   cargo run -p lc360-simtest
//!   cargo run -p lc360-simtest -- --verbose
//!   cargo run -p lc360-simtest -- --live --interval-ms 50
//!   cargo run -p lc360-simtest -- --live --config tracking.json

use std::path::PathBuf;
use std::time::Duration;

use lc360_logic::filter::ShipmentFilter;
use lc360_logic::fleet::Fleet;
use lc360_logic::observer::{EventLog, LogObserver, Severity};
use lc360_logic::progress::ProgressTracker;
use lc360_logic::route::{self, Waypoint};
use lc360_logic::shipment::ShipmentStatus;
use lc360_logic::{TrackingConfig, TrackingError, TrackingSimulation};
use lc360_runtime::TrackingService;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Debug, Default)]
struct Args {
    verbose: bool,
    live: bool,
    config: Option<PathBuf>,
    interval_ms: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--live" => args.live = true,
            "--config" => {
                let path = it.next().ok_or("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--interval-ms" => {
                let raw = it.next().ok_or("--interval-ms needs a value")?;
                let ms = raw
                    .parse::<u64>()
                    .map_err(|e| format!("bad --interval-ms {raw:?}: {e}"))?;
                args.interval_ms = Some(ms);
            }
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(args)
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("usage: lc360-simtest [--verbose] [--live] [--config <path>] [--interval-ms <n>]");
            std::process::exit(2);
        }
    };

    // Validation output stays readable unless the live loop is running
    let default_level = if args.live { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    if args.live {
        if let Err(e) = run_live(config) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let verbose = args.verbose;
    println!("=== LC360 Tracking Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Mock fleet validation
    results.extend(validate_fleet(verbose));

    // 2. Marker interpolation
    results.extend(validate_interpolation(verbose));

    // 3. Progress tracker
    results.extend(validate_progress());

    // 4. Status transitions
    results.extend(validate_transitions());

    // 5. Full run over the demo fleet
    results.extend(validate_full_run(&config, verbose));

    // 6. Filtering
    results.extend(validate_filtering());

    // 7. Configuration
    results.extend(validate_config());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> Result<TrackingConfig, TrackingError> {
    let mut config = match &args.config {
        Some(path) => TrackingConfig::load(path)?,
        None => TrackingConfig::default(),
    };
    if let Some(ms) = args.interval_ms {
        config.tick_interval_ms = ms;
        config.validate()?;
    }
    Ok(config)
}

fn new_simulation(config: &TrackingConfig) -> Result<(TrackingSimulation, EventLog), TrackingError> {
    let mut sim = TrackingSimulation::with_default_fleet(config.clone())?;
    let log = EventLog::new();
    sim.subscribe(Box::new(log.clone()));
    Ok((sim, log))
}

fn approx(a: Waypoint, b: Waypoint) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

// ── Live mode ───────────────────────────────────────────────────────────

fn run_live(config: TrackingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut sim = TrackingSimulation::with_default_fleet(config)?;
    sim.subscribe(Box::new(LogObserver));
    let mut service = TrackingService::new(sim).stop_when_idle(true);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async {
        service.start()?;
        service.join().await
    })?;

    service.with_simulation(|sim| {
        for marker in sim.markers() {
            log::info!(
                "{} {} progress={:.2}",
                marker.tracking_code,
                marker.status,
                marker.progress
            );
        }
        log::info!("Finished after {} ticks", sim.tick_count());
    });
    Ok(())
}

// ── 1. Mock Fleet ───────────────────────────────────────────────────────

fn validate_fleet(verbose: bool) -> Vec<TestResult> {
    println!("--- Mock Fleet ---");
    let mut results = Vec::new();

    let fleet = match Fleet::load_default() {
        Ok(f) => f,
        Err(e) => {
            results.push(TestResult {
                name: "fleet_parse".into(),
                passed: false,
                detail: format!("load error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "fleet_not_empty".into(),
        passed: !fleet.shipments.is_empty(),
        detail: format!("{} shipments loaded", fleet.shipments.len()),
    });

    let unroutable: Vec<_> = fleet
        .shipments
        .iter()
        .filter(|s| !s.is_routable())
        .map(|s| s.id.as_str())
        .collect();
    results.push(TestResult {
        name: "fleet_routes_routable".into(),
        passed: unroutable.is_empty(),
        detail: if unroutable.is_empty() {
            "every route has at least two waypoints".into()
        } else {
            format!("unroutable: {}", unroutable.join(", "))
        },
    });

    let mut codes: Vec<_> = fleet.shipments.iter().map(|s| &s.tracking_code).collect();
    codes.sort();
    codes.dedup();
    results.push(TestResult {
        name: "fleet_unique_tracking_codes".into(),
        passed: codes.len() == fleet.shipments.len(),
        detail: format!("{} distinct codes", codes.len()),
    });

    let unresolved: Vec<_> = fleet
        .shipments
        .iter()
        .filter(|s| s.assigned_driver.is_some() && fleet.driver_for(s).is_none())
        .map(|s| s.id.as_str())
        .collect();
    results.push(TestResult {
        name: "fleet_drivers_resolve".into(),
        passed: unresolved.is_empty(),
        detail: if unresolved.is_empty() {
            "all assigned drivers exist".into()
        } else {
            format!("unknown drivers on {}", unresolved.join(", "))
        },
    });

    let bad_vehicle: Vec<_> = fleet
        .drivers
        .iter()
        .filter(|d| d.vehicle.as_deref().is_some_and(|v| fleet.vehicle(v).is_none()))
        .map(|d| d.id.as_str())
        .collect();
    results.push(TestResult {
        name: "fleet_vehicles_resolve".into(),
        passed: bad_vehicle.is_empty(),
        detail: format!("{} drivers with unknown vehicles", bad_vehicle.len()),
    });

    if verbose {
        println!("  Shipments:");
        for s in &fleet.shipments {
            let driver = fleet.driver_for(s).map(|d| d.name.as_str()).unwrap_or("-");
            println!(
                "    {:16} {:18} {:24} {:>4} pts  driver={}",
                s.tracking_code,
                s.status,
                s.route_label(),
                s.waypoints.len(),
                driver
            );
        }
    }

    results
}

// ── 2. Interpolation ────────────────────────────────────────────────────

fn validate_interpolation(verbose: bool) -> Vec<TestResult> {
    println!("--- Marker Interpolation ---");
    let mut results = Vec::new();

    let line = [Waypoint::new(0.0, 0.0), Waypoint::new(10.0, 0.0)];
    let bend = [
        Waypoint::new(0.0, 0.0),
        Waypoint::new(10.0, 0.0),
        Waypoint::new(10.0, 10.0),
    ];
    let diagonal = [Waypoint::new(0.0, 0.0), Waypoint::new(3.0, 4.0)];
    let scenarios = [
        ("interp_start", &line[..], 0.0, Waypoint::new(0.0, 0.0)),
        ("interp_halfway", &line[..], 0.5, Waypoint::new(5.0, 0.0)),
        ("interp_second_segment", &bend[..], 0.75, Waypoint::new(10.0, 5.0)),
        ("interp_diagonal", &diagonal[..], 0.3, Waypoint::new(0.9, 1.2)),
    ];
    for (name, route, p, expected) in scenarios {
        let got = route::position(route, p);
        results.push(TestResult {
            name: name.into(),
            passed: got.is_some_and(|pt| approx(pt, expected)),
            detail: format!("p={} → {:?}", p, got),
        });
    }

    results.push(TestResult {
        name: "interp_short_route_none".into(),
        passed: route::position(&[Waypoint::new(1.0, 1.0)], 0.5).is_none()
            && route::position(&[], 0.5).is_none(),
        detail: "0 and 1 point routes yield no position".into(),
    });

    // Property sweep over random polylines
    let mut rng = StdRng::seed_from_u64(360);
    let mut off_route = 0;
    let mut bad_ends = 0;
    let mut extrapolated = 0;
    let samples = 2_000;
    for _ in 0..samples {
        let n = rng.gen_range(2..8);
        let waypoints: Vec<Waypoint> = (0..n)
            .map(|_| Waypoint::new(rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0)))
            .collect();
        let p: f64 = rng.gen_range(0.0..1.0);
        let over: f64 = rng.gen_range(1.0..5.0);

        let on = route::position(&waypoints, p).map(|pt| route::is_on_route(&waypoints, pt, 1e-6));
        if on != Some(true) {
            off_route += 1;
        }
        let first = route::position(&waypoints, 0.0);
        let last = route::position(&waypoints, 1.0);
        if first != Some(waypoints[0]) || last != Some(waypoints[n - 1]) {
            bad_ends += 1;
        }
        if route::position(&waypoints, over) != Some(waypoints[n - 1]) {
            extrapolated += 1;
        }
    }
    results.push(TestResult {
        name: "interp_on_polyline".into(),
        passed: off_route == 0,
        detail: format!("{}/{} samples off route", off_route, samples),
    });
    results.push(TestResult {
        name: "interp_endpoints_exact".into(),
        passed: bad_ends == 0,
        detail: format!("{}/{} routes with wrong endpoints", bad_ends, samples),
    });
    results.push(TestResult {
        name: "interp_no_extrapolation".into(),
        passed: extrapolated == 0,
        detail: format!("{}/{} overshoots left the last waypoint", extrapolated, samples),
    });

    if verbose {
        if let Ok(fleet) = Fleet::load_default() {
            println!("  Route lengths:");
            for s in &fleet.shipments {
                println!(
                    "    {:16} {:8.1} px",
                    s.tracking_code,
                    route::route_length(&s.waypoints)
                );
            }
        }
    }

    results
}

// ── 3. Progress Tracker ─────────────────────────────────────────────────

fn validate_progress() -> Vec<TestResult> {
    println!("--- Progress Tracker ---");
    let mut results = Vec::new();

    let mut tracker = ProgressTracker::default();
    let a = tracker.seed("unseen");
    let b = tracker.seed("unseen");
    results.push(TestResult {
        name: "progress_seed_idempotent".into(),
        passed: a == 0.0 && b == 0.0 && tracker.len() == 1,
        detail: format!("seeded {} then {}", a, b),
    });

    let mut last = 0.0;
    let mut monotonic = true;
    for _ in 0..150 {
        let now = tracker.advance("unseen");
        monotonic &= now > last;
        last = now;
    }
    results.push(TestResult {
        name: "progress_monotonic".into(),
        passed: monotonic,
        detail: format!("150 steps → {:.2}", last),
    });

    results
}

// ── 4. Status Transitions ───────────────────────────────────────────────

fn validate_transitions() -> Vec<TestResult> {
    println!("--- Status Transitions ---");
    let mut results = Vec::new();

    let config = TrackingConfig::default();

    // 0.79 → 0.80 on an in-transit shipment
    match new_simulation(&config) {
        Ok((mut sim, log)) => {
            let staged = sim.set_progress("SHP001", 0.79);
            sim.tick();
            let status = sim.shipment("SHP001").map(|s| s.status);
            let info = log.notifications(Severity::Info);
            results.push(TestResult {
                name: "transition_out_for_delivery".into(),
                passed: staged.is_ok()
                    && status == Some(ShipmentStatus::OutForDelivery)
                    && info.len() == 1,
                detail: format!("status={:?} info={:?}", status, info),
            });
        }
        Err(e) => results.push(setup_failure("transition_out_for_delivery", e)),
    }

    // 0.99 → 1.00, then frozen
    match new_simulation(&config) {
        Ok((mut sim, log)) => {
            let staged = sim.set_progress("SHP002", 0.99);
            sim.tick();
            let frozen = sim.progress("SHP002");
            for _ in 0..5 {
                sim.tick();
            }
            let status = sim.shipment("SHP002").map(|s| s.status);
            let success = log.notifications(Severity::Success);
            results.push(TestResult {
                name: "transition_delivered_frozen".into(),
                passed: staged.is_ok()
                    && status == Some(ShipmentStatus::Delivered)
                    && success.len() == 1
                    && sim.progress("SHP002") == frozen,
                detail: format!("status={:?} success={:?}", status, success),
            });
        }
        Err(e) => results.push(setup_failure("transition_delivered_frozen", e)),
    }

    // One oversized step crosses both thresholds
    let big_step = TrackingConfig {
        progress_step: 2.0,
        ..config
    };
    match new_simulation(&big_step) {
        Ok((mut sim, _)) => {
            let report = sim.tick();
            results.push(TestResult {
                name: "transition_large_step".into(),
                passed: sim.all_delivered(),
                detail: format!("{} status changes in one tick", report.changes.len()),
            });
        }
        Err(e) => results.push(setup_failure("transition_large_step", e)),
    }

    results
}

fn setup_failure(name: &str, e: TrackingError) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: format!("setup failed: {}", e),
    }
}

// ── 5. Full Run ─────────────────────────────────────────────────────────

fn validate_full_run(config: &TrackingConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Full Run ---");
    let mut results = Vec::new();

    let (mut sim, log) = match new_simulation(config) {
        Ok(s) => s,
        Err(e) => {
            results.push(setup_failure("run_setup", e));
            return results;
        }
    };

    let ids: Vec<String> = sim.active_ids().iter().map(|s| s.to_string()).collect();
    let mut regressions = 0;
    let mut inconsistent = 0;
    let mut last: Vec<(ShipmentStatus, f64)> = ids
        .iter()
        .map(|id| {
            (
                sim.shipment(id).map(|s| s.status).unwrap_or(ShipmentStatus::InTransit),
                sim.progress(id).unwrap_or(0.0),
            )
        })
        .collect();

    let limit = config.ticks_to_deliver() * 2 + 10;
    let mut ticks = 0;
    while ticks < limit {
        let report = sim.tick();
        if report.is_idle() {
            break;
        }
        ticks += 1;
        for (i, id) in ids.iter().enumerate() {
            let status = sim.shipment(id).map(|s| s.status).unwrap_or(ShipmentStatus::InTransit);
            let progress = sim.progress(id).unwrap_or(0.0);
            if status < last[i].0 || progress < last[i].1 {
                regressions += 1;
            }
            if config.seed_progress_from_status && status != ShipmentStatus::for_progress(progress) {
                inconsistent += 1;
            }
            last[i] = (status, progress);
        }
    }

    results.push(TestResult {
        name: "run_all_delivered".into(),
        passed: sim.all_delivered(),
        detail: format!("{} productive ticks", ticks),
    });
    results.push(TestResult {
        name: "run_no_regressions".into(),
        passed: regressions == 0,
        detail: format!("{} status/progress regressions", regressions),
    });
    results.push(TestResult {
        name: "run_status_matches_progress".into(),
        passed: inconsistent == 0,
        detail: format!("{} inconsistent samples", inconsistent),
    });

    let success = log.notifications(Severity::Success).len();
    results.push(TestResult {
        name: "run_one_delivery_notice_each".into(),
        passed: success == ids.len(),
        detail: format!("{} success notifications for {} shipments", success, ids.len()),
    });

    if verbose {
        match serde_json::to_string_pretty(&sim.markers()) {
            Ok(json) => println!("  Final markers:\n{}", json),
            Err(e) => println!("  (markers not serializable: {})", e),
        }
    }

    results
}

// ── 6. Filtering ────────────────────────────────────────────────────────

fn validate_filtering() -> Vec<TestResult> {
    println!("--- Filtering ---");
    let mut results = Vec::new();

    let (mut sim, _) = match new_simulation(&TrackingConfig::default()) {
        Ok(s) => s,
        Err(e) => {
            results.push(setup_failure("filter_setup", e));
            return results;
        }
    };

    for _ in 0..10 {
        sim.tick();
    }
    let before = sim.progress("SHP003");
    let visible = sim.apply_filter(ShipmentFilter::all().with_query("pune")).len();
    for _ in 0..10 {
        sim.tick();
    }
    let hidden_frozen = sim.progress("SHP003") == before;
    sim.apply_filter(ShipmentFilter::all());
    let restored = sim.progress("SHP003") == before;

    results.push(TestResult {
        name: "filter_hides_and_freezes".into(),
        passed: visible == 1 && hidden_frozen,
        detail: format!("{} visible, hidden progress frozen={}", visible, hidden_frozen),
    });
    results.push(TestResult {
        name: "filter_keeps_progress".into(),
        passed: restored,
        detail: format!("SHP003 progress after re-show: {:?}", sim.progress("SHP003")),
    });

    results
}

// ── 7. Configuration ────────────────────────────────────────────────────

fn validate_config() -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let cases = [
        ("config_empty_ok", "{}", true),
        ("config_fast_ok", r#"{"tick_interval_ms": 10, "progress_step": 0.1}"#, true),
        ("config_zero_interval_rejected", r#"{"tick_interval_ms": 0}"#, false),
        ("config_zero_step_rejected", r#"{"progress_step": 0}"#, false),
    ];
    for (name, json, should_pass) in cases {
        let parsed = TrackingConfig::from_json_str(json);
        results.push(TestResult {
            name: name.into(),
            passed: parsed.is_ok() == should_pass,
            detail: match parsed {
                Ok(c) => format!("accepted: {:?}", c),
                Err(e) => format!("rejected: {}", e),
            },
        });
    }

    let live = TrackingConfig::default();
    results.push(TestResult {
        name: "config_default_period".into(),
        passed: live.tick_interval() == Duration::from_secs(1),
        detail: format!("{:?}", live.tick_interval()),
    });

    results
}
