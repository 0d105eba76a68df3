//! End-to-end pipeline tests over a temporary input directory

use report_builder::pipeline::{run, RunConfig};
use report_builder::scenario::{DetectionPolicyKind, DetectionSpec, Scenario};
use report_builder::ReportError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STK_HEADER: &str =
    "\"Access\",\"Start Time (UTCG)\",\"Stop Time (UTCG)\",\"Duration (sec)\"";

fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Scenario matching the test fixtures: 300-minute horizon from
/// 2026-01-01T00:00Z, one declared constellation and one declared port
fn scenario_json() -> &'static str {
    r#"{
        "name": "pipeline-test",
        "horizon": {"start": "2026-01-01T00:00:00Z", "duration_hours": 5.0},
        "constellations": [{"name": "12-sat", "satellite_count": 12}],
        "targets": [{"name": "Mumbai", "kind": "port"}],
        "stations": ["Sriharikota"],
        "detection": {"policy": "horizon-start"}
    }"#
}

/// Windows [(0,60),(50,120),(200,260)] minutes: merged coverage 180/300
fn mumbai_sar_export() -> String {
    format!(
        "{STK_HEADER}\n\
         1,\"1 Jan 2026 00:00:00.000\",\"1 Jan 2026 01:00:00.000\",3600.000\n\
         2,\"1 Jan 2026 00:50:00.000\",\"1 Jan 2026 02:00:00.000\",4200.000\n\
         \"Min Duration\",\"1\",\"3600.000\"\n\
         {STK_HEADER}\n\
         1,\"1 Jan 2026 03:20:00.000\",\"1 Jan 2026 04:20:00.000\",3600.000\n"
    )
}

fn setup(input: &Path) -> Scenario {
    write_file(input, "Port_Mumbai-Walker12_SAR_Access.csv", &mumbai_sar_export());
    write_file(input, "scenario.json", scenario_json());
    // The scenario file itself is not a CSV and must not be scanned
    Scenario::load(&input.join("scenario.json")).unwrap()
}

#[test]
fn test_worked_example_end_to_end() {
    let dir = TempDir::new().unwrap();
    let scenario = setup(dir.path());
    let output = dir.path().join("reports");

    let summary = run(&RunConfig {
        input_dir: dir.path().to_path_buf(),
        output_dir: output.clone(),
        scenario,
    })
    .unwrap();

    assert_eq!(summary.access_windows, 3);
    assert_eq!(summary.coverage_rows, 1);
    assert_eq!(summary.input_files, vec!["Port_Mumbai-Walker12_SAR_Access.csv"]);

    let coverage = fs::read_to_string(output.join("coverage_summary.csv")).unwrap();
    let row = coverage.lines().nth(1).unwrap();
    // 3 raw windows merge to 2 passes, coverage 0.6, one 80-minute gap,
    // zero detection latency at horizon start, worst case 80 minutes
    assert!(row.starts_with("12-sat,Mumbai,port,SAR,3,2,0.6000,1,80.00,80.00,80.00,80.00,80.00"));
    assert!(row.ends_with(",80.00"));

    // Fusion gain vs SAR is exactly 1 with a single sensor
    let fusion = fs::read_to_string(output.join("fusion_summary.csv")).unwrap();
    let row = fusion.lines().nth(1).unwrap();
    assert!(row.starts_with("12-sat,Mumbai,port,0.6000,0.0000,0.6000,1.000,"));

    // No station export was loaded, so no delivery table
    assert!(!output.join("delivery_latency.csv").exists());
    assert!(output.join("run_summary.json").exists());
}

#[test]
fn test_rerun_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let scenario = setup(dir.path());

    let first = dir.path().join("reports-1");
    let second = dir.path().join("reports-2");
    for output in [&first, &second] {
        run(&RunConfig {
            input_dir: dir.path().to_path_buf(),
            output_dir: output.clone(),
            scenario: scenario.clone(),
        })
        .unwrap();
    }

    for table in ["coverage_summary.csv", "fusion_summary.csv"] {
        let a = fs::read_to_string(first.join(table)).unwrap();
        let b = fs::read_to_string(second.join(table)).unwrap();
        assert_eq!(a, b, "{table} differs between identical runs");
    }
}

#[test]
fn test_declared_target_without_data_fails() {
    let dir = TempDir::new().unwrap();
    let mut scenario = setup(dir.path());
    scenario.targets.push(report_builder::scenario::TargetSpec {
        name: "Chennai".to_string(),
        kind: access_windows::TargetKind::Port,
    });

    let err = run(&RunConfig {
        input_dir: dir.path().to_path_buf(),
        output_dir: dir.path().join("reports"),
        scenario,
    })
    .unwrap_err();

    assert!(matches!(err, ReportError::EmptyInput { target, .. } if target == "Chennai"));
}

#[test]
fn test_malformed_row_aborts_run() {
    let dir = TempDir::new().unwrap();
    let mut content = mumbai_sar_export();
    content.push_str("not-an-index,\"1 Jan 2026 04:30:00.000\",\"1 Jan 2026 04:40:00.000\",600.000\n");
    write_file(dir.path(), "Port_Mumbai-Walker12_SAR_Access.csv", &content);
    write_file(dir.path(), "scenario.json", scenario_json());
    let scenario = Scenario::load(&dir.path().join("scenario.json")).unwrap();

    let err = run(&RunConfig {
        input_dir: dir.path().to_path_buf(),
        output_dir: dir.path().join("reports"),
        scenario,
    })
    .unwrap_err();

    match err {
        ReportError::Schema { file, line, .. } => {
            assert_eq!(file, "Port_Mumbai-Walker12_SAR_Access.csv");
            assert_eq!(line, 7);
        }
        other => panic!("expected schema error, got {other:?}"),
    }

    // Atomic failure: nothing was emitted
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_delivery_table_with_station_passes() {
    let dir = TempDir::new().unwrap();

    let ship_export = format!(
        "{STK_HEADER}\n\
         1,\"1 Jan 2026 00:10:00.000\",\"1 Jan 2026 00:20:00.000\",600.000\n"
    );
    let station_export = format!(
        "{STK_HEADER}\n\
         1,\"1 Jan 2026 00:50:00.000\",\"1 Jan 2026 00:55:00.000\",300.000\n"
    );
    write_file(dir.path(), "Ship1-Constellation12_SAR_Access.csv", &ship_export);
    write_file(dir.path(), "GS_Sriharikota-Walker12_Access.csv", &station_export);

    let mut scenario: Scenario = serde_json::from_str(scenario_json()).unwrap();
    scenario.targets = vec![report_builder::scenario::TargetSpec {
        name: "Ship1".to_string(),
        kind: access_windows::TargetKind::Ship,
    }];

    let output = dir.path().join("reports");
    let summary = run(&RunConfig {
        input_dir: dir.path().to_path_buf(),
        output_dir: output.clone(),
        scenario,
    })
    .unwrap();

    assert_eq!(summary.station_passes, 1);
    assert_eq!(summary.delivery_rows, 1);

    let delivery = fs::read_to_string(output.join("delivery_latency.csv")).unwrap();
    let row = delivery.lines().nth(1).unwrap();
    // Access ends 00:20, next pass starts 00:50 -> 30-minute latency
    assert_eq!(row, "12-sat,Ship1,1,1,1,30.00,30.00,30.00,30.00,30.00");
}

#[test]
fn test_periodic_detection_policy() {
    let dir = TempDir::new().unwrap();
    let mut scenario = setup(dir.path());
    scenario.detection = DetectionSpec {
        policy: DetectionPolicyKind::Periodic,
        interval_min: Some(70.0),
    };

    let output = dir.path().join("reports");
    run(&RunConfig {
        input_dir: dir.path().to_path_buf(),
        output_dir: output.clone(),
        scenario,
    })
    .unwrap();

    let coverage = fs::read_to_string(output.join("coverage_summary.csv")).unwrap();
    let row = coverage.lines().nth(1).unwrap();
    let cells: Vec<&str> = row.split(',').collect();
    // Orders at 0,70,140,210,280 min: four served, the 280-min order has
    // no later access interval
    assert_eq!(cells[13], "5", "detection orders");
    assert_eq!(cells[14], "4", "served orders");
    assert_eq!(cells[15], "1", "unserved orders");
}
