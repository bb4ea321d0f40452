use dashviz::aggregate::{aggregate, rank_and_trim, Aggregation, SortOrder};
use dashviz::config::DashboardConfig;
use dashviz::controller::{load_dataset, Dashboard, DataFormat, SalesDashboard, TrailsDashboard};
use dashviz::csv_reader::read_csv;
use dashviz::data::Dataset;
use dashviz::graph::render_page;
use dashviz::profile::Profile;
use dashviz::{OutputFormat, RenderOptions};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Run the dashviz binary, optionally feeding `stdin`
fn run_dashviz(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_dashviz"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("DASHVIZ_DATA")
        .env_remove("DASHVIZ_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn dashviz");

    if let Some(mut handle) = child.stdin.take() {
        if let Some(text) = stdin {
            handle.write_all(text.as_bytes()).expect("Failed to write to stdin");
        }
    }
    child.wait_with_output().expect("Failed to wait for dashviz")
}

fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn fixture(profile: &Profile, name: &str) -> Dataset {
    load_dataset(Some(Path::new(name)), DataFormat::Csv, profile).expect("Failed to load fixture")
}

fn no_labels(format: OutputFormat) -> RenderOptions {
    RenderOptions { format, labels: false }
}

// =============================================================================
// Library
// =============================================================================

#[test]
fn test_worked_example_rpg_action() {
    let csv = read_csv("Name,Genre,Global_Sales\na,RPG,3\nb,RPG,2\nc,Action,5\n".as_bytes()).unwrap();
    let dataset = Dataset::from_csv(csv, &["Global_Sales"]).unwrap();

    let points = aggregate(&dataset, dataset.records(), "Genre", Some("Global_Sales"), Aggregation::Sum).unwrap();
    let summary: Vec<(String, f64)> = points.iter().map(|p| (p.key.label(), p.value)).collect();
    assert_eq!(summary, vec![("RPG".to_string(), 5.0), ("Action".to_string(), 5.0)]);

    let top = rank_and_trim(points, SortOrder::Desc, 1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].key.label(), "RPG");
    assert_eq!(top[0].value, 5.0);
}

#[test]
fn test_conservation_on_sales_fixture() {
    let profile = Profile::sales();
    let dataset = fixture(&profile, "test/video_game_sales.csv");

    let sums = aggregate(&dataset, dataset.records(), "Platform", Some("Global_Sales"), Aggregation::Sum).unwrap();
    let grouped: f64 = sums.iter().map(|p| p.value).sum();
    let idx = dataset.field_index("Global_Sales").unwrap();
    let raw: f64 = dataset.records().iter().map(|r| r.number(idx)).sum();
    assert!((grouped - raw).abs() < 1e-9);

    let counts = aggregate(&dataset, dataset.records(), "Publisher", None, Aggregation::Count).unwrap();
    let total: f64 = counts.iter().map(|p| p.value).sum();
    assert_eq!(total as usize, dataset.len());
}

#[test]
fn test_sales_dashboard_zero_callout() {
    let profile = Profile::sales();
    let mut dashboard = SalesDashboard::new(fixture(&profile, "test/video_game_sales.csv"), DashboardConfig::default()).unwrap();
    let mut controls = dashboard.controls().clone();
    controls.x_attr = "Publisher".into();
    controls.y_attr = "NA_Sales".into();
    controls.sort_order = SortOrder::Asc;
    dashboard.apply_controls(controls).unwrap();

    let page = dashboard.page();
    let has_callout = page.panels[0]
        .scene
        .commands
        .iter()
        .any(|c| matches!(c, dashviz::ir::DrawCommand::Callout { .. }));
    assert!(has_callout);
}

#[test]
fn test_trails_cross_filter_round_trip_on_fixture() {
    let profile = Profile::trails();
    let mut dashboard = TrailsDashboard::new(fixture(&profile, "test/vancouver_trails.csv"), DashboardConfig::default()).unwrap();
    let scatter = dashboard.scatter();
    let initial = scatter.borrow().scene().clone();
    let total = scatter.borrow().active_len();
    assert_eq!(total, 14);

    dashboard.toggle("Difficult").unwrap();
    assert_eq!(scatter.borrow().active_len(), 4);
    dashboard.toggle("Easy").unwrap();
    assert_eq!(scatter.borrow().active_len(), 9);

    dashboard.clear_selection().unwrap();
    assert_eq!(scatter.borrow().active_len(), total);
    assert_eq!(scatter.borrow().scene(), &initial);
}

#[test]
fn test_trails_page_renders_two_panels() {
    let profile = Profile::trails();
    let dashboard = TrailsDashboard::new(fixture(&profile, "test/vancouver_trails.csv"), DashboardConfig::default()).unwrap();
    let bytes = render_page(&dashboard.page(), &no_labels(OutputFormat::Png)).unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!(img.width(), 2000);
    assert_eq!(img.height(), 625);
}

#[test]
fn test_bad_numbers_are_coerced() {
    let profile = Profile::trails();
    let dataset = fixture(&profile, "test/bad_numbers.csv");
    let time = dataset.field_index("time").unwrap();
    let distance = dataset.field_index("distance").unwrap();
    let records = dataset.records();
    assert_eq!(records[0].number(distance), 0.0);
    assert_eq!(records[1].number(time), 0.0);
    assert_eq!(records[2].number(distance), 0.0);
    assert_eq!(records[2].number(time), 10.0);
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn test_end_to_end_sales_svg_stdout() {
    let output = run_dashviz(
        &["sales", "--data", "test/video_game_sales.csv", "--format", "svg", "--no-labels"],
        None,
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let svg = String::from_utf8(output.stdout).unwrap();
    assert!(svg.starts_with("<svg"));
}

#[test]
fn test_end_to_end_sales_from_stdin() {
    let csv = fs::read_to_string("test/video_game_sales.csv").expect("Failed to read test CSV");
    let output = run_dashviz(&["sales", "-x", "Year", "--no-labels"], Some(&csv));
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(is_valid_png(&output.stdout));
}

#[test]
fn test_end_to_end_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trails.png");
    let output = run_dashviz(
        &[
            "trails",
            "--data",
            "test/vancouver_trails.csv",
            "--select",
            "Easy",
            "--no-labels",
            "--output",
            path.to_str().unwrap(),
        ],
        None,
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
    assert!(is_valid_png(&fs::read(&path).unwrap()));
}

#[test]
fn test_end_to_end_script_tooltips() {
    let output = run_dashviz(
        &[
            "trails",
            "--data",
            "test/vancouver_trails.csv",
            "--format",
            "svg",
            "--no-labels",
            "--script",
            "toggle(Easy) | hover(Easy) | clear()",
        ],
        None,
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let tooltip: serde_json::Value = stderr
        .lines()
        .filter(|l| l.starts_with('{'))
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .find(|v| v["event"] == "tooltip")
        .expect("No tooltip in stderr");
    assert_eq!(tooltip["title"], "difficulty: Easy");
    assert_eq!(tooltip["metricValue"], "5.00");
    assert_eq!(tooltip["topEntries"].as_array().unwrap().len(), 3);
}

#[test]
fn test_end_to_end_missing_data_fails() {
    let output = run_dashviz(&["sales", "--data", "test/does_not_exist.csv"], None);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does_not_exist.csv"));
}

#[test]
fn test_end_to_end_unknown_field_fails() {
    let output = run_dashviz(&["sales", "--data", "test/video_game_sales.csv", "-y", "Revenue"], None);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Revenue"));
}

#[test]
fn test_end_to_end_toggle_on_sales_fails() {
    let output = run_dashviz(&["sales", "--data", "test/video_game_sales.csv", "--select", "Action"], None);
    assert!(!output.status.success());
}

#[test]
fn test_print_config_round_trips() {
    let output = run_dashviz(&["--print-config"], None);
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let config = DashboardConfig::from_toml_str(&text).unwrap();
    assert_eq!(config, DashboardConfig::default());
}
