use clap::Parser;
use naive_bayes_ttt::{
    Dataset,
    cli::commands::{
        decide::{self, DecideArgs},
        fit::{self, FitArgs},
        generate::{self, GenerateArgs},
    },
};
use tempfile::tempdir;

#[test]
fn generate_writes_a_loadable_training_set() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("games.json");

    let args = GenerateArgs::parse_from([
        "nbttt-generate",
        "--games",
        "12",
        "--policy",
        "greedy",
        "--seed",
        "5",
        "--output",
        data.to_str().unwrap(),
    ]);
    generate::execute(args).expect("generation should succeed");

    let dataset = Dataset::from_json_file(&data).unwrap();
    assert_eq!(dataset.len(), 12);
}

#[test]
fn fit_writes_trace_exports_and_summary() {
    let tmp = tempdir().unwrap();
    let csv = tmp.path().join("trace.csv");
    let svg = tmp.path().join("trace.svg");
    let summary = tmp.path().join("summary.json");

    let args = FitArgs::parse_from([
        "nbttt-fit",
        "--seed",
        "3",
        "--samples",
        "400",
        "--burn-in",
        "100",
        "--leapfrog-steps",
        "5",
        "--no-progress",
        "--plot-columns",
        "4",
        "--trace-csv",
        csv.to_str().unwrap(),
        "--trace-plot",
        svg.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
    ]);
    fit::execute(args).expect("fit should succeed");

    let mut reader = csv::Reader::from_path(&csv).unwrap();
    assert_eq!(reader.headers().unwrap().len(), 13);
    assert_eq!(reader.records().count(), 300);

    let plot = std::fs::read_to_string(&svg).unwrap();
    assert!(plot.contains("<svg") && plot.trim_end().ends_with("</svg>"));
    assert!(plot.contains("width=\"1400\""));

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(parsed["games"], 2);
    assert_eq!(parsed["diagnostics"]["retained"], 300);
    assert_eq!(parsed["parameters"].as_array().unwrap().len(), 12);
}

#[test]
fn fit_reads_settings_from_a_config_file() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("config.json");
    std::fs::write(&config, r#"{"samples": 300, "burn_in": 50, "seed": 9}"#).unwrap();
    let summary = tmp.path().join("summary.json");

    let args = FitArgs::parse_from([
        "nbttt-fit",
        "--config",
        config.to_str().unwrap(),
        "--no-progress",
        "--summary",
        summary.to_str().unwrap(),
    ]);
    fit::execute(args).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(parsed["diagnostics"]["iterations"], 300);
    assert_eq!(parsed["diagnostics"]["burn_in"], 50);
}

#[test]
fn invalid_flag_overrides_are_rejected() {
    let args = FitArgs::parse_from([
        "nbttt-fit",
        "--samples",
        "100",
        "--burn-in",
        "100",
        "--no-progress",
    ]);
    let err = fit::execute(args).unwrap_err();
    assert!(err.to_string().contains("burn-in"));
}

#[test]
fn decide_plays_the_smoke_test_board() {
    let args = DecideArgs::parse_from([
        "nbttt-decide",
        "--board",
        "OO.OXXOXX",
        "--player",
        "o",
        "--source",
        "map",
        "--seed",
        "1",
        "--samples",
        "200",
        "--burn-in",
        "50",
        "--no-progress",
    ]);
    decide::execute(args).expect("decision should succeed");
}

#[test]
fn decide_rejects_a_full_board_before_fitting() {
    let args = DecideArgs::parse_from([
        "nbttt-decide",
        "--board",
        "XOXXOOOXX",
        "--player",
        "x",
        "--no-progress",
    ]);
    let err = decide::execute(args).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<naive_bayes_ttt::Error>(),
        Some(naive_bayes_ttt::Error::NoLegalMove)
    ));
}
