use pe_core::domain::{EventRecord, PulseRecord};
use pe_core::modules::container::{ContainerDocument, Curve};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_input(directory: &Path, channels: usize) -> PathBuf {
    let mut document = ContainerDocument::default();
    for channel in 0..channels {
        let scale = (channel + 1) as f64;
        document.insert_curve(
            &format!("specalib/hSPE_ave_femch{channel:02}"),
            Curve::new(vec![2.0 * scale, 6.0 * scale, 2.0 * scale]),
        );
        document.insert_curve(
            &format!("specalib/hSPE_norm_femch{channel:02}"),
            Curve::new(vec![1.0, 1.0, 1.0]),
        );
    }
    let pulses = [(30.0, 0.5, 0), (50.0, 2.0, 1), (40.0, 0.2, 0), (60.0, 0.2, 1)];
    for (charge, baselinerms, opchannel) in pulses {
        document
            .push_record(
                "specalib/pulsetree",
                &PulseRecord {
                    baselinerms,
                    charge,
                    maxamp: charge / 5.0,
                    opchannel,
                },
            )
            .expect("pulse should encode");
    }
    for _ in 0..8 {
        document
            .push_record("specalib/eventtree", &EventRecord { nsamples: 1501 })
            .expect("event should encode");
    }

    let path = directory.join("calib.json");
    document.write_json(&path).expect("input should be written");
    path
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_make-pe-spectra"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("make-pe-spectra should run")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are utf-8")
}

fn read_output(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("output should be readable"))
        .expect("output should be JSON")
}

#[test]
fn spectra_command_writes_rate_histograms() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_input(temp.path(), 2);
    let output = temp.path().join("pe_spectra.json");

    let result = run_cli(&[
        "-f",
        path_arg(&input),
        "-o",
        path_arg(&output),
        "--channels",
        "2",
        "--livetime",
        "2.0",
    ]);

    assert!(
        result.status.success(),
        "command should succeed, stdout: {}",
        String::from_utf8_lossy(&result.stdout)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Make PE Spectrum"));
    assert!(stdout.contains("Accepted 3 of 4 pulses across 2 channels."));
    assert!(stdout.contains("Wrote 6 histograms"));

    let document = read_output(&output);
    assert_eq!(document["livetime_seconds"], 2.0);
    assert_eq!(document["livetime_strategy"], "override");
    let names: Vec<&str> = document["histograms"]
        .as_array()
        .expect("histogram list")
        .iter()
        .filter_map(|histogram| histogram["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "hpe_low_femch0",
            "hpe_all_femch0",
            "hpe_low_femch1",
            "hpe_all_femch1",
            "hpe_low_tot",
            "hpe_all_tot",
        ]
    );
}

#[test]
fn shortcut_livetime_is_selected_by_flag() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_input(temp.path(), 2);
    let output = temp.path().join("pe_spectra.json");

    let result = run_cli(&[
        "-f",
        path_arg(&input),
        "-o",
        path_arg(&output),
        "--channels",
        "2",
        "--livetime-mode",
        "shortcut",
        "--amplitude-spectra",
    ]);
    assert!(result.status.success());

    let document = read_output(&output);
    assert_eq!(document["livetime_strategy"], "shortcut");
    assert_eq!(document["livetime_windows"], 8);
    let seconds = document["livetime_seconds"].as_f64().expect("livetime value");
    let expected = 1500.0 * 15.625e-9 * 8.0;
    assert!((seconds - expected).abs() <= expected * 1.0e-12);
    assert_eq!(
        document["histograms"].as_array().map(Vec::len),
        Some(12),
        "amplitude family doubles the histogram count"
    );
}

#[test]
fn unrecognized_option_exits_with_configuration_code() {
    let result = run_cli(&["-f", "in.json", "-o", "out.json", "-q"]);

    assert_eq!(result.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("unrecognized option: -q"), "stdout: {stdout}");
    assert!(stdout.contains("FATAL EXIT CODE: 2"));
}

#[test]
fn missing_calibration_exits_with_calibration_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_input(temp.path(), 2);
    let output = temp.path().join("pe_spectra.json");

    let result = run_cli(&["-f", path_arg(&input), "-o", path_arg(&output), "--channels", "3"]);

    assert_eq!(result.status.code(), Some(4));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("[CALIB.MISSING]"), "stdout: {stdout}");
    assert!(stdout.contains("channel 2"));
    assert!(!output.exists(), "no output should be left behind");
}

#[test]
fn unreadable_input_exits_with_io_code() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = temp.path().join("pe_spectra.json");

    let result = run_cli(&[
        "-f",
        path_arg(&temp.path().join("absent.json")),
        "-o",
        path_arg(&output),
    ]);

    assert_eq!(result.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&result.stdout).contains("[IO.INPUT_OPEN]"));
    assert!(!output.exists());
}

#[test]
fn config_file_sets_channel_count() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = write_input(temp.path(), 1);
    let output = temp.path().join("pe_spectra.json");
    let config = temp.path().join("options.json");
    fs::write(&config, r#"{ "channel_count": 1, "livetime_override": 1.0 }"#)
        .expect("config should be written");

    let result = run_cli(&[
        "-f",
        path_arg(&input),
        "-o",
        path_arg(&output),
        "--config",
        path_arg(&config),
    ]);
    assert!(result.status.success());

    let document = read_output(&output);
    assert_eq!(document["channel_count"], 1);
    assert_eq!(document["stats"]["rejected_channel"], 2);
}
