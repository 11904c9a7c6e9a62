use pe_core::common::config::{LivetimeMode, Options};
use pe_core::domain::{EventRecord, PulseRecord, SpectraErrorCategory, SpectraRequest};
use pe_core::modules::build_rate_spectra;
use pe_core::modules::container::{ContainerDocument, Curve};
use pe_core::modules::run_pe_spectra;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two channels whose normalized SPE curves integrate to 10 and 20.
fn two_channel_document() -> ContainerDocument {
    let mut document = ContainerDocument::default();
    document.insert_curve("specalib/hSPE_ave_femch00", Curve::new(vec![2.0, 6.0, 2.0]));
    document.insert_curve("specalib/hSPE_norm_femch00", Curve::new(vec![1.0, 1.0, 1.0]));
    document.insert_curve("specalib/hSPE_ave_femch01", Curve::new(vec![8.0, 24.0, 8.0]));
    document.insert_curve("specalib/hSPE_norm_femch01", Curve::new(vec![2.0, 2.0, 2.0]));

    let pulses = [
        PulseRecord {
            baselinerms: 0.5,
            charge: 30.0,
            maxamp: 6.0,
            opchannel: 0,
        },
        PulseRecord {
            baselinerms: 2.0,
            charge: 50.0,
            maxamp: 12.0,
            opchannel: 1,
        },
        PulseRecord {
            baselinerms: 0.2,
            charge: 40.0,
            maxamp: 12.0,
            opchannel: 0,
        },
    ];
    for pulse in &pulses {
        document
            .push_record("specalib/pulsetree", pulse)
            .expect("pulse should encode");
    }
    for nsamples in [1501, 1501, 1501] {
        document
            .push_record("specalib/eventtree", &EventRecord { nsamples })
            .expect("event should encode");
    }
    document
}

fn two_channel_options() -> Options {
    Options {
        channel_count: 2,
        rms_max: 1.0,
        ..Options::default()
    }
}

fn write_input(directory: &Path, document: &ContainerDocument) -> PathBuf {
    let path = directory.join("input.json");
    document.write_json(&path).expect("input should be written");
    path
}

fn histogram<'a>(document: &'a Value, name: &str) -> &'a Value {
    document["histograms"]
        .as_array()
        .expect("histogram list")
        .iter()
        .find(|histogram| histogram["name"] == name)
        .unwrap_or_else(|| panic!("histogram '{name}' should be written"))
}

fn integral(histogram: &Value) -> f64 {
    histogram["contents"]
        .as_array()
        .expect("contents array")
        .iter()
        .filter_map(Value::as_f64)
        .sum()
}

#[test]
fn rms_cut_scenario_fills_channel_zero_only() {
    let options = Options {
        livetime_override: Some(1.0e-3),
        ..two_channel_options()
    };
    let rates = build_rate_spectra(&two_channel_document(), &options).expect("pipeline succeeds");

    let channel0 = rates.charge.channel(0).expect("channel 0 exists");
    let channel1 = rates.charge.channel(1).expect("channel 1 exists");
    // factor 1e-3 / 1e-3 = 1 leaves raw counts in place
    assert_eq!(rates.channel_factor, 1.0);
    assert_eq!(channel0.low.integral(), 2.0);
    assert_eq!(channel0.low.entries(), 2);
    assert_eq!(channel1.low.entries(), 0);
    assert_eq!(channel1.all.entries(), 0);

    // low binning is 0.5 PE wide: 3.0 PE lands in bin 6 and 4.0 PE in bin 8
    let contents = channel0.low.bin_contents();
    assert_eq!(contents[6], 1.0);
    assert_eq!(contents[8], 1.0);
    assert_eq!(rates.stats.rejected_quality, 1);
}

#[test]
fn forced_livetime_ignores_event_table() {
    let mut document = two_channel_document();
    document
        .directories
        .get_mut("specalib")
        .expect("directory exists")
        .tables
        .remove("eventtree");
    let options = Options {
        livetime_override: Some(100.0),
        ..two_channel_options()
    };

    let rates = build_rate_spectra(&document, &options).expect("pipeline succeeds");
    assert_eq!(rates.livetime.seconds, 100.0);
    assert_eq!(rates.livetime.windows, None);
}

#[test]
fn full_scan_and_shortcut_agree_on_uniform_windows() {
    let document = two_channel_document();
    let scan = build_rate_spectra(&document, &two_channel_options()).expect("scan succeeds");
    let shortcut = build_rate_spectra(
        &document,
        &Options {
            livetime_mode: LivetimeMode::Shortcut,
            ..two_channel_options()
        },
    )
    .expect("shortcut succeeds");

    let expected = 1500.0 * 15.625e-9 * 3.0;
    assert!((scan.livetime.seconds - expected).abs() <= expected * 1.0e-12);
    assert!((shortcut.livetime.seconds - expected).abs() <= expected * 1.0e-12);
}

#[test]
fn end_to_end_run_writes_rate_histograms() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input_path = write_input(temp.path(), &two_channel_document());
    let output_path = temp.path().join("spectra.json");
    let options = Options {
        livetime_override: Some(4.0),
        ..two_channel_options()
    };

    let summary = run_pe_spectra(&SpectraRequest::new(&input_path, &output_path), &options)
        .expect("run succeeds");
    assert_eq!(summary.channels, 2);
    assert_eq!(summary.histograms_written, 6);
    assert_eq!(summary.stats.accepted, 2);

    let document: Value =
        serde_json::from_str(&fs::read_to_string(&output_path).expect("output readable"))
            .expect("output is JSON");
    let low0 = histogram(&document, "hpe_low_femch0");
    assert!((integral(low0) - 2.0 * 1.0e-3 / 4.0).abs() < 1.0e-15);
    assert_eq!(low0["y_label"], "rate (kHz)");

    let low_total = histogram(&document, "hpe_low_tot");
    assert!((integral(low_total) - 2.0 * 1.0e-3 / (2.0 * 4.0)).abs() < 1.0e-15);
    assert_eq!(integral(histogram(&document, "hpe_all_femch1")), 0.0);
    assert_eq!(document["livetime_strategy"], "override");
}

#[test]
fn missing_calibration_aborts_without_output() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut document = two_channel_document();
    document
        .directories
        .get_mut("specalib")
        .expect("directory exists")
        .curves
        .remove("hSPE_ave_femch01");
    let input_path = write_input(temp.path(), &document);
    let output_path = temp.path().join("spectra.json");

    let error = run_pe_spectra(
        &SpectraRequest::new(&input_path, &output_path),
        &two_channel_options(),
    )
    .expect_err("channel 1 calibration is missing");
    assert_eq!(error.category(), SpectraErrorCategory::CalibrationError);
    assert_eq!(error.channel(), Some(1));
    assert!(!output_path.exists());
    assert_eq!(
        fs::read_dir(temp.path()).expect("dir readable").count(),
        1,
        "only the input file should remain"
    );
}

#[test]
fn zero_livetime_is_fatal() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut document = two_channel_document();
    document.insert_table("specalib/eventtree", Vec::new());
    let input_path = write_input(temp.path(), &document);
    let output_path = temp.path().join("spectra.json");

    let error = run_pe_spectra(
        &SpectraRequest::new(&input_path, &output_path),
        &two_channel_options(),
    )
    .expect_err("empty event table gives zero livetime");
    assert_eq!(error.code(), "CONFIG.INVALID_LIVETIME");
    assert!(!output_path.exists());
}
