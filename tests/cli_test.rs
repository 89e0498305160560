// tests/cli_test.rs
//
// Runs the rawcheckr binary against generated files.

mod test_utils;

use std::fs;
use std::process::Command;

use rawcheckr::Endianness;
use test_utils::{i16_bytes, tones_i16, TempDir, PROGRAM_TONES};

fn rawcheckr() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rawcheckr"))
}

fn write_program(dir: &TempDir, name: &str, endianness: Endianness) {
    let samples = tones_i16(96000, PROGRAM_TONES, 11);
    fs::write(dir.path().join(name), i16_bytes(&samples, endianness)).unwrap();
}

#[test]
fn test_json_output_for_directory() {
    let dir = TempDir::new();
    write_program(&dir, "a.raw", Endianness::Little);
    write_program(&dir, "b.pcm", Endianness::Big);
    fs::write(dir.path().join("notes.txt"), "not audio").unwrap();

    let output = rawcheckr()
        .arg("--json")
        .arg(dir.path())
        .output()
        .expect("Failed to run rawcheckr");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);

    assert!(reports[0]["path"].as_str().unwrap().ends_with("a.raw"));
    assert_eq!(reports[0]["result"]["format"], "int16");
    assert_eq!(reports[0]["result"]["endianness"], "little");
    assert_eq!(reports[0]["result"]["channels"], 1);

    assert!(reports[1]["path"].as_str().unwrap().ends_with("b.pcm"));
    assert_eq!(reports[1]["result"]["endianness"], "big");
}

#[test]
fn test_export_wav() {
    let dir = TempDir::new();
    let out = TempDir::new();
    write_program(&dir, "tone.raw", Endianness::Big);

    let status = rawcheckr()
        .arg(dir.path().join("tone.raw"))
        .arg("--export-wav")
        .arg(out.path())
        .arg("--sample-rate")
        .arg("48000")
        .status()
        .expect("Failed to run rawcheckr");
    assert!(status.success());

    let reader = hound::WavReader::open(out.path().join("tone.raw.wav")).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 96000);
}

#[test]
fn test_dump_signals_writes_every_hypothesis() {
    let dir = TempDir::new();
    let dump = TempDir::new();
    write_program(&dir, "tone.raw", Endianness::Little);

    let status = rawcheckr()
        .arg(dir.path().join("tone.raw"))
        .arg("--dump-signals")
        .arg(dump.path())
        .status()
        .expect("Failed to run rawcheckr");
    assert!(status.success());

    // 10 hypotheses, mono and stereo, 1024 f32 samples each
    let dumped = fs::metadata(dump.path().join("tone.raw.sig")).unwrap();
    assert_eq!(dumped.len(), 2 * 10 * 1024 * 4);
}

#[test]
fn test_missing_input_fails() {
    let output = rawcheckr()
        .arg("/no/such/input.raw")
        .output()
        .expect("Failed to run rawcheckr");
    assert!(!output.status.success());
}
