use std::path::PathBuf;

use assert_cmd::Command;
use mmrpshark_core::mmrp::ETHERTYPE_MMRP;
use mmrpshark_core::write_pcapng;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const VALID_PDU: [u8; 16] = [
    0x00, 0x02, 0x06, 0x00, 0x01, 0x01, 0x80, 0xC2, 0x00, 0x00, 0x20, 0x48, 0x00, 0x00, 0x00, 0x00,
];
const TRUNCATED_PDU: [u8; 16] = [
    0x01, 0x02, 0x06, 0x20, 0x04, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x4D, 0x00, 0x00, 0x00, 0x00,
];

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mmrpshark"))
}

fn ethernet(payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x01, 0x80, 0xC2, 0x00, 0x00, 0x20];
    frame.extend_from_slice(&[0x00, 0x1B, 0x21, 0x0A, 0x00, 0x01]);
    frame.extend_from_slice(&ETHERTYPE_MMRP.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

fn write_capture(temp: &TempDir, name: &str, payloads: &[&[u8]]) -> PathBuf {
    let packets: Vec<(u64, Vec<u8>)> = payloads
        .iter()
        .enumerate()
        .map(|(idx, payload)| (idx as u64 * 1_000_000, ethernet(payload)))
        .collect();
    let path = temp.path().join(name);
    std::fs::write(&path, write_pcapng(&packets)).expect("write capture");
    path
}

fn clean_capture(temp: &TempDir) -> PathBuf {
    write_capture(temp, "clean.pcapng", &[&VALID_PDU])
}

fn faulty_capture(temp: &TempDir) -> PathBuf {
    write_capture(temp, "faulty.pcapng", &[&VALID_PDU, &TRUNCATED_PDU])
}

#[test]
fn help_supports_analyse_and_analyze() {
    cmd()
        .arg("pcap")
        .arg("analyse")
        .arg("--help")
        .assert()
        .success();
    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.pcapng");
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_outputs_json() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);
    let assert = cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(report["capture_summary"]["mmrp_frames"], 1);
    assert_eq!(report["frames"][0]["protocol"], "MRP-MMRP");
    assert_eq!(report["attributes"][0]["first_value"], "01:80:c2:00:00:20");
}

#[test]
fn report_file_is_written() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyse")
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--pretty")
        .assert()
        .success()
        .stderr(contains("OK: report written"));
    let text = std::fs::read_to_string(&report).expect("report");
    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["tool"]["name"], "mmrpshark");
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("report path must differ from input"));
}

#[test]
fn glob_with_multiple_matches_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    clean_capture(&temp);
    faulty_capture(&temp);
    let pattern = temp.path().join("*.pcapng");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("multiple files match pattern"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn list_violations_outputs_ids() {
    let temp = TempDir::new().expect("tempdir");
    let input = faulty_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("--log-level")
        .arg("off")
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--list-violations")
        .assert()
        .success()
        .stderr(contains("Compliance violations:").and(contains("mrp-mmrp MS-MMRP-TRUNCATED (1)")));
}

#[test]
fn strict_fails_when_violations_present() {
    let temp = TempDir::new().expect("tempdir");
    let input = faulty_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--strict")
        .assert()
        .code(2)
        .stderr(contains("compliance violations detected"));
}

#[test]
fn strict_passes_on_clean_capture() {
    let temp = TempDir::new().expect("tempdir");
    let input = clean_capture(&temp);

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();
}

#[test]
fn decode_hex_prints_tree() {
    cmd()
        .arg("decode")
        .arg("--hex")
        .arg("00 02 06 00 01 01 80 c2 00 00 20 48 00 00 00 00")
        .assert()
        .success()
        .stdout(
            contains("Multiple Mac Registration Protocol (MRP-MMRP)")
                .and(contains("Attribute Type: MAC (2)"))
                .and(contains("Attribute Event 1: In (2)")),
        );
}

#[test]
fn decode_reports_truncation_with_offset() {
    cmd()
        .arg("decode")
        .arg("--hex")
        .arg("01 02 06 20 04 AA BB CC DD EE FF 4D 00 00 00 00")
        .assert()
        .code(2)
        .stderr(contains("decode failed: truncated").and(contains("MS-MMRP-TRUNCATED at offset 15")));
}

#[test]
fn decode_reads_payload_file_at_offset() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("payload.bin");
    let mut bytes = vec![0xFF, 0xFF];
    bytes.extend_from_slice(&VALID_PDU);
    std::fs::write(&path, bytes).expect("write payload");

    cmd()
        .arg("decode")
        .arg(&path)
        .arg("--offset")
        .arg("2")
        .assert()
        .success()
        .stdout(contains("First Value: 01:80:c2:00:00:20"));
}

#[test]
fn decode_rejects_bad_hex() {
    cmd()
        .arg("decode")
        .arg("--hex")
        .arg("0g")
        .assert()
        .code(2)
        .stderr(contains("invalid hex payload").and(contains("hint:")));
}

#[test]
fn fields_lists_schema() {
    cmd()
        .arg("fields")
        .assert()
        .success()
        .stdout(contains("mrp-mmrp.three_packed_event").and(contains("5=Lv")));

    let assert = cmd().arg("fields").arg("--json").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let fields: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(fields.as_array().map(Vec::len), Some(14));
    assert_eq!(fields[7]["mask"], 0xE000);
}
