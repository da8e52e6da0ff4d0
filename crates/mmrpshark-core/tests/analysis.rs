use std::fs;
use std::path::Path;

use etherparse::PacketBuilder;
use mmrpshark_core::mmrp::{
    AttributeType, ETHERTYPE_MMRP, FirstValue, LeaveAllEvent, Message, MmrpFrame,
    ThreePackedEvent, VectorAttribute, encode_mmrp,
};
use mmrpshark_core::{
    CapturedFrame, MacAddress, Report, analyze_pcap_file, analyze_source, write_pcapng,
};
use pcap_parser::Linktype;

const GROUP: [u8; 6] = [0x01, 0x80, 0xC2, 0x00, 0x00, 0x20];
const BRIDGE: [u8; 6] = [0x00, 0x1B, 0x21, 0x0A, 0x00, 0x01];

fn mac_frame(mac: [u8; 6], leave_all: bool, events: Vec<ThreePackedEvent>) -> Vec<u8> {
    let frame = MmrpFrame {
        protocol_version: 0,
        messages: vec![Message {
            offset: 0,
            attribute_type: AttributeType::Mac,
            attribute_length: 6,
            vector_attributes: vec![VectorAttribute {
                offset: 0,
                length: 0,
                leave_all_event: if leave_all {
                    LeaveAllEvent::LeaveAll
                } else {
                    LeaveAllEvent::Null
                },
                number_of_values: events.len() as u16,
                first_value: FirstValue::Mac(MacAddress::new(mac)),
                events,
            }],
            end_mark_offset: 0,
        }],
        end_mark_offset: 0,
        end: 0,
        warnings: Vec::new(),
    };
    encode_mmrp(&frame).unwrap()
}

fn ethernet(ether_type: u16, payload: &[u8], pad: bool) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&GROUP);
    frame.extend_from_slice(&BRIDGE);
    frame.extend_from_slice(&ether_type.to_be_bytes());
    frame.extend_from_slice(payload);
    if pad && frame.len() < 60 {
        frame.resize(60, 0);
    }
    frame
}

fn udp_frame() -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
        .udp(5000, 5001);
    let payload = [1, 2, 3, 4];
    let mut packet = Vec::<u8>::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, &payload).unwrap();
    packet
}

fn analyze(frames: Vec<Vec<u8>>) -> Report {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.pcapng");
    let packets: Vec<(u64, Vec<u8>)> = frames
        .into_iter()
        .enumerate()
        .map(|(idx, data)| (idx as u64 * 1_000_000, data))
        .collect();
    fs::write(&path, write_pcapng(&packets)).unwrap();
    analyze_pcap_file(&path).unwrap()
}

#[test]
fn valid_capture_reports_frames_and_attributes() {
    let report = analyze(vec![
        ethernet(
            ETHERTYPE_MMRP,
            &mac_frame(
                [0x01, 0x00, 0x5E, 0x00, 0x00, 0x01],
                true,
                vec![ThreePackedEvent::New, ThreePackedEvent::JoinIn],
            ),
            true,
        ),
        udp_frame(),
        ethernet(
            ETHERTYPE_MMRP,
            &mac_frame(
                [0x01, 0x00, 0x5E, 0x00, 0x00, 0x01],
                false,
                vec![ThreePackedEvent::JoinIn, ThreePackedEvent::In],
            ),
            true,
        ),
    ]);

    let summary = report.capture_summary.as_ref().unwrap();
    assert_eq!(summary.packets_total, 3);
    assert_eq!(summary.mmrp_frames, 2);
    assert_eq!(summary.decode_errors, 0);
    assert_eq!(summary.time_start.as_deref(), Some("1970-01-01T00:00:00Z"));
    assert_eq!(summary.time_end.as_deref(), Some("1970-01-01T00:00:02Z"));
    assert_eq!(report.generated_at, "1970-01-01T00:00:02Z");

    assert_eq!(report.frames.len(), 2);
    let first = &report.frames[0];
    assert_eq!(first.index, 0);
    assert_eq!(first.protocol, "MRP-MMRP");
    assert_eq!(first.src_mac, "00:1b:21:0a:00:01");
    assert_eq!(first.dst_mac, "01:80:c2:00:00:20");
    assert_eq!(first.trailing_bytes, 0);
    assert!(first.error.is_none());
    let attribute = &first.messages[0].vector_attributes[0];
    assert_eq!(attribute.leave_all_event, "Leave All");
    assert_eq!(attribute.events, ["New", "JoinIn"]);
    assert_eq!(report.frames[1].index, 2);

    assert_eq!(report.attributes.len(), 1);
    let totals = &report.attributes[0];
    assert_eq!(totals.attribute_type, "MAC (2)");
    assert_eq!(totals.declarations, 2);
    assert_eq!(totals.leave_all, 1);
    assert_eq!(totals.events["JoinIn"], 2);

    let compliance = &report.compliance[0];
    assert_eq!(compliance.protocol, "mrp-mmrp");
    assert_eq!(compliance.compliance_percentage, 100.0);
    assert!(compliance.violations.is_empty());
}

#[test]
fn malformed_frames_are_recorded_without_aborting() {
    let truncated = [
        0x01, 0x02, 0x06, 0x20, 0x04, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x4D, 0x00, 0x00, 0x00,
        0x00,
    ];
    let unknown_type = [
        0x00, 0x09, 0x01, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    let mut with_tail = mac_frame(GROUP, false, vec![ThreePackedEvent::Mt]);
    with_tail.extend_from_slice(&[0xDE, 0xAD]);

    let report = analyze(vec![
        ethernet(ETHERTYPE_MMRP, &truncated, false),
        ethernet(ETHERTYPE_MMRP, &unknown_type, true),
        ethernet(ETHERTYPE_MMRP, &with_tail, false),
    ]);

    let summary = report.capture_summary.as_ref().unwrap();
    assert_eq!(summary.mmrp_frames, 3);
    assert_eq!(summary.decode_errors, 1);

    let failed = &report.frames[0];
    assert!(failed.messages.is_empty());
    assert!(failed.error.as_deref().unwrap().contains("offset 15"));
    assert_eq!(report.frames[1].messages[0].attribute_type, "<Unknown> (9)");
    assert_eq!(report.frames[1].warnings.len(), 1);
    assert_eq!(report.frames[2].trailing_bytes, 2);

    let compliance = &report.compliance[0];
    assert_eq!(compliance.compliance_percentage, 0.0);
    let ids: Vec<_> = compliance.violations.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "MS-MMRP-TRUNCATED",
            "MS-MMRP-TRAILING-BYTES",
            "MS-MMRP-UNKNOWN-ATTRIBUTE-TYPE",
        ]
    );
    assert_eq!(
        compliance.violations[0].examples,
        vec![format!(
            "frame 0 @ 1970-01-01T00:00:00Z: {}",
            report.frames[0].error.as_deref().unwrap()
        )]
    );
}

#[test]
fn vlan_tagged_frames_are_decoded() {
    let payload = mac_frame(GROUP, false, vec![ThreePackedEvent::JoinMt]);
    let mut tagged = vec![0x00, 0x64];
    tagged.extend_from_slice(&ETHERTYPE_MMRP.to_be_bytes());
    tagged.extend_from_slice(&payload);

    let report = analyze(vec![ethernet(0x8100, &tagged, true)]);
    assert_eq!(report.frames.len(), 1);
    assert_eq!(report.frames[0].vlan_id, Some(100));
    assert!(report.frames[0].error.is_none());
}

#[test]
fn capture_without_mmrp_has_no_compliance_section() {
    let report = analyze(vec![udp_frame()]);
    assert_eq!(report.capture_summary.unwrap().packets_total, 1);
    assert!(report.frames.is_empty());
    assert!(report.attributes.is_empty());
    assert!(report.compliance.is_empty());
}

#[test]
fn analyze_source_accepts_in_memory_frames() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let frames = vec![
        CapturedFrame {
            index: 0,
            ts: None,
            linktype: Linktype::ETHERNET,
            data: ethernet(
                ETHERTYPE_MMRP,
                &mac_frame(GROUP, false, vec![ThreePackedEvent::New]),
                true,
            ),
        },
        CapturedFrame {
            index: 1,
            ts: None,
            linktype: Linktype::RAW,
            data: vec![0x45],
        },
    ];

    let report = analyze_source(Path::new(file.path()), frames.into_iter()).unwrap();
    let summary = report.capture_summary.as_ref().unwrap();
    assert_eq!(summary.packets_total, 2);
    assert_eq!(summary.mmrp_frames, 1);
    assert!(summary.time_start.is_none());
    assert_eq!(report.generated_at, mmrpshark_core::DEFAULT_GENERATED_AT);
    assert!(report.frames[0].ts.is_none());
}
