use std::fs;
use std::path::{Path, PathBuf};

use mmrpshark_core::MacAddress;
use mmrpshark_core::mmrp::{
    AttributeType, ETHERTYPE_MMRP, FirstValue, LeaveAllEvent, Message, MmrpFrame,
    ThreePackedEvent, VectorAttribute, encode_mmrp,
};
use mmrpshark_core::write_pcapng;

const MMRP_GROUP: [u8; 6] = [0x01, 0x80, 0xC2, 0x00, 0x00, 0x20];
const BRIDGE_A: [u8; 6] = [0x00, 0x1B, 0x21, 0x0A, 0x00, 0x01];
const BRIDGE_B: [u8; 6] = [0x00, 0x1B, 0x21, 0x0A, 0x00, 0x02];
const ETHERNET_MIN_FRAME: usize = 60;
const USEC_PER_SEC: u64 = 1_000_000;

fn main() -> Result<(), String> {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target").join("mmrp-fixtures"));
    fs::create_dir_all(&root)
        .map_err(|err| format!("failed to create {}: {}", root.display(), err))?;

    write_capture(&root.join("mmrp_join.pcapng"), &join_frames()?)?;
    write_capture(&root.join("mmrp_malformed.pcapng"), &malformed_frames()?)?;
    Ok(())
}

fn join_frames() -> Result<Vec<Vec<u8>>, String> {
    let declare = frame(vec![
        mac_message(vec![(
            LeaveAllEvent::LeaveAll,
            [0x01, 0x00, 0x5E, 0x00, 0x00, 0x01],
            vec![ThreePackedEvent::New, ThreePackedEvent::JoinIn],
        )]),
        service_message(1, vec![ThreePackedEvent::JoinMt]),
    ]);
    let refresh = frame(vec![mac_message(vec![(
        LeaveAllEvent::Null,
        [0x01, 0x00, 0x5E, 0x00, 0x00, 0x01],
        vec![ThreePackedEvent::In, ThreePackedEvent::JoinIn],
    )])]);
    let leave = frame(vec![mac_message(vec![(
        LeaveAllEvent::Null,
        [0x01, 0x00, 0x5E, 0x00, 0x00, 0x02],
        vec![ThreePackedEvent::Lv],
    )])]);

    Ok(vec![
        ethernet(BRIDGE_A, &encode(&declare)?),
        ethernet(BRIDGE_B, &encode(&refresh)?),
        ethernet(BRIDGE_A, &encode(&leave)?),
    ])
}

fn malformed_frames() -> Result<Vec<Vec<u8>>, String> {
    let valid = encode(&frame(vec![service_message(0, vec![ThreePackedEvent::Mt])]))?;
    // Attribute type 9 is not defined for MMRP.
    let unknown_type = vec![
        0x00, 0x09, 0x01, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    // Header announces 2080 values; the packed events are cut short.
    let truncated = vec![
        0x01, 0x02, 0x06, 0x08, 0x20, 0x04, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x4D, 0x00,
        0x00, 0x00, 0x00,
    ];
    Ok(vec![
        ethernet(BRIDGE_A, &valid),
        ethernet(BRIDGE_B, &unknown_type),
        ethernet_unpadded(BRIDGE_A, &truncated),
    ])
}

fn frame(messages: Vec<Message>) -> MmrpFrame {
    MmrpFrame {
        protocol_version: 0,
        messages,
        end_mark_offset: 0,
        end: 0,
        warnings: Vec::new(),
    }
}

fn mac_message(attributes: Vec<(LeaveAllEvent, [u8; 6], Vec<ThreePackedEvent>)>) -> Message {
    Message {
        offset: 0,
        attribute_type: AttributeType::Mac,
        attribute_length: 6,
        vector_attributes: attributes
            .into_iter()
            .map(|(leave_all_event, mac, events)| {
                vector_attribute(leave_all_event, FirstValue::Mac(MacAddress::new(mac)), events)
            })
            .collect(),
        end_mark_offset: 0,
    }
}

fn service_message(requirement: u8, events: Vec<ThreePackedEvent>) -> Message {
    Message {
        offset: 0,
        attribute_type: AttributeType::ServiceRequirement,
        attribute_length: 1,
        vector_attributes: vec![vector_attribute(
            LeaveAllEvent::Null,
            FirstValue::ServiceRequirement(requirement),
            events,
        )],
        end_mark_offset: 0,
    }
}

fn vector_attribute(
    leave_all_event: LeaveAllEvent,
    first_value: FirstValue,
    events: Vec<ThreePackedEvent>,
) -> VectorAttribute {
    VectorAttribute {
        offset: 0,
        length: 0,
        leave_all_event,
        number_of_values: events.len() as u16,
        first_value,
        events,
    }
}

fn encode(frame: &MmrpFrame) -> Result<Vec<u8>, String> {
    encode_mmrp(frame).map_err(|err| format!("failed to encode MMRP frame: {err}"))
}

fn ethernet(source: [u8; 6], payload: &[u8]) -> Vec<u8> {
    let mut frame = ethernet_unpadded(source, payload);
    if frame.len() < ETHERNET_MIN_FRAME {
        frame.resize(ETHERNET_MIN_FRAME, 0);
    }
    frame
}

fn ethernet_unpadded(source: [u8; 6], payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(14 + payload.len());
    frame.extend_from_slice(&MMRP_GROUP);
    frame.extend_from_slice(&source);
    frame.extend_from_slice(&ETHERTYPE_MMRP.to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

fn write_capture(path: &Path, frames: &[Vec<u8>]) -> Result<(), String> {
    let packets: Vec<(u64, Vec<u8>)> = frames
        .iter()
        .enumerate()
        .map(|(idx, data)| ((idx as u64) * USEC_PER_SEC, data.clone()))
        .collect();
    fs::write(path, write_pcapng(&packets))
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    println!("wrote {}", path.display());
    Ok(())
}
