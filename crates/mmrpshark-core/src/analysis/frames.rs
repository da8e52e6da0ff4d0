use crate::mmrp::{MmrpError, MmrpFrame, schema};
use crate::{FrameSummary, MessageSummary, VectorAttributeSummary};

use super::ethernet::EthernetFrame;
use super::ts_to_rfc3339;

/// Length of the region after the closing End Mark, or zero when it is all
/// zero bytes (Ethernet minimum-size padding).
pub(crate) fn significant_trailing_len(frame: &MmrpFrame, payload: &[u8]) -> usize {
    let trailing = payload.get(frame.end..).unwrap_or_default();
    if trailing.iter().all(|byte| *byte == 0) {
        0
    } else {
        trailing.len()
    }
}

pub(crate) fn decoded_frame_summary(
    index: u64,
    ts: Option<f64>,
    eth: &EthernetFrame<'_>,
    frame: &MmrpFrame,
    trailing: usize,
) -> FrameSummary {
    let messages = frame
        .messages
        .iter()
        .map(|message| MessageSummary {
            offset: message.offset,
            attribute_type: message.attribute_type.to_string(),
            attribute_length: message.attribute_length,
            vector_attributes: message
                .vector_attributes
                .iter()
                .map(|attribute| VectorAttributeSummary {
                    offset: attribute.offset,
                    leave_all_event: attribute.leave_all_event.to_string(),
                    number_of_values: attribute.number_of_values,
                    first_value: attribute.first_value.to_string(),
                    events: attribute.events.iter().map(ToString::to_string).collect(),
                })
                .collect(),
        })
        .collect();

    FrameSummary {
        protocol_version: Some(frame.protocol_version),
        messages,
        trailing_bytes: trailing as u64,
        warnings: frame.warnings.iter().map(ToString::to_string).collect(),
        ..base_summary(index, ts, eth)
    }
}

pub(crate) fn failed_frame_summary(
    index: u64,
    ts: Option<f64>,
    eth: &EthernetFrame<'_>,
    err: &MmrpError,
) -> FrameSummary {
    FrameSummary {
        error: Some(err.to_string()),
        ..base_summary(index, ts, eth)
    }
}

fn base_summary(index: u64, ts: Option<f64>, eth: &EthernetFrame<'_>) -> FrameSummary {
    FrameSummary {
        index,
        ts: ts_to_rfc3339(ts),
        src_mac: eth.source.to_string(),
        dst_mac: eth.destination.to_string(),
        vlan_id: eth.vlan_id,
        protocol: schema::PROTOCOL_SHORT_NAME.to_string(),
        info: schema::PROTOCOL_NAME.to_string(),
        protocol_version: None,
        messages: Vec::new(),
        trailing_bytes: 0,
        warnings: Vec::new(),
        error: None,
    }
}
