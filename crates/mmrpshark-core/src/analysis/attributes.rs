use std::collections::BTreeMap;

use crate::AttributeSummary;
use crate::mmrp::{LeaveAllEvent, MmrpFrame};

/// Attribute type code plus raw first value; orders summaries on the wire
/// encoding rather than on labels.
pub(crate) type AttributeKey = (u8, Vec<u8>);

#[derive(Debug, Default)]
pub(crate) struct AttributeStats {
    pub attribute_type: String,
    pub first_value: String,
    pub declarations: u64,
    pub leave_all: u64,
    pub events: BTreeMap<String, u64>,
}

pub(crate) fn add_frame_attributes(
    stats: &mut BTreeMap<AttributeKey, AttributeStats>,
    frame: &MmrpFrame,
) {
    for (message, attribute) in frame.vector_attributes() {
        let key = (
            message.attribute_type.code(),
            attribute.first_value.to_bytes(),
        );
        let entry = stats.entry(key).or_insert_with(|| AttributeStats {
            attribute_type: message.attribute_type.to_string(),
            first_value: attribute.first_value.to_string(),
            ..AttributeStats::default()
        });
        entry.declarations += 1;
        if attribute.leave_all_event == LeaveAllEvent::LeaveAll {
            entry.leave_all += 1;
        }
        for event in &attribute.events {
            *entry.events.entry(event.to_string()).or_default() += 1;
        }
    }
}

pub(crate) fn build_attribute_summaries(
    stats: BTreeMap<AttributeKey, AttributeStats>,
) -> Vec<AttributeSummary> {
    stats
        .into_values()
        .map(|stats| AttributeSummary {
            attribute_type: stats.attribute_type,
            first_value: stats.first_value,
            declarations: stats.declarations,
            leave_all: stats.leave_all,
            events: stats.events,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmrp::parse_mmrp;

    #[test]
    fn aggregates_by_type_and_first_value() {
        let payload = [
            0x00, // version
            0x02, 0x06, // MAC
            0x20, 0x01, 0x01, 0x80, 0xC2, 0x00, 0x00, 0x20, 0x24, // LeaveAll, JoinIn
            0x00, 0x01, 0x01, 0x00, 0x5E, 0x00, 0x00, 0x01, 0x48, // In
            0x00, 0x01, 0x01, 0x80, 0xC2, 0x00, 0x00, 0x20, 0x48, // In
            0x00, 0x00, // end of attributes
            0x01, 0x01, // service requirement
            0x00, 0x01, 0x01, 0x6C, // JoinMt
            0x00, 0x00, 0x00, 0x00,
        ];
        let frame = parse_mmrp(&payload).unwrap();
        let mut stats = BTreeMap::new();
        add_frame_attributes(&mut stats, &frame);
        let summaries = build_attribute_summaries(stats);

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].attribute_type, "Service Requirement (1)");
        assert_eq!(summaries[0].first_value, "Forward Unregistered Groups (1)");
        assert_eq!(summaries[0].events["JoinMt"], 1);

        assert_eq!(summaries[1].first_value, "01:00:5e:00:00:01");
        assert_eq!(summaries[2].first_value, "01:80:c2:00:00:20");
        assert_eq!(summaries[2].declarations, 2);
        assert_eq!(summaries[2].leave_all, 1);
        assert_eq!(summaries[2].events["JoinIn"], 1);
        assert_eq!(summaries[2].events["In"], 1);
    }
}
