use etherparse::{EtherType, Ethernet2Slice, SingleVlanSlice};
use pcap_parser::Linktype;

use crate::protocols::common::MacAddress;

use super::error::EthernetError;

/// Ethernet II frame with at most one 802.1Q tag stripped.
pub struct EthernetFrame<'a> {
    pub source: MacAddress,
    pub destination: MacAddress,
    pub vlan_id: Option<u16>,
    pub ether_type: u16,
    pub payload: &'a [u8],
}

impl EthernetFrame<'_> {
    pub fn is_ether_type(&self, ether_type: u16) -> bool {
        self.ether_type == ether_type
    }
}

/// Slice an Ethernet II frame from a link-layer capture record.
///
/// Returns `Ok(None)` when the capture linktype is not Ethernet. Captured
/// frames carry no FCS.
pub fn parse_ethernet_frame(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<EthernetFrame<'_>>, EthernetError> {
    if linktype != Linktype::ETHERNET {
        return Ok(None);
    }
    let eth = Ethernet2Slice::from_slice_without_fcs(data)
        .map_err(|e| EthernetError::Slice(e.to_string()))?;

    let mut ether_type = eth.ether_type();
    let mut payload = eth.payload_slice();
    let mut vlan_id = None;
    if ether_type == EtherType::VLAN_TAGGED_FRAME {
        let vlan =
            SingleVlanSlice::from_slice(payload).map_err(|e| EthernetError::Vlan(e.to_string()))?;
        vlan_id = Some(vlan.vlan_identifier().value());
        ether_type = vlan.ether_type();
        payload = vlan.payload_slice();
    }

    Ok(Some(EthernetFrame {
        source: MacAddress::new(eth.source()),
        destination: MacAddress::new(eth.destination()),
        vlan_id,
        ether_type: ether_type.0,
        payload,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::mmrp::ETHERTYPE_MMRP;

    const SRC: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
    const DST: [u8; 6] = [0x01, 0x80, 0xC2, 0x00, 0x00, 0x20];

    fn frame(ether_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.extend_from_slice(&DST);
        frame.extend_from_slice(&SRC);
        frame.extend_from_slice(&ether_type.to_be_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn untagged_mmrp_frame() {
        let data = frame(ETHERTYPE_MMRP, &[0x00, 0x00, 0x00]);
        let eth = parse_ethernet_frame(Linktype::ETHERNET, &data)
            .unwrap()
            .unwrap();
        assert!(eth.is_ether_type(ETHERTYPE_MMRP));
        assert_eq!(eth.source, MacAddress::new(SRC));
        assert_eq!(eth.destination, MacAddress::new(DST));
        assert_eq!(eth.vlan_id, None);
        assert_eq!(eth.payload, &[0x00, 0x00, 0x00]);
    }

    #[test]
    fn single_vlan_tag_is_stripped() {
        let mut tagged = vec![0x20, 0x0A];
        tagged.extend_from_slice(&ETHERTYPE_MMRP.to_be_bytes());
        tagged.extend_from_slice(&[0x00, 0x00, 0x00]);
        let data = frame(0x8100, &tagged);
        let eth = parse_ethernet_frame(Linktype::ETHERNET, &data)
            .unwrap()
            .unwrap();
        assert_eq!(eth.vlan_id, Some(10));
        assert!(eth.is_ether_type(ETHERTYPE_MMRP));
        assert_eq!(eth.payload, &[0x00, 0x00, 0x00]);
    }

    #[test]
    fn vlan_id_ignores_priority_and_dei_bits() {
        // PCP 7, DEI set, VID 0x00A
        let mut tagged = vec![0xF0, 0x0A];
        tagged.extend_from_slice(&ETHERTYPE_MMRP.to_be_bytes());
        tagged.extend_from_slice(&[0x00, 0x00, 0x00]);
        let data = frame(0x8100, &tagged);
        let eth = parse_ethernet_frame(Linktype::ETHERNET, &data)
            .unwrap()
            .unwrap();
        assert_eq!(eth.vlan_id, Some(10));
    }

    #[test]
    fn other_linktypes_are_skipped() {
        let data = frame(ETHERTYPE_MMRP, &[0x00]);
        assert!(parse_ethernet_frame(Linktype::RAW, &data).unwrap().is_none());
    }

    #[test]
    fn short_frame_is_an_error() {
        let result = parse_ethernet_frame(Linktype::ETHERNET, &[0x01, 0x02]);
        assert!(matches!(result, Err(EthernetError::Slice(_))));
    }

    #[test]
    fn truncated_vlan_tag_is_an_error() {
        let data = frame(0x8100, &[0x00]);
        let result = parse_ethernet_frame(Linktype::ETHERNET, &data);
        assert!(matches!(result, Err(EthernetError::Vlan(_))));
    }
}
