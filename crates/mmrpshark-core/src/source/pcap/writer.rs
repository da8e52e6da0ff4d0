use super::layout;

/// Build a big-endian PCAPNG capture with one Ethernet interface.
///
/// Each packet is `(timestamp in microseconds, frame bytes)`. Frames are
/// recorded untruncated.
pub fn write_pcapng(packets: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let mut output = Vec::new();
    output.extend_from_slice(&block(layout::BLOCK_SECTION_HEADER, &section_header_body()));
    output.extend_from_slice(&block(
        layout::BLOCK_INTERFACE_DESCRIPTION,
        &interface_description_body(),
    ));
    for (ts_us, data) in packets {
        output.extend_from_slice(&block(
            layout::BLOCK_ENHANCED_PACKET,
            &enhanced_packet_body(*ts_us, data),
        ));
    }
    output
}

fn block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (layout::BLOCK_FRAMING_LEN + body.len()) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&layout::BYTE_ORDER_MAGIC.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    // Section length unknown.
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_description_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&layout::LINKTYPE_ETHERNET.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&layout::DEFAULT_SNAPLEN.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let ts_high = (ts_us >> 32) as u32;
    let ts_low = (ts_us & 0xFFFF_FFFF) as u32;
    let cap_len = data.len() as u32;
    let mut body = Vec::new();
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&ts_high.to_be_bytes());
    body.extend_from_slice(&ts_low.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    let pad_len = (4 - (data.len() % 4)) % 4;
    body.resize(body.len() + pad_len, 0);
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_padded_to_four_bytes() {
        let bytes = write_pcapng(&[(1, vec![0xAA; 5])]);
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(&bytes[..4], &layout::PCAPNG_MAGIC);
    }

    #[test]
    fn enhanced_packet_records_split_timestamp() {
        let bytes = write_pcapng(&[((1u64 << 32) | 7, vec![0x01])]);
        // SHB (28) + IDB (20), then EPB header.
        let epb = &bytes[48..];
        assert_eq!(&epb[..4], &layout::BLOCK_ENHANCED_PACKET.to_be_bytes());
        assert_eq!(&epb[12..16], &1u32.to_be_bytes());
        assert_eq!(&epb[16..20], &7u32.to_be_bytes());
        assert_eq!(epb.len(), 12 + 20 + 4);
    }
}
