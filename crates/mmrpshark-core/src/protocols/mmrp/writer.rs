use super::error::EncodeError;
use super::events::{ThreePackedEvent, pack_byte};
use super::layout;
use super::parser::{Message, MmrpFrame, VectorAttribute};

/// Serialize a decoded frame back to wire bytes.
///
/// Offsets and warnings in `frame` are ignored; structure is rebuilt from the
/// field values. Padding digits in the last packed byte are written as zero;
/// the decoder does not keep them, so a PDU with non-zero padding digits
/// comes back in canonical form rather than byte for byte.
pub fn encode_mmrp(frame: &MmrpFrame) -> Result<Vec<u8>, EncodeError> {
    let mut out = vec![frame.protocol_version];
    for message in &frame.messages {
        write_message(&mut out, message)?;
    }
    out.extend_from_slice(&layout::END_MARK.to_be_bytes());
    Ok(out)
}

fn write_message(out: &mut Vec<u8>, message: &Message) -> Result<(), EncodeError> {
    let attribute_type = message.attribute_type.code();
    if attribute_type == 0 && message.attribute_length == 0 {
        return Err(EncodeError::EmptyMessageHeader);
    }
    out.push(attribute_type);
    out.push(message.attribute_length);
    for attribute in &message.vector_attributes {
        write_vector_attribute(out, message.attribute_length, attribute)?;
    }
    out.extend_from_slice(&layout::END_MARK.to_be_bytes());
    Ok(())
}

fn write_vector_attribute(
    out: &mut Vec<u8>,
    attribute_length: u8,
    attribute: &VectorAttribute,
) -> Result<(), EncodeError> {
    let count = attribute.events.len();
    if count > layout::MAX_NUMBER_OF_VALUES as usize {
        return Err(EncodeError::TooManyValues { count });
    }
    if attribute.number_of_values as usize != count {
        return Err(EncodeError::ValueCountMismatch {
            declared: attribute.number_of_values,
            actual: count,
        });
    }
    let leave_all = attribute.leave_all_event.code();
    if leave_all > (layout::LEAVE_ALL_EVENT_MASK >> layout::LEAVE_ALL_EVENT_SHIFT) as u8 {
        return Err(EncodeError::LeaveAllOutOfRange { value: leave_all });
    }

    let header = ((leave_all as u16) << layout::LEAVE_ALL_EVENT_SHIFT) | count as u16;
    if header == layout::END_MARK {
        return Err(EncodeError::EmptyVectorHeader);
    }
    out.extend_from_slice(&header.to_be_bytes());

    let first_value = attribute.first_value.to_bytes();
    if first_value.len() != attribute_length as usize {
        return Err(EncodeError::FirstValueLength {
            expected: attribute_length,
            actual: first_value.len(),
        });
    }
    out.extend_from_slice(&first_value);

    for chunk in attribute.events.chunks(layout::EVENTS_PER_BYTE) {
        let codes: Vec<u8> = chunk.iter().map(|event| event.code()).collect();
        let byte = pack_byte(&codes).ok_or_else(|| EncodeError::EventOutOfRange {
            value: chunk
                .iter()
                .copied()
                .map(ThreePackedEvent::code)
                .max()
                .unwrap_or_default(),
        })?;
        out.push(byte);
    }
    Ok(())
}
