//! MMRP (IEEE 802.1ak Multiple MAC Registration Protocol) decoding.
//!
//! An MMRP PDU is a Protocol Version byte followed by Messages, each holding
//! Vector Attributes, each holding three-packed events. Both sequences end
//! with a two-byte End Mark instead of a count, and each Vector Attribute's
//! length is derived from its own header, so the parser walks an explicit
//! cursor through three nested loops and bounds-checks every read.
//!
//! Truncated input and records that would stall the cursor abort the frame
//! (`MmrpError`). Unknown attribute types, mismatched attribute lengths,
//! reserved leave-all values and undefined event digits are recoverable and
//! surface as `MmrpWarning`s on the decoded frame.
//!
//! Wire offsets and masks live in `layout`, bounded reads in `reader`, the
//! base-6 unpacker in `events`, field names and value strings in `schema`.

pub mod error;
pub mod events;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod schema;
pub mod writer;

pub use error::{EncodeError, MmrpError, MmrpErrorKind};
pub use events::{PackedEvents, ThreePackedEvent};
pub use layout::ETHERTYPE_MMRP;
pub use parser::{
    AttributeType, FirstValue, LeaveAllEvent, Message, MmrpFrame, MmrpWarning, VectorAttribute,
    parse_mmrp, parse_mmrp_at,
};
pub use schema::PROTOCOL_SHORT_NAME;
pub use writer::encode_mmrp;
