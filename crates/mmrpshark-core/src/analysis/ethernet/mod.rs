pub mod error;
pub mod parser;

pub use parser::{EthernetFrame, parse_ethernet_frame};
