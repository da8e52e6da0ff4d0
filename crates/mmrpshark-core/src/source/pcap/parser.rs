use std::fs::File;
use std::path::Path;

use pcap_parser::{
    Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapNGReader, traits::PcapReaderIterator,
};
use tracing::debug;

use crate::source::{CaptureSource, CapturedFrame, SourceError};

use super::error::PcapSourceError;
use super::layout;
use super::reader::{
    Interface, interface_for, is_nanosecond_magic, is_pcapng_magic, legacy_ts_to_seconds,
    pcapng_ts_to_seconds, read_magic_and_rewind, ts_units_per_second,
};

/// Frames read sequentially from a PCAP or PCAPNG file.
pub struct PcapFileSource {
    inner: PcapReader,
    next_index: u64,
}

enum PcapReader {
    Legacy {
        reader: LegacyPcapReader<File>,
        linktype: Option<Linktype>,
        nanosecond: bool,
    },
    Ng {
        reader: PcapNGReader<File>,
        interfaces: Vec<Interface>,
    },
}

impl PcapFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::from)?;
        let inner = create_reader(file).map_err(SourceError::from)?;
        Ok(Self {
            inner,
            next_index: 0,
        })
    }
}

impl CaptureSource for PcapFileSource {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, SourceError> {
        let frame = next_record(&mut self.inner).map_err(SourceError::from)?;
        Ok(frame.map(|(ts, linktype, data)| {
            let index = self.next_index;
            self.next_index += 1;
            CapturedFrame {
                index,
                ts: Some(ts),
                linktype,
                data,
            }
        }))
    }
}

fn create_reader(mut file: File) -> Result<PcapReader, PcapSourceError> {
    let magic = read_magic_and_rewind(&mut file)?;

    if is_pcapng_magic(&magic) {
        let reader = PcapNGReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
            PcapSourceError::Pcap {
                context: "pcapng reader init",
                message: e.to_string(),
            }
        })?;
        Ok(PcapReader::Ng {
            reader,
            interfaces: Vec::new(),
        })
    } else {
        let reader = LegacyPcapReader::new(layout::PCAP_READER_BUFFER_SIZE, file).map_err(|e| {
            PcapSourceError::Pcap {
                context: "pcap reader init",
                message: e.to_string(),
            }
        })?;
        Ok(PcapReader::Legacy {
            reader,
            linktype: None,
            nanosecond: false,
        })
    }
}

type Record = (f64, Linktype, Vec<u8>);

fn next_record(reader: &mut PcapReader) -> Result<Option<Record>, PcapSourceError> {
    loop {
        match reader {
            PcapReader::Legacy {
                reader,
                linktype,
                nanosecond,
            } => match reader.next() {
                Ok((offset, block)) => {
                    let record = match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            *linktype = Some(header.network);
                            *nanosecond = is_nanosecond_magic(header.magic_number);
                            debug!(
                                linktype = header.network.0,
                                nanosecond = *nanosecond,
                                "pcap header"
                            );
                            None
                        }
                        PcapBlockOwned::Legacy(packet) => Some((
                            legacy_ts_to_seconds(packet.ts_sec, packet.ts_usec, *nanosecond),
                            linktype.unwrap_or(Linktype::ETHERNET),
                            packet.data.to_vec(),
                        )),
                        _ => None,
                    };
                    reader.consume(offset);
                    if record.is_some() {
                        return Ok(record);
                    }
                }
                Err(pcap_parser::PcapError::Eof) => return Ok(None),
                Err(pcap_parser::PcapError::Incomplete(_)) => {
                    reader.refill().map_err(|e| PcapSourceError::Pcap {
                        context: "pcap reader refill",
                        message: e.to_string(),
                    })?;
                }
                Err(e) => {
                    return Err(PcapSourceError::Pcap {
                        context: "pcap reader next",
                        message: e.to_string(),
                    });
                }
            },
            PcapReader::Ng { reader, interfaces } => match reader.next() {
                Ok((offset, block)) => {
                    let record = match block {
                        PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                            // Interface ids restart with every section.
                            interfaces.clear();
                            None
                        }
                        PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                            let interface = Interface {
                                linktype: intf.linktype,
                                units_per_second: ts_units_per_second(intf.if_tsresol),
                            };
                            debug!(
                                id = interfaces.len(),
                                linktype = interface.linktype.0,
                                units_per_second = interface.units_per_second,
                                "pcapng interface"
                            );
                            interfaces.push(interface);
                            None
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => {
                            let interface = interface_for(interfaces, packet.if_id);
                            let caplen = (packet.caplen as usize).min(packet.data.len());
                            Some((
                                pcapng_ts_to_seconds(
                                    packet.ts_high,
                                    packet.ts_low,
                                    interface.units_per_second,
                                ),
                                interface.linktype,
                                packet.data[..caplen].to_vec(),
                            ))
                        }
                        _ => None,
                    };
                    reader.consume(offset);
                    if record.is_some() {
                        return Ok(record);
                    }
                }
                Err(pcap_parser::PcapError::Eof) => return Ok(None),
                Err(pcap_parser::PcapError::Incomplete(_)) => {
                    reader.refill().map_err(|e| PcapSourceError::Pcap {
                        context: "pcapng reader refill",
                        message: e.to_string(),
                    })?;
                }
                Err(e) => {
                    return Err(PcapSourceError::Pcap {
                        context: "pcapng reader next",
                        message: e.to_string(),
                    });
                }
            },
        }
    }
}
