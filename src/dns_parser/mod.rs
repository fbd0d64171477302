//! RFC 1035 message codec
//!
//! Parsing borrows from the datagram buffer; building writes into a
//! bounded buffer and reports when it runs out of room.

mod builder;
mod enums;
mod error;
pub mod header;
pub mod name;
mod parser;
mod rrdata;
mod structs;

pub use self::builder::{
    Additional, Answers, Builder, MoveTo, Nameservers, Questions, MAX_UDP_PAYLOAD,
};
pub use self::enums::{Class, Opcode, ResponseCode, Type};
pub use self::error::{Error, ErrorKind};
pub use self::header::{Header, HEADER_LEN};
pub use self::rrdata::RRData;
pub use self::structs::{write_record, write_record_ptr, Packet, Question, ResourceRecord};
