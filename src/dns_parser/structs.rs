use std::fmt;
use std::net::Ipv4Addr;

use byteorder::{BigEndian, ByteOrder};

use super::{name, Class, Error, Header, RRData, Type};

/// Parsed DNS packet
///
/// Resource records borrow the buffer the packet was parsed from.
#[derive(Debug)]
pub struct Packet<'a> {
    pub header: Header<&'a [u8]>,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord<'a>>,
    pub nameservers: Vec<ResourceRecord<'a>>,
    pub additional: Vec<ResourceRecord<'a>>,
}

/// A parsed chunk of data in the Query section of the packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub qname: String,
    pub qtype: Type,
    pub qclass: Class,
}

impl Question {
    pub fn new<N: Into<String>>(qname: N, qtype: Type, qclass: Class) -> Question {
        Question {
            qname: qname.into(),
            qtype,
            qclass,
        }
    }

    /// Parses the question at `offset`, returning it and the offset after it
    pub fn parse(message: &[u8], offset: usize) -> Result<(Question, usize), Error> {
        let (qname, consumed) = name::scan_name(message, offset)?;
        let pos = offset + consumed;
        let fixed = message.get(pos..pos + 4).ok_or(Error::UnexpectedEOF)?;
        let question = Question {
            qname,
            qtype: Type::from(BigEndian::read_u16(&fixed[0..2])),
            qclass: Class::from(BigEndian::read_u16(&fixed[2..4])),
        };
        Ok((question, pos + 4))
    }

    /// Writes the question at `offset`, returning the offset after it
    pub fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        let pos = offset + name::write_name(&self.qname, buf, offset)?;
        let fixed = buf.get_mut(pos..pos + 4).ok_or(Error::BufferTooSmall)?;
        BigEndian::write_u16(&mut fixed[0..2], self.qtype.into());
        BigEndian::write_u16(&mut fixed[2..4], self.qclass.into());
        Ok(pos + 4)
    }
}

/// A single DNS record
///
/// The RDATA is not copied: the record remembers where it lives in the
/// message and the typed accessors decode it from there on demand.
#[derive(Debug, Clone)]
pub struct ResourceRecord<'a> {
    pub name: String,
    pub typ: Type,
    pub cls: Class,
    pub ttl: u32,
    data_offset: usize,
    data_len: u16,
    message: &'a [u8],
}

impl<'a> ResourceRecord<'a> {
    /// Parses the record at `offset`, returning it and the offset after its RDATA
    pub fn parse(message: &'a [u8], offset: usize) -> Result<(ResourceRecord<'a>, usize), Error> {
        let (name, consumed) = name::scan_name(message, offset)?;
        let pos = offset + consumed;
        let fixed = message.get(pos..pos + 10).ok_or(Error::UnexpectedEOF)?;
        let data_len = BigEndian::read_u16(&fixed[8..10]);
        let data_offset = pos + 10;
        let end = data_offset + data_len as usize;
        if end > message.len() {
            return Err(Error::UnexpectedEOF);
        }

        let record = ResourceRecord {
            name,
            typ: Type::from(BigEndian::read_u16(&fixed[0..2])),
            cls: Class::from(BigEndian::read_u16(&fixed[2..4])),
            ttl: BigEndian::read_u32(&fixed[4..8]),
            data_offset,
            data_len,
            message,
        };
        Ok((record, end))
    }

    /// Offset of the RDATA in the original message
    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    pub fn data_len(&self) -> u16 {
        self.data_len
    }

    /// The raw RDATA bytes
    pub fn raw_data(&self) -> &'a [u8] {
        &self.message[self.data_offset..self.data_offset + self.data_len as usize]
    }

    pub fn data(&self) -> Result<RRData<'a>, Error> {
        RRData::parse(
            self.typ,
            self.message,
            self.data_offset,
            self.data_len as usize,
        )
    }

    /// A 32 bit Internet address
    pub fn parse_a(&self) -> Result<Ipv4Addr, Error> {
        match self.typed_data(Type::A)? {
            RRData::A(ip) => Ok(ip),
            _ => Err(Error::WrongRecordType),
        }
    }

    /// The canonical name the owner name is an alias of
    pub fn parse_cname(&self) -> Result<String, Error> {
        match self.typed_data(Type::CNAME)? {
            RRData::CNAME(target) => Ok(target.into_owned()),
            _ => Err(Error::WrongRecordType),
        }
    }

    /// A host which should be authoritative for the owner name
    pub fn parse_ns(&self) -> Result<String, Error> {
        match self.typed_data(Type::NS)? {
            RRData::NS(server) => Ok(server.into_owned()),
            _ => Err(Error::WrongRecordType),
        }
    }

    fn typed_data(&self, expected: Type) -> Result<RRData<'a>, Error> {
        if self.typ != expected {
            return Err(Error::WrongRecordType);
        }
        self.data()
    }
}

/// Zone-file style: owner, TTL, class, type and the decoded RDATA
impl fmt::Display for ResourceRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let owner = if self.name.is_empty() { "." } else { self.name.as_str() };
        write!(f, "{} {} {:?} {:?}", owner, self.ttl, self.cls, self.typ)?;
        match self.data() {
            Ok(RRData::A(ip)) => write!(f, " {}", ip),
            Ok(RRData::CNAME(target)) | Ok(RRData::NS(target)) => write!(f, " {}", target),
            Ok(RRData::Unknown { data, .. }) => write!(f, " ({} bytes)", data.len()),
            Err(error) => write!(f, " ({})", error),
        }
    }
}

/// Writes a resource record at `offset`, returning the offset after it
///
/// RDLENGTH is filled in from the number of bytes `data` produced.
pub fn write_record(
    buf: &mut [u8],
    offset: usize,
    name: &str,
    cls: Class,
    ttl: u32,
    data: &RRData,
) -> Result<usize, Error> {
    let pos = offset + name::write_name(name, buf, offset)?;
    write_record_body(buf, pos, cls, ttl, data)
}

/// Writes a record whose owner name is a compression pointer to `target`
///
/// `target` must be the offset of a name already written before `offset`.
pub fn write_record_ptr(
    buf: &mut [u8],
    offset: usize,
    target: usize,
    cls: Class,
    ttl: u32,
    data: &RRData,
) -> Result<usize, Error> {
    if target >= offset || target > name::MAX_POINTER {
        return Err(Error::BadPointer(target));
    }
    let ptr = buf.get_mut(offset..offset + 2).ok_or(Error::BufferTooSmall)?;
    BigEndian::write_u16(ptr, 0xC000 | target as u16);
    write_record_body(buf, offset + 2, cls, ttl, data)
}

fn write_record_body(
    buf: &mut [u8],
    pos: usize,
    cls: Class,
    ttl: u32,
    data: &RRData,
) -> Result<usize, Error> {
    let fixed = buf.get_mut(pos..pos + 10).ok_or(Error::BufferTooSmall)?;
    BigEndian::write_u16(&mut fixed[0..2], data.typ().into());
    BigEndian::write_u16(&mut fixed[2..4], cls.into());
    BigEndian::write_u32(&mut fixed[4..8], ttl);

    let size_offset = pos + 8;
    let data_offset = pos + 10;
    let data_size = data.write_to(buf, data_offset)?;
    if data_size > u16::MAX as usize {
        return Err(Error::BufferTooSmall);
    }
    BigEndian::write_u16(&mut buf[size_offset..size_offset + 2], data_size as u16);

    Ok(data_offset + data_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_round_trip() {
        let question = Question::new("example.com", Type::A, Class::IN);
        let mut buf = [0u8; 32];
        let end = question.write_to(&mut buf, 12).unwrap();
        assert_eq!(end, 12 + 13 + 4);
        assert_eq!(&buf[25..29], &[0, 1, 0, 1]);
        assert_eq!(Question::parse(&buf[..end], 12), Ok((question, end)));
    }

    #[test]
    fn question_needs_type_and_class() {
        let wire = b"\x03foo\x04test\x00\x00\x01\x00";
        assert_eq!(Question::parse(wire, 0), Err(Error::UnexpectedEOF));

        let mut small = [0u8; 12];
        let question = Question::new("foo.test", Type::A, Class::IN);
        assert_eq!(question.write_to(&mut small, 0), Err(Error::BufferTooSmall));
    }

    #[test]
    fn record_round_trip() {
        let mut buf = [0u8; 64];
        let data = RRData::A(Ipv4Addr::new(93, 184, 216, 34));
        let end = write_record(&mut buf, 0, "example.com", Class::IN, 300, &data).unwrap();
        assert_eq!(end, 13 + 10 + 4);
        assert_eq!(&buf[13..23], &[0, 1, 0, 1, 0, 0, 1, 44, 0, 4]);

        let (record, next) = ResourceRecord::parse(&buf[..end], 0).unwrap();
        assert_eq!(next, end);
        assert_eq!(record.name, "example.com");
        assert_eq!(record.typ, Type::A);
        assert_eq!(record.cls, Class::IN);
        assert_eq!(record.ttl, 300);
        assert_eq!(record.data_offset(), 23);
        assert_eq!(record.data_len(), 4);
        assert_eq!(record.raw_data(), &[93, 184, 216, 34]);
        assert_eq!(record.parse_a(), Ok(Ipv4Addr::new(93, 184, 216, 34)));
        assert_eq!(record.parse_cname(), Err(Error::WrongRecordType));
        assert_eq!(record.parse_ns(), Err(Error::WrongRecordType));
    }

    #[test]
    fn typed_records() {
        let mut buf = [0u8; 128];
        let cname = RRData::CNAME("edge.example.net".into());
        let mid = write_record(&mut buf, 0, "www.example.com", Class::IN, 60, &cname).unwrap();
        let ns = RRData::NS("ns1.example.com".into());
        let end = write_record(&mut buf, mid, "example.com", Class::IN, 60, &ns).unwrap();

        let (first, next) = ResourceRecord::parse(&buf[..end], 0).unwrap();
        assert_eq!(next, mid);
        assert_eq!(first.parse_cname().unwrap(), "edge.example.net");
        assert_eq!(first.parse_a(), Err(Error::WrongRecordType));

        let (second, next) = ResourceRecord::parse(&buf[..end], mid).unwrap();
        assert_eq!(next, end);
        assert_eq!(second.parse_ns().unwrap(), "ns1.example.com");
    }

    #[test]
    fn rdlength_past_end() {
        let mut buf = [0u8; 64];
        let data = RRData::A(Ipv4Addr::LOCALHOST);
        let end = write_record(&mut buf, 0, "a", Class::IN, 1, &data).unwrap();
        assert_eq!(
            ResourceRecord::parse(&buf[..end - 1], 0).unwrap_err(),
            Error::UnexpectedEOF
        );
        // RDLENGTH claims more than is there
        buf[end - 5] = 5;
        assert_eq!(
            ResourceRecord::parse(&buf[..end], 0).unwrap_err(),
            Error::UnexpectedEOF
        );
    }

    #[test]
    fn a_record_with_wrong_length() {
        let data = [1u8, 2, 3, 4, 5];
        let mut buf = [0u8; 64];
        let raw = RRData::Unknown {
            typ: Type::A,
            data: &data,
        };
        let end = write_record(&mut buf, 0, "a", Class::IN, 1, &raw).unwrap();
        let (record, _) = ResourceRecord::parse(&buf[..end], 0).unwrap();
        assert_eq!(record.typ, Type::A);
        assert_eq!(record.parse_a(), Err(Error::WrongRdataLength));
    }

    #[test]
    fn display_records() {
        let mut buf = [0u8; 128];
        let a = RRData::A(Ipv4Addr::new(93, 184, 216, 34));
        let mid = write_record(&mut buf, 0, "example.com", Class::IN, 300, &a).unwrap();
        let cname = RRData::CNAME("example.com".into());
        let end = write_record(&mut buf, mid, "www.example.com", Class::IN, 60, &cname).unwrap();
        let raw = RRData::Unknown {
            typ: Type::TXT,
            data: b"\x02hi",
        };
        let last = write_record(&mut buf, end, "", Class::CH, 0, &raw).unwrap();

        let (first, _) = ResourceRecord::parse(&buf[..last], 0).unwrap();
        assert_eq!(first.to_string(), "example.com 300 IN A 93.184.216.34");
        let (second, _) = ResourceRecord::parse(&buf[..last], mid).unwrap();
        assert_eq!(second.to_string(), "www.example.com 60 IN CNAME example.com");
        let (third, _) = ResourceRecord::parse(&buf[..last], end).unwrap();
        assert_eq!(third.to_string(), ". 0 CH TXT (3 bytes)");
    }

    #[test]
    fn pointer_owner() {
        let mut buf = [0u8; 64];
        let question = Question::new("example.com", Type::A, Class::IN);
        let start = question.write_to(&mut buf, 12).unwrap();
        let data = RRData::A(Ipv4Addr::LOCALHOST);
        let end = write_record_ptr(&mut buf, start, 12, Class::IN, 5, &data).unwrap();
        assert_eq!(end, start + 2 + 10 + 4);

        let (record, next) = ResourceRecord::parse(&buf[..end], start).unwrap();
        assert_eq!(next, end);
        assert_eq!(record.name, "example.com");
        assert_eq!(record.parse_a(), Ok(Ipv4Addr::LOCALHOST));

        assert_eq!(
            write_record_ptr(&mut buf, start, start, Class::IN, 5, &data),
            Err(Error::BadPointer(start))
        );
    }

    #[test]
    fn oversized_rdata_is_a_capacity_error() {
        let data = vec![0u8; u16::MAX as usize + 1];
        let raw = RRData::Unknown {
            typ: Type::TXT,
            data: &data,
        };
        let mut buf = vec![0u8; data.len() + 64];
        let err = write_record(&mut buf, 0, "a", Class::IN, 1, &raw).unwrap_err();
        assert_eq!(err, Error::BufferTooSmall);
        assert_eq!(err.kind(), crate::dns_parser::ErrorKind::Capacity);
    }

    #[test]
    fn record_buffer_too_small() {
        let data = RRData::NS("ns1.example.com".into());
        let mut buf = [0u8; 30];
        assert_eq!(
            write_record(&mut buf, 0, "example.com", Class::IN, 1, &data),
            Err(Error::BufferTooSmall)
        );
    }
}
