use std::borrow::Cow;
use std::net::Ipv4Addr;

use byteorder::{BigEndian, ByteOrder};

use super::{name, Error, Type};

/// The enumeration that represents known types of DNS resource records data
///
/// Parsed names are always owned; `Unknown` borrows its bytes from the
/// message it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RRData<'a> {
    A(Ipv4Addr),
    CNAME(Cow<'a, str>),
    NS(Cow<'a, str>),
    // Anything this crate does not interpret
    Unknown { typ: Type, data: &'a [u8] },
}

impl<'a> RRData<'a> {
    pub fn typ(&self) -> Type {
        match *self {
            RRData::A(..) => Type::A,
            RRData::CNAME(..) => Type::CNAME,
            RRData::NS(..) => Type::NS,
            RRData::Unknown { typ, .. } => typ,
        }
    }

    /// Writes the RDATA at `offset`, returning its length
    pub fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
        match *self {
            RRData::A(ip) => {
                let out = buf.get_mut(offset..offset + 4).ok_or(Error::BufferTooSmall)?;
                BigEndian::write_u32(out, ip.into());
                Ok(4)
            }
            RRData::CNAME(ref target) | RRData::NS(ref target) => {
                name::write_name(target, buf, offset)
            }
            RRData::Unknown { data, .. } => {
                buf.get_mut(offset..offset + data.len())
                    .ok_or(Error::BufferTooSmall)?
                    .copy_from_slice(data);
                Ok(data.len())
            }
        }
    }

    /// Interprets `len` bytes at `offset` of `message` as RDATA of type `typ`
    ///
    /// Names are resolved against the whole message, so compression
    /// pointers inside RDATA work, but the name itself must end inside the
    /// RDATA.
    pub fn parse(
        typ: Type,
        message: &'a [u8],
        offset: usize,
        len: usize,
    ) -> Result<RRData<'a>, Error> {
        let rdata = message
            .get(offset..offset + len)
            .ok_or(Error::UnexpectedEOF)?;
        match typ {
            Type::A => {
                if rdata.len() != 4 {
                    return Err(Error::WrongRdataLength);
                }
                Ok(RRData::A(Ipv4Addr::from(BigEndian::read_u32(rdata))))
            }
            Type::CNAME => Ok(RRData::CNAME(Self::scan_target(message, offset, len)?)),
            Type::NS => Ok(RRData::NS(Self::scan_target(message, offset, len)?)),
            typ => Ok(RRData::Unknown { typ, data: rdata }),
        }
    }

    fn scan_target(message: &[u8], offset: usize, len: usize) -> Result<Cow<'a, str>, Error> {
        let (target, consumed) = name::scan_name(&message[..offset + len], offset)?;
        if consumed != len {
            return Err(Error::WrongRdataLength);
        }
        Ok(Cow::Owned(target))
    }
}
