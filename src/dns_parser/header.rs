use byteorder::{BigEndian, ByteOrder};

use super::{Error, Opcode, ResponseCode};

mod field {
    use std::ops::Range;

    pub const ID: Range<usize> = 0..2;
    pub const FLAGS_HI: usize = 2;
    pub const FLAGS_LO: usize = 3;
    pub const QDCOUNT: Range<usize> = 4..6;
    pub const ANCOUNT: Range<usize> = 6..8;
    pub const NSCOUNT: Range<usize> = 8..10;
    pub const ARCOUNT: Range<usize> = 10..12;
}

/// Size of the fixed header in bytes
pub const HEADER_LEN: usize = 12;

const QR: u8 = 0x80;
const OPCODE_MASK: u8 = 0x78;
const OPCODE_SHIFT: u8 = 3;
const AA: u8 = 0x04;
const TC: u8 = 0x02;
const RD: u8 = 0x01;
const RA: u8 = 0x80;
const AD: u8 = 0x20;
const CD: u8 = 0x10;
const RCODE_MASK: u8 = 0x0F;

/// A view of the fixed 12-byte header at the start of a DNS message
///
/// The header is never copied out of the message: every getter reads the
/// underlying bytes and every setter writes them in place, so a `Header`
/// over `&mut Vec<u8>` edits the packet being built.
#[derive(Debug, Clone, Copy)]
pub struct Header<T> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Header<T> {
    /// Wraps `buffer`, failing if it cannot hold a header
    pub fn new_checked(buffer: T) -> Result<Header<T>, Error> {
        if buffer.as_ref().len() < HEADER_LEN {
            return Err(Error::HeaderTooShort);
        }
        Ok(Header { buffer })
    }

    /// Wraps `buffer` without checking its length; accessors panic on a short buffer
    pub(crate) fn new_unchecked(buffer: T) -> Header<T> {
        Header { buffer }
    }

    pub fn into_inner(self) -> T {
        self.buffer
    }

    fn bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    pub fn id(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[field::ID])
    }

    /// `true` for a response, `false` for a question
    pub fn qr(&self) -> bool {
        self.bytes()[field::FLAGS_HI] & QR != 0
    }

    pub fn opcode(&self) -> Opcode {
        Opcode::from((self.bytes()[field::FLAGS_HI] & OPCODE_MASK) >> OPCODE_SHIFT)
    }

    /// Authoritative answer (responses only)
    pub fn authoritative(&self) -> bool {
        self.bytes()[field::FLAGS_HI] & AA != 0
    }

    /// The message was truncated to fit the transport
    pub fn truncated(&self) -> bool {
        self.bytes()[field::FLAGS_HI] & TC != 0
    }

    pub fn recursion_desired(&self) -> bool {
        self.bytes()[field::FLAGS_HI] & RD != 0
    }

    pub fn recursion_available(&self) -> bool {
        self.bytes()[field::FLAGS_LO] & RA != 0
    }

    /// Authentic data (RFC 2535)
    pub fn authentic_data(&self) -> bool {
        self.bytes()[field::FLAGS_LO] & AD != 0
    }

    /// Checking disabled (RFC 2535)
    pub fn checking_disabled(&self) -> bool {
        self.bytes()[field::FLAGS_LO] & CD != 0
    }

    pub fn response_code(&self) -> ResponseCode {
        ResponseCode::from(self.bytes()[field::FLAGS_LO] & RCODE_MASK)
    }

    pub fn question_count(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[field::QDCOUNT])
    }

    pub fn answer_count(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[field::ANCOUNT])
    }

    pub fn authority_count(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[field::NSCOUNT])
    }

    pub fn additional_count(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[field::ARCOUNT])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Header<T> {
    fn bytes_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }

    fn set_flag(&mut self, index: usize, mask: u8, value: bool) {
        let byte = &mut self.bytes_mut()[index];
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    pub fn set_id(&mut self, id: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[field::ID], id);
    }

    pub fn set_qr(&mut self, value: bool) {
        self.set_flag(field::FLAGS_HI, QR, value);
    }

    pub fn set_opcode(&mut self, opcode: Opcode) {
        let byte = &mut self.bytes_mut()[field::FLAGS_HI];
        *byte = (*byte & !OPCODE_MASK) | ((u8::from(opcode) << OPCODE_SHIFT) & OPCODE_MASK);
    }

    pub fn set_authoritative(&mut self, value: bool) {
        self.set_flag(field::FLAGS_HI, AA, value);
    }

    pub fn set_truncated(&mut self, value: bool) {
        self.set_flag(field::FLAGS_HI, TC, value);
    }

    pub fn set_recursion_desired(&mut self, value: bool) {
        self.set_flag(field::FLAGS_HI, RD, value);
    }

    pub fn set_recursion_available(&mut self, value: bool) {
        self.set_flag(field::FLAGS_LO, RA, value);
    }

    pub fn set_authentic_data(&mut self, value: bool) {
        self.set_flag(field::FLAGS_LO, AD, value);
    }

    pub fn set_checking_disabled(&mut self, value: bool) {
        self.set_flag(field::FLAGS_LO, CD, value);
    }

    pub fn set_response_code(&mut self, code: ResponseCode) {
        let byte = &mut self.bytes_mut()[field::FLAGS_LO];
        *byte = (*byte & !RCODE_MASK) | u8::from(code);
    }

    pub fn set_question_count(&mut self, count: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[field::QDCOUNT], count);
    }

    pub fn set_answer_count(&mut self, count: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[field::ANCOUNT], count);
    }

    pub fn set_authority_count(&mut self, count: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[field::NSCOUNT], count);
    }

    pub fn set_additional_count(&mut self, count: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[field::ARCOUNT], count);
    }

    pub fn inc_questions(&mut self) -> Result<u16, Error> {
        let count = self.question_count().checked_add(1).ok_or(Error::TooManyRecords)?;
        self.set_question_count(count);
        Ok(count)
    }

    pub fn inc_answers(&mut self) -> Result<u16, Error> {
        let count = self.answer_count().checked_add(1).ok_or(Error::TooManyRecords)?;
        self.set_answer_count(count);
        Ok(count)
    }

    pub fn inc_authorities(&mut self) -> Result<u16, Error> {
        let count = self.authority_count().checked_add(1).ok_or(Error::TooManyRecords)?;
        self.set_authority_count(count);
        Ok(count)
    }

    pub fn inc_additionals(&mut self) -> Result<u16, Error> {
        let count = self.additional_count().checked_add(1).ok_or(Error::TooManyRecords)?;
        self.set_additional_count(count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Header<[u8; 12]> {
        Header::new_checked([0u8; 12]).unwrap()
    }

    #[test]
    fn too_short() {
        assert_eq!(
            Header::new_checked(&[0u8; 11][..]).unwrap_err(),
            Error::HeaderTooShort
        );
    }

    #[test]
    fn parse_example_query() {
        let query = b"\x06%\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00";
        let header = Header::new_checked(&query[..]).unwrap();
        assert_eq!(header.id(), 1573);
        assert!(!header.qr());
        assert_eq!(header.opcode(), Opcode::StandardQuery);
        assert!(!header.authoritative());
        assert!(!header.truncated());
        assert!(header.recursion_desired());
        assert!(!header.recursion_available());
        assert_eq!(header.response_code(), ResponseCode::NoError);
        assert_eq!(header.question_count(), 1);
        assert_eq!(header.answer_count(), 0);
        assert_eq!(header.authority_count(), 0);
        assert_eq!(header.additional_count(), 0);
    }

    #[test]
    fn counts_are_big_endian() {
        let mut header = blank();
        header.set_id(0x1234);
        header.set_question_count(1);
        header.set_answer_count(0x0102);
        header.set_authority_count(3);
        header.set_additional_count(0xFFFF);
        assert_eq!(
            header.into_inner(),
            [0x12, 0x34, 0, 0, 0, 1, 1, 2, 0, 3, 0xFF, 0xFF]
        );
    }

    #[test]
    fn each_flag_round_trips_alone() {
        type Get = fn(&Header<[u8; 12]>) -> bool;
        type Set = fn(&mut Header<[u8; 12]>, bool);
        let flags: [(Get, Set); 7] = [
            (Header::qr, Header::set_qr),
            (Header::authoritative, Header::set_authoritative),
            (Header::truncated, Header::set_truncated),
            (Header::recursion_desired, Header::set_recursion_desired),
            (Header::recursion_available, Header::set_recursion_available),
            (Header::authentic_data, Header::set_authentic_data),
            (Header::checking_disabled, Header::set_checking_disabled),
        ];
        for (get, set) in flags.iter() {
            let mut header = blank();
            set(&mut header, true);
            assert!(get(&header));
            assert_eq!(header.opcode(), Opcode::StandardQuery);
            assert_eq!(header.response_code(), ResponseCode::NoError);
            set(&mut header, false);
            assert_eq!(header.into_inner(), [0u8; 12]);
        }
    }

    #[test]
    fn opcode_and_rcode_keep_neighbours() {
        for code in 0..16u8 {
            let mut header = Header::new_checked([0xFFu8; 12]).unwrap();
            header.set_opcode(Opcode::from(code));
            header.set_response_code(ResponseCode::from(code));
            assert_eq!(u8::from(header.opcode()), code);
            assert_eq!(u8::from(header.response_code()), code);
            assert!(header.qr());
            assert!(header.authoritative());
            assert!(header.truncated());
            assert!(header.recursion_desired());
            assert!(header.recursion_available());
            assert!(header.authentic_data());
            assert!(header.checking_disabled());
            // Z bit
            assert_eq!(header.into_inner()[3] & 0x40, 0x40);
        }
    }

    #[test]
    fn all_fields_combined() {
        let mut header = blank();
        header.set_id(0xBEEF);
        header.set_qr(true);
        header.set_opcode(Opcode::ServerStatusRequest);
        header.set_authoritative(true);
        header.set_truncated(false);
        header.set_recursion_desired(true);
        header.set_recursion_available(true);
        header.set_authentic_data(false);
        header.set_checking_disabled(true);
        header.set_response_code(ResponseCode::Refused);

        assert_eq!(header.id(), 0xBEEF);
        assert!(header.qr());
        assert_eq!(header.opcode(), Opcode::ServerStatusRequest);
        assert!(header.authoritative());
        assert!(!header.truncated());
        assert!(header.recursion_desired());
        assert!(header.recursion_available());
        assert!(!header.authentic_data());
        assert!(header.checking_disabled());
        assert_eq!(header.response_code(), ResponseCode::Refused);
        assert_eq!(&header.into_inner()[2..4], &[0x95, 0x95]);
    }

    #[test]
    fn counters_overflow() {
        let mut header = blank();
        header.set_answer_count(u16::MAX - 1);
        assert_eq!(header.inc_answers(), Ok(u16::MAX));
        assert_eq!(header.inc_answers(), Err(Error::TooManyRecords));
        assert_eq!(header.inc_questions(), Ok(1));
    }
}
