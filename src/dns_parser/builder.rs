use std::marker::PhantomData;

use super::header::HEADER_LEN;
use super::structs::{write_record, write_record_ptr};
use super::{Class, Error, Header, Opcode, Question, RRData, ResponseCode};

/// Classic UDP payload limit of RFC 1035
pub const MAX_UDP_PAYLOAD: usize = 512;

pub enum Questions {}
pub enum Answers {}
pub enum Nameservers {}
pub enum Additional {}

pub trait MoveTo<T> {}
impl<T> MoveTo<T> for T {}

impl MoveTo<Answers> for Questions {}

impl MoveTo<Nameservers> for Questions {}
impl MoveTo<Nameservers> for Answers {}

impl MoveTo<Additional> for Questions {}
impl MoveTo<Additional> for Answers {}
impl MoveTo<Additional> for Nameservers {}

/// Allows to build a DNS packet
///
/// Sections have to be filled in wire order, which the type parameter
/// enforces. The packet is written into a buffer of `max_size` bytes; an
/// `add_*` call that would overflow it fails with `BufferTooSmall`. The
/// `add_*` methods consume the builder, so a failed call drops the packet.
pub struct Builder<S> {
    buf: Vec<u8>,
    len: usize,
    _state: PhantomData<S>,
}

impl Builder<Questions> {
    /// Creates a new query
    ///
    /// Initially all sections are empty. You're expected to fill
    /// the questions section with `add_question`
    pub fn new_query(id: u16, recursion: bool) -> Builder<Questions> {
        Self::with_header(id, false, recursion, false)
    }

    pub fn new_response(id: u16, recursion: bool, authoritative: bool) -> Builder<Questions> {
        Self::with_header(id, true, recursion, authoritative)
    }

    fn with_header(id: u16, response: bool, recursion: bool, authoritative: bool) -> Self {
        let mut buf = vec![0u8; MAX_UDP_PAYLOAD];
        {
            let mut head = Header::new_unchecked(&mut buf[..HEADER_LEN]);
            head.set_id(id);
            head.set_qr(response);
            head.set_opcode(Opcode::StandardQuery);
            head.set_authoritative(authoritative);
            head.set_recursion_desired(recursion);
            head.set_response_code(ResponseCode::NoError);
        }
        Builder {
            buf,
            len: HEADER_LEN,
            _state: PhantomData,
        }
    }
}

impl<T> Builder<T> {
    fn header(&mut self) -> Header<&mut [u8]> {
        Header::new_unchecked(&mut self.buf[..HEADER_LEN])
    }

    fn add_rr<F>(
        &mut self,
        name: &str,
        cls: Class,
        ttl: u32,
        data: &RRData,
        count: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(&mut Header<&mut [u8]>) -> Result<u16, Error>,
    {
        let end = write_record(&mut self.buf, self.len, name, cls, ttl, data)?;
        count(&mut self.header())?;
        self.len = end;
        Ok(())
    }

    /// Returns the final packet
    pub fn build(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }

    pub fn move_to<U>(self) -> Builder<U>
    where
        T: MoveTo<U>,
    {
        Builder {
            buf: self.buf,
            len: self.len,
            _state: PhantomData,
        }
    }

    /// Changes the size limit of the packet
    ///
    /// Lowering it below what was already written fails with `BufferTooSmall`.
    pub fn set_max_size(&mut self, max_size: usize) -> Result<(), Error> {
        if max_size < self.len {
            return Err(Error::BufferTooSmall);
        }
        self.buf.resize(max_size, 0);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        let head = Header::new_unchecked(&self.buf[..HEADER_LEN]);
        head.question_count() == 0
            && head.answer_count() == 0
            && head.authority_count() == 0
            && head.additional_count() == 0
    }
}

impl<T: MoveTo<Questions>> Builder<T> {
    /// Adds a question to the packet
    pub fn add_question(self, question: &Question) -> Result<Builder<Questions>, Error> {
        let mut builder = self.move_to::<Questions>();

        let end = question.write_to(&mut builder.buf, builder.len)?;
        builder.header().inc_questions()?;
        builder.len = end;
        Ok(builder)
    }
}

impl<T: MoveTo<Answers>> Builder<T> {
    pub fn add_answer(
        self,
        name: &str,
        cls: Class,
        ttl: u32,
        data: &RRData,
    ) -> Result<Builder<Answers>, Error> {
        let mut builder = self.move_to::<Answers>();
        builder.add_rr(name, cls, ttl, data, |head| head.inc_answers())?;
        Ok(builder)
    }

    /// Adds an answer owned by the first question's name
    ///
    /// The owner is written as a pointer to the question, so the answer
    /// fits whenever the question did.
    pub fn add_answer_to_question(
        self,
        cls: Class,
        ttl: u32,
        data: &RRData,
    ) -> Result<Builder<Answers>, Error> {
        let mut builder = self.move_to::<Answers>();
        if builder.header().question_count() == 0 {
            return Err(Error::BadPointer(HEADER_LEN));
        }
        let end = write_record_ptr(&mut builder.buf, builder.len, HEADER_LEN, cls, ttl, data)?;
        builder.header().inc_answers()?;
        builder.len = end;
        Ok(builder)
    }
}

impl<T: MoveTo<Nameservers>> Builder<T> {
    pub fn add_nameserver(
        self,
        name: &str,
        cls: Class,
        ttl: u32,
        data: &RRData,
    ) -> Result<Builder<Nameservers>, Error> {
        let mut builder = self.move_to::<Nameservers>();
        builder.add_rr(name, cls, ttl, data, |head| head.inc_authorities())?;
        Ok(builder)
    }
}

impl<T: MoveTo<Additional>> Builder<T> {
    pub fn add_additional(
        self,
        name: &str,
        cls: Class,
        ttl: u32,
        data: &RRData,
    ) -> Result<Builder<Additional>, Error> {
        let mut builder = self.move_to::<Additional>();
        builder.add_rr(name, cls, ttl, data, |head| head.inc_additionals())?;
        Ok(builder)
    }
}
