use super::header::HEADER_LEN;
use super::{Error, Header, Packet, Question, ResourceRecord};

impl<'a> Packet<'a> {
    /// Parse a full DNS Packet and return a structure that has all the
    /// data borrowed from the passed buffer.
    ///
    /// Any malformed section fails the whole packet. Bytes after the last
    /// section are ignored.
    pub fn parse(data: &'a [u8]) -> Result<Packet<'a>, Error> {
        let header = Header::new_checked(data)?;
        let mut offset = HEADER_LEN;

        let mut questions = Vec::new();
        for _ in 0..header.question_count() {
            let (question, next) = Question::parse(data, offset)?;
            questions.push(question);
            offset = next;
        }

        let mut sections = [Vec::new(), Vec::new(), Vec::new()];
        let counts = [
            header.answer_count(),
            header.authority_count(),
            header.additional_count(),
        ];
        for (records, &count) in sections.iter_mut().zip(counts.iter()) {
            for _ in 0..count {
                let (record, next) = ResourceRecord::parse(data, offset)?;
                records.push(record);
                offset = next;
            }
        }
        let [answers, nameservers, additional] = sections;

        Ok(Packet {
            header,
            questions,
            answers,
            nameservers,
            additional,
        })
    }
}

#[cfg(test)]
mod test {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::dns_parser::{Class, Opcode, RRData, ResponseCode, Type};

    #[test]
    fn parse_example_query() {
        let query = b"\x06%\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00\
                      \x07example\x03com\x00\x00\x01\x00\x01";
        let packet = Packet::parse(query).unwrap();
        assert_eq!(packet.header.id(), 1573);
        assert!(!packet.header.qr());
        assert_eq!(packet.header.opcode(), Opcode::StandardQuery);
        assert!(packet.header.recursion_desired());
        assert_eq!(packet.header.response_code(), ResponseCode::NoError);
        assert_eq!(packet.questions.len(), 1);
        assert_eq!(packet.questions[0].qtype, Type::A);
        assert_eq!(packet.questions[0].qclass, Class::IN);
        assert_eq!(packet.questions[0].qname, "example.com");
        assert_eq!(packet.answers.len(), 0);
    }

    #[test]
    fn parse_example_response() {
        let response = b"\x06%\x81\x80\x00\x01\x00\x01\x00\x00\x00\x00\
                         \x07example\x03com\x00\x00\x01\x00\x01\
                         \xc0\x0c\x00\x01\x00\x01\x00\x00\x04\xf8\
                         \x00\x04]\xb8\xd8\"";
        let packet = Packet::parse(response).unwrap();
        assert_eq!(packet.header.id(), 1573);
        assert!(packet.header.qr());
        assert!(packet.header.recursion_available());
        assert_eq!(packet.questions[0].qname, "example.com");
        assert_eq!(packet.answers.len(), 1);
        assert_eq!(packet.answers[0].name, "example.com");
        assert_eq!(packet.answers[0].cls, Class::IN);
        assert_eq!(packet.answers[0].ttl, 1272);
        assert_eq!(
            packet.answers[0].data(),
            Ok(RRData::A(Ipv4Addr::new(93, 184, 216, 34)))
        );
    }

    #[test]
    fn parse_response_with_unknown_records() {
        // AAAA answer and an EDNS0 OPT additional are skipped, not rejected
        let response = b"\x00\x02\x81\x80\x00\x01\x00\x01\x00\x00\x00\x01\
                         \x01a\x00\x00\x1c\x00\x01\
                         \xc0\x0c\x00\x1c\x00\x01\x00\x00\x00\x3c\x00\x10\
                         \x20\x01\x0d\xb8\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01\
                         \x00\x00\x29\x10\x00\x00\x00\x00\x00\x00\x00";
        let packet = Packet::parse(response).unwrap();
        assert_eq!(packet.answers[0].typ, Type::Unknown(28));
        assert_eq!(packet.answers[0].data_len(), 16);
        assert_eq!(packet.additional[0].typ, Type::Unknown(41));
        assert_eq!(packet.additional[0].cls, Class::Unknown(4096));
        assert_eq!(packet.additional[0].name, "");
    }

    #[test]
    fn truncated_packets() {
        assert_eq!(Packet::parse(b"\x00\x01").unwrap_err(), Error::HeaderTooShort);
        // claims a question that is not there
        let query = b"\x00\x01\x01\x00\x00\x01\x00\x00\x00\x00\x00\x00";
        assert_eq!(Packet::parse(query).unwrap_err(), Error::UnexpectedEOF);
        // claims an authority record that is not there
        let response = b"\x00\x01\x81\x00\x00\x00\x00\x00\x00\x01\x00\x00";
        assert_eq!(Packet::parse(response).unwrap_err(), Error::UnexpectedEOF);
    }

    #[test]
    fn huge_counts_do_not_allocate() {
        let query = b"\x00\x01\x01\x00\xff\xff\xff\xff\xff\xff\xff\xff";
        assert!(Packet::parse(query).is_err());
    }
}
