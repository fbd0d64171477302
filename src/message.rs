//! Whole messages as the client and server see them

use std::net::Ipv4Addr;

use crate::dns_parser::{self, Builder, Class, Packet, Question, RRData, Type};

/// A query the client sends, or the server answers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsQuestion {
    pub id: u16,
    pub name: String,
}

impl DnsQuestion {
    pub fn new<N: Into<String>>(id: u16, name: N) -> DnsQuestion {
        DnsQuestion {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerQuestion {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub name: String,
    pub address: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameServer {
    pub name: String,
    pub server: String,
}

/// Everything a response says about the names it was asked for
///
/// Only A, CNAME and NS answers of class IN are kept; authority and
/// additional records are checked for well-formedness but not reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsAnswer {
    pub id: u16,
    pub questions: Vec<AnswerQuestion>,
    pub addresses: Vec<Address>,
    pub aliases: Vec<Alias>,
    pub name_servers: Vec<NameServer>,
}

impl DnsAnswer {
    /// Parses `message` and classifies its answers
    pub fn parse(message: &[u8]) -> Result<DnsAnswer, dns_parser::Error> {
        DnsAnswer::from_packet(&Packet::parse(message)?)
    }

    /// Copies the interesting parts out of a parsed packet
    pub fn from_packet(packet: &Packet) -> Result<DnsAnswer, dns_parser::Error> {
        let mut answer = DnsAnswer {
            id: packet.header.id(),
            questions: packet
                .questions
                .iter()
                .map(|q| AnswerQuestion {
                    name: q.qname.clone(),
                })
                .collect(),
            ..Default::default()
        };

        for record in &packet.answers {
            if record.cls != Class::IN {
                continue;
            }
            match record.typ {
                Type::A => answer.addresses.push(Address {
                    name: record.name.clone(),
                    address: record.parse_a()?,
                }),
                Type::CNAME => answer.aliases.push(Alias {
                    name: record.name.clone(),
                    alias: record.parse_cname()?,
                }),
                Type::NS => answer.name_servers.push(NameServer {
                    name: record.name.clone(),
                    server: record.parse_ns()?,
                }),
                _ => (),
            }
        }

        Ok(answer)
    }
}

/// A recursive `A`/`IN` query for `name`
pub fn build_query(id: u16, name: &str) -> Result<Vec<u8>, dns_parser::Error> {
    let question = Question::new(name, Type::A, Class::IN);
    Ok(Builder::new_query(id, true).add_question(&question)?.build())
}

/// A response to `question` carrying a single `A` record
///
/// The record's owner name points back at the question.
pub fn build_answer(
    id: u16,
    question: &Question,
    ttl: u32,
    address: Ipv4Addr,
) -> Result<Vec<u8>, dns_parser::Error> {
    let builder = Builder::new_response(id, false, true)
        .add_question(question)?
        .add_answer_to_question(Class::IN, ttl, &RRData::A(address))?;
    Ok(builder.build())
}
