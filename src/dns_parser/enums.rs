/// The OPCODE value according to RFC 1035
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    StandardQuery,
    InverseQuery,
    ServerStatusRequest,
    Reserved(u8),
}

impl From<u8> for Opcode {
    fn from(code: u8) -> Opcode {
        match code & 0x0F {
            0 => Opcode::StandardQuery,
            1 => Opcode::InverseQuery,
            2 => Opcode::ServerStatusRequest,
            x => Opcode::Reserved(x),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        match opcode {
            Opcode::StandardQuery => 0,
            Opcode::InverseQuery => 1,
            Opcode::ServerStatusRequest => 2,
            Opcode::Reserved(x) => x & 0x0F,
        }
    }
}

/// The RCODE value according to RFC 1035
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    NoError,
    /// The name server was unable to interpret the query
    FormatError,
    /// The name server was unable to process the query
    ServerFailure,
    /// The domain name referenced in the query does not exist
    NameError,
    NotImplemented,
    Refused,
    Reserved(u8),
}

impl From<u8> for ResponseCode {
    fn from(code: u8) -> ResponseCode {
        match code & 0x0F {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormatError,
            2 => ResponseCode::ServerFailure,
            3 => ResponseCode::NameError,
            4 => ResponseCode::NotImplemented,
            5 => ResponseCode::Refused,
            x => ResponseCode::Reserved(x),
        }
    }
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> u8 {
        match code {
            ResponseCode::NoError => 0,
            ResponseCode::FormatError => 1,
            ResponseCode::ServerFailure => 2,
            ResponseCode::NameError => 3,
            ResponseCode::NotImplemented => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Reserved(x) => x & 0x0F,
        }
    }
}

macro_rules! u16_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr, )*
        }
        query_only: [$($qonly:ident),*]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// A value this crate does not interpret
            Unknown(u16),
        }

        impl From<u16> for $name {
            fn from(code: u16) -> $name {
                match code {
                    $( $value => $name::$variant, )*
                    x => $name::Unknown(x),
                }
            }
        }

        impl From<$name> for u16 {
            fn from(value: $name) -> u16 {
                match value {
                    $( $name::$variant => $value, )*
                    $name::Unknown(x) => x,
                }
            }
        }

        impl $name {
            /// Whether the value is only meaningful in a question
            pub fn is_query_only(&self) -> bool {
                match *self {
                    $( $name::$qonly => true, )*
                    _ => false,
                }
            }

            /// Whether the value is one of the enumerated ones
            pub fn is_known(&self) -> bool {
                !matches!(*self, $name::Unknown(_))
            }
        }
    };
}

u16_enum! {
    /// The TYPE (and QTYPE) value according to RFC 1035
    pub enum Type {
        /// a host address
        A = 1,
        /// an authoritative name server
        NS = 2,
        /// a mail destination (obsolete, use MX)
        MD = 3,
        /// a mail forwarder (obsolete, use MX)
        MF = 4,
        /// the canonical name for an alias
        CNAME = 5,
        /// marks the start of a zone of authority
        SOA = 6,
        MB = 7,
        MG = 8,
        MR = 9,
        NULL = 10,
        /// a well known service description
        WKS = 11,
        /// a domain name pointer
        PTR = 12,
        /// host information
        HINFO = 13,
        /// mailbox or mail list information
        MINFO = 14,
        /// mail exchange
        MX = 15,
        /// text strings
        TXT = 16,
        /// a request for a transfer of an entire zone
        AXFR = 252,
        /// a request for mailbox-related records (MB, MG or MR)
        MAILB = 253,
        /// a request for mail agent RRs (obsolete, see MX)
        MAILA = 254,
        /// a request for all records
        All = 255,
    }
    query_only: [AXFR, MAILB, MAILA, All]
}

u16_enum! {
    /// The CLASS (and QCLASS) value according to RFC 1035
    pub enum Class {
        /// the Internet
        IN = 1,
        /// the CSNET class (obsolete)
        CS = 2,
        /// the CHAOS class
        CH = 3,
        /// Hesiod
        HS = 4,
        /// any class
        Any = 255,
    }
    query_only: [Any]
}
