use thiserror::Error;

/// Error parsing or building a DNS packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("packet is smaller than header size")]
    HeaderTooShort,
    #[error("packet has incomplete data")]
    UnexpectedEOF,
    #[error("wrong (too short or too long) size of RDATA")]
    WrongRdataLength,
    #[error("label in domain name has unknown label format")]
    UnknownLabelFormat,
    #[error("compression pointer to offset {0} is not a prior position")]
    BadPointer(usize),
    #[error("domain name has too many labels or pointers")]
    TooManyLabels,
    #[error("decoded domain name exceeds 255 octets")]
    OversizedName,
    #[error("domain name is longer than 255 octets")]
    NameTooLong,
    #[error("label in domain name is longer than 63 octets")]
    LabelTooLong,
    #[error("domain name contains an empty label")]
    EmptyLabel,
    #[error("domain name contains an invalid escape sequence")]
    InvalidEscape,
    #[error("record type does not match the requested data")]
    WrongRecordType,
    #[error("section already holds 65535 records")]
    TooManyRecords,
    #[error("output buffer is too small")]
    BufferTooSmall,
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input bytes (or the name handed to the encoder) are malformed
    Format,
    /// The output does not fit, or a length limit was hit while encoding
    Capacity,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::LabelTooLong
            | Error::NameTooLong
            | Error::TooManyRecords
            | Error::BufferTooSmall => ErrorKind::Capacity,
            _ => ErrorKind::Format,
        }
    }
}
