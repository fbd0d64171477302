//! Domain names in their label/length wire form
//!
//! Decoding follows compression pointers; encoding writes names literally.

use byteorder::{BigEndian, ByteOrder};

use super::Error;

/// Longest label allowed on the wire
pub const MAX_LABEL_LEN: usize = 63;
/// Longest name allowed on the wire, length octets and terminator included
pub const MAX_NAME_LEN: usize = 255;
/// Upper bound on labels plus pointers followed while decoding one name
pub const MAX_LABELS: usize = 128;
/// Largest offset a compression pointer can hold
pub const MAX_POINTER: usize = 0x3FFF;

const POINTER: u8 = 0b1100_0000;
const LABEL_FORMAT: u8 = 0b1100_0000;

/// Reads the name starting at `offset` in `message`
///
/// Returns the dotted name and how far the caller's cursor moves: a
/// compression pointer counts as its two bytes, whatever it refers to.
/// Pointers must refer to a position before themselves.
pub fn scan_name(message: &[u8], offset: usize) -> Result<(String, usize), Error> {
    let mut name = String::new();
    let mut pos = offset;
    let mut advance = None;
    let mut wire_len = 0;
    let mut steps = 0;

    loop {
        let byte = *message.get(pos).ok_or(Error::UnexpectedEOF)?;
        if byte == 0 {
            return Ok((name, advance.unwrap_or(pos + 1 - offset)));
        }

        steps += 1;
        if steps > MAX_LABELS {
            return Err(Error::TooManyLabels);
        }

        match byte & LABEL_FORMAT {
            0 => {
                let start = pos + 1;
                let end = start + byte as usize;
                let label = message.get(start..end).ok_or(Error::UnexpectedEOF)?;

                wire_len += 1 + label.len();
                if wire_len + 1 > MAX_NAME_LEN {
                    return Err(Error::OversizedName);
                }

                if !name.is_empty() {
                    name.push('.');
                }
                push_label(&mut name, label);
                pos = end;
            }
            POINTER => {
                let raw = message.get(pos..pos + 2).ok_or(Error::UnexpectedEOF)?;
                let target = (BigEndian::read_u16(raw) & !0b1100_0000_0000_0000) as usize;
                if target >= pos {
                    return Err(Error::BadPointer(target));
                }
                if advance.is_none() {
                    advance = Some(pos + 2 - offset);
                }
                pos = target;
            }
            _ => return Err(Error::UnknownLabelFormat),
        }
    }
}

fn push_label(name: &mut String, label: &[u8]) {
    for &byte in label {
        match byte {
            b'.' => name.push_str("\\."),
            b'\\' => name.push_str("\\\\"),
            0x21..=0x7E => name.push(byte as char),
            _ => name.push_str(&format!("\\{:03}", byte)),
        }
    }
}

/// Encodes `name` into its uncompressed wire form
///
/// Accepts the escapes produced by [`scan_name`] (`\.`, `\\`, `\DDD`) and one
/// optional trailing dot. The empty string and `"."` encode the root.
pub fn encode_name(name: &str) -> Result<Vec<u8>, Error> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() + 2);
    if bytes.is_empty() || bytes == b"." {
        out.push(0);
        return Ok(out);
    }

    let mut label = Vec::with_capacity(MAX_LABEL_LEN);
    let mut after_dot = false;
    let mut i = 0;
    while i < bytes.len() {
        after_dot = false;
        match bytes[i] {
            b'.' => {
                finish_label(&mut out, &mut label)?;
                after_dot = true;
                i += 1;
            }
            b'\\' => {
                let next = *bytes.get(i + 1).ok_or(Error::InvalidEscape)?;
                if next.is_ascii_digit() {
                    let digits = bytes.get(i + 1..i + 4).ok_or(Error::InvalidEscape)?;
                    if !digits.iter().all(u8::is_ascii_digit) {
                        return Err(Error::InvalidEscape);
                    }
                    let value = digits
                        .iter()
                        .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));
                    if value > 255 {
                        return Err(Error::InvalidEscape);
                    }
                    label.push(value as u8);
                    i += 4;
                } else {
                    label.push(next);
                    i += 2;
                }
            }
            byte => {
                label.push(byte);
                i += 1;
            }
        }
    }
    if !after_dot {
        finish_label(&mut out, &mut label)?;
    }

    out.push(0);
    if out.len() > MAX_NAME_LEN {
        return Err(Error::NameTooLong);
    }
    Ok(out)
}

fn finish_label(out: &mut Vec<u8>, label: &mut Vec<u8>) -> Result<(), Error> {
    if label.is_empty() {
        return Err(Error::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(Error::LabelTooLong);
    }
    out.push(label.len() as u8);
    out.append(label);
    Ok(())
}

/// Number of bytes [`write_name`] needs for `name`
pub fn encoded_len(name: &str) -> Result<usize, Error> {
    encode_name(name).map(|wire| wire.len())
}

/// Writes `name` at `offset` in `buf`, returning the bytes written
pub fn write_name(name: &str, buf: &mut [u8], offset: usize) -> Result<usize, Error> {
    let wire = encode_name(name)?;
    let end = offset + wire.len();
    buf.get_mut(offset..end)
        .ok_or(Error::BufferTooSmall)?
        .copy_from_slice(&wire);
    Ok(wire.len())
}
