//! Bytes to [`Item`] tree.

use tessera_format::IntWidth;

use crate::{CborError, Item, trace};

// Major types
const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

// Additional information
const AI_ONE_BYTE: u8 = 24;
const AI_INDEFINITE: u8 = 31;

// Major type 7 values
const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;
const SIMPLE_UNDEFINED: u8 = 23;
const FLOAT_HALF: u8 = 25;
const FLOAT_SINGLE: u8 = 26;
const FLOAT_DOUBLE: u8 = 27;

/// Containers nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 512;

/// Decode exactly one item spanning all of `input`.
pub fn decode(input: &[u8]) -> Result<Item, CborError> {
    let mut decoder = Decoder::new(input);
    let item = decoder.item(0)?;
    if decoder.pos != input.len() {
        return Err(CborError::TrailingBytes {
            offset: decoder.pos,
        });
    }
    Ok(item)
}

struct Decoder<'de> {
    input: &'de [u8],
    pos: usize,
}

struct Header {
    major: u8,
    info: u8,
    argument: u64,
    offset: usize,
}

impl<'de> Decoder<'de> {
    const fn new(input: &'de [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn read_byte(&mut self) -> Result<u8, CborError> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or(CborError::UnexpectedEof { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'de [u8], CborError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or(CborError::UnexpectedEof {
                offset: self.input.len(),
            })?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Initial byte plus its argument.
    ///
    /// Additional information 24 to 27 selects a 1, 2, 4 or 8-byte argument;
    /// 28 to 30 name 16, 32 and 64-byte widths no integer type has.
    fn header(&mut self) -> Result<Header, CborError> {
        let offset = self.pos;
        let initial = self.read_byte()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        let argument = match info {
            0..AI_ONE_BYTE => u64::from(info),
            AI_INDEFINITE => {
                return Err(CborError::Unsupported {
                    what: "indefinite-length item",
                    offset,
                });
            }
            _ => {
                let width = IntWidth::from_bytes(1 << (info - AI_ONE_BYTE))?;
                width.read_be(self.read_bytes(width.bytes())?)
            }
        };
        Ok(Header {
            major,
            info,
            argument,
            offset,
        })
    }

    fn length(&self, header: &Header) -> Result<usize, CborError> {
        // a length beyond the remaining input can never be satisfied
        usize::try_from(header.argument)
            .ok()
            .filter(|len| *len <= self.input.len() - self.pos)
            .ok_or(CborError::UnexpectedEof {
                offset: self.input.len(),
            })
    }

    fn item(&mut self, depth: usize) -> Result<Item, CborError> {
        let header = self.header()?;
        trace!(major = header.major, offset = header.offset, "item");
        match header.major {
            MAJOR_UNSIGNED => Ok(Item::Unsigned(header.argument)),
            MAJOR_NEGATIVE => Ok(Item::Negative(header.argument)),
            MAJOR_BYTES => {
                let len = self.length(&header)?;
                Ok(Item::Bytes(self.read_bytes(len)?.to_vec()))
            }
            MAJOR_TEXT => {
                let len = self.length(&header)?;
                let bytes = self.read_bytes(len)?;
                let text = core::str::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8 {
                    offset: header.offset,
                })?;
                Ok(Item::Text(text.to_owned()))
            }
            MAJOR_ARRAY => {
                let depth = self.enter(depth, &header)?;
                // every item takes at least one byte, so this bounds the allocation
                let len = self.length(&header)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.item(depth)?);
                }
                Ok(Item::Array(items))
            }
            MAJOR_MAP => {
                let depth = self.enter(depth, &header)?;
                let len = self.length(&header)?;
                let mut entries = Vec::with_capacity(len);
                for _ in 0..len {
                    let key = self.item(depth)?;
                    let value = self.item(depth)?;
                    entries.push((key, value));
                }
                Ok(Item::Map(entries))
            }
            MAJOR_TAG => Err(CborError::Unsupported {
                what: "tagged item",
                offset: header.offset,
            }),
            MAJOR_SIMPLE => simple(&header),
            _ => unreachable!("major type is three bits"),
        }
    }

    fn enter(&self, depth: usize, header: &Header) -> Result<usize, CborError> {
        if depth >= MAX_DEPTH {
            return Err(CborError::TooDeep {
                offset: header.offset,
            });
        }
        Ok(depth + 1)
    }
}

fn simple(header: &Header) -> Result<Item, CborError> {
    match header.info {
        SIMPLE_FALSE => Ok(Item::Bool(false)),
        SIMPLE_TRUE => Ok(Item::Bool(true)),
        SIMPLE_NULL | SIMPLE_UNDEFINED => Ok(Item::Null),
        FLOAT_HALF => Ok(Item::Float(half_to_f64(header.argument as u16))),
        FLOAT_SINGLE => Ok(Item::Float(f64::from(f32::from_bits(
            header.argument as u32,
        )))),
        FLOAT_DOUBLE => Ok(Item::Float(f64::from_bits(header.argument))),
        _ => Err(CborError::Unsupported {
            what: "unassigned simple value",
            offset: header.offset,
        }),
    }
}

/// Widen an IEEE 754 half-precision float.
fn half_to_f64(bits: u16) -> f64 {
    let sign = if bits & 0x8000 == 0 { 1.0 } else { -1.0 };
    let exponent = i32::from((bits >> 10) & 0x1f);
    let fraction = f64::from(bits & 0x03ff);
    let magnitude = match exponent {
        0 => fraction * 2f64.powi(-24),
        0x1f if fraction == 0.0 => f64::INFINITY,
        0x1f => f64::NAN,
        _ => (1.0 + fraction / 1024.0) * 2f64.powi(exponent - 15),
    };
    sign * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_format::ErrorKind;

    #[tessera_testhelpers::test]
    fn immediate_and_sized_arguments() {
        assert_eq!(decode(&[0x17]).unwrap(), Item::Unsigned(23));
        assert_eq!(decode(&[0x18, 0x18]).unwrap(), Item::Unsigned(24));
        assert_eq!(decode(&[0x19, 0x01, 0x00]).unwrap(), Item::Unsigned(256));
        assert_eq!(
            decode(&[0x1a, 0x00, 0x01, 0x00, 0x00]).unwrap(),
            Item::Unsigned(65536)
        );
        assert_eq!(
            decode(&[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap(),
            Item::Unsigned(u64::MAX)
        );
    }

    #[tessera_testhelpers::test]
    fn non_minimal_widths_are_accepted() {
        assert_eq!(decode(&[0x19, 0x00, 0x05]).unwrap(), Item::Unsigned(5));
        assert_eq!(decode(&[0x38, 0x00]).unwrap(), Item::Negative(0));
    }

    #[tessera_testhelpers::test]
    fn reserved_widths_are_unknown() {
        for initial in [0x1c, 0x1d, 0x1e, 0x3c] {
            let err = decode(&[initial, 0, 0]).unwrap_err();
            assert!(
                matches!(err.kind(), Some(ErrorKind::UnknownWidth { .. })),
                "{initial:#x}: {err}"
            );
        }
        let err = decode(&[0x1c]).unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::UnknownWidth { bytes: 16 }));
    }

    #[tessera_testhelpers::test]
    fn strings_and_containers() {
        assert_eq!(
            decode(&[0x63, b'a', b'b', b'c']).unwrap(),
            Item::Text("abc".into())
        );
        assert_eq!(decode(&[0x42, 1, 2]).unwrap(), Item::Bytes(vec![1, 2]));
        assert_eq!(
            decode(&[0x82, 0x01, 0x20]).unwrap(),
            Item::Array(vec![Item::Unsigned(1), Item::Negative(0)])
        );
        assert_eq!(
            decode(&[0xa1, 0x61, b'k', 0xf6]).unwrap(),
            Item::Map(vec![(Item::Text("k".into()), Item::Null)])
        );
    }

    #[tessera_testhelpers::test]
    fn simple_values_and_floats() {
        assert_eq!(decode(&[0xf4]).unwrap(), Item::Bool(false));
        assert_eq!(decode(&[0xf5]).unwrap(), Item::Bool(true));
        assert_eq!(decode(&[0xf7]).unwrap(), Item::Null);
        assert_eq!(decode(&[0xf9, 0x3c, 0x00]).unwrap(), Item::Float(1.0));
        assert_eq!(decode(&[0xf9, 0xc4, 0x00]).unwrap(), Item::Float(-4.0));
        assert_eq!(decode(&[0xf9, 0x00, 0x01]).unwrap(), Item::Float(2f64.powi(-24)));
        assert_eq!(
            decode(&[0xf9, 0x7c, 0x00]).unwrap(),
            Item::Float(f64::INFINITY)
        );
        assert_eq!(
            decode(&[0xfa, 0x3f, 0xc0, 0x00, 0x00]).unwrap(),
            Item::Float(1.5)
        );
        assert_eq!(
            decode(&[0xfb, 0x3f, 0xb9, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]).unwrap(),
            Item::Float(0.1)
        );
    }

    #[tessera_testhelpers::test]
    fn malformed_input() {
        assert!(matches!(
            decode(&[0x9f, 0x01, 0xff]),
            Err(CborError::Unsupported { offset: 0, .. })
        ));
        assert!(matches!(
            decode(&[0xc1, 0x01]),
            Err(CborError::Unsupported { offset: 0, .. })
        ));
        assert!(matches!(
            decode(&[0x82, 0x01]),
            Err(CborError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            decode(&[0x01, 0x02]),
            Err(CborError::TrailingBytes { offset: 1 })
        ));
        assert!(matches!(
            decode(&[0x62, 0xff, 0xfe]),
            Err(CborError::InvalidUtf8 { offset: 0 })
        ));
        assert!(matches!(
            decode(&[0x9b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            Err(CborError::UnexpectedEof { .. })
        ));
    }

    #[tessera_testhelpers::test]
    fn nesting_is_bounded() {
        let input = vec![0x81; MAX_DEPTH + 1];
        assert!(matches!(decode(&input), Err(CborError::TooDeep { .. })));
    }
}
