//! [`Item`] tree to bytes, in preferred serialization: every argument uses
//! the shortest form that holds it.

use tessera_format::IntWidth;

use crate::Item;

const FLOAT_SINGLE: u8 = 0xfa;
const FLOAT_DOUBLE: u8 = 0xfb;
const FALSE: u8 = 0xf4;
const TRUE: u8 = 0xf5;
const NULL: u8 = 0xf6;

/// Append the encoding of `item` to `out`.
pub fn encode(item: &Item, out: &mut Vec<u8>) {
    match item {
        Item::Unsigned(v) => header(0, *v, out),
        Item::Negative(m) => header(1, *m, out),
        Item::Bytes(bytes) => {
            header(2, bytes.len() as u64, out);
            out.extend_from_slice(bytes);
        }
        Item::Text(text) => {
            header(3, text.len() as u64, out);
            out.extend_from_slice(text.as_bytes());
        }
        Item::Array(items) => {
            header(4, items.len() as u64, out);
            for item in items {
                encode(item, out);
            }
        }
        Item::Map(entries) => {
            header(5, entries.len() as u64, out);
            for (key, value) in entries {
                encode(key, out);
                encode(value, out);
            }
        }
        Item::Bool(false) => out.push(FALSE),
        Item::Bool(true) => out.push(TRUE),
        Item::Null => out.push(NULL),
        Item::Float(v) => float(*v, out),
    }
}

fn header(major: u8, argument: u64, out: &mut Vec<u8>) {
    let major = major << 5;
    if argument < 24 {
        out.push(major | argument as u8);
        return;
    }
    let width = IntWidth::fitting(argument);
    let info = match width {
        IntWidth::W8 => 24,
        IntWidth::W16 => 25,
        IntWidth::W32 => 26,
        IntWidth::W64 => 27,
    };
    out.push(major | info);
    width.write_be(argument, out);
}

/// Single precision when it holds the value exactly, double otherwise.
fn float(value: f64, out: &mut Vec<u8>) {
    let single = value as f32;
    if f64::from(single) == value {
        out.push(FLOAT_SINGLE);
        out.extend_from_slice(&single.to_bits().to_be_bytes());
    } else {
        out.push(FLOAT_DOUBLE);
        out.extend_from_slice(&value.to_bits().to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(item: Item) -> Vec<u8> {
        let mut out = Vec::new();
        encode(&item, &mut out);
        out
    }

    #[tessera_testhelpers::test]
    fn integers_use_the_smallest_width() {
        assert_eq!(bytes(Item::Unsigned(0)), [0x00]);
        assert_eq!(bytes(Item::Unsigned(23)), [0x17]);
        assert_eq!(bytes(Item::Unsigned(24)), [0x18, 0x18]);
        assert_eq!(bytes(Item::Unsigned(255)), [0x18, 0xff]);
        assert_eq!(bytes(Item::Unsigned(256)), [0x19, 0x01, 0x00]);
        assert_eq!(bytes(Item::Unsigned(65536)), [0x1a, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(bytes(Item::Unsigned(u64::MAX))[0], 0x1b);
    }

    #[tessera_testhelpers::test]
    fn negative_integers_store_the_magnitude() {
        assert_eq!(bytes(Item::from_i64(-1)), [0x20]);
        assert_eq!(bytes(Item::from_i64(-24)), [0x37]);
        assert_eq!(bytes(Item::from_i64(-25)), [0x38, 0x18]);
        assert_eq!(bytes(Item::from_i64(-128)), [0x38, 0x7f]);
        assert_eq!(bytes(Item::from_i64(-32768)), [0x39, 0x7f, 0xff]);
        assert_eq!(
            bytes(Item::from_i64(i64::MIN)),
            [0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[tessera_testhelpers::test]
    fn floats_narrow_when_exact() {
        assert_eq!(bytes(Item::Float(1.5)), [0xfa, 0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(
            bytes(Item::Float(0.1)),
            [0xfb, 0x3f, 0xb9, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]
        );
    }

    #[tessera_testhelpers::test]
    fn containers() {
        assert_eq!(
            bytes(Item::Map(vec![(
                Item::Text("a".into()),
                Item::Array(vec![Item::Bool(true), Item::Null])
            )])),
            [0xa1, 0x61, b'a', 0x82, 0xf5, 0xf6]
        );
    }
}
