use tessera_format::SignedMagnitude;

/// One decoded CBOR data item.
///
/// Integers keep CBOR's split between major types 0 and 1: a
/// [`Item::Negative`] holds the stored magnitude `m` of the value `-m - 1`.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Major type 0.
    Unsigned(u64),
    /// Major type 1, as its stored magnitude.
    Negative(u64),
    /// Major type 2.
    Bytes(Vec<u8>),
    /// Major type 3.
    Text(String),
    /// Major type 4.
    Array(Vec<Item>),
    /// Major type 5, entries in input order.
    Map(Vec<(Item, Item)>),
    /// Simple values 20 and 21.
    Bool(bool),
    /// Simple values 22 (null) and 23 (undefined).
    Null,
    /// Half, single or double precision float, widened.
    Float(f64),
}

impl Item {
    /// Build the item for a signed integer, choosing the major type by sign.
    pub const fn from_i64(value: i64) -> Self {
        let SignedMagnitude { negative, magnitude } = SignedMagnitude::encode(value);
        if negative {
            Item::Negative(magnitude)
        } else {
            Item::Unsigned(magnitude)
        }
    }

    /// Short name of the item's kind.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Item::Unsigned(_) => "unsigned integer",
            Item::Negative(_) => "negative integer",
            Item::Bytes(_) => "byte string",
            Item::Text(_) => "text string",
            Item::Array(_) => "array",
            Item::Map(_) => "map",
            Item::Bool(_) => "bool",
            Item::Null => "null",
            Item::Float(_) => "float",
        }
    }
}
