//! Attribute and parameter values attached to modules, wires, and cells.

use clkmap_common::{Ident, Interner, Logic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The value of an attribute or cell parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A bit constant, LSB first.
    Bits(Vec<Logic>),
    /// A plain integer.
    Int(i64),
    /// A string.
    Str(String),
}

impl AttrValue {
    /// The conventional encoding of a boolean flag.
    pub fn flag(value: bool) -> Self {
        AttrValue::Bits(vec![if value { Logic::One } else { Logic::Zero }])
    }

    /// Interprets the value as a boolean flag.
    ///
    /// Returns `None` for strings, which have no boolean meaning.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bits(bits) => Some(bits.contains(&Logic::One)),
            AttrValue::Int(v) => Some(*v != 0),
            AttrValue::Str(_) => None,
        }
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Interprets fully-defined bits (or an integer) as an unsigned number.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttrValue::Int(v) => u64::try_from(*v).ok(),
            AttrValue::Bits(bits) if bits.len() <= 64 => {
                let mut value = 0u64;
                for (i, bit) in bits.iter().enumerate() {
                    match bit {
                        Logic::One => value |= 1 << i,
                        Logic::Zero => {}
                        Logic::X | Logic::Z => return None,
                    }
                }
                Some(value)
            }
            _ => None,
        }
    }

    /// Compares against a textual value as written in a selection pattern.
    ///
    /// Strings compare verbatim; numbers compare by decimal value, and bit
    /// constants also match their own MSB-first bit string.
    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            AttrValue::Str(s) => s == text,
            AttrValue::Int(v) => v.to_string() == text,
            AttrValue::Bits(bits) => {
                let msb_first: String = bits.iter().rev().map(|b| b.to_char()).collect();
                msb_first == text || self.as_u64().is_some_and(|v| v.to_string() == text)
            }
        }
    }
}

/// An ordered attribute map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes(BTreeMap<Ident, AttrValue>);

impl Attributes {
    /// Creates an empty attribute map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: Ident) -> Option<&AttrValue> {
        self.0.get(&name)
    }

    /// Returns the value stored under the attribute named `name`.
    ///
    /// A name the interner has never seen cannot be present.
    pub fn get_named(&self, interner: &Interner, name: &str) -> Option<&AttrValue> {
        interner.get(name).and_then(|id| self.get(id))
    }

    /// Returns `true` if the named attribute is present and a true flag.
    pub fn flag(&self, interner: &Interner, name: &str) -> bool {
        self.get_named(interner, name)
            .and_then(AttrValue::as_bool)
            .unwrap_or(false)
    }

    /// Stores a value, replacing any previous one.
    pub fn set(&mut self, name: Ident, value: AttrValue) {
        self.0.insert(name, value);
    }

    /// Removes a value.
    pub fn remove(&mut self, name: Ident) -> Option<AttrValue> {
        self.0.remove(&name)
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns `true` if no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (Ident, &AttrValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}
