//! Serde mirror of the Yosys JSON document.

use clkmap_common::Logic;
use clkmap_netlist::{AttrValue, PortDirection};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A JSON object whose key order is significant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NamedMap<T>(pub Vec<(String, T)>);

impl<T> Default for NamedMap<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> NamedMap<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn push(&mut self, key: String, value: T) {
        self.0.push((key, value));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for NamedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for NamedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamedMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for NamedMapVisitor<T> {
            type Value = NamedMap<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((k, v)) = access.next_entry::<String, T>()? {
                    entries.push((k, v));
                }
                Ok(NamedMap(entries))
            }
        }

        deserializer.deserialize_map(NamedMapVisitor(PhantomData))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonDesign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default)]
    pub modules: NamedMap<JsonModule>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct JsonModule {
    #[serde(default)]
    pub attributes: NamedMap<JsonAttr>,
    #[serde(default)]
    pub ports: NamedMap<JsonPort>,
    #[serde(default)]
    pub cells: NamedMap<JsonCell>,
    #[serde(default)]
    pub netnames: NamedMap<JsonNet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum JsonDirection {
    Input,
    Output,
    Inout,
}

impl From<JsonDirection> for PortDirection {
    fn from(dir: JsonDirection) -> Self {
        match dir {
            JsonDirection::Input => PortDirection::Input,
            JsonDirection::Output => PortDirection::Output,
            JsonDirection::Inout => PortDirection::InOut,
        }
    }
}

impl From<PortDirection> for JsonDirection {
    fn from(dir: PortDirection) -> Self {
        match dir {
            PortDirection::Input => JsonDirection::Input,
            PortDirection::Output => JsonDirection::Output,
            PortDirection::InOut => JsonDirection::Inout,
        }
    }
}

/// A net number, or a constant written as `"0"`, `"1"`, `"x"`, or `"z"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonBit {
    Net(u64),
    Const(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonPort {
    pub direction: JsonDirection,
    pub bits: Vec<JsonBit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonCell {
    #[serde(default)]
    pub hide_name: u8,
    #[serde(rename = "type")]
    pub cell_type: String,
    #[serde(default)]
    pub parameters: NamedMap<JsonAttr>,
    #[serde(default)]
    pub attributes: NamedMap<JsonAttr>,
    #[serde(default, skip_serializing_if = "NamedMap::is_empty")]
    pub port_directions: NamedMap<JsonDirection>,
    #[serde(default)]
    pub connections: NamedMap<Vec<JsonBit>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonNet {
    #[serde(default)]
    pub hide_name: u8,
    pub bits: Vec<JsonBit>,
    #[serde(default)]
    pub attributes: NamedMap<JsonAttr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonAttr {
    Int(i64),
    Str(String),
}

fn is_bit_string(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| matches!(c, '0' | '1' | 'x' | 'z'))
}

impl From<&JsonAttr> for AttrValue {
    fn from(attr: &JsonAttr) -> Self {
        match attr {
            JsonAttr::Int(v) => AttrValue::Int(*v),
            JsonAttr::Str(s) => {
                if let Some(text) = s.strip_suffix(' ') {
                    AttrValue::Str(text.to_string())
                } else if is_bit_string(s) {
                    AttrValue::Bits(s.chars().rev().filter_map(Logic::from_char).collect())
                } else {
                    AttrValue::Str(s.clone())
                }
            }
        }
    }
}

impl From<&AttrValue> for JsonAttr {
    fn from(value: &AttrValue) -> Self {
        match value {
            AttrValue::Int(v) => JsonAttr::Int(*v),
            AttrValue::Bits(bits) => {
                JsonAttr::Str(bits.iter().rev().map(|b| b.to_char()).collect())
            }
            AttrValue::Str(s) if is_bit_string(s) || s.ends_with(' ') => {
                JsonAttr::Str(format!("{s} "))
            }
            AttrValue::Str(s) => JsonAttr::Str(s.clone()),
        }
    }
}

/// Returns `1` for names the netlist generated itself.
pub(crate) fn hide_name(name: &str) -> u8 {
    u8::from(name.starts_with('$'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_strings() {
        let bits = AttrValue::from(&JsonAttr::Str("10".into()));
        assert_eq!(bits, AttrValue::Bits(vec![Logic::Zero, Logic::One]));
        let text = AttrValue::from(&JsonAttr::Str("101 ".into()));
        assert_eq!(text, AttrValue::Str("101".into()));
        let plain = AttrValue::from(&JsonAttr::Str("I".into()));
        assert_eq!(plain, AttrValue::Str("I".into()));
    }

    #[test]
    fn string_that_looks_like_bits_is_escaped() {
        let attr = JsonAttr::from(&AttrValue::Str("01".into()));
        assert_eq!(attr, JsonAttr::Str("01 ".into()));
        assert_eq!(AttrValue::from(&attr), AttrValue::Str("01".into()));
    }

    #[test]
    fn named_map_keeps_order() {
        let map: NamedMap<u32> = serde_json::from_str(r#"{"z": 1, "a": 2}"#).unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn bits_deserialize_as_nets_or_constants() {
        let bits: Vec<JsonBit> = serde_json::from_str(r#"[2, "1", 3]"#).unwrap();
        assert_eq!(
            bits,
            vec![JsonBit::Net(2), JsonBit::Const("1".into()), JsonBit::Net(3)]
        );
    }

    #[test]
    fn generated_names_are_hidden() {
        assert_eq!(hide_name("$clkmap$0"), 1);
        assert_eq!(hide_name("clk"), 0);
    }
}
