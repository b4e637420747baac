//! Configuration types deserialized from `clkmap.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level configuration parsed from `clkmap.toml`.
///
/// Every section is optional in the file. Whether a buffer or pad is
/// configured at all is checked when the insertion pass starts, after
/// command-line overrides have been applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClkmapConfig {
    /// The clock buffer cell to insert.
    #[serde(default)]
    pub buffer: Option<CellSection>,
    /// The input pad cell to insert on top-level clock inputs.
    #[serde(default)]
    pub pad: Option<CellSection>,
    /// Restricts which wires may be buffered.
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Regional buffer types that chain from an inserted buffer.
    #[serde(default)]
    pub secondary: SecondaryConfig,
    /// Tag seeds for library cells.
    #[serde(default)]
    pub library: LibraryTags,
    /// Module to mark as the design top when none carries the attribute.
    #[serde(default)]
    pub top: Option<String>,
}

impl ClkmapConfig {
    /// The parsed buffer cell, if configured.
    pub fn buffer_spec(&self) -> Option<CellSpec> {
        self.buffer.as_ref().map(CellSection::spec)
    }

    /// The parsed pad cell, if configured.
    pub fn pad_spec(&self) -> Option<CellSpec> {
        self.pad.as_ref().map(CellSection::spec)
    }
}

/// A `[buffer]` or `[pad]` section as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CellSection {
    /// The cell type name.
    pub cell: String,
    /// `"out:in"`, or a single port name used for both.
    pub ports: String,
}

impl CellSection {
    /// Splits the port pair.
    pub fn spec(&self) -> CellSpec {
        CellSpec::parse(&self.cell, &self.ports)
    }
}

/// A cell type with the port facing clock sinks and the port facing the
/// original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSpec {
    /// The cell type name.
    pub cell_type: String,
    /// Connects toward the clock sinks.
    pub out_port: String,
    /// Connects toward the original source.
    pub in_port: String,
}

impl CellSpec {
    /// Builds a spec from a type name and an `"out:in"` port pair.
    ///
    /// Without a `:` the same name is used for both ports.
    pub fn parse(cell_type: &str, ports: &str) -> Self {
        let (out_port, in_port) = ports.split_once(':').unwrap_or((ports, ports));
        Self {
            cell_type: cell_type.to_string(),
            out_port: out_port.to_string(),
            in_port: in_port.to_string(),
        }
    }
}

/// The `[selection]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionConfig {
    /// Selection patterns. Accepts a single string or a list.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub patterns: Vec<String>,
}

/// The `[secondary]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SecondaryConfig {
    /// Secondary buffer cell types and their input port.
    #[serde(default = "default_secondary_cells")]
    pub cells: Vec<SecondaryCell>,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            cells: default_secondary_cells(),
        }
    }
}

/// A regional buffer type whose single input must follow the primary buffer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecondaryCell {
    /// The cell type name.
    pub cell: String,
    /// The single-bit input port.
    pub port: String,
}

fn default_secondary_cells() -> Vec<SecondaryCell> {
    ["BUFR", "BUFIO"]
        .into_iter()
        .map(|cell| SecondaryCell {
            cell: cell.to_string(),
            port: "I".to_string(),
        })
        .collect()
}

/// The `[library]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryTags {
    /// Ports that consume a clock.
    #[serde(default)]
    pub sinks: Vec<PortTag>,
    /// Ports that supply an already buffered clock.
    #[serde(default)]
    pub drivers: Vec<PortTag>,
    /// Inverting cells whose output and input ports are paired bit by bit.
    #[serde(default)]
    pub inverters: Vec<InverterTag>,
}

/// A tagged port of a library cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortTag {
    /// The cell type name.
    pub cell: String,
    /// The port name.
    pub port: String,
    /// Number of bits tagged, starting at bit 0.
    #[serde(default = "default_width")]
    pub width: u32,
}

/// An inverter pairing on a library cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InverterTag {
    /// The cell type name.
    pub cell: String,
    /// The inverted output port.
    pub output: String,
    /// The input port feeding it.
    pub input: String,
    /// Number of paired bits, starting at bit 0.
    #[serde(default = "default_width")]
    pub width: u32,
}

fn default_width() -> u32 {
    1
}

/// Accepts either `patterns = "w:clk"` or `patterns = ["w:clk", "w:aux"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
