//! Group Codec
//!
//! Blob layouts stored in the shared map:
//!
//! ```text
//! {                         {
//!   "strings" : {             "keys" : [ "a", "b" ]
//!     "1.0" : "cfg"         }
//!   }
//! }
//! ```
//!
//! Writes use the Jackson default pretty-printer layout above so blobs are
//! byte-identical to the ones older gateway nodes produce; compare-and-swap
//! compares raw bytes, and mixed-version clusters must agree on them.
//! Reads accept any JSON of the right shape.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::ser::{CharEscape, CompactFormatter, Formatter};
use std::collections::BTreeSet;
use std::fmt;
use std::io;

/// Secondary key to value mapping for one primary key, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    strings: Entries,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, secondary_key: &str) -> Option<&str> {
        self.strings.position(secondary_key).map(|i| self.strings.0[i].1.as_str())
    }

    pub fn contains(&self, secondary_key: &str) -> bool {
        self.strings.position(secondary_key).is_some()
    }

    /// Sets `secondary_key`, keeping its original position if it already exists.
    pub fn insert(&mut self, secondary_key: &str, value: &str) {
        self.strings.upsert(secondary_key.to_string(), value.to_string());
    }

    pub fn remove(&mut self, secondary_key: &str) -> Option<String> {
        let i = self.strings.position(secondary_key)?;
        Some(self.strings.0.remove(i).1)
    }

    pub fn values(&self) -> Vec<String> {
        self.strings.0.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.0.is_empty()
    }
}

/// Every primary key that has ever been written, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyIndex {
    keys: BTreeSet<String>,
}

impl KeyIndex {
    /// Returns false if the key was already indexed.
    pub fn insert(&mut self, primary_key: &str) -> bool {
        self.keys.insert(primary_key.to_string())
    }

    pub fn into_keys(self) -> BTreeSet<String> {
        self.keys
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut ser = serde_json::Serializer::with_formatter(Vec::new(), JacksonFormatter::default());
    value.serialize(&mut ser)?;
    // The serializer only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&ser.into_inner()).into_owned())
}

pub fn decode_group(blob: &str) -> Result<Group, serde_json::Error> {
    serde_json::from_str(blob)
}

/// An empty blob is treated as an empty index.
pub fn decode_key_index(blob: &str) -> Result<KeyIndex, serde_json::Error> {
    if blob.is_empty() {
        return Ok(KeyIndex::default());
    }
    serde_json::from_str(blob)
}

/// Ordered string pairs, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Entries(Vec<(String, String)>);

impl Entries {
    fn position(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k == key)
    }

    fn upsert(&mut self, key: String, value: String) {
        match self.position(&key) {
            Some(i) => self.0[i].1 = value,
            None => self.0.push((key, value)),
        }
    }
}

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Entries, A::Error> {
                let mut entries = Entries(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    entries.upsert(k, v);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Mirrors Jackson's `DefaultPrettyPrinter`: objects indented two spaces per
/// level with `" : "` separators, arrays kept inline as `[ a, b ]`.
#[derive(Default)]
struct JacksonFormatter {
    depth: usize,
    non_empty: Vec<bool>,
}

impl JacksonFormatter {
    fn newline<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"\n")?;
        for _ in 0..self.depth {
            writer.write_all(b"  ")?;
        }
        Ok(())
    }
}

impl Formatter for JacksonFormatter {
    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.non_empty.push(false);
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        if self.non_empty.pop().unwrap_or(false) {
            self.newline(writer)?;
        } else {
            writer.write_all(b" ")?;
        }
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if let Some(flag) = self.non_empty.last_mut() {
            *flag = true;
        }
        if !first {
            writer.write_all(b",")?;
        }
        self.newline(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    /// Jackson spells the remaining control characters as `\u00XX` with
    /// uppercase hex; the short escapes (`\n`, `\t`, ...) are the same.
    fn write_char_escape<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        char_escape: CharEscape,
    ) -> io::Result<()> {
        match char_escape {
            CharEscape::AsciiControl(byte) => write!(writer, "\\u{:04X}", byte),
            other => CompactFormatter.write_char_escape(writer, other),
        }
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" ]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            writer.write_all(b" ")
        } else {
            writer.write_all(b", ")
        }
    }
}
