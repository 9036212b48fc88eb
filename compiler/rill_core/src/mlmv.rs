//! Multi-level map values.
//!
//! An [`Mlmv`] is either a terminal scalar or an insertion-ordered map from
//! string keys to further [`Mlmv`]s. Out-of-stream variables, map-valued
//! locals and map literals are all `Mlmv`s.

use std::fmt;

use crate::internal::internal_coding_error;
use crate::lhm::Lhm;
use crate::mlrval::Mlrval;

/// One level of a multi-level map.
pub type MlmvMap = Lhm<String, Mlmv>;

#[derive(Clone, Debug, PartialEq)]
pub enum Mlmv {
    Terminal(Mlrval),
    Map(MlmvMap),
}

impl Default for Mlmv {
    fn default() -> Self {
        Mlmv::absent()
    }
}

impl Mlmv {
    #[inline]
    pub const fn absent() -> Self {
        Mlmv::Terminal(Mlrval::Absent)
    }

    #[inline]
    pub const fn empty_map() -> Self {
        Mlmv::Map(Lhm::new())
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Mlmv::Terminal(Mlrval::Absent))
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, Mlmv::Map(_))
    }

    pub fn as_terminal(&self) -> Option<&Mlrval> {
        match self {
            Mlmv::Terminal(value) => Some(value),
            Mlmv::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&MlmvMap> {
        match self {
            Mlmv::Map(map) => Some(map),
            Mlmv::Terminal(_) => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut MlmvMap> {
        match self {
            Mlmv::Map(map) => Some(map),
            Mlmv::Terminal(_) => None,
        }
    }

    pub fn into_terminal(self) -> Option<Mlrval> {
        match self {
            Mlmv::Terminal(value) => Some(value),
            Mlmv::Map(_) => None,
        }
    }

    /// Type name of the value: the scalar's, or `map`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Mlmv::Terminal(value) => value.type_name(),
            Mlmv::Map(_) => "map",
        }
    }

    /// The value at `path`. An empty path is the value itself; a path that
    /// runs into a terminal or a missing key is `None`.
    pub fn get(&self, path: &[String]) -> Option<&Mlmv> {
        let mut level = self;
        for key in path {
            level = level.as_map()?.get(key.as_str())?;
        }
        Some(level)
    }

    pub fn get_mut(&mut self, path: &[String]) -> Option<&mut Mlmv> {
        let mut level = self;
        for key in path {
            level = level.as_map_mut()?.get_mut(key.as_str())?;
        }
        Some(level)
    }

    /// Stores `value` at `path`, creating intermediate maps as needed.
    /// Terminals met along the way are replaced by maps. An empty path
    /// replaces the whole value.
    pub fn put(&mut self, path: &[String], value: Mlmv) {
        let Some((last, parents)) = path.split_last() else {
            *self = value;
            return;
        };
        Self::descend_creating(self, parents).put(last.clone(), value);
    }

    pub fn put_terminal(&mut self, path: &[String], value: Mlrval) {
        self.put(path, Mlmv::Terminal(value));
    }

    /// Stores a fresh empty map at `path` and returns it.
    pub fn put_empty_map(&mut self, path: &[String]) -> &mut MlmvMap {
        let Some((last, parents)) = path.split_last() else {
            *self = Mlmv::empty_map();
            return Self::force_map(self);
        };
        let parent = Self::descend_creating(self, parents);
        let slot = parent.get_or_insert_with(last.clone(), Mlmv::empty_map);
        *slot = Mlmv::empty_map();
        Self::force_map(slot)
    }

    /// Removes and returns the value at a non-empty `path`.
    pub fn remove(&mut self, path: &[String]) -> Option<Mlmv> {
        let (last, parents) = path.split_last()?;
        self.get_mut(parents)?.as_map_mut()?.remove(last.as_str())
    }

    /// Terminal entries as `(flattened key, value)` pairs in order, nested
    /// keys joined by `separator` under `prefix`. Empty maps contribute
    /// nothing.
    pub fn flatten(&self, prefix: &str, separator: &str) -> Vec<(String, Mlrval)> {
        let mut out = Vec::new();
        self.flatten_into(prefix, separator, &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, separator: &str, out: &mut Vec<(String, Mlrval)>) {
        match self {
            Mlmv::Terminal(value) => out.push((prefix.to_owned(), value.clone())),
            Mlmv::Map(map) => {
                for (key, child) in map {
                    let name = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}{separator}{key}")
                    };
                    child.flatten_into(&name, separator, out);
                }
            }
        }
    }

    fn descend_creating<'a>(mut level: &'a mut Mlmv, path: &[String]) -> &'a mut MlmvMap {
        for key in path {
            let map = Self::force_map(level);
            level = map.get_or_insert_with(key.clone(), Mlmv::empty_map);
        }
        Self::force_map(level)
    }

    /// Turns `value` into a map if it is a terminal, then borrows the map.
    fn force_map(value: &mut Mlmv) -> &mut MlmvMap {
        if !value.is_map() {
            *value = Mlmv::empty_map();
        }
        match value {
            Mlmv::Map(map) => map,
            Mlmv::Terminal(_) => internal_coding_error("value is not a map after conversion"),
        }
    }

    fn write_json(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Mlmv::Terminal(value) => write_json_scalar(f, value),
            Mlmv::Map(map) if map.is_empty() => f.write_str("{}"),
            Mlmv::Map(map) => {
                f.write_str("{\n")?;
                let count = map.len();
                for (i, (key, child)) in map.iter().enumerate() {
                    write!(f, "{:width$}", "", width = (depth + 1) * 2)?;
                    write_json_string(f, key)?;
                    f.write_str(": ")?;
                    child.write_json(f, depth + 1)?;
                    f.write_str(if i + 1 < count { ",\n" } else { "\n" })?;
                }
                write!(f, "{:width$}}}", "", width = depth * 2)
            }
        }
    }
}

fn write_json_scalar(f: &mut fmt::Formatter<'_>, value: &Mlrval) -> fmt::Result {
    match value {
        Mlrval::Int(_) | Mlrval::Float(_) | Mlrval::Boolean(_) => write!(f, "{value}"),
        other => write_json_string(f, &other.to_string()),
    }
}

fn write_json_string(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Multi-line JSON rendering.
impl fmt::Display for Mlmv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_json(f, 0)
    }
}

impl From<Mlrval> for Mlmv {
    fn from(value: Mlrval) -> Self {
        Mlmv::Terminal(value)
    }
}

impl From<MlmvMap> for Mlmv {
    fn from(map: MlmvMap) -> Self {
        Mlmv::Map(map)
    }
}
