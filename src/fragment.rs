//! Named, typed subsets of a molecule's bonds.
//!
//! A [`Fragment`] never owns atoms or bonds; it holds [`BondKey`]s into the
//! molecule that carries it and is checked against that molecule whenever it
//! matters. A fragment whose bonds were deleted is *inconsistent* and gets
//! removed by [`Document::sweep_fragments`](crate::Document::sweep_fragments).

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::mol::{AtomKey, BondKey, Molecule};
use crate::registry::RegistryError;

/// `Explicit` fragments are user-defined; `Implicit` ones are created by
/// operations such as group expansion and mark the atoms that came from a
/// single label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FragmentKind {
    #[default]
    Explicit,
    Implicit,
}

impl FragmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Implicit => "implicit",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "explicit" => Some(Self::Explicit),
            "implicit" => Some(Self::Implicit),
            _ => None,
        }
    }
}

/// A typed fragment property. The type tag travels with the value through
/// CDML so numbers come back as numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "str",
        }
    }

    /// Rebuilds a value from its type tag and text form. Older drawings
    /// tag values with Python type names (`IntType`, `UnicodeType`, ...).
    pub fn parse(type_name: &str, value: &str) -> Option<Self> {
        match type_name {
            "int" | "IntType" | "LongType" => value.trim().parse().ok().map(Self::Int),
            "float" | "FloatType" => value.trim().parse().ok().map(Self::Float),
            "bool" | "BooleanType" => match value {
                "True" | "true" | "1" => Some(Self::Bool(true)),
                "False" | "false" | "0" => Some(Self::Bool(false)),
                _ => None,
            },
            "str" | "StringType" | "UnicodeType" => Some(Self::Text(value.to_owned())),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => f.write_str(if *v { "True" } else { "False" }),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Serialized form of a fragment with bonds replaced by their string ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FragmentRecord {
    pub id: String,
    pub kind: FragmentKind,
    pub name: String,
    pub bonds: Vec<String>,
    pub properties: Vec<(String, PropertyValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub id: String,
    pub name: String,
    pub kind: FragmentKind,
    pub properties: IndexMap<String, PropertyValue>,
    bonds: IndexSet<BondKey>,
}

impl Fragment {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FragmentKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            properties: IndexMap::new(),
            bonds: IndexSet::new(),
        }
    }

    pub fn add_bond(&mut self, bond: BondKey) -> bool {
        self.bonds.insert(bond)
    }

    pub fn remove_bond(&mut self, bond: BondKey) -> bool {
        self.bonds.shift_remove(&bond)
    }

    pub fn contains_bond(&self, bond: BondKey) -> bool {
        self.bonds.contains(&bond)
    }

    pub fn bonds(&self) -> impl Iterator<Item = BondKey> + '_ {
        self.bonds.iter().copied()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// True when every referenced bond is still owned by `mol`.
    pub fn is_consistent(&self, mol: &Molecule) -> bool {
        self.bonds.iter().all(|&b| mol.contains_bond(b))
    }

    /// Endpoints of the fragment's live bonds, in bond order.
    pub fn vertices(&self, mol: &Molecule) -> IndexSet<AtomKey> {
        let mut out = IndexSet::new();
        for &bond in &self.bonds {
            if let Some((a, b)) = mol.endpoints(bond) {
                out.insert(a);
                out.insert(b);
            }
        }
        out
    }

    /// A standalone molecule made of this fragment's live bonds and their
    /// atoms, usable as a substructure pattern.
    pub fn to_molecule(&self, mol: &Molecule) -> Molecule {
        let mut pattern = Molecule::with_name(self.name.clone());
        let mut atoms = HashMap::new();
        for &bond in &self.bonds {
            let Some((a, b)) = mol.endpoints(bond) else {
                continue;
            };
            let na = *atoms
                .entry(a)
                .or_insert_with(|| pattern.insert_vertex(mol.atom(a).clone()));
            let nb = *atoms
                .entry(b)
                .or_insert_with(|| pattern.insert_vertex(mol.atom(b).clone()));
            // keys come from `pattern` and differ, so this cannot fail
            let _ = pattern.insert_edge(na, nb, mol.bond(bond).clone());
        }
        pattern
    }

    /// Same fragment over remapped bonds, or `None` if any bond has no image.
    pub(crate) fn remap(&self, bonds: &HashMap<BondKey, BondKey>) -> Option<Fragment> {
        let mapped = self
            .bonds
            .iter()
            .map(|b| bonds.get(b).copied())
            .collect::<Option<IndexSet<BondKey>>>()?;
        Some(Fragment {
            bonds: mapped,
            ..self.clone()
        })
    }

    pub fn to_record(&self, mut id_of: impl FnMut(BondKey) -> String) -> FragmentRecord {
        FragmentRecord {
            id: self.id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            bonds: self.bonds.iter().map(|&b| id_of(b)).collect(),
            properties: self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Rebuilds a fragment, resolving every bond id through `resolve`.
    pub fn from_record(
        record: &FragmentRecord,
        resolve: impl Fn(&str) -> Option<BondKey>,
    ) -> Result<Self, RegistryError> {
        let mut fragment = Fragment::new(record.id.clone(), record.name.clone(), record.kind);
        for id in &record.bonds {
            let bond = resolve(id).ok_or_else(|| RegistryError::UnresolvedReference(id.clone()))?;
            fragment.add_bond(bond);
        }
        fragment.properties = record.properties.iter().cloned().collect();
        Ok(fragment)
    }
}
