use std::fmt;

use crate::element::Element;
use crate::groups::Group;

/// What a vertex stands for: a single element or a builtin group
/// abbreviation such as `Ph` or `COOH`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomSymbol {
    Element(Element),
    Group(&'static Group),
}

impl AtomSymbol {
    /// Element symbols win over group names; groups are matched
    /// case-insensitively and stored under their canonical name.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(e) = Element::from_symbol(text) {
            return Some(Self::Element(e));
        }
        Group::lookup(text).map(Self::Group)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Element(e) => e.symbol(),
            Self::Group(g) => g.name,
        }
    }

    pub fn element(&self) -> Option<Element> {
        match self {
            Self::Element(e) => Some(*e),
            Self::Group(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for AtomSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position in document units (centimetres). `z` is only present for
/// drawings that carry depth information.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// A vertex of a [`Molecule`](crate::Molecule).
///
/// `Atom` holds what a user draws: symbol, charge, coordinates and optional
/// overrides. The aromatic flag is derived state owned by the molecule and
/// only changes through
/// [`Molecule::mark_aromatic_bonds`](crate::Molecule::mark_aromatic_bonds).
///
/// # Examples
///
/// ```
/// use sketchcrab::{Atom, Element};
///
/// let o = Atom::new(Element::O).with_charge(-1).at(1.0, 2.0);
/// assert_eq!(o.symbol.as_str(), "O");
/// assert_eq!(o.charge, -1);
/// assert!(!o.is_aromatic());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub symbol: AtomSymbol,
    pub position: Point,
    /// Formal charge in elementary charge units.
    pub charge: i8,
    /// Explicit hydrogen count. `None` lets the molecule derive implicit
    /// hydrogens from valence.
    pub hydrogens: Option<u8>,
    /// Display flag for the hydrogen label; does not affect the count.
    pub show_hydrogens: bool,
    /// Valency override; `None` uses the element's default valences.
    pub valency: Option<u8>,
    /// Spin multiplicity: 1 singlet, 2 radical, 3 biradical.
    pub multiplicity: u8,
    /// Extra bonds a strict substructure pattern atom tolerates.
    pub free_sites: u8,
    pub(crate) aromatic: bool,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self::with_symbol(AtomSymbol::Element(element))
    }

    pub fn carbon() -> Self {
        Self::new(Element::C)
    }

    /// A builtin group vertex, or `None` when the name is unknown.
    pub fn group(name: &str) -> Option<Self> {
        Group::lookup(name).map(|g| Self::with_symbol(AtomSymbol::Group(g)))
    }

    pub fn with_symbol(symbol: AtomSymbol) -> Self {
        Self {
            symbol,
            position: Point::default(),
            charge: 0,
            hydrogens: None,
            show_hydrogens: false,
            valency: None,
            multiplicity: 1,
            free_sites: 0,
            aromatic: false,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_hydrogens(mut self, hydrogens: u8) -> Self {
        self.hydrogens = Some(hydrogens);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn element(&self) -> Option<Element> {
        self.symbol.element()
    }

    pub fn is_aromatic(&self) -> bool {
        self.aromatic
    }
}

impl Default for Atom {
    fn default() -> Self {
        Self::carbon()
    }
}
