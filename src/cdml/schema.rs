//! Static description of the CDML elements this crate reads and writes.
//!
//! Each element lists its attributes in the order the writer emits them,
//! with the value kind the reader checks before interpreting anything.
//! Attributes not listed here are ignored on read.

use crate::bond::Bond;

use super::error::CdmlError;
use super::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Document-unique identifier.
    Id,
    /// Reference to an identifier defined elsewhere in the document.
    IdRef,
    Text,
    Integer,
    /// Coordinate with an optional unit suffix.
    Length,
    /// `yes` or `no`.
    Flag,
    /// Stereo letter and order digit, e.g. `n2`.
    BondType,
    /// Explicit hydrogen count, or the `on`/`off` label switch.
    Hydrogens,
}

impl FieldKind {
    pub fn accepts(self, value: &str) -> bool {
        match self {
            Self::Id | Self::IdRef => !value.is_empty(),
            Self::Text => true,
            Self::Integer => value.trim().parse::<i64>().is_ok(),
            Self::Length => units::parse_length(value).is_some(),
            Self::Flag => matches!(value, "yes" | "no"),
            Self::BondType => Bond::from_type_code(value).is_some(),
            Self::Hydrogens => {
                matches!(value, "on" | "off") || value.trim().parse::<u8>().is_ok()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSchema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

const fn req(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind, required: true }
}

const fn opt(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind, required: false }
}

use FieldKind::*;

pub static CDML: ElementSchema = ElementSchema {
    name: "cdml",
    fields: &[opt("version", Text), opt("xmlns", Text)],
};

pub static MOLECULE: ElementSchema = ElementSchema {
    name: "molecule",
    fields: &[req("id", Id), opt("name", Text)],
};

pub static ATOM: ElementSchema = ElementSchema {
    name: "atom",
    fields: &[
        req("id", Id),
        req("name", Text),
        opt("charge", Integer),
        opt("hydrogens", Hydrogens),
        opt("valency", Integer),
        opt("multiplicity", Integer),
        opt("free_sites", Integer),
    ],
};

pub static GROUP: ElementSchema = ElementSchema {
    name: "group",
    fields: &[
        req("id", Id),
        req("name", Text),
        opt("group-type", Text),
        opt("charge", Integer),
        opt("free_sites", Integer),
    ],
};

pub static POINT: ElementSchema = ElementSchema {
    name: "point",
    fields: &[req("x", Length), req("y", Length), opt("z", Length)],
};

pub static BOND: ElementSchema = ElementSchema {
    name: "bond",
    fields: &[
        req("id", Id),
        req("type", BondType),
        req("start", IdRef),
        req("end", IdRef),
        opt("center", Flag),
    ],
};

pub static FRAGMENT: ElementSchema = ElementSchema {
    name: "fragment",
    fields: &[req("id", Id), opt("type", Text)],
};

pub static FRAGMENT_BOND: ElementSchema = ElementSchema {
    name: "bond",
    fields: &[req("id", IdRef)],
};

pub static PROPERTY: ElementSchema = ElementSchema {
    name: "property",
    fields: &[req("name", Text), req("value", Text), opt("type", Text)],
};

pub static ARROW: ElementSchema = ElementSchema {
    name: "arrow",
    fields: &[req("id", Id)],
};

pub static PLUS: ElementSchema = ElementSchema {
    name: "plus",
    fields: &[req("id", Id)],
};

pub static TEXT: ElementSchema = ElementSchema {
    name: "text",
    fields: &[req("id", Id)],
};

pub static REACTION: ElementSchema = ElementSchema {
    name: "reaction",
    fields: &[req("id", Id)],
};

/// Any child of `<reaction>`: `reactant`, `product`, `arrow`, `condition`
/// or `plus`.
pub static REFERENCE: ElementSchema = ElementSchema {
    name: "reference",
    fields: &[req("idref", IdRef)],
};

impl ElementSchema {
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks presence of required attributes and the kind of every known
    /// attribute. `element` is the name reported in errors.
    pub fn validate(&self, element: &str, attrs: &[(String, String)]) -> Result<(), CdmlError> {
        for field in self.fields {
            match attrs.iter().find(|(k, _)| k == field.name) {
                None if field.required => {
                    return Err(CdmlError::MissingAttribute {
                        element: element.to_owned(),
                        attribute: field.name,
                    });
                }
                Some((_, value)) if !field.kind.accepts(value) => {
                    return Err(CdmlError::InvalidAttribute {
                        element: element.to_owned(),
                        attribute: field.name.to_owned(),
                        value: value.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect()
    }

    #[test]
    fn bond_requires_endpoints() {
        let err = BOND
            .validate("bond", &attrs(&[("id", "b1"), ("type", "n1"), ("start", "a1")]))
            .unwrap_err();
        assert!(matches!(err, CdmlError::MissingAttribute { attribute: "end", .. }));
    }

    #[test]
    fn kinds_are_checked() {
        let err = BOND
            .validate(
                "bond",
                &attrs(&[("id", "b1"), ("type", "q9"), ("start", "a1"), ("end", "a2")]),
            )
            .unwrap_err();
        assert!(matches!(err, CdmlError::InvalidAttribute { ref attribute, .. } if attribute == "type"));
        assert!(POINT.validate("point", &attrs(&[("x", "1cm"), ("y", "2.5mm")])).is_ok());
        assert!(POINT.validate("point", &attrs(&[("x", "left"), ("y", "0")])).is_err());
        assert!(ATOM
            .validate("atom", &attrs(&[("id", "a"), ("name", "C"), ("charge", "x")]))
            .is_err());
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let a = attrs(&[("id", "a1"), ("name", "C"), ("font-size", "12")]);
        assert!(ATOM.validate("atom", &a).is_ok());
        assert!(ATOM.field("font-size").is_none());
    }

    #[test]
    fn flags() {
        assert!(Flag.accepts("yes"));
        assert!(!Flag.accepts("true"));
    }

    #[test]
    fn hydrogens_take_a_count_or_a_switch() {
        assert!(Hydrogens.accepts("on"));
        assert!(Hydrogens.accepts("off"));
        assert!(Hydrogens.accepts("3"));
        assert!(!Hydrogens.accepts("-1"));
        assert!(!Hydrogens.accepts("yes"));
    }
}
