//! Builtin functional groups that can stand in for a single drawn vertex.
//!
//! Lookup is case-insensitive (`"ph"`, `"Ph"` and `"PH"` are all phenyl);
//! the canonical spelling is [`Group::name`].

use crate::formula::Formula;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Group {
    pub name: &'static str,
    /// Label when the group is drawn to the right of its attachment point.
    pub text_forward: &'static str,
    /// Label when drawn to the left.
    pub text_backward: &'static str,
    pub composition: &'static str,
}

impl Group {
    pub fn lookup(name: &str) -> Option<&'static Group> {
        GROUPS.iter().find(|g| g.name.eq_ignore_ascii_case(name))
    }

    pub fn formula(&self) -> Formula {
        // compositions are static and covered by `all_compositions_parse`
        Formula::parse(self.composition).unwrap_or_default()
    }
}

pub fn builtin_groups() -> &'static [Group] {
    GROUPS
}

static GROUPS: &[Group] = &[
    Group { name: "OCH3", text_forward: "OCH<sub>3</sub>", text_backward: "H<sub>3</sub>CO", composition: "OCH3" },
    Group { name: "NO2", text_forward: "NO<sub>2</sub>", text_backward: "O<sub>2</sub>N", composition: "NO2" },
    Group { name: "COOH", text_forward: "COOH", text_backward: "HOOC", composition: "COOH" },
    Group { name: "COOCH3", text_forward: "COOCH<sub>3</sub>", text_backward: "H<sub>3</sub>COOC", composition: "COOCH3" },
    Group { name: "Me", text_forward: "Me", text_backward: "Me", composition: "CH3" },
    Group { name: "CN", text_forward: "CN", text_backward: "NC", composition: "CN" },
    Group { name: "SO3H", text_forward: "SO<sub>3</sub>H", text_backward: "HO<sub>3</sub>S", composition: "SO3H" },
    Group { name: "PPh3", text_forward: "PPh<sub>3</sub>", text_backward: "Ph<sub>3</sub>P", composition: "C18H15P" },
    Group { name: "OMe", text_forward: "OMe", text_backward: "MeO", composition: "OCH3" },
    Group { name: "Et", text_forward: "Et", text_backward: "Et", composition: "C2H5" },
    Group { name: "Ph", text_forward: "Ph", text_backward: "Ph", composition: "C6H5" },
    Group { name: "COCl", text_forward: "COCl", text_backward: "ClOC", composition: "COCl" },
    Group { name: "iPr", text_forward: "iPr", text_backward: "iPr", composition: "C3H7" },
    Group { name: "tBu", text_forward: "tBu", text_backward: "tBu", composition: "C4H9" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    #[test]
    fn all_compositions_parse() {
        for g in builtin_groups() {
            assert!(Formula::parse(g.composition).is_ok(), "{}", g.name);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let ph = Group::lookup("ph").unwrap();
        assert_eq!(ph.name, "Ph");
        assert_eq!(ph.formula().count(Element::C), 6);
        assert!(Group::lookup("Xyz").is_none());
    }
}
