/// Bond multiplicity as drawn. `Aromatic` is the explicit delocalized
/// marker (order 4 in CDML); bonds drawn as alternating single/double get
/// their aromatic flag from perception instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    Zero,
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    pub fn from_digit(d: u8) -> Option<Self> {
        match d {
            0 => Some(Self::Zero),
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Aromatic),
            _ => None,
        }
    }

    pub fn digit(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Aromatic => 4,
        }
    }

    /// Contribution to the valence of each endpoint. Aromatic bonds count as
    /// one; the extra half-bond is added per atom by the molecule.
    pub fn valence_contribution(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

/// Drawing style of a bond, the letter half of a CDML bond type such as
/// `w1` (wedge) or `n2` (normal double).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    #[default]
    Normal,
    Wedge,
    Hatch,
    Adder,
    Bold,
    Dashed,
    Hollow,
}

impl BondStereo {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Self::Normal),
            'w' => Some(Self::Wedge),
            'h' => Some(Self::Hatch),
            'a' => Some(Self::Adder),
            'b' => Some(Self::Bold),
            'd' => Some(Self::Dashed),
            'o' => Some(Self::Hollow),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Normal => 'n',
            Self::Wedge => 'w',
            Self::Hatch => 'h',
            Self::Adder => 'a',
            Self::Bold => 'b',
            Self::Dashed => 'd',
            Self::Hollow => 'o',
        }
    }
}

/// An edge of a [`Molecule`](crate::Molecule). Endpoints live in the
/// molecule's graph, not in the bond.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    pub stereo: BondStereo,
    /// Rendering hint for double bonds: draw centered instead of offset.
    pub center: Option<bool>,
    pub(crate) aromatic: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            stereo: BondStereo::Normal,
            center: None,
            aromatic: false,
        }
    }

    pub fn single() -> Self {
        Self::new(BondOrder::Single)
    }

    pub fn double() -> Self {
        Self::new(BondOrder::Double)
    }

    pub fn triple() -> Self {
        Self::new(BondOrder::Triple)
    }

    pub fn with_stereo(mut self, stereo: BondStereo) -> Self {
        self.stereo = stereo;
        self
    }

    /// Set by aromaticity perception; an explicit `Aromatic` order does not
    /// imply this flag until perception has run.
    pub fn is_aromatic(&self) -> bool {
        self.aromatic
    }

    /// CDML `type` attribute: stereo letter followed by order digit.
    pub fn type_code(&self) -> String {
        format!("{}{}", self.stereo.as_char(), self.order.digit())
    }

    /// Parse a CDML `type` attribute such as `n1` or `w2`.
    pub fn from_type_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let stereo = BondStereo::from_char(chars.next()?)?;
        let digit = chars.next()?.to_digit(10)?;
        if chars.next().is_some() {
            return None;
        }
        let order = BondOrder::from_digit(digit as u8)?;
        Some(Self::new(order).with_stereo(stereo))
    }
}

impl Default for Bond {
    fn default() -> Self {
        Self::single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes() {
        assert_eq!(Bond::double().type_code(), "n2");
        let w = Bond::from_type_code("w1").unwrap();
        assert_eq!(w.stereo, BondStereo::Wedge);
        assert_eq!(w.order, BondOrder::Single);
        assert_eq!(Bond::from_type_code("n4").unwrap().order, BondOrder::Aromatic);
        assert!(Bond::from_type_code("x1").is_none());
        assert!(Bond::from_type_code("n5").is_none());
        assert!(Bond::from_type_code("n12").is_none());
        assert!(Bond::from_type_code("").is_none());
    }

    #[test]
    fn valence_contributions() {
        assert_eq!(BondOrder::Zero.valence_contribution(), 0);
        assert_eq!(BondOrder::Triple.valence_contribution(), 3);
        assert_eq!(BondOrder::Aromatic.valence_contribution(), 1);
    }
}
