//! Molecular composition and masses.
//!
//! A [`Formula`] is an element → count map plus a net charge. Molecules
//! produce one with [`Molecule::formula`](crate::Molecule::formula); single
//! atoms and builtin groups contribute through
//! [`Molecule::atom_formula`](crate::Molecule::atom_formula).
//! [`Formula`]'s `Display` impl uses the Hill system, [`Formula::exact_mass`]
//! the monoisotopic mass and [`Formula::average_mass`] standard atomic
//! weights.

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use thiserror::Error;

use crate::element::Element;

/// Error returned by [`Formula::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("unknown element '{0}' in formula")]
    UnknownElement(String),
    #[error("unexpected character '{ch}' at position {pos} in formula")]
    UnexpectedChar { pos: usize, ch: char },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formula {
    counts: BTreeMap<Element, u32>,
    charge: i32,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_element(element: Element, count: u32) -> Self {
        let mut f = Self::new();
        f.add_element(element, count);
        f
    }

    /// Parse a plain composition string such as `C6H5` or `SO3H`.
    ///
    /// Only element symbols and counts are understood; no parentheses,
    /// hydrates or charges.
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let chars: Vec<char> = text.chars().collect();
        let mut f = Self::new();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            if !ch.is_ascii_uppercase() {
                return Err(FormulaError::UnexpectedChar { pos: i, ch });
            }
            let mut symbol = String::from(ch);
            i += 1;
            while i < chars.len() && chars[i].is_ascii_lowercase() {
                symbol.push(chars[i]);
                i += 1;
            }
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let count = if start == i {
                1
            } else {
                let digits: String = chars[start..i].iter().collect();
                digits
                    .parse::<u32>()
                    .map_err(|_| FormulaError::UnexpectedChar { pos: start, ch: chars[start] })?
            };
            let element = Element::from_symbol(&symbol)
                .ok_or_else(|| FormulaError::UnknownElement(symbol.clone()))?;
            f.add_element(element, count);
        }
        Ok(f)
    }

    pub fn add_element(&mut self, element: Element, count: u32) {
        if count > 0 {
            *self.counts.entry(element).or_default() += count;
        }
    }

    pub fn count(&self, element: Element) -> u32 {
        self.counts.get(&element).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> impl Iterator<Item = (Element, u32)> + '_ {
        self.counts.iter().map(|(&e, &n)| (e, n))
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn set_charge(&mut self, charge: i32) {
        self.charge = charge;
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn atom_count(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Monoisotopic mass: every element at its most abundant isotope.
    /// Electron mass is ignored, so the charge does not change the result.
    pub fn exact_mass(&self) -> f64 {
        self.counts
            .iter()
            .map(|(e, &n)| e.exact_mass() * n as f64)
            .sum()
    }

    pub fn average_mass(&self) -> f64 {
        self.counts
            .iter()
            .map(|(e, &n)| e.atomic_weight() * n as f64)
            .sum()
    }

    /// Hill-ordered formula with counts in `<sub>` tags, for rich-text labels.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for (element, count) in self.hill_order() {
            out.push_str(element.symbol());
            if count > 1 {
                let _ = write!(out, "<sub>{count}</sub>");
            }
        }
        if self.charge != 0 {
            out.push_str("<sup>");
            push_charge(&mut out, self.charge);
            out.push_str("</sup>");
        }
        out
    }

    /// Elements in Hill order: C first, then H, then the rest
    /// alphabetically. Without carbon everything is alphabetical.
    pub fn hill_order(&self) -> Vec<(Element, u32)> {
        let mut rest: Vec<(Element, u32)> = Vec::with_capacity(self.counts.len());
        let mut head: Vec<(Element, u32)> = Vec::with_capacity(2);
        let has_carbon = self.counts.contains_key(&Element::C);
        for (&e, &n) in &self.counts {
            if has_carbon && (e == Element::C || e == Element::H) {
                head.push((e, n));
            } else {
                rest.push((e, n));
            }
        }
        // H (1) sorts before C (6) by atomic number
        head.sort_by_key(|&(e, _)| if e == Element::C { 0 } else { 1 });
        rest.sort_by(|a, b| a.0.symbol().cmp(b.0.symbol()));
        head.extend(rest);
        head
    }
}

fn push_charge(buf: &mut String, charge: i32) {
    match charge.cmp(&0) {
        std::cmp::Ordering::Greater => {
            if charge > 1 {
                let _ = write!(buf, "{charge}");
            }
            buf.push('+');
        }
        std::cmp::Ordering::Less => {
            if charge < -1 {
                let _ = write!(buf, "{}", charge.unsigned_abs());
            }
            buf.push('-');
        }
        std::cmp::Ordering::Equal => {}
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (element, count) in self.hill_order() {
            out.push_str(element.symbol());
            if count > 1 {
                let _ = write!(out, "{count}");
            }
        }
        push_charge(&mut out, self.charge);
        f.write_str(&out)
    }
}

impl AddAssign<&Formula> for Formula {
    fn add_assign(&mut self, rhs: &Formula) {
        for (&e, &n) in &rhs.counts {
            self.add_element(e, n);
        }
        self.charge += rhs.charge;
    }
}

impl AddAssign for Formula {
    fn add_assign(&mut self, rhs: Formula) {
        *self += &rhs;
    }
}

impl Add for Formula {
    type Output = Formula;

    fn add(mut self, rhs: Formula) -> Formula {
        self += &rhs;
        self
    }
}

impl Sum for Formula {
    fn sum<I: Iterator<Item = Formula>>(iter: I) -> Formula {
        iter.fold(Formula::new(), |acc, f| acc + f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }

    #[test]
    fn parse_simple() {
        let f = Formula::parse("C6H5").unwrap();
        assert_eq!(f.count(Element::C), 6);
        assert_eq!(f.count(Element::H), 5);
        assert_eq!(f.to_string(), "C6H5");
    }

    #[test]
    fn parse_repeated_symbols_accumulate() {
        let f = Formula::parse("COOCH3").unwrap();
        assert_eq!(f.count(Element::C), 2);
        assert_eq!(f.count(Element::O), 2);
        assert_eq!(f.count(Element::H), 3);
        assert_eq!(f.to_string(), "C2H3O2");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            Formula::parse("Xx2"),
            Err(FormulaError::UnknownElement("Xx".into()))
        );
        assert_eq!(
            Formula::parse("c6"),
            Err(FormulaError::UnexpectedChar { pos: 0, ch: 'c' })
        );
    }

    #[test]
    fn hill_without_carbon_is_alphabetical() {
        let f = Formula::parse("NaCl").unwrap();
        assert_eq!(f.to_string(), "ClNa");
        let water = Formula::parse("H2O").unwrap();
        assert_eq!(water.to_string(), "H2O");
    }

    #[test]
    fn charge_suffix() {
        let mut f = Formula::parse("NH4").unwrap();
        f.set_charge(1);
        assert_eq!(f.to_string(), "H4N+");
        f.set_charge(-2);
        assert_eq!(f.to_string(), "H4N2-");
    }

    #[test]
    fn sum_and_masses() {
        let total: Formula = vec![
            Formula::parse("CH3").unwrap(),
            Formula::parse("CH2").unwrap(),
            Formula::parse("OH").unwrap(),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.to_string(), "C2H6O");
        assert_approx(
            total.exact_mass(),
            2.0 * 12.0 + 6.0 * 1.00782503207 + 15.99491461957,
            1e-9,
        );
        assert_approx(total.average_mass(), 46.069, 0.01);
    }

    #[test]
    fn html() {
        let mut f = Formula::parse("C6H6").unwrap();
        assert_eq!(f.to_html(), "C<sub>6</sub>H<sub>6</sub>");
        f.set_charge(1);
        assert_eq!(f.to_html(), "C<sub>6</sub>H<sub>6</sub><sup>+</sup>");
    }

    #[test]
    fn empty() {
        let f = Formula::new();
        assert!(f.is_empty());
        assert_eq!(f.to_string(), "");
        assert_eq!(f.exact_mass(), 0.0);
    }
}
