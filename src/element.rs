/// A chemical element, identified by its atomic number (1 to 118).
///
/// # Examples
///
/// ```
/// use sketchcrab::Element;
///
/// let n = Element::from_symbol("N").unwrap();
/// assert_eq!(n.atomic_num(), 7);
/// assert_eq!(n.default_valences(), &[3, 5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

struct ElementData {
    number: u8,
    symbol: &'static str,
    name: &'static str,
    // IUPAC standard atomic weight
    weight: f64,
    // mass of the most abundant isotope
    exact_mass: f64,
    valences: &'static [u8],
}

impl Element {
    pub const H: Element = Element(1);
    pub const B: Element = Element(5);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const CL: Element = Element(17);
    pub const BR: Element = Element(35);
    pub const I: Element = Element(53);

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        (1..=TABLE.len()).contains(&usize::from(n)).then_some(Element(n))
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        TABLE.iter().find(|d| d.symbol == s).map(|d| Element(d.number))
    }

    pub fn atomic_num(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        self.data().symbol
    }

    pub fn name(self) -> &'static str {
        self.data().name
    }

    pub fn atomic_weight(self) -> f64 {
        self.data().weight
    }

    pub fn exact_mass(self) -> f64 {
        self.data().exact_mass
    }

    /// Valences used to derive implicit hydrogens, smallest first.
    ///
    /// Metals and noble gases return an empty slice: they never receive
    /// implicit hydrogens.
    pub fn default_valences(self) -> &'static [u8] {
        self.data().valences
    }

    /// Number of valence-shell electrons for main-group elements.
    pub fn outer_electrons(self) -> u8 {
        match self.0 {
            1 | 3 | 11 | 19 | 37 | 55 | 87 => 1,
            4 | 12 | 20 | 38 | 56 | 88 => 2,
            5 | 13 | 31 | 49 | 81 | 113 => 3,
            6 | 14 | 32 | 50 | 82 | 114 => 4,
            7 | 15 | 33 | 51 | 83 | 115 => 5,
            8 | 16 | 34 | 52 | 84 | 116 => 6,
            9 | 17 | 35 | 53 | 85 | 117 => 7,
            2 | 10 | 18 | 36 | 54 | 86 | 118 => 8,
            _ => 0,
        }
    }

    fn data(self) -> &'static ElementData {
        // TABLE is ordered by atomic number with no gaps.
        &TABLE[usize::from(self.0) - 1]
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

macro_rules! el {
    ($n:expr, $sym:expr, $name:expr, $w:expr, $m:expr, $v:expr) => {
        ElementData {
            number: $n,
            symbol: $sym,
            name: $name,
            weight: $w,
            exact_mass: $m,
            valences: $v,
        }
    };
}

static TABLE: &[ElementData] = &[
    el!(1, "H", "Hydrogen", 1.008, 1.00782503207, &[1]),
    el!(2, "He", "Helium", 4.002602, 4.00260325415, &[]),
    el!(3, "Li", "Lithium", 6.94, 7.0160034366, &[]),
    el!(4, "Be", "Beryllium", 9.0121831, 9.012183065, &[]),
    el!(5, "B", "Boron", 10.81, 11.00930536, &[3]),
    el!(6, "C", "Carbon", 12.011, 12.0, &[4]),
    el!(7, "N", "Nitrogen", 14.007, 14.00307400443, &[3, 5]),
    el!(8, "O", "Oxygen", 15.999, 15.99491461957, &[2]),
    el!(9, "F", "Fluorine", 18.998403163, 18.99840316273, &[1]),
    el!(10, "Ne", "Neon", 20.1797, 19.9924401762, &[]),
    el!(11, "Na", "Sodium", 22.98976928, 22.989769282, &[]),
    el!(12, "Mg", "Magnesium", 24.305, 23.985041697, &[]),
    el!(13, "Al", "Aluminium", 26.9815384, 26.98153853, &[]),
    el!(14, "Si", "Silicon", 28.085, 27.97692653465, &[4]),
    el!(15, "P", "Phosphorus", 30.973761998, 30.97376199842, &[3, 5]),
    el!(16, "S", "Sulfur", 32.06, 31.9720711744, &[2, 4, 6]),
    el!(17, "Cl", "Chlorine", 35.45, 34.968852682, &[1, 3, 5, 7]),
    el!(18, "Ar", "Argon", 39.948, 39.9623831237, &[]),
    el!(19, "K", "Potassium", 39.0983, 38.9637064864, &[]),
    el!(20, "Ca", "Calcium", 40.078, 39.962590863, &[]),
    el!(21, "Sc", "Scandium", 44.955908, 44.95590828, &[]),
    el!(22, "Ti", "Titanium", 47.867, 47.94794198, &[]),
    el!(23, "V", "Vanadium", 50.9415, 50.94395704, &[]),
    el!(24, "Cr", "Chromium", 51.9961, 51.94050623, &[]),
    el!(25, "Mn", "Manganese", 54.938043, 54.93804391, &[]),
    el!(26, "Fe", "Iron", 55.845, 55.93493633, &[]),
    el!(27, "Co", "Cobalt", 58.933194, 58.93319429, &[]),
    el!(28, "Ni", "Nickel", 58.6934, 57.93534241, &[]),
    el!(29, "Cu", "Copper", 63.546, 62.92959772, &[]),
    el!(30, "Zn", "Zinc", 65.38, 63.92914201, &[]),
    el!(31, "Ga", "Gallium", 69.723, 68.9255735, &[]),
    el!(32, "Ge", "Germanium", 72.630, 73.921177761, &[4]),
    el!(33, "As", "Arsenic", 74.921595, 74.92159457, &[3, 5]),
    el!(34, "Se", "Selenium", 78.971, 79.9165218, &[2, 4, 6]),
    el!(35, "Br", "Bromine", 79.904, 78.9183376, &[1]),
    el!(36, "Kr", "Krypton", 83.798, 83.8114977282, &[]),
    el!(37, "Rb", "Rubidium", 85.4678, 84.9117897379, &[]),
    el!(38, "Sr", "Strontium", 87.62, 87.9056125, &[]),
    el!(39, "Y", "Yttrium", 88.90584, 88.9058403, &[]),
    el!(40, "Zr", "Zirconium", 91.224, 89.9046977, &[]),
    el!(41, "Nb", "Niobium", 92.90637, 92.906373, &[]),
    el!(42, "Mo", "Molybdenum", 95.95, 97.90540482, &[]),
    el!(43, "Tc", "Technetium", 98.0, 97.9072124, &[]),
    el!(44, "Ru", "Ruthenium", 101.07, 101.9043441, &[]),
    el!(45, "Rh", "Rhodium", 102.90549, 102.905498, &[]),
    el!(46, "Pd", "Palladium", 106.42, 105.9034804, &[]),
    el!(47, "Ag", "Silver", 107.8682, 106.9050916, &[]),
    el!(48, "Cd", "Cadmium", 112.414, 113.90336509, &[]),
    el!(49, "In", "Indium", 114.818, 114.903878776, &[]),
    el!(50, "Sn", "Tin", 118.710, 119.90220163, &[2, 4]),
    el!(51, "Sb", "Antimony", 121.760, 120.903812, &[3, 5]),
    el!(52, "Te", "Tellurium", 127.60, 129.906222748, &[2, 4, 6]),
    el!(53, "I", "Iodine", 126.90447, 126.9044719, &[1, 3, 5, 7]),
    el!(54, "Xe", "Xenon", 131.293, 131.9041550856, &[]),
    el!(55, "Cs", "Caesium", 132.90545196, 132.905451961, &[]),
    el!(56, "Ba", "Barium", 137.327, 137.905247, &[]),
    el!(57, "La", "Lanthanum", 138.90547, 138.906353, &[]),
    el!(58, "Ce", "Cerium", 140.116, 139.905439, &[]),
    el!(59, "Pr", "Praseodymium", 140.90766, 140.907657, &[]),
    el!(60, "Nd", "Neodymium", 144.242, 141.907729, &[]),
    el!(61, "Pm", "Promethium", 145.0, 144.912756, &[]),
    el!(62, "Sm", "Samarium", 150.36, 151.919739, &[]),
    el!(63, "Eu", "Europium", 151.964, 152.921238, &[]),
    el!(64, "Gd", "Gadolinium", 157.25, 157.924112, &[]),
    el!(65, "Tb", "Terbium", 158.925354, 158.925354, &[]),
    el!(66, "Dy", "Dysprosium", 162.500, 163.929181, &[]),
    el!(67, "Ho", "Holmium", 164.930328, 164.930328, &[]),
    el!(68, "Er", "Erbium", 167.259, 165.930299, &[]),
    el!(69, "Tm", "Thulium", 168.934218, 168.934218, &[]),
    el!(70, "Yb", "Ytterbium", 173.045, 173.938867, &[]),
    el!(71, "Lu", "Lutetium", 174.9668, 174.940777, &[]),
    el!(72, "Hf", "Hafnium", 178.486, 179.946557, &[]),
    el!(73, "Ta", "Tantalum", 180.94788, 180.947999, &[]),
    el!(74, "W", "Tungsten", 183.84, 183.950933, &[]),
    el!(75, "Re", "Rhenium", 186.207, 186.955752, &[]),
    el!(76, "Os", "Osmium", 190.23, 191.961477, &[]),
    el!(77, "Ir", "Iridium", 192.217, 192.962942, &[]),
    el!(78, "Pt", "Platinum", 195.084, 194.9647917, &[]),
    el!(79, "Au", "Gold", 196.966570, 196.96656879, &[]),
    el!(80, "Hg", "Mercury", 200.592, 201.9706434, &[]),
    el!(81, "Tl", "Thallium", 204.38, 204.9744278, &[]),
    el!(82, "Pb", "Lead", 207.2, 207.9766525, &[2, 4]),
    el!(83, "Bi", "Bismuth", 208.98040, 208.9803991, &[3, 5]),
    el!(84, "Po", "Polonium", 209.0, 208.982430, &[]),
    el!(85, "At", "Astatine", 210.0, 209.987148, &[1]),
    el!(86, "Rn", "Radon", 222.0, 222.017578, &[]),
    el!(87, "Fr", "Francium", 223.0, 223.019736, &[]),
    el!(88, "Ra", "Radium", 226.0, 226.025410, &[]),
    el!(89, "Ac", "Actinium", 227.0, 227.027752, &[]),
    el!(90, "Th", "Thorium", 232.0377, 232.038055, &[]),
    el!(91, "Pa", "Protactinium", 231.03588, 231.035884, &[]),
    el!(92, "U", "Uranium", 238.02891, 238.050788, &[]),
    el!(93, "Np", "Neptunium", 237.0, 237.048174, &[]),
    el!(94, "Pu", "Plutonium", 244.0, 244.064205, &[]),
    el!(95, "Am", "Americium", 243.0, 243.061381, &[]),
    el!(96, "Cm", "Curium", 247.0, 247.070354, &[]),
    el!(97, "Bk", "Berkelium", 247.0, 247.070307, &[]),
    el!(98, "Cf", "Californium", 251.0, 251.079587, &[]),
    el!(99, "Es", "Einsteinium", 252.0, 252.082980, &[]),
    el!(100, "Fm", "Fermium", 257.0, 257.095106, &[]),
    el!(101, "Md", "Mendelevium", 258.0, 258.098431, &[]),
    el!(102, "No", "Nobelium", 259.0, 259.101030, &[]),
    el!(103, "Lr", "Lawrencium", 266.0, 266.120, &[]),
    el!(104, "Rf", "Rutherfordium", 267.0, 267.122, &[]),
    el!(105, "Db", "Dubnium", 268.0, 268.126, &[]),
    el!(106, "Sg", "Seaborgium", 269.0, 269.129, &[]),
    el!(107, "Bh", "Bohrium", 270.0, 270.133, &[]),
    el!(108, "Hs", "Hassium", 277.0, 277.150, &[]),
    el!(109, "Mt", "Meitnerium", 278.0, 278.156, &[]),
    el!(110, "Ds", "Darmstadtium", 281.0, 281.165, &[]),
    el!(111, "Rg", "Roentgenium", 282.0, 282.169, &[]),
    el!(112, "Cn", "Copernicium", 285.0, 285.177, &[]),
    el!(113, "Nh", "Nihonium", 286.0, 286.183, &[]),
    el!(114, "Fl", "Flerovium", 289.0, 289.190, &[]),
    el!(115, "Mc", "Moscovium", 290.0, 290.196, &[]),
    el!(116, "Lv", "Livermorium", 293.0, 293.205, &[]),
    el!(117, "Ts", "Tennessine", 294.0, 294.211, &[]),
    el!(118, "Og", "Oganesson", 294.0, 294.214, &[]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for data in TABLE {
            let e = Element::from_symbol(data.symbol).unwrap();
            assert_eq!(e.atomic_num(), data.number);
            assert_eq!(Element::from_atomic_num(data.number), Some(e));
        }
    }

    #[test]
    fn unknown_symbols() {
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::from_symbol("c"), None);
        assert_eq!(Element::from_atomic_num(0), None);
        assert_eq!(Element::from_atomic_num(119), None);
    }

    #[test]
    fn table_is_complete() {
        assert_eq!(TABLE.len(), 118);
        for (i, data) in TABLE.iter().enumerate() {
            assert_eq!(usize::from(data.number), i + 1);
        }
        for sym in ["La", "Gd", "Hf", "Os", "Ir", "Po", "U", "Og"] {
            let e = Element::from_symbol(sym).unwrap();
            assert_eq!(e.symbol(), sym);
            assert!(e.exact_mass() > 130.0);
        }
        let ir = Element::from_symbol("Ir").unwrap();
        assert_eq!(ir.atomic_num(), 77);
        assert_eq!(ir.name(), "Iridium");
        assert_eq!(Element::from_atomic_num(92).unwrap().symbol(), "U");
    }

    #[test]
    fn carbon_data() {
        assert_eq!(Element::C.symbol(), "C");
        assert_eq!(Element::C.name(), "Carbon");
        assert_eq!(Element::C.exact_mass(), 12.0);
        assert!((Element::C.atomic_weight() - 12.011).abs() < 1e-9);
        assert_eq!(Element::C.outer_electrons(), 4);
    }

    #[test]
    fn metals_have_no_default_valence() {
        let fe = Element::from_symbol("Fe").unwrap();
        assert!(fe.default_valences().is_empty());
        assert_eq!(fe.outer_electrons(), 0);
    }
}
