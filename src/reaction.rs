use crate::document::{ItemKey, MoleculeKey};

/// Ordered references to the molecules and drawing items that make up one
/// reaction scheme. The document owns everything referenced here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    pub reactants: Vec<MoleculeKey>,
    pub products: Vec<MoleculeKey>,
    pub arrows: Vec<ItemKey>,
    /// Text items describing conditions.
    pub conditions: Vec<ItemKey>,
    pub pluses: Vec<ItemKey>,
}

impl Reaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reaction with only an arrow says nothing and is not written out.
    pub fn is_empty(&self) -> bool {
        self.reactants.is_empty()
            && self.products.is_empty()
            && self.conditions.is_empty()
            && self.pluses.is_empty()
    }

    pub fn references_molecule(&self, mol: MoleculeKey) -> bool {
        self.reactants.contains(&mol) || self.products.contains(&mol)
    }

    pub fn references_item(&self, item: ItemKey) -> bool {
        self.arrows.contains(&item) || self.conditions.contains(&item) || self.pluses.contains(&item)
    }

    /// Drops references to molecules and items that no longer exist.
    pub fn retain_live(
        &mut self,
        molecule_alive: impl Fn(MoleculeKey) -> bool,
        item_alive: impl Fn(ItemKey) -> bool,
    ) {
        self.reactants.retain(|&m| molecule_alive(m));
        self.products.retain(|&m| molecule_alive(m));
        self.arrows.retain(|&i| item_alive(i));
        self.conditions.retain(|&i| item_alive(i));
        self.pluses.retain(|&i| item_alive(i));
    }
}
