pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod cdml;
pub mod config;
pub mod document;
pub mod element;
pub mod formula;
pub mod fragment;
pub mod groups;
pub mod log;
pub mod mol;
pub mod reaction;
pub mod registry;
pub mod rings;
pub mod scissors;
pub mod search;
pub mod substruct;
mod topology;

pub use aromaticity::aromatic_rings;
pub use atom::{Atom, AtomSymbol, Point};
pub use bond::{Bond, BondOrder, BondStereo};
pub use cdml::CdmlError;
pub use config::{AromaticityConfig, AromaticityModel, Preferences};
pub use document::{
    Document, DocumentError, Item, ItemKey, MoleculeKey, ObjectRef, ReactionKey, RemovedFragment,
    SweepReport,
};
pub use element::Element;
pub use formula::{Formula, FormulaError};
pub use fragment::{Fragment, FragmentKind, FragmentRecord, PropertyValue};
pub use groups::Group;
pub use log::{Level, Message, MessageLog};
pub use mol::{AtomKey, BondKey, Components, DisconnectGuard, GraphError, KeyMap, Molecule};
pub use reaction::Reaction;
pub use registry::{Registry, RegistryError};
pub use rings::{Ring, RingInfo};
pub use scissors::Piece;
pub use search::{search_directory, search_paths, SearchReport};
pub use substruct::{find_substructures, first_match, has_match, MatchOptions, SubstructureMatch};

#[cfg(test)]
mod fixtures;
