use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::atom::{Atom, AtomSymbol, Point};
use crate::bond::Bond;
use crate::document::{Document, Item, ObjectRef};
use crate::fragment::{Fragment, FragmentKind, FragmentRecord, PropertyValue};
use crate::groups::Group;
use crate::mol::{AtomKey, BondKey, Molecule};
use crate::reaction::Reaction;
use crate::registry::RegistryError;

use super::error::CdmlError;
use super::schema::{self, ElementSchema};
use super::units::parse_length;

/// Minimal element tree; CDML documents are small enough to hold whole.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawElement {
    pub(crate) name: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<RawElement>,
    pub(crate) text: String,
}

impl RawElement {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn child(&self, name: &str) -> Option<&RawElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn validate(&self, schema: &ElementSchema) -> Result<(), CdmlError> {
        schema.validate(&self.name, &self.attrs)
    }

    fn required(&self, name: &'static str) -> Result<&str, CdmlError> {
        self.attr(name).ok_or_else(|| CdmlError::MissingAttribute {
            element: self.name.clone(),
            attribute: name,
        })
    }

    fn invalid(&self, attribute: &str, value: &str) -> CdmlError {
        CdmlError::InvalidAttribute {
            element: self.name.clone(),
            attribute: attribute.to_owned(),
            value: value.to_owned(),
        }
    }

    /// Integer attribute narrowed to `T`; out-of-range values are invalid.
    fn int_attr<T: TryFrom<i64>>(&self, name: &str) -> Result<Option<T>, CdmlError> {
        let Some(raw) = self.attr(name) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(|v| T::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| self.invalid(name, raw))
    }

    fn length_attr(&self, name: &str) -> Result<Option<f64>, CdmlError> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => parse_length(raw).map(Some).ok_or_else(|| self.invalid(name, raw)),
        }
    }
}

fn open_element(e: &BytesStart<'_>) -> Result<RawElement, CdmlError> {
    let mut el = RawElement {
        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        ..RawElement::default()
    };
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        el.attrs.push((key, value));
    }
    Ok(el)
}

pub(crate) fn parse_tree(text: &str) -> Result<RawElement, CdmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<RawElement> = Vec::new();

    loop {
        let finished = match reader.read_event()? {
            Event::Start(e) => {
                stack.push(open_element(&e)?);
                None
            }
            Event::Empty(e) => Some(open_element(&e)?),
            Event::End(_) => stack.pop(),
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
                None
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c));
                }
                None
            }
            Event::Eof => return Err(CdmlError::Empty),
            _ => None,
        };
        if let Some(el) = finished {
            match stack.last_mut() {
                Some(parent) => parent.children.push(el),
                None => return Ok(el),
            }
        }
    }
}

/// First `<cdml>` element in document order, searching depth first.
/// SVG exports carry the drawing as such an element inside `<metadata>`.
fn find_cdml(el: &RawElement) -> Option<&RawElement> {
    if el.name == "cdml" {
        return Some(el);
    }
    el.children.iter().find_map(find_cdml)
}

/// Reads a CDML document, or an SVG with embedded CDML, into `doc`.
/// Molecules and items are registered first so reactions can refer to
/// anything in the file.
pub(crate) fn read_into(doc: &mut Document, text: &str) -> Result<(), CdmlError> {
    let tree = parse_tree(text)?;
    let Some(root) = find_cdml(&tree) else {
        return Err(CdmlError::NotCdml(tree.name));
    };
    root.validate(&schema::CDML)?;

    let mut reactions = Vec::new();
    for child in &root.children {
        match child.name.as_str() {
            "molecule" => read_molecule(doc, child)?,
            "arrow" | "plus" | "text" => read_item(doc, child)?,
            "reaction" => reactions.push(child),
            other => tracing::debug!(element = other, "skipping unsupported element"),
        }
    }
    for reaction in reactions {
        read_reaction(doc, reaction)?;
    }
    tracing::debug!(
        molecules = doc.molecule_count(),
        ids = doc.registry().len(),
        "read CDML document"
    );
    Ok(())
}

fn read_point(el: &RawElement) -> Result<Point, CdmlError> {
    el.validate(&schema::POINT)?;
    Ok(Point {
        x: el.length_attr("x")?.unwrap_or_default(),
        y: el.length_attr("y")?.unwrap_or_default(),
        z: el.length_attr("z")?,
    })
}

fn position_of(el: &RawElement) -> Result<Point, CdmlError> {
    el.child("point").map_or(Ok(Point::default()), read_point)
}

fn read_atom(el: &RawElement) -> Result<Atom, CdmlError> {
    el.validate(&schema::ATOM)?;
    let name = el.required("name")?;
    let symbol = AtomSymbol::parse(name).ok_or_else(|| el.invalid("name", name))?;
    let mut atom = Atom::with_symbol(symbol);
    atom.charge = el.int_attr("charge")?.unwrap_or(0);
    match el.attr("hydrogens") {
        Some("on") => atom.show_hydrogens = true,
        Some("off") | None => {}
        Some(_) => atom.hydrogens = el.int_attr("hydrogens")?,
    }
    atom.valency = el.int_attr("valency")?;
    atom.multiplicity = el.int_attr("multiplicity")?.unwrap_or(1);
    atom.free_sites = el.int_attr("free_sites")?.unwrap_or(0);
    atom.position = position_of(el)?;
    Ok(atom)
}

fn read_group(el: &RawElement) -> Result<Atom, CdmlError> {
    el.validate(&schema::GROUP)?;
    if let Some(kind) = el.attr("group-type") {
        if kind != "builtin" {
            return Err(el.invalid("group-type", kind));
        }
    }
    let name = el.required("name")?;
    let group = Group::lookup(name).ok_or_else(|| el.invalid("name", name))?;
    let mut atom = Atom::with_symbol(AtomSymbol::Group(group));
    atom.charge = el.int_attr("charge")?.unwrap_or(0);
    atom.free_sites = el.int_attr("free_sites")?.unwrap_or(0);
    atom.position = position_of(el)?;
    Ok(atom)
}

fn read_bond(el: &RawElement) -> Result<Bond, CdmlError> {
    let code = el.required("type")?;
    let mut bond = Bond::from_type_code(code).ok_or_else(|| el.invalid("type", code))?;
    bond.center = el.attr("center").map(|c| c == "yes");
    Ok(bond)
}

fn read_fragment_record(el: &RawElement) -> Result<FragmentRecord, CdmlError> {
    el.validate(&schema::FRAGMENT)?;
    let kind = match el.attr("type") {
        None => FragmentKind::Explicit,
        Some(t) => FragmentKind::parse(t).ok_or_else(|| el.invalid("type", t))?,
    };
    let mut record = FragmentRecord {
        id: el.required("id")?.to_owned(),
        kind,
        name: el.child("name").map(|n| n.text.clone()).unwrap_or_default(),
        ..FragmentRecord::default()
    };
    for bond in el.children_named("bond") {
        bond.validate(&schema::FRAGMENT_BOND)?;
        record.bonds.push(bond.required("id")?.to_owned());
    }
    for prop in el.children_named("property") {
        prop.validate(&schema::PROPERTY)?;
        let value = prop.required("value")?;
        let type_name = prop.attr("type").unwrap_or("str");
        let parsed = PropertyValue::parse(type_name, value).ok_or_else(|| prop.invalid("value", value))?;
        record.properties.push((prop.required("name")?.to_owned(), parsed));
    }
    Ok(record)
}

fn read_molecule(doc: &mut Document, el: &RawElement) -> Result<(), CdmlError> {
    el.validate(&schema::MOLECULE)?;
    let mut mol = Molecule::with_name(el.attr("name").unwrap_or_default());

    let mut atoms: HashMap<&str, AtomKey> = HashMap::new();
    let mut atom_ids: Vec<(&str, AtomKey)> = Vec::new();
    for child in &el.children {
        let atom = match child.name.as_str() {
            "atom" => read_atom(child)?,
            "group" => read_group(child)?,
            _ => continue,
        };
        let id = child.required("id")?;
        let key = mol.insert_vertex(atom);
        if atoms.insert(id, key).is_some() {
            return Err(RegistryError::IdInUse(id.to_owned()).into());
        }
        atom_ids.push((id, key));
    }

    let mut bonds: HashMap<&str, BondKey> = HashMap::new();
    let mut bond_ids: Vec<(&str, BondKey)> = Vec::new();
    for child in el.children_named("bond") {
        child.validate(&schema::BOND)?;
        let endpoint = |name: &'static str| -> Result<AtomKey, CdmlError> {
            let id = child.required(name)?;
            atoms
                .get(id)
                .copied()
                .ok_or_else(|| RegistryError::UnresolvedReference(id.to_owned()).into())
        };
        let (start, end) = (endpoint("start")?, endpoint("end")?);
        let key = mol.insert_edge(start, end, read_bond(child)?)?;
        let id = child.required("id")?;
        if atoms.contains_key(id) || bonds.insert(id, key).is_some() {
            return Err(RegistryError::IdInUse(id.to_owned()).into());
        }
        bond_ids.push((id, key));
    }

    for child in el.children_named("fragment") {
        let record = read_fragment_record(child)?;
        let fragment = Fragment::from_record(&record, |id| bonds.get(id).copied())?;
        mol.add_fragment(fragment)?;
    }

    let mk = doc.add_molecule(mol);
    let registry = doc.registry_mut();
    registry.register(ObjectRef::Molecule(mk), el.required("id")?)?;
    for (id, key) in atom_ids {
        registry.register(ObjectRef::Atom(mk, key), id)?;
    }
    for (id, key) in bond_ids {
        registry.register(ObjectRef::Bond(mk, key), id)?;
    }
    Ok(())
}

fn read_item(doc: &mut Document, el: &RawElement) -> Result<(), CdmlError> {
    let item = match el.name.as_str() {
        "arrow" => {
            el.validate(&schema::ARROW)?;
            let points = el
                .children_named("point")
                .map(read_point)
                .collect::<Result<Vec<_>, _>>()?;
            Item::Arrow { points }
        }
        "plus" => {
            el.validate(&schema::PLUS)?;
            Item::Plus {
                position: position_of(el)?,
            }
        }
        _ => {
            el.validate(&schema::TEXT)?;
            Item::Text {
                position: position_of(el)?,
                text: el.child("ftext").map(|t| t.text.clone()).unwrap_or_default(),
            }
        }
    };
    let id = el.required("id")?;
    let key = doc.add_item(item);
    doc.registry_mut().register(ObjectRef::Item(key), id)?;
    Ok(())
}

fn read_reaction(doc: &mut Document, el: &RawElement) -> Result<(), CdmlError> {
    el.validate(&schema::REACTION)?;
    let mut reaction = Reaction::new();
    for child in &el.children {
        let name = child.name.as_str();
        if !matches!(name, "reactant" | "product" | "arrow" | "condition" | "plus") {
            tracing::debug!(element = name, "skipping unsupported reaction member");
            continue;
        }
        child.validate(&schema::REFERENCE)?;
        let idref = child.required("idref")?;
        let target = doc
            .registry()
            .get(idref)
            .ok_or_else(|| RegistryError::UnresolvedReference(idref.to_owned()))?;
        match (name, target) {
            ("reactant", ObjectRef::Molecule(m)) => reaction.reactants.push(m),
            ("product", ObjectRef::Molecule(m)) => reaction.products.push(m),
            ("arrow", ObjectRef::Item(i)) if matches!(doc.item(i), Some(Item::Arrow { .. })) => {
                reaction.arrows.push(i)
            }
            ("plus", ObjectRef::Item(i)) if matches!(doc.item(i), Some(Item::Plus { .. })) => {
                reaction.pluses.push(i)
            }
            ("condition", ObjectRef::Item(i)) => reaction.conditions.push(i),
            _ => return Err(child.invalid("idref", idref)),
        }
    }
    let id = el.required("id")?;
    let key = doc.add_reaction(reaction);
    doc.registry_mut().register(ObjectRef::Reaction(key), id)?;
    Ok(())
}
