use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::atom::{Atom, AtomSymbol, Point};
use crate::document::{Document, Item, ItemKey, MoleculeKey, ObjectRef};
use crate::fragment::Fragment;
use crate::mol::Molecule;
use crate::reaction::Reaction;

use super::error::CdmlError;
use super::schema::{self, ElementSchema};
use super::units::format_length;
use super::{CDML_NAMESPACE, CDML_VERSION};

type Out = Writer<Vec<u8>>;

/// Serializes `doc`, giving every object that lacks an id a fresh one.
/// Inconsistent fragments are left out and reported in the message log;
/// they stay on their molecule until repaired or swept.
pub(crate) fn write(doc: &mut Document) -> Result<String, CdmlError> {
    assign_ids(doc);
    let stale: Vec<String> = doc.molecules().flat_map(|(_, mol)| mol.check_fragments()).collect();
    for id in stale {
        doc.log_mut()
            .warn(format!("fragment '{id}' is inconsistent and was not saved"));
    }
    let doc: &Document = doc;

    let mut out = Writer::new_with_indent(Vec::new(), b' ', 2);
    out.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let root = start(
        &schema::CDML,
        vec![("version", CDML_VERSION.to_owned()), ("xmlns", CDML_NAMESPACE.to_owned())],
    );
    out.write_event(Event::Start(root))?;

    for (key, mol) in doc.molecules() {
        write_molecule(&mut out, doc, key, mol)?;
    }
    for (key, item) in doc.items() {
        write_item(&mut out, doc, key, item)?;
    }
    for (key, reaction) in doc.reactions() {
        if reaction.is_empty() {
            continue;
        }
        let id = id_of(doc, ObjectRef::Reaction(key));
        write_reaction(&mut out, doc, id, reaction)?;
    }

    out.write_event(Event::End(BytesEnd::new("cdml")))?;
    let text = String::from_utf8(out.into_inner())?;
    tracing::debug!(bytes = text.len(), "wrote CDML document");
    Ok(text)
}

fn assign_ids(doc: &mut Document) {
    let mut pending = Vec::new();
    for (mk, mol) in doc.molecules() {
        pending.push((ObjectRef::Molecule(mk), "molecule"));
        pending.extend(mol.atoms().map(|a| (ObjectRef::Atom(mk, a), "atom")));
        pending.extend(mol.bonds().map(|b| (ObjectRef::Bond(mk, b), "bond")));
    }
    pending.extend(doc.items().map(|(ik, item)| (ObjectRef::Item(ik), item.kind())));
    pending.extend(doc.reactions().map(|(rk, _)| (ObjectRef::Reaction(rk), "reaction")));
    for (object, prefix) in pending {
        doc.ensure_id(object, prefix);
    }
}

fn id_of(doc: &Document, object: ObjectRef) -> String {
    doc.id_of(object).unwrap_or_default().to_owned()
}

/// Start tag with `values` emitted in the schema's attribute order.
fn start(schema: &ElementSchema, values: Vec<(&'static str, String)>) -> BytesStart<'static> {
    debug_assert!(values.iter().all(|(k, _)| schema.field(k).is_some()));
    let mut tag = BytesStart::new(schema.name);
    for field in schema.fields {
        if let Some((_, value)) = values.iter().find(|(k, _)| *k == field.name) {
            tag.push_attribute((field.name, value.as_str()));
        }
    }
    tag
}

fn write_point(out: &mut Out, p: Point) -> Result<(), CdmlError> {
    let mut values = vec![("x", format_length(p.x)), ("y", format_length(p.y))];
    if let Some(z) = p.z {
        values.push(("z", format_length(z)));
    }
    out.write_event(Event::Empty(start(&schema::POINT, values)))?;
    Ok(())
}

fn write_text_element(out: &mut Out, name: &str, text: &str) -> Result<(), CdmlError> {
    out.write_event(Event::Start(BytesStart::new(name)))?;
    out.write_event(Event::Text(BytesText::new(text)))?;
    out.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn atom_start(id: String, atom: &Atom) -> BytesStart<'static> {
    let mut values = vec![("id", id), ("name", atom.symbol.as_str().to_owned())];
    if atom.charge != 0 {
        values.push(("charge", atom.charge.to_string()));
    }
    if atom.free_sites != 0 {
        values.push(("free_sites", atom.free_sites.to_string()));
    }
    match atom.symbol {
        AtomSymbol::Group(_) => {
            values.push(("group-type", "builtin".to_owned()));
            start(&schema::GROUP, values)
        }
        AtomSymbol::Element(_) => {
            if let Some(h) = atom.hydrogens {
                values.push(("hydrogens", h.to_string()));
            } else if atom.show_hydrogens {
                values.push(("hydrogens", "on".to_owned()));
            }
            if let Some(v) = atom.valency {
                values.push(("valency", v.to_string()));
            }
            if atom.multiplicity != 1 {
                values.push(("multiplicity", atom.multiplicity.to_string()));
            }
            start(&schema::ATOM, values)
        }
    }
}

fn write_molecule(out: &mut Out, doc: &Document, mk: MoleculeKey, mol: &Molecule) -> Result<(), CdmlError> {
    let mut values = vec![("id", id_of(doc, ObjectRef::Molecule(mk)))];
    if !mol.name.is_empty() {
        values.push(("name", mol.name.clone()));
    }
    out.write_event(Event::Start(start(&schema::MOLECULE, values)))?;

    for key in mol.atoms() {
        let Some(atom) = mol.get_atom(key) else { continue };
        let tag = atom_start(id_of(doc, ObjectRef::Atom(mk, key)), atom);
        let end = BytesEnd::new(schema_name(&tag));
        out.write_event(Event::Start(tag))?;
        write_point(out, atom.position)?;
        out.write_event(Event::End(end))?;
    }

    for key in mol.bonds() {
        let (Some(bond), Some((a, b))) = (mol.get_bond(key), mol.endpoints(key)) else {
            continue;
        };
        let mut values = vec![
            ("id", id_of(doc, ObjectRef::Bond(mk, key))),
            ("type", bond.type_code()),
            ("start", id_of(doc, ObjectRef::Atom(mk, a))),
            ("end", id_of(doc, ObjectRef::Atom(mk, b))),
        ];
        if let Some(center) = bond.center {
            values.push(("center", if center { "yes" } else { "no" }.to_owned()));
        }
        out.write_event(Event::Empty(start(&schema::BOND, values)))?;
    }

    for fragment in mol.fragments().iter().filter(|f| f.is_consistent(mol)) {
        write_fragment(out, doc, mk, fragment)?;
    }

    out.write_event(Event::End(BytesEnd::new("molecule")))?;
    Ok(())
}

fn schema_name(tag: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).into_owned()
}

fn write_fragment(out: &mut Out, doc: &Document, mk: MoleculeKey, fragment: &Fragment) -> Result<(), CdmlError> {
    let record = fragment.to_record(|b| id_of(doc, ObjectRef::Bond(mk, b)));
    let values = vec![("id", record.id.clone()), ("type", record.kind.as_str().to_owned())];
    out.write_event(Event::Start(start(&schema::FRAGMENT, values)))?;
    write_text_element(out, "name", &record.name)?;
    for bond in &record.bonds {
        out.write_event(Event::Empty(start(&schema::FRAGMENT_BOND, vec![("id", bond.clone())])))?;
    }
    for (name, value) in &record.properties {
        let values = vec![
            ("name", name.clone()),
            ("value", value.to_string()),
            ("type", value.type_name().to_owned()),
        ];
        out.write_event(Event::Empty(start(&schema::PROPERTY, values)))?;
    }
    out.write_event(Event::End(BytesEnd::new("fragment")))?;
    Ok(())
}

fn write_item(out: &mut Out, doc: &Document, key: ItemKey, item: &Item) -> Result<(), CdmlError> {
    let values = vec![("id", id_of(doc, ObjectRef::Item(key)))];
    let schema = match item {
        Item::Arrow { .. } => &schema::ARROW,
        Item::Plus { .. } => &schema::PLUS,
        Item::Text { .. } => &schema::TEXT,
    };
    out.write_event(Event::Start(start(schema, values)))?;
    match item {
        Item::Arrow { points } => {
            for &p in points {
                write_point(out, p)?;
            }
        }
        Item::Plus { position } => write_point(out, *position)?,
        Item::Text { position, text } => {
            write_point(out, *position)?;
            write_text_element(out, "ftext", text)?;
        }
    }
    out.write_event(Event::End(BytesEnd::new(schema.name)))?;
    Ok(())
}

fn write_reaction(out: &mut Out, doc: &Document, id: String, reaction: &Reaction) -> Result<(), CdmlError> {
    out.write_event(Event::Start(start(&schema::REACTION, vec![("id", id)])))?;
    let members = reaction
        .reactants
        .iter()
        .map(|&m| ("reactant", ObjectRef::Molecule(m)))
        .chain(reaction.products.iter().map(|&m| ("product", ObjectRef::Molecule(m))))
        .chain(reaction.arrows.iter().map(|&i| ("arrow", ObjectRef::Item(i))))
        .chain(reaction.conditions.iter().map(|&i| ("condition", ObjectRef::Item(i))))
        .chain(reaction.pluses.iter().map(|&i| ("plus", ObjectRef::Item(i))));
    for (name, object) in members {
        let Some(idref) = doc.id_of(object) else { continue };
        let mut tag = BytesStart::new(name);
        tag.push_attribute(("idref", idref));
        out.write_event(Event::Empty(tag))?;
    }
    out.write_event(Event::End(BytesEnd::new("reaction")))?;
    Ok(())
}
