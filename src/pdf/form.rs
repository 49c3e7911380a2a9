//! AcroForm inspection, classification and filling.
//!
//! A loaded PDF with zero interactive fields is classified as static and its
//! bytes pass through untouched. A form-bearing PDF gets each field value
//! resolved through the field mapper, filled according to its kind, and is
//! then flattened: values are stamped into the page content streams, widget
//! annotations and the AcroForm dictionary are removed.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::warn;

use crate::assembly::field_map::resolve_field;
use crate::core::data::{is_checked, stringify};
use crate::core::{AssemblyError, AssemblyResult, LeaseData};

const STAMP_FONT: &[u8] = b"LpFill";
const STAMP_FONT_SIZE: f32 = 9.0;

/// Closed set of fillable field kinds, dispatched per variant rather than by
/// runtime type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
    RadioGroup,
    Dropdown,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::RadioGroup => "radio-group",
            FieldKind::Dropdown => "dropdown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    /// Export options for choice and radio fields, empty otherwise.
    pub options: Vec<String>,
    id: ObjectId,
}

/// Detected handling for one PDF template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfClass {
    Fillable,
    Static,
}

/// Classify a PDF and, when fillable, fill and flatten it. Static documents
/// (including anything that cannot be parsed as a form-bearing PDF) are
/// returned byte-for-byte unchanged.
pub fn classify_and_fill(
    bytes: &[u8],
    data: &LeaseData,
    overrides: Option<&HashMap<String, String>>,
) -> AssemblyResult<(Vec<u8>, PdfClass)> {
    let mut doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("treating unparsable PDF as static: {e}");
            return Ok((bytes.to_vec(), PdfClass::Static));
        }
    };

    let fields = match collect_fields(&doc) {
        Ok(fields) => fields,
        Err(e) => {
            warn!("treating PDF without a readable form as static: {e}");
            return Ok((bytes.to_vec(), PdfClass::Static));
        }
    };

    if fields.is_empty() {
        return Ok((bytes.to_vec(), PdfClass::Static));
    }

    for field in &fields {
        if let Err(e) = fill_field(&mut doc, field, data, overrides) {
            warn!(field = %field.name, "skipping field: {e}");
        }
    }

    flatten(&mut doc, &fields)
        .map_err(|e| AssemblyError::Document(format!("failed to flatten form: {e}")))?;

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| AssemblyError::Document(format!("failed to serialize filled PDF: {e}")))?;
    Ok((out, PdfClass::Fillable))
}

/// Enumerate the form fields of a PDF for the inspection endpoint.
pub fn inspect_fields(bytes: &[u8]) -> AssemblyResult<Vec<FormField>> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| AssemblyError::Document(format!("not a parsable PDF: {e}")))?;
    collect_fields(&doc).map_err(|e| AssemblyError::Document(format!("unreadable form: {e}")))
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

fn string_of(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn number_of(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// Field flag bits, per the PDF spec.
const FF_RADIO: i64 = 1 << 15;
const FF_PUSHBUTTON: i64 = 1 << 16;

fn collect_fields(doc: &Document) -> lopdf::Result<Vec<FormField>> {
    let catalog = doc.catalog()?;
    let Ok(acro_obj) = catalog.get(b"AcroForm") else {
        return Ok(Vec::new());
    };
    let acro = resolve(doc, acro_obj)?.as_dict()?;
    let Ok(fields_obj) = acro.get(b"Fields") else {
        return Ok(Vec::new());
    };
    let entries = resolve(doc, fields_obj)?.as_array()?;

    let mut fields = Vec::new();
    for entry in entries {
        if let Ok(id) = entry.as_reference() {
            walk_field(doc, id, None, None, 0, 0, &mut fields);
        }
    }
    Ok(fields)
}

/// Depth-first walk of the field tree. A kid carrying its own `/T` is a
/// child field and the names join into a dotted qualified name; kids
/// without one are widget annotations of the current field. `/FT` and
/// `/Ff` are inherited down the tree.
fn walk_field<'a>(
    doc: &'a Document,
    id: ObjectId,
    parent_name: Option<&str>,
    inherited_ft: Option<&'a [u8]>,
    inherited_flags: i64,
    depth: usize,
    out: &mut Vec<FormField>,
) {
    // Malformed field trees can cycle.
    if depth > 16 {
        return;
    }
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let partial = dict.get(b"T").ok().and_then(string_of);
    let name = match (parent_name, partial.as_deref()) {
        (Some(parent), Some(own)) => Some(format!("{parent}.{own}")),
        (Some(parent), None) => Some(parent.to_string()),
        (None, own) => own.map(str::to_string),
    };
    let ft = dict
        .get(b"FT")
        .ok()
        .and_then(|o| o.as_name().ok())
        .or(inherited_ft);
    let flags = dict
        .get(b"Ff")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(inherited_flags);

    let children = child_field_ids(doc, dict);
    if !children.is_empty() {
        for child in children {
            walk_field(doc, child, name.as_deref(), ft, flags, depth + 1, out);
        }
        return;
    }

    let (Some(name), Some(ft)) = (name, ft) else {
        return;
    };
    let (kind, options) = match ft {
        b"Tx" => (FieldKind::Text, Vec::new()),
        b"Ch" => (FieldKind::Dropdown, choice_options(doc, dict)),
        b"Btn" if flags & FF_PUSHBUTTON != 0 => return,
        b"Btn" if flags & FF_RADIO != 0 => (FieldKind::RadioGroup, radio_options(doc, id)),
        b"Btn" => (FieldKind::Checkbox, Vec::new()),
        _ => return,
    };

    out.push(FormField {
        name,
        kind,
        options,
        id,
    });
}

/// Kids that are child fields rather than plain widget annotations.
fn child_field_ids(doc: &Document, dict: &Dictionary) -> Vec<ObjectId> {
    let Some(kids) = dict
        .get(b"Kids")
        .ok()
        .and_then(|o| resolve(doc, o).ok())
        .and_then(|o| o.as_array().ok())
    else {
        return Vec::new();
    };
    kids.iter()
        .filter_map(|kid| kid.as_reference().ok())
        .filter(|&kid| {
            doc.get_dictionary(kid)
                .map(|d| d.has(b"T"))
                .unwrap_or(false)
        })
        .collect()
}

/// Export values of a choice field's `/Opt` array; entries may be plain
/// strings or `[export, display]` pairs.
fn choice_options(doc: &Document, field: &Dictionary) -> Vec<String> {
    let Some(opts) = field
        .get(b"Opt")
        .ok()
        .and_then(|o| resolve(doc, o).ok())
        .and_then(|o| o.as_array().ok())
    else {
        return Vec::new();
    };
    opts.iter()
        .filter_map(|opt| match opt {
            Object::Array(pair) => pair.first().and_then(string_of),
            other => string_of(other),
        })
        .collect()
}

/// The selectable states of a radio group are the on-states of its kid
/// widgets' normal appearances.
fn radio_options(doc: &Document, field_id: ObjectId) -> Vec<String> {
    widget_ids(doc, field_id)
        .into_iter()
        .filter_map(|id| on_state(doc, id))
        .collect()
}

/// Terminal widget annotations of a field: its `/Kids`, or the field dict
/// itself when it doubles as the widget.
fn widget_ids(doc: &Document, field_id: ObjectId) -> Vec<ObjectId> {
    let Ok(dict) = doc.get_dictionary(field_id) else {
        return Vec::new();
    };
    match dict
        .get(b"Kids")
        .ok()
        .and_then(|o| resolve(doc, o).ok())
        .and_then(|o| o.as_array().ok())
    {
        Some(kids) => kids.iter().filter_map(|k| k.as_reference().ok()).collect(),
        None => vec![field_id],
    }
}

/// The non-`Off` key of a widget's `/AP /N` appearance dictionary.
fn on_state(doc: &Document, widget_id: ObjectId) -> Option<String> {
    let dict = doc.get_dictionary(widget_id).ok()?;
    let ap = resolve(doc, dict.get(b"AP").ok()?).ok()?.as_dict().ok()?;
    let normal = resolve(doc, ap.get(b"N").ok()?).ok()?.as_dict().ok()?;
    normal
        .iter()
        .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
        .find(|key| key != "Off")
}

fn field_dict_mut(doc: &mut Document, id: ObjectId) -> lopdf::Result<&mut Dictionary> {
    doc.get_object_mut(id)?.as_dict_mut()
}

fn fill_field(
    doc: &mut Document,
    field: &FormField,
    data: &LeaseData,
    overrides: Option<&HashMap<String, String>>,
) -> lopdf::Result<()> {
    let Some(value) = resolve_field(&field.name, data, overrides) else {
        return Ok(());
    };

    match field.kind {
        FieldKind::Text => {
            let text = stringify(&value);
            field_dict_mut(doc, field.id)?.set("V", Object::string_literal(text));
        }
        FieldKind::Checkbox => {
            let state = if is_checked(&value) {
                on_state(doc, field.id).unwrap_or_else(|| "Yes".to_string())
            } else {
                "Off".to_string()
            };
            let name = Object::Name(state.into_bytes());
            let dict = field_dict_mut(doc, field.id)?;
            dict.set("V", name.clone());
            dict.set("AS", name);
        }
        FieldKind::RadioGroup => {
            let choice = stringify(&value);
            if !field.options.contains(&choice) {
                warn!(field = %field.name, %choice, "no radio option matches value");
                return Ok(());
            }
            field_dict_mut(doc, field.id)?
                .set("V", Object::Name(choice.clone().into_bytes()));
            for widget in widget_ids(doc, field.id) {
                let selected = on_state(doc, widget).as_deref() == Some(choice.as_str());
                let state = if selected { choice.clone() } else { "Off".to_string() };
                field_dict_mut(doc, widget)?.set("AS", Object::Name(state.into_bytes()));
            }
        }
        FieldKind::Dropdown => {
            let choice = stringify(&value);
            if !field.options.is_empty() && !field.options.contains(&choice) {
                warn!(field = %field.name, %choice, "no dropdown option matches value");
                return Ok(());
            }
            field_dict_mut(doc, field.id)?.set("V", Object::string_literal(choice));
        }
    }
    Ok(())
}

/// One piece of text to bake into a page.
struct Stamp {
    page_id: ObjectId,
    rect: [f32; 4],
    text: String,
}

/// Bake the filled values into static page content and remove all form
/// interactivity: widget annotations and the catalog's AcroForm entry.
fn flatten(doc: &mut Document, fields: &[FormField]) -> lopdf::Result<()> {
    let annot_pages = annotation_page_map(doc);
    let stamps = collect_stamps(doc, fields, &annot_pages);

    let font_id = doc.add_object(dictionary! {
        "Type" => Object::Name(b"Font".to_vec()),
        "Subtype" => Object::Name(b"Type1".to_vec()),
        "BaseFont" => Object::Name(b"Helvetica".to_vec()),
    });

    let mut by_page: HashMap<ObjectId, Vec<&Stamp>> = HashMap::new();
    for stamp in &stamps {
        by_page.entry(stamp.page_id).or_default().push(stamp);
    }

    for (page_id, page_stamps) in by_page {
        ensure_page_font(doc, page_id, font_id)?;
        let content = stamp_content(&page_stamps);
        append_content_to_page(doc, page_id, content)?;
    }

    let widget_set: Vec<ObjectId> = fields
        .iter()
        .flat_map(|f| widget_ids(doc, f.id))
        .chain(fields.iter().map(|f| f.id))
        .collect();
    remove_widget_annotations(doc, &widget_set)?;

    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    doc.get_object_mut(root_id)?.as_dict_mut()?.remove(b"AcroForm");
    Ok(())
}

/// Map every annotation reference to the page that carries it.
fn annotation_page_map(doc: &Document) -> HashMap<ObjectId, ObjectId> {
    let mut map = HashMap::new();
    for (_, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Some(annots) = page
            .get(b"Annots")
            .ok()
            .and_then(|o| resolve(doc, o).ok())
            .and_then(|o| o.as_array().ok())
        else {
            continue;
        };
        for annot in annots {
            if let Ok(id) = annot.as_reference() {
                map.insert(id, page_id);
            }
        }
    }
    map
}

fn collect_stamps(
    doc: &Document,
    fields: &[FormField],
    annot_pages: &HashMap<ObjectId, ObjectId>,
) -> Vec<Stamp> {
    let mut stamps = Vec::new();
    for field in fields {
        let current = doc
            .get_dictionary(field.id)
            .ok()
            .and_then(|d| d.get(b"V").ok())
            .and_then(string_of);
        let Some(value) = current else {
            continue;
        };

        match field.kind {
            FieldKind::Text | FieldKind::Dropdown => {
                if value.is_empty() {
                    continue;
                }
                for widget in widget_ids(doc, field.id) {
                    let (Some(&page_id), Some(rect)) =
                        (annot_pages.get(&widget), widget_rect(doc, widget))
                    else {
                        continue;
                    };
                    stamps.push(Stamp {
                        page_id,
                        rect,
                        text: value.clone(),
                    });
                }
            }
            FieldKind::Checkbox | FieldKind::RadioGroup => {
                if value == "Off" {
                    continue;
                }
                for widget in widget_ids(doc, field.id) {
                    let checked = match field.kind {
                        FieldKind::Checkbox => true,
                        _ => on_state(doc, widget).as_deref() == Some(value.as_str()),
                    };
                    if !checked {
                        continue;
                    }
                    let (Some(&page_id), Some(rect)) =
                        (annot_pages.get(&widget), widget_rect(doc, widget))
                    else {
                        continue;
                    };
                    stamps.push(Stamp {
                        page_id,
                        rect,
                        text: "X".to_string(),
                    });
                }
            }
        }
    }
    stamps
}

fn widget_rect(doc: &Document, widget_id: ObjectId) -> Option<[f32; 4]> {
    let dict = doc.get_dictionary(widget_id).ok()?;
    let rect = resolve(doc, dict.get(b"Rect").ok()?).ok()?.as_array().ok()?;
    if rect.len() != 4 {
        return None;
    }
    let mut coords = [0.0f32; 4];
    for (slot, obj) in coords.iter_mut().zip(rect) {
        *slot = number_of(resolve(doc, obj).ok()?)?;
    }
    let [x1, y1, x2, y2] = coords;
    Some([x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)])
}

fn stamp_content(stamps: &[&Stamp]) -> Vec<u8> {
    let mut operations = Vec::new();
    for stamp in stamps {
        let [x_min, y_min, _, y_max] = stamp.rect;
        let height = y_max - y_min;
        let baseline = y_min + ((height - STAMP_FONT_SIZE).max(0.0) / 2.0) + 1.5;

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(STAMP_FONT.to_vec()),
                Object::Real(STAMP_FONT_SIZE),
            ],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(x_min + 2.0), Object::Real(baseline)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(stamp.text.as_str())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }.encode().unwrap_or_default()
}

/// Register the flattening font in a page's `/Resources /Font` dictionary,
/// following references one level for shared resource dictionaries.
fn ensure_page_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> lopdf::Result<()> {
    let font_key = String::from_utf8_lossy(STAMP_FONT).into_owned();

    let resources_entry = doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();
    match resources_entry {
        Some(Object::Reference(res_id)) => {
            let resources = doc.get_object_mut(res_id)?.as_dict_mut()?;
            set_font_entry(resources, &font_key, font_id);
        }
        Some(Object::Dictionary(mut resources)) => {
            set_font_entry(&mut resources, &font_key, font_id);
            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .set("Resources", Object::Dictionary(resources));
        }
        _ => {
            let mut resources = Dictionary::new();
            set_font_entry(&mut resources, &font_key, font_id);
            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .set("Resources", Object::Dictionary(resources));
        }
    }
    Ok(())
}

fn set_font_entry(resources: &mut Dictionary, font_key: &str, font_id: ObjectId) {
    match resources.get_mut(b"Font") {
        Ok(Object::Dictionary(fonts)) => {
            fonts.set(font_key, Object::Reference(font_id));
        }
        _ => {
            let mut fonts = Dictionary::new();
            fonts.set(font_key, Object::Reference(font_id));
            resources.set("Font", Object::Dictionary(fonts));
        }
    }
}

fn append_content_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    content: Vec<u8>,
) -> lopdf::Result<()> {
    let stream_id = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), content)));
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;

    let existing = page.get(b"Contents").ok().cloned();
    match existing {
        Some(Object::Reference(existing_id)) => {
            page.set(
                "Contents",
                Object::Array(vec![
                    Object::Reference(existing_id),
                    Object::Reference(stream_id),
                ]),
            );
        }
        Some(Object::Array(mut streams)) => {
            streams.push(Object::Reference(stream_id));
            page.set("Contents", Object::Array(streams));
        }
        _ => {
            page.set("Contents", Object::Reference(stream_id));
        }
    }
    Ok(())
}

fn remove_widget_annotations(doc: &mut Document, widgets: &[ObjectId]) -> lopdf::Result<()> {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    for page_id in page_ids {
        let annots_entry = doc.get_dictionary(page_id)?.get(b"Annots").ok().cloned();
        match annots_entry {
            Some(Object::Array(annots)) => {
                let kept = prune_widgets(annots, widgets);
                let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
                if kept.is_empty() {
                    page.remove(b"Annots");
                } else {
                    page.set("Annots", Object::Array(kept));
                }
            }
            Some(Object::Reference(annots_id)) => {
                let annots = doc.get_object(annots_id)?.as_array()?.clone();
                let kept = prune_widgets(annots, widgets);
                *doc.get_object_mut(annots_id)? = Object::Array(kept);
            }
            _ => {}
        }
    }
    Ok(())
}

fn prune_widgets(annots: Vec<Object>, widgets: &[ObjectId]) -> Vec<Object> {
    annots
        .into_iter()
        .filter(|annot| match annot.as_reference() {
            Ok(id) => !widgets.contains(&id),
            Err(_) => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn lease_data(entries: Value) -> LeaseData {
        let Value::Object(map) = entries else {
            panic!("test data must be an object")
        };
        LeaseData::new(map)
    }

    /// Single page, no AcroForm.
    fn static_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            b"BT ET".to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(vec![Object::Reference(page_id)]),
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    /// Single page with a text field, a checkbox and a dropdown.
    fn fillable_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let text_field = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Widget".to_vec()),
            "FT" => Object::Name(b"Tx".to_vec()),
            "T" => Object::string_literal("tenant1_name"),
            "Rect" => Object::Array(vec![100.into(), 600.into(), 300.into(), 620.into()]),
        });
        let checkbox = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Widget".to_vec()),
            "FT" => Object::Name(b"Btn".to_vec()),
            "T" => Object::string_literal("pets_allowed"),
            "Rect" => Object::Array(vec![100.into(), 560.into(), 115.into(), 575.into()]),
            "AP" => Object::Dictionary(dictionary! {
                "N" => Object::Dictionary(dictionary! {
                    "On" => Object::Null,
                    "Off" => Object::Null,
                }),
            }),
        });
        let dropdown = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Widget".to_vec()),
            "FT" => Object::Name(b"Ch".to_vec()),
            "T" => Object::string_literal("utilities"),
            "Rect" => Object::Array(vec![100.into(), 520.into(), 220.into(), 540.into()]),
            "Opt" => Object::Array(vec![
                Object::string_literal("Tenant"),
                Object::string_literal("Landlord"),
            ]),
        });

        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            b"BT ET".to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            "Annots" => Object::Array(vec![
                Object::Reference(text_field),
                Object::Reference(checkbox),
                Object::Reference(dropdown),
            ]),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(vec![Object::Reference(page_id)]),
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => Object::Dictionary(dictionary! {
                "Fields" => Object::Array(vec![
                    Object::Reference(text_field),
                    Object::Reference(checkbox),
                    Object::Reference(dropdown),
                ]),
            }),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    /// Single page with one text field nested under a non-terminal parent,
    /// the shape Acrobat produces for grouped fields. The parent carries the
    /// `/FT`; the terminal kid only its partial name.
    fn nested_field_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let parent_id = doc.new_object_id();

        let child = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Widget".to_vec()),
            "T" => Object::string_literal("name"),
            "Parent" => Object::Reference(parent_id),
            "Rect" => Object::Array(vec![100.into(), 600.into(), 300.into(), 620.into()]),
        });
        doc.objects.insert(
            parent_id,
            Object::Dictionary(dictionary! {
                "FT" => Object::Name(b"Tx".to_vec()),
                "T" => Object::string_literal("tenant1"),
                "Kids" => Object::Array(vec![Object::Reference(child)]),
            }),
        );

        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            b"BT ET".to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            "Annots" => Object::Array(vec![Object::Reference(child)]),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(vec![Object::Reference(page_id)]),
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => Object::Dictionary(dictionary! {
                "Fields" => Object::Array(vec![Object::Reference(parent_id)]),
            }),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    /// Single page with a radio group: parent `Btn` field with the radio
    /// flag, two kid widgets with distinct on-states.
    fn radio_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let group_id = doc.new_object_id();

        let monthly = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Widget".to_vec()),
            "Parent" => Object::Reference(group_id),
            "Rect" => Object::Array(vec![100.into(), 560.into(), 115.into(), 575.into()]),
            "AP" => Object::Dictionary(dictionary! {
                "N" => Object::Dictionary(dictionary! {
                    "Monthly" => Object::Null,
                    "Off" => Object::Null,
                }),
            }),
        });
        let annual = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Annot".to_vec()),
            "Subtype" => Object::Name(b"Widget".to_vec()),
            "Parent" => Object::Reference(group_id),
            "Rect" => Object::Array(vec![100.into(), 540.into(), 115.into(), 555.into()]),
            "AP" => Object::Dictionary(dictionary! {
                "N" => Object::Dictionary(dictionary! {
                    "Annual" => Object::Null,
                    "Off" => Object::Null,
                }),
            }),
        });
        doc.objects.insert(
            group_id,
            Object::Dictionary(dictionary! {
                "FT" => Object::Name(b"Btn".to_vec()),
                "T" => Object::string_literal("payment_frequency"),
                "Ff" => Object::Integer(FF_RADIO),
                "Kids" => Object::Array(vec![
                    Object::Reference(monthly),
                    Object::Reference(annual),
                ]),
            }),
        );

        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            b"BT ET".to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Page".to_vec()),
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            "Annots" => Object::Array(vec![
                Object::Reference(monthly),
                Object::Reference(annual),
            ]),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(vec![Object::Reference(page_id)]),
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => Object::Dictionary(dictionary! {
                "Fields" => Object::Array(vec![Object::Reference(group_id)]),
            }),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn inspect_reports_fields_and_kinds() {
        let fields = inspect_fields(&fillable_pdf()).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "tenant1_name");
        assert_eq!(fields[0].kind, FieldKind::Text);
        assert_eq!(fields[1].kind, FieldKind::Checkbox);
        assert_eq!(fields[2].kind, FieldKind::Dropdown);
        assert_eq!(fields[2].options, vec!["Tenant", "Landlord"]);
    }

    #[test]
    fn static_pdf_passes_through_unchanged() {
        let bytes = static_pdf();
        let data = lease_data(json!({ "tenant1_name": "ignored" }));
        let (out, class) = classify_and_fill(&bytes, &data, None).unwrap();
        assert_eq!(class, PdfClass::Static);
        assert_eq!(out, bytes);
    }

    #[test]
    fn unparsable_bytes_pass_through_as_static() {
        let data = lease_data(json!({}));
        let (out, class) = classify_and_fill(b"not a pdf", &data, None).unwrap();
        assert_eq!(class, PdfClass::Static);
        assert_eq!(out, b"not a pdf");
    }

    #[test]
    fn fill_flattens_values_into_page_content() {
        let data = lease_data(json!({
            "tenant1_name": "John Smith",
            "pets_allowed": "Yes",
            "utilities": "Tenant",
        }));
        let (out, class) = classify_and_fill(&fillable_pdf(), &data, None).unwrap();
        assert_eq!(class, PdfClass::Fillable);

        let doc = Document::load_mem(&out).unwrap();
        let catalog = doc.catalog().unwrap();
        assert!(catalog.get(b"AcroForm").is_err(), "form must be removed");

        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        assert!(doc.get_dictionary(page_id).unwrap().get(b"Annots").is_err());

        let content = doc.get_page_content(page_id).unwrap();
        let content = String::from_utf8_lossy(&content);
        assert!(content.contains("John Smith"));
        assert!(content.contains("Tenant"));
        // checked box renders its mark
        assert!(content.contains("(X)"));
    }

    #[test]
    fn non_checked_value_leaves_checkbox_unmarked() {
        let data = lease_data(json!({
            "pets_allowed": "no",
        }));
        let (out, _) = classify_and_fill(&fillable_pdf(), &data, None).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        assert!(!String::from_utf8_lossy(&content).contains("(X)"));
    }

    #[test]
    fn unmatched_dropdown_option_is_skipped() {
        let data = lease_data(json!({ "utilities": "Shared" }));
        let (out, class) = classify_and_fill(&fillable_pdf(), &data, None).unwrap();
        assert_eq!(class, PdfClass::Fillable);
        let doc = Document::load_mem(&out).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        assert!(!String::from_utf8_lossy(&content).contains("Shared"));
    }

    #[test]
    fn nested_fields_are_enumerated_by_qualified_name() {
        let fields = inspect_fields(&nested_field_pdf()).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "tenant1.name");
        assert_eq!(fields[0].kind, FieldKind::Text);
    }

    #[test]
    fn nested_field_form_is_fillable() {
        let data = lease_data(json!({ "tenant1.name": "John Smith" }));
        let (out, class) = classify_and_fill(&nested_field_pdf(), &data, None).unwrap();
        assert_eq!(class, PdfClass::Fillable);

        let doc = Document::load_mem(&out).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("John Smith"));
    }

    #[test]
    fn radio_group_selects_the_matching_widget() {
        let fields = inspect_fields(&radio_pdf()).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].kind, FieldKind::RadioGroup);
        assert_eq!(fields[0].options, vec!["Monthly", "Annual"]);

        let data = lease_data(json!({ "payment_frequency": "Annual" }));
        let (out, class) = classify_and_fill(&radio_pdf(), &data, None).unwrap();
        assert_eq!(class, PdfClass::Fillable);

        let doc = Document::load_mem(&out).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let content = String::from_utf8_lossy(&content);
        assert_eq!(content.matches("(X)").count(), 1, "exactly one state marked");
        assert!(doc.get_dictionary(page_id).unwrap().get(b"Annots").is_err());
    }

    #[test]
    fn radio_value_without_matching_option_is_skipped() {
        let data = lease_data(json!({ "payment_frequency": "Weekly" }));
        let (out, class) = classify_and_fill(&radio_pdf(), &data, None).unwrap();
        assert_eq!(class, PdfClass::Fillable);

        let doc = Document::load_mem(&out).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        assert!(!String::from_utf8_lossy(&content).contains("(X)"));
    }

    #[test]
    fn absent_fields_never_error() {
        let data = lease_data(json!({}));
        let (_, class) = classify_and_fill(&fillable_pdf(), &data, None).unwrap();
        assert_eq!(class, PdfClass::Fillable);
    }
}
