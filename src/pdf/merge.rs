//! Ordered multi-document PDF merging.
//!
//! Every object of every input is renumbered into one accumulating document
//! and a fresh page tree and catalog are built over the collected page
//! references. Page order is preserved across documents and within each
//! document. Merging is all-or-nothing: a corrupt input fails the whole
//! operation, since a partial lease package is not meaningful.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::core::{AssemblyError, AssemblyResult};

/// Merge an ordered list of PDF byte buffers into a single document.
pub fn merge_pdfs(buffers: &[Vec<u8>]) -> AssemblyResult<Vec<u8>> {
    if buffers.is_empty() {
        return Err(AssemblyError::Merge("no documents to merge".to_string()));
    }

    let mut merged = Document::with_version("1.5");
    let pages_id = merged.new_object_id();
    let mut page_refs: Vec<Object> = Vec::new();

    for (index, buffer) in buffers.iter().enumerate() {
        let doc = Document::load_mem(buffer).map_err(|e| {
            AssemblyError::Merge(format!("document {} is not a valid PDF: {e}", index + 1))
        })?;
        if doc.get_pages().is_empty() {
            return Err(AssemblyError::Merge(format!(
                "document {} has no pages",
                index + 1
            )));
        }

        // The source catalogs and page tree nodes are replaced by the fresh
        // root built below, so they are not carried over.
        let mut id_map: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut next_id = merged.max_id + 1;
        for (&old_id, object) in &doc.objects {
            if is_page_tree_node(object) {
                continue;
            }
            id_map.insert(old_id, (next_id, 0));
            next_id += 1;
        }
        merged.max_id = next_id - 1;

        for (&old_id, object) in &doc.objects {
            let Some(&new_id) = id_map.get(&old_id) else {
                continue;
            };
            let mut cloned = object.clone();
            renumber_references(&mut cloned, &id_map);
            merged.objects.insert(new_id, cloned);
        }

        // get_pages is ordered by page number, which keeps the within-document
        // page order intact.
        for (_, page_id) in doc.get_pages() {
            let Some(&new_page_id) = id_map.get(&page_id) else {
                continue;
            };
            if let Ok(page) = merged
                .get_object_mut(new_page_id)
                .and_then(Object::as_dict_mut)
            {
                page.set("Parent", Object::Reference(pages_id));
            }
            page_refs.push(Object::Reference(new_page_id));
        }
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Kids", Object::Array(page_refs.clone()));
    pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
    merged
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = merged.add_object(catalog);

    merged.trailer.set("Root", Object::Reference(catalog_id));
    merged
        .trailer
        .set("Size", Object::Integer(merged.max_id as i64 + 1));

    let mut out = Vec::new();
    merged
        .save_to(&mut out)
        .map_err(|e| AssemblyError::Merge(format!("failed to serialize merged PDF: {e}")))?;
    Ok(out)
}

/// Catalog and intermediate `/Pages` nodes of a source document.
fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|t| t.as_name().ok())
        .map(|t| t == b"Pages" || t == b"Catalog")
        .unwrap_or(false)
}

fn renumber_references(object: &mut Object, id_map: &HashMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            if let Some(&new_id) = id_map.get(id) {
                *id = new_id;
            }
        }
        Object::Array(items) => {
            for item in items {
                renumber_references(item, id_map);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                renumber_references(value, id_map);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                renumber_references(value, id_map);
            }
        }
        _ => {}
    }
}
