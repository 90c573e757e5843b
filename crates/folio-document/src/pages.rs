//! Page tree: enumeration, page creation, and flattening of inheritable
//! attributes onto leaf pages.

use std::collections::BTreeSet;

use folio_objects::{Array, Dictionary, Item};
use folio_schema::tables::INHERITABLE_PAGE_KEYS;
use folio_schema::Kind;
use folio_types::{ObjectId, Rectangle};
use folio_xref::XrefTable;
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{DocumentError, DocumentResult};

/// Default media box, A4 portrait in points.
pub fn a4() -> Rectangle {
    Rectangle::new(0.0, 0.0, 595.0, 842.0)
}

/// A leaf page and its ancestors, nearest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PageLeaf {
    pub id: ObjectId,
    pub ancestors: Vec<ObjectId>,
}

fn is_page(dict: &Dictionary) -> bool {
    dict.kind() == Kind::Page || dict.get("/Type").and_then(Item::as_name).is_some_and(|t| t == "/Page")
}

fn kids(table: &XrefTable, node: &Dictionary) -> Vec<ObjectId> {
    let array = match node.get("/Kids") {
        Some(Item::Array(kids)) => Some(kids),
        Some(Item::Reference(id)) => table.array(*id),
        _ => None,
    };
    array
        .into_iter()
        .flat_map(|kids| kids.iter().filter_map(Item::as_reference))
        .collect()
}

/// Leaf pages under `root` in document order.
///
/// The walk uses an explicit stack. Nodes seen twice and kids that do not
/// resolve to a dictionary are skipped with a warning.
pub(crate) fn page_leaves(table: &XrefTable, root: ObjectId) -> Vec<PageLeaf> {
    let mut leaves = Vec::new();
    let mut seen = BTreeSet::new();
    let mut stack = vec![(root, Vec::new())];
    while let Some((id, ancestors)) = stack.pop() {
        if !seen.insert(id) {
            warn!(id = %id, "page tree node visited twice");
            continue;
        }
        let Some(node) = table.dictionary(id) else {
            warn!(id = %id, "page tree kid is not a dictionary");
            continue;
        };
        if is_page(node) {
            leaves.push(PageLeaf { id, ancestors });
            continue;
        }
        let mut chain = Vec::with_capacity(ancestors.len() + 1);
        chain.push(id);
        chain.extend(ancestors);
        for kid in kids(table, node).into_iter().rev() {
            stack.push((kid, chain.clone()));
        }
    }
    leaves
}

/// Copy inherited attributes onto every leaf page that lacks them, and
/// promote the nodes of the tree to their page kinds. Returns the number
/// of values copied.
pub(crate) fn flatten_page_tree(table: &mut XrefTable, root: ObjectId) -> DocumentResult<usize> {
    let mut copied = 0;
    for leaf in page_leaves(table, root) {
        table.specialize(leaf.id, Kind::Page)?;
        for &ancestor in &leaf.ancestors {
            table.specialize(ancestor, Kind::Pages)?;
        }
        for &key in INHERITABLE_PAGE_KEYS {
            if table.dictionary(leaf.id).is_some_and(|page| page.contains_key(key)) {
                continue;
            }
            let inherited = leaf
                .ancestors
                .iter()
                .find_map(|&ancestor| table.dictionary(ancestor)?.get(key).cloned());
            if let (Some(value), Some(page)) = (inherited, table.dictionary_mut(leaf.id)) {
                page.set(key, value)?;
                copied += 1;
            }
        }
    }
    debug!(copied, "flattened page tree");
    Ok(copied)
}

impl Document {
    /// Identity of the page tree root named by the catalog.
    pub fn pages_id(&self) -> DocumentResult<ObjectId> {
        self.catalog()?
            .get("/Pages")
            .and_then(Item::as_reference)
            .ok_or_else(|| DocumentError::MalformedPageTree("catalog has no /Pages reference".into()))
    }

    /// Leaf page identities in document order.
    pub fn page_ids(&self) -> DocumentResult<Vec<ObjectId>> {
        let leaves = page_leaves(&self.table, self.pages_id()?);
        Ok(leaves.into_iter().map(|leaf| leaf.id).collect())
    }

    pub fn page_count(&self) -> DocumentResult<usize> {
        Ok(page_leaves(&self.table, self.pages_id()?).len())
    }

    /// Append an empty page with an A4 `/MediaBox` to the page tree root.
    pub fn add_page(&mut self) -> DocumentResult<ObjectId> {
        self.ensure_modifiable()?;
        let pages = self.pages_id()?;

        let mut page = Dictionary::of_kind(Kind::Page);
        page.set("/Parent", pages)?;
        page.set_rectangle("/MediaBox", a4())?;
        page.set("/Resources", Dictionary::of_kind(Kind::Resources))?;
        let id = self.table.register(page)?;

        let kids_ref = self
            .table
            .dictionary(pages)
            .and_then(|node| node.get("/Kids"))
            .and_then(Item::as_reference);
        let kids = match kids_ref {
            Some(array) => self.table.array_mut(array),
            None => self
                .table
                .dictionary_mut(pages)
                .and_then(|node| node.get_mut("/Kids"))
                .and_then(Item::as_array_mut),
        };
        match kids {
            Some(kids) => kids.push(id),
            None => {
                let node = self
                    .table
                    .dictionary_mut(pages)
                    .ok_or_else(|| DocumentError::MalformedPageTree(format!("{pages} is not a dictionary")))?;
                node.set("/Kids", Array::from_items([Item::Reference(id)]))?;
            }
        }

        if let Some(node) = self.table.dictionary_mut(pages) {
            let count = node.get("/Count").and_then(Item::as_i64).unwrap_or(0);
            node.set_int("/Count", count + 1)?;
        }
        debug!(id = %id, parent = %pages, "added page");
        Ok(id)
    }
}
