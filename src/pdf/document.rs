use crate::error::{Result, SplitError};
use crate::page_groups::PageGroup;
use crate::split::PageSource;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards the parent walk against cyclic page trees
const MAX_TREE_DEPTH: usize = 64;

pub struct PdfDocument {
    doc: Document,
    path: PathBuf,
    /// Page object ids in page order
    pages: Vec<ObjectId>,
    page_set: HashSet<ObjectId>,
}

impl PdfDocument {
    /// Load a PDF, telling a missing file apart from one that cannot be parsed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SplitError::NotFound {
                path: path.to_path_buf(),
            },
            _ => SplitError::CorruptDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        let doc = Document::load_mem(&bytes).map_err(|e| SplitError::CorruptDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(PdfDocument::from_document(doc, path))
    }

    /// Wrap an already parsed document; `path` is only used in error messages
    pub fn from_document<P: Into<PathBuf>>(doc: Document, path: P) -> Self {
        let mut numbered: Vec<_> = doc.get_pages().into_iter().collect();
        numbered.sort_by_key(|(num, _)| *num);
        let pages: Vec<ObjectId> = numbered.into_iter().map(|(_, id)| id).collect();
        let page_set = pages.iter().copied().collect();

        PdfDocument {
            doc,
            path: path.into(),
            pages,
            page_set,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Build a new document holding only the pages in `keep`, in their original
    /// order, plus the objects those pages reach.
    pub fn extract_pages(&self, keep: &PageGroup) -> Result<Document> {
        let total = self.page_count();
        if keep.first == 0 || keep.last > total || keep.first > keep.last {
            return Err(SplitError::InvalidParameter(format!(
                "Pages {}-{} are out of range (1-{})",
                keep.first, keep.last, total
            )));
        }

        let kept = &self.pages[(keep.first - 1) as usize..keep.last as usize];
        let pages_id = (self.doc.max_id + 1, 0);
        let catalog_id = (self.doc.max_id + 2, 0);

        let mut new_doc = Document::with_version(self.doc.version.clone());
        let mut pending: Vec<ObjectId> = Vec::new();

        for &page_id in kept {
            let mut page = self.page_with_inherited(page_id)?;
            for (key, value) in page.iter() {
                if key.as_slice() != b"Parent" {
                    collect_references(value, &mut pending);
                }
            }
            page.set("Parent", pages_id);
            new_doc.objects.insert(page_id, Object::Dictionary(page));
        }

        while let Some(id) = pending.pop() {
            // Pages outside the group, e.g. link targets, stay out
            if new_doc.objects.contains_key(&id) || self.page_set.contains(&id) {
                continue;
            }
            // Dangling references are left dangling
            let Ok(object) = self.doc.get_object(id) else {
                continue;
            };
            if is_page_tree_node(object) {
                continue;
            }
            collect_references(object, &mut pending);
            new_doc.objects.insert(id, object.clone());
        }

        let kids: Vec<Object> = kept.iter().map(|&id| Object::Reference(id)).collect();
        new_doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => kept.len() as i64,
            }),
        );
        new_doc.objects.insert(
            catalog_id,
            Object::Dictionary(dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            }),
        );
        new_doc.trailer.set("Root", catalog_id);
        new_doc.max_id = catalog_id.0;

        Ok(new_doc)
    }

    /// The page dictionary with inheritable attributes pulled down from its
    /// ancestors, since the new page tree is flat
    fn page_with_inherited(&self, page_id: ObjectId) -> Result<Dictionary> {
        let corrupt = |e: lopdf::Error| SplitError::CorruptDocument {
            path: self.path.clone(),
            reason: format!("page object {:?}: {}", page_id, e),
        };

        let mut page = self.doc.get_dictionary(page_id).map_err(corrupt)?.clone();
        let mut parent = parent_of(&page);

        for _ in 0..MAX_TREE_DEPTH {
            let Some(parent_id) = parent else {
                break;
            };
            let node = self.doc.get_dictionary(parent_id).map_err(corrupt)?;
            for key in INHERITABLE {
                if !page.has(key) {
                    if let Ok(value) = node.get(key) {
                        page.set(key, value.clone());
                    }
                }
            }
            parent = parent_of(node);
        }

        Ok(page)
    }
}

fn parent_of(dict: &Dictionary) -> Option<ObjectId> {
    dict.get(b"Parent").and_then(|p| p.as_reference()).ok()
}

fn is_page_tree_node(object: &Object) -> bool {
    match object {
        Object::Dictionary(dict) => dict
            .get(b"Type")
            .and_then(|t| t.as_name())
            .is_ok_and(|name| name == b"Pages"),
        _ => false,
    }
}

fn collect_references(object: &Object, out: &mut Vec<ObjectId>) {
    match object {
        Object::Reference(id) => out.push(*id),
        Object::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, v)| collect_references(v, out)),
        Object::Stream(stream) => stream
            .dict
            .iter()
            .for_each(|(_, v)| collect_references(v, out)),
        _ => {}
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        PdfDocument::page_count(self)
    }

    fn extract_group(&self, group: &PageGroup) -> io::Result<Vec<u8>> {
        let mut new_doc = self
            .extract_pages(group)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        let mut bytes = Vec::new();
        new_doc
            .save_to(&mut bytes)
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(bytes)
    }
}
