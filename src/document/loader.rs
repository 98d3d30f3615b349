/*!
 * Loading: parse a document, build the segment model and the write-back index.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::index::{NodeAddress, NodeIndex};
use crate::document::model::{
    Document, FileUnit, PlaceholderFragment, SegmentDefinition, SegmentFragment, TranslationUnit,
    SDL_NAMESPACE, XLIFF_NAMESPACE,
};
use crate::dom::{Dom, NodeId};
use crate::errors::{XliffError, XliffResult};
use crate::language_utils;
use crate::markup;

/// Options controlling how elements are recognised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderOptions {
    /// Also accept XLIFF element names that are in no namespace
    #[serde(default = "default_true")]
    pub accept_unqualified: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            accept_unqualified: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Document {
    /// Load a document from disk with default options
    pub fn load<P: AsRef<Path>>(path: P) -> XliffResult<Self> {
        Self::load_with(path, &LoaderOptions::default())
    }

    /// Load a document from disk
    pub fn load_with<P: AsRef<Path>>(path: P, options: &LoaderOptions) -> XliffResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| XliffError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            XliffError::not_well_formed(path.display().to_string(), format!("invalid UTF-8: {}", e))
        })?;
        Self::from_xml_str(&text, path, options)
    }

    /// Build a document from XML text; `path` becomes the default write target
    pub fn from_xml_str(text: &str, path: impl Into<PathBuf>, options: &LoaderOptions) -> XliffResult<Self> {
        let path = path.into();
        let origin = path.display().to_string();
        let dom = Dom::parse(text, &origin)?;
        let walker = TreeWalker::new(&dom, options);

        let file_nodes = walker.files();
        let (source_language, target_language) = walker
            .declared_languages(&file_nodes)
            .ok_or_else(|| XliffError::MissingDeclaration(origin.clone()))?;
        for code in [&source_language, &target_language] {
            if language_utils::validate_language_code(language_utils::primary_subtag(code)).is_err() {
                warn!("Unrecognised language code '{}' in {}", code, origin);
            }
        }

        let files: Vec<FileUnit> = file_nodes.iter().map(|&file| walker.build_file(file)).collect();
        let index = walker.build_index();
        for duplicate in index.duplicates() {
            warn!("Duplicate marker in {}: {}; only the first one is addressable", origin, duplicate);
        }

        let document = Document {
            path,
            dom,
            index,
            options: options.clone(),
            source_language,
            target_language,
            files,
        };
        debug!(
            "Loaded {} ({} -> {}): {} file(s), {} unit(s)",
            origin,
            document.source_language,
            document.target_language,
            document.files.len(),
            document.trans_unit_count()
        );
        Ok(document)
    }
}

/// Rebuild the write-back index of a (possibly patched) tree
pub(crate) fn build_index(dom: &Dom, options: &LoaderOptions) -> NodeIndex {
    TreeWalker::new(dom, options).build_index()
}

/// Read-only navigation over the XLIFF structure of a tree
struct TreeWalker<'a> {
    dom: &'a Dom,
    options: &'a LoaderOptions,
}

impl<'a> TreeWalker<'a> {
    fn new(dom: &'a Dom, options: &'a LoaderOptions) -> Self {
        Self { dom, options }
    }

    fn is_xliff(&self, id: NodeId, local_name: &str) -> bool {
        self.dom.element(id).is_some_and(|element| {
            element.local_name() == local_name
                && match element.namespace.as_deref() {
                    Some(namespace) => namespace == XLIFF_NAMESPACE,
                    None => self.options.accept_unqualified,
                }
        })
    }

    fn is_sdl(&self, id: NodeId, local_name: &str) -> bool {
        self.dom.element(id).is_some_and(|element| {
            element.local_name() == local_name && element.namespace.as_deref() == Some(SDL_NAMESPACE)
        })
    }

    fn child(&self, parent: NodeId, local_name: &str) -> Option<NodeId> {
        self.dom
            .child_elements(parent)
            .find(|&child| self.is_xliff(child, local_name))
    }

    fn files(&self) -> Vec<NodeId> {
        match self.dom.root_element() {
            Some(root) => self
                .dom
                .child_elements(root)
                .filter(|&child| self.is_xliff(child, "file"))
                .collect(),
            None => Vec::new(),
        }
    }

    fn declared_languages(&self, files: &[NodeId]) -> Option<(String, String)> {
        files.iter().find_map(|&file| {
            let source = self.dom.attribute(file, "source-language")?;
            let target = self.dom.attribute(file, "target-language")?;
            Some((source.to_string(), target.to_string()))
        })
    }

    /// Units anywhere below the file's `body`, through any `group` nesting
    fn units(&self, file: NodeId) -> Vec<NodeId> {
        self.dom
            .child_elements(file)
            .filter(|&child| self.is_xliff(child, "body"))
            .flat_map(|body| self.dom.descendant_elements(body))
            .filter(|&node| self.is_xliff(node, "trans-unit"))
            .collect()
    }

    /// Segment markers below `container`; markers nested in a marker travel
    /// inside its payload
    fn markers(&self, container: NodeId) -> Vec<NodeId> {
        self.outermost(container, |id| {
            self.is_xliff(id, "mrk") && self.dom.attribute(id, "mid").is_some()
        })
    }

    /// Placeholders below `marker`; nested placeholders travel inside their
    /// parent's payload
    fn placeholders(&self, marker: NodeId) -> Vec<NodeId> {
        self.outermost(marker, |id| self.is_xliff(id, "g"))
    }

    /// Children of a marker whose content is nothing but placeholders; empty
    /// when the marker holds any text or other markup
    fn placeholder_run(&self, marker: NodeId) -> Vec<NodeId> {
        let children = self.dom.children(marker);
        if children.iter().all(|&child| self.is_xliff(child, "g")) {
            children.to_vec()
        } else {
            Vec::new()
        }
    }

    fn outermost(&self, root: NodeId, matches: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.dom.child_elements(root).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            if matches(current) {
                found.push(current);
            } else {
                let mut children: Vec<NodeId> = self.dom.child_elements(current).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        found
    }

    fn original(&self, file: NodeId) -> String {
        self.dom.attribute(file, "original").unwrap_or_default().to_string()
    }

    fn unit_id(&self, unit: NodeId) -> String {
        self.dom.attribute(unit, "id").unwrap_or_default().to_string()
    }

    fn build_file(&self, file: NodeId) -> FileUnit {
        let mut file_unit = FileUnit::new(self.original(file));
        if file_unit.original.is_empty() {
            warn!("File element without an 'original' attribute");
        }
        file_unit.trans_units = self
            .units(file)
            .into_iter()
            .map(|unit| self.build_unit(&file_unit.original, unit))
            .collect();
        debug!("File '{}': {} unit(s)", file_unit.original, file_unit.trans_units.len());
        file_unit
    }

    fn build_unit(&self, original: &str, unit: NodeId) -> TranslationUnit {
        let source_markup = self
            .child(unit, "source")
            .map(|source| self.dom.inner_markup(source))
            .unwrap_or_default();
        let mut trans_unit = TranslationUnit::new(self.unit_id(unit), markup::strip_all_tags(&source_markup));
        trans_unit.segment_definitions = self.segment_definitions(unit);

        if trans_unit.only_tag() {
            debug!("Unit '{}' in '{}' carries inline codes only", trans_unit.id, original);
            return trans_unit;
        }

        trans_unit.seg_source_fragments = self.fragments(original, &trans_unit.id, unit, "seg-source");
        trans_unit.target_fragments = self.fragments(original, &trans_unit.id, unit, "target");
        trans_unit
    }

    fn fragments(&self, original: &str, unit_id: &str, unit: NodeId, container: &str) -> Vec<SegmentFragment> {
        match self.child(unit, container) {
            Some(node) => self
                .markers(node)
                .into_iter()
                .map(|marker| self.fragment(marker))
                .collect(),
            None => {
                warn!("Unit '{}' in '{}' has no <{}>; nothing to inject", unit_id, original, container);
                Vec::new()
            }
        }
    }

    fn fragment(&self, marker: NodeId) -> SegmentFragment {
        let mid = self.dom.attribute(marker, "mid").unwrap_or_default();
        let tail = self.dom.tail(marker).unwrap_or_default();
        let placeholders = self.placeholder_run(marker);

        if placeholders.is_empty() {
            return SegmentFragment::text(mid, self.dom.inner_markup(marker), tail);
        }

        let placeholders = placeholders
            .into_iter()
            .map(|g| {
                PlaceholderFragment::new(
                    self.dom.attribute(g, "id").unwrap_or_default(),
                    self.dom.attribute(g, "xid").map(str::to_string),
                    self.dom.inner_markup(g),
                )
            })
            .collect();
        SegmentFragment::placeholders(mid, placeholders, tail)
    }

    fn segment_definitions(&self, unit: NodeId) -> Vec<SegmentDefinition> {
        self.dom
            .child_elements(unit)
            .filter(|&child| self.is_sdl(child, "seg-defs"))
            .flat_map(|defs| self.dom.child_elements(defs))
            .filter(|&seg| self.is_sdl(seg, "seg"))
            .map(|seg| SegmentDefinition {
                id: self.dom.attribute(seg, "id").unwrap_or_default().to_string(),
                conf: self.dom.attribute(seg, "conf").map(str::to_string),
                origin: self.dom.attribute(seg, "origin").map(str::to_string),
                origin_system: self.dom.attribute(seg, "origin-system").map(str::to_string),
                locked: self.dom.attribute(seg, "locked") == Some("true"),
            })
            .collect()
    }

    /// Register every target marker and its placeholders
    fn build_index(&self) -> NodeIndex {
        let mut index = NodeIndex::new();
        for file in self.files() {
            let original = self.original(file);
            for unit in self.units(file) {
                let Some(target) = self.child(unit, "target") else {
                    continue;
                };
                let unit_id = self.unit_id(unit);
                for marker in self.markers(target) {
                    let mid = self.dom.attribute(marker, "mid").unwrap_or_default();
                    let address = NodeAddress::marker(original.as_str(), unit_id.as_str(), mid);
                    for g in self.placeholders(marker) {
                        let id = self.dom.attribute(g, "id").unwrap_or_default();
                        index.insert(address.with_placeholder(id), g);
                    }
                    index.insert(address, marker);
                }
            }
        }
        index
    }
}
