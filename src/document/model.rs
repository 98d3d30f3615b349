/*!
 * In-memory model of a bilingual document.
 *
 * The model is an overlay on the parsed tree: it exposes segment content for
 * reading and editing, while the tree it was built from stays inside the
 * [`Document`] and is patched on write-back.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::document::index::NodeIndex;
use crate::document::loader::LoaderOptions;
use crate::dom::Dom;
use crate::markup;

/// XLIFF 1.2 document namespace
pub const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// Vendor extension namespace
pub const SDL_NAMESPACE: &str = "http://sdl.com/FileTypes/SdlXliff/1.0";

/// Complete bilingual document: parsed tree plus the segment model
#[derive(Debug)]
pub struct Document {
    pub(crate) path: PathBuf,
    pub(crate) dom: Dom,
    pub(crate) index: NodeIndex,
    pub(crate) options: LoaderOptions,

    /// Source language declared on the first `file` element
    pub source_language: String,

    /// Target language declared on the first `file` element
    pub target_language: String,

    /// Declared sub-files in document order
    pub files: Vec<FileUnit>,
}

impl Document {
    /// Path the document was loaded from and is written back to by default
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of translation units across all files
    pub fn trans_unit_count(&self) -> usize {
        self.files.iter().map(|file| file.trans_units.len()).sum()
    }

    /// Iterate over every unit together with its file
    pub fn units(&self) -> impl Iterator<Item = (&FileUnit, &TranslationUnit)> {
        self.files
            .iter()
            .flat_map(|file| file.trans_units.iter().map(move |unit| (file, unit)))
    }

    /// Find a file by its `original` attribute
    pub fn file(&self, original: &str) -> Option<&FileUnit> {
        self.files.iter().find(|file| file.original == original)
    }

    /// Find a unit by file and unit id
    pub fn unit(&self, original: &str, unit_id: &str) -> Option<&TranslationUnit> {
        self.file(original)?.unit(unit_id)
    }

    /// Mutable access to a unit by file and unit id
    pub fn unit_mut(&mut self, original: &str, unit_id: &str) -> Option<&mut TranslationUnit> {
        self.files
            .iter_mut()
            .find(|file| file.original == original)?
            .trans_units
            .iter_mut()
            .find(|unit| unit.id == unit_id)
    }
}

/// One `file` element of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUnit {
    /// Value of the `original` attribute
    pub original: String,

    /// Translation units in document order
    pub trans_units: Vec<TranslationUnit>,
}

impl FileUnit {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            trans_units: Vec::new(),
        }
    }

    pub fn unit(&self, unit_id: &str) -> Option<&TranslationUnit> {
        self.trans_units.iter().find(|unit| unit.id == unit_id)
    }
}

/// One `trans-unit` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Unit id, unique within its file
    pub id: String,

    /// Source content with all markup removed
    pub source_plain: String,

    // @field: Derived from source_plain at construction
    only_tag: bool,

    /// Segment markers of the `seg-source` element
    #[serde(default)]
    pub seg_source_fragments: Vec<SegmentFragment>,

    /// Segment markers of the `target` element
    #[serde(default)]
    pub target_fragments: Vec<SegmentFragment>,

    /// Open extension data; not populated by the loader
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Vendor segment definitions (`sdl:seg-defs/sdl:seg`)
    #[serde(default)]
    pub segment_definitions: Vec<SegmentDefinition>,
}

impl TranslationUnit {
    /// Create a unit, deriving the tag-only flag from the plain source text
    pub fn new(id: impl Into<String>, source_plain: impl Into<String>) -> Self {
        let source_plain = source_plain.into();
        let only_tag = markup::is_tag_only(&source_plain);
        Self {
            id: id.into(),
            source_plain,
            only_tag,
            seg_source_fragments: Vec::new(),
            target_fragments: Vec::new(),
            metadata: BTreeMap::new(),
            segment_definitions: Vec::new(),
        }
    }

    /// True when the source carries inline codes only
    pub fn only_tag(&self) -> bool {
        self.only_tag
    }

    pub fn seg_source_fragment(&self, mid: &str) -> Option<&SegmentFragment> {
        self.seg_source_fragments.iter().find(|fragment| fragment.mid == mid)
    }

    pub fn target_fragment(&self, mid: &str) -> Option<&SegmentFragment> {
        self.target_fragments.iter().find(|fragment| fragment.mid == mid)
    }

    pub fn target_fragment_mut(&mut self, mid: &str) -> Option<&mut SegmentFragment> {
        self.target_fragments.iter_mut().find(|fragment| fragment.mid == mid)
    }

    pub fn segment_definition(&self, mid: &str) -> Option<&SegmentDefinition> {
        self.segment_definitions.iter().find(|definition| definition.id == mid)
    }
}

/// Content of a segment marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FragmentContent {
    /// Raw inner markup of the marker, passed through verbatim on write
    Text(String),

    /// The marker holds only a run of placeholder elements
    Placeholders(Vec<PlaceholderFragment>),
}

/// One `mrk` segment marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentFragment {
    /// Marker id, unique within one unit's content
    pub mid: String,

    pub content: FragmentContent,

    /// Raw markup of the text run after the marker's closing tag; CDATA
    /// sections in the run are kept as written
    #[serde(default)]
    pub tail: String,
}

impl SegmentFragment {
    /// Marker holding raw inner markup
    pub fn text(mid: impl Into<String>, markup: impl Into<String>, tail: impl Into<String>) -> Self {
        Self {
            mid: mid.into(),
            content: FragmentContent::Text(markup.into()),
            tail: tail.into(),
        }
    }

    /// Marker holding a placeholder run
    pub fn placeholders(
        mid: impl Into<String>,
        placeholders: Vec<PlaceholderFragment>,
        tail: impl Into<String>,
    ) -> Self {
        Self {
            mid: mid.into(),
            content: FragmentContent::Placeholders(placeholders),
            tail: tail.into(),
        }
    }

    /// Raw text payload, if this marker carries one
    pub fn markup(&self) -> Option<&str> {
        match &self.content {
            FragmentContent::Text(markup) => Some(markup),
            FragmentContent::Placeholders(_) => None,
        }
    }

    /// Placeholder run, empty for text markers
    pub fn placeholder_fragments(&self) -> &[PlaceholderFragment] {
        match &self.content {
            FragmentContent::Text(_) => &[],
            FragmentContent::Placeholders(placeholders) => placeholders,
        }
    }

    /// Replace the payload with raw markup, used verbatim on write
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.content = FragmentContent::Text(markup.into());
    }

    /// Replace the payload with natural-language text, escaping it
    pub fn set_plain_text(&mut self, text: &str) {
        self.content = FragmentContent::Text(markup::escape_text(text).into_owned());
    }

    /// Natural-language view of the payload
    pub fn plain_text(&self) -> String {
        markup::plain_text(&self.inner_markup())
    }

    /// Editable view of the payload with inline codes as tokens
    pub fn tagged_text(&self) -> markup::TaggedText {
        markup::tag_inline_codes(&self.inner_markup())
    }

    /// Inner markup as it will be written
    pub fn inner_markup(&self) -> String {
        match &self.content {
            FragmentContent::Text(markup) => markup.clone(),
            FragmentContent::Placeholders(placeholders) => placeholders
                .iter()
                .map(PlaceholderFragment::to_markup)
                .collect(),
        }
    }

    /// Replacement element built for write-back
    pub fn to_markup(&self) -> String {
        format!(
            "<mrk mtype=\"seg\" mid=\"{}\">{}</mrk>",
            quick_xml::escape::escape(self.mid.as_str()),
            self.inner_markup()
        )
    }
}

/// One `g` placeholder element inside a marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderFragment {
    /// Placeholder id, local to its marker
    pub id: String,

    /// Cross-reference id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xid: Option<String>,

    /// Raw inner content, copied verbatim
    pub text: String,
}

impl PlaceholderFragment {
    pub fn new(id: impl Into<String>, xid: Option<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            xid,
            text: text.into(),
        }
    }

    /// Replacement element built for write-back
    pub fn to_markup(&self) -> String {
        match &self.xid {
            Some(xid) => format!(
                "<g id=\"{}\" xid=\"{}\">{}</g>",
                quick_xml::escape::escape(self.id.as_str()),
                quick_xml::escape::escape(xid.as_str()),
                self.text
            ),
            None => format!(
                "<g id=\"{}\">{}</g>",
                quick_xml::escape::escape(self.id.as_str()),
                self.text
            ),
        }
    }
}

/// Vendor confirmation and provenance record for one segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDefinition {
    /// Marker id this record belongs to
    pub id: String,

    /// Confirmation level, e.g. `Draft` or `Translated`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<String>,

    /// Where the target came from, e.g. `mt` or `tm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_system: Option<String>,

    #[serde(default)]
    pub locked: bool,
}

impl SegmentDefinition {
    /// Target was produced by machine translation
    pub fn is_machine_translated(&self) -> bool {
        self.origin.as_deref() == Some("mt")
    }
}
