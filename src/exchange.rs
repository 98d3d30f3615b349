/*!
 * Translation sheets: a JSON exchange format for target segments.
 *
 * A sheet lists every editable target segment of a document with its source
 * text. Integrators fill in `target` (by hand, from a translation memory or
 * a machine translation service) and apply the sheet back before writing.
 *
 * Inline codes appear as tokens: `Click <g id="1">here</g> now<x id="2"/>`
 * is exported as `Click {g1>here<g1} now{x2}`. Tokens may move but must all
 * be kept; the raw markup they stand for is restored on apply.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::document::{Document, FragmentContent, NodeAddress};
use crate::errors::{AppError, XliffError, XliffResult};
use crate::language_utils;
use crate::markup;

// @struct: Exported target segments of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSheet {
    // @field: Declared source language
    pub source_language: String,

    // @field: Declared target language
    pub target_language: String,

    // @field: One entry per text segment
    pub entries: Vec<SheetEntry>,
}

// @struct: One addressable target segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub file: String,
    pub unit: String,
    pub mid: String,

    /// Source text of the matching seg-source marker, codes as tokens
    #[serde(default)]
    pub source: String,

    /// Target text with codes as tokens; edited by the caller
    pub target: String,

    /// Provenance recorded in the segment definition, e.g. `mt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl SheetEntry {
    pub fn address(&self) -> NodeAddress {
        NodeAddress::marker(self.file.as_str(), self.unit.as_str(), self.mid.as_str())
    }
}

impl TranslationSheet {
    /// Read a sheet from a JSON file
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the sheet as pretty-printed JSON
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

/// Collect every target segment carrying text.
///
/// Placeholder-only markers are left out since their content is not
/// translatable. Locked segments are skipped when `skip_locked` is set.
pub fn export_sheet(document: &Document, skip_locked: bool) -> TranslationSheet {
    let mut entries = Vec::new();

    for (file, unit) in document.units() {
        for fragment in &unit.target_fragments {
            if !matches!(fragment.content, FragmentContent::Text(_)) {
                continue;
            }
            let definition = unit.segment_definition(&fragment.mid);
            if skip_locked && definition.is_some_and(|d| d.locked) {
                debug!("Skipping locked segment {}/{}/{}", file.original, unit.id, fragment.mid);
                continue;
            }

            entries.push(SheetEntry {
                file: file.original.clone(),
                unit: unit.id.clone(),
                mid: fragment.mid.clone(),
                source: unit
                    .seg_source_fragment(&fragment.mid)
                    .map(|source| source.tagged_text().text)
                    .unwrap_or_default(),
                target: fragment.tagged_text().text,
                origin: definition.and_then(|d| d.origin.clone()),
            });
        }
    }

    TranslationSheet {
        source_language: document.source_language.clone(),
        target_language: document.target_language.clone(),
        entries,
    }
}

/// Set target text from a sheet.
///
/// Every entry is checked before anything changes: unknown addresses,
/// entries pointing at placeholder-only markers, and targets that drop,
/// repeat, invent or cross inline codes are collected and returned together,
/// leaving the document as it was. Returns the number of segments whose
/// markup changed.
pub fn apply_sheet(document: &mut Document, sheet: &TranslationSheet) -> XliffResult<usize> {
    if !language_utils::language_codes_match(&sheet.target_language, &document.target_language) {
        warn!(
            "Sheet target language '{}' differs from document '{}'",
            sheet.target_language, document.target_language
        );
    }

    let mut failures = Vec::new();
    let mut updates = Vec::new();
    for entry in &sheet.entries {
        let address = entry.address();
        let fragment = document
            .unit(&entry.file, &entry.unit)
            .and_then(|unit| unit.target_fragment(&entry.mid));
        let Some(fragment) = fragment else {
            failures.push(XliffError::NodeNotFound(address));
            continue;
        };
        if !matches!(fragment.content, FragmentContent::Text(_)) {
            failures.push(XliffError::StructuralMismatch {
                address,
                reason: "marker holds placeholders only and cannot take text".to_string(),
            });
            continue;
        }

        let exported = fragment.tagged_text();
        if exported.text == entry.target {
            continue;
        }
        match markup::restore_inline_codes(&entry.target, &exported) {
            Ok(markup) => updates.push((entry, markup)),
            Err(error) => failures.push(XliffError::StructuralMismatch {
                address,
                reason: error.to_string(),
            }),
        }
    }
    if !failures.is_empty() {
        return Err(XliffError::WriteFailed(failures));
    }

    let mut changed = 0;
    for (entry, markup) in updates {
        let fragment = document
            .unit_mut(&entry.file, &entry.unit)
            .and_then(|unit| unit.target_fragment_mut(&entry.mid));
        if let Some(fragment) = fragment {
            if fragment.markup() != Some(markup.as_str()) {
                fragment.set_markup(markup);
                changed += 1;
            }
        }
    }
    debug!("Applied sheet: {} of {} segment(s) changed", changed, sheet.entries.len());
    Ok(changed)
}
