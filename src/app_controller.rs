use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::document::{Document, FragmentContent};
use crate::exchange::{self, TranslationSheet};
use crate::file_utils::FileManager;
use crate::language_utils;

// @module: Application controller for document processing

/// Counts describing one loaded document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub source_language: String,
    pub target_language: String,
    pub files: usize,
    pub units: usize,
    pub tag_only_units: usize,
    pub target_segments: usize,
    pub placeholder_segments: usize,
    pub machine_translated_segments: usize,
}

impl DocumentSummary {
    /// Summarize a loaded document
    pub fn from_document(document: &Document) -> Self {
        let mut summary = Self {
            path: document.path().to_path_buf(),
            source_language: document.source_language.clone(),
            target_language: document.target_language.clone(),
            files: document.files.len(),
            units: document.trans_unit_count(),
            ..Self::default()
        };

        for (_, unit) in document.units() {
            if unit.only_tag() {
                summary.tag_only_units += 1;
            }
            for fragment in &unit.target_fragments {
                summary.target_segments += 1;
                if matches!(fragment.content, FragmentContent::Placeholders(_)) {
                    summary.placeholder_segments += 1;
                }
                if unit
                    .segment_definition(&fragment.mid)
                    .is_some_and(|definition| definition.is_machine_translated())
                {
                    summary.machine_translated_segments += 1;
                }
            }
        }
        summary
    }
}

/// Outcome of processing every document in a folder
#[derive(Debug, Default)]
pub struct FolderReport {
    // @field: Documents processed successfully
    pub processed: usize,
    // @field: Documents that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Documents to process for `input`: the file itself or every document
    /// found below a directory
    pub fn documents_in(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if FileManager::file_exists(input) {
            Ok(vec![input.to_path_buf()])
        } else if FileManager::dir_exists(input) {
            FileManager::find_documents(input)
        } else {
            Err(anyhow!("Input path does not exist: {:?}", input))
        }
    }

    /// Load one document with the configured options
    pub fn load(&self, path: &Path) -> Result<Document> {
        Document::load_with(path, &self.config.loader)
            .with_context(|| format!("Failed to load document: {:?}", path))
    }

    /// Load a document and summarize it
    pub fn inspect(&self, path: &Path) -> Result<DocumentSummary> {
        let document = self.load(path)?;
        let summary = DocumentSummary::from_document(&document);
        info!(
            "{:?}: {} -> {}, {} unit(s), {} target segment(s)",
            path,
            language_utils::describe_language(&summary.source_language),
            language_utils::describe_language(&summary.target_language),
            summary.units,
            summary.target_segments
        );
        Ok(summary)
    }

    /// Export the target segments of a document to a JSON sheet
    pub fn export(&self, input: &Path, sheet_path: Option<&Path>) -> Result<PathBuf> {
        let document = self.load(input)?;
        let sheet = exchange::export_sheet(&document, self.config.exchange.skip_locked);
        let sheet_path = sheet_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::generate_sheet_path(input));

        if sheet_path.exists() && !self.config.output.force_overwrite {
            return Err(anyhow!(
                "Sheet already exists: {:?}. Use -f to force overwrite.",
                sheet_path
            ));
        }

        sheet
            .write_to(&sheet_path)
            .with_context(|| format!("Failed to write sheet: {:?}", sheet_path))?;
        info!("Exported {} segment(s) to {:?}", sheet.entries.len(), sheet_path);
        Ok(sheet_path)
    }

    /// Apply a sheet to a document and write it back.
    ///
    /// Returns the written path, or `None` when the output already exists and
    /// overwriting was not allowed.
    pub fn apply(&self, input: &Path, sheet_path: &Path, output: Option<&Path>) -> Result<Option<PathBuf>> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| FileManager::generate_output_path(input, &self.config.output.suffix));
        if output != input && output.exists() && !self.config.output.force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output);
            return Ok(None);
        }

        let sheet = TranslationSheet::read_from(sheet_path)
            .with_context(|| format!("Failed to read sheet: {:?}", sheet_path))?;
        let mut document = self.load(input)?;

        let changed = exchange::apply_sheet(&mut document, &sheet)
            .with_context(|| format!("Failed to apply sheet {:?} to {:?}", sheet_path, input))?;
        debug!("{} segment(s) changed in {:?}", changed, input);

        let written = document
            .write(Some(&output))
            .with_context(|| format!("Failed to write document: {:?}", output))?;
        Ok(Some(written))
    }

    /// Run `operation` on every document below `input`, continuing past
    /// failures
    pub fn run_folder<F>(&self, input: &Path, mut operation: F) -> Result<FolderReport>
    where
        F: FnMut(&Path) -> Result<()>,
    {
        let documents = self.documents_in(input)?;
        if documents.is_empty() {
            warn!("No .{} files found in {:?}", crate::file_utils::DOCUMENT_EXTENSION, input);
        }

        let mut report = FolderReport::default();
        for path in documents {
            debug!("Processing {:?}", path);
            match operation(&path) {
                Ok(()) => report.processed += 1,
                Err(e) => {
                    error!("Error processing {:?}: {:#}", path, e);
                    report.failed.push((path, format!("{:#}", e)));
                }
            }
        }

        info!(
            "Finished: {} processed, {} failed",
            report.processed,
            report.failed.len()
        );
        Ok(report)
    }
}
