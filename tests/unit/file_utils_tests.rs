/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use sdlxliff::file_utils::FileManager;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that dir_exists distinguishes directories
#[test]
fn test_dir_exists_withExistingDir_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::dir_exists(temp_dir.path().join("missing")));
    Ok(())
}

#[test]
fn test_generate_output_path_withSuffix_shouldInsertBeforeExtension() {
    let output_path = FileManager::generate_output_path(Path::new("/tmp/docs/intro.sdlxliff"), "fr");
    assert_eq!(output_path, Path::new("/tmp/docs/intro.fr.sdlxliff"));
}

#[test]
fn test_generate_output_path_withEmptySuffix_shouldReturnInput() {
    let input = Path::new("/tmp/docs/intro.sdlxliff");
    assert_eq!(FileManager::generate_output_path(input, ""), input);
}

#[test]
fn test_generate_output_path_withoutExtension_shouldUseDocumentExtension() {
    let output_path = FileManager::generate_output_path(Path::new("/tmp/docs/intro"), "out");
    assert_eq!(output_path, Path::new("/tmp/docs/intro.out.sdlxliff"));
}

#[test]
fn test_generate_sheet_path_withDocument_shouldSwapExtension() {
    let sheet = FileManager::generate_sheet_path(Path::new("/tmp/docs/intro.sdlxliff"));
    assert_eq!(sheet, Path::new("/tmp/docs/intro.json"));
}

/// Test that find_files walks nested directories and sorts results
#[test]
fn test_find_documents_withNestedDirectories_shouldFindSortedDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested)?;

    common::create_test_file(temp_dir.path(), "b.sdlxliff", "")?;
    common::create_test_file(temp_dir.path(), "a.SDLXLIFF", "")?;
    common::create_test_file(&nested, "c.sdlxliff", "")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "")?;

    let documents = FileManager::find_documents(temp_dir.path())?;
    let names: Vec<String> = documents
        .iter()
        .map(|path| path.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.SDLXLIFF", "b.sdlxliff", "nested/c.sdlxliff"]);
    Ok(())
}

#[test]
fn test_find_files_withDottedExtension_shouldMatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "sheet.json", "{}")?;

    let files = FileManager::find_files(temp_dir.path(), ".json")?;

    assert_eq!(files.len(), 1);
    Ok(())
}
