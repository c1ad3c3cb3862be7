/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use subnotes::file_utils::FileManager;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.tmp")));
    Ok(())
}

/// Test that subtitle discovery is non-recursive, case-insensitive and sorted
#[test]
fn test_find_files_withMixedEntries_shouldReturnSortedTopLevelMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "b.srt", "")?;
    common::create_test_file(dir, "a.SRT", "")?;
    common::create_test_file(dir, "c.txt", "")?;
    fs::create_dir(dir.join("nested"))?;
    common::create_test_file(&dir.join("nested"), "d.srt", "")?;

    let files = FileManager::find_files(dir, "srt")?;
    let names: Vec<_> = files
        .iter()
        .filter_map(|f| f.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["a.SRT".to_string(), "b.srt".to_string()]);
    Ok(())
}

/// Test that a missing directory is reported as an error
#[test]
fn test_find_files_withMissingDir_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(FileManager::find_files(temp_dir.path().join("absent"), "srt").is_err());
    Ok(())
}

/// Test the derived season table and chart paths
#[test]
fn test_output_paths_shouldFollowFolderName() {
    let table = FileManager::season_table_path(Path::new("extracted_srt/Season 1"));
    assert_eq!(table, PathBuf::from("extracted_srt/Season 1/Season 1_notes.xlsx"));
    assert_eq!(
        FileManager::chart_path_for(&table),
        PathBuf::from("extracted_srt/Season 1/Season 1_notes.png")
    );
}

/// Test that ensure_parent_dir creates missing directories
#[test]
fn test_ensure_parent_dir_withNestedPath_shouldCreateDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = temp_dir.path().join("a/b/c.xlsx");

    FileManager::ensure_parent_dir(&target)?;
    assert!(FileManager::dir_exists(temp_dir.path().join("a/b")));
    Ok(())
}
