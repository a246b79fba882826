use anyhow::{Result, Context};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extension of script documents
pub const SCRIPT_EXTENSION: &str = "rpy";

/// Numbered entry of a task list section, `12. chapter1/intro.rpy`
static TASK_ENTRY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s+(.+\.rpy)").unwrap());

/// Prefix shared by every task list section header
const SECTION_MARKER: &str = "=======";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: `<output_dir>/<target_language>/<stem>_translated.rpy`
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
    ) -> PathBuf {
        let stem = Self::file_stem(input_file.as_ref());
        output_dir
            .as_ref()
            .join(target_language)
            .join(format!("{}_translated.{}", stem, SCRIPT_EXTENSION))
    }

    // @generates: `<output_dir>/mappings/<stem>_mapping.txt`
    pub fn generate_mapping_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
    ) -> PathBuf {
        let stem = Self::file_stem(input_file.as_ref());
        output_dir
            .as_ref()
            .join("mappings")
            .join(format!("{}_mapping.txt", stem))
    }

    /// Directory holding session logs
    pub fn log_dir<P: AsRef<Path>>(output_dir: P) -> PathBuf {
        output_dir.as_ref().join("logs")
    }

    fn file_stem(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string())
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Expand input paths into script documents.
    ///
    /// Files are taken as given, directories are walked for `.rpy` files and
    /// missing paths are warned about and dropped.
    pub fn collect_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();
        for input in inputs {
            let input = input.as_ref();
            if Self::dir_exists(input) {
                documents.extend(Self::find_files(input, SCRIPT_EXTENSION)?);
            } else if Self::file_exists(input) {
                documents.push(input.to_path_buf());
            } else {
                warn!("Input not found, skipping: {}", input.display());
            }
        }
        Ok(documents)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Task list assigning documents to runs.
///
/// ```text
/// ======= script: [3] =======
/// 1. chapter1.rpy
/// 2. extras/gallery.rpy
/// ======= script: [4] =======
/// ```
pub struct TaskList;

impl TaskList {
    /// Entries of the section headed `======= script: <pattern> =======`
    pub fn parse(content: &str, pattern: &str) -> Vec<String> {
        let header = format!("{} script: {} {}", SECTION_MARKER, pattern, SECTION_MARKER);
        let Some(start) = content.find(&header) else {
            return Vec::new();
        };

        let after_header = &content[start + header.len()..];
        let section = match after_header.find(SECTION_MARKER) {
            Some(end) => &after_header[..end],
            None => after_header,
        };

        TASK_ENTRY_REGEX
            .captures_iter(section)
            .map(|caps| caps[1].trim().to_string())
            .collect()
    }

    /// Read a task file and resolve the selected entries against its directory
    pub fn load<P: AsRef<Path>>(path: P, pattern: &str) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .with_context(|| format!("Failed to read task list: {:?}", path))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        Ok(Self::parse(&content, pattern)
            .into_iter()
            .map(|entry| base.join(entry))
            .collect())
    }
}
