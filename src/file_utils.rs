use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Sibling output path, e.g. talk.vtt -> <dir>/talk.<suffix>.<extension>
    // @params: input_file, output_dir, suffix (may be empty), extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        if !suffix.is_empty() {
            output_filename.push('.');
            output_filename.push_str(suffix);
        }
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));

        output_dir.as_ref().join(output_filename)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Files directly inside `dir` whose name starts with `prefix` and ends with `suffix`, sorted by name
    pub fn files_matching<P: AsRef<Path>>(dir: P, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut result = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_file() && name.starts_with(prefix) && name.ends_with(suffix) {
                result.push(entry.path().to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Remove every file `files_matching` would return, returning how many were removed
    pub fn remove_matching<P: AsRef<Path>>(dir: P, prefix: &str, suffix: &str) -> Result<usize> {
        let stale = Self::files_matching(dir, prefix, suffix)?;
        for path in &stale {
            fs::remove_file(path).with_context(|| format!("Failed to remove file: {:?}", path))?;
        }
        Ok(stale.len())
    }

    /// Size of a file in bytes, 0 when it does not exist
    pub fn file_size<P: AsRef<Path>>(path: P) -> u64 {
        fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
    }

    /// Read a text file, replacing invalid UTF-8 instead of failing
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
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

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Move a file, falling back to copy and delete across filesystems
    pub fn move_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if fs::rename(from, to).is_ok() {
            return Ok(());
        }

        Self::copy_file(from, to)?;
        fs::remove_file(from).with_context(|| format!("Failed to remove {:?} after copy", from))?;
        Ok(())
    }
}
