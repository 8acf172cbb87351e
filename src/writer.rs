use crate::error::{Error, Result};
use crate::record::CandidateRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists candidate records as pretty-printed JSON files.
pub struct RecordWriter {
    output_dir: PathBuf,
}

impl RecordWriter {
    /// Creates a writer targeting the given output directory.
    ///
    /// The directory is created lazily on the first write.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the output path for a record.
    ///
    /// The file is named after the input with its extension replaced by
    /// `.json`.
    #[must_use]
    pub fn output_path(&self, record: &CandidateRecord) -> PathBuf {
        let stem = Path::new(&record.file_name)
            .file_stem()
            .map_or_else(|| record.file_name.clone(), |s| s.to_string_lossy().into_owned());

        self.output_dir.join(format!("{stem}.json"))
    }

    /// Writes a record, overwriting any previous output for the same input.
    ///
    /// Directory creation is idempotent and the write is atomic (temp file
    /// plus rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, serialization
    /// fails, or the file cannot be written.
    pub fn write(&self, record: &CandidateRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;

        let path = self.output_path(record);
        let content = serde_json::to_string_pretty(record)?;

        self.write_file_atomic(&path, &content)?;

        debug!("Wrote candidate record to {}", path.display());
        Ok(path)
    }

    /// Writes a file atomically.
    ///
    /// # Process
    ///
    /// 1. Writes content to a temporary file
    /// 2. Syncs the temporary file to disk
    /// 3. Atomically renames it to the target path
    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::CategoryOutcome;
    use crate::prompt::Category;
    use assert_fs::prelude::*;
    use serde_json::json;

    #[test]
    fn test_writer_creates_output_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let output_dir = temp.child("structured_candidate_data");

        let writer = RecordWriter::new(output_dir.path());
        writer.write(&CandidateRecord::new("alice.pdf")).unwrap();

        assert!(output_dir.exists());
    }

    #[test]
    fn test_output_path_replaces_extension() {
        let writer = RecordWriter::new("/data/out");
        let record = CandidateRecord::new("alice.pdf");

        assert_eq!(
            writer.output_path(&record),
            PathBuf::from("/data/out/alice.json")
        );
    }

    #[test]
    fn test_written_record_round_trips() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = RecordWriter::new(temp.path());

        let mut record = CandidateRecord::new("alice.pdf");
        record.apply(
            Category::Skills,
            CategoryOutcome::Extracted(json!(["Rust", "SQL"])),
        );

        let path = writer.write(&record).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["file_name"], "alice.pdf");
        assert_eq!(value["skills"], json!(["Rust", "SQL"]));
        assert_eq!(value["basic_info"], json!(null));
    }

    #[test]
    fn test_rewrite_replaces_previous_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = RecordWriter::new(temp.path());

        let mut first = CandidateRecord::new("alice.pdf");
        first.apply(
            Category::Skills,
            CategoryOutcome::Extracted(json!(["Old"])),
        );
        writer.write(&first).unwrap();

        let mut second = CandidateRecord::new("alice.pdf");
        second.apply(
            Category::Skills,
            CategoryOutcome::Extracted(json!(["New"])),
        );
        let path = writer.write(&second).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("New"));
        assert!(!content.contains("Old"));
    }

    #[test]
    fn test_non_ascii_written_unescaped() {
        let temp = assert_fs::TempDir::new().unwrap();
        let writer = RecordWriter::new(temp.path());

        let mut record = CandidateRecord::new("müller.pdf");
        record.apply(
            Category::BasicInfo,
            CategoryOutcome::Extracted(json!({"name": "Jürgen Müller"})),
        );

        let path = writer.write(&record).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Jürgen Müller"));
    }
}
