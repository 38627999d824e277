//! Feature-name list files (one name per line).
//!
//! `hpp features` writes them; serving reads one back as the column layout
//! of a pre-encoded model that does not record its own.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::AppError;

pub fn write_feature_list(path: &Path, names: &[String]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create feature list '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    for name in names {
        writeln!(writer, "{name}")
            .map_err(|e| AppError::io(format!("Failed to write feature list: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to write feature list: {e}")))?;

    Ok(())
}

/// Read a feature list, skipping blank lines.
pub fn read_feature_list(path: &Path) -> Result<Vec<String>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open feature list '{}': {e}", path.display())))?;

    let mut names = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| AppError::io(format!("Failed to read feature list: {e}")))?;
        if !line.trim().is_empty() {
            names.push(line);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_name_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.txt");
        write_feature_list(&path, &["Region".to_string(), "District_BA ĐÌNH".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Region\nDistrict_BA ĐÌNH\n");
    }

    #[test]
    fn reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.txt");
        let names = vec!["No_floor".to_string(), "Ward_NGHĨA ĐÔ".to_string()];
        write_feature_list(&path, &names).unwrap();
        std::fs::write(&path, format!("{}\n\n", std::fs::read_to_string(&path).unwrap())).unwrap();
        assert_eq!(read_feature_list(&path).unwrap(), names);
    }

    #[test]
    fn missing_list_is_an_io_error() {
        let err = read_feature_list(Path::new("nowhere/features.txt")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
