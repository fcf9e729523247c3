use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Write rows as CSV with a header line, replacing any existing file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    for row in rows {
        writer.serialize(row).with_context(|| format!("Failed to write row to {:?}", path))?;
    }
    writer.flush().with_context(|| format!("Failed to flush {:?}", path))?;

    info!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CleanProduct, RawProduct};

    #[test]
    fn test_raw_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let rows = vec![RawProduct {
            title: "T-shirt 2".into(),
            price: "$102.15".into(),
            rating: "⭐ 3.9 / 5".into(),
            colors: "3 Colors".into(),
            size: "M".into(),
            gender: "Women".into(),
            timestamp: "2025-01-31T08:15:42.123456".into(),
        }];
        write_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("title,price,rating,colors,size,gender,timestamp"));
        assert_eq!(
            lines.next(),
            Some("T-shirt 2,$102.15,⭐ 3.9 / 5,3 Colors,M,Women,2025-01-31T08:15:42.123456")
        );
    }

    #[test]
    fn test_clean_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("clean.csv");
        let rows = vec![CleanProduct {
            title: "hoodie 3".into(),
            price: 19_208_000.0,
            rating: 4.8,
            colors: 3,
            size: "L".into(),
            gender: "unisex".into(),
        }];
        write_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("title,price,rating,colors,size,gender"));
        assert_eq!(lines.next(), Some("hoodie 3,19208000.0,4.8,3,L,unisex"));
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a file.
        assert!(write_csv::<CleanProduct>(dir.path(), &[]).is_err());
    }
}
