// ============================================================
// Layer 6 — Attention Export
// ============================================================
// Writes an AttentionMap as a plain numeric matrix:
//   - one line per row
//   - values separated by ","
//   - every value in fixed notation with 6 decimals
//
// Example (attn_k for a 3-field dataset):
//   0.412000,0.288000,0.300000
//   0.101233,0.700100,0.198667

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::domain::attention::AttentionMap;

pub fn write_attention_csv(path: impl AsRef<Path>, map: &AttentionMap) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Cannot create attention export '{}'", path.display()))?;
    let mut w = BufWriter::new(file);

    for r in 0..map.rows() {
        let line = map
            .row(r)
            .iter()
            .map(|v| format!("{v:.6}"))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(w, "{line}")?;
    }
    w.flush()
        .with_context(|| format!("Cannot write attention export '{}'", path.display()))?;

    tracing::debug!("Exported {}x{} attention map to '{}'", map.rows(), map.cols, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_format() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.csv");
        let map = AttentionMap::new(2, vec![0.5, 0.25, 1.0, 0.0]);
        write_attention_csv(&path, &map).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "0.500000,0.250000\n1.000000,0.000000\n"
        );
    }

    #[test]
    fn test_empty_map_writes_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.csv");
        write_attention_csv(&path, &AttentionMap::empty(4)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
