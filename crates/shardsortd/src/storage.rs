//! Record file I/O.
//!
//! Input and output are raw record files: 100-byte frames back-to-back,
//! no delimiters. A trailing partial frame in the input is discarded.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zerocopy::AsBytes;

use shardsort_core::{Record, RECORD_LEN};

/// Read a node's local input shard.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;

    let mut records = Vec::with_capacity(bytes.len() / RECORD_LEN);
    let mut frames = bytes.chunks_exact(RECORD_LEN);
    for frame in &mut frames {
        let mut record = [0u8; RECORD_LEN];
        record.copy_from_slice(frame);
        records.push(Record::new(record));
    }
    if !frames.remainder().is_empty() {
        tracing::debug!(
            path = %path.display(),
            bytes = frames.remainder().len(),
            "dropping trailing partial record"
        );
    }
    Ok(records)
}

/// Write the node's final sorted shard.
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writer
            .write_all(record.as_bytes())
            .with_context(|| format!("failed to write output file {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush output file {}", path.display()))?;
    Ok(())
}
