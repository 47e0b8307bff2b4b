//! Pulling plot data out of raw result files.
//!
//! Result files are tab-separated, tagged text lines such as
//! `LATENCYFRACTION\t<run>\t<x>\t<y>`. Extraction keeps the lines carrying a
//! tag and writes columns 3 and 4 into a two-column data file.

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Tag of complementary-CDF latency rows.
pub const LATENCY_TAG: &str = "LATENCYFRACTION";

/// Tag of throughput rows.
pub const THROUGHPUT_TAG: &str = "THROUGHPUT";

const FIELD_DELIMITER: char = '\t';

// 1-based columns, as `cut -f 3,4`
const X_FIELD: usize = 3;
const Y_FIELD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Turns a raw result file into a data file a renderer can plot.
pub trait Extract {
    fn extract(&self, source: &Path, tag: &str, dest: &Path, mode: WriteMode) -> Result<()>;
}

/// Native line filter and column cutter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagExtractor;

impl Extract for TagExtractor {
    fn extract(&self, source: &Path, tag: &str, dest: &Path, mode: WriteMode) -> Result<()> {
        let failed = |e: std::io::Error| Error::Extraction {
            path: source.to_path_buf(),
            tag: tag.to_string(),
            reason: e.to_string(),
        };

        let input = BufReader::new(File::open(source).map_err(failed)?);
        let output = match mode {
            WriteMode::Truncate => File::create(dest),
            WriteMode::Append => OpenOptions::new().create(true).append(true).open(dest),
        }
        .map_err(failed)?;
        let mut output = BufWriter::new(output);

        let mut rows = 0;
        for line in input.lines() {
            let line = line.map_err(failed)?;
            if !line.contains(tag) {
                continue;
            }
            writeln!(output, "{}", cut_columns(&line)).map_err(failed)?;
            rows += 1;
        }
        output.flush().map_err(failed)?;

        tracing::trace!(
            "extracted {} {} rows from {} into {}",
            rows,
            tag,
            source.display(),
            dest.display()
        );

        Ok(())
    }
}

/// Fields 3 and 4 of a tab-separated line. Lines without any tab pass
/// through unchanged; missing fields are omitted.
fn cut_columns(line: &str) -> String {
    if !line.contains(FIELD_DELIMITER) {
        return line.to_string();
    }
    line.split(FIELD_DELIMITER)
        .enumerate()
        .filter(|(i, _)| *i + 1 == X_FIELD || *i + 1 == Y_FIELD)
        .map(|(_, field)| field)
        .collect::<Vec<_>>()
        .join("\t")
}
