use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::{Trace, TraceSet};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one voltammogram text file. The label is the file name without its
/// extension.
///
/// Supported layouts (detected from the first numeric line):
/// * comma-separated `t,E,I`, no header
/// * whitespace-separated columns, column 2 = E and column 3 = I
///
/// Leading lines that are not numeric (instrument headers) are skipped.
pub fn load_file(path: &Path) -> Result<Trace> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let label = Trace::label_from_path(path);
    parse_trace(&label, &text).with_context(|| format!("parsing {}", path.display()))
}

/// Load several files into one [`TraceSet`], failing on the first bad file.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<TraceSet> {
    let mut set = TraceSet::new();
    for path in paths {
        set.insert(load_file(path.as_ref())?);
    }
    log::info!("Loaded {} traces", set.len());
    Ok(set)
}

/// Column layout of a voltammogram text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    Comma,
    Whitespace,
}

impl TextLayout {
    /// Layout of the first line that splits into a numeric row, so header
    /// lines in the other layout do not decide it.
    pub fn detect(text: &str) -> TextLayout {
        for line in text.lines() {
            if let Some(layout) = Self::of_data_line(line) {
                return layout;
            }
        }
        match text.lines().find(|l| !l.trim().is_empty()) {
            Some(line) if line.contains(',') => TextLayout::Comma,
            _ => TextLayout::Whitespace,
        }
    }

    fn of_data_line(line: &str) -> Option<TextLayout> {
        let comma: Vec<&str> = line.split(',').collect();
        if parse_row(&comma).is_some() {
            return Some(TextLayout::Comma);
        }
        let whitespace: Vec<&str> = line.split_whitespace().collect();
        parse_row(&whitespace).map(|_| TextLayout::Whitespace)
    }
}

/// Parse the contents of a voltammogram file.
pub fn parse_trace(label: &str, text: &str) -> Result<Trace> {
    let mut samples = SampleCollector::default();

    match TextLayout::detect(text) {
        TextLayout::Comma => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(text.as_bytes());

            for result in reader.records() {
                let record = result.context("reading comma-separated row")?;
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                let fields: Vec<&str> = record.iter().collect();
                samples.accept(&fields, line)?;
            }
        }
        TextLayout::Whitespace => {
            for (idx, raw) in text.lines().enumerate() {
                let fields: Vec<&str> = raw.split_whitespace().collect();
                if fields.is_empty() {
                    continue;
                }
                samples.accept(&fields, idx as u64 + 1)?;
            }
        }
    }

    if samples.potential.is_empty() {
        bail!("no samples found");
    }
    Ok(Trace::new(label, samples.potential, samples.current))
}

// ---------------------------------------------------------------------------
// Row handling
// ---------------------------------------------------------------------------

const E_COLUMN: usize = 1;
const I_COLUMN: usize = 2;

#[derive(Default)]
struct SampleCollector {
    potential: Vec<f64>,
    current: Vec<f64>,
}

impl SampleCollector {
    fn accept(&mut self, fields: &[&str], line: u64) -> Result<()> {
        match parse_row(fields) {
            Some((e, i)) => {
                self.potential.push(e);
                self.current.push(i);
                Ok(())
            }
            None if self.potential.is_empty() => {
                log::debug!("Skipping header line {line}: {fields:?}");
                Ok(())
            }
            None => bail!(
                "line {line}: expected numeric E and I in columns 2 and 3, got {fields:?}"
            ),
        }
    }
}

fn parse_row(fields: &[&str]) -> Option<(f64, f64)> {
    let e = fields.get(E_COLUMN)?.trim().parse::<f64>().ok()?;
    let i = fields.get(I_COLUMN)?.trim().parse::<f64>().ok()?;
    Some((e, i))
}
