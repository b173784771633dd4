//! Sheet files: one cell invocation per line, `FUNCTION,arg,arg`.
//!
//! Each line is read as one CSV record: fields may be double-quoted to carry
//! commas, `""` inside quotes is a literal quote, and surrounding whitespace
//! is trimmed. Blank lines and lines starting with `#` are skipped.

use std::fmt;

/// One cell invocation parsed from a sheet file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// 1-based line number in the source file.
    pub line: usize,
    pub source: String,
    pub function: String,
    pub args: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("line {line}: {source}")]
    Csv { line: usize, source: csv::Error },
    #[error("line {line}: missing function name")]
    MissingFunction { line: usize },
}

/// Parse a whole sheet.
///
/// # Errors
/// Returns the first malformed line.
pub fn parse(input: &str) -> Result<Vec<Cell>, SheetError> {
    let mut cells = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let source = raw.trim();
        if source.is_empty() || source.starts_with('#') {
            continue;
        }

        let mut fields = read_fields(source)
            .map_err(|source| SheetError::Csv { line, source })?
            .into_iter();
        let function = fields.next().unwrap_or_default();
        if function.is_empty() {
            return Err(SheetError::MissingFunction { line });
        }
        cells.push(Cell {
            line,
            source: source.to_owned(),
            function,
            args: fields.collect(),
        });
    }
    Ok(cells)
}

fn read_fields(line: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record.iter().map(str::to_owned).collect())
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
