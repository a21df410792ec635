use crate::error::SourceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRow {
    /// 1-based line in the raw sheet.
    pub line: usize,
    pub cells: Vec<String>,
}

impl CleanRow {
    /// Cell at `col`, or `""` for short rows.
    pub fn get(&self, col: usize) -> &str {
        self.cells.get(col).map(String::as_str).unwrap_or_default()
    }
}

/// A worksheet with its preamble and leading index column removed and its
/// header row promoted to column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanTable {
    pub origin: String,
    pub headers: Vec<String>,
    pub rows: Vec<CleanRow>,
}

impl CleanTable {
    /// Index of the first header matching `name`, ignoring case and
    /// surrounding whitespace.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Result<usize, SourceError> {
        self.find_column(name).ok_or_else(|| SourceError::MissingColumn {
            origin: self.origin.clone(),
            column: name.to_string(),
        })
    }
}

/// Drops the first column and the `header_row` rows above the header, then
/// promotes the next row to column names. Fully blank rows are discarded.
pub fn clean_raw_table(
    origin: &str,
    raw: Vec<Vec<String>>,
    header_row: usize,
) -> Result<CleanTable, SourceError> {
    if raw.len() <= header_row {
        return Err(SourceError::HeaderOutOfRange {
            origin: origin.to_string(),
            header_row,
            rows: raw.len(),
        });
    }

    let mut remaining = raw.into_iter().enumerate().skip(header_row);
    let headers = match remaining.next() {
        Some((_, header)) => header.into_iter().skip(1).map(|h| h.trim().to_string()).collect(),
        None => Vec::new(),
    };

    let rows = remaining
        .filter_map(|(idx, cells)| {
            let cells: Vec<String> = cells.into_iter().skip(1).collect();
            if cells.iter().all(|c| c.trim().is_empty()) {
                return None;
            }
            Some(CleanRow { line: idx + 1, cells })
        })
        .collect();

    Ok(CleanTable {
        origin: origin.to_string(),
        headers,
        rows,
    })
}
