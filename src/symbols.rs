use std::path::Path;

use crate::error::AppError;

/// Symbols offered in the selector, loaded once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolCatalog {
    symbols: Vec<String>,
}

impl SymbolCatalog {
    /// Read the `symbol` column of a CSV file. Blank cells are skipped and
    /// duplicates keep their first position.
    pub fn load_csv(path: &Path) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        let col = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("symbol"))
            .ok_or_else(|| {
                AppError::Catalog(format!("{} has no 'symbol' column", path.display()))
            })?;

        let mut catalog = Self::default();
        for record in reader.records() {
            let record = record?;
            if let Some(cell) = record.get(col) {
                catalog.push(cell);
            }
        }
        tracing::info!(path = %path.display(), count = catalog.len(), "Loaded symbol catalog");
        Ok(catalog)
    }

    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for s in symbols {
            catalog.push(s.as_ref());
        }
        catalog
    }

    fn push(&mut self, raw: &str) {
        let s = raw.trim().to_ascii_uppercase();
        if !s.is_empty() && !self.symbols.iter().any(|v| v == &s) {
            self.symbols.push(s);
        }
    }

    /// Make sure `symbol` is selectable, keeping it at the front when added.
    pub fn ensure(&mut self, symbol: &str) {
        let s = symbol.trim().to_ascii_uppercase();
        if !s.is_empty() && !self.symbols.iter().any(|v| v == &s) {
            self.symbols.insert(0, s);
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s.eq_ignore_ascii_case(symbol))
    }
}
