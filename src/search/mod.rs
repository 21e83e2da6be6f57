//! Listed-symbol lookup over the `listed.csv` dataset

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One row of `listed.csv` (`symbol,name,ETF`)
#[derive(Debug, Clone, Deserialize)]
struct ListedRow {
    symbol: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "ETF", default)]
    etf: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListedSymbol {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone)]
struct Entry {
    symbol: String,
    name: String,
    symbol_lower: String,
    name_lower: String,
    is_etf: bool,
}

/// Immutable in-memory index, built once at startup
#[derive(Debug, Clone, Default)]
pub struct ListedIndex {
    entries: Vec<Entry>,
}

impl ListedIndex {
    /// Load the dataset. A missing file yields an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Listed symbols file {:?} not found, search will return nothing", path);
            return Ok(Self::default());
        }
        let reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open listed symbols file {:?}", path))?;
        let index = Self::from_reader(reader)?;
        info!("Loaded {} listed symbols from {:?}", index.len(), path);
        Ok(index)
    }

    pub fn from_csv_str(data: &str) -> Result<Self> {
        Self::from_reader(csv::Reader::from_reader(data.as_bytes()))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut entries = Vec::new();
        for row in reader.deserialize::<ListedRow>() {
            let row = row.context("Malformed listed symbols row")?;
            entries.push(Entry {
                symbol_lower: row.symbol.to_lowercase(),
                name_lower: row.name.to_lowercase(),
                is_etf: row.etf != "N",
                symbol: row.symbol,
                name: row.name,
            });
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on symbol or name.
    ///
    /// ETFs (any `ETF` value other than `N`) are dropped unless `include_etf`.
    /// An exact symbol match sorts first, the rest by symbol.
    pub fn search(&self, query: &str, include_etf: bool) -> Vec<ListedSymbol> {
        let query = query.to_lowercase();
        let mut hits: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.symbol_lower.contains(&query) || e.name_lower.contains(&query))
            .filter(|e| include_etf || !e.is_etf)
            .collect();

        hits.sort_by(|a, b| {
            let a_exact = a.symbol_lower == query;
            let b_exact = b.symbol_lower == query;
            b_exact.cmp(&a_exact).then_with(|| a.symbol.cmp(&b.symbol))
        });

        hits.into_iter()
            .map(|e| ListedSymbol {
                symbol: e.symbol.clone(),
                name: e.name.clone(),
            })
            .collect()
    }
}
