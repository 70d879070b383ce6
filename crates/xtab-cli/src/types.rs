use std::path::PathBuf;

use xtab_model::{Layout, TableError};
use xtab_taxonomy::VerifySummary;

/// Outcome of rendering one table of a package.
#[derive(Debug)]
pub struct TableOutcome {
    pub table_id: String,
    pub table_code: Option<String>,
    pub layout: Result<Layout, TableError>,
}

#[derive(Debug)]
pub struct RenderResult {
    pub package_dir: PathBuf,
    pub verify: VerifySummary,
    pub tables: Vec<TableOutcome>,
}

impl RenderResult {
    pub fn layouts(&self) -> impl Iterator<Item = &Layout> {
        self.tables
            .iter()
            .filter_map(|outcome| outcome.layout.as_ref().ok())
    }

    pub fn failed_count(&self) -> usize {
        self.tables
            .iter()
            .filter(|outcome| outcome.layout.is_err())
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.failed_count() > 0
    }
}
