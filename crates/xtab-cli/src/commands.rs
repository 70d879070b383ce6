use std::fs;
use std::path::Path;
use std::slice;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};
use xtab_layout::{DpmMap, RenderOptions, export, render_table, render_tables};
use xtab_model::TableDefinition;
use xtab_taxonomy::{TaxonomyPackage, VerifySummary};

use crate::types::{RenderResult, TableOutcome};

pub fn load_package(package_dir: &Path) -> Result<(TaxonomyPackage, VerifySummary)> {
    TaxonomyPackage::verify_and_load(package_dir)
        .with_context(|| format!("load taxonomy package {}", package_dir.display()))
}

pub fn run_verify(package_dir: &Path) -> Result<VerifySummary> {
    let span = info_span!("verify", package = %package_dir.display());
    let _guard = span.enter();
    let (_, summary) = load_package(package_dir)?;
    Ok(summary)
}

/// Renders one table, or every table of the package when `table_id` is
/// `None`. Per-table failures are reported in the result, not as an error.
pub fn run_render(
    package_dir: &Path,
    table_id: Option<&str>,
    options: &RenderOptions,
) -> Result<RenderResult> {
    let span = info_span!("render", package = %package_dir.display());
    let _guard = span.enter();
    let (package, verify) = load_package(package_dir)?;

    let tables: &[TableDefinition] = match table_id {
        Some(id) => slice::from_ref(find_table(&package, id)?),
        None => &package.tables,
    };

    let tables: Vec<TableOutcome> = render_tables(tables, &package.index, options)
        .into_iter()
        .zip(tables)
        .map(|((table_id, layout), table)| TableOutcome {
            table_id: table_id.to_string(),
            table_code: table.code.clone(),
            layout,
        })
        .collect();

    let result = RenderResult {
        package_dir: package_dir.to_path_buf(),
        verify,
        tables,
    };
    info!(
        tables = result.tables.len(),
        failed = result.failed_count(),
        "render complete"
    );
    Ok(result)
}

pub fn run_dpm(package_dir: &Path, table_id: &str, options: &RenderOptions) -> Result<DpmMap> {
    let span = info_span!("dpm", package = %package_dir.display(), table = %table_id);
    let _guard = span.enter();
    let (package, _) = load_package(package_dir)?;
    let table = find_table(&package, table_id)?;
    let layout = render_table(table, &package.index, options)
        .with_context(|| format!("render table {table_id}"))?;
    let map = export(&layout, &package.index);
    info!(entries = map.len(), "dpm map exported");
    Ok(map)
}

/// Writes `map` as pretty JSON to `output`, or to stdout when `None`.
pub fn write_dpm(map: &DpmMap, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(map).context("serialize dpm map")?;
    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "dpm map written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn find_table<'a>(package: &'a TaxonomyPackage, id: &str) -> Result<&'a TableDefinition> {
    package
        .table(id)
        .ok_or_else(|| anyhow!("table {id} not found in package {}", package.manifest.package.name))
}
