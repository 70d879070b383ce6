#![deny(unsafe_code)]

use tracing::{info_span, warn};
use xtab_compile::{RenderOptions, balance, build_headers, compile};
use xtab_model::{Layout, TableDefinition, TableError};
use xtab_taxonomy::TaxonomyIndex;

use crate::generator::lay_out;

/// Compiles, balances, builds headers for and lays out one table.
pub fn render_table(
    table: &TableDefinition,
    taxonomy: &TaxonomyIndex,
    options: &RenderOptions,
) -> Result<Layout, TableError> {
    let span = info_span!("render_table", table = %table.id);
    let _guard = span.enter();

    let mut compiled = compile(table, taxonomy);
    balance(&mut compiled);
    let headers = build_headers(&mut compiled, options)?;
    Ok(lay_out(&compiled, &headers, taxonomy))
}

/// Renders each table independently. A failing table does not stop the
/// others.
pub fn render_tables<'a>(
    tables: &'a [TableDefinition],
    taxonomy: &TaxonomyIndex,
    options: &RenderOptions,
) -> Vec<(&'a str, Result<Layout, TableError>)> {
    tables
        .iter()
        .map(|table| {
            let result = render_table(table, taxonomy, options);
            if let Err(err) = &result {
                warn!(table = %table.id, error = %err, "table not rendered");
            }
            (table.id.as_str(), result)
        })
        .collect()
}
