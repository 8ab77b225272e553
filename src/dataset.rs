//! Dataset loading: local file or URL to raw rows.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use tracing::{debug, info, warn};

use crate::fetch::{ApiKey, BasicClient, HttpClient, fetch_bytes};
use crate::processing::types::RawRow;

/// Decodes CSV bytes with a header row into column-to-cell mappings.
///
/// Records that cannot be decoded are skipped with a warning.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(bytes);
    let columns = rdr.headers().context("reading CSV header")?.len();

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in rdr.deserialize::<RawRow>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!(record = line + 1, error = %e, "Skipping undecodable CSV record");
            }
        }
    }

    debug!(columns, rows = rows.len(), skipped, "Parsed dataset");
    Ok(rows)
}

/// Loads the dataset from a local path, or over HTTP when `source` is a URL.
///
/// `token`, when given, is sent as a bearer credential.
#[tracing::instrument(skip(token), fields(source = %source))]
pub async fn load_source(source: &str, token: Option<&str>) -> Result<Vec<RawRow>> {
    let bytes = if source.starts_with("http") {
        let client: Box<dyn HttpClient> = match token {
            Some(token) => Box::new(ApiKey::bearer(BasicClient::new(), token)?),
            None => Box::new(BasicClient::new()),
        };
        fetch_bytes(client.as_ref(), source).await?.to_vec()
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("reading dataset {source}"))?
    };

    let rows = parse_rows(&bytes)?;
    info!(rows = rows.len(), bytes = bytes.len(), "Dataset loaded");
    Ok(rows)
}
