//! Upload of computed chart bundles to S3 for the static dashboard.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use rand::Rng;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::charts::{compute_heatmap, compute_trends, compute_ventilation};
use crate::config::PollutantCatalog;
use crate::processing::types::{ChartIndex, ChartIndexEntry, RawRow};

/// Object key of one chart bundle.
pub fn chart_key(prefix: &str, pollutant: &str, chart: &str, gzip: bool) -> String {
    let prefix = prefix.trim_end_matches('/');
    let suffix = if gzip { ".gz" } else { "" };
    if prefix.is_empty() {
        format!("{pollutant}/{chart}.json{suffix}")
    } else {
        format!("{prefix}/{pollutant}/{chart}.json{suffix}")
    }
}

/// Serializes `value` to JSON, optionally gzip-compressed.
pub fn encode_json(value: &impl Serialize, gzip: bool) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(value)?;
    if !gzip {
        return Ok(body);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&body)?;
    Ok(encoder.finish()?)
}

/// Serializes a value to JSON and uploads it with `application/json` content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
    gzip: bool,
) -> Result<()> {
    let body = encode_json(value, gzip)?;

    let mut request = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type("application/json");
    if gzip {
        request = request.content_encoding("gzip");
    }
    request.send().await?;

    Ok(())
}

/// Computes every chart for every pollutant and uploads them plus an index.
#[tracing::instrument(skip(client, rows, catalog, rng), fields(bucket, prefix, gzip))]
pub async fn publish_all<R: Rng>(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: &str,
    rows: &[RawRow],
    catalog: &PollutantCatalog,
    rng: &mut R,
    gzip: bool,
) -> Result<()> {
    let mut entries = Vec::new();

    for config in catalog.iter() {
        let key = &config.key;
        let mut charts = Vec::new();

        if config.external_column.is_some() {
            let trends = compute_trends(rows, config);
            write_json_to_s3(client, bucket, &chart_key(prefix, key, "trends", gzip), &trends, gzip)
                .await?;
            charts.push("trends".to_string());
        }

        let ventilation = compute_ventilation(rows, config, rng);
        write_json_to_s3(
            client,
            bucket,
            &chart_key(prefix, key, "ventilation", gzip),
            &ventilation,
            gzip,
        )
        .await?;
        charts.push("ventilation".to_string());

        let heatmap = compute_heatmap(rows, config);
        write_json_to_s3(client, bucket, &chart_key(prefix, key, "patterns", gzip), &heatmap, gzip)
            .await?;
        charts.push("patterns".to_string());

        info!(pollutant = %key, charts = charts.len(), "Published pollutant charts");
        entries.push(ChartIndexEntry {
            pollutant: key.clone(),
            title: config.title.clone(),
            charts,
        });
    }

    let index = ChartIndex {
        generated_at: chrono::Utc::now(),
        pollutants: entries,
    };
    let index_key = match prefix.trim_end_matches('/') {
        "" => "index.json".to_string(),
        p => format!("{p}/index.json"),
    };
    write_json_to_s3(client, bucket, &index_key, &index, false).await?;

    info!(pollutants = index.pollutants.len(), "Chart index published");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_chart_key() {
        assert_eq!(chart_key("charts", "pm25", "trends", false), "charts/pm25/trends.json");
        assert_eq!(chart_key("charts/", "no2", "patterns", true), "charts/no2/patterns.json.gz");
        assert_eq!(chart_key("", "pm10", "ventilation", false), "pm10/ventilation.json");
    }

    #[test]
    fn test_encode_json_gzip() {
        let value = serde_json::json!({ "cells": [1, 2, 3] });
        let plain = encode_json(&value, false).unwrap();
        let packed = encode_json(&value, true).unwrap();

        let mut decoded = Vec::new();
        GzDecoder::new(packed.as_slice()).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, plain);
    }
}
