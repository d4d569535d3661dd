//! Parquet I/O for graph persistence
//!
//! Based on `DuckDB` (Raasveldt et al., SIGMOD 2019) columnar storage patterns.
//!
//! # Format
//!
//! Graphs are stored as two Parquet files:
//! - `{path}_nodes.parquet`: (`node_id`, name) in insertion order, isolated nodes included
//! - `{path}_edges.parquet`: (source, target, weight) keyed by name
//!
//! The directed flag travels as the file-level key/value entry `directed` on the nodes file.

use super::TransactionGraph;
use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const DIRECTED_KEY: &str = "directed";

impl TransactionGraph {
    /// Write graph to Parquet files
    ///
    /// Creates `{path}_nodes.parquet` and `{path}_edges.parquet`. Encoding runs on the
    /// tokio blocking pool.
    ///
    /// # Errors
    ///
    /// Returns error if file I/O fails or Arrow conversion fails
    pub async fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let base_path = path.as_ref().to_path_buf();
        let graph = self.clone();

        tokio::task::spawn_blocking(move || {
            graph.write_nodes_parquet(&base_path)?;
            graph.write_edges_parquet(&base_path)?;
            debug!(path = %base_path.display(), nodes = graph.node_count(), "wrote parquet graph");
            Ok::<_, anyhow::Error>(())
        })
        .await
        .context("Parquet writer task panicked")?
    }

    /// Read graph from Parquet files
    ///
    /// # Errors
    ///
    /// Returns error if files don't exist or Arrow conversion fails
    pub async fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        tokio::task::spawn_blocking(move || {
            let (directed, names) = Self::read_nodes_parquet(&base_path)?;
            let mut graph = Self::new(directed);
            for name in &names {
                graph.add_node(name);
            }

            for (source, target, weight) in Self::read_edges_parquet(&base_path)? {
                graph
                    .add_edge(&source, &target, weight)
                    .with_context(|| format!("Invalid edge {source} -> {target}"))?;
            }
            debug!(path = %base_path.display(), nodes = graph.node_count(), "read parquet graph");
            Ok::<_, anyhow::Error>(graph)
        })
        .await
        .context("Parquet reader task panicked")?
    }

    fn write_nodes_parquet(&self, base_path: &Path) -> Result<()> {
        let nodes_path = sibling(base_path, "nodes");

        #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported yet
        let node_ids: Vec<u32> = (0..self.node_count()).map(|i| i as u32).collect();
        let names: Vec<&str> = self.get_nodes().iter().map(String::as_str).collect();

        let schema = Arc::new(Schema::new(vec![
            Field::new("node_id", DataType::UInt32, false),
            Field::new("name", DataType::Utf8, false),
        ]));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(UInt32Array::from(node_ids)),
                Arc::new(StringArray::from(names)),
            ],
        )
        .context("Failed to create nodes RecordBatch")?;

        let flag = KeyValue::new(DIRECTED_KEY.to_string(), self.is_directed().to_string());
        write_batch(&nodes_path, schema, &batch, Some(vec![flag]))
    }

    fn write_edges_parquet(&self, base_path: &Path) -> Result<()> {
        let edges_path = sibling(base_path, "edges");

        let edges = self.get_edges();
        let sources: Vec<&str> = edges.iter().map(|(s, _, _)| *s).collect();
        let targets: Vec<&str> = edges.iter().map(|(_, t, _)| *t).collect();
        let weights: Vec<f64> = edges.iter().map(|(_, _, w)| *w).collect();

        let schema = Arc::new(Schema::new(vec![
            Field::new("source", DataType::Utf8, false),
            Field::new("target", DataType::Utf8, false),
            Field::new("weight", DataType::Float64, false),
        ]));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(sources)),
                Arc::new(StringArray::from(targets)),
                Arc::new(Float64Array::from(weights)),
            ],
        )
        .context("Failed to create edges RecordBatch")?;

        write_batch(&edges_path, schema, &batch, None)
    }

    fn read_nodes_parquet(base_path: &Path) -> Result<(bool, Vec<String>)> {
        let nodes_path = sibling(base_path, "nodes");
        let file = File::open(&nodes_path)
            .with_context(|| format!("Failed to open {}", nodes_path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let directed = builder
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .and_then(|entries| entries.iter().find(|kv| kv.key == DIRECTED_KEY))
            .and_then(|kv| kv.value.as_deref())
            .map_or(true, |value| value == "true");

        let mut nodes: Vec<(u32, String)> = Vec::new();
        for batch_result in builder.build()? {
            let batch: RecordBatch = batch_result?;

            let node_ids = batch
                .column(0)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid node_id column type")?;

            let names = batch
                .column(1)
                .as_any()
                .downcast_ref::<StringArray>()
                .context("Invalid name column type")?;

            for i in 0..batch.num_rows() {
                nodes.push((node_ids.value(i), names.value(i).to_string()));
            }
        }

        nodes.sort_by_key(|(id, _)| *id);
        Ok((directed, nodes.into_iter().map(|(_, name)| name).collect()))
    }

    fn read_edges_parquet(base_path: &Path) -> Result<Vec<(String, String, f64)>> {
        let edges_path = sibling(base_path, "edges");
        let file = File::open(&edges_path)
            .with_context(|| format!("Failed to open {}", edges_path.display()))?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut edges = Vec::new();
        for batch_result in reader {
            let batch: RecordBatch = batch_result?;

            let sources = batch
                .column(0)
                .as_any()
                .downcast_ref::<StringArray>()
                .context("Invalid source column type")?;

            let targets = batch
                .column(1)
                .as_any()
                .downcast_ref::<StringArray>()
                .context("Invalid target column type")?;

            let weights = batch
                .column(2)
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("Invalid weight column type")?;

            for i in 0..batch.num_rows() {
                edges.push((
                    sources.value(i).to_string(),
                    targets.value(i).to_string(),
                    weights.value(i),
                ));
            }
        }

        Ok(edges)
    }
}

fn sibling(base_path: &Path, kind: &str) -> PathBuf {
    PathBuf::from(format!("{}_{kind}.parquet", base_path.display()))
}

fn write_batch(
    path: &Path,
    schema: Arc<Schema>,
    batch: &RecordBatch,
    metadata: Option<Vec<KeyValue>>,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::ZSTD(
            parquet::basic::ZstdLevel::try_new(3)?,
        ))
        .set_key_value_metadata(metadata)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(batch)?;
    writer.close()?;

    Ok(())
}
