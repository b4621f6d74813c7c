//! Parallel dataset generation and JSON-lines output.

use crate::config::DatasetConfig;
use crate::gen::Gen;
use crate::record::{User, UserGenerator};
use anyhow::{Context, Result};
use nested_random::NestedRandom;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

/// Records generated in parallel before each write.
const BATCH_SIZE: usize = 10_000;

/// Node holding the records of a dataset.
pub fn collection_node(config: &DatasetConfig) -> NestedRandom {
    NestedRandom::root(config.seed).key(&config.collection)
}

/// Generate the records in `range` in parallel.
///
/// Record `i` only depends on its own node, so the result is the same as a
/// sequential run regardless of how rayon schedules the work.
fn generate_range(
    gen: &UserGenerator,
    collection: &NestedRandom,
    range: Range<usize>,
) -> Vec<User> {
    range
        .into_par_iter()
        .map(|i| gen.generate(&collection.index(i as i32)))
        .collect()
}

/// Generate every record of the dataset.
pub fn generate_users(config: &DatasetConfig) -> Result<Vec<User>> {
    let gen = UserGenerator::new(config)?;
    let collection = collection_node(config);
    tracing::debug!(node = %collection, count = config.count, "generating users");
    Ok(generate_range(&gen, &collection, 0..config.count))
}

/// Write the dataset as JSON lines, one record per line.
///
/// Returns the number of records written. `progress` is called after each
/// batch with the running count and the total.
pub fn write_jsonl<W: Write>(
    writer: W,
    config: &DatasetConfig,
    progress: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> Result<usize> {
    let gen = UserGenerator::new(config)?;
    let collection = collection_node(config);
    let mut writer = BufWriter::new(writer);

    tracing::info!(
        seed = config.seed,
        count = config.count,
        collection = %config.collection,
        "writing dataset"
    );

    let mut written = 0;
    while written < config.count {
        let end = (written + BATCH_SIZE).min(config.count);
        let batch = generate_range(&gen, &collection, written..end);

        for user in &batch {
            serde_json::to_writer(&mut writer, user)
                .with_context(|| format!("Failed to serialize record {}", written))?;
            writer.write_all(b"\n").context("Failed to write record")?;
            written += 1;
        }
        tracing::debug!(written, "batch written");

        if let Some(progress) = progress {
            progress(written, config.count);
        }
    }

    writer.flush().context("Failed to flush output")?;
    Ok(written)
}

/// Write the dataset to a JSON-lines file, creating parent directories.
pub fn write_jsonl_file(
    path: &Path,
    config: &DatasetConfig,
    progress: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    write_jsonl(file, config, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn small_config() -> DatasetConfig {
        DatasetConfig {
            seed: 21,
            count: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_users_matches_sequential() {
        let config = small_config();
        let users = generate_users(&config).unwrap();
        let gen = UserGenerator::new(&config).unwrap();
        let collection = collection_node(&config);
        let sequential: Vec<User> = collection
            .children()
            .take(config.count)
            .map(|node| gen.generate(&node))
            .collect();
        assert_eq!(users, sequential);
    }

    #[test]
    fn test_oversized_tag_bound_is_an_error() {
        let config = DatasetConfig {
            count: 1,
            max_tags: usize::MAX,
            ..small_config()
        };
        assert!(generate_users(&config).is_err());
        assert!(write_jsonl(Vec::new(), &config, None).is_err());
    }

    #[test]
    fn test_record_independent_of_count() {
        let few = generate_users(&DatasetConfig {
            count: 5,
            ..small_config()
        })
        .unwrap();
        let many = generate_users(&small_config()).unwrap();
        assert_eq!(few[..], many[..5]);
    }

    #[test]
    fn test_write_jsonl_lines_and_progress() {
        let config = DatasetConfig {
            count: BATCH_SIZE + 3,
            ..small_config()
        };
        let calls = AtomicUsize::new(0);
        let progress = |done: usize, total: usize| {
            assert!(done <= total);
            calls.fetch_add(1, Ordering::Relaxed);
        };

        let mut out = Vec::new();
        let written = write_jsonl(&mut out, &config, Some(&progress)).unwrap();
        assert_eq!(written, config.count);
        assert_eq!(calls.load(Ordering::Relaxed), 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), config.count);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert!(first["email"].as_str().unwrap().contains('@'));
    }

    #[test]
    fn test_write_jsonl_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users.jsonl");
        let written = write_jsonl_file(&path, &small_config(), None).unwrap();
        assert_eq!(written, 50);

        let first_run = fs::read_to_string(&path).unwrap();
        write_jsonl_file(&path, &small_config(), None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), first_run);
    }
}
