use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::tokenizer::tokens;

/// Identifier of an indexed document; the path it was read from.
pub type FileId = String;
pub type Count = u64;

/// Term → file → occurrence count, plus the total token count per file.
///
/// Built fresh for every run and passed explicitly to indexing and query
/// functions. Every stored count is at least 1.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, HashMap<FileId, Count>>,
    totals: HashMap<FileId, Count>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Read `path` line by line and add its tokens to the index.
    ///
    /// Indexing a path that is already present adds to the existing term
    /// counts but replaces the file's total with the latest pass. Use
    /// [`InvertedIndex::ensure_indexed`] to index each path at most once.
    pub fn index_file(&mut self, path: &str) -> Result<()> {
        let f = File::open(path).with_context(|| format!("failed to open {path}"))?;
        let reader = BufReader::new(f);
        let added = self
            .index_reader(path, reader)
            .with_context(|| format!("failed to read {path}"))?;
        tracing::debug!(file = path, tokens = added, "indexed file");
        Ok(())
    }

    /// Index every line of `reader` under `file_id`. Returns the number of
    /// tokens read in this pass, which also becomes the file's total.
    pub fn index_reader<R: BufRead>(&mut self, file_id: &str, reader: R) -> Result<Count> {
        let mut total_words: Count = 0;
        for line in reader.lines() {
            let line = line?;
            for token in tokens(&line) {
                *self
                    .postings
                    .entry(token)
                    .or_default()
                    .entry(file_id.to_string())
                    .or_insert(0) += 1;
                total_words += 1;
            }
        }
        // The latest pass replaces the total even though term counts accumulate.
        self.totals.insert(file_id.to_string(), total_words);
        Ok(total_words)
    }

    /// Index `path` unless it was indexed earlier. Returns `true` if the
    /// file was read.
    pub fn ensure_indexed(&mut self, path: &str) -> Result<bool> {
        if self.is_indexed(path) {
            tracing::trace!(file = path, "already indexed");
            return Ok(false);
        }
        self.index_file(path)?;
        Ok(true)
    }

    pub fn is_indexed(&self, file: &str) -> bool {
        self.totals.contains_key(file)
    }

    /// Occurrences of `term` in `file`; 0 when either is unknown.
    pub fn count(&self, term: &str, file: &str) -> Count {
        self.postings
            .get(term)
            .and_then(|files| files.get(file))
            .copied()
            .unwrap_or(0)
    }

    /// Total tokens read from `file`; 0 for files never indexed.
    pub fn total_words(&self, file: &str) -> Count {
        self.totals.get(file).copied().unwrap_or(0)
    }

    /// Number of indexed files containing `term` at least once.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, HashMap::len)
    }

    pub fn file_count(&self) -> usize { self.totals.len() }

    pub fn term_count(&self) -> usize { self.postings.len() }

    /// Every term occurring in `file` with its count, in no particular order.
    pub fn terms_in<'a>(&'a self, file: &'a str) -> impl Iterator<Item = (&'a str, Count)> + 'a {
        self.postings
            .iter()
            .filter_map(move |(term, files)| files.get(file).map(|&c| (term.as_str(), c)))
    }
}
