use anyhow::Result;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::index::{Count, FileId, InvertedIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: Count,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileScore {
    pub file: FileId,
    pub score: f64,
}

/// The `n` most frequent terms of `file`, highest count first. Equal counts
/// are ordered alphabetically. Unknown files yield an empty list.
pub fn top_n_words(index: &InvertedIndex, n: usize, file: &str) -> Vec<WordCount> {
    let mut words: Vec<WordCount> = index
        .terms_in(file)
        .map(|(word, count)| WordCount { word: word.to_string(), count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(n);
    words
}

/// Occurrences of `word` (case-insensitive) in `file`.
pub fn word_frequency(index: &InvertedIndex, word: &str, file: &str) -> Count {
    index.count(&word.to_lowercase(), file)
}

/// TF-IDF of `term` in `file` against a collection of `total_files`.
///
/// tf = count / tokens in file, idf = ln(total_files / (1 + files containing term)).
/// idf may be negative. A file without tokens, or without the term, scores 0.
pub fn tfidf(index: &InvertedIndex, term: &str, file: &str, total_files: usize) -> f64 {
    let term = term.to_lowercase();
    let occurrences = index.count(&term, file);
    let total_words = index.total_words(file);
    if occurrences == 0 || total_words == 0 || total_files == 0 {
        return 0.0;
    }
    let tf = occurrences as f64 / total_words as f64;
    let docs_with_term = index.document_frequency(&term);
    let idf = (total_files as f64 / (1 + docs_with_term) as f64).ln();
    tf * idf
}

/// Index each of `files` (once) and rank them by TF-IDF of `term`.
///
/// The collection size is the number of paths supplied, duplicates
/// included, while each distinct path is scored once. Any file that cannot
/// be read aborts the whole search.
/// Equal scores are ordered by file name.
pub fn search(index: &mut InvertedIndex, term: &str, files: &[String]) -> Result<Vec<FileScore>> {
    let mut seen = HashSet::new();
    let distinct: Vec<&str> = files
        .iter()
        .map(String::as_str)
        .filter(|f| seen.insert(*f))
        .collect();

    for file in &distinct {
        index.ensure_indexed(file)?;
    }

    let total_files = files.len();
    let mut scores: Vec<FileScore> = distinct
        .iter()
        .map(|file| FileScore {
            file: file.to_string(),
            score: tfidf(index, term, file, total_files),
        })
        .collect();
    scores.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.file.cmp(&b.file),
        ord => ord,
    });
    tracing::debug!(term, files = total_files, "ranked files");
    Ok(scores)
}
