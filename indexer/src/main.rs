use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use std::ffi::OsString;
use std::io::{self, Write};
use tfidx_core::query::{search, top_n_words, word_frequency};
use tfidx_core::{InvertedIndex, WordCount};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: indexer <option> <parameters>...";
const INVALID_OPTION: &str = "Invalid option.";

#[derive(Parser, Debug)]
#[command(name = "indexer", version)]
#[command(about = "Word frequencies and TF-IDF ranking over text files", long_about = None)]
#[command(group(ArgGroup::new("mode").args(["freq", "freq_word", "search"])))]
struct Cli {
    /// Print the N most frequent words in FILE
    #[arg(long, num_args = 2, allow_hyphen_values = true, value_names = ["N", "FILE"])]
    freq: Option<Vec<String>>,
    /// Print how often WORD occurs in FILE
    #[arg(long = "freq-word", num_args = 2, allow_hyphen_values = true, value_names = ["WORD", "FILE"])]
    freq_word: Option<Vec<String>>,
    /// Rank FILEs by TF-IDF relevance of TERM
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_names = ["TERM", "FILE"])]
    search: Option<Vec<String>>,
    /// Emit results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug)]
enum Mode {
    Freq { n: usize, file: String },
    FreqWord { word: String, file: String },
    Search { term: String, files: Vec<String> },
}

impl Cli {
    fn mode(self) -> Result<Option<Mode>> {
        if let Some(mut v) = self.freq {
            let file = v.pop().unwrap_or_default();
            let raw = v.pop().unwrap_or_default();
            let n = raw
                .parse()
                .with_context(|| format!("invalid word count {raw:?}"))?;
            return Ok(Some(Mode::Freq { n, file }));
        }
        if let Some(mut v) = self.freq_word {
            let file = v.pop().unwrap_or_default();
            let word = v.pop().unwrap_or_default();
            return Ok(Some(Mode::FreqWord { word, file }));
        }
        if let Some(mut v) = self.search {
            let term = v.remove(0);
            return Ok(Some(Mode::Search { term, files: v }));
        }
        Ok(None)
    }
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(std::env::args_os(), &mut out)
}

/// Parse `argv` and execute the requested query, writing results to `out`.
fn run<I, T, W>(argv: I, out: &mut W) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    if argv.len() < 3 {
        writeln!(out, "{USAGE}")?;
        return Ok(());
    }

    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::UnknownArgument | ErrorKind::ArgumentConflict => {
                tracing::warn!(error = %e, "rejected command line");
                writeln!(out, "{INVALID_OPTION}")?;
                return Ok(());
            }
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                write!(out, "{}", e.render())?;
                return Ok(());
            }
            _ => return Err(e.into()),
        },
    };

    let json = cli.json;
    let Some(mode) = cli.mode()? else {
        writeln!(out, "{USAGE}")?;
        return Ok(());
    };
    tracing::info!(?mode, "running query");

    let mut index = InvertedIndex::new();
    match mode {
        Mode::Freq { n, file } => {
            index.ensure_indexed(&file)?;
            let top = top_n_words(&index, n, &file);
            if json {
                serde_json::to_writer(&mut *out, &top)?;
                writeln!(out)?;
            } else {
                for w in &top {
                    writeln!(out, "{}: {}", w.word, w.count)?;
                }
            }
        }
        Mode::FreqWord { word, file } => {
            index.ensure_indexed(&file)?;
            let count = word_frequency(&index, &word, &file);
            if json {
                serde_json::to_writer(&mut *out, &WordCount { word, count })?;
                writeln!(out)?;
            } else {
                writeln!(out, "{word}: {count}")?;
            }
        }
        Mode::Search { term, files } => {
            let ranked = search(&mut index, &term, &files)?;
            if json {
                serde_json::to_writer(&mut *out, &ranked)?;
                writeln!(out)?;
            } else {
                for s in &ranked {
                    writeln!(out, "{}: {:?}", s.file, s.score)?;
                }
            }
        }
    }
    tracing::info!(files = index.file_count(), terms = index.term_count(), "query complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn run_to_string(args: &[&str]) -> Result<String> {
        let mut argv = vec!["indexer"];
        argv.extend_from_slice(args);
        let mut buf = Vec::new();
        run(argv, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    fn write(dir: &std::path::Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn too_few_arguments_prints_usage() {
        assert_eq!(run_to_string(&[]).unwrap(), format!("{USAGE}\n"));
        assert_eq!(run_to_string(&["--freq"]).unwrap(), format!("{USAGE}\n"));
    }

    #[test]
    fn unknown_option_is_not_fatal() {
        assert_eq!(run_to_string(&["--bogus", "x"]).unwrap(), format!("{INVALID_OPTION}\n"));
    }

    #[test]
    fn freq_prints_ranked_words() {
        let dir = tempdir().unwrap();
        let f = write(dir.path(), "a.txt", "b b b a aa aa cc\ncc cc cc");
        let out = run_to_string(&["--freq", "2", &f]).unwrap();
        assert_eq!(out, "cc: 4\naa: 2\n");
    }

    #[test]
    fn freq_rejects_non_numeric_n() {
        let dir = tempdir().unwrap();
        let f = write(dir.path(), "a.txt", "words");
        assert!(run_to_string(&["--freq", "many", &f]).is_err());
    }

    #[test]
    fn freq_rejects_negative_n() {
        let dir = tempdir().unwrap();
        let f = write(dir.path(), "a.txt", "words");
        let err = run_to_string(&["--freq", "-1", &f]).unwrap_err();
        assert!(err.to_string().contains("invalid word count"));
    }

    #[test]
    fn freq_word_accepts_leading_hyphen() {
        let dir = tempdir().unwrap();
        let f = write(dir.path(), "a.txt", "xx yy");
        assert_eq!(run_to_string(&["--freq-word", "-x", &f]).unwrap(), "-x: 0\n");
    }

    #[test]
    fn search_without_files_prints_nothing() {
        assert_eq!(run_to_string(&["--search", "apple"]).unwrap(), "");
    }

    #[test]
    fn search_scores_keep_a_decimal_point() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "apple");
        let b = write(dir.path(), "b.txt", "pear");
        let out = run_to_string(&["--search", "apple", &a, &b]).unwrap();
        assert_eq!(out, format!("{a}: 0.0\n{b}: 0.0\n"));
    }

    #[test]
    fn freq_word_echoes_word() {
        let dir = tempdir().unwrap();
        let f = write(dir.path(), "a.txt", "Rust rust! RUST, go");
        assert_eq!(run_to_string(&["--freq-word", "Rust", &f]).unwrap(), "Rust: 3\n");
        assert_eq!(run_to_string(&["--freq-word", "java", &f]).unwrap(), "java: 0\n");
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.txt").to_string_lossy().to_string();
        assert!(run_to_string(&["--freq-word", "x", &missing]).is_err());
    }

    #[test]
    fn search_ranks_files() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "fileA.txt", "apple tart apple");
        let b = write(dir.path(), "fileB.txt", "pear tart");
        let c = write(dir.path(), "fileC.txt", "plum");
        let out = run_to_string(&["--search", "apple", &b, &c, &a]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(&format!("{a}: ")));
        assert_eq!(lines[1], format!("{b}: 0.0"));
        assert_eq!(lines[2], format!("{c}: 0.0"));
    }

    #[test]
    fn json_output() {
        let dir = tempdir().unwrap();
        let f = write(dir.path(), "a.txt", "red red blue");
        let out = run_to_string(&["--json", "--freq", "5", &f]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["word"], "red");
        assert_eq!(v[0]["count"], 2);
        assert_eq!(v[1]["word"], "blue");

        let out = run_to_string(&["--json", "--search", "red", &f]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["file"], f.as_str());
    }
}
