use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Runs of two or more ASCII letters; anything else ends a run.
    static ref RE: Regex = Regex::new(r"[a-z]{2,}").expect("valid regex");
}

/// Lazy token stream over one line. Owns the lowercased copy of the line
/// and scans it one match at a time.
pub struct Tokens {
    buffer: String,
    pos: usize,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let m = RE.find_at(&self.buffer, self.pos)?;
        self.pos = m.end();
        Some(m.as_str().to_string())
    }
}

/// Lazily yield the tokens of one line of text, in order.
///
/// The line is lowercased first. A token is a maximal run of ASCII letters
/// at least two characters long, so `"go2"` yields `"go"` and a lone `"a"`
/// yields nothing.
pub fn tokens(line: &str) -> Tokens {
    Tokens { buffer: line.to_lowercase(), pos: 0 }
}

/// Tokenize a line into lowercase alphabetic terms of length >= 2.
pub fn tokenize(line: &str) -> Vec<String> {
    tokens(line).collect()
}
