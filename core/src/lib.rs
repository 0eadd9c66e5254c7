pub mod index;
pub mod query;
pub mod tokenizer;

pub use index::{Count, FileId, InvertedIndex};
pub use query::{FileScore, WordCount};
