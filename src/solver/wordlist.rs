use std::fs;
use std::path::Path;

use log::debug;

use super::alphabet::Alphabet;
use super::error::Result;

/// Dictionary snapshot the solver draws candidate words from: lowercase,
/// sorted and duplicate free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    /// Parses raw wordlist contents, one entry per line. Empty lines and
    /// `#` comments are skipped, only the first tab- or space-separated
    /// field of a line counts (dict.cc dumps carry annotations there), and
    /// words with letters outside the alphabet are dropped.
    pub fn parse(contents: &str, alphabet: &Alphabet) -> Self {
        let mut words = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let token = match line.split(['\t', ' ']).next() {
                Some(token) => token,
                None => continue,
            };
            let word = token.to_lowercase();
            if word.is_empty() || !alphabet.accepts_word(&word) {
                continue;
            }
            words.push(word);
        }
        words.sort_unstable();
        words.dedup();
        debug!("wordlist holds {} words", words.len());
        Self { words }
    }

    /// Loads and parses a wordlist file.
    pub fn load(path: &Path, alphabet: &Alphabet) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::parse(&contents, alphabet))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn into_words(self) -> Vec<String> {
        self.words
    }
}
