pub mod handle;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The static instance of the banned-word list.
pub static INSTANCE: Lazy<WordStore> = Lazy::new(WordStore::new);

/// Read access to the banned-word list.
///
/// The filter depends on this trait only, so tests can substitute an
/// in-memory fixture for the static store.
pub trait BannedWordStore {
    /// The current word set, case-folded.
    ///
    /// A transient failure must propagate: treating it as an empty list
    /// would let prohibited content through.
    fn words(&self) -> Result<Vec<String>, Error>;
}

/// Returns whether `text` contains any banned word as a substring,
/// case-insensitively. Empty and whitespace-only input never matches.
pub fn contains_prohibited_content<S>(store: &S, text: &str) -> Result<bool, Error>
where
    S: BannedWordStore + ?Sized,
{
    if text.trim().is_empty() {
        return Ok(false);
    }
    let lower = text.to_lowercase();
    Ok(store.words()?.iter().any(|word| lower.contains(word.as_str())))
}

#[derive(Serialize, Deserialize, Default)]
struct WordList {
    words: Vec<String>,
}

/// The process-wide banned-word list, unique by lower-cased value.
pub struct WordStore {
    words: RwLock<Vec<String>>,
}

impl WordStore {
    /// Read and create a word store from `./data/banned_words.toml`.
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::{fs::File, io::Read};

            let words = File::open("./data/banned_words.toml")
                .ok()
                .and_then(|mut file| {
                    let mut string = String::new();
                    file.read_to_string(&mut string).ok()?;
                    toml::from_str::<WordList>(&string).ok()
                })
                .unwrap_or_default()
                .words;
            return Self {
                words: RwLock::new(words),
            };
        }

        #[cfg(test)]
        Self {
            words: RwLock::new(Vec::new()),
        }
    }

    /// Adds a word after trimming and case-folding it.
    ///
    /// # Errors
    ///
    /// - Errors if the trimmed word is empty.
    /// - Errors if the word is already in the list.
    pub fn add(&self, word: &str) -> Result<(), Error> {
        let norm = word.trim().to_lowercase();
        if norm.is_empty() {
            return Err(Error::BannedWordEmpty);
        }
        let mut words = self.words.write();
        if words.iter().any(|w| w == &norm) {
            return Err(Error::BannedWordExists);
        }
        words.push(norm);
        self.save(&words);
        Ok(())
    }

    /// Removes a word, returning whether it was present.
    pub fn remove(&self, word: &str) -> bool {
        let norm = word.trim().to_lowercase();
        let mut words = self.words.write();
        let len = words.len();
        words.retain(|w| w != &norm);
        let removed = words.len() < len;
        if removed {
            self.save(&words);
        }
        removed
    }

    /// The current word list.
    pub fn list(&self) -> Vec<String> {
        self.words.read().clone()
    }

    fn save(&self, _words: &[String]) {
        #[cfg(not(test))]
        {
            use std::{fs::File, io::Write};

            let list = WordList {
                words: _words.to_vec(),
            };
            let result = File::create("./data/banned_words.toml").and_then(|mut file| {
                file.write_all(toml::to_string(&list).unwrap_or_default().as_bytes())
            });
            if let Err(err) = result {
                tracing::error!("failed to save banned words: {err}");
            }
        }
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.words.write().clear();
    }
}

impl BannedWordStore for WordStore {
    fn words(&self) -> Result<Vec<String>, Error> {
        Ok(self.words.read().clone())
    }
}
