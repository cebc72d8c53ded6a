use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

static WORDS_DIR: Dir = include_dir!("src/words");

/// One dictionary entry as stored in the word files. `category`, `image` and
/// `audio` are opaque to the engine and pass through untouched to
/// presentation.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct WordEntry {
    pub text: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub audio: Option<String>,
}

/// A word file: all entries for one language.
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub language: String,
    pub name: String,
    pub words: Vec<WordEntry>,
}

/// A word as handed to a session: the entry plus the language it came from.
/// Immutable once produced by the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub text: String,
    pub language: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub audio: Option<String>,
}

impl Word {
    pub fn letter_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// The raw dictionary, grouped by language.
#[derive(Clone, Debug, Default)]
pub struct WordCatalog {
    lists: Vec<WordList>,
}

impl WordCatalog {
    /// Load every word file compiled into the binary.
    pub fn embedded() -> Self {
        let lists = WORDS_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
            .map(|f| {
                read_word_list(f.contents_utf8().expect("word file is not valid utf-8"))
                    .expect("unable to deserialize word list json")
            })
            .collect();
        Self { lists }
    }

    pub fn from_lists(lists: Vec<WordList>) -> Self {
        Self { lists }
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|l| l.words.is_empty())
    }

    pub fn languages(&self) -> Vec<&str> {
        self.lists.iter().map(|l| l.language.as_str()).collect()
    }

    /// All words for `language`, or the whole catalog when `None`.
    pub fn words_for(&self, language: Option<&str>) -> Vec<Word> {
        self.lists
            .iter()
            .filter(|l| language.is_none_or(|lang| l.language == lang))
            .flat_map(|l| {
                l.words.iter().map(|e| Word {
                    text: e.text.clone(),
                    language: l.language.clone(),
                    category: e.category.clone(),
                    image: e.image.clone(),
                    audio: e.audio.clone(),
                })
            })
            .collect()
    }
}

fn read_word_list(contents: &str) -> Result<WordList, Box<dyn Error>> {
    let list: WordList = from_str(contents)?;
    Ok(list)
}
