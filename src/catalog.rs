use std::collections::HashSet;

use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "title_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "title_case")]
pub enum EssayType {
    Integrated,
    Independent,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "title_case")]
pub enum PassageFormat {
    #[default]
    CompleteEssay,
    SingleParagraph,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "title_case")]
pub enum Domain {
    Science,
    Humanities,
    Social,
    Technology,
    Environment,
    Education,
}

/// A reading passage offered for practice. Only `id` and `content` matter to
/// the measurement engine; the rest drives selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub title: String,
    pub content: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub kind: EssayType,
    pub format: PassageFormat,
    pub domain: Domain,
    pub word_count: u32,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PassageFilter {
    pub difficulty: Option<Difficulty>,
    pub kind: Option<EssayType>,
    pub domain: Option<Domain>,
    pub format: Option<PassageFormat>,
    /// Case-insensitive substring of the title
    pub query: Option<String>,
    /// Skip this passage, e.g. the one just practised
    pub exclude_id: Option<String>,
}

impl PassageFilter {
    pub fn matches(&self, p: &Passage) -> bool {
        self.difficulty.map_or(true, |d| p.difficulty == d)
            && self.kind.map_or(true, |k| p.kind == k)
            && self.domain.map_or(true, |d| p.domain == d)
            && self.format.map_or(true, |f| p.format == f)
            && self.query.as_ref().map_or(true, |q| {
                p.title.to_lowercase().contains(&q.to_lowercase())
            })
            && self.exclude_id.as_deref() != Some(p.id.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    passages: Vec<Passage>,
}

impl Catalog {
    /// Passages compiled into the binary
    pub fn builtin() -> CatalogResult<Self> {
        let mut passages = Vec::new();
        for file in PASSAGE_DIR.files() {
            let name = file.path().display().to_string();
            if !name.ends_with(".json") {
                continue;
            }
            let text = file
                .contents_utf8()
                .ok_or_else(|| CatalogError::Encoding(name.clone()))?;
            let passage: Passage = serde_json::from_str(text)
                .map_err(|source| CatalogError::Parse { file: name, source })?;
            passages.push(passage);
        }
        debug!(count = passages.len(), "loaded built-in passages");
        Self::from_passages(passages)
    }

    pub fn from_passages(mut passages: Vec<Passage>) -> CatalogResult<Self> {
        let mut seen = HashSet::new();
        for p in &passages {
            if !seen.insert(p.id.clone()) {
                return Err(CatalogError::DuplicateId(p.id.clone()));
            }
        }
        // numeric ids sort numerically, anything else after them by text
        passages.sort_by(|a, b| {
            let key = |p: &Passage| (p.id.parse::<u64>().unwrap_or(u64::MAX), p.id.clone());
            key(a).cmp(&key(b))
        });
        Ok(Self { passages })
    }

    pub fn all(&self) -> &[Passage] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Passage> {
        self.passages.iter().find(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> CatalogResult<&Passage> {
        self.find(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn by_format(&self, format: PassageFormat) -> Vec<&Passage> {
        self.passages.iter().filter(|p| p.format == format).collect()
    }

    pub fn filter(&self, filter: &PassageFilter) -> Vec<&Passage> {
        self.passages.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Random passage in the preferred format, or any passage when none match
    pub fn pick(&self, format: PassageFormat) -> Option<&Passage> {
        self.pick_where(&PassageFilter {
            format: Some(format),
            ..Default::default()
        })
    }

    pub fn pick_where(&self, filter: &PassageFilter) -> Option<&Passage> {
        let mut rng = rand::thread_rng();
        let matching = self.filter(filter);
        if let Some(p) = matching.choose(&mut rng) {
            return Some(*p);
        }
        self.passages.choose(&mut rng)
    }
}
