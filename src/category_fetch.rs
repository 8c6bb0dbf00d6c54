use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use rand::Rng;
use serde::Deserialize;

use crate::fallback_pool;
use crate::http_client::{fetch_json, http_client};
use crate::state::{Category, Clue, NUM_CATEGORIES, NUM_CLUES};

pub const SPRINGBOARD_API_BASE: &str = "https://projects.springboard.com/jeopardy/api";

/// A category as the API returned it, before clue sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCategory {
    pub title: String,
    pub clues: Vec<RemoteClue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteClue {
    pub question: String,
    pub answer: String,
}

/// Where categories come from. The game only ever talks to this trait.
pub trait CategorySource {
    fn list_category_ids(&self, count: usize) -> Result<Vec<u64>>;
    fn category_detail(&self, id: u64) -> Result<RemoteCategory>;
}

pub struct SpringboardSource {
    base_url: String,
    timeout_secs: u64,
}

impl SpringboardSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout_secs,
        }
    }

    pub fn categories_url(&self, count: usize) -> String {
        format!("{}/categories?count={count}", self.base_url)
    }

    pub fn category_url(&self, id: u64) -> String {
        format!("{}/category?id={id}", self.base_url)
    }
}

impl CategorySource for SpringboardSource {
    fn list_category_ids(&self, count: usize) -> Result<Vec<u64>> {
        let client = http_client(self.timeout_secs)?;
        let body = fetch_json(client, &self.categories_url(count)).context("categories request")?;
        parse_category_ids_json(&body)
    }

    fn category_detail(&self, id: u64) -> Result<RemoteCategory> {
        let client = http_client(self.timeout_secs)?;
        let body = fetch_json(client, &self.category_url(id))
            .with_context(|| format!("category {id} request"))?;
        parse_category_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct CategoryPayload {
    title: String,
    #[serde(default)]
    clues: Vec<CluePayload>,
}

#[derive(Debug, Deserialize)]
struct CluePayload {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

pub fn parse_category_ids_json(raw: &str) -> Result<Vec<u64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let refs: Vec<CategoryRef> =
        serde_json::from_str(trimmed).context("invalid categories json")?;
    let mut seen = HashSet::new();
    Ok(refs
        .into_iter()
        .map(|r| r.id)
        .filter(|id| seen.insert(*id))
        .collect())
}

pub fn parse_category_json(raw: &str) -> Result<RemoteCategory> {
    let payload: CategoryPayload =
        serde_json::from_str(raw.trim()).context("invalid category json")?;
    let clues = payload
        .clues
        .into_iter()
        .filter_map(|clue| {
            let question = clue.question.map(|q| q.trim().to_string())?;
            let answer = clue.answer.map(|a| a.trim().to_string())?;
            if question.is_empty() || answer.is_empty() {
                return None;
            }
            Some(RemoteClue { question, answer })
        })
        .collect();
    Ok(RemoteCategory {
        title: payload.title.trim().to_string(),
        clues,
    })
}

/// `min(len, amount)` distinct indices into `0..len`, in random order.
pub fn sample_indices<R: Rng + ?Sized>(len: usize, amount: usize, rng: &mut R) -> Vec<usize> {
    rand::seq::index::sample(rng, len, amount.min(len)).into_vec()
}

/// Samples up to `NUM_CATEGORIES` distinct ids from a pool of `pool_size`
/// candidates. An empty result means the listing could not be fetched.
pub fn fetch_category_ids<S, R>(source: &S, pool_size: usize, rng: &mut R) -> Vec<u64>
where
    S: CategorySource + ?Sized,
    R: Rng + ?Sized,
{
    match source.list_category_ids(pool_size) {
        Ok(ids) => sample_indices(ids.len(), NUM_CATEGORIES, rng)
            .into_iter()
            .map(|idx| ids[idx])
            .collect(),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "category listing failed");
            Vec::new()
        }
    }
}

/// Fetches one category and samples its clues. Any failure substitutes a
/// random fallback category.
pub fn fetch_category<S, R>(source: &S, id: u64, rng: &mut R) -> Category
where
    S: CategorySource + ?Sized,
    R: Rng + ?Sized,
{
    match source
        .category_detail(id)
        .and_then(|remote| sample_category(remote, rng))
    {
        Ok(category) => category,
        Err(err) => {
            let fallback = fallback_pool::random_fallback_category(rng);
            tracing::warn!(
                id,
                error = %format!("{err:#}"),
                fallback = fallback.title(),
                "category fetch failed, substituting fallback"
            );
            fallback
        }
    }
}

/// Needs strictly more than `NUM_CLUES` clues to draw from.
pub fn sample_category<R: Rng + ?Sized>(remote: RemoteCategory, rng: &mut R) -> Result<Category> {
    if remote.title.is_empty() {
        bail!("category has no title");
    }
    if remote.clues.len() <= NUM_CLUES {
        bail!(
            "category '{}' has {} clues, need more than {}",
            remote.title,
            remote.clues.len(),
            NUM_CLUES
        );
    }
    let mut slots: Vec<Option<RemoteClue>> = remote.clues.into_iter().map(Some).collect();
    let clues = sample_indices(slots.len(), NUM_CLUES, rng)
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .map(|clue| Clue::new(clue.question, clue.answer))
        .collect();
    Ok(Category::new(remote.title, clues))
}
