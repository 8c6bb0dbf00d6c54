use rand::Rng;
use thiserror::Error;

use crate::category_fetch::{CategorySource, fetch_category, fetch_category_ids};
use crate::fallback_pool::sample_fallback_categories;
use crate::state::{Board, BoardShapeError, Category, NUM_CATEGORIES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    ApiUnavailable,
    SetupFailed,
}

impl FallbackReason {
    pub fn notice(self) -> &'static str {
        match self {
            FallbackReason::ApiUnavailable => "Using fallback questions. API unavailable.",
            FallbackReason::SetupFailed => "Using fallback questions due to setup failure.",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("category listing unavailable")]
    ListingUnavailable,
    #[error("category listing returned {got} ids, need {needed}")]
    ShortListing { got: usize, needed: usize },
    #[error("assembled board is malformed: {0}")]
    BoardShape(#[from] BoardShapeError),
}

impl SetupError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            SetupError::ListingUnavailable => FallbackReason::ApiUnavailable,
            SetupError::ShortListing { .. } | SetupError::BoardShape(_) => {
                FallbackReason::SetupFailed
            }
        }
    }
}

/// A finished board plus the fallback path taken, if any. `fallback` is
/// `None` only when the listing succeeded; single-category substitutions
/// don't count.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub board: Board,
    pub fallback: Option<FallbackReason>,
}

pub fn build_session<S, R>(source: &S, pool_size: usize, rng: &mut R) -> SessionOutcome
where
    S: CategorySource + ?Sized,
    R: Rng + ?Sized,
{
    match assemble_remote(source, pool_size, rng) {
        Ok(board) => {
            tracing::info!(
                titles = ?board.categories().iter().map(Category::title).collect::<Vec<_>>(),
                "session built"
            );
            SessionOutcome {
                board,
                fallback: None,
            }
        }
        Err(err) => {
            let reason = err.fallback_reason();
            tracing::warn!(error = %err, ?reason, "using fallback categories");
            fallback_session(reason, rng)
        }
    }
}

/// Whole-session fallback: distinct categories from the embedded pool.
pub fn fallback_session<R: Rng + ?Sized>(reason: FallbackReason, rng: &mut R) -> SessionOutcome {
    let categories = sample_fallback_categories(rng, NUM_CATEGORIES);
    let board = match Board::new(categories) {
        Ok(board) => board,
        Err(err) => unreachable!("embedded fallback pool is malformed: {err}"),
    };
    SessionOutcome {
        board,
        fallback: Some(reason),
    }
}

fn assemble_remote<S, R>(source: &S, pool_size: usize, rng: &mut R) -> Result<Board, SetupError>
where
    S: CategorySource + ?Sized,
    R: Rng + ?Sized,
{
    let ids = list_stage(source, pool_size, rng)?;
    let categories = detail_stage(source, &ids, rng);
    Ok(Board::new(categories)?)
}

fn list_stage<S, R>(source: &S, pool_size: usize, rng: &mut R) -> Result<Vec<u64>, SetupError>
where
    S: CategorySource + ?Sized,
    R: Rng + ?Sized,
{
    let ids = fetch_category_ids(source, pool_size, rng);
    if ids.is_empty() {
        return Err(SetupError::ListingUnavailable);
    }
    if ids.len() < NUM_CATEGORIES {
        return Err(SetupError::ShortListing {
            got: ids.len(),
            needed: NUM_CATEGORIES,
        });
    }
    Ok(ids)
}

// One request at a time, results kept in id order.
fn detail_stage<S, R>(source: &S, ids: &[u64], rng: &mut R) -> Vec<Category>
where
    S: CategorySource + ?Sized,
    R: Rng + ?Sized,
{
    ids.iter().map(|id| fetch_category(source, *id, rng)).collect()
}
