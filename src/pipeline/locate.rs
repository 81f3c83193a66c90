use serde::{Deserialize, Serialize};

use super::MatchCriteria;
use crate::error::ExtractError;
use crate::resource::SourceResource;
use crate::store::InventoryStore;

/// What to do when the store returns more than one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Take the store's first candidate and log a warning.
    #[default]
    First,
    /// Fail the run with `AmbiguousMatch`.
    Error,
}

/// Fetches the single source resource for `criteria`.
///
/// Returns `Ok(None)` only when nothing matched and the criteria do not
/// require a match.
pub async fn locate(
    store: &dyn InventoryStore,
    criteria: &MatchCriteria,
    tie_break: TieBreak,
) -> Result<Option<SourceResource>, ExtractError> {
    let candidates = store.get_resource(criteria).await?;

    let first = match candidates.len() {
        0 if criteria.must_exist() => {
            return Err(ExtractError::NotFound {
                criteria: criteria.to_string(),
            });
        }
        0 => {
            tracing::info!(criteria = %criteria, "no source resource, nothing to extract");
            return Ok(None);
        }
        1 => &candidates[0],
        count => match tie_break {
            TieBreak::First => {
                tracing::warn!(
                    count,
                    criteria = %criteria,
                    "multiple source resources matched, using the first"
                );
                &candidates[0]
            }
            TieBreak::Error => {
                return Err(ExtractError::AmbiguousMatch {
                    count,
                    criteria: criteria.to_string(),
                });
            }
        },
    };

    let source = SourceResource::from_record(first)?;
    tracing::info!(
        source_id = source.id.as_deref().unwrap_or("<none>"),
        blocks = source.state.resources.len(),
        store = store.name(),
        "source resource located"
    );
    Ok(Some(source))
}
