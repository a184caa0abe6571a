// Municipality Resolver
// Free-text query → one canonical municipality. Exact name first, substring second.

use crate::error::QueryError;
use crate::model::Municipality;
use crate::normalize::{fold, is_searchable};
use crate::store::ReferenceStore;
use crate::tie_break::TieBreak;
use serde::Serialize;
use tracing::debug;

/// Which phase produced the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Exact,
    Contains,
}

/// Resolve a query to a municipality
///
/// Phase 1 (exact, case-insensitive) always preempts phase 2 (substring).
/// Queries shorter than `MIN_QUERY_CHARS` resolve to `NotFound`.
pub fn resolve<'a>(
    store: &'a ReferenceStore,
    query: &str,
    tie_break: TieBreak,
) -> Result<&'a Municipality, QueryError> {
    resolve_with_phase(store, query, tie_break).map(|(m, _)| m)
}

/// Same as [`resolve`], also reporting the matching phase
pub fn resolve_with_phase<'a>(
    store: &'a ReferenceStore,
    query: &str,
    tie_break: TieBreak,
) -> Result<(&'a Municipality, MatchPhase), QueryError> {
    let not_found = || QueryError::NotFound {
        query: query.trim().to_string(),
    };

    if !is_searchable(query) {
        debug!(query, "query too short to resolve");
        return Err(not_found());
    }

    let wanted = fold(query);
    let municipalities = store.municipalities();

    let exact = tie_break.pick(municipalities.iter().filter(|m| fold(&m.name) == wanted));
    if let Some(m) = exact {
        debug!(query, code = %m.code, "resolved by exact name");
        return Ok((m, MatchPhase::Exact));
    }

    let partial = tie_break.pick(
        municipalities
            .iter()
            .filter(|m| fold(&m.name).contains(&wanted)),
    );
    match partial {
        Some(m) => {
            debug!(query, code = %m.code, "resolved by substring");
            Ok((m, MatchPhase::Contains))
        }
        None => {
            debug!(query, "no municipality matches");
            Err(not_found())
        }
    }
}
