// Autocomplete Ranker
// Scores every municipality against the typed prefix: exact < starts-with < contains.

use crate::error::QueryError;
use crate::normalize::{fold, is_searchable, MIN_QUERY_CHARS};
use crate::store::ReferenceStore;
use crate::tie_break::TieBreak;
use serde::Serialize;

/// Internal sort key, never part of the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchScore {
    Exact = 1,
    Prefix = 2,
    Contains = 3,
}

impl MatchScore {
    fn of(name: &str, query: &str) -> Option<MatchScore> {
        if name == query {
            Some(MatchScore::Exact)
        } else if name.starts_with(query) {
            Some(MatchScore::Prefix)
        } else if name.contains(query) {
            Some(MatchScore::Contains)
        } else {
            None
        }
    }
}

/// One autocomplete entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "comune")]
    pub name: String,
    #[serde(rename = "provincia")]
    pub province: String,
    #[serde(rename = "regione")]
    pub region: String,
    pub display: String,
}

/// Rank municipality names for the query, best first, at most `limit` entries
pub fn suggest(
    store: &ReferenceStore,
    query: &str,
    limit: usize,
    tie_break: TieBreak,
) -> Result<Vec<Suggestion>, QueryError> {
    if !is_searchable(query) {
        return Err(QueryError::QueryTooShort {
            query: query.trim().to_string(),
            min: MIN_QUERY_CHARS,
        });
    }

    let wanted = fold(query);

    let mut scored: Vec<_> = store
        .municipalities()
        .iter()
        .filter(|m| !m.name.is_empty())
        .filter_map(|m| MatchScore::of(&fold(&m.name), &wanted).map(|score| (score, m)))
        .collect();

    // stable: equal keys keep table order
    scored.sort_by(|(sa, a), (sb, b)| sa.cmp(sb).then_with(|| tie_break.compare(a, b)));

    Ok(scored
        .into_iter()
        .take(limit)
        .map(|(_, m)| Suggestion {
            name: m.name.clone(),
            province: m.province.clone(),
            region: m.region.clone(),
            display: m.display(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::sample_store;

    fn names(rows: &[Suggestion]) -> Vec<&str> {
        rows.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_exact_before_prefix_before_contains() {
        let store = sample_store();
        let rows = suggest(&store, "ROMA", 10, TieBreak::TableOrder).unwrap();
        assert_eq!(names(&rows), vec!["Roma", "Romagnano Sesia"]);

        let rows = suggest(&store, "an", 10, TieBreak::TableOrder).unwrap();
        // only contains matches, in table order
        assert_eq!(names(&rows), vec!["Milano", "Romagnano Sesia", "Atlantide"]);
    }

    #[test]
    fn test_prefix_outranks_earlier_contains() {
        let store = sample_store();
        let rows = suggest(&store, "ag", 10, TieBreak::TableOrder).unwrap();
        assert_eq!(
            names(&rows),
            vec!["Agliè", "Romagnano Sesia", "Castello d'Agogna", "Castello d'Agogna"]
        );
    }

    #[test]
    fn test_equal_scores_follow_tie_break() {
        let store = sample_store();
        let rows = suggest(&store, "castello d", 10, TieBreak::TableOrder).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].province, "PV");
        assert_eq!(rows[1].province, "AL");

        let rows = suggest(&store, "castello d", 10, TieBreak::Alphabetical).unwrap();
        assert_eq!(rows[0].province, "AL");
    }

    #[test]
    fn test_limit_truncates() {
        let store = sample_store();
        let rows = suggest(&store, "castello", 2, TieBreak::TableOrder).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Castello-Molina di Fiemme");

        assert!(suggest(&store, "castello", 0, TieBreak::TableOrder).unwrap().is_empty());
    }

    #[test]
    fn test_every_entry_relates_to_query() {
        let store = sample_store();
        for q in ["ro", "MI", "ia", "gl", "ello"] {
            let rows = suggest(&store, q, 50, TieBreak::TableOrder).unwrap();
            for row in &rows {
                assert!(fold(&row.name).contains(&fold(q)), "{} vs {}", row.name, q);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let store = sample_store();
        let a = suggest(&store, "ro", 10, TieBreak::TableOrder).unwrap();
        let b = suggest(&store, "ro", 10, TieBreak::TableOrder).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_and_payload_shape() {
        let store = sample_store();
        let rows = suggest(&store, "agli", 10, TieBreak::TableOrder).unwrap();
        assert_eq!(rows[0].display, "Agliè (TO) - Piemonte");

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["comune"], "Agliè");
        assert!(json.get("score").is_none());
    }

    #[test]
    fn test_query_too_short() {
        let store = sample_store();
        for q in ["", " ", "r", " R "] {
            let err = suggest(&store, q, 10, TieBreak::TableOrder).unwrap_err();
            assert!(matches!(err, QueryError::QueryTooShort { min: 2, .. }));
        }
    }
}
