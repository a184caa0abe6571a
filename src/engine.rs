// Lookup Orchestrator
// CivicEngine is the read-only context every query runs against. It is built
// once from a loaded store and cloned freely across threads and handlers.

use crate::autocomplete::{self, Suggestion};
use crate::error::QueryError;
use crate::model::{EuMember, LowerChamberMember, Municipality, Tier, UpperChamberMember};
use crate::resolver::{self, MatchPhase};
use crate::store::{ReferenceStore, StoreStats};
use crate::tie_break::TieBreak;
use crate::tiers;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Per-tier and total representative counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub total: usize,
    pub lower_chamber: usize,
    pub upper_chamber: usize,
    pub eu_parliament: usize,
}

impl TierCounts {
    fn new(lower_chamber: usize, upper_chamber: usize, eu_parliament: usize) -> Self {
        TierCounts {
            total: lower_chamber + upper_chamber + eu_parliament,
            lower_chamber,
            upper_chamber,
            eu_parliament,
        }
    }
}

/// District identifiers of the resolved municipality (when present)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Districts {
    pub lower_chamber: Option<String>,
    pub upper_chamber: Option<String>,
}

/// Outcome of a full lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupResult {
    Success {
        municipality: Municipality,
        matched_by: MatchPhase,
        districts: Districts,
        lower_chamber_reps: Vec<LowerChamberMember>,
        upper_chamber_reps: Vec<UpperChamberMember>,
        eu_reps: Vec<EuMember>,
        counts: TierCounts,
    },
    NotFound {
        original_query: String,
    },
}

impl LookupResult {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupResult::Success { .. })
    }

    pub fn counts(&self) -> Option<TierCounts> {
        match self {
            LookupResult::Success { counts, .. } => Some(*counts),
            LookupResult::NotFound { .. } => None,
        }
    }
}

/// Full listing of one tier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TierListing {
    LowerChamber(Vec<LowerChamberMember>),
    UpperChamber(Vec<UpperChamberMember>),
    EuParliament(Vec<EuMember>),
}

impl TierListing {
    pub fn len(&self) -> usize {
        match self {
            TierListing::LowerChamber(rows) => rows.len(),
            TierListing::UpperChamber(rows) => rows.len(),
            TierListing::EuParliament(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolution engine over an immutable reference store
#[derive(Debug, Clone)]
pub struct CivicEngine {
    store: Arc<ReferenceStore>,
    tie_break: TieBreak,
}

impl CivicEngine {
    pub fn new(store: Arc<ReferenceStore>) -> Self {
        CivicEngine {
            store,
            tie_break: TieBreak::default(),
        }
    }

    /// Builder pattern: choose the tie-break policy
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn stats(&self) -> &StoreStats {
        self.store.stats()
    }

    pub fn resolve(&self, query: &str) -> Result<&Municipality, QueryError> {
        resolver::resolve(&self.store, query, self.tie_break)
    }

    pub fn lower_chamber_reps(&self, municipality_code: &str) -> Vec<LowerChamberMember> {
        tiers::lower_chamber_reps(&self.store, municipality_code)
    }

    pub fn upper_chamber_reps(&self, region: &str) -> Vec<UpperChamberMember> {
        tiers::upper_chamber_reps(&self.store, region)
    }

    pub fn eu_reps(&self, region: &str) -> Vec<EuMember> {
        tiers::eu_reps(&self.store, region)
    }

    /// Resolve the query, then fan out to the three tiers
    pub fn lookup(&self, query: &str) -> LookupResult {
        let resolved = resolver::resolve_with_phase(&self.store, query, self.tie_break);
        let (municipality, matched_by) = match resolved {
            Ok(found) => found,
            Err(_) => {
                return LookupResult::NotFound {
                    original_query: query.to_string(),
                }
            }
        };

        // The three mappers share nothing but the read-only store
        let (lower_chamber_reps, (upper_chamber_reps, eu_reps)) = rayon::join(
            || self.lower_chamber_reps(&municipality.code),
            || {
                rayon::join(
                    || self.upper_chamber_reps(&municipality.region),
                    || self.eu_reps(&municipality.region),
                )
            },
        );

        let counts = TierCounts::new(
            lower_chamber_reps.len(),
            upper_chamber_reps.len(),
            eu_reps.len(),
        );

        debug!(
            query,
            code = %municipality.code,
            matched_by = ?matched_by,
            total = counts.total,
            "lookup complete"
        );

        LookupResult::Success {
            municipality: municipality.clone(),
            matched_by,
            districts: Districts {
                lower_chamber: self
                    .store
                    .lower_district(&municipality.code)
                    .map(|d| d.district_id.clone()),
                upper_chamber: self
                    .store
                    .upper_district(&municipality.code)
                    .map(|d| d.district_id.clone()),
            },
            lower_chamber_reps,
            upper_chamber_reps,
            eu_reps,
            counts,
        }
    }

    pub fn suggest(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>, QueryError> {
        autocomplete::suggest(&self.store, query, limit, self.tie_break)
    }

    /// Every representative of one tier, in table order
    pub fn representatives(&self, tier: Tier) -> TierListing {
        match tier {
            Tier::LowerChamber => TierListing::LowerChamber(self.store.lower_members().to_vec()),
            Tier::UpperChamber => TierListing::UpperChamber(self.store.upper_members().to_vec()),
            Tier::EuParliament => TierListing::EuParliament(self.store.eu_members().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::sample_store;

    fn engine() -> CivicEngine {
        CivicEngine::new(Arc::new(sample_store()))
    }

    #[test]
    fn test_lookup_roma() {
        let engine = engine();
        let result = engine.lookup("Roma");

        match result {
            LookupResult::Success {
                municipality,
                matched_by,
                districts,
                lower_chamber_reps,
                upper_chamber_reps,
                eu_reps,
                counts,
            } => {
                assert_eq!(municipality.code, "058091");
                assert_eq!(matched_by, MatchPhase::Exact);
                assert_eq!(districts.lower_chamber.as_deref(), Some("LAZIO-P01"));
                assert_eq!(districts.upper_chamber.as_deref(), Some("LAZIO-U01"));
                assert_eq!(lower_chamber_reps.len(), 2);
                assert_eq!(upper_chamber_reps.len(), 2);
                assert_eq!(eu_reps.len(), 2);
                assert_eq!(counts, TierCounts::new(2, 2, 2));
                assert_eq!(counts.total, 6);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_counts_add_up() {
        let engine = engine();
        for q in ["Roma", "Milano", "Genova", "Agliè", "Atlantide", "fiumi", "castello"] {
            if let LookupResult::Success {
                lower_chamber_reps,
                upper_chamber_reps,
                eu_reps,
                counts,
                ..
            } = engine.lookup(q)
            {
                assert_eq!(
                    counts.total,
                    lower_chamber_reps.len() + upper_chamber_reps.len() + eu_reps.len()
                );
                assert_eq!(counts.lower_chamber, lower_chamber_reps.len());
            } else {
                panic!("{} should resolve", q);
            }
        }
    }

    #[test]
    fn test_lookup_partial_gaps_do_not_block_other_tiers() {
        let engine = engine();
        // Genova: tokenless district, no senators, but Nord-occidentale MEPs
        let counts = engine.lookup("Genova").counts().unwrap();
        assert_eq!(counts.lower_chamber, 0);
        assert_eq!(counts.upper_chamber, 0);
        assert_eq!(counts.eu_parliament, 1);

        // Atlantide: region in no constituency
        let counts = engine.lookup("Atlantide").counts().unwrap();
        assert_eq!(counts.total, 0);
    }

    #[test]
    fn test_lookup_reports_substring_match() {
        let engine = engine();
        match engine.lookup("magnano") {
            LookupResult::Success {
                municipality,
                matched_by,
                ..
            } => {
                assert_eq!(municipality.name, "Romagnano Sesia");
                assert_eq!(matched_by, MatchPhase::Contains);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_not_found_keeps_query() {
        let engine = engine();
        assert_eq!(
            engine.lookup("Gotham"),
            LookupResult::NotFound {
                original_query: "Gotham".to_string()
            }
        );
        assert!(!engine.lookup("").is_success());
    }

    #[test]
    fn test_lookup_matches_sequential_evaluation() {
        let engine = engine();
        let m = engine.resolve("Milano").unwrap().clone();

        if let LookupResult::Success {
            lower_chamber_reps,
            upper_chamber_reps,
            eu_reps,
            ..
        } = engine.lookup("Milano")
        {
            assert_eq!(lower_chamber_reps, engine.lower_chamber_reps(&m.code));
            assert_eq!(upper_chamber_reps, engine.upper_chamber_reps(&m.region));
            assert_eq!(eu_reps, engine.eu_reps(&m.region));
        } else {
            panic!("Milano should resolve");
        }
    }

    #[test]
    fn test_concurrent_lookups() {
        let engine = engine();
        let expected = engine.lookup("Roma");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.lookup("Roma"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_tie_break_is_configurable() {
        let engine = engine().with_tie_break(TieBreak::Alphabetical);
        assert_eq!(engine.tie_break(), TieBreak::Alphabetical);
        assert_eq!(engine.resolve("Castello d'Agogna").unwrap().province, "AL");
        assert_eq!(engine.suggest("castello d", 1).unwrap()[0].province, "AL");
    }

    #[test]
    fn test_representatives_by_tier() {
        let engine = engine();
        assert_eq!(engine.representatives(Tier::LowerChamber).len(), 4);
        assert_eq!(engine.representatives(Tier::UpperChamber).len(), 3);
        assert_eq!(engine.representatives(Tier::EuParliament).len(), 3);
    }

    #[test]
    fn test_lookup_serializes_with_outcome_tag() {
        let engine = engine();
        let json = serde_json::to_value(engine.lookup("Roma")).unwrap();
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["municipality"]["comune"], "Roma");
        assert_eq!(json["counts"]["total"], 6);
        assert_eq!(json["matched_by"], "exact");

        let json = serde_json::to_value(engine.lookup("Gotham")).unwrap();
        assert_eq!(json["outcome"], "not_found");
        assert_eq!(json["original_query"], "Gotham");
    }
}
