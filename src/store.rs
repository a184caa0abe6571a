// Reference Data Store
// Built once during the load phase, then shared read-only (Arc) by every query.

use crate::constituency::{ConstituencyGrouping, GroupingGap};
use crate::error::{LoadError, LoadResult};
use crate::model::{
    EuMember, LowerChamberDistrict, LowerChamberMember, Municipality, UpperChamberDistrict,
    UpperChamberMember,
};
use crate::normalize::{fold, region_token};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

/// Raw tables as produced by a loader (CSV directory or SQLite)
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub municipalities: Vec<Municipality>,
    pub lower_districts: Vec<LowerChamberDistrict>,
    pub upper_districts: Vec<UpperChamberDistrict>,
    pub lower_members: Vec<LowerChamberMember>,
    pub upper_members: Vec<UpperChamberMember>,
    pub eu_members: Vec<EuMember>,
}

/// Integrity findings of the load phase. None of them is fatal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    /// Regions used by municipalities but not in exactly one constituency
    pub grouping_gaps: Vec<GroupingGap>,
    /// Lower-chamber district ids with no region token
    pub tokenless_districts: Vec<String>,
    /// District rows whose municipality code is not in the municipality table
    pub orphan_district_rows: usize,
    /// Extra district rows for a code already seen (first row wins)
    pub duplicate_district_rows: usize,
    /// Senator regions that match no municipality region
    pub unmatched_member_regions: Vec<String>,
    /// MEP constituencies that are not in the grouping
    pub unknown_eu_constituencies: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.grouping_gaps.is_empty()
            && self.tokenless_districts.is_empty()
            && self.orphan_district_rows == 0
            && self.duplicate_district_rows == 0
            && self.unmatched_member_regions.is_empty()
            && self.unknown_eu_constituencies.is_empty()
    }
}

/// Row counts and identity of the loaded data
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub municipalities: usize,
    pub lower_districts: usize,
    pub upper_districts: usize,
    pub lower_members: usize,
    pub upper_members: usize,
    pub eu_members: usize,
    pub loaded_at: DateTime<Utc>,
    pub fingerprint: String,
}

/// Immutable in-memory reference data
#[derive(Debug)]
pub struct ReferenceStore {
    municipalities: Vec<Municipality>,
    lower_districts: HashMap<String, LowerChamberDistrict>,
    upper_districts: HashMap<String, UpperChamberDistrict>,
    lower_members: Vec<LowerChamberMember>,
    upper_members: Vec<UpperChamberMember>,
    eu_members: Vec<EuMember>,
    grouping: ConstituencyGrouping,
    integrity: IntegrityReport,
    stats: StoreStats,
}

impl ReferenceStore {
    /// Build the store with the Italian constituency grouping
    pub fn build(tables: ReferenceTables) -> LoadResult<Self> {
        Self::build_with_grouping(tables, ConstituencyGrouping::italian())
    }

    /// Build the store, failing when municipality codes are not unique
    pub fn build_with_grouping(
        tables: ReferenceTables,
        grouping: ConstituencyGrouping,
    ) -> LoadResult<Self> {
        let mut codes: HashSet<&str> = HashSet::with_capacity(tables.municipalities.len());
        for m in &tables.municipalities {
            if m.code.is_empty() {
                return Err(LoadError::Integrity(format!(
                    "municipality '{}' has an empty code",
                    m.name
                )));
            }
            if !codes.insert(m.code.as_str()) {
                return Err(LoadError::Integrity(format!(
                    "duplicate municipality code {}",
                    m.code
                )));
            }
        }

        let mut integrity = IntegrityReport::default();

        let mut lower_districts = HashMap::new();
        for row in &tables.lower_districts {
            if !codes.contains(row.municipality_code.as_str()) {
                integrity.orphan_district_rows += 1;
            }
            if region_token(&row.district_id).is_none()
                && !integrity.tokenless_districts.contains(&row.district_id)
            {
                integrity.tokenless_districts.push(row.district_id.clone());
            }
            if lower_districts.contains_key(&row.municipality_code) {
                integrity.duplicate_district_rows += 1;
            } else {
                lower_districts.insert(row.municipality_code.clone(), row.clone());
            }
        }

        let mut upper_districts = HashMap::new();
        for row in &tables.upper_districts {
            if !codes.contains(row.municipality_code.as_str()) {
                integrity.orphan_district_rows += 1;
            }
            if upper_districts.contains_key(&row.municipality_code) {
                integrity.duplicate_district_rows += 1;
            } else {
                upper_districts.insert(row.municipality_code.clone(), row.clone());
            }
        }

        integrity.grouping_gaps =
            grouping.integrity_gaps(tables.municipalities.iter().map(|m| m.region.as_str()));

        let regions: HashSet<String> =
            tables.municipalities.iter().map(|m| fold(&m.region)).collect();
        for member in &tables.upper_members {
            let key = fold(&member.region);
            if !regions.contains(&key)
                && !integrity.unmatched_member_regions.iter().any(|r| fold(r) == key)
            {
                integrity.unmatched_member_regions.push(member.region.clone());
            }
        }

        for member in &tables.eu_members {
            let key = fold(&member.constituency);
            let known = grouping.constituencies().iter().any(|c| fold(&c.name) == key);
            if !known && !integrity.unknown_eu_constituencies.iter().any(|c| fold(c) == key) {
                integrity.unknown_eu_constituencies.push(member.constituency.clone());
            }
        }

        for gap in &integrity.grouping_gaps {
            warn!(
                region = %gap.region,
                constituencies = ?gap.constituencies,
                "region is not in exactly one EU constituency"
            );
        }
        for id in &integrity.tokenless_districts {
            warn!(district = %id, "lower-chamber district id has no region token");
        }
        for region in &integrity.unmatched_member_regions {
            warn!(region = %region, "senator region matches no municipality");
        }
        for name in &integrity.unknown_eu_constituencies {
            warn!(constituency = %name, "MEP constituency is not in the grouping");
        }
        if integrity.orphan_district_rows > 0 {
            warn!(
                rows = integrity.orphan_district_rows,
                "district rows reference unknown municipalities"
            );
        }

        let stats = StoreStats {
            municipalities: tables.municipalities.len(),
            lower_districts: lower_districts.len(),
            upper_districts: upper_districts.len(),
            lower_members: tables.lower_members.len(),
            upper_members: tables.upper_members.len(),
            eu_members: tables.eu_members.len(),
            loaded_at: Utc::now(),
            fingerprint: fingerprint(&tables),
        };

        info!(
            municipalities = stats.municipalities,
            lower_districts = stats.lower_districts,
            upper_districts = stats.upper_districts,
            deputati = stats.lower_members,
            senatori = stats.upper_members,
            mep = stats.eu_members,
            "reference data loaded"
        );

        Ok(ReferenceStore {
            municipalities: tables.municipalities,
            lower_districts,
            upper_districts,
            lower_members: tables.lower_members,
            upper_members: tables.upper_members,
            eu_members: tables.eu_members,
            grouping,
            integrity,
            stats,
        })
    }

    /// Municipalities in table order
    pub fn municipalities(&self) -> &[Municipality] {
        &self.municipalities
    }

    pub fn lower_district(&self, municipality_code: &str) -> Option<&LowerChamberDistrict> {
        self.lower_districts.get(municipality_code)
    }

    pub fn upper_district(&self, municipality_code: &str) -> Option<&UpperChamberDistrict> {
        self.upper_districts.get(municipality_code)
    }

    pub fn lower_members(&self) -> &[LowerChamberMember] {
        &self.lower_members
    }

    pub fn upper_members(&self) -> &[UpperChamberMember] {
        &self.upper_members
    }

    pub fn eu_members(&self) -> &[EuMember] {
        &self.eu_members
    }

    pub fn grouping(&self) -> &ConstituencyGrouping {
        &self.grouping
    }

    pub fn integrity(&self) -> &IntegrityReport {
        &self.integrity
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Copy the data back out as plain tables (district rows in code order)
    pub fn to_tables(&self) -> ReferenceTables {
        let mut lower_districts: Vec<LowerChamberDistrict> =
            self.lower_districts.values().cloned().collect();
        lower_districts.sort_by(|a, b| a.municipality_code.cmp(&b.municipality_code));

        let mut upper_districts: Vec<UpperChamberDistrict> =
            self.upper_districts.values().cloned().collect();
        upper_districts.sort_by(|a, b| a.municipality_code.cmp(&b.municipality_code));

        ReferenceTables {
            municipalities: self.municipalities.clone(),
            lower_districts,
            upper_districts,
            lower_members: self.lower_members.clone(),
            upper_members: self.upper_members.clone(),
            eu_members: self.eu_members.clone(),
        }
    }
}

/// Content hash over every table, in table order
fn fingerprint(tables: &ReferenceTables) -> String {
    let mut hasher = Sha256::new();

    fn feed<T: Serialize>(hasher: &mut Sha256, label: &str, rows: &[T]) {
        hasher.update(label.as_bytes());
        for row in rows {
            // Serializing plain string records cannot fail
            if let Ok(line) = serde_json::to_string(row) {
                hasher.update(line.as_bytes());
                hasher.update(b"\n");
            }
        }
    }

    feed(&mut hasher, "comuni", &tables.municipalities);
    feed(&mut hasher, "collegi_camera", &tables.lower_districts);
    feed(&mut hasher, "collegi_senato", &tables.upper_districts);
    feed(&mut hasher, "deputati", &tables.lower_members);
    feed(&mut hasher, "senatori", &tables.upper_members);
    feed(&mut hasher, "mep", &tables.eu_members);

    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TEST FIXTURES
// ============================================================================
