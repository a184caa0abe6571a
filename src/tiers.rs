// Tier Mappers
// One join strategy per institutional tier, because each source dataset
// encodes geography differently. Gaps always degrade to an empty list.

use crate::model::{EuMember, LowerChamberMember, UpperChamberMember};
use crate::normalize::{fold, label_in_region, region_token};
use crate::store::ReferenceStore;
use tracing::debug;

/// Deputati for a municipality
///
/// municipality code → district id ("LAZIO-P01") → region token ("LAZIO")
/// → every member whose district label starts with the token. Over-matches
/// to the whole region when labels carry finer sub-districts.
pub fn lower_chamber_reps(store: &ReferenceStore, municipality_code: &str) -> Vec<LowerChamberMember> {
    let Some(district) = store.lower_district(municipality_code) else {
        debug!(code = municipality_code, "no lower-chamber district");
        return Vec::new();
    };

    let Some(token) = region_token(&district.district_id) else {
        debug!(district = %district.district_id, "district id has no region token");
        return Vec::new();
    };

    store
        .lower_members()
        .iter()
        .filter(|m| label_in_region(&m.district_label, &token))
        .cloned()
        .collect()
}

/// Senatori for a region (case-insensitive equality on the region field)
pub fn upper_chamber_reps(store: &ReferenceStore, region: &str) -> Vec<UpperChamberMember> {
    let wanted = fold(region);
    if wanted.is_empty() {
        return Vec::new();
    }

    store
        .upper_members()
        .iter()
        .filter(|m| fold(&m.region) == wanted)
        .cloned()
        .collect()
}

/// MEPs for a region: region → constituency → members of that constituency
pub fn eu_reps(store: &ReferenceStore, region: &str) -> Vec<EuMember> {
    let Some(constituency) = store.grouping().constituency_for(region) else {
        debug!(region, "region not in any EU constituency");
        return Vec::new();
    };

    let wanted = fold(constituency);
    store
        .eu_members()
        .iter()
        .filter(|m| fold(&m.constituency) == wanted)
        .cloned()
        .collect()
}
