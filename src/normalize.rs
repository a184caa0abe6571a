// Text normalization shared by every matcher
//
// The district table and the member table encode the same lower-chamber
// geography differently ("LAZIO-P01" vs "LAZIO 1 - P01"). The only common
// ground is the region token. Both sides go through the functions below so
// format drift in either source shows up in these tests first.

/// Bump when the district-id → region-token rule changes
pub const REGION_TOKEN_VERSION: u32 = 1;

/// Queries shorter than this (in characters, after trimming) never match.
/// Applies to the resolver and the autocomplete ranker alike.
pub const MIN_QUERY_CHARS: usize = 2;

/// Comparison form: trimmed, upper-cased
pub fn fold(text: &str) -> String {
    text.trim().to_uppercase()
}

/// True when the trimmed query is long enough to be matched
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Extract the region token from a lower-chamber district identifier
///
/// "LAZIO-P01" → "LAZIO". An identifier without `-` is a token as a whole.
/// Returns None when nothing precedes the first `-` (data integrity gap).
pub fn region_token(district_id: &str) -> Option<String> {
    let head = district_id.split('-').next().unwrap_or_default();
    let token = fold(head);
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Does a member's free-text district label belong to the region token?
///
/// Loose by construction: "LAZIO 1 - P01" and "LAZIO 2 - U03" both match "LAZIO".
pub fn label_in_region(label: &str, token: &str) -> bool {
    !token.is_empty() && fold(label).starts_with(token)
}
