// Tie-break policy for municipalities that match a query equally well
// (same resolver phase, same autocomplete score).

use crate::model::Municipality;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the reference table's natural order
    #[default]
    TableOrder,

    /// Name, then province code
    Alphabetical,
}

impl TieBreak {
    /// Ordering between two equally-scored municipalities.
    /// `Equal` under `TableOrder`, so stable sorts keep table order.
    pub fn compare(&self, a: &Municipality, b: &Municipality) -> Ordering {
        match self {
            TieBreak::TableOrder => Ordering::Equal,
            TieBreak::Alphabetical => a
                .name
                .to_uppercase()
                .cmp(&b.name.to_uppercase())
                .then_with(|| a.province.cmp(&b.province)),
        }
    }

    /// Pick the preferred candidate; candidates arrive in table order
    pub fn pick<'a, I>(&self, candidates: I) -> Option<&'a Municipality>
    where
        I: IntoIterator<Item = &'a Municipality>,
    {
        let mut iter = candidates.into_iter();
        match self {
            TieBreak::TableOrder => iter.next(),
            // min_by returns the first of several equal minima
            TieBreak::Alphabetical => iter.min_by(|a, b| self.compare(a, b)),
        }
    }
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "table_order" => Ok(TieBreak::TableOrder),
            "alphabetical" | "alpha" => Ok(TieBreak::Alphabetical),
            other => Err(format!(
                "Unknown tie-break policy '{}' (expected 'table' or 'alphabetical')",
                other
            )),
        }
    }
}
