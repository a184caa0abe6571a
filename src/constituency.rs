// EU constituency grouping
// Five fixed constituencies covering the twenty Italian regions.

use crate::normalize::fold;
use serde::Serialize;

/// One EU constituency and the regions it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constituency {
    pub name: String,
    pub regions: Vec<String>,
}

impl Constituency {
    fn new(name: &str, regions: &[&str]) -> Self {
        Constituency {
            name: name.to_string(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Region comparison is done on folded text
    pub fn contains(&self, region: &str) -> bool {
        let wanted = fold(region);
        self.regions.iter().any(|r| fold(r) == wanted)
    }
}

/// Region → constituency mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstituencyGrouping {
    constituencies: Vec<Constituency>,
}

/// A region that is in zero or in several constituencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupingGap {
    pub region: String,
    pub constituencies: Vec<String>,
}

impl ConstituencyGrouping {
    /// Grouping used for European Parliament elections in Italy
    pub fn italian() -> Self {
        ConstituencyGrouping {
            constituencies: vec![
                Constituency::new(
                    "Nord-occidentale",
                    &["Piemonte", "Valle d'Aosta", "Liguria", "Lombardia"],
                ),
                Constituency::new(
                    "Nord-orientale",
                    &["Veneto", "Trentino-Alto Adige", "Friuli-Venezia Giulia", "Emilia-Romagna"],
                ),
                Constituency::new("Centrale", &["Toscana", "Umbria", "Marche", "Lazio"]),
                Constituency::new(
                    "Meridionale",
                    &["Abruzzo", "Molise", "Campania", "Puglia", "Basilicata", "Calabria"],
                ),
                Constituency::new("Insulare", &["Sicilia", "Sardegna"]),
            ],
        }
    }

    pub fn constituencies(&self) -> &[Constituency] {
        &self.constituencies
    }

    /// First constituency containing the region, if any
    pub fn constituency_for(&self, region: &str) -> Option<&str> {
        self.constituencies
            .iter()
            .find(|c| c.contains(region))
            .map(|c| c.name.as_str())
    }

    /// Regions that are not in exactly one constituency
    pub fn integrity_gaps<'a, I>(&self, regions: I) -> Vec<GroupingGap>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: Vec<String> = Vec::new();
        let mut gaps = Vec::new();

        for region in regions {
            let key = fold(region);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);

            let owners: Vec<String> = self
                .constituencies
                .iter()
                .filter(|c| c.contains(region))
                .map(|c| c.name.clone())
                .collect();

            if owners.len() != 1 {
                gaps.push(GroupingGap {
                    region: region.to_string(),
                    constituencies: owners,
                });
            }
        }

        gaps
    }
}

impl Default for ConstituencyGrouping {
    fn default() -> Self {
        Self::italian()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_regions_five_constituencies() {
        let grouping = ConstituencyGrouping::italian();
        let total: usize = grouping.constituencies().iter().map(|c| c.regions.len()).sum();

        assert_eq!(grouping.constituencies().len(), 5);
        assert_eq!(total, 20);

        let all: Vec<&str> = grouping
            .constituencies()
            .iter()
            .flat_map(|c| c.regions.iter().map(|r| r.as_str()))
            .collect();
        assert!(grouping.integrity_gaps(all).is_empty());
    }

    #[test]
    fn test_constituency_for_region() {
        let grouping = ConstituencyGrouping::italian();

        assert_eq!(grouping.constituency_for("Lazio"), Some("Centrale"));
        assert_eq!(grouping.constituency_for("LAZIO"), Some("Centrale"));
        assert_eq!(grouping.constituency_for("Valle d'Aosta"), Some("Nord-occidentale"));
        assert_eq!(grouping.constituency_for("Sardegna"), Some("Insulare"));
        assert_eq!(grouping.constituency_for("Bavaria"), None);
        assert_eq!(grouping.constituency_for(""), None);
    }

    #[test]
    fn test_integrity_gaps_reports_unknown_region_once() {
        let grouping = ConstituencyGrouping::italian();
        let gaps = grouping.integrity_gaps(vec!["Lazio", "Valle d'Aosta/Vallée d'Aoste", "VALLE D'AOSTA/VALLÉE D'AOSTE"]);

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].region, "Valle d'Aosta/Vallée d'Aoste");
        assert!(gaps[0].constituencies.is_empty());
    }

    #[test]
    fn test_integrity_gaps_reports_overlap() {
        let mut grouping = ConstituencyGrouping::italian();
        grouping.constituencies.push(Constituency::new("Test", &["Lazio"]));

        let gaps = grouping.integrity_gaps(vec!["Lazio"]);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].constituencies, vec!["Centrale".to_string(), "Test".to_string()]);
    }
}
