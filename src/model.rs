// Reference data records
// Column names follow the government-derived CSV files; every text field is trimmed on load.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Empty cells and missing columns both become empty strings
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).unwrap_or_default())
}

// ============================================================================
// GEOGRAPHY
// ============================================================================

/// Municipality (comune) - the unit users query by
///
/// `code` is the ISTAT code and unique across the table; `name` is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    #[serde(rename = "istat_comune", deserialize_with = "trimmed")]
    pub code: String,

    #[serde(rename = "comune", deserialize_with = "trimmed")]
    pub name: String,

    #[serde(rename = "provincia", default, deserialize_with = "trimmed")]
    pub province: String,

    #[serde(rename = "regione", default, deserialize_with = "trimmed")]
    pub region: String,
}

impl Municipality {
    pub fn new(code: &str, name: &str, province: &str, region: &str) -> Self {
        Municipality {
            code: code.to_string(),
            name: name.to_string(),
            province: province.to_string(),
            region: region.to_string(),
        }
    }

    /// "Roma (RM) - Lazio"
    pub fn display(&self) -> String {
        format!("{} ({}) - {}", self.name, self.province, self.region)
    }
}

/// Row of the lower-chamber district table (collegi_camera.csv)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowerChamberDistrict {
    #[serde(rename = "istat_comune", deserialize_with = "trimmed")]
    pub municipality_code: String,

    #[serde(rename = "collegio_camera_id", deserialize_with = "trimmed")]
    pub district_id: String,

    #[serde(rename = "collegio_camera_nome", default, deserialize_with = "trimmed")]
    pub district_name: String,
}

/// Row of the upper-chamber district table (collegi_senato.csv)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpperChamberDistrict {
    #[serde(rename = "istat_comune", deserialize_with = "trimmed")]
    pub municipality_code: String,

    #[serde(rename = "collegio_senato_id", deserialize_with = "trimmed")]
    pub district_id: String,

    #[serde(rename = "collegio_senato_nome", default, deserialize_with = "trimmed")]
    pub district_name: String,
}

// ============================================================================
// REPRESENTATIVES
// ============================================================================

/// Deputato
///
/// `district_label` is free text such as "LAZIO 1 - P01", not a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowerChamberMember {
    #[serde(rename = "nome", default, deserialize_with = "trimmed")]
    pub name: String,

    #[serde(rename = "cognome", default, deserialize_with = "trimmed")]
    pub surname: String,

    #[serde(rename = "gruppo_partito", default, deserialize_with = "trimmed")]
    pub party: String,

    #[serde(rename = "collegio", default, deserialize_with = "trimmed")]
    pub district_label: String,

    #[serde(
        rename(serialize = "email", deserialize = "email_istituzionale"),
        default,
        deserialize_with = "trimmed"
    )]
    pub email: String,

    #[serde(
        rename(serialize = "form_url", deserialize = "form_contatti_url"),
        default,
        deserialize_with = "trimmed"
    )]
    pub form_url: String,
}

/// Senatore - carries a clean region field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpperChamberMember {
    #[serde(rename = "nome", default, deserialize_with = "trimmed")]
    pub name: String,

    #[serde(rename = "cognome", default, deserialize_with = "trimmed")]
    pub surname: String,

    #[serde(rename = "gruppo_partito", default, deserialize_with = "trimmed")]
    pub party: String,

    #[serde(rename = "regione", default, deserialize_with = "trimmed")]
    pub region: String,

    #[serde(
        rename(serialize = "email", deserialize = "email_istituzionale"),
        default,
        deserialize_with = "trimmed"
    )]
    pub email: String,

    #[serde(rename = "sito_ufficiale", default, deserialize_with = "trimmed")]
    pub website: String,
}

/// Member of the European Parliament elected in Italy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EuMember {
    #[serde(rename = "nome", default, deserialize_with = "trimmed")]
    pub name: String,

    #[serde(rename = "cognome", default, deserialize_with = "trimmed")]
    pub surname: String,

    #[serde(rename = "gruppo_partito", default, deserialize_with = "trimmed")]
    pub party: String,

    #[serde(rename = "circoscrizione_eu", default, deserialize_with = "trimmed")]
    pub constituency: String,

    #[serde(
        rename(serialize = "email", deserialize = "email_istituzionale"),
        default,
        deserialize_with = "trimmed"
    )]
    pub email: String,

    #[serde(
        rename(serialize = "form_url", deserialize = "form_contatti_url"),
        default,
        deserialize_with = "trimmed"
    )]
    pub form_url: String,
}

// ============================================================================
// TIER
// ============================================================================

/// Institutional tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    LowerChamber,
    UpperChamber,
    EuParliament,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::LowerChamber, Tier::UpperChamber, Tier::EuParliament];

    /// Institution name for display
    pub fn institution(&self) -> &'static str {
        match self {
            Tier::LowerChamber => "Camera dei Deputati",
            Tier::UpperChamber => "Senato della Repubblica",
            Tier::EuParliament => "Parlamento Europeo",
        }
    }

    /// Short code used on the command line and in URLs
    pub fn code(&self) -> &'static str {
        match self {
            Tier::LowerChamber => "camera",
            Tier::UpperChamber => "senato",
            Tier::EuParliament => "eu",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.code() == key)
            .ok_or_else(|| {
                let codes: Vec<&str> = Tier::ALL.iter().map(|t| t.code()).collect();
                format!("Invalid level '{}'. Must be one of: {}", key, codes.join(", "))
            })
    }
}
