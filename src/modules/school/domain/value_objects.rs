use serde::{Deserialize, Serialize};
use std::fmt;

/// Institution type as stored in the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchoolType {
    #[default]
    #[serde(rename = "podstawowa")]
    Primary,
    #[serde(rename = "liceum")]
    HighSchool,
    #[serde(rename = "technikum")]
    Technical,
    #[serde(rename = "branzowa")]
    Vocational,
    #[serde(rename = "przedszkole")]
    Kindergarten,
    #[serde(rename = "inna")]
    Other,
}

impl SchoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolType::Primary => "podstawowa",
            SchoolType::HighSchool => "liceum",
            SchoolType::Technical => "technikum",
            SchoolType::Vocational => "branzowa",
            SchoolType::Kindergarten => "przedszkole",
            SchoolType::Other => "inna",
        }
    }

    /// Recognize a type from a free-form label or a school name
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("przedszkol") {
            Some(SchoolType::Kindergarten)
        } else if label.contains("podstawow") {
            Some(SchoolType::Primary)
        } else if label.contains("liceum") {
            Some(SchoolType::HighSchool)
        } else if label.contains("technikum") {
            Some(SchoolType::Technical)
        } else if label.contains("branżow") || label.contains("zawodow") {
            Some(SchoolType::Vocational)
        } else {
            None
        }
    }
}

impl fmt::Display for SchoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_polish_labels() {
        assert_eq!(SchoolType::from_label("Szkoła podstawowa"), Some(SchoolType::Primary));
        assert_eq!(
            SchoolType::from_label("Liceum Ogólnokształcące nr 3"),
            Some(SchoolType::HighSchool)
        );
        assert_eq!(
            SchoolType::from_label("Branżowa szkoła I stopnia"),
            Some(SchoolType::Vocational)
        );
        assert_eq!(
            SchoolType::from_label("Przedszkole przy Szkole Podstawowej"),
            Some(SchoolType::Kindergarten)
        );
        assert_eq!(SchoolType::from_label("Poradnia psychologiczna"), None);
    }

    #[test]
    fn defaults_to_primary() {
        assert_eq!(SchoolType::default(), SchoolType::Primary);
        assert_eq!(SchoolType::default().to_string(), "podstawowa");
    }
}
