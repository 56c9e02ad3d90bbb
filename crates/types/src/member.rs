use serde::{Deserialize, Serialize};

/// The organizational unit a member is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Constituency,
    Mandal,
    Panchayat,
}

impl UnitType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Constituency => "constituency",
            UnitType::Mandal => "mandal",
            UnitType::Panchayat => "panchayat",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "constituency" => Ok(UnitType::Constituency),
            "mandal" => Ok(UnitType::Mandal),
            "panchayat" => Ok(UnitType::Panchayat),
            other => Err(format!("unknown unit type: {other}")),
        }
    }
}

/// A party member attached to a unit in the hierarchy.
///
/// Every field except `id`, `name`, `unit_type` and `unit_id` is optional
/// free text; bulk imports leave unknown columns empty rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub unit_type: Option<UnitType>,
    #[serde(default)]
    pub unit_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub voter_id: String,
    #[serde(default)]
    pub village: String,
    #[serde(default)]
    pub party_position: String,
    #[serde(default)]
    pub present_city: String,
    #[serde(default)]
    pub present_area: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub working: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub caste: String,
    #[serde(default)]
    pub join_date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Member {
    /// New member with a fresh id and the given name; everything else empty.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Member {
            id: crate::new_id(),
            name: name.trim().to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_type_round_trip() {
        for unit in [UnitType::Constituency, UnitType::Mandal, UnitType::Panchayat] {
            assert_eq!(unit.as_str().parse::<UnitType>(), Ok(unit));
        }
        assert!(" Mandal ".parse::<UnitType>().is_ok());
        assert!("ward".parse::<UnitType>().is_err());
    }

    #[test]
    fn test_member_json_defaults() {
        let m: Member =
            serde_json::from_str(r#"{"id":"m1","name":"Ravi","unit_type":"mandal"}"#).unwrap();
        assert_eq!(m.unit_type, Some(UnitType::Mandal));
        assert!(m.phone.is_empty());
        assert!(m.tags.is_empty());
    }

    #[test]
    fn test_new_trims_name() {
        let m = Member::new("  Lakshmi ");
        assert_eq!(m.name, "Lakshmi");
        assert!(!m.id.is_empty());
    }
}
