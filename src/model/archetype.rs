use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule-assigned playing-style category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeLabel {
    #[serde(rename = "Bench Player")]
    BenchPlayer,
    #[serde(rename = "All Star")]
    AllStar,
    #[serde(rename = "Defensive Specialist")]
    DefensiveSpecialist,
    #[serde(rename = "3PT Specialist")]
    ThreePointSpecialist,
    #[serde(rename = "Role Player")]
    RolePlayer,
}

impl ArchetypeLabel {
    pub const ALL: [ArchetypeLabel; 5] = [
        ArchetypeLabel::BenchPlayer,
        ArchetypeLabel::AllStar,
        ArchetypeLabel::DefensiveSpecialist,
        ArchetypeLabel::ThreePointSpecialist,
        ArchetypeLabel::RolePlayer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArchetypeLabel::BenchPlayer => "Bench Player",
            ArchetypeLabel::AllStar => "All Star",
            ArchetypeLabel::DefensiveSpecialist => "Defensive Specialist",
            ArchetypeLabel::ThreePointSpecialist => "3PT Specialist",
            ArchetypeLabel::RolePlayer => "Role Player",
        }
    }
}

impl fmt::Display for ArchetypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
