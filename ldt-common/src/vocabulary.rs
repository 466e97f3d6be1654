//! Controlled vocabularies
//!
//! Every enumerated column in the store holds the canonical text of one of
//! these values. Free text from spreadsheets is mapped onto them by the import
//! normalizers; once a record is past ingestion it never carries raw text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A closed set of values with a canonical text form
pub trait Vocabulary: Copy + Sized + 'static {
    /// Name used in error messages
    const NAME: &'static str;

    /// Every value, in declaration order
    const ALL: &'static [Self];

    /// Canonical text stored in the database
    fn as_str(self) -> &'static str;

    /// Human-readable label (defaults to the canonical text)
    fn label(self) -> &'static str {
        self.as_str()
    }

    /// Exact match against the canonical text
    fn from_literal(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == text)
    }
}

fn parse_literal<T: Vocabulary>(s: &str) -> Result<T, Error> {
    T::from_literal(s)
        .ok_or_else(|| Error::InvalidInput(format!("unknown {} value: {:?}", T::NAME, s)))
}

/// Kind of legislative text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LawKind {
    /// Government bill
    #[serde(rename = "ProjetDeLoi")]
    ProjetDeLoi,
    /// Private member's bill
    #[serde(rename = "PropositionDeLoi")]
    PropositionDeLoi,
}

impl Vocabulary for LawKind {
    const NAME: &'static str = "law kind";
    const ALL: &'static [Self] = &[Self::ProjetDeLoi, Self::PropositionDeLoi];

    fn as_str(self) -> &'static str {
        match self {
            Self::ProjetDeLoi => "ProjetDeLoi",
            Self::PropositionDeLoi => "PropositionDeLoi",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::ProjetDeLoi => "Projet de loi",
            Self::PropositionDeLoi => "Proposition de loi",
        }
    }
}

/// Parliamentary status of a draft law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LawStatus {
    #[serde(rename = "Avise Par Conference Presidé")]
    AviseParConferencePreside,
    #[serde(rename = "Created")]
    Created,
    #[serde(rename = "En Attente Dispense Second")]
    EnAttenteDispenseSecond,
    #[serde(rename = "En Commission")]
    EnCommission,
    #[serde(rename = "Evacue Conjointement")]
    EvacueConjointement,
    #[serde(rename = "Fusionne")]
    Fusionne,
    #[serde(rename = "Publie")]
    Publie,
    #[serde(rename = "Retired")]
    Retire,
    #[serde(rename = "Empty")]
    Vide,
    #[serde(rename = "Vote Accepted")]
    VoteAccepte,
    #[serde(rename = "Vote Refused")]
    VoteRefuse,
}

impl Vocabulary for LawStatus {
    const NAME: &'static str = "law status";
    const ALL: &'static [Self] = &[
        Self::AviseParConferencePreside,
        Self::Created,
        Self::EnAttenteDispenseSecond,
        Self::EnCommission,
        Self::EvacueConjointement,
        Self::Fusionne,
        Self::Publie,
        Self::Retire,
        Self::Vide,
        Self::VoteAccepte,
        Self::VoteRefuse,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::AviseParConferencePreside => "Avise Par Conference Presidé",
            Self::Created => "Created",
            Self::EnAttenteDispenseSecond => "En Attente Dispense Second",
            Self::EnCommission => "En Commission",
            Self::EvacueConjointement => "Evacue Conjointement",
            Self::Fusionne => "Fusionne",
            Self::Publie => "Publie",
            Self::Retire => "Retired",
            Self::Vide => "Empty",
            Self::VoteAccepte => "Vote Accepted",
            Self::VoteRefuse => "Vote Refused",
        }
    }
}

/// Ministries of the Luxembourg government
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ministry {
    Me,
    Mae,
    Maint,
    Ma,
    Mcult,
    Mdigital,
    Meco,
    Menej,
    Mega,
    Mecb,
    Mfsva,
    Mfin,
    Mfp,
    Mjust,
    Mlogat,
    Mmtp,
    Mesr,
    #[serde(rename = "M3S")]
    M3s,
    Msp,
    Mt,
}

impl Vocabulary for Ministry {
    const NAME: &'static str = "ministry";
    const ALL: &'static [Self] = &[
        Self::Me,
        Self::Mae,
        Self::Maint,
        Self::Ma,
        Self::Mcult,
        Self::Mdigital,
        Self::Meco,
        Self::Menej,
        Self::Mega,
        Self::Mecb,
        Self::Mfsva,
        Self::Mfin,
        Self::Mfp,
        Self::Mjust,
        Self::Mlogat,
        Self::Mmtp,
        Self::Mesr,
        Self::M3s,
        Self::Msp,
        Self::Mt,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Me => "ME",
            Self::Mae => "MAE",
            Self::Maint => "MAINT",
            Self::Ma => "MA",
            Self::Mcult => "MCULT",
            Self::Mdigital => "MDIGITAL",
            Self::Meco => "MECO",
            Self::Menej => "MENEJ",
            Self::Mega => "MEGA",
            Self::Mecb => "MECB",
            Self::Mfsva => "MFSVA",
            Self::Mfin => "MFIN",
            Self::Mfp => "MFP",
            Self::Mjust => "MJUST",
            Self::Mlogat => "MLOGAT",
            Self::Mmtp => "MMTP",
            Self::Mesr => "MESR",
            Self::M3s => "M3S",
            Self::Msp => "MSP",
            Self::Mt => "MT",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Me => "Ministère d'État",
            Self::Mae => "Ministère des Affaires étrangères et européennes, de la Défense, de la Coopération et du Commerce extérieur",
            Self::Maint => "Ministère des Affaires intérieures",
            Self::Ma => "Ministère de l'Agriculture, de l'Alimentation et de la Viticulture",
            Self::Mcult => "Ministère de la Culture",
            Self::Mdigital => "Ministère de la Digitalisation",
            Self::Meco => "Ministère de l'Économie",
            Self::Menej => "Ministère de l'Éducation nationale, de l'Enfance et de la Jeunesse",
            Self::Mega => "Ministère de l'Égalité des genres et de la Diversité",
            Self::Mecb => "Ministère de l'Environnement, du Climat et de la Biodiversité",
            Self::Mfsva => "Ministère de la Famille, des Solidarités, du Vivre ensemble et de l'Accueil",
            Self::Mfin => "Ministère des Finances",
            Self::Mfp => "Ministère de la Fonction publique",
            Self::Mjust => "Ministère de la Justice",
            Self::Mlogat => "Ministère du Logement et de l'Aménagement du territoire",
            Self::Mmtp => "Ministère de la Mobilité et des Travaux publics",
            Self::Mesr => "Ministère de la Recherche et de l'Enseignement supérieur",
            Self::M3s => "Ministère de la Santé et de la Sécurité sociale",
            Self::Msp => "Ministère des Sports",
            Self::Mt => "Ministère du Travail",
        }
    }
}

/// Level of government an agent acts at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Governance {
    Municipal,
    Ministerial,
    Legislative,
    #[serde(rename = "Council of State")]
    CouncilOfState,
    Administration,
}

impl Vocabulary for Governance {
    const NAME: &'static str = "governance level";
    const ALL: &'static [Self] = &[
        Self::Municipal,
        Self::Ministerial,
        Self::Legislative,
        Self::CouncilOfState,
        Self::Administration,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Municipal => "Municipal",
            Self::Ministerial => "Ministerial",
            Self::Legislative => "Legislative",
            Self::CouncilOfState => "Council of State",
            Self::Administration => "Administration",
        }
    }
}

/// What a KPI measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KpiType {
    Impact,
    Coherence,
    Alignment,
    Progress,
    #[serde(rename = "Info availability")]
    InfoAvailability,
    #[serde(rename = "Media coverage")]
    MediaCoverage,
}

impl Vocabulary for KpiType {
    const NAME: &'static str = "KPI type";
    const ALL: &'static [Self] = &[
        Self::Impact,
        Self::Coherence,
        Self::Alignment,
        Self::Progress,
        Self::InfoAvailability,
        Self::MediaCoverage,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Impact => "Impact",
            Self::Coherence => "Coherence",
            Self::Alignment => "Alignment",
            Self::Progress => "Progress",
            Self::InfoAvailability => "Info availability",
            Self::MediaCoverage => "Media coverage",
        }
    }
}

macro_rules! text_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    parse_literal(s)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

text_conversions!(LawKind, LawStatus, Ministry, Governance, KpiType);

/// One entry of a vocabulary listing, as served to the UI
#[derive(Debug, Clone, Serialize)]
pub struct VocabularyEntry {
    pub value: &'static str,
    pub label: &'static str,
}

/// List every value of a vocabulary with its label
pub fn entries<T: Vocabulary>() -> Vec<VocabularyEntry> {
    T::ALL
        .iter()
        .map(|v| VocabularyEntry {
            value: v.as_str(),
            label: v.label(),
        })
        .collect()
}
