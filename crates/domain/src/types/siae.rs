//! Employer, sender and prescriber kinds and their provider codes

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Kind of inclusion employer (SIAE) that hired the job seeker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SiaeKind {
    /// Atelier et chantier d'insertion.
    Aci,
    /// Association intermédiaire.
    Ai,
    /// Entreprise d'insertion.
    Ei,
    /// Entreprise de travail temporaire d'insertion.
    Etti,
    /// Entreprise d'insertion par le travail indépendant.
    Eiti,
    /// Entreprise adaptée.
    Ea,
    /// Entreprise adaptée de travail temporaire.
    Eatt,
    /// Groupement d'employeurs pour l'insertion et la qualification.
    Geiq,
    /// Organisation porteuse de la clause sociale.
    Opcs,
}

impl_domain_status_conversions!(SiaeKind {
    Aci => "ACI",
    Ai => "AI",
    Ei => "EI",
    Etti => "ETTI",
    Eiti => "EITI",
    Ea => "EA",
    Eatt => "EATT",
    Geiq => "GEIQ",
    Opcs => "OPCS",
});

impl SiaeKind {
    /// Provider `typeSIAE` code. Adapted companies, GEIQ and OPCS are not
    /// part of the PASS IAE scheme and have none.
    pub const fn pe_type_siae(self) -> Option<u16> {
        match self {
            Self::Aci => Some(836),
            Self::Ai => Some(837),
            Self::Ei => Some(838),
            Self::Etti => Some(839),
            Self::Eiti => Some(840),
            Self::Ea | Self::Eatt | Self::Geiq | Self::Opcs => None,
        }
    }
}

/// Map a raw employer kind to its `typeSIAE`; unknown kinds map to nothing.
///
/// The lookup is exact: `"ei"` or `" EI"` are not employer kinds.
pub fn siae_kind_to_pe_type_siae(raw: &str) -> Option<u16> {
    raw.parse::<SiaeKind>().ok().and_then(SiaeKind::pe_type_siae)
}

/// Who submitted the job application behind the approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderKind {
    /// The job seeker applied directly.
    JobSeeker,
    /// A prescriber organization applied on their behalf.
    Prescriber,
    /// The employer created the application.
    Employer,
}

impl_domain_status_conversions!(SenderKind {
    JobSeeker => "job_seeker",
    Prescriber => "prescriber",
    Employer => "employer",
});

impl SenderKind {
    /// Provider `origineCandidature` code.
    pub const fn pe_origine_candidature(self) -> &'static str {
        match self {
            Self::JobSeeker => "DEMA",
            Self::Prescriber => "PRES",
            Self::Employer => "EMPL",
        }
    }
}

/// Prescriber organization kinds forwarded verbatim as
/// `typologiePrescripteur`.
const FORWARDED_PRESCRIBER_KINDS: &[&str] = &[
    "AFPA", "ASE", "CAARUD", "CADA", "CAF", "CAP_EMPLOI", "CAVA", "CCAS", "CHRS", "CHU", "CIDFF",
    "CPH", "CSAPA", "DEPT", "E2C", "EPIDE", "HUDA", "ML", "MSA", "OACAS", "ODC", "OIL", "PE",
    "PENSION", "PIJ_BIJ", "PLIE", "PREVENTION", "RS_FJT",
];

/// Label sent for sensitive (justice) and unknown prescriber kinds.
pub const PE_TYPOLOGIE_OTHER: &str = "Autre";

/// Provider `typologiePrescripteur` for a prescriber organization kind.
///
/// Justice services (`SPIP`, `PJJ`) are never disclosed.
pub fn prescriber_kind_to_pe_typologie(raw: &str) -> String {
    let kind = raw.trim().to_ascii_uppercase();
    if FORWARDED_PRESCRIBER_KINDS.contains(&kind.as_str()) {
        kind
    } else {
        PE_TYPOLOGIE_OTHER.to_string()
    }
}
