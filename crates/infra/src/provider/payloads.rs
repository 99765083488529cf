//! Wire payloads of the partner API

use passiae_core::{IdentitySearch, PassIaeUpdate};
use passiae_domain::constants::{DATE_FORMAT, STATUT_REPONSE_APPROVED};
use passiae_domain::utils::{format_pe_first_name, format_pe_last_name, truncate_nir};
use serde::{Deserialize, Serialize};

/// `POST /rechercheindividucertifie/v1/rechercheIndividuCertifie` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechercheIndividuRequest {
    pub nir_certifie: String,
    pub nom_naissance: String,
    pub prenom: String,
    pub date_naissance: String,
}

impl From<&IdentitySearch> for RechercheIndividuRequest {
    fn from(search: &IdentitySearch) -> Self {
        Self {
            nir_certifie: truncate_nir(&search.nir),
            nom_naissance: format_pe_last_name(&search.last_name),
            prenom: format_pe_first_name(&search.first_name),
            date_naissance: search.birthdate.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Identity search answer, e.g.
/// `{"idNationalDE": "", "codeSortie": "R010", "certifDE": false}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechercheIndividuResponse {
    #[serde(default)]
    pub code_sortie: Option<String>,
    #[serde(rename = "idNationalDE", default)]
    pub id_national_de: Option<String>,
    #[serde(rename = "certifDE", default)]
    pub certif_de: Option<bool>,
}

/// `POST /maj-pass-iae/v1/passIAE/miseAjour` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiseAJourRequest {
    #[serde(rename = "dateDebutPassIAE")]
    pub date_debut: String,
    #[serde(rename = "dateFinPassIAE")]
    pub date_fin: String,
    #[serde(rename = "idNational")]
    pub id_national: String,
    #[serde(rename = "numPassIAE")]
    pub num_pass_iae: String,
    #[serde(rename = "numSIRETsiae")]
    pub num_siret_siae: String,
    #[serde(rename = "origineCandidature")]
    pub origine_candidature: String,
    #[serde(rename = "statutReponsePassIAE")]
    pub statut_reponse: String,
    #[serde(rename = "typeSIAE")]
    pub type_siae: u16,
    #[serde(rename = "typologiePrescripteur", skip_serializing_if = "Option::is_none", default)]
    pub typologie_prescripteur: Option<String>,
}

impl From<&PassIaeUpdate> for MiseAJourRequest {
    fn from(update: &PassIaeUpdate) -> Self {
        Self {
            date_debut: update.start_at.format(DATE_FORMAT).to_string(),
            date_fin: update.end_at.format(DATE_FORMAT).to_string(),
            id_national: update.id_national.clone(),
            num_pass_iae: update.number.clone(),
            num_siret_siae: update.siret.clone(),
            origine_candidature: update.origine_candidature.clone(),
            statut_reponse: STATUT_REPONSE_APPROVED.to_string(),
            type_siae: update.type_siae,
            typologie_prescripteur: update.typologie_prescripteur.clone(),
        }
    }
}

/// Status update answer, e.g.
/// `{"codeSortie": "S000", "idNational": "...", "message": "Pass IAE prescrit"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiseAJourResponse {
    #[serde(default)]
    pub code_sortie: Option<String>,
    #[serde(default)]
    pub id_national: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
