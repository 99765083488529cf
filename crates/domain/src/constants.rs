//! Protocol constants
//!
//! Values fixed by the France Travail partner API. They must not drift: the
//! provider matches on them byte for byte.

use std::time::Duration;

/// `codeSortie` returned by `rechercheIndividuCertifie` when exactly one
/// certified individual matches.
pub const RECHERCHE_INDIVIDU_SUCCESS: &str = "S001";

/// `codeSortie` returned by `rechercheIndividuCertifie` when several
/// individuals match the submitted identity.
pub const RECHERCHE_INDIVIDU_MULTIPLE_MATCHES: &str = "S002";

/// `codeSortie` returned by `passIAE/miseAjour` on success.
pub const MAJ_PASS_SUCCESS: &str = "S000";

/// Local code recorded when the provider answers the success code but an
/// empty `idNationalDE`.
pub const EMPTY_ID_NATIONAL_CODE: &str = "empty_nir";

/// `statutReponsePassIAE` value: the approval is always sent as accepted.
pub const STATUT_REPONSE_APPROVED: &str = "A";

/// The provider only reads the first 13 characters of the NIR.
pub const MAX_NIR_CHARACTERS: usize = 13;

/// Maximum length of `nomNaissance`.
pub const MAX_LAST_NAME_LENGTH: usize = 25;

/// Maximum length of `prenom`.
pub const MAX_FIRST_NAME_LENGTH: usize = 13;

/// Date format used in every request payload.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The partner API is slow; give it a chance before calling it a failure.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(60);

/// Cached tokens are refreshed this long before their announced expiry.
pub const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(10);

/// OAuth realm of the partner API.
pub const PARTNER_REALM: &str = "/partenaire";

/// Scopes required by the identity search and PASS IAE update operations.
pub const NOTIFICATION_SCOPES: [&str; 4] =
    ["api_rechercheindividucertifiev1", "rechercherIndividuCertifie", "api_maj-pass-iaev1", "passIAE"];

/// SQLite connections kept in the pool.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

/// Default number of notification attempts per scheduler run.
pub const DEFAULT_MAX_PER_RUN: usize = 100;

/// Default delay between two provider calls, in seconds.
pub const DEFAULT_DELAY_SECS: u64 = 1;

/// Largest delay accepted on the command line, in seconds.
pub const MAX_DELAY_SECS: u64 = 5;
