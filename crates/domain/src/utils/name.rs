//! Name and NIR normalisation for the certified identity search
//!
//! The provider matches names as upper-case ASCII restricted to letters,
//! hyphen, apostrophe and space, with bounded lengths.

use crate::constants::{MAX_FIRST_NAME_LENGTH, MAX_LAST_NAME_LENGTH, MAX_NIR_CHARACTERS};

/// Normalise `name` for the provider.
///
/// Transliterates to ASCII, upper-cases, optionally replaces spaces with
/// hyphens, drops every character outside `A-Z - ' space` and keeps at most
/// `max_len` characters.
///
/// ```rust
/// use passiae_domain::utils::format_pe_name;
///
/// assert_eq!(format_pe_name("Nôm^' Exémple{}$", false, 25), "NOM' EXEMPLE");
/// ```
pub fn format_pe_name(name: &str, hyphenate: bool, max_len: usize) -> String {
    let ascii = deunicode::deunicode(name).to_ascii_uppercase();
    ascii
        .chars()
        .map(|c| if hyphenate && c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_uppercase() || matches!(c, '-' | '\'' | ' '))
        .take(max_len)
        .collect()
}

/// `nomNaissance`: at most 25 characters, spaces kept.
pub fn format_pe_last_name(last_name: &str) -> String {
    format_pe_name(last_name, false, MAX_LAST_NAME_LENGTH)
}

/// `prenom`: hyphenated, at most 13 characters.
pub fn format_pe_first_name(first_name: &str) -> String {
    format_pe_name(first_name, true, MAX_FIRST_NAME_LENGTH)
}

/// `nirCertifie`: the provider only reads the first 13 characters.
pub fn truncate_nir(nir: &str) -> String {
    nir.chars().take(MAX_NIR_CHARACTERS).collect()
}
