//! Pure helpers shared by the provider client and its tests

pub mod name;

pub use name::{format_pe_first_name, format_pe_last_name, format_pe_name, truncate_nir};
