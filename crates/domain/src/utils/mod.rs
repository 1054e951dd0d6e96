//! Pure helpers with no I/O.

pub mod text;
pub mod title_classifier;
