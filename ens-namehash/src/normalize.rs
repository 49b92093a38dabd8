//! Name normalization.
//!
//! Labels are mapped with NFKC, case folded with Unicode lowercase mapping,
//! and mapped with NFKC again before being checked against the allowed set:
//! alphanumerics and `-`. Validation runs on the folded form so that
//! normalized output always re-normalizes to itself.

use ens_core::error::{EnsError, Result};
use unicode_normalization::UnicodeNormalization;

/// Returns true if `c` may appear in a normalized label.
fn is_allowed(c: char) -> bool {
    c == '-' || c.is_alphanumeric()
}

/// Compatibility-maps and lowercases one label.
///
/// Lowercasing can leave text outside NFKC, hence the second pass.
fn fold(label: &str) -> String {
    let lowered = label.nfkc().collect::<String>().to_lowercase();
    lowered.nfkc().collect()
}

/// Normalizes a dotted name.
///
/// - The empty name is the root and normalizes to `""`.
/// - Each label is NFKC mapped and lowercased, so fullwidth forms fold to
///   ASCII and decomposed accents compose.
/// - Any character other than an alphanumeric or `-` fails with
///   [`EnsError::InvalidName`] naming the character.
/// - Empty labels fail with [`EnsError::EmptyLabel`].
///
/// # Example
///
/// ```rust
/// use ens_namehash::normalize;
///
/// assert_eq!(normalize("NAME.puffs").unwrap(), "name.puffs");
/// assert_eq!(normalize("").unwrap(), "");
/// ```
pub fn normalize(name: &str) -> Result<String> {
    if name.is_empty() {
        return Ok(String::new());
    }

    let mut labels = Vec::new();
    for label in name.split('.') {
        if label.is_empty() {
            return Err(EnsError::EmptyLabel { name: name.into() });
        }

        let folded = fold(label);
        if let Some(character) = folded.chars().find(|c| !is_allowed(*c)) {
            return Err(EnsError::InvalidName {
                name: name.into(),
                character,
            });
        }
        labels.push(folded);
    }

    Ok(labels.join("."))
}

/// Returns true if `name` normalizes without error.
pub fn is_valid_name(name: &str) -> bool {
    normalize(name).is_ok()
}
