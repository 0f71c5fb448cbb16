//! The bounded namespace short identifiers are drawn from.
//!
//! An [`IdentifierSpace`] is a configuration value object: an alphabet plus
//! an inclusive length range. It is immutable for the lifetime of the
//! service; shrinking it underneath an existing ledger would invalidate the
//! capacity accounting, so services construct it once at startup from
//! [`ServiceConfig`](crate::ServiceConfig).
//!
//! Capacity arithmetic is exact (`u128`, checked); percentages are a
//! display concern and computed elsewhere.

use crate::{DropError, DropResult};
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Alphabet and length range for short identifiers.
///
/// Candidates are drawn with the length uniform over `[min_len, max_len]`
/// and each character uniform over the alphabet, from the operating system's
/// randomness source (`OsRng`), so identifiers are not guessable from prior
/// allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierSpace {
    alphabet: Vec<char>,
    min_len: usize,
    max_len: usize,
}

impl IdentifierSpace {
    /// Creates an identifier space.
    ///
    /// Duplicate characters in `alphabet` are removed (first occurrence
    /// wins) so the cardinality used for capacity matches the symbols
    /// actually drawable.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::Validation`] if the alphabet is empty after
    /// deduplication, if either bound is zero, or if `min_len > max_len`.
    pub fn new(alphabet: &str, min_len: usize, max_len: usize) -> DropResult<Self> {
        let mut seen = Vec::new();
        for c in alphabet.chars() {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }

        if seen.is_empty() {
            return Err(DropError::Validation("alphabet cannot be empty".into()));
        }
        if min_len == 0 || max_len == 0 {
            return Err(DropError::Validation(
                "identifier lengths must be at least 1".into(),
            ));
        }
        if min_len > max_len {
            return Err(DropError::Validation(format!(
                "min_len {min_len} exceeds max_len {max_len}"
            )));
        }

        Ok(Self {
            alphabet: seen,
            min_len,
            max_len,
        })
    }

    /// Total addressable identifiers per extension:
    /// `Σ_{s=min_len}^{max_len} A^s` where `A` is the alphabet cardinality.
    ///
    /// # Errors
    ///
    /// Returns [`DropError::Validation`] if the sum overflows `u128`.
    pub fn capacity_per_extension(&self) -> DropResult<u128> {
        let a = self.alphabet.len() as u128;
        let mut total: u128 = 0;
        for s in self.min_len..=self.max_len {
            let term = a.checked_pow(s as u32).ok_or_else(|| {
                DropError::Validation("identifier space capacity overflows u128".into())
            })?;
            total = total.checked_add(term).ok_or_else(|| {
                DropError::Validation("identifier space capacity overflows u128".into())
            })?;
        }
        Ok(total)
    }

    /// Draws a fresh candidate identifier.
    ///
    /// Length is uniform over `[min_len, max_len]`; each character is
    /// uniform over the alphabet. No side effects; uniqueness is the
    /// ledger's concern.
    pub fn random_candidate(&self) -> String {
        let len = OsRng.gen_range(self.min_len..=self.max_len);
        (0..len)
            .map(|_| {
                *self
                    .alphabet
                    .choose(&mut OsRng)
                    .expect("alphabet is non-empty by construction")
            })
            .collect()
    }

    /// Returns true if `identifier` could have been produced by this space.
    pub fn contains(&self, identifier: &str) -> bool {
        let len = identifier.chars().count();
        len >= self.min_len
            && len <= self.max_len
            && identifier.chars().all(|c| self.alphabet.contains(&c))
    }

    /// Alphabet cardinality.
    pub fn alphabet_size(&self) -> usize {
        self.alphabet.len()
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ALPHABET;

    #[test]
    fn test_capacity_closed_form_default_space() {
        let space = IdentifierSpace::new(DEFAULT_ALPHABET, 2, 4).unwrap();
        assert_eq!(space.alphabet_size(), 62);

        // 62^2 + 62^3 + 62^4
        assert_eq!(space.capacity_per_extension().unwrap(), 15_018_508);
    }

    #[test]
    fn test_capacity_single_length() {
        let space = IdentifierSpace::new("ab", 3, 3).unwrap();
        assert_eq!(space.capacity_per_extension().unwrap(), 8);
    }

    #[test]
    fn test_capacity_is_exact_for_wide_ranges() {
        let space = IdentifierSpace::new("0123456789", 1, 9).unwrap();
        // 10 + 100 + ... + 10^9
        assert_eq!(space.capacity_per_extension().unwrap(), 1_111_111_110);
    }

    #[test]
    fn test_new_deduplicates_alphabet() {
        let space = IdentifierSpace::new("aabbcc", 1, 1).unwrap();
        assert_eq!(space.alphabet_size(), 3);
        assert_eq!(space.capacity_per_extension().unwrap(), 3);
    }

    #[test]
    fn test_new_rejects_empty_alphabet() {
        assert!(IdentifierSpace::new("", 1, 2).is_err());
    }

    #[test]
    fn test_new_rejects_zero_length() {
        assert!(IdentifierSpace::new("abc", 0, 2).is_err());
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(IdentifierSpace::new("abc", 4, 2).is_err());
    }

    #[test]
    fn test_random_candidate_length_and_charset() {
        let space = IdentifierSpace::new(DEFAULT_ALPHABET, 2, 4).unwrap();
        for _ in 0..200 {
            let candidate = space.random_candidate();
            assert!(candidate.len() >= 2 && candidate.len() <= 4);
            assert!(candidate.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(space.contains(&candidate));
        }
    }

    #[test]
    fn test_random_candidate_covers_all_lengths() {
        let space = IdentifierSpace::new("ab", 1, 3).unwrap();
        let mut seen = [false; 4];
        for _ in 0..500 {
            seen[space.random_candidate().len()] = true;
        }
        assert!(seen[1] && seen[2] && seen[3]);
    }

    #[test]
    fn test_contains_rejects_wrong_length_or_charset() {
        let space = IdentifierSpace::new("abc", 2, 3).unwrap();
        assert!(!space.contains("a"));
        assert!(!space.contains("aaaa"));
        assert!(!space.contains("azb"));
        assert!(space.contains("abc"));
    }
}
