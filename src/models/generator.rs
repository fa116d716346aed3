//! Random password generation
//!
//! Characters are drawn uniformly from the union of the selected sets
//! using the operating system's secure generator.

use rand::rngs::OsRng;
use rand::Rng;

use crate::crypto::SecureString;
use crate::error::{KeycaskError, KeycaskResult};

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const DEFAULT_SYMBOLS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_{|}~";

pub const MIN_LENGTH: usize = 1;
pub const MAX_LENGTH: usize = 64;
pub const DEFAULT_LENGTH: usize = 14;

/// Password generator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordGenerator {
    length: usize,
    upper: bool,
    lower: bool,
    digits: bool,
    symbols: Option<String>,
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            upper: true,
            lower: true,
            digits: true,
            symbols: None,
        }
    }
}

impl PasswordGenerator {
    /// Letters and digits, default length
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn upper(mut self, enabled: bool) -> Self {
        self.upper = enabled;
        self
    }

    pub fn lower(mut self, enabled: bool) -> Self {
        self.lower = enabled;
        self
    }

    pub fn digits(mut self, enabled: bool) -> Self {
        self.digits = enabled;
        self
    }

    /// Include these symbol characters; `None` disables symbols
    pub fn symbols(mut self, symbols: Option<String>) -> Self {
        self.symbols = symbols;
        self
    }

    /// The combined character set, without repeats
    pub fn charset(&self) -> Vec<char> {
        let mut chars: Vec<char> = Vec::new();
        let sets = [
            (self.upper, UPPERCASE),
            (self.lower, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols.is_some(), self.symbols.as_deref().unwrap_or_default()),
        ];
        for (enabled, set) in sets {
            if !enabled {
                continue;
            }
            for c in set.chars() {
                if !c.is_whitespace() && !chars.contains(&c) {
                    chars.push(c);
                }
            }
        }
        chars
    }

    /// Check the length range and that some character is selectable
    pub fn validate(&self) -> KeycaskResult<()> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(KeycaskError::Validation(format!(
                "Password length must be between {} and {}, got {}",
                MIN_LENGTH, MAX_LENGTH, self.length
            )));
        }
        if self.charset().is_empty() {
            return Err(KeycaskError::Validation(
                "No character set selected for password generation".into(),
            ));
        }
        Ok(())
    }

    /// Generate a password
    pub fn generate(&self) -> KeycaskResult<SecureString> {
        self.validate()?;
        let charset = self.charset();
        let mut rng = OsRng;
        let password: String = (0..self.length)
            .map(|_| charset[rng.gen_range(0..charset.len())])
            .collect();
        Ok(SecureString::new(password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generates_alphanumeric() {
        let password = PasswordGenerator::new().generate().unwrap();
        assert_eq!(password.chars().count(), DEFAULT_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_digits_only() {
        let password = PasswordGenerator::new()
            .upper(false)
            .lower(false)
            .length(64)
            .generate()
            .unwrap();
        assert_eq!(password.len(), 64);
        assert!(password.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_custom_symbols() {
        let generator = PasswordGenerator::new()
            .upper(false)
            .lower(false)
            .digits(false)
            .symbols(Some("#!#".into()));
        assert_eq!(generator.charset(), vec!['#', '!']);
        let password = generator.length(32).generate().unwrap();
        assert!(password.chars().all(|c| c == '#' || c == '!'));
    }

    #[test]
    fn test_empty_charset_rejected() {
        let err = PasswordGenerator::new()
            .upper(false)
            .lower(false)
            .digits(false)
            .generate()
            .unwrap_err();
        assert!(err.is_validation());

        let err = PasswordGenerator::new()
            .upper(false)
            .lower(false)
            .digits(false)
            .symbols(Some(String::new()))
            .generate()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_length_bounds() {
        assert!(PasswordGenerator::new().length(0).validate().is_err());
        assert!(PasswordGenerator::new().length(65).validate().is_err());
        assert!(PasswordGenerator::new().length(1).validate().is_ok());
    }

    #[test]
    fn test_passwords_differ() {
        let generator = PasswordGenerator::new().length(32);
        let a = generator.generate().unwrap();
        let b = generator.generate().unwrap();
        assert_ne!(a, b);
    }
}
