//! Field-level input rules.
//!
//! Each validator takes the raw token the operator typed (already stripped of
//! surrounding whitespace) and either returns the parsed value or a
//! [`ValidationError`] whose message is the diagnostic shown before re-prompting.
//! Blank input in modify flows never reaches these functions; the caller keeps
//! the previous value instead.

use thiserror::Error;

/// Minimum accepted salary.
pub const MIN_SALARY: u64 = 500;

/// Youngest accepted age.
pub const MIN_AGE: u8 = 18;

/// Oldest accepted age.
pub const MAX_AGE: u8 = 99;

/// Number of digits in a phone number.
pub const PHONE_DIGITS: usize = 10;

/// A field rule that the input failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty or has characters other than letters and spaces.
    #[error("Name must contain only alphabetic characters.")]
    Name,
    /// Designation is empty or has characters other than letters and spaces.
    #[error("Designation must contain only alphabetic characters.")]
    Designation,
    /// Salary is not a whole number of at least 500.
    #[error("Salary must be at least 500 and in a valid numeric format.")]
    Salary,
    /// Age is not a whole number from 18 to 99.
    #[error("Age must be a positive number between 18 and 99 in a valid numeric format.")]
    Age,
    /// Phone is not exactly ten digits.
    #[error("Phone number must be a 10-digit number in a valid numeric format.")]
    Phone,
    /// Address is blank.
    #[error("Address cannot be empty.")]
    Address,
}

fn is_alphabetic_words(input: &str) -> bool {
    let mut letters = input.chars().filter(|c| *c != ' ').peekable();
    letters.peek().is_some() && letters.all(char::is_alphabetic)
}

fn is_digits(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}

/// Letters and spaces only, with at least one letter.
///
/// # Errors
///
/// Returns [`ValidationError::Name`] if the rule is not met.
pub fn validate_name(input: &str) -> Result<String, ValidationError> {
    if is_alphabetic_words(input) {
        Ok(input.to_string())
    } else {
        Err(ValidationError::Name)
    }
}

/// Letters and spaces only, with at least one letter.
///
/// # Errors
///
/// Returns [`ValidationError::Designation`] if the rule is not met.
pub fn validate_designation(input: &str) -> Result<String, ValidationError> {
    if is_alphabetic_words(input) {
        Ok(input.to_string())
    } else {
        Err(ValidationError::Designation)
    }
}

/// Digits only, at least [`MIN_SALARY`].
///
/// # Errors
///
/// Returns [`ValidationError::Salary`] if the rule is not met.
#[allow(clippy::cast_precision_loss)]
pub fn validate_salary(input: &str) -> Result<f64, ValidationError> {
    if !is_digits(input) {
        return Err(ValidationError::Salary);
    }
    match input.parse::<f64>() {
        Ok(salary) if salary.is_finite() && salary >= MIN_SALARY as f64 => Ok(salary),
        _ => Err(ValidationError::Salary),
    }
}

/// Digits only, from [`MIN_AGE`] to [`MAX_AGE`] inclusive.
///
/// # Errors
///
/// Returns [`ValidationError::Age`] if the rule is not met.
pub fn validate_age(input: &str) -> Result<u8, ValidationError> {
    if !is_digits(input) {
        return Err(ValidationError::Age);
    }
    match input.parse::<u8>() {
        Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Ok(age),
        _ => Err(ValidationError::Age),
    }
}

/// Exactly [`PHONE_DIGITS`] digits.
///
/// # Errors
///
/// Returns [`ValidationError::Phone`] if the rule is not met.
pub fn validate_phone(input: &str) -> Result<u64, ValidationError> {
    if input.len() != PHONE_DIGITS || !is_digits(input) {
        return Err(ValidationError::Phone);
    }
    input.parse().map_err(|_| ValidationError::Phone)
}

/// Anything that is not blank after trimming.
///
/// # Errors
///
/// Returns [`ValidationError::Address`] if the rule is not met.
pub fn validate_address(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Address)
    } else {
        Ok(trimmed.to_string())
    }
}
