//! The individual field checks shared by every form.
//!
//! Each check looks at a field's current value (and, for [`confirm`], the value of the field it has to match)
//! and either accepts it or yields a [`CheckError`] whose [`Display`](core::fmt::Display) is the message shown next to the field.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A failed field check.
///
/// The [`Display`](core::fmt::Display) implementation is user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum CheckError {
	#[error("Invalid email address")]
	Email,
	#[error("Invalid amount")]
	Amount,
	#[error("Password must be at least 6 characters long")]
	PasswordTooShort,
	#[error("Passwords do not match")]
	PasswordMismatch,
	#[error("Please provide your full name")]
	FullName,
	#[error("Description must not be empty")]
	EmptyDescription,
}

/// A check that only needs the value of the field it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
	/// `something@something.something`, without whitespace.
	Email,
	/// Digits with an optional leading `$` and optionally exactly two decimals.
	Amount,
	/// At least [`MIN_PASSWORD_LEN`] characters.
	Password,
	/// At least two space-separated words.
	FullName,
	/// Anything but empty.
	Description,
}

impl Check {
	/// # Errors
	///
	/// Iff `value` is not accepted by this check.
	pub fn apply(self, value: &str) -> Result<(), CheckError> {
		match self {
			Check::Email => email(value),
			Check::Amount => amount(value),
			Check::Password => password(value),
			Check::FullName => full_name(value),
			Check::Description => description(value),
		}
	}
}

macro_rules! pattern {
	($name:ident, $regex:literal) => {
		fn $name() -> &'static Regex {
			static PATTERN: OnceLock<Regex> = OnceLock::new();
			PATTERN.get_or_init(|| Regex::new($regex).expect(concat!("Invalid built-in pattern ", $regex)))
		}
	};
}

pattern!(email_pattern, r"^\S+@\S+\.\S+$");
pattern!(amount_pattern, r"^\$?[0-9]+(?:\.[0-9][0-9])?$");
pattern!(full_name_pattern, r"^(?:\S+ )+\S+$");

/// # Errors
///
/// [`CheckError::Email`] unless `value` looks like an email address.
pub fn email(value: &str) -> Result<(), CheckError> {
	if email_pattern().is_match(value) {
		Ok(())
	} else {
		Err(CheckError::Email)
	}
}

/// # Errors
///
/// [`CheckError::Amount`] unless `value` is a plain dollar amount.
pub fn amount(value: &str) -> Result<(), CheckError> {
	if amount_pattern().is_match(value) {
		Ok(())
	} else {
		Err(CheckError::Amount)
	}
}

/// # Errors
///
/// [`CheckError::PasswordTooShort`] if `value` has fewer than [`MIN_PASSWORD_LEN`] characters.
pub fn password(value: &str) -> Result<(), CheckError> {
	if value.chars().count() < MIN_PASSWORD_LEN {
		Err(CheckError::PasswordTooShort)
	} else {
		Ok(())
	}
}

/// # Errors
///
/// [`CheckError::PasswordMismatch`] unless `value` equals `other` exactly.
pub fn confirm(value: &str, other: &str) -> Result<(), CheckError> {
	if value == other {
		Ok(())
	} else {
		Err(CheckError::PasswordMismatch)
	}
}

/// # Errors
///
/// [`CheckError::FullName`] unless `value` consists of at least two words separated by single spaces.
pub fn full_name(value: &str) -> Result<(), CheckError> {
	if full_name_pattern().is_match(value) {
		Ok(())
	} else {
		Err(CheckError::FullName)
	}
}

/// # Errors
///
/// [`CheckError::EmptyDescription`] iff `value` is empty.
pub fn description(value: &str) -> Result<(), CheckError> {
	if value.is_empty() {
		Err(CheckError::EmptyDescription)
	} else {
		Ok(())
	}
}
