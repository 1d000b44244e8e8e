//! Field-level validation shared by the registration, project and packing forms.
//!
//! Individual checks return `Result<(), String>` with a human-readable message.
//! [`ValidationErrors`] collects several of them so a form submission reports
//! every bad field at once instead of failing on the first.

use std::fmt;

use rust_decimal::Decimal;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of a username.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length of a project or product name.
pub const MAX_NAME_LENGTH: usize = 255;

/// Largest amount a `DECIMAL(15,2)` money column holds.
pub const MAX_MONEY_AMOUNT: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

/// Accumulates validation failures across several fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the error from `result`, if any.
    pub fn check(&mut self, result: Result<(), String>) -> &mut Self {
        if let Err(msg) = result {
            self.0.push(msg);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// A collector holding one message.
    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

/// Usernames are 3-50 characters of ASCII letters, digits, `_`, `-` or `.`.
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if !(3..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(format!(
            "Username must be between 3 and {MAX_USERNAME_LENGTH} characters"
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err("Username may only contain letters, digits, '_', '-' or '.'".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    Ok(())
}

/// A required, trimmed, length-bounded name (project, product, person).
pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

pub fn validate_positive_quantity(field: &str, value: i32) -> Result<(), String> {
    if value <= 0 {
        return Err(format!("{field} must be greater than zero"));
    }
    Ok(())
}

pub fn validate_non_negative_count(field: &str, value: i32) -> Result<(), String> {
    if value < 0 {
        return Err(format!("{field} must not be negative"));
    }
    Ok(())
}

pub fn validate_non_negative_amount(field: &str, value: Decimal) -> Result<(), String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("{field} must not be negative"));
    }
    Ok(())
}

/// A non-negative amount that fits a money column.
pub fn validate_money_amount(field: &str, value: Decimal) -> Result<(), String> {
    validate_non_negative_amount(field, value)?;
    if value > MAX_MONEY_AMOUNT {
        return Err(format!("{field} must not exceed {MAX_MONEY_AMOUNT}"));
    }
    Ok(())
}

/// Percentages are inclusive on both ends.
pub fn validate_percentage(field: &str, value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(format!("{field} must be between 0 and 100"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("kim.mj").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("eightchr").is_ok());
    }

    #[test]
    fn name_is_trimmed_before_checking() {
        assert!(validate_name("Project name", "   ").is_err());
        assert!(validate_name("Project name", " Tumbler 500ml ").is_ok());
    }

    #[test]
    fn percentage_bounds_are_inclusive() {
        assert!(validate_percentage("Fee rate", Decimal::ZERO).is_ok());
        assert!(validate_percentage("Fee rate", Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_percentage("Fee rate", Decimal::new(1001, 1)).is_err());
        assert!(validate_percentage("Fee rate", Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn money_amount_is_bounded_by_column_precision() {
        assert_eq!(MAX_MONEY_AMOUNT.to_string(), "9999999999999.99");
        assert!(validate_money_amount("Unit price", MAX_MONEY_AMOUNT).is_ok());
        assert!(validate_money_amount("Unit price", Decimal::ZERO).is_ok());

        let too_large = MAX_MONEY_AMOUNT + Decimal::new(1, 2);
        let msg = validate_money_amount("Unit price", too_large).unwrap_err();
        assert!(msg.contains("9999999999999.99"), "{msg}");
        assert!(validate_money_amount("Unit price", Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn collector_reports_every_failure() {
        let mut errors = ValidationErrors::new();
        errors
            .check(validate_name("Name", ""))
            .check(validate_positive_quantity("Quantity", 0))
            .check(validate_non_negative_count("Box count", 3));

        assert_eq!(errors.messages().len(), 2);
        let msg = errors.clone().into_result().unwrap_err().to_string();
        assert!(msg.contains("Name must not be empty"));
        assert!(msg.contains("Quantity must be greater than zero"));
    }
}
