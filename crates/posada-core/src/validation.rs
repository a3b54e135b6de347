//! # Validation Module
//!
//! Input validation utilities for Posada.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form fields (UI)                                              │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service commands (Rust)                                       │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── THIS MODULE: Business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  ├── UNIQUE constraints                                                 │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use posada_core::validation::{validate_document, validate_guest_name};
//!
//! // Validate before registering a guest
//! validate_document("V-12345678").unwrap();
//! validate_guest_name("Maria").unwrap();
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an identity document number.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 30 characters
/// - Letters, digits, hyphens and dots only ("V-12345678", "PA.881")
///
/// ## Example
/// ```rust
/// use posada_core::validation::validate_document;
///
/// assert!(validate_document("V-12345678").is_ok());
/// assert!(validate_document("").is_err());
/// assert!(validate_document("has space").is_err());
/// ```
pub fn validate_document(document: &str) -> ValidationResult<()> {
    let document = document.trim();

    if document.is_empty() {
        return Err(ValidationError::Required {
            field: "document".to_string(),
        });
    }

    if document.len() > 30 {
        return Err(ValidationError::TooLong {
            field: "document".to_string(),
            max: 30,
        });
    }

    if !document
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '.')
    {
        return Err(ValidationError::InvalidFormat {
            field: "document".to_string(),
            reason: "must contain only letters, numbers, hyphens, and dots".to_string(),
        });
    }

    Ok(())
}

/// Validates a guest first or last name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 100 characters
pub fn validate_guest_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an optional phone number.
///
/// ## Rules
/// - Empty is allowed (phones are optional)
/// - Maximum 20 characters
/// - Digits, spaces, and `+ - ( )` only
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Ok(());
    }

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == '(' || c == ')' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, and + - ( )".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional email address.
///
/// ## Rules
/// - Empty is allowed (emails are optional)
/// - Must contain exactly one `@` with text on both sides, and a dot in
///   the domain. Deliberately loose: the mail server is the real check.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Ok(());
    }

    if email.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 100,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a login username.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 3 and 30 characters
/// - Lowercase letters, digits, and underscores only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 30 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 30,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only lowercase letters, digits, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a password before hashing.
///
/// ## Rules
/// - Minimum 6 characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount in cents for charges and payments.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use posada_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents(2500).is_ok());
/// assert!(validate_amount_cents(0).is_err());
/// assert!(validate_amount_cents(-100).is_err());
/// ```
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a nightly price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary rooms)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an extra-charge quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_CHARGE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > crate::MAX_CHARGE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: crate::MAX_CHARGE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
