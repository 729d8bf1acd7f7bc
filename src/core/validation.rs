//! Input validation rules
//!
//! Each rule is a plain function returning a structured [`ValidationError`].
//! Rules run before any store access, so a rejected request has no side
//! effects.

use crate::types::{UserId, ValidationError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Allowed display name length, in characters
pub const NAME_LENGTH: RangeInclusive<usize> = 1..=10;

/// Decimal places kept by the ledger and printed in reports
pub const AMOUNT_SCALE: u32 = 4;

/// Require a strictly positive amount of at most [`AMOUNT_SCALE`] places
///
/// Trailing zeros do not count, so `1.50000` is accepted.
pub fn require_positive(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount { amount });
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(ValidationError::ExcessPrecision {
            amount,
            max_scale: AMOUNT_SCALE,
        });
    }
    Ok(amount)
}

/// Parse and validate a caller-supplied amount
pub fn parse_amount(value: &str) -> Result<Decimal, ValidationError> {
    let amount = Decimal::from_str(value.trim()).map_err(|_| ValidationError::MalformedAmount {
        value: value.to_string(),
    })?;
    require_positive(amount)
}

/// Parse a user identifier
pub fn parse_user_id(value: &str) -> Result<UserId, ValidationError> {
    value
        .trim()
        .parse::<UserId>()
        .map_err(|_| ValidationError::MalformedUserId {
            value: value.to_string(),
        })
}

/// Parse an RFC 3339 instant, normalised to UTC
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| ValidationError::malformed_instant(value, e))
}

/// Check a display name against [`NAME_LENGTH`]
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if NAME_LENGTH.contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::NameLength {
            len,
            min: *NAME_LENGTH.start(),
            max: *NAME_LENGTH.end(),
        })
    }
}

/// Reject a transfer whose sender and receiver coincide
pub fn require_distinct(sender: UserId, receiver: UserId) -> Result<(), ValidationError> {
    if sender == receiver {
        Err(ValidationError::SelfTransfer { user: sender })
    } else {
        Ok(())
    }
}
