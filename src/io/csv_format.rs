//! CSV format handling for ledger commands and balance reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to ledger commands
//! - Balance report serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::validation::{validate_name, AMOUNT_SCALE};
use crate::types::{LedgerCommand, UserBalance, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, user, counterparty,
/// amount, name. Which optional columns are required depends on the type.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub command: String,
    pub user: UserId,
    pub counterparty: Option<UserId>,
    pub amount: Option<String>,
    pub name: Option<String>,
}

/// Convert a CsvRecord to a LedgerCommand
///
/// - `open` needs a valid `name`
/// - `grant` and `withdraw` need an `amount`
/// - `transfer` needs a `counterparty` (the receiver) and an `amount`
///
/// Amount sign and scale are not checked here; the ledger rejects
/// non-positive amounts and amounts finer than the report precision when the
/// command runs.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<LedgerCommand, String> {
    let kind = csv_record.command.to_lowercase();

    let amount = match csv_record.amount.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Some(Decimal::from_str(text).map_err(|_| {
            format!(
                "Invalid amount '{}' for {} by user {}",
                text, kind, csv_record.user
            )
        })?),
        _ => None,
    };

    let require_amount = || {
        amount.ok_or_else(|| {
            format!(
                "{} for user {} requires an amount",
                kind, csv_record.user
            )
        })
    };

    match kind.as_str() {
        "open" => {
            let name = csv_record
                .name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            validate_name(&name).map_err(|e| format!("open for user {}: {}", csv_record.user, e))?;
            Ok(LedgerCommand::Open {
                user: csv_record.user,
                name,
            })
        }
        "grant" => Ok(LedgerCommand::Grant {
            user: csv_record.user,
            amount: require_amount()?,
        }),
        "withdraw" => Ok(LedgerCommand::Withdraw {
            user: csv_record.user,
            amount: require_amount()?,
        }),
        "transfer" => {
            let receiver = csv_record.counterparty.ok_or_else(|| {
                format!(
                    "transfer from user {} requires a counterparty",
                    csv_record.user
                )
            })?;
            Ok(LedgerCommand::Transfer {
                sender: csv_record.user,
                receiver,
                amount: require_amount()?,
            })
        }
        _ => Err(format!(
            "Invalid command type: '{}' for user {}",
            csv_record.command, csv_record.user
        )),
    }
}

/// Write balances in CSV format
///
/// Columns: user, name, balance. Rows are sorted by user id and balances are
/// printed with [`AMOUNT_SCALE`] decimal places, the most any accepted amount
/// carries.
pub fn write_balances_csv(balances: &[UserBalance], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "name", "balance"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = balances.to_vec();
    sorted.sort_by_key(|balance| balance.user_id);

    for balance in sorted {
        writer
            .write_record(&[
                balance.user_id.to_string(),
                balance.user_name,
                // normalize() also folds a negative zero into zero
                format!("{:.*}", AMOUNT_SCALE as usize, balance.balance.normalize()),
            ])
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
