//! # Payment Allocation
//!
//! Split-tender math for a single settlement moment: a guest covers one
//! required total with any mix of methods and currencies.
//!
//! ## How an Allocation Is Built
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Check-in: stay total $80.00, rate 35.500                               │
//! │                                                                         │
//! │  add_line(CashUsd, $50.00)          → Bs 1,775.00 derived, frozen       │
//! │  add_line(Zelle, $20.00, ref "Z91") → Bs   710.00 derived, frozen       │
//! │  add_line(CashBs, $15.00)           → Bs   532.50 derived, frozen       │
//! │                                                                         │
//! │  total_paid  = $85.00                                                   │
//! │  remaining   = $0.00     (never negative)                               │
//! │  change      = $5.00                                                    │
//! │  is_sufficient() = true  → the command may commit                       │
//! │                                                                         │
//! │  Zero-amount lines (untouched form fields) are dropped at commit.       │
//! │  A positive electronic line with no reference is rejected at entry.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The allocation is pure: it never touches storage. The service layer
//! validates `is_sufficient()` BEFORE writing anything, so an insufficient
//! allocation mutates nothing.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ledger::PaymentMethod;
use crate::money::{ExchangeRate, Money};

// =============================================================================
// Payment Line
// =============================================================================

/// One tender line in an allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLine {
    pub method: PaymentMethod,

    /// Amount in home-currency cents.
    pub amount: Money,

    /// Secondary-currency amount derived through the rate at entry time.
    pub secondary_amount: Money,

    /// Bank/transfer reference for electronic methods.
    pub reference: Option<String>,
}

// =============================================================================
// Allocation Status
// =============================================================================

/// Where the allocation stands against the required total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    /// Not enough yet; commit must be refused.
    Insufficient,
    /// Covers the total exactly.
    Exact,
    /// More than the total; change or credit is due back.
    Overpaid,
}

// =============================================================================
// Payment Allocation
// =============================================================================

/// An in-progress split-tender payment against a required total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAllocation {
    required_total: Money,
    lines: Vec<PaymentLine>,
}

impl PaymentAllocation {
    /// Starts an empty allocation against `required_total`.
    pub fn new(required_total: Money) -> Self {
        PaymentAllocation {
            required_total,
            lines: Vec::new(),
        }
    }

    /// Adds a tender line.
    ///
    /// The home amount is what counts toward the total; the secondary
    /// amount is derived through `rate` and frozen on the line.
    ///
    /// ## Errors
    /// - Negative amounts are rejected
    /// - A positive line whose method requires a reference must carry one;
    ///   an untouched (zero) line may stay blank
    pub fn add_line(
        &mut self,
        method: PaymentMethod,
        amount: Money,
        rate: ExchangeRate,
        reference: Option<String>,
    ) -> Result<(), ValidationError> {
        if amount.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "payment amount".to_string(),
            });
        }

        let has_reference = reference
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false);

        if amount.is_positive() && method.requires_reference() && !has_reference {
            return Err(ValidationError::MissingReference {
                method: format!("{:?}", method),
            });
        }

        self.lines.push(PaymentLine {
            method,
            amount,
            secondary_amount: rate.to_secondary(amount),
            reference,
        });

        Ok(())
    }

    /// The total the allocation must cover.
    #[inline]
    pub fn required_total(&self) -> Money {
        self.required_total
    }

    /// Sum of all line amounts (home currency).
    pub fn total_paid(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.amount)
    }

    /// Amount still due. Never negative.
    pub fn remaining(&self) -> Money {
        (self.required_total - self.total_paid()).clamp_non_negative()
    }

    /// Amount tendered beyond the total. Never negative.
    pub fn change(&self) -> Money {
        (self.total_paid() - self.required_total).clamp_non_negative()
    }

    /// Whether the allocation covers the required total.
    pub fn is_sufficient(&self) -> bool {
        self.total_paid() >= self.required_total
    }

    pub fn status(&self) -> AllocationStatus {
        let paid = self.total_paid();
        if paid < self.required_total {
            AllocationStatus::Insufficient
        } else if paid == self.required_total {
            AllocationStatus::Exact
        } else {
            AllocationStatus::Overpaid
        }
    }

    /// Lines that will actually be recorded: zero-amount lines (untouched
    /// form fields) are dropped.
    pub fn accepted_lines(&self) -> impl Iterator<Item = &PaymentLine> {
        self.lines.iter().filter(|line| line.amount.is_positive())
    }

    /// Number of lines entered, including zero-amount ones.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
