//! Payment arithmetic for MJ projects.
//!
//! The server is the only place these numbers are computed. Clients send the
//! raw inputs (unit price, fee rate, shipping, extra cost lines) and receive
//! the derived subtotal, fee and total back.
//!
//! ```text
//! subtotal = unit_price × quantity
//! fee      = subtotal × fee_rate / 100
//! total    = subtotal + shipping_cost + fee + Σ additional_costs[].cost
//! ```
//!
//! All amounts are rounded to [`MONEY_SCALE`] decimal places, midpoint away
//! from zero, and must fit a `DECIMAL(15,2)` column.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::validation::{
    validate_money_amount, validate_percentage, validate_positive_quantity, ValidationErrors,
};

/// Number of fractional digits kept for money (matches `DECIMAL(15,2)`).
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to the money scale.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Additional cost lines
// ---------------------------------------------------------------------------

/// A free-form extra cost line (inspection fee, sample cost, ...).
///
/// Stored as a JSON array in `mj_project.additional_costs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalCostItem {
    pub description: String,
    pub cost: Decimal,
}

// ---------------------------------------------------------------------------
// Payment schedule (advance / balance)
// ---------------------------------------------------------------------------

/// One payment milestone: deposit or final balance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMilestone {
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// Advance and balance milestones, stored as JSON in `mj_project.payment_schedule`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    #[serde(default)]
    pub advance: PaymentMilestone,
    #[serde(default)]
    pub balance: PaymentMilestone,
}

/// Overall payment state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    AdvancePaid,
    FullyPaid,
}

impl PaymentStatus {
    /// Label shown in the finance and payment screens.
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "미결제",
            PaymentStatus::AdvancePaid => "선금 결제",
            PaymentStatus::FullyPaid => "결제 완료",
        }
    }
}

impl PaymentSchedule {
    /// A paid balance means the order is settled, whether or not the advance
    /// was recorded separately.
    pub fn status(&self) -> PaymentStatus {
        if self.balance.paid {
            PaymentStatus::FullyPaid
        } else if self.advance.paid {
            PaymentStatus::AdvancePaid
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Amount recorded against the advance milestone, if it is marked paid.
    pub fn advance_paid_amount(&self) -> Decimal {
        paid_amount(&self.advance)
    }

    /// Amount recorded against the balance milestone, if it is marked paid.
    pub fn balance_paid_amount(&self) -> Decimal {
        paid_amount(&self.balance)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, milestone) in [("Advance", &self.advance), ("Balance", &self.balance)] {
            if let Some(amount) = milestone.amount {
                validate_money_amount(&format!("{name} amount"), amount)?;
            }
            if milestone.paid && milestone.date.is_none() {
                return Err(format!("{name} payment is marked paid but has no date"));
            }
        }
        Ok(())
    }
}

fn paid_amount(milestone: &PaymentMilestone) -> Decimal {
    if milestone.paid {
        milestone.amount.unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

// ---------------------------------------------------------------------------
// Derived amounts
// ---------------------------------------------------------------------------

/// The raw inputs of the payment form.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInput {
    pub unit_price: Decimal,
    pub quantity: i32,
    pub fee_rate: Decimal,
    pub shipping_cost: Decimal,
    pub additional_costs: Vec<AdditionalCostItem>,
}

impl PaymentInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(validate_money_amount("Unit price", self.unit_price))
            .check(validate_positive_quantity("Quantity", self.quantity))
            .check(validate_percentage("Fee rate", self.fee_rate))
            .check(validate_money_amount("Shipping cost", self.shipping_cost));
        for (idx, item) in self.additional_costs.iter().enumerate() {
            if item.description.trim().is_empty() {
                errors.check(Err(format!(
                    "Additional cost #{} has no description",
                    idx + 1
                )));
            }
            errors.check(validate_money_amount(
                &format!("Additional cost #{}", idx + 1),
                item.cost,
            ));
        }
        errors.into_result()
    }
}

/// Everything derived from a [`PaymentInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentBreakdown {
    pub subtotal: Decimal,
    pub fee: Decimal,
    pub additional_total: Decimal,
    pub total: Decimal,
}

impl PaymentBreakdown {
    /// Derive every amount, failing when one would not fit a money column.
    pub fn compute(input: &PaymentInput) -> Result<Self, ValidationErrors> {
        let subtotal = in_money_range(
            "Subtotal",
            compute_subtotal(input.unit_price, input.quantity),
        )?;
        let fee = in_money_range("Fee", compute_fee(subtotal, input.fee_rate))?;
        let additional_total = in_money_range(
            "Additional costs",
            sum_additional_costs(&input.additional_costs),
        )?;
        let total = in_money_range(
            "Total amount",
            compute_total(subtotal, input.shipping_cost, fee, additional_total),
        )?;
        Ok(Self {
            subtotal,
            fee,
            additional_total,
            total,
        })
    }
}

fn in_money_range(field: &str, value: Option<Decimal>) -> Result<Decimal, ValidationErrors> {
    let value = value.ok_or_else(|| ValidationErrors::single(format!("{field} is too large")))?;
    validate_money_amount(field, value).map_err(ValidationErrors::single)?;
    Ok(value)
}

/// `None` on overflow.
pub fn compute_subtotal(unit_price: Decimal, quantity: i32) -> Option<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .map(round_money)
}

pub fn compute_fee(subtotal: Decimal, fee_rate: Decimal) -> Option<Decimal> {
    subtotal
        .checked_mul(fee_rate)?
        .checked_div(Decimal::ONE_HUNDRED)
        .map(round_money)
}

pub fn sum_additional_costs(items: &[AdditionalCostItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.cost))
        .map(round_money)
}

pub fn compute_total(
    subtotal: Decimal,
    shipping_cost: Decimal,
    fee: Decimal,
    additional_total: Decimal,
) -> Option<Decimal> {
    subtotal
        .checked_add(shipping_cost)?
        .checked_add(fee)?
        .checked_add(additional_total)
        .map(round_money)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_input() -> PaymentInput {
        PaymentInput {
            unit_price: d("1.50"),
            quantity: 1000,
            fee_rate: d("3.5"),
            shipping_cost: d("120"),
            additional_costs: vec![
                AdditionalCostItem {
                    description: "Inspection".into(),
                    cost: d("30"),
                },
                AdditionalCostItem {
                    description: "Sample".into(),
                    cost: d("20.50"),
                },
            ],
        }
    }

    #[test]
    fn breakdown_sums_every_component() {
        let b = PaymentBreakdown::compute(&sample_input()).unwrap();
        assert_eq!(b.subtotal, d("1500.00"));
        assert_eq!(b.fee, d("52.50"));
        assert_eq!(b.additional_total, d("50.50"));
        assert_eq!(b.total, d("1723.00"));
        assert_eq!(b.total, b.subtotal + d("120") + b.fee + b.additional_total);
    }

    #[test]
    fn fee_is_rate_percent_of_subtotal() {
        assert_eq!(compute_fee(d("333.33"), d("10")), Some(d("33.33")));
        assert_eq!(compute_fee(d("1000"), d("0")), Some(Decimal::ZERO));
    }

    #[test]
    fn fee_rounds_midpoint_away_from_zero() {
        // 0.25 × 50% = 0.125
        assert_eq!(compute_fee(d("0.25"), d("50")), Some(d("0.13")));
    }

    #[test]
    fn no_additional_costs_totals_to_zero() {
        assert_eq!(sum_additional_costs(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn oversized_unit_price_fails_validation() {
        let mut input = sample_input();
        input.unit_price = d("100000000000000000000000000");

        let errors = input.validate().unwrap_err();
        assert!(errors.to_string().contains("Unit price"), "{errors}");
    }

    #[test]
    fn overflowing_amounts_are_rejected_instead_of_panicking() {
        let mut input = sample_input();
        input.unit_price = Decimal::MAX;
        assert_eq!(compute_subtotal(Decimal::MAX, 1000), None);

        let errors = PaymentBreakdown::compute(&input).unwrap_err();
        assert!(errors.to_string().contains("Subtotal"), "{errors}");
    }

    #[test]
    fn subtotal_beyond_column_range_is_rejected() {
        // Each input is within range; the product is not.
        let mut input = sample_input();
        input.unit_price = d("9999999999999.99");
        assert!(input.validate().is_ok());

        let errors = PaymentBreakdown::compute(&input).unwrap_err();
        assert!(errors.to_string().contains("Subtotal must not exceed"), "{errors}");
    }

    #[test]
    fn invalid_input_collects_all_errors() {
        let mut input = sample_input();
        input.quantity = 0;
        input.fee_rate = d("150");
        input.additional_costs[0].description = " ".into();

        let errors = input.validate().unwrap_err();
        assert_eq!(errors.messages().len(), 3);
    }

    #[test]
    fn schedule_status_follows_paid_flags() {
        let mut schedule = PaymentSchedule::default();
        assert_eq!(schedule.status(), PaymentStatus::Unpaid);

        schedule.advance.paid = true;
        assert_eq!(schedule.status(), PaymentStatus::AdvancePaid);

        schedule.balance.paid = true;
        assert_eq!(schedule.status(), PaymentStatus::FullyPaid);
    }

    #[test]
    fn unpaid_milestones_do_not_count_towards_paid_amounts() {
        let schedule = PaymentSchedule {
            advance: PaymentMilestone {
                paid: true,
                date: NaiveDate::from_ymd_opt(2024, 3, 1),
                amount: Some(d("500")),
            },
            balance: PaymentMilestone {
                paid: false,
                date: None,
                amount: Some(d("1223")),
            },
        };
        assert_eq!(schedule.advance_paid_amount(), d("500"));
        assert_eq!(schedule.balance_paid_amount(), Decimal::ZERO);
    }

    #[test]
    fn paid_milestone_requires_a_date() {
        let mut schedule = PaymentSchedule::default();
        schedule.advance.paid = true;
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn schedule_deserializes_from_partial_json() {
        let schedule: PaymentSchedule =
            serde_json::from_str(r#"{"advance":{"paid":true,"date":"2024-03-01"}}"#).unwrap();
        assert!(schedule.advance.paid);
        assert!(!schedule.balance.paid);
    }
}
