//! Finance rollups for the finance screen.
//!
//! Totals are computed on read from the stored project payment rows and the
//! per-box logistics fees.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::payment::{round_money, PaymentSchedule, PaymentStatus};

/// Payment figures of one project, as stored.
#[derive(Debug, Clone)]
pub struct ProjectLedgerLine {
    pub total_amount: Decimal,
    pub schedule: PaymentSchedule,
}

/// Shipping-fee totals over a set of boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogisticTotals {
    pub box_count: i64,
    pub paid_box_count: i64,
    pub total_fee: Decimal,
    pub paid_fee: Decimal,
    pub unpaid_fee: Decimal,
}

impl LogisticTotals {
    /// Sum `(box_fee, is_paid)` pairs.
    pub fn from_fees<I>(fees: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, bool)>,
    {
        let mut totals = Self::default();
        for (fee, paid) in fees {
            totals.box_count += 1;
            totals.total_fee += fee;
            if paid {
                totals.paid_box_count += 1;
                totals.paid_fee += fee;
            } else {
                totals.unpaid_fee += fee;
            }
        }
        totals.total_fee = round_money(totals.total_fee);
        totals.paid_fee = round_money(totals.paid_fee);
        totals.unpaid_fee = round_money(totals.unpaid_fee);
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinanceSummary {
    pub project_count: i64,
    pub total_amount: Decimal,
    pub advance_paid: Decimal,
    pub balance_paid: Decimal,
    /// `total_amount - advance_paid - balance_paid`, floored at zero per project.
    pub outstanding: Decimal,
    pub by_status: HashMap<PaymentStatus, i64>,
    pub logistics: LogisticTotals,
}

pub fn summarize(lines: &[ProjectLedgerLine], logistics: LogisticTotals) -> FinanceSummary {
    let mut summary = FinanceSummary {
        project_count: lines.len() as i64,
        total_amount: Decimal::ZERO,
        advance_paid: Decimal::ZERO,
        balance_paid: Decimal::ZERO,
        outstanding: Decimal::ZERO,
        by_status: HashMap::new(),
        logistics,
    };

    for line in lines {
        let status = line.schedule.status();
        let advance = line.schedule.advance_paid_amount();
        let balance = line.schedule.balance_paid_amount();

        summary.total_amount += line.total_amount;
        summary.advance_paid += advance;
        summary.balance_paid += balance;

        let outstanding = if status == PaymentStatus::FullyPaid {
            Decimal::ZERO
        } else {
            (line.total_amount - advance - balance).max(Decimal::ZERO)
        };
        summary.outstanding += outstanding;

        *summary.by_status.entry(status).or_insert(0) += 1;
    }

    summary.total_amount = round_money(summary.total_amount);
    summary.advance_paid = round_money(summary.advance_paid);
    summary.balance_paid = round_money(summary.balance_paid);
    summary.outstanding = round_money(summary.outstanding);
    summary
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::payment::PaymentMilestone;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn paid(amount: &str) -> PaymentMilestone {
        PaymentMilestone {
            paid: true,
            date: NaiveDate::from_ymd_opt(2024, 1, 2),
            amount: Some(d(amount)),
        }
    }

    #[test]
    fn logistics_split_paid_and_unpaid() {
        let t = LogisticTotals::from_fees([(d("12.5"), true), (d("7.25"), false), (d("3"), true)]);
        assert_eq!(t.box_count, 3);
        assert_eq!(t.paid_box_count, 2);
        assert_eq!(t.total_fee, d("22.75"));
        assert_eq!(t.paid_fee, d("15.5"));
        assert_eq!(t.unpaid_fee, d("7.25"));
    }

    #[test]
    fn summary_tracks_outstanding_per_status() {
        let lines = vec![
            ProjectLedgerLine {
                total_amount: d("1000"),
                schedule: PaymentSchedule {
                    advance: paid("300"),
                    balance: PaymentMilestone::default(),
                },
            },
            ProjectLedgerLine {
                total_amount: d("500"),
                schedule: PaymentSchedule {
                    advance: paid("200"),
                    balance: paid("250"),
                },
            },
            ProjectLedgerLine {
                total_amount: d("80"),
                schedule: PaymentSchedule::default(),
            },
        ];

        let s = summarize(&lines, LogisticTotals::default());
        assert_eq!(s.project_count, 3);
        assert_eq!(s.total_amount, d("1580"));
        assert_eq!(s.advance_paid, d("500"));
        assert_eq!(s.balance_paid, d("250"));
        // 700 + 0 (fully paid) + 80
        assert_eq!(s.outstanding, d("780"));
        assert_eq!(s.by_status[&PaymentStatus::AdvancePaid], 1);
        assert_eq!(s.by_status[&PaymentStatus::FullyPaid], 1);
        assert_eq!(s.by_status[&PaymentStatus::Unpaid], 1);
    }
}
