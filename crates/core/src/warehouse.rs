//! Warehouse receiving progress.

use serde::Serialize;

/// How much of an order has arrived at the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarehouseProgress {
    pub ordered: i64,
    pub received: i64,
    /// Never negative; over-delivery reports zero remaining.
    pub remaining: i64,
    /// Whole percent received, capped at 100.
    pub percent: u8,
}

impl WarehouseProgress {
    pub fn compute(ordered: i64, received: i64) -> Self {
        let remaining = (ordered - received).max(0);
        let percent = if ordered <= 0 {
            0
        } else {
            ((received.max(0) * 100) / ordered).min(100) as u8
        };
        Self {
            ordered,
            received,
            remaining,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ordered > 0 && self.received >= self.ordered
    }
}

pub fn validate_entry_quantity(quantity: i32) -> Result<(), String> {
    if quantity <= 0 {
        return Err("Received quantity must be greater than zero".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_delivery() {
        let p = WarehouseProgress::compute(1000, 250);
        assert_eq!(p.remaining, 750);
        assert_eq!(p.percent, 25);
        assert!(!p.is_complete());
    }

    #[test]
    fn over_delivery_is_capped() {
        let p = WarehouseProgress::compute(100, 130);
        assert_eq!(p.remaining, 0);
        assert_eq!(p.percent, 100);
        assert!(p.is_complete());
    }

    #[test]
    fn zero_ordered_reports_zero_percent() {
        let p = WarehouseProgress::compute(0, 10);
        assert_eq!(p.percent, 0);
        assert!(!p.is_complete());
    }

    #[test]
    fn entry_quantity_must_be_positive() {
        assert!(validate_entry_quantity(0).is_err());
        assert!(validate_entry_quantity(5).is_ok());
    }
}
