//! Delivery status derivation.
//!
//! A project's delivery status is a pure function of its order/shipping
//! columns, the quantity received at the warehouse, and today's date. This is
//! the single place that rule lives; the stored `mj_project.delivery_status`
//! column is only a cache refreshed whenever one of the inputs changes.
//!
//! Precedence, first match wins:
//!
//! | Condition                                              | Status             |
//! |--------------------------------------------------------|--------------------|
//! | received ≥ ordered > 0                                 | `received`         |
//! | received > 0                                           | `receiving`        |
//! | factory shipping completed                             | `shipped`          |
//! | expected shipping date before today                    | `shipping_delayed` |
//! | order completed and a shipping date is set             | `in_production`    |
//! | order completed                                        | `ordered`          |
//! | otherwise                                              | `awaiting_order`   |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inputs to [`derive_delivery_status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryFacts {
    pub order_date: Option<NaiveDate>,
    pub is_order_completed: bool,
    pub factory_shipping_date: Option<NaiveDate>,
    pub is_factory_shipping_completed: bool,
    pub ordered_quantity: i64,
    pub received_quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    AwaitingOrder,
    Ordered,
    InProduction,
    ShippingDelayed,
    Shipped,
    Receiving,
    Received,
}

/// Every status, in lifecycle order.
pub const ALL_STATUSES: &[DeliveryStatus] = &[
    DeliveryStatus::AwaitingOrder,
    DeliveryStatus::Ordered,
    DeliveryStatus::InProduction,
    DeliveryStatus::ShippingDelayed,
    DeliveryStatus::Shipped,
    DeliveryStatus::Receiving,
    DeliveryStatus::Received,
];

impl DeliveryStatus {
    /// Stable code stored in `mj_project.delivery_status`.
    pub fn code(self) -> &'static str {
        match self {
            DeliveryStatus::AwaitingOrder => "awaiting_order",
            DeliveryStatus::Ordered => "ordered",
            DeliveryStatus::InProduction => "in_production",
            DeliveryStatus::ShippingDelayed => "shipping_delayed",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::Receiving => "receiving",
            DeliveryStatus::Received => "received",
        }
    }

    /// Label shown in the delivery screens.
    pub fn label(self) -> &'static str {
        match self {
            DeliveryStatus::AwaitingOrder => "발주 대기",
            DeliveryStatus::Ordered => "발주 완료",
            DeliveryStatus::InProduction => "제작중",
            DeliveryStatus::ShippingDelayed => "출고 지연",
            DeliveryStatus::Shipped => "출고 완료",
            DeliveryStatus::Receiving => "입고중",
            DeliveryStatus::Received => "입고 완료",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ALL_STATUSES.iter().copied().find(|s| s.code() == code)
    }
}

pub fn derive_delivery_status(facts: &DeliveryFacts, today: NaiveDate) -> DeliveryStatus {
    if facts.received_quantity > 0 {
        if facts.ordered_quantity > 0 && facts.received_quantity >= facts.ordered_quantity {
            return DeliveryStatus::Received;
        }
        return DeliveryStatus::Receiving;
    }

    if facts.is_factory_shipping_completed {
        return DeliveryStatus::Shipped;
    }

    if let Some(expected) = facts.factory_shipping_date {
        if expected < today {
            return DeliveryStatus::ShippingDelayed;
        }
    }

    if facts.is_order_completed {
        if facts.factory_shipping_date.is_some() {
            return DeliveryStatus::InProduction;
        }
        return DeliveryStatus::Ordered;
    }

    DeliveryStatus::AwaitingOrder
}

/// Validate the delivery form: a shipping date cannot precede the order date,
/// and shipping cannot be completed before the order is.
pub fn validate_delivery_dates(facts: &DeliveryFacts) -> Result<(), String> {
    if let (Some(order), Some(ship)) = (facts.order_date, facts.factory_shipping_date) {
        if ship < order {
            return Err("Factory shipping date cannot be before the order date".to_string());
        }
    }
    if facts.is_factory_shipping_completed && !facts.is_order_completed {
        return Err("Factory shipping cannot be completed before the order is completed".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    fn facts() -> DeliveryFacts {
        DeliveryFacts {
            ordered_quantity: 1000,
            ..Default::default()
        }
    }

    #[test]
    fn fresh_project_awaits_order() {
        assert_eq!(
            derive_delivery_status(&facts(), today()),
            DeliveryStatus::AwaitingOrder
        );
    }

    #[test]
    fn completed_order_without_shipping_date_is_ordered() {
        let f = DeliveryFacts {
            order_date: Some(date(2024, 6, 1)),
            is_order_completed: true,
            ..facts()
        };
        assert_eq!(derive_delivery_status(&f, today()), DeliveryStatus::Ordered);
    }

    #[test]
    fn future_shipping_date_means_in_production() {
        let f = DeliveryFacts {
            is_order_completed: true,
            factory_shipping_date: Some(date(2024, 7, 1)),
            ..facts()
        };
        assert_eq!(
            derive_delivery_status(&f, today()),
            DeliveryStatus::InProduction
        );
    }

    #[test]
    fn shipping_date_on_today_is_not_late() {
        let f = DeliveryFacts {
            is_order_completed: true,
            factory_shipping_date: Some(today()),
            ..facts()
        };
        assert_eq!(
            derive_delivery_status(&f, today()),
            DeliveryStatus::InProduction
        );
    }

    #[test]
    fn past_shipping_date_without_shipment_is_delayed() {
        let f = DeliveryFacts {
            is_order_completed: true,
            factory_shipping_date: Some(date(2024, 6, 10)),
            ..facts()
        };
        assert_eq!(
            derive_delivery_status(&f, today()),
            DeliveryStatus::ShippingDelayed
        );
    }

    #[test]
    fn shipped_overrides_late_date() {
        let f = DeliveryFacts {
            is_order_completed: true,
            factory_shipping_date: Some(date(2024, 6, 10)),
            is_factory_shipping_completed: true,
            ..facts()
        };
        assert_eq!(derive_delivery_status(&f, today()), DeliveryStatus::Shipped);
    }

    #[test]
    fn any_received_quantity_means_receiving() {
        let f = DeliveryFacts {
            received_quantity: 1,
            ..facts()
        };
        assert_eq!(
            derive_delivery_status(&f, today()),
            DeliveryStatus::Receiving
        );
    }

    #[test]
    fn full_quantity_received() {
        let f = DeliveryFacts {
            is_order_completed: true,
            is_factory_shipping_completed: true,
            received_quantity: 1200,
            ..facts()
        };
        assert_eq!(derive_delivery_status(&f, today()), DeliveryStatus::Received);
    }

    #[test]
    fn codes_round_trip() {
        for status in ALL_STATUSES {
            assert_eq!(DeliveryStatus::from_code(status.code()), Some(*status));
        }
        assert_eq!(DeliveryStatus::from_code("bogus"), None);
    }

    #[test]
    fn shipping_before_order_is_rejected() {
        let f = DeliveryFacts {
            order_date: Some(date(2024, 6, 10)),
            factory_shipping_date: Some(date(2024, 6, 1)),
            ..facts()
        };
        assert!(validate_delivery_dates(&f).is_err());
    }

    #[test]
    fn shipping_completed_requires_order_completed() {
        let f = DeliveryFacts {
            is_factory_shipping_completed: true,
            ..facts()
        };
        assert!(validate_delivery_dates(&f).is_err());
    }
}
