//! Calendar events for the MJ calendar view.
//!
//! Events are derived on read from project dates and packing-list dates.
//! Nothing about the calendar is persisted.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::DbId;

/// Widest range a single calendar request may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventKind {
    Order,
    FactoryShipping,
    Packing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub kind: CalendarEventKind,
    pub title: String,
    pub project_id: Option<DbId>,
    /// Set on factory-shipping events once the shipment left the factory.
    pub completed: bool,
}

/// Date columns of one project relevant to the calendar.
#[derive(Debug, Clone)]
pub struct ProjectDates {
    pub project_id: DbId,
    pub name: String,
    pub order_date: Option<NaiveDate>,
    pub is_order_completed: bool,
    pub factory_shipping_date: Option<NaiveDate>,
    pub is_factory_shipping_completed: bool,
}

/// One distinct packing shipment (date + code).
#[derive(Debug, Clone)]
pub struct PackingDate {
    pub pl_date: NaiveDate,
    pub packing_code: String,
    pub project_id: Option<DbId>,
}

pub fn validate_range(from: NaiveDate, to: NaiveDate) -> Result<(), String> {
    if to < from {
        return Err("Calendar range end must not precede its start".to_string());
    }
    if (to - from).num_days() > MAX_RANGE_DAYS {
        return Err(format!(
            "Calendar range must not exceed {MAX_RANGE_DAYS} days"
        ));
    }
    Ok(())
}

/// Build the events falling inside `[from, to]`, sorted by date then kind.
pub fn build_events(
    projects: &[ProjectDates],
    packings: &[PackingDate],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<CalendarEvent> {
    let in_range = |d: NaiveDate| d >= from && d <= to;
    let mut events = Vec::new();

    for p in projects {
        if let Some(date) = p.order_date.filter(|d| in_range(*d)) {
            events.push(CalendarEvent {
                date,
                kind: CalendarEventKind::Order,
                title: format!("{} 발주", p.name),
                project_id: Some(p.project_id),
                completed: p.is_order_completed,
            });
        }
        if let Some(date) = p.factory_shipping_date.filter(|d| in_range(*d)) {
            events.push(CalendarEvent {
                date,
                kind: CalendarEventKind::FactoryShipping,
                title: format!("{} 출고", p.name),
                project_id: Some(p.project_id),
                completed: p.is_factory_shipping_completed,
            });
        }
    }

    for pl in packings.iter().filter(|pl| in_range(pl.pl_date)) {
        events.push(CalendarEvent {
            date: pl.pl_date,
            kind: CalendarEventKind::Packing,
            title: format!("패킹 {}", pl.packing_code),
            project_id: pl.project_id,
            completed: false,
        });
    }

    events.sort_by_key(|e| (e.date, e.kind as u8));
    events
}
