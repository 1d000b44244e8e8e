/// All database primary keys are MySQL `BIGINT AUTO_INCREMENT`.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (order dates, shipment dates) carry no time zone.
pub type BusinessDate = chrono::NaiveDate;
