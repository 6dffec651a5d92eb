//! Validated value types shared by both aggregates

mod ids;
mod postal_code;
mod report_description;
mod station_id;

pub use ids::{ReportId, TicketId};
pub use postal_code::PostalCode;
pub use report_description::{ReportDescription, DESCRIPTION_MAX_LEN, DESCRIPTION_MIN_LEN};
pub use station_id::{StationId, STATION_ID_MAX_LEN};
