//! Order record, lifecycle status and timeline projection.

mod record;
mod status;
mod timeline;
mod value_objects;

pub use record::Order;
pub use status::OrderStatus;
pub use timeline::{Milestone, OrderTimestamps, TimelineStep, derive_timeline, timeline_for};
pub use value_objects::{Money, PaymentMethod, PaymentStatus};
