//! Value Objects - Immutable, identity-less domain primitives

mod bounding_box;
mod email_address;
mod geo_location;
mod region;
mod timezone;
mod user_id;

pub use bounding_box::BoundingBox;
pub use email_address::EmailAddress;
pub use geo_location::GeoLocation;
pub use region::Region;
pub use timezone::Timezone;
pub use user_id::{BusId, UserId};
