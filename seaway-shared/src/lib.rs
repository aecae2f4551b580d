pub mod models;

pub use models::accommodation::{AccommodationCategory, AccommodationOption};
pub use models::money::Money;
pub use models::passengers::{PassengerCounts, PassengerType};
pub use models::reservation::{LocalReservation, ReservationKind, ReservationStatus};
pub use models::sailing::{PassengerPrice, SailingResult, VehiclePrice};
pub use models::vehicles::VehicleClass;
