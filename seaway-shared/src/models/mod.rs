pub mod accommodation;
pub mod money;
pub mod passengers;
pub mod reservation;
pub mod sailing;
pub mod vehicles;
