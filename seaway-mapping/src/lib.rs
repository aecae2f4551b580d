pub mod accommodations;
pub mod ports;
pub mod service;
pub mod vehicles;

pub use ports::{PortResolution, ResolvedPort};
pub use service::{CodeMappingService, PortMapping};
