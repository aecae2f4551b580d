pub mod models;
pub mod orchestrator;
pub mod payment;
pub mod sweep;

pub use models::{BookingHold, ConfirmOutcome, HoldReceipt, HoldRequest, HoldState};
pub use orchestrator::BookingOrchestrator;
pub use payment::{PaymentBridge, PaymentSignal};
