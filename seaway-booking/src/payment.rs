//! Bridges the external payment confirmation signal onto the hold state
//! machine: a successful payment confirms the hold at its snapshot price,
//! a failed or timed-out payment releases it.

use std::sync::Arc;

use tracing::{info, warn};

use seaway_core::error::BookingError;

use crate::models::ConfirmOutcome;
use crate::orchestrator::BookingOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentSignal {
    Succeeded,
    Failed,
    TimedOut,
}

pub struct PaymentBridge {
    orchestrator: Arc<BookingOrchestrator>,
}

impl PaymentBridge {
    pub fn new(orchestrator: Arc<BookingOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn apply(
        &self,
        hold_ref: &str,
        signal: PaymentSignal,
    ) -> Result<ConfirmOutcome, BookingError> {
        match signal {
            PaymentSignal::Succeeded => {
                let hold = self
                    .orchestrator
                    .hold_snapshot(hold_ref)
                    .await
                    .ok_or_else(|| BookingError::NoSuchHold(hold_ref.to_string()))?;
                // Payment was taken at the snapshot price, so confirming at
                // it can never trip the mismatch check.
                self.orchestrator.confirm_hold(hold_ref, &hold.price).await
            }
            PaymentSignal::Failed | PaymentSignal::TimedOut => {
                warn!(hold_ref, ?signal, "payment did not complete, releasing hold");
                self.orchestrator.release_hold(hold_ref).await?;
                info!(hold_ref, "hold released on payment failure");
                Ok(ConfirmOutcome::Failed)
            }
        }
    }
}
