pub mod context;
pub mod error;
pub mod operator;
pub mod retry;

pub use context::BookingContext;
pub use error::{BookingError, OperatorCallError, OperatorError, SearchError};
pub use operator::{
    NormalizedOperatorSearch, OperatorAdapter, OperatorBookingRequest, OperatorBookingStatus,
    OperatorConfirmation, ReferenceEntry, SearchHit,
};
pub use retry::RetryPolicy;
