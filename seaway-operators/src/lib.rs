pub mod adriatic;
pub mod connection;
mod http;
pub mod maghreb;
pub mod mock;
pub mod registry;

pub use adriatic::AdriaticSeaways;
pub use connection::SharedConnection;
pub use maghreb::MaghrebFerries;
pub use mock::MockOperator;
pub use registry::OperatorRegistry;
