pub mod app_config;
pub mod cache;
pub mod redis_cache;
pub mod reservations;

pub use app_config::Config;
pub use cache::{CacheError, CacheStore, MemoryCache};
pub use redis_cache::RedisCache;
pub use reservations::{MemoryReservationStore, ReservationStore, SailingLoad, StoreError};
