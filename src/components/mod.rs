// Export components
pub mod availability;
pub mod booking;
pub mod reviews;
pub mod storage;

// Re-export Booking handle
pub use booking::BookingHandle;
// Re-export stores
pub use storage::{BookingStore, InMemoryStore, JsonFileStore};
