pub mod auth;
pub mod pago;

// Re-export commonly used types
pub use auth::*;
pub use pago::*;
