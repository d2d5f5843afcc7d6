pub mod api_client;
pub mod auth_service;
pub mod pagos_service;

// Re-export commonly used types
pub use api_client::ApiClient;
pub use auth_service::{AuthService, LoginFailureKind, LoginOutcome};
pub use pagos_service::PagosService;
