pub mod context;
pub mod rbac;
pub mod routes;
pub mod session;
pub mod storage;
pub mod store;

pub use context::Permissions;
pub use rbac::{Capability, PermissionTable, Role};
pub use routes::{MemoryNavigator, Navigator, RouteDecision, RouteGuard};
pub use session::{Session, UserProfile};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::SessionStore;
