pub mod role;
pub mod security_headers;

pub use role::{Permission, Role, RoleMiddleware};
pub use security_headers::SecurityHeaders;
