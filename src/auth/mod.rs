//! Authentication and authorization module

pub mod gate;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use gate::{authenticate, bearer_token, AuthError};
pub use jwt::{Claims, JwtService, TokenError, TOKEN_LIFETIME_SECS};
pub use middleware::{authorization_header, jwt_auth_middleware, AuthContext, OwnerGuard};
pub use password::PasswordHasher;
