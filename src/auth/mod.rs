mod helpers;
mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtKeys};
pub use middleware::{AuthError, CurrentUser};
pub use password::PasswordHasher;
