// Taskhub Infrastructure - Auth Adapter
// Implements: TokenService (HS256 JWT), PasswordHasher (salted SHA-256)

mod password;
mod token;

pub use password::Sha256PasswordHasher;
pub use token::{JwtConfig, JwtTokenService};
