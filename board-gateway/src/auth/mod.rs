pub mod identity;
pub mod token;

pub use identity::{authenticate, IdentityExtractor};
pub use token::{Claims, JwtVerifier, TokenError, TokenVerifier};
