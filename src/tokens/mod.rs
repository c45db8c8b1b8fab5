pub mod jwt;
pub mod password;

pub use jwt::{Claims, Identity, TokenError, TokenService};
pub use password::{check_length, CredentialError, PasswordHasher, MAX_PASSWORD_LEN};
