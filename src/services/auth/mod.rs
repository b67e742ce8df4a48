pub mod ownership;
pub mod password;
pub mod role;
pub mod token;

pub use password::PasswordHasher;
pub use role::Role;
pub use token::TokenService;
