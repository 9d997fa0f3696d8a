//! # hr-auth
//!
//! Authentication and authorization for hrdash.
//!
//! - Password hashing (argon2)
//! - JWT access tokens carrying role, approval and branch scope
//! - Server-side sessions so tokens can be revoked
//! - The route guard deciding where a visitor may go

pub mod password;
pub mod jwt;
pub mod session;
pub mod current_user;
pub mod guard;

pub use password::{hash_password, verify_password, PasswordError};
pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use session::{Session, SessionStore};
pub use current_user::CurrentUser;
pub use guard::{evaluate, GuardDecision, Requirement, SessionState};
