//! Authentication: password hashing, access tokens, request authorization, accounts.

mod handlers;
mod jwt;
mod password;
mod resolver;
mod service;

pub use handlers::{login, logout, register, LoginRequest, MessageResponse, RegisterRequest};
pub use jwt::{Claims, TokenError, TokenService};
pub use password::{hash_password, verify_password};
pub use resolver::{bearer_token, resolve_principal, AuthFailure};
pub use service::{AccountService, LoginGrant, NewAccount};
