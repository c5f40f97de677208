pub mod claims;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod repo;
pub mod services;
pub mod session;

pub use handlers::{logout, ChangePasswordForm, LoginForm, RegisterForm};
pub use session::Session;
