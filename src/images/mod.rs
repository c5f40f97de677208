pub mod services;

pub use services::{validate_logo, LogoError, LogoFile, ALLOWED_LOGO_TYPES, MAX_LOGO_BYTES};
