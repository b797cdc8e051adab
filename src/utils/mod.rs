pub mod fingerprint;
pub mod jwt;
pub mod render;
