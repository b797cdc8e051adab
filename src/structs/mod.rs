pub mod auth_request;
pub mod qr_request;
pub mod scan_request;
pub mod stats_request;
