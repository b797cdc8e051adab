pub mod qr_code;
pub mod qr_scan;
pub mod scan_outcome;
pub mod stats;
