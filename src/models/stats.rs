use serde::{Deserialize, Serialize};

/// Which codes the history view keeps.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatsFilter {
    #[default]
    All,
    Scanned,
    Unscanned,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CodeStatus {
    Active,
    Expiring, // Live, but less than 30 seconds left
    Expired,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub id: String,
    pub scanned_at: i64,
    pub user_fingerprint: String, // Shortened for display
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CodeSummary {
    pub id: String,
    pub code: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub is_active: bool,
    pub status: CodeStatus,
    pub time_left_ms: i64,
    pub time_left: String, // m:ss
    pub scan_count: usize,
    pub recent_scans: Vec<ScanSummary>,
}

/// Derived dashboard state; rebuilt from scratch on every refresh.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_generated: usize,
    pub total_scans: usize,
    pub active_qrs: usize,
    pub expired_qrs: usize,
    pub unique_users: usize,
    pub codes: Vec<CodeSummary>,
    pub computed_at: i64,
}
