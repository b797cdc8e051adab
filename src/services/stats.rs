use std::collections::{HashMap, HashSet};

use mongodb::bson::oid::ObjectId;

use crate::db::store::StoreSnapshot;
use crate::models::qr_code::QrCode;
use crate::models::qr_scan::QrScan;
use crate::models::stats::{CodeStatus, CodeSummary, DashboardStats, ScanSummary, StatsFilter};

/// Live codes with less time left than this are flagged as expiring.
const EXPIRING_WINDOW_MS: i64 = 30_000;
const RECENT_SCANS_PER_CODE: usize = 5;
const SHORT_FINGERPRINT_LEN: usize = 8;

/// Rebuild dashboard stats from a store snapshot as seen at `now`.
///
/// Pure: the same snapshot and `now` always give the same stats. Totals cover
/// the whole snapshot; only the `codes` history is cut to the newest
/// `recent_limit` entries.
pub fn recompute(snapshot: &StoreSnapshot, now: i64, recent_limit: usize) -> DashboardStats {
    let mut scans_by_code: HashMap<ObjectId, Vec<&QrScan>> = HashMap::new();
    for scan in &snapshot.scans {
        scans_by_code.entry(scan.qr_code_id).or_default().push(scan);
    }

    let total_generated = snapshot.codes.len();
    let active_qrs = snapshot
        .codes
        .iter()
        .filter(|qr| qr.is_live_at(now))
        .count();
    let unique_users = snapshot
        .scans
        .iter()
        .map(|scan| scan.user_fingerprint.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut recent: Vec<&QrCode> = snapshot.codes.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(recent_limit);

    let codes = recent
        .into_iter()
        .map(|qr| {
            let scans = qr
                .id
                .and_then(|id| scans_by_code.get(&id))
                .map(Vec::as_slice)
                .unwrap_or_default();
            summarize(qr, scans, now)
        })
        .collect();

    DashboardStats {
        total_generated,
        total_scans: snapshot.scans.len(),
        active_qrs,
        expired_qrs: total_generated - active_qrs,
        unique_users,
        codes,
        computed_at: now,
    }
}

/// Narrow the history view; totals are left untouched.
pub fn filter_view(stats: &DashboardStats, filter: StatsFilter) -> DashboardStats {
    let codes = stats
        .codes
        .iter()
        .filter(|summary| match filter {
            StatsFilter::All => true,
            StatsFilter::Scanned => summary.scan_count > 0,
            StatsFilter::Unscanned => summary.scan_count == 0,
        })
        .cloned()
        .collect();

    DashboardStats {
        codes,
        ..stats.clone()
    }
}

fn summarize(qr: &QrCode, scans: &[&QrScan], now: i64) -> CodeSummary {
    let time_left_ms = qr.time_left_ms(now);
    let status = if qr.is_expired_at(now) {
        CodeStatus::Expired
    } else if time_left_ms < EXPIRING_WINDOW_MS {
        CodeStatus::Expiring
    } else {
        CodeStatus::Active
    };

    let mut newest_first = scans.to_vec();
    newest_first.sort_by(|a, b| b.scanned_at.cmp(&a.scanned_at));
    let recent_scans = newest_first
        .into_iter()
        .take(RECENT_SCANS_PER_CODE)
        .map(|scan| ScanSummary {
            id: scan.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            scanned_at: scan.scanned_at,
            user_fingerprint: scan
                .user_fingerprint
                .chars()
                .take(SHORT_FINGERPRINT_LEN)
                .collect(),
        })
        .collect();

    CodeSummary {
        id: qr.id_hex(),
        code: qr.code.clone(),
        created_at: qr.created_at,
        expires_at: qr.expires_at,
        is_active: qr.is_active,
        status,
        time_left_ms,
        time_left: format_time_left(time_left_ms),
        scan_count: scans.len(),
        recent_scans,
    }
}

/// `m:ss`, e.g. `1:05`
pub fn format_time_left(ms: i64) -> String {
    let ms = ms.max(0);
    format!("{}:{:02}", ms / 60_000, (ms % 60_000) / 1_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn code(token: &str, created_at: i64) -> QrCode {
        let mut qr = QrCode::new(token.to_string(), created_at);
        qr.id = Some(ObjectId::new());
        qr
    }

    fn scan(qr: &QrCode, fingerprint: &str, at: i64) -> QrScan {
        let mut scan = QrScan::new(qr.id.unwrap(), fingerprint.to_string(), at);
        scan.id = Some(ObjectId::new());
        scan
    }

    fn sample() -> StoreSnapshot {
        let fresh = code("fresh", NOW - 10_000);
        let closing = code("closing", NOW - 100_000);
        let old = code("old", NOW - 600_000);
        let mut disabled = code("disabled", NOW - 5_000);
        disabled.is_active = false;

        let scans = vec![
            scan(&fresh, "aaaaaaaaaaaa", NOW - 9_000),
            scan(&fresh, "bbbbbbbbbbbb", NOW - 8_000),
            scan(&old, "aaaaaaaaaaaa", NOW - 590_000),
        ];

        StoreSnapshot {
            codes: vec![old, closing, fresh, disabled],
            scans,
        }
    }

    #[test]
    fn totals_are_consistent() {
        let stats = recompute(&sample(), NOW, 50);

        assert_eq!(stats.total_generated, 4);
        assert_eq!(stats.total_scans, 3);
        assert_eq!(stats.unique_users, 2);
        assert_eq!(stats.active_qrs, 2);
        assert_eq!(stats.expired_qrs, 2);
        assert_eq!(stats.active_qrs + stats.expired_qrs, stats.total_generated);
        assert_eq!(stats.computed_at, NOW);
    }

    #[test]
    fn history_is_newest_first_and_bounded() {
        let stats = recompute(&sample(), NOW, 2);

        let tokens: Vec<&str> = stats.codes.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(tokens, vec!["disabled", "fresh"]);
        // Totals still cover every code
        assert_eq!(stats.total_generated, 4);
    }

    #[test]
    fn summaries_carry_status_and_recent_scans() {
        let stats = recompute(&sample(), NOW, 50);
        let by_token = |t: &str| stats.codes.iter().find(|c| c.code == t).unwrap();

        let fresh = by_token("fresh");
        assert_eq!(fresh.status, CodeStatus::Active);
        assert_eq!(fresh.time_left, "1:50");
        assert_eq!(fresh.scan_count, 2);
        assert_eq!(fresh.recent_scans[0].scanned_at, NOW - 8_000);
        assert_eq!(fresh.recent_scans[0].user_fingerprint, "bbbbbbbb");

        assert_eq!(by_token("closing").status, CodeStatus::Expiring);
        assert_eq!(by_token("old").status, CodeStatus::Expired);
        assert_eq!(by_token("old").time_left, "0:00");
        assert_eq!(by_token("disabled").status, CodeStatus::Expired);
    }

    #[test]
    fn filter_keeps_totals() {
        let stats = recompute(&sample(), NOW, 50);

        let scanned = filter_view(&stats, StatsFilter::Scanned);
        assert_eq!(scanned.codes.len(), 2);
        assert!(scanned.codes.iter().all(|c| c.scan_count > 0));
        assert_eq!(scanned.total_scans, 3);

        let unscanned = filter_view(&stats, StatsFilter::Unscanned);
        assert_eq!(unscanned.codes.len(), 2);
        assert_eq!(filter_view(&stats, StatsFilter::All), stats);
    }

    #[test]
    fn empty_snapshot() {
        let stats = recompute(&StoreSnapshot::default(), NOW, 50);
        assert_eq!(stats.total_generated, 0);
        assert_eq!(stats.unique_users, 0);
        assert!(stats.codes.is_empty());
    }
}
