//! Clock helpers.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, FixedOffset, Utc};

/// JST is UTC+9
const JST_OFFSET_SECONDS: i32 = 9 * 3600;

/// Current Unix timestamp in milliseconds (UTC, zone-independent)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix timestamp (milliseconds) as RFC 3339 in JST.
///
/// Out-of-range values fall back to the Unix epoch.
pub fn timestamp_to_jst_rfc3339(millis: i64) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default();
    match FixedOffset::east_opt(JST_OFFSET_SECONDS) {
        Some(jst) => utc.with_timezone(&jst).to_rfc3339(),
        None => utc.to_rfc3339(),
    }
}

/// Clock whose readings never go backwards, even if the wall clock does.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in milliseconds, `>=` every earlier reading of this clock.
    pub fn now_millis(&self) -> i64 {
        self.observe(now_millis())
    }

    fn observe(&self, wall: i64) -> i64 {
        let previous = self.last.fetch_max(wall, Ordering::AcqRel);
        previous.max(wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_utc_epoch_millis() {
        // テスト項目: now_millis はタイムゾーンに依存しない UTC のエポックミリ秒を返す
        let before = Utc::now().timestamp_millis();
        let now = now_millis();
        let after = Utc::now().timestamp_millis();
        assert!(before <= now && now <= after);
    }

    #[test]
    fn test_monotonic_clock_never_goes_backwards() {
        // テスト項目: 壁時計が巻き戻ってもタイムスタンプは減少しない
        // given (前提条件):
        let clock = MonotonicClock::new();

        // when (操作):
        let first = clock.observe(2_000);
        let second = clock.observe(1_000);
        let third = clock.observe(3_000);

        // then (期待する結果):
        assert_eq!(first, 2_000);
        assert_eq!(second, 2_000);
        assert_eq!(third, 3_000);
    }

    #[test]
    fn test_now_millis_is_non_decreasing() {
        // テスト項目: 連続した読み取りが単調非減少である
        let clock = MonotonicClock::new();
        let readings: Vec<i64> = (0..100).map(|_| clock.now_millis()).collect();
        assert!(readings.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_timestamp_to_jst_rfc3339() {
        // テスト項目: JST (+09:00) で RFC 3339 文字列に変換される
        // when (操作):
        let rendered = timestamp_to_jst_rfc3339(0);

        // then (期待する結果):
        assert_eq!(rendered, "1970-01-01T09:00:00+09:00");
    }
}
