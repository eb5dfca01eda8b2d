//! # Clock（時刻プロバイダ）
//!
//! 配信ユースケースが `queued` へ遷移する時刻や送信ジョブの登録時刻を
//! テストで固定できるようにするための抽象化。

use chrono::{DateTime, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
   fn now(&self) -> DateTime<Utc>;
}

/// システム時刻
pub struct SystemClock;

impl Clock for SystemClock {
   fn now(&self) -> DateTime<Utc> {
      Utc::now()
   }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
   now: DateTime<Utc>,
}

impl FixedClock {
   pub fn new(now: DateTime<Utc>) -> Self {
      Self { now }
   }
}

impl Clock for FixedClock {
   fn now(&self) -> DateTime<Utc> {
      self.now
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_system_clockは呼び出し前後の範囲内の時刻を返す() {
      let before = Utc::now();
      let result = SystemClock.now();
      let after = Utc::now();

      assert!(before <= result && result <= after);
   }

   #[test]
   fn test_fixed_clockは何度呼んでも同じ時刻を返す() {
      let fixed = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
      let clock = FixedClock::new(fixed);

      assert_eq!(clock.now(), fixed);
      assert_eq!(clock.now(), clock.now());
   }
}
