// Time-ordered candle history for one instrument/timeframe selection
use shared::models::Candle;

/// What `replace_or_append_tail` did with the incoming candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailUpdate {
    Replaced,
    Appended,
}

/// Ascending, duplicate-free sequence of candles.
///
/// Only the last candle (the tail) is ever rewritten in place; everything
/// before it is append-only once committed. Gaps between candles are neither
/// assumed nor validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self { candles: Vec::new() }
    }

    pub fn from_candles(candles: Vec<Candle>) -> Self {
        debug_assert!(is_strictly_ascending(&candles), "candles must be strictly ascending by time");
        Self { candles }
    }

    /// Wholesale repopulation, used by the initial historical load.
    pub fn replace_all(&mut self, candles: Vec<Candle>) {
        debug_assert!(is_strictly_ascending(&candles), "candles must be strictly ascending by time");
        self.candles = candles;
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    /// Live upsert: rewrite the tail when the time matches, append otherwise.
    ///
    /// The feed is trusted to deliver non-decreasing times. A tick older than
    /// the tail is appended as-is; it is logged but not rejected.
    pub fn replace_or_append_tail(&mut self, candle: Candle) -> TailUpdate {
        match self.candles.last_mut() {
            Some(last) if last.time == candle.time => {
                *last = candle;
                TailUpdate::Replaced
            }
            Some(last) => {
                if candle.time < last.time {
                    tracing::warn!(
                        tick_time = candle.time,
                        tail_time = last.time,
                        "Out-of-order live tick appended after a newer tail"
                    );
                }
                self.candles.push(candle);
                TailUpdate::Appended
            }
            None => {
                self.candles.push(candle);
                TailUpdate::Appended
            }
        }
    }

    /// Backfill: `older ++ self`. `older` must be ascending and end before the
    /// current earliest candle. Returns the number of candles added.
    pub fn prepend_page(&mut self, older: Vec<Candle>) -> usize {
        if older.is_empty() {
            return 0;
        }
        debug_assert!(is_strictly_ascending(&older), "page must be strictly ascending by time");
        debug_assert!(
            match (older.last(), self.earliest_time()) {
                (Some(last), Some(earliest)) => last.time < earliest,
                _ => true,
            },
            "page must strictly precede the current series"
        );
        let added = older.len();
        let mut merged = older;
        merged.append(&mut self.candles);
        self.candles = merged;
        added
    }

    pub fn earliest_time(&self) -> Option<i64> {
        self.candles.first().map(|c| c.time)
    }

    pub fn latest_time(&self) -> Option<i64> {
        self.candles.last().map(|c| c.time)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// The last `limit` candles strictly before `end_exclusive` (or the last
    /// `limit` overall when no bound is given), still ascending.
    pub fn window_before(&self, end_exclusive: Option<i64>, limit: usize) -> Vec<Candle> {
        let end = match end_exclusive {
            Some(bound) => self.candles.partition_point(|c| c.time < bound),
            None => self.candles.len(),
        };
        let start = end.saturating_sub(limit);
        self.candles[start..end].to_vec()
    }
}

fn is_strictly_ascending(candles: &[Candle]) -> bool {
    candles.windows(2).all(|w| w[0].time < w[1].time)
}
