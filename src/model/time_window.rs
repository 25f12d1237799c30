//! Day-part buckets: morning, afternoon, evening, night.

use jiff::civil::Time;

/// The day-part a clock time falls into.
///
/// Night wraps past midnight ([22,24) ∪ [0,5)), so times cannot be
/// ordered as plain hour values; see [`TimeWindow::order_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// [05:00, 12:00)
    Morning,

    /// [12:00, 17:00)
    Afternoon,

    /// [17:00, 22:00)
    Evening,

    /// [22:00, 24:00) ∪ [00:00, 05:00)
    Night,
}

impl TimeWindow {
    /// The bucket containing the given time.
    pub fn of(time: Time) -> Self {
        match time.hour() {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=21 => Self::Evening,
            // 22, 23, and the post-midnight hours 0..=4.
            _ => Self::Night,
        }
    }

    /// Position of this bucket in the day's display order.
    pub fn rank(self) -> u8 {
        match self {
            Self::Morning => 0,
            Self::Afternoon => 1,
            Self::Evening => 2,
            Self::Night => 3,
        }
    }

    /// Total-order key for a time: bucket rank, then the hour's index
    /// within the bucket's hour list, then minute.
    ///
    /// Night's hour list is 22, 23, 0, 1, 2, 3, 4 — so 00:30 sorts after
    /// 23:00, keeping the small hours at the end of the day.
    #[allow(clippy::cast_sign_loss)] // Hour and minute are non-negative.
    pub fn order_key(time: Time) -> (u8, u8, u8) {
        let window = Self::of(time);
        let hour = time.hour();
        let index = match window {
            Self::Morning => hour - 5,
            Self::Afternoon => hour - 12,
            Self::Evening => hour - 17,
            Self::Night => {
                if hour >= 22 {
                    hour - 22
                } else {
                    hour + 2
                }
            }
        };
        (window.rank(), index as u8, time.minute() as u8)
    }
}
