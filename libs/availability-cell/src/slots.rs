//! Pure slot arithmetic. This is the single source of truth for appointment
//! availability; nothing outside this cell may re-derive slots.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

use crate::models::ShiftWindow;

/// Map a clinic-local calendar date to the shift weekday encoding,
/// 1 = Monday .. 7 = Sunday. Callers pass a plain date; no timezone
/// inference happens here.
pub fn weekday_code(date: NaiveDate) -> u8 {
    match date.weekday() {
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
        Weekday::Sun => 7,
    }
}

pub fn minute_of_day(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// Inverse of [`minute_of_day`]; `None` for values past 23:59.
pub fn time_of_day(minute: u16) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(u32::from(minute) / 60, u32::from(minute) % 60, 0)
}

/// Emit every candidate slot in `[start, end)` at a fixed step, ascending.
/// A shift ending at 17:00 never offers a 17:00 slot. Malformed windows
/// (start >= end) and a zero step produce an empty sequence.
pub fn generate_slots(window: ShiftWindow, step_minutes: u16) -> Vec<u16> {
    if step_minutes == 0 || window.start_minute >= window.end_minute {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut current = window.start_minute;
    while current < window.end_minute {
        slots.push(current);
        current += step_minutes;
    }
    slots
}

/// Keep a slot iff it is at least `buffer_minutes` away from every booked
/// time. The boundary is inclusive-available: a slot exactly one buffer from
/// a booking stays bookable; only a strictly smaller distance excludes it.
pub fn filter_available(slots: &[u16], booked: &[u16], buffer_minutes: u16) -> Vec<u16> {
    slots
        .iter()
        .copied()
        .filter(|slot| booked.iter().all(|b| slot.abs_diff(*b) >= buffer_minutes))
        .collect()
}
