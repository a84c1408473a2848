//! Conversions between whole seconds, display strings and H/M/S form fields

/// Hours, minutes and seconds of a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Components {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Components {
    pub fn to_seconds(self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes * 60)
            .saturating_add(self.seconds)
    }
}

/// Format seconds as `H:MM:SS` from one hour upwards, `M:SS` below that
pub fn format_duration(seconds: u64) -> String {
    let Components {
        hours,
        minutes,
        seconds,
    } = parse_components(seconds);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Format a fractional number of seconds, dropping the sub-second part.
/// Negative and non-finite inputs render as `0:00`.
pub fn format_secs_f64(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return format_duration(0);
    }
    format_duration(seconds.floor() as u64)
}

/// Split seconds into hours, minutes and seconds
pub fn parse_components(seconds: u64) -> Components {
    Components {
        hours: seconds / 3600,
        minutes: (seconds % 3600) / 60,
        seconds: seconds % 60,
    }
}

/// Combine H/M/S text fields into whole seconds.
///
/// Each field is read independently; empty or non-numeric text counts as 0.
/// Hours are only clamped at zero, minutes and seconds are clamped to 0..=59.
pub fn to_seconds(hours: &str, minutes: &str, seconds: &str) -> u64 {
    let hours = parse_int_prefix(hours).max(0) as u64;
    let minutes = parse_int_prefix(minutes).clamp(0, 59) as u64;
    let seconds = parse_int_prefix(seconds).clamp(0, 59) as u64;
    Components {
        hours,
        minutes,
        seconds,
    }
    .to_seconds()
}

/// Text to prefill an edit form with. An empty hours field stands for zero hours.
pub fn edit_fields(seconds: u64) -> (String, String, String) {
    let components = parse_components(seconds);
    let hours = if components.hours > 0 {
        components.hours.to_string()
    } else {
        String::new()
    };
    (
        hours,
        components.minutes.to_string(),
        components.seconds.to_string(),
    )
}

/// Read the leading integer of `text`, ignoring surrounding whitespace and any
/// trailing garbage (`"12abc"` is 12). Returns 0 when there is no leading integer.
fn parse_int_prefix(text: &str) -> i64 {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if negative { -value } else { value }
}
