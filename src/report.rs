//! Human-readable rendering of pass predictions.

use crate::flyover::{FlyoverReport, PassTime};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S %Z";

/// Format the rise time of a pass in UTC, or in `tz` when given.
pub fn format_risetime(risetime: i64, tz: Option<Tz>) -> String {
    let Some(utc) = DateTime::<Utc>::from_timestamp(risetime, 0) else {
        return format!("{} (epoch seconds)", risetime);
    };
    match tz {
        Some(tz) => utc.with_timezone(&tz).format(TIME_FORMAT).to_string(),
        None => utc.format(TIME_FORMAT).to_string(),
    }
}

pub fn format_pass(pass: &PassTime, tz: Option<Tz>) -> String {
    format!(
        "Next pass at {} for {} seconds!",
        format_risetime(pass.risetime, tz),
        pass.duration
    )
}

/// One line per pass, in the order given.
pub fn render_passes(passes: &[PassTime], tz: Option<Tz>) -> String {
    passes
        .iter()
        .map(|p| format_pass(p, tz))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Banner describing where the predictions are for.
pub fn location_line(report: &FlyoverReport) -> String {
    match &report.ip {
        Some(ip) => format!("\u{1F4CD} {} (IP {})", report.coordinates, ip),
        None => format!("\u{1F4CD} {}", report.coordinates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flyover::Coordinates;

    #[test]
    fn test_format_pass_utc() {
        let pass = PassTime { risetime: 1_600_000_000, duration: 600 };
        assert_eq!(
            format_pass(&pass, None),
            "Next pass at Sun Sep 13 2020 12:26:40 UTC for 600 seconds!"
        );
    }

    #[test]
    fn test_format_pass_in_zone() {
        let tz: Tz = "Europe/Stockholm".parse().unwrap();
        assert_eq!(
            format_risetime(1_600_000_000, Some(tz)),
            "Sun Sep 13 2020 14:26:40 CEST"
        );
    }

    #[test]
    fn test_out_of_range_risetime() {
        assert_eq!(format_risetime(i64::MAX, None), format!("{} (epoch seconds)", i64::MAX));
    }

    #[test]
    fn test_render_keeps_order() {
        let passes = [
            PassTime { risetime: 1_600_000_000, duration: 600 },
            PassTime { risetime: 0, duration: 1 },
        ];
        let out = render_passes(&passes, None);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("2020"));
        assert!(lines[1].contains("Thu Jan 01 1970 00:00:00 UTC for 1 seconds!"));
    }

    #[test]
    fn test_location_line() {
        let report = FlyoverReport {
            ip: Some("1.2.3.4".into()),
            coordinates: Coordinates::new(40.7, -74.0),
            passes: vec![],
        };
        assert!(location_line(&report).ends_with("40.7000, -74.0000 (IP 1.2.3.4)"));
    }
}
