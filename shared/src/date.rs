//! 时间展示模块
//!
//! 后端以 RFC 3339 字符串传输时间（如 `2024-05-01T08:30:00Z`），
//! 这里负责将其转换为界面展示格式。

use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// 界面展示格式：日.月.年 时:分
const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// 解析后端时间字符串
///
/// 依次尝试 RFC 3339 与不带时区的 `YYYY-MM-DD HH:MM:SS` 格式。
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// 格式化时间用于展示，无法解析时原样返回
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rfc3339() {
        assert_eq!(format_timestamp("2024-05-01T08:30:00Z"), "01.05.2024 08:30");
        assert_eq!(
            format_timestamp("2024-05-01T08:30:00+03:00"),
            "01.05.2024 08:30"
        );
    }

    #[test]
    fn test_format_naive() {
        assert_eq!(format_timestamp("2024-12-31 23:59:00"), "31.12.2024 23:59");
    }

    #[test]
    fn test_unparseable_is_returned_verbatim() {
        assert_eq!(format_timestamp("вчера"), "вчера");
        assert!(parse_timestamp("").is_none());
    }
}
