//! # 时间工具
//!
//! 读取文件修改时间，并按本地时区格式化为 `YYYY-MM-DD HH:MM:SS`。
//!
//! ## 依赖关系
//! - 被 `commands/sro.rs` 使用
//! - 使用 `chrono` 做时区换算与格式化

use crate::error::{Result, SqsroError};

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 文件修改时间（Unix 秒）
pub fn modified_seconds(path: &Path) -> Result<f64> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SqsroError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(match modified.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    })
}

/// Unix 秒 -> 本地时间 `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(seconds: f64) -> String {
    format_timestamp_in(seconds, &Local)
}

/// Unix 秒 -> 指定时区的 `YYYY-MM-DD HH:MM:SS`，超出可表示范围时返回原始秒数
fn format_timestamp_in<Tz>(seconds: f64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp(seconds.floor() as i64, 0) {
        Some(utc) => utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => seconds.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_timestamp_utc() {
        assert_eq!(format_timestamp_in(0.0, &Utc), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp_in(951_782_400.0, &Utc), "2000-02-29 00:00:00");
        assert_eq!(format_timestamp_in(1_700_000_000.75, &Utc), "2023-11-14 22:13:20");
        assert_eq!(format_timestamp_in(-1.0, &Utc), "1969-12-31 23:59:59");
    }

    #[test]
    fn test_format_timestamp_applies_offset() {
        let beijing = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(format_timestamp_in(1_700_000_000.0, &beijing), "2023-11-15 06:13:20");
    }

    #[test]
    fn test_format_timestamp_local() {
        assert_eq!(format_timestamp(1_700_000_000.0).len(), 19);
        assert_eq!(format_timestamp(f64::MAX), f64::MAX.to_string());
    }

    #[test]
    fn test_modified_seconds_missing_file() {
        let path = std::env::temp_dir().join("sqsro_no_such_file.out");
        assert!(modified_seconds(&path).is_err());
    }
}
