//! 日志初始化.
//!
//! 控制台与文件两路输出, 文件按日期命名 (`<prefix>.<YYYY-MM-DD>.log`),
//! 跨日后的第一次写入自动切换到新文件. 初始化时删除超过保留天数的旧文件.
//! 库 crate 通过 `log` 门面输出, 由订阅器统一接收.

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 文件日志过滤表达式
    pub level: String,
    /// 控制台日志过滤表达式
    #[serde(default = "default_console_level")]
    pub console_level: String,
    pub directory: String,
    pub file_prefix: String,
    /// 0 表示不清理
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

fn default_console_level() -> String {
    "info".to_string()
}

fn default_retention_days() -> i64 {
    30
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

pub fn init(config: LoggingConfig) -> Result<()> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)
        .with_context(|| format!("创建日志目录失败, path={}", directory.display()))?;

    let today = Local::now().date_naive();
    let removed = cleanup_logs(directory, &config.file_prefix, today, config.retention_days)?;

    let file_appender = DailyFileWriter::new(directory, &config.file_prefix)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD.set(guard).ok();

    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(ConsoleFormatter)
        .with_filter(EnvFilter::new(&config.console_level));

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(EnvFilter::new(&config.level));

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("全局日志订阅器已初始化")?;

    if removed > 0 {
        tracing::info!("已清理 {} 个过期日志文件", removed);
    }
    Ok(())
}

/// 按日期切换文件的写入器
struct DailyFileWriter {
    directory: PathBuf,
    prefix: String,
    date: NaiveDate,
    file: File,
}

impl DailyFileWriter {
    fn new(directory: &Path, prefix: &str) -> Result<Self> {
        let date = Local::now().date_naive();
        let file = open_append_file(&build_current_log_path(directory, prefix, date))?;
        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            date,
            file,
        })
    }

    fn roll_if_needed(&mut self) -> std::io::Result<()> {
        let today = Local::now().date_naive();
        if today == self.date {
            return Ok(());
        }
        let file_path = build_current_log_path(&self.directory, &self.prefix, today);
        self.file = open_append_file(&file_path).map_err(std::io::Error::other)?;
        self.date = today;
        Ok(())
    }
}

impl Write for DailyFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.roll_if_needed()?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

fn open_append_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开日志文件失败, path={}", path.display()))
}

pub(crate) fn build_current_log_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}.{}.log", prefix, date.format("%Y-%m-%d")))
}

/// 从文件名中解析日志日期, 前缀不符时返回 `None`
fn parse_log_date(file_name: &str, prefix: &str) -> Option<NaiveDate> {
    let date = file_name
        .strip_prefix(prefix)?
        .strip_prefix('.')?
        .strip_suffix(".log")?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// 删除早于保留期的日志文件, 返回删除数量
fn cleanup_logs(directory: &Path, prefix: &str, today: NaiveDate, retention_days: i64) -> Result<usize> {
    if retention_days <= 0 {
        return Ok(0);
    }
    let Some(cutoff) = today.checked_sub_signed(chrono::Duration::days(retention_days)) else {
        return Ok(0);
    };

    let mut removed = 0;
    let entries = fs::read_dir(directory)
        .with_context(|| format!("读取日志目录失败, path={}", directory.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(|n| parse_log_date(n, prefix)) else {
            continue;
        };
        if date < cutoff {
            let path = entry.path();
            fs::remove_file(&path)
                .with_context(|| format!("删除过期日志失败, path={}", path.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        let meta = event.metadata();
        write!(
            writer,
            "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}] ",
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis()
        )?;
        let color = match *meta.level() {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        };
        write!(
            writer,
            "{}{:5}\x1b[0m {} > ",
            color,
            meta.level().to_string(),
            meta.target()
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now();
        write!(
            writer,
            "[{}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}] {:5} {} > ",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis(),
            event.metadata().level().to_string(),
            event.metadata().target()
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        match NaiveDate::from_ymd_opt(y, m, d) {
            Some(date) => date,
            None => panic!("测试日期初始化失败"),
        }
    }

    #[test]
    fn test_build_current_log_path() {
        let path = build_current_log_path(Path::new("logs"), "a52", date(2026, 2, 6));
        assert_eq!(path, PathBuf::from("logs/a52.2026-02-06.log"));
    }

    #[test]
    fn test_parse_log_date() {
        assert_eq!(parse_log_date("a52.2026-02-06.log", "a52"), Some(date(2026, 2, 6)));
        assert_eq!(parse_log_date("a52-bench.2026-02-06.log", "a52"), None);
        assert_eq!(parse_log_date("a52.2026-02-06.log.gz", "a52"), None);
        assert_eq!(parse_log_date("a52.latest.log", "a52"), None);
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let dir = tempfile::tempdir().unwrap();
        let today = date(2026, 3, 31);
        for name in [
            "a52.2026-03-31.log",
            "a52.2026-03-01.log",
            "a52.2026-02-01.log",
            "other.2020-01-01.log",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let removed = cleanup_logs(dir.path(), "a52", today, 7).unwrap();
        assert_eq!(removed, 2, "只删除 a52 前缀下早于 7 天的文件");
        assert!(dir.path().join("a52.2026-03-31.log").exists());
        assert!(!dir.path().join("a52.2026-03-01.log").exists());
        assert!(dir.path().join("other.2020-01-01.log").exists());
        assert!(dir.path().join("notes.txt").exists());

        assert_eq!(cleanup_logs(dir.path(), "other", today, 0).unwrap(), 0, "0 表示不清理");
    }

    #[test]
    fn test_config_defaults_from_json() {
        let cfg: LoggingConfig = serde_json::from_str(
            r#"{"level":"debug","directory":"logs","file_prefix":"a52"}"#,
        )
        .unwrap();
        assert_eq!(cfg.console_level, "info");
        assert_eq!(cfg.retention_days, 30);
    }
}
