use crate::qemu_fmt::DebugCon;
use core::fmt;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log` backend writing to the QEMU debug console.
///
/// Filtering is left to [`log::max_level`], set once by [`init_logger`].
pub struct QemuLogger;

static LOGGER: QemuLogger = QemuLogger;

/// Installs [`QemuLogger`] as the global logger. Call this once during early init.
///
/// # Errors
/// Returns [`SetLoggerError`] if a logger was already installed.
pub fn init_logger(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(max_level);
    Ok(())
}

/// Formats a record as `"[LEVEL] target: message\n"`.
///
/// # Errors
/// Propagates errors of the underlying writer.
pub fn write_record<W: fmt::Write>(out: &mut W, record: &Record) -> fmt::Result {
    writeln!(
        out,
        "[{}] {}: {}",
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for QemuLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let _ = write_record(&mut DebugCon, record);
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn record_line_format() {
        let mut out = String::new();
        write_record(
            &mut out,
            &Record::builder()
                .args(format_args!("drew {} pixels", 2550))
                .level(Level::Info)
                .target("raster")
                .build(),
        )
        .unwrap();
        assert_eq!(out, "[INFO] raster: drew 2550 pixels\n");
    }

    #[test]
    fn warn_level_is_upper_case() {
        let mut out = String::new();
        write_record(
            &mut out,
            &Record::builder()
                .args(format_args!("fallback"))
                .level(Level::Warn)
                .target("select")
                .build(),
        )
        .unwrap();
        assert!(out.starts_with("[WARN] select: "));
    }
}
