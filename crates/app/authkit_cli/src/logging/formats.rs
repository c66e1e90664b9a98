use std::io::Write;

use flexi_logger::DeferredNow;
use log::Record;

/// `2024-01-01 12:00:00 INFO  [authkit_core::auth] message`
pub fn cli_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}
