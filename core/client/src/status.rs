use log::info;

/// Receives short human readable status lines, e.g. for a device display.
pub trait StatusSink: Send {
    fn append(&mut self, line: &str);
}

/// Forwards status lines to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn append(&mut self, line: &str) {
        info!("status: {}", line);
    }
}
