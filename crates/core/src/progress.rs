//! Callback-based progress reporting (§9 Design Notes), injected into the
//! reader and packer by whichever driver embeds the codec. The codec never
//! references a UI directly.

pub trait Progress: Send + Sync {
    fn on_status(&self, _msg: &str) {}
    fn on_progress(&self, _percent: u8) {}
    fn on_log(&self, _msg: &str) {}
}

/// No-op default, used when a caller doesn't care about progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl Progress for NullProgress {}

/// Routes callbacks through the `log` facade, the same split the teacher
/// uses between `info!` phase markers and `debug!` per-item detail.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn on_status(&self, msg: &str) {
        log::info!("{msg}");
    }

    fn on_progress(&self, percent: u8) {
        log::debug!("progress: {percent}%");
    }

    fn on_log(&self, msg: &str) {
        log::debug!("{msg}");
    }
}
