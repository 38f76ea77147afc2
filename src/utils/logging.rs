//! Logging utilities
//!
//! Provides logging setup. Native hosts log through `env_logger` (configured
//! by `RUST_LOG`); in the browser records go to the devtools console.

/// Install the logger for this host; repeated calls are ignored
#[cfg(not(target_arch = "wasm32"))]
pub fn setup_logging() {
    let _ = env_logger::try_init();
}

#[cfg(target_arch = "wasm32")]
pub use console::setup_logging;

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use wasm_bindgen::JsValue;

    struct ConsoleLogger;

    static LOGGER: ConsoleLogger = ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let line = JsValue::from_str(&format!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            ));
            match record.level() {
                Level::Error => web_sys::console::error_1(&line),
                Level::Warn => web_sys::console::warn_1(&line),
                Level::Info => web_sys::console::info_1(&line),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
            }
        }

        fn flush(&self) {}
    }

    /// Install the console logger; repeated calls are ignored
    pub fn setup_logging() {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Info);
        }
    }
}
