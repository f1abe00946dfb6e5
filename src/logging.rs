use tracing_subscriber::fmt;

/// Initialize tracing for the process.
///
/// Safe to call more than once; later calls are no-ops. Tests call this from
/// fixtures without worrying about double initialization.
pub fn init() {
    let _ = fmt().with_target(true).try_init();
}
