use tracing::info;

/// Receives the human-readable progress text of interactive strategies.
///
/// Closures work directly: `Arc::new(|msg: &str| println!("{}", msg))`.
pub trait Reporter: Send + Sync {
    fn instruction(&self, message: &str);
}

/// Routes instructions to the `chatscout::instruction` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn instruction(&self, message: &str) {
        info!(target: "chatscout::instruction", "{}", message);
    }
}

impl<F> Reporter for F
where
    F: Fn(&str) + Send + Sync,
{
    fn instruction(&self, message: &str) {
        self(message)
    }
}
