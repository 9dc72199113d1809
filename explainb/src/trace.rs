//! Per-run logging context, passed explicitly instead of living in a
//! global. The comparison core stays pure; only the orchestration layer
//! talks to stderr.

#[derive(Debug, Clone, Copy, Default)]
pub struct RunTrace {
    verbose: bool,
}

impl RunTrace {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        eprintln!("explainb: {}", message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if self.verbose {
            eprintln!("explainb: {}", message.as_ref());
        }
    }
}
