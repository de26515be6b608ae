use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    pub fn init() {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minipack=info"));

        // A second init (e.g. from tests) keeps the first subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }

    pub fn build_start(entry: &str, output: &str) {
        info!("📦 minipack build");
        info!("📁 Entry: {}", entry);
        info!("🎯 Output: {}", output);
    }

    pub fn visiting_module(id: &str) {
        debug!("🔍 Transforming module: {}", id);
    }

    pub fn resolved(specifier: &str, referrer: &str, id: &str) {
        debug!("🔗 '{}' from {} → {}", specifier, referrer, id);
    }

    pub fn graph_complete(modules: usize) {
        info!("🕸️  Dependency graph closed: {} modules", modules);
    }

    pub fn build_complete(modules: usize, output: &str, build_time: std::time::Duration) {
        info!("✅ Bundled {} modules into {} in {:.2?}", modules, output, build_time);
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
