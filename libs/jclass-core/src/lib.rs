mod flags;
mod ty;
mod utils;

pub use flags::*;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
pub use ty::*;
pub use utils::*;

static START: Once = Once::new();

pub fn init() {
	init_with(Level::INFO);
}

/// Installs the global subscriber once. Later calls are ignored, whatever their level.
pub fn init_with(level: Level) {
	START.call_once(|| {
		// The per-entry constant pool and per-instruction traces drown everything else.
		let noisy = level.min(Level::DEBUG);
		let filter = filter::Targets::new()
			.with_default(level)
			.with_target("jclass_reader::consts", noisy)
			.with_target("jclass_reader::code", noisy);
		let layered = tracing_subscriber::registry()
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.with(filter);

		// Somebody else (a test harness, an embedding application) may already own the slot.
		let _ = layered.try_init();
	});
}
