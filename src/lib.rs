// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod classify;
pub mod editor;
pub mod geom;
pub mod input;
pub mod library;
pub mod matcher;
pub mod overlay;
pub mod recorder;
pub mod runtime;
pub mod session;
pub mod ui;

/// Frame interval of the driver loop.
pub const TICK_RATE_MS: u64 = 100;
