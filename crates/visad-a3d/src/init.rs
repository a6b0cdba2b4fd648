//! Initialization of the render engine.
//!
//! There is no global engine: [`init()`] hands back the
//! [`RenderEngineContext`] that displays are built on, and callers pass it
//! on explicitly.

use std::path::Path;

use crate::{Options, RenderEngineContext, Result};

/// Initializes logging and creates a render engine context.
///
/// Logging is set up through `env_logger` on the first call; later calls
/// leave the installed logger alone, so tests and embedders may call this
/// repeatedly.
///
/// # Example
///
/// ```no_run
/// use visad_a3d::*;
///
/// fn main() -> Result<()> {
///     let engine = init(Options::default())?;
///     let display = Display3D::new(engine, 800, 600)?;
///     Ok(())
/// }
/// ```
pub fn init(options: Options) -> Result<RenderEngineContext> {
    let _ = env_logger::try_init();
    log::info!(
        "visad-a3d initialized (frame interval {:?}, knots {})",
        options.frame_interval(),
        options.knots_convert
    );
    Ok(RenderEngineContext::new(options))
}

/// Initializes with options parsed from a JSON document.
///
/// Fields missing from the document keep their defaults.
pub fn init_from_json(json: &str) -> Result<RenderEngineContext> {
    init(Options::from_json_str(json)?)
}

/// Initializes with options loaded from a JSON file.
pub fn init_from_file(path: impl AsRef<Path>) -> Result<RenderEngineContext> {
    let path = path.as_ref();
    let options = Options::load(path)?;
    log::debug!("loaded options from {}", path.display());
    init(options)
}

/// Shuts an engine down, applying any scene tasks still queued.
///
/// Handles obtained from the engine report [`crate::VisadError::EngineClosed`]
/// afterwards.
pub fn shutdown(mut engine: RenderEngineContext) {
    let stats = engine.run_frame(std::time::Duration::ZERO);
    log::info!(
        "visad-a3d shut down after {} frames ({} tasks flushed)",
        stats.frame,
        stats.tasks_applied
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        let first = init(Options::default()).unwrap();
        let second = init(Options::default()).unwrap();
        assert!(first.scene().contains(first.scene().root()));
        assert_eq!(second.clock().frame(), 0);
    }

    #[test]
    fn test_init_from_json() {
        let engine = init_from_json(r#"{ "frame_interval_ms": 40, "knots_convert": false }"#).unwrap();
        assert!(!engine.options().knots_convert);
        assert_eq!(engine.clock().interval().as_millis(), 40);
        assert!(init_from_json("{ not json").is_err());
    }

    #[test]
    fn test_shutdown_closes_handles() {
        let engine = init(Options::default()).unwrap();
        let handle = engine.handle();
        shutdown(engine);
        assert!(handle.submit(|_| {}).is_err());
    }
}
