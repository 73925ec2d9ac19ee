mod pipeline;

pub use pipeline::Pipeline;
pub use poke_capture::{Frame, FrameError, FrameStore};
pub use poke_state::ScreenState;
pub use poke_vision::{ClassifierConfig, Profile, ScreenClassifier, VisionError};

/// Install the fmt subscriber; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiny_bot=debug,poke_capture=debug,poke_vision=debug".into()),
        )
        .init();
}
