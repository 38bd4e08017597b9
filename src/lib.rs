// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod hint;
pub mod intent;
pub mod observability;
pub mod persona;
pub mod render;
pub mod reveal;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{CompletionBackend, CompletionClient, complete_with_truncation_retry};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use reveal::{
    FrameClock, IntervalClock, RevealAnimator, RevealExit, RevealFrame, RevealPhase, RevealState,
    play_reveal,
};
pub use types::*;
