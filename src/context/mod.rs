// The orchestration core and its injected collaborators

pub mod game_context;
pub mod peripherals;

pub use game_context::{GameContext, LastSpawnInfo};
pub use peripherals::{
    CameraSink, ForceFeedbackSink, GfxSceneSink, NetUserInfo, NetworkSession, OfflineSession,
    OverlaySink, Peripherals, SoundSink, SoundTrigger,
};
