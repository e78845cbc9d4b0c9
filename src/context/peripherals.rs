// Peripheral systems notified by the game context, as injected interfaces
//
// Each sink is fire-and-forget: no return value flows back into the
// orchestration. Defaults are no-ops so a headless context needs no wiring;
// tests substitute recording doubles.

use crate::actors::ActorId;

/// Ambient sound triggers the context can stop on seat change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundTrigger {
    /// Air brake/pressure hiss
    Air,
    /// Hydraulic pump loop
    Pump,
}

pub trait CameraSink: Send {
    /// Player vehicle changed; `None` means on foot now
    fn notify_vehicle_changed(&self, actor: Option<ActorId>);
}

pub trait OverlaySink: Send {
    fn show_dashboard_overlays(&self, actor: ActorId, visible: bool);
}

pub trait SoundSink: Send {
    fn stop_trigger(&self, actor: ActorId, trigger: SoundTrigger);
}

pub trait ForceFeedbackSink: Send {
    fn set_enabled(&self, enabled: bool);
}

pub trait GfxSceneSink: Send {
    /// Drop the actor's render representation ahead of deregistration
    fn remove_gfx_actor(&self, actor: ActorId);
    fn set_renderdash_active(&self, actor: ActorId, active: bool);
}

/// Local identity used to attribute spawns in a multiplayer session
#[derive(Debug, Clone, Default)]
pub struct NetUserInfo {
    pub username: String,
    pub color: i32,
}

pub trait NetworkSession: Send {
    fn is_connected(&self) -> bool;
    fn local_user(&self) -> NetUserInfo;
}

/// Single-player session; never connected
#[derive(Default)]
pub struct OfflineSession;

impl NetworkSession for OfflineSession {
    fn is_connected(&self) -> bool {
        false
    }

    fn local_user(&self) -> NetUserInfo {
        NetUserInfo::default()
    }
}

struct NullCamera;
struct NullOverlay;
struct NullSound;
struct NullForceFeedback;
struct NullGfxScene;

impl CameraSink for NullCamera {
    fn notify_vehicle_changed(&self, _actor: Option<ActorId>) {}
}

impl OverlaySink for NullOverlay {
    fn show_dashboard_overlays(&self, _actor: ActorId, _visible: bool) {}
}

impl SoundSink for NullSound {
    fn stop_trigger(&self, _actor: ActorId, _trigger: SoundTrigger) {}
}

impl ForceFeedbackSink for NullForceFeedback {
    fn set_enabled(&self, _enabled: bool) {}
}

impl GfxSceneSink for NullGfxScene {
    fn remove_gfx_actor(&self, _actor: ActorId) {}
    fn set_renderdash_active(&self, _actor: ActorId, _active: bool) {}
}

/// Bundle of injected peripheral interfaces
pub struct Peripherals {
    pub camera: Box<dyn CameraSink>,
    pub overlay: Box<dyn OverlaySink>,
    pub sound: Box<dyn SoundSink>,
    pub force_feedback: Box<dyn ForceFeedbackSink>,
    pub gfx: Box<dyn GfxSceneSink>,
}

impl Default for Peripherals {
    fn default() -> Self {
        Self {
            camera: Box::new(NullCamera),
            overlay: Box::new(NullOverlay),
            sound: Box::new(NullSound),
            force_feedback: Box::new(NullForceFeedback),
            gfx: Box::new(NullGfxScene),
        }
    }
}
