// Named collision boxes (event boxes) registered by terrain objects
//
// Boxes are keyed by (object instance name, box name); scripting and the
// actor manager query them to find actors standing inside a box.

use dashmap::DashMap;
use glam::Vec3;

/// Axis-aligned event box in world space
#[derive(Debug, Clone, Copy)]
pub struct EventBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl EventBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Registry of event boxes for the loaded terrain
#[derive(Default)]
pub struct CollisionContext {
    boxes: DashMap<(String, String), EventBox>,
}

impl CollisionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_box(&self, instance_name: &str, box_name: &str, event_box: EventBox) {
        self.boxes
            .insert((instance_name.to_string(), box_name.to_string()), event_box);
    }

    pub fn lookup_box(&self, instance_name: &str, box_name: &str) -> Option<EventBox> {
        self.boxes
            .get(&(instance_name.to_string(), box_name.to_string()))
            .map(|entry| *entry.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_box_contains() {
        let event_box = EventBox::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0));
        assert!(event_box.contains(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!event_box.contains(Vec3::new(0.0, 3.0, 0.0)));
        assert!(!event_box.contains(Vec3::new(2.0, 1.0, 0.0)));
    }

    #[test]
    fn test_event_box_normalizes_corners() {
        // Corners may arrive in any order from terrain definitions
        let event_box = EventBox::new(Vec3::new(1.0, 2.0, 1.0), Vec3::new(-1.0, 0.0, -1.0));
        assert!(event_box.contains(Vec3::ZERO));
    }

    #[test]
    fn test_lookup_registered_box() {
        let context = CollisionContext::new();
        context.register_box(
            "garage_spawn",
            "spawnzone",
            EventBox::new(Vec3::ZERO, Vec3::ONE),
        );
        assert!(context.lookup_box("garage_spawn", "spawnzone").is_some());
        assert!(context.lookup_box("garage_spawn", "other").is_none());
    }
}
