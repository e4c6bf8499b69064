use crate::model::StomaId;
use std::collections::BTreeMap;

/// A circular marker element drawn over the image.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: StomaId,
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
    pub class: String,
}

impl Marker {
    pub fn element_id(&self) -> String {
        self.id.element_id()
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (dx, dy) = (x - self.cx, y - self.cy);
        dx * dx + dy * dy <= self.r * self.r
    }
}

/// Where markers live. The editor only ever adds missing markers or removes
/// one by identity; it never redraws the whole surface.
pub trait MarkerSurface {
    fn add_marker(&mut self, marker: Marker);

    /// Returns whether a marker with that identity existed.
    fn remove_marker(&mut self, id: StomaId) -> bool;

    fn has_marker(&self, id: StomaId) -> bool;

    /// Topmost marker under the surface-local point.
    fn marker_at(&self, x: f32, y: f32) -> Option<StomaId>;
}

/// Blocking yes/no prompt.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Retained marker store backing the canvas.
///
/// Ids are allocated monotonically, so key order equals insertion order and
/// iteration yields markers bottom to top.
#[derive(Clone, Debug, Default)]
pub struct MarkerLayer {
    markers: BTreeMap<StomaId, Marker>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn get(&self, id: StomaId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Topmost marker whose disc contains `(x, y)`.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<StomaId> {
        self.markers
            .values()
            .rev()
            .find(|m| m.contains(x, y))
            .map(|m| m.id)
    }
}

impl MarkerSurface for MarkerLayer {
    fn add_marker(&mut self, marker: Marker) {
        self.markers.insert(marker.id, marker);
    }

    fn remove_marker(&mut self, id: StomaId) -> bool {
        self.markers.remove(&id).is_some()
    }

    fn has_marker(&self, id: StomaId) -> bool {
        self.markers.contains_key(&id)
    }

    fn marker_at(&self, x: f32, y: f32) -> Option<StomaId> {
        self.hit_test(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: u32, cx: f32, cy: f32) -> Marker {
        Marker {
            id: StomaId(id),
            cx,
            cy,
            r: 10.0,
            class: "stoma".to_string(),
        }
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut layer = MarkerLayer::new();
        layer.add_marker(marker(1, 50.0, 50.0));
        layer.add_marker(marker(2, 55.0, 50.0));

        assert_eq!(layer.hit_test(52.0, 50.0), Some(StomaId(2)));
        assert_eq!(layer.hit_test(41.0, 50.0), Some(StomaId(1)));
        assert_eq!(layer.hit_test(200.0, 200.0), None);
    }

    #[test]
    fn remove_reports_presence() {
        let mut layer = MarkerLayer::new();
        layer.add_marker(marker(3, 0.0, 0.0));
        assert!(layer.has_marker(StomaId(3)));
        assert!(layer.remove_marker(StomaId(3)));
        assert!(!layer.remove_marker(StomaId(3)));
        assert!(layer.is_empty());
    }

    #[test]
    fn closures_confirm() {
        let mut seen = Vec::new();
        let mut prompt = |msg: &str| {
            seen.push(msg.to_string());
            false
        };
        assert!(!prompt.confirm("leave?"));
        assert_eq!(seen, vec!["leave?".to_string()]);
    }
}
