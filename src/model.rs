use serde::{Deserialize, Serialize};
use std::fmt;

const ELEMENT_PREFIX: &str = "stoma";

// ── Identity ────────────────────────────────────────────────────────────────

/// Session-local identity of an annotation point. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StomaId(pub u32);

impl StomaId {
    /// Identity attribute of the marker element, e.g. `stoma7`.
    pub fn element_id(self) -> String {
        format!("{ELEMENT_PREFIX}{}", self.0)
    }

    pub fn from_element_id(element_id: &str) -> Option<Self> {
        element_id
            .strip_prefix(ELEMENT_PREFIX)?
            .parse::<u32>()
            .ok()
            .map(StomaId)
    }
}

impl fmt::Display for StomaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Points ──────────────────────────────────────────────────────────────────

/// A point as stored by the backend and as submitted on save.
///
/// Human annotations are stored as `{"x": .., "y": ..}` objects while machine
/// annotations come as `[x, y]` pairs; both are accepted on read.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersistedRepr")]
pub struct PersistedPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedRepr {
    Object { x: f32, y: f32 },
    Pair([f32; 2]),
}

impl From<PersistedRepr> for PersistedPoint {
    fn from(repr: PersistedRepr) -> Self {
        match repr {
            PersistedRepr::Object { x, y } => Self { x, y },
            PersistedRepr::Pair([x, y]) => Self { x, y },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnotationPoint {
    pub id: StomaId,
    pub x: f32,
    pub y: f32,
}

impl AnnotationPoint {
    pub fn persisted(&self) -> PersistedPoint {
        PersistedPoint {
            x: self.x,
            y: self.y,
        }
    }
}

/// Ordered point list. Insertion order is the rendering z-order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationSet {
    points: Vec<AnnotationPoint>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller guarantees `point.id` is fresh.
    pub fn push(&mut self, point: AnnotationPoint) {
        debug_assert!(!self.contains(point.id));
        self.points.push(point);
    }

    /// Removes the point carrying `id`. Unknown ids leave the set untouched.
    pub fn remove(&mut self, id: StomaId) -> Option<AnnotationPoint> {
        let index = self.points.iter().position(|p| p.id == id)?;
        Some(self.points.remove(index))
    }

    pub fn contains(&self, id: StomaId) -> bool {
        self.points.iter().any(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_persisted(&self) -> Vec<PersistedPoint> {
        self.points.iter().map(AnnotationPoint::persisted).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u32, x: f32, y: f32) -> AnnotationPoint {
        AnnotationPoint {
            id: StomaId(id),
            x,
            y,
        }
    }

    #[test]
    fn element_id_parses_back() {
        assert_eq!(StomaId(7).element_id(), "stoma7");
        assert_eq!(StomaId::from_element_id("stoma7"), Some(StomaId(7)));
        assert_eq!(StomaId::from_element_id("stoma"), None);
        assert_eq!(StomaId::from_element_id("circle7"), None);
    }

    #[test]
    fn persisted_accepts_objects_and_pairs() {
        let points: Vec<PersistedPoint> =
            serde_json::from_str(r#"[{"x": 1, "y": 2.5}, [3, 4]]"#).unwrap();
        assert_eq!(
            points,
            vec![
                PersistedPoint { x: 1.0, y: 2.5 },
                PersistedPoint { x: 3.0, y: 4.0 },
            ]
        );
        let json = serde_json::to_string(&points[1]).unwrap();
        assert_eq!(json, r#"{"x":3.0,"y":4.0}"#);
    }

    #[test]
    fn remove_only_touches_matching_id() {
        let mut set = AnnotationSet::new();
        set.push(point(1, 0.0, 0.0));
        set.push(point(2, 5.0, 5.0));
        set.push(point(3, 9.0, 9.0));

        assert_eq!(set.remove(StomaId(999)), None);
        assert_eq!(set.len(), 3);

        assert_eq!(set.remove(StomaId(2)), Some(point(2, 5.0, 5.0)));
        let ids: Vec<u32> = set.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(set.remove(StomaId(2)), None);
    }
}
