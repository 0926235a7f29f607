//! Recommended follow-up events attached to a loaded schema

use serde::{Deserialize, Serialize};

/// Events recommended to follow `after`.
///
/// On the wire this is a flat list whose head is the anchor event:
/// `["arrest", "trial", "release"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct RecommendationGroup {
    pub after: String,
    pub events: Vec<String>,
}

impl RecommendationGroup {
    pub fn new(after: impl Into<String>, events: Vec<String>) -> Self {
        Self {
            after: after.into(),
            events,
        }
    }

    pub fn contains(&self, event_text: &str) -> bool {
        self.events.iter().any(|e| e == event_text)
    }

    /// Drop `event_text` from the group; true if it was present
    pub fn take(&mut self, event_text: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e != event_text);
        self.events.len() != before
    }
}

impl TryFrom<Vec<String>> for RecommendationGroup {
    type Error = String;

    fn try_from(mut value: Vec<String>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("recommendation group has no anchor event".to_string());
        }
        let after = value.remove(0);
        Ok(Self { after, events: value })
    }
}

impl From<RecommendationGroup> for Vec<String> {
    fn from(group: RecommendationGroup) -> Self {
        let mut flat = Vec::with_capacity(group.events.len() + 1);
        flat.push(group.after);
        flat.extend(group.events);
        flat
    }
}

/// A recommendation as listed to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedEvent {
    pub event_text: String,
    /// Display label of the anchor event, `DNE` when it no longer exists
    pub after: String,
    /// Position in the listing
    pub id_num: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_reads_flat_wire_format() {
        let group: RecommendationGroup =
            serde_json::from_str(r#"["arrest", "trial", "release"]"#).unwrap();
        assert_eq!(group.after, "arrest");
        assert_eq!(group.events, vec!["trial", "release"]);
        assert_eq!(
            serde_json::to_string(&group).unwrap(),
            r#"["arrest","trial","release"]"#
        );
    }

    #[test]
    fn empty_group_is_rejected() {
        assert!(serde_json::from_str::<RecommendationGroup>("[]").is_err());
    }

    #[test]
    fn take_removes_one_recommendation() {
        let mut group = RecommendationGroup::new("arrest", vec!["trial".into(), "release".into()]);
        assert!(group.take("trial"));
        assert!(!group.take("trial"));
        assert!(!group.contains("trial"));
        assert!(group.contains("release"));
    }
}
