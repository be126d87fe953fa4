// scene.rs: panorama scene descriptors handed to the viewer by the host

use serde::Deserialize;

/// What kind of asset a scene's `url` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    /// Streaming 360° video. Not implemented: loads as "unavailable".
    #[serde(rename = "youtube")]
    YouTube,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::YouTube => "youtube",
        }
    }
}

/// Room area a scene shows. Only used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneCategory {
    Bedroom,
    Bathroom,
    Lobby,
    Balcony,
    Living,
    Dining,
}

impl SceneCategory {
    pub fn icon(self) -> &'static str {
        match self {
            SceneCategory::Bedroom => "🛏",
            SceneCategory::Bathroom => "🛁",
            SceneCategory::Lobby => "🏨",
            SceneCategory::Balcony => "🌇",
            SceneCategory::Living => "🛋",
            SceneCategory::Dining => "🍽",
        }
    }
}

/// Icon shown for scenes without a category.
pub const GENERIC_SCENE_ICON: &str = "🖼";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanoramaScene {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub media_kind: MediaKind,
    #[serde(default, rename = "icon")]
    pub category: Option<SceneCategory>,
}

impl PanoramaScene {
    pub fn image(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            media_kind: MediaKind::Image,
            category: None,
        }
    }

    pub fn video(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            media_kind: MediaKind::Video,
            ..Self::image(id, name, url)
        }
    }

    pub fn with_category(mut self, category: SceneCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn icon(&self) -> &'static str {
        self.category.map_or(GENERIC_SCENE_ICON, SceneCategory::icon)
    }

    pub fn is_video(&self) -> bool {
        self.media_kind == MediaKind::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_field_names() {
        let json = r#"{
            "id": "bedroom",
            "name": "Master Bedroom",
            "url": "https://example.com/bedroom.jpg",
            "type": "image",
            "icon": "bedroom"
        }"#;
        let scene: PanoramaScene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.media_kind, MediaKind::Image);
        assert_eq!(scene.category, Some(SceneCategory::Bedroom));
        assert_eq!(scene.icon(), "🛏");
    }

    #[test]
    fn missing_icon_falls_back_to_generic() {
        let json = r#"{"id": "a", "name": "A", "url": "a.gif", "type": "video"}"#;
        let scene: PanoramaScene = serde_json::from_str(json).unwrap();
        assert!(scene.is_video());
        assert_eq!(scene.category, None);
        assert_eq!(scene.icon(), GENERIC_SCENE_ICON);
    }

    #[test]
    fn youtube_kind_is_recognised() {
        let json = r#"{"id": "yt", "name": "Tour", "url": "https://youtu.be/x", "type": "youtube"}"#;
        let scene: PanoramaScene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.media_kind, MediaKind::YouTube);
        assert_eq!(scene.media_kind.label(), "youtube");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{"id": "x", "name": "X", "url": "x", "type": "hologram"}"#;
        assert!(serde_json::from_str::<PanoramaScene>(json).is_err());
    }
}
