// catalog.rs: static room catalog that feeds scene lists to the viewer

use crate::error::CatalogError;
use crate::scene::PanoramaScene;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_ROOMS: &str = include_str!("../assets/rooms.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    pub price: u32,
    pub capacity: u32,
    /// Floor area in square metres.
    pub size: u32,
    pub bed_type: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub panorama_scenes: Vec<PanoramaScene>,
}

impl Room {
    /// Rooms without scenes must not offer the 360° entry point.
    pub fn has_tour(&self) -> bool {
        !self.panorama_scenes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rooms: Vec<Room>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_ROOMS)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let rooms: Vec<Room> = serde_json::from_str(text)?;
        for room in &rooms {
            validate_scenes(room)?;
        }
        Ok(Self { rooms })
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn featured(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(|r| r.featured)
    }
}

fn validate_scenes(room: &Room) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for scene in &room.panorama_scenes {
        if scene.name.trim().is_empty() {
            return Err(CatalogError::UnnamedScene {
                room: room.id.clone(),
            });
        }
        if !seen.insert(scene.id.as_str()) {
            return Err(CatalogError::DuplicateSceneId {
                room: room.id.clone(),
                scene: scene.id.clone(),
            });
        }
    }
    Ok(())
}
