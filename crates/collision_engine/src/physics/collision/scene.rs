//! Scene-level owner of the collision director
//!
//! The director is created lazily by the first part creation and dropped on
//! teardown. Until then every query reports "no hit".

use crate::config::CollisionConfig;
use super::director::CollisionDirector;
use super::resource::MeshDecoder;

/// Collision state of one loaded scene
pub struct CollisionScene {
    config: CollisionConfig,
    director: Option<CollisionDirector>,
    decoder: Box<dyn MeshDecoder>,
}

impl CollisionScene {
    /// Create a scene that decodes collision meshes with `decoder`
    pub fn new(config: CollisionConfig, decoder: Box<dyn MeshDecoder>) -> Self {
        Self {
            config,
            director: None,
            decoder,
        }
    }

    /// Tunables the director is created with
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Mesh decoder used by resource-based part creation
    pub fn decoder(&self) -> &dyn MeshDecoder {
        self.decoder.as_ref()
    }

    /// The director, if any part was created yet
    pub fn director(&self) -> Option<&CollisionDirector> {
        self.director.as_ref()
    }

    /// The director, mutably, if any part was created yet
    pub fn director_mut(&mut self) -> Option<&mut CollisionDirector> {
        self.director.as_mut()
    }

    /// The director, created on first use
    pub fn get_or_create_director(&mut self) -> &mut CollisionDirector {
        let config = &self.config;
        self.director.get_or_insert_with(|| {
            log::debug!("Creating collision director (strike info capacity {})", config.strike_info_capacity);
            CollisionDirector::new(config)
        })
    }

    /// Scene movement hook: runs the director's per-frame pass
    pub fn movement(&mut self) {
        if let Some(director) = &mut self.director {
            director.movement();
        }
    }

    /// Drop the director and every part it owns
    pub fn teardown(&mut self) {
        if let Some(director) = self.director.take() {
            log::debug!("Tearing down collision director with {} parts", director.parts_count());
        }
    }
}

impl std::fmt::Debug for CollisionScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionScene")
            .field("config", &self.config)
            .field("director", &self.director)
            .finish_non_exhaustive()
    }
}
