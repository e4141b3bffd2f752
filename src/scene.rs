//! Scene objects, the object registry, and the chess-piece set.
//!
//! Objects are plain values stamped from master meshes: each instance owns
//! its transform and flags while sharing a read-only [`MeshId`] with every
//! other instance of the same model.

use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};
use thiserror::Error;

use crate::collide::Aabb;
use crate::draw2d::Color;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no object named {0:?} in the scene")]
    ObjectNotFound(String),
    #[error("no master mesh named {0:?}")]
    MasterNotFound(String),
    #[error("no piece named {0:?} on the board")]
    PieceNotFound(String),
}

/// Handle to a mesh uploaded at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Handle to an object added to a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Collision shape tag. Furniture collides as its world box; round props
/// collide as a sphere around their center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    Box,
    Sphere { radius: f32 },
}

/// What an object is made of; selects its color in the mesh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    WhitePiece,
    BlackPiece,
    Wood,
    Fabric,
    Ceramic,
    Floor,
    Wall,
    Plain,
}

impl Material {
    pub fn color(self) -> Color {
        match self {
            Material::WhitePiece => Color::rgb(0.92, 0.88, 0.78),
            Material::BlackPiece => Color::rgb(0.16, 0.13, 0.11),
            Material::Wood => Color::rgb(0.48, 0.33, 0.20),
            Material::Fabric => Color::rgb(0.36, 0.42, 0.58),
            Material::Ceramic => Color::rgb(0.88, 0.90, 0.94),
            Material::Floor => Color::rgb(0.58, 0.48, 0.36),
            Material::Wall => Color::rgb(0.82, 0.79, 0.72),
            Material::Plain => Color::rgb(0.62, 0.62, 0.65),
        }
    }
}

/// One placed object: a master mesh plus a transform and gameplay flags.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub mesh: MeshId,
    pub model: Mat4,
    pub local_bounds: Aabb,
    pub collidable: bool,
    pub inspectable: bool,
    pub collider: Collider,
    pub material: Material,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, mesh: MeshId, local_bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            mesh,
            model: Mat4::IDENTITY,
            local_bounds,
            collidable: true,
            inspectable: true,
            collider: Collider::Box,
            material: Material::Plain,
        }
    }

    pub fn collidable(mut self, yes: bool) -> Self {
        self.collidable = yes;
        self
    }

    pub fn inspectable(mut self, yes: bool) -> Self {
        self.inspectable = yes;
        self
    }

    pub fn material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn sphere_collider(mut self, radius: f32) -> Self {
        self.collider = Collider::Sphere { radius };
        self
    }

    /// Post-multiplies a translation, so the offset is expressed in the
    /// object's current local frame (including any scale already applied).
    pub fn translate(&mut self, offset: Vec3) {
        self.model *= Mat4::from_translation(offset);
    }

    /// Post-multiplies a scale.
    pub fn scale(&mut self, factors: Vec3) {
        self.model *= Mat4::from_scale(factors);
    }

    /// Post-multiplies `Rx * Ry * Rz` built from the given Euler angles.
    pub fn rotate_xyz(&mut self, angles: Vec3) {
        self.model = self.model
            * Mat4::from_rotation_x(angles.x)
            * Mat4::from_rotation_y(angles.y)
            * Mat4::from_rotation_z(angles.z);
    }

    /// Overwrites the translation column, leaving rotation and scale alone.
    pub fn set_position(&mut self, p: Vec3) {
        self.model.w_axis = Vec4::new(p.x, p.y, p.z, self.model.w_axis.w);
    }

    pub fn position(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }

    /// World-space lower bound, from the two transformed local corners.
    ///
    /// Only `local_bounds.min` and `local_bounds.max` are transformed, so
    /// under rotation this box is loose rather than the hull of all eight
    /// corners. Everything that matters for blocking in the room is
    /// axis-aligned, and the slack on rotated props is part of how the
    /// layout was tuned.
    pub fn world_min(&self) -> Vec3 {
        let a = (self.model * self.local_bounds.min.extend(1.0)).truncate();
        let b = (self.model * self.local_bounds.max.extend(1.0)).truncate();
        a.min(b)
    }

    /// World-space upper bound; see [`SceneObject::world_min`].
    pub fn world_max(&self) -> Vec3 {
        let a = (self.model * self.local_bounds.min.extend(1.0)).truncate();
        let b = (self.model * self.local_bounds.max.extend(1.0)).truncate();
        a.max(b)
    }

    pub fn world_center(&self) -> Vec3 {
        (self.model * self.local_bounds.center().extend(1.0)).truncate()
    }

    pub fn is_piece(&self) -> bool {
        matches!(
            self.material,
            Material::WhitePiece | Material::BlackPiece
        )
    }
}

/// Registry of placed objects with name lookup.
#[derive(Debug, Default, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    by_name: HashMap<String, usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = self.objects.len();
        self.by_name.insert(object.name.clone(), id);
        self.objects.push(object);
        ObjectId(id)
    }

    pub fn object(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id.0]
    }

    pub fn object_mut(&mut self, id: ObjectId) -> &mut SceneObject {
        &mut self.objects[id.0]
    }

    pub fn id_of(&self, name: &str) -> Result<ObjectId, SceneError> {
        self.by_name
            .get(name)
            .map(|&i| ObjectId(i))
            .ok_or_else(|| SceneError::ObjectNotFound(name.to_owned()))
    }

    pub fn get(&self, name: &str) -> Result<&SceneObject, SceneError> {
        self.id_of(name).map(|id| self.object(id))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut SceneObject, SceneError> {
        let id = self.id_of(name)?;
        Ok(self.object_mut(id))
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Rest transforms for every chess piece, recorded once at board setup.
#[derive(Debug, Default, Clone)]
pub struct PieceSet {
    rest: HashMap<String, Mat4>,
    members: Vec<ObjectId>,
}

impl PieceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the object's current model matrix as its rest transform.
    pub fn record(&mut self, scene: &Scene, id: ObjectId) {
        let obj = scene.object(id);
        self.rest.insert(obj.name.clone(), obj.model);
        self.members.push(id);
    }

    pub fn rest_model(&self, name: &str) -> Result<Mat4, SceneError> {
        self.rest
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::PieceNotFound(name.to_owned()))
    }

    pub fn rest_position(&self, name: &str) -> Result<Vec3, SceneError> {
        self.rest_model(name).map(|m| m.w_axis.truncate())
    }

    pub fn members(&self) -> &[ObjectId] {
        &self.members
    }

    /// True when every piece sits exactly where it was recorded. Pieces are
    /// snapped to their rest matrices when collected, so exact comparison of
    /// the translation columns is the right test.
    pub fn all_at_rest(&self, scene: &Scene) -> bool {
        self.members.iter().all(|&id| {
            let obj = scene.object(id);
            match self.rest.get(&obj.name) {
                Some(rest) => rest.w_axis == obj.model.w_axis,
                None => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str) -> SceneObject {
        SceneObject::new(name, MeshId(0), Aabb::symmetric(1.0))
    }

    #[test]
    fn post_multiplied_translate_respects_scale() {
        let mut obj = object("crate");
        obj.scale(Vec3::splat(2.0));
        obj.translate(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(obj.position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn set_position_overwrites_translation_only() {
        let mut obj = object("crate");
        obj.scale(Vec3::splat(3.0));
        obj.set_position(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(obj.position(), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(obj.world_max(), Vec3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn world_bounds_stay_ordered_under_rotation() {
        let mut obj = object("crate");
        obj.rotate_xyz(Vec3::new(0.0, std::f32::consts::PI, 0.0));
        let min = obj.world_min();
        let max = obj.world_max();
        assert!(min.x <= max.x && min.y <= max.y && min.z <= max.z);
    }

    #[test]
    fn world_center_follows_the_model_matrix() {
        let mut obj = object("crate");
        obj.set_position(Vec3::new(2.0, 1.0, -3.0));
        assert_eq!(obj.world_center(), Vec3::new(2.0, 1.0, -3.0));
    }

    #[test]
    fn missing_lookups_are_errors() {
        let scene = Scene::new();
        assert!(matches!(
            scene.get("ghost"),
            Err(SceneError::ObjectNotFound(_))
        ));
        let pieces = PieceSet::new();
        assert!(matches!(
            pieces.rest_model("ghost"),
            Err(SceneError::PieceNotFound(_))
        ));
    }

    #[test]
    fn all_at_rest_tracks_translation() {
        let mut scene = Scene::new();
        let id = scene.add(object("e_white_pawn").material(Material::WhitePiece));
        scene.object_mut(id).set_position(Vec3::new(-3.87, 0.23, -4.24));

        let mut pieces = PieceSet::new();
        pieces.record(&scene, id);
        assert!(pieces.all_at_rest(&scene));

        scene.object_mut(id).set_position(Vec3::new(0.0, 0.23, 0.0));
        assert!(!pieces.all_at_rest(&scene));

        let rest = pieces.rest_model("e_white_pawn").unwrap();
        scene.object_mut(id).model = rest;
        assert!(pieces.all_at_rest(&scene));
    }
}
