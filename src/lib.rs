//! # Gambit
//!
//! A first-person room viewer and scavenger hunt. Explore a furnished room,
//! pick up and inspect objects, and find the eight chess pieces missing
//! from the board. Return them all and the board plays itself out, one
//! scripted endgame, to its foregone conclusion.
//!
//! The crate splits into three layers:
//!
//! - **World**: [`scene`] (objects and transforms), [`level`] (the furnished
//!   room), [`collide`] and [`picking`] (AABB collision and ray picks)
//! - **Simulation**: [`game`] (modes, input handling, HUD), [`movement`],
//!   [`interact`] (drawers), [`anim`] (intro, collection, endgame script),
//!   [`bezier`] (camera paths)
//! - **Presentation**: [`gpu`], [`mesh`], [`mesh_pass`], [`draw2d`],
//!   [`assets`], [`hot_shader`], and [`app`] tying it all together

pub mod anim;
pub mod app;
pub mod assets;
pub mod bezier;
pub mod camera;
pub mod collide;
pub mod draw2d;
pub mod game;
pub mod geometry;
pub mod gpu;
pub mod hot_shader;
pub mod input;
pub mod interact;
pub mod level;
pub mod mesh;
pub mod mesh_pass;
pub mod movement;
pub mod picking;
pub mod scene;

pub use app::{Options, run};
pub use assets::{AssetError, FontAtlas};
pub use camera::Camera;
pub use collide::Aabb;
pub use draw2d::{Color, Draw2d};
pub use game::{Game, Prompt};
pub use geometry::{GeometryError, RawGeometry, load_obj};
pub use gpu::{GpuContext, GpuError};
pub use hot_shader::HotShader;
pub use input::Input;
pub use level::{Level, MasterSet, furnish};
pub use mesh::{Mesh, Vertex3d};
pub use mesh_pass::{MeshDraw, MeshPass};
pub use scene::{MeshId, ObjectId, Scene, SceneError, SceneObject};

// Re-export the math and windowing types that appear in public signatures.
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
