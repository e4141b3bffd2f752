//! Scripted camera and piece animations.
//!
//! Each animation owns its own clock and progress; the game drives them once
//! per frame and reacts to the events they report.

use glam::Vec3;

use crate::bezier::bezier_point;
use crate::scene::{Scene, SceneError};

/// Common multiplier for the hand-tuned flythrough rates below.
const FLYTHROUGH_RATE: f32 = 2000.0;

const INTRO_PATH: [Vec3; 6] = [
    Vec3::new(7.5, 1.0, -1.0),
    Vec3::new(5.5, 1.0, 2.0),
    Vec3::new(2.5, 3.0, -1.0),
    Vec3::new(-3.5, 4.0, -1.5),
    Vec3::new(-3.5, 2.0, 3.0),
    Vec3::new(-3.5, 1.0, -1.5),
];

const INTRO_LOOK: [Vec3; 6] = [
    Vec3::new(5.5, 1.0, -1.0),
    Vec3::new(5.5, 0.0, 2.0),
    Vec3::new(2.5, 0.0, -1.0),
    Vec3::new(-3.5, 0.0, -1.5),
    Vec3::new(-3.5, 0.0, 3.0),
    Vec3::new(-4.5, 0.0, -6.5),
];

/// Where the camera lands when the opening sweep ends.
pub const INTRO_EXIT: Vec3 = Vec3::new(7.5, 1.0, -1.0);

/// Point over the board that the collect and endgame cameras look at.
pub const BOARD_FOCUS: Vec3 = Vec3::new(-3.8, 0.1, -3.9);

/// Opening camera sweep through the room, along one curve for the camera
/// position and an independent one for the look target.
#[derive(Debug, Clone)]
pub struct IntroFlythrough {
    t_pos: f32,
    t_look: f32,
    hold: f32,
}

impl Default for IntroFlythrough {
    fn default() -> Self {
        Self::new()
    }
}

impl IntroFlythrough {
    pub fn new() -> Self {
        Self {
            t_pos: 0.0,
            t_look: 0.0,
            hold: 0.0,
        }
    }

    /// Advances the sweep. Returns `true` once it has finished, including
    /// the two-second hold on the final frame.
    ///
    /// The parameters advance at hand-tuned, nonuniform rates so the camera
    /// lingers where the room deserves a look.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.t_pos <= 1.0 {
            let rate = if self.t_pos < 0.2 {
                0.0001
            } else if self.t_pos > 0.7 {
                0.00002
            } else if self.t_pos > 0.9 {
                // Never taken; the 0.7 arm matches first.
                0.00001
            } else {
                0.0001
            };
            self.t_pos += rate * dt * FLYTHROUGH_RATE;
        }
        if self.t_look <= 1.0 {
            let rate = if self.t_look > 0.8 { 0.00003 } else { 0.00015 };
            self.t_look += rate * dt * FLYTHROUGH_RATE;
        }
        if self.t_pos >= 1.0 {
            self.hold += dt;
            if self.hold > 2.0 {
                return true;
            }
        }
        false
    }

    pub fn camera_position(&self) -> Vec3 {
        bezier_point(&INTRO_PATH, self.t_pos)
    }

    pub fn look_point(&self) -> Vec3 {
        bezier_point(&INTRO_LOOK, self.t_look)
    }
}

const COLLECT_PATH: [Vec3; 2] = [Vec3::new(-3.8, 3.0, -2.0), Vec3::new(-3.8, 2.0, -3.0)];

/// What the collect animation asks the game to do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectEvent {
    Running,
    /// Snap the collected piece to its rest square and stop offering it
    /// for inspection.
    PlacePiece,
    Done,
}

/// Camera swoop over the board while a collected piece returns to its
/// square.
#[derive(Debug, Clone)]
pub struct CollectAnimation {
    piece: String,
    saved_camera: Vec3,
    t: f32,
    hold: f32,
    placed: bool,
}

impl CollectAnimation {
    /// `saved_camera` is the free-roam camera position to restore if the
    /// board is still incomplete afterwards.
    pub fn new(piece: impl Into<String>, saved_camera: Vec3) -> Self {
        Self {
            piece: piece.into(),
            saved_camera,
            t: 0.0,
            hold: 0.0,
            placed: false,
        }
    }

    pub fn piece(&self) -> &str {
        &self.piece
    }

    pub fn saved_camera(&self) -> Vec3 {
        self.saved_camera
    }

    pub fn camera_position(&self) -> Vec3 {
        bezier_point(&COLLECT_PATH, self.t)
    }

    /// Flies for half a second, places the piece after another half second
    /// of hold, and reports `Done` a second after that.
    pub fn update(&mut self, dt: f32) -> CollectEvent {
        if self.t <= 1.0 {
            self.t += dt * 2.0;
            return CollectEvent::Running;
        }
        self.hold += dt;
        if self.hold >= 0.5 && !self.placed {
            self.placed = true;
            return CollectEvent::PlacePiece;
        }
        if self.hold >= 1.5 && self.placed {
            CollectEvent::Done
        } else {
            CollectEvent::Running
        }
    }
}

const SQUARE_E4: Vec3 = Vec3::new(-3.87, 0.23, -3.97);
const SQUARE_E5: Vec3 = Vec3::new(-3.87, 0.23, -3.84);
const SQUARE_C4: Vec3 = Vec3::new(-3.60, 0.23, -3.97);
const SQUARE_F6: Vec3 = Vec3::new(-4.00, 0.23, -3.69);
const SQUARE_H5: Vec3 = Vec3::new(-4.26, 0.23, -3.83);
const SQUARE_C6: Vec3 = Vec3::new(-3.60, 0.23, -3.69);

/// First slot beside the board where captured pieces are lined up.
const CAPTURE_STAGING: Vec3 = Vec3::new(-4.45, 0.20, -3.42);

/// The scripted opening, one move per two-second window.
const SCRIPTED_MOVES: [(f32, &str, Vec3); 6] = [
    (3.0, "e_white_pawn", SQUARE_E4),
    (5.0, "e_black_pawn", SQUARE_E5),
    (7.0, "left_white_bishop", SQUARE_C4),
    (9.0, "left_black_knight", SQUARE_F6),
    (11.0, "white_queen", SQUARE_H5),
    (13.0, "right_black_knight", SQUARE_C6),
];

/// The scripted endgame: six opening moves play out on their own, then the
/// white queen takes the f7 pawn and the game is lost.
#[derive(Debug, Clone)]
pub struct EndgameScript {
    elapsed: f32,
    staging: Vec3,
    game_over: bool,
}

impl Default for EndgameScript {
    fn default() -> Self {
        Self::new()
    }
}

impl EndgameScript {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            staging: CAPTURE_STAGING,
            game_over: false,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Advances the script clock and applies this frame's interpolation
    /// step to whichever move owns the current window.
    ///
    /// Within a window starting at `s`, a piece steps by
    /// `(s - t) / 2 * (pos - target)` each frame, an ease-out that lands
    /// exactly on the target as `t` approaches `s + 2`.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) -> Result<(), SceneError> {
        self.elapsed += dt;
        let t = self.elapsed;

        for &(start, name, target) in &SCRIPTED_MOVES {
            if t > start && t < start + 2.0 {
                let piece = scene.get_mut(name)?;
                let pos = piece.position();
                piece.set_position(pos + ((start - t) / 2.0) * (pos - target));
                return Ok(());
            }
        }

        if t > 15.0 && t < 17.0 {
            let pawn_pos = scene.get("f_black_pawn")?.position();
            if pawn_pos.x > self.staging.x {
                let queen = scene.get_mut("white_queen")?;
                let pos = queen.position();
                queen.set_position(pos + ((15.0 - t) / 2.0) * (pos - pawn_pos));
            }
            let queen_pos = scene.get("white_queen")?.position();
            if queen_pos == pawn_pos {
                self.capture(scene, "f_black_pawn")?;
                self.game_over = true;
            }
        }

        Ok(())
    }

    /// Moves a captured piece to the next staging slot beside the board.
    fn capture(&mut self, scene: &mut Scene, name: &str) -> Result<(), SceneError> {
        let piece = scene.get_mut(name)?;
        if piece.position().x > self.staging.x {
            piece.set_position(self.staging);
            self.staging.z += 0.13;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collide::Aabb;
    use crate::scene::{Material, MeshId, SceneObject};

    #[test]
    fn intro_reaches_the_end_and_holds() {
        let mut intro = IntroFlythrough::new();
        assert_eq!(intro.camera_position(), INTRO_PATH[0]);

        let mut finished = false;
        let mut elapsed = 0.0;
        while !finished && elapsed < 120.0 {
            finished = intro.update(1.0 / 60.0);
            elapsed += 1.0 / 60.0;
        }
        assert!(finished, "flythrough never finished");
        // The position curve sits at (or just past) its last control point.
        assert!((intro.camera_position() - INTRO_PATH[5]).length() < 0.5);
    }

    #[test]
    fn intro_slows_down_late_in_the_sweep() {
        let mut early = IntroFlythrough::new();
        early.t_pos = 0.1;
        let mut late = IntroFlythrough::new();
        late.t_pos = 0.8;
        early.update(1.0 / 60.0);
        late.update(1.0 / 60.0);
        assert!(early.t_pos - 0.1 > late.t_pos - 0.8);
    }

    #[test]
    fn collect_places_then_finishes() {
        let mut anim = CollectAnimation::new("white_king", Vec3::new(1.0, 2.0, 3.0));
        let dt = 1.0 / 60.0;
        let mut placed_at = None;
        let mut done_at = None;
        let mut elapsed: f32 = 0.0;

        while done_at.is_none() && elapsed < 10.0 {
            match anim.update(dt) {
                CollectEvent::Running => {}
                CollectEvent::PlacePiece => placed_at = Some(elapsed),
                CollectEvent::Done => done_at = Some(elapsed),
            }
            elapsed += dt;
        }

        let placed_at = placed_at.expect("piece was never placed");
        let done_at = done_at.expect("animation never finished");
        assert!(placed_at < done_at);
        // Flight takes ~0.5s, then the holds kick in.
        assert!(placed_at > 0.5 && placed_at < 1.5);
        assert!(done_at - placed_at > 0.9);
        assert_eq!(anim.saved_camera(), Vec3::new(1.0, 2.0, 3.0));
    }

    fn board_scene() -> Scene {
        let mut scene = Scene::new();
        let pieces = [
            ("e_white_pawn", Vec3::new(-3.87, 0.23, -4.24), Material::WhitePiece),
            ("e_black_pawn", Vec3::new(-3.87, 0.23, -3.55), Material::BlackPiece),
            ("f_black_pawn", Vec3::new(-4.005, 0.23, -3.55), Material::BlackPiece),
            ("left_white_bishop", Vec3::new(-4.0, 0.23, -4.37), Material::WhitePiece),
            ("left_black_knight", Vec3::new(-4.14, 0.23, -3.42), Material::BlackPiece),
            ("right_black_knight", Vec3::new(-3.46, 0.23, -3.42), Material::BlackPiece),
            ("white_queen", Vec3::new(-3.73, 0.23, -4.37), Material::WhitePiece),
        ];
        for (name, pos, material) in pieces {
            let mut obj =
                SceneObject::new(name, MeshId(0), Aabb::symmetric(0.01)).material(material);
            obj.set_position(pos);
            scene.add(obj);
        }
        scene
    }

    #[test]
    fn moves_run_in_their_windows() {
        let mut scene = board_scene();
        let mut script = EndgameScript::new();
        let dt = 1.0 / 60.0;

        while script.elapsed() < 2.9 {
            script.update(dt, &mut scene).unwrap();
        }
        // Nothing has moved before the first window opens.
        assert_eq!(
            scene.get("e_white_pawn").unwrap().position(),
            Vec3::new(-3.87, 0.23, -4.24)
        );

        while script.elapsed() < 5.0 {
            script.update(dt, &mut scene).unwrap();
        }
        let pawn = scene.get("e_white_pawn").unwrap().position();
        assert!((pawn - SQUARE_E4).length() < 1e-3, "pawn ended at {pawn}");

        while script.elapsed() < 13.0 {
            script.update(dt, &mut scene).unwrap();
        }
        let queen = scene.get("white_queen").unwrap().position();
        assert!((queen - SQUARE_H5).length() < 1e-3);
    }

    #[test]
    fn queen_takes_the_pawn_and_ends_the_game() {
        let mut scene = board_scene();
        let mut script = EndgameScript::new();
        let dt = 1.0 / 60.0;

        while script.elapsed() < 17.5 {
            script.update(dt, &mut scene).unwrap();
        }

        assert!(script.game_over());
        assert_eq!(
            scene.get("f_black_pawn").unwrap().position(),
            CAPTURE_STAGING
        );
        // The queen converged onto the pawn's old square.
        let queen = scene.get("white_queen").unwrap().position();
        assert!((queen - Vec3::new(-4.005, 0.23, -3.55)).length() < 1e-3);
    }
}
