//! Game state: the mode machine, the free camera, input handling, and what
//! gets drawn each frame.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::anim::{
    BOARD_FOCUS, CollectAnimation, CollectEvent, EndgameScript, INTRO_EXIT, IntroFlythrough,
};
use crate::camera::Camera;
use crate::draw2d::Color;
use crate::interact::{Drawers, inspect_rotation, reveal_visible, spot_for};
use crate::level::Level;
use crate::movement::{MoveIntent, slide_move};
use crate::picking::pick_interactable;
use crate::scene::{MeshId, ObjectId, PieceSet, Scene, SceneError};

const WALK_SPEED: f32 = 5.0;
const RUN_SPEED: f32 = 10.0;
const DEFAULT_CAMERA_DISTANCE: f32 = 3.5;

const LOOK_SENSITIVITY: f32 = 0.01;
const INSPECT_SENSITIVITY: f32 = 0.002;
const ZOOM_STEP: f32 = 0.1;
/// Zooming in stops here; zooming out is always allowed.
const MIN_INSPECT_DISTANCE: f32 = 0.5;

/// Contextual text the HUD shows this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Inspect,
    OpenClose,
    Collect,
    Lost,
    CloseHint,
}

impl Prompt {
    pub fn text(self) -> &'static str {
        match self {
            Prompt::Inspect => "Press E to inspect",
            Prompt::OpenClose => "Press F to open/close",
            Prompt::Collect => "Press F to collect",
            Prompt::Lost => "You Lost!",
            Prompt::CloseHint => "Press Esc to close the game.",
        }
    }
}

/// One draw call the renderer should issue.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: Color,
}

#[derive(Debug, Clone)]
struct InspectState {
    target: ObjectId,
    /// Accumulated drag angles, applied as `Rz * Ry * Rx` around the
    /// object's center.
    angles: Vec3,
}

#[derive(Debug, Clone)]
enum Mode {
    Intro(IntroFlythrough),
    FreeRoam,
    Inspecting(InspectState),
    Collecting(CollectAnimation),
}

/// The whole game: scene, piece bookkeeping, camera, and mode machine.
pub struct Game {
    scene: Scene,
    pieces: PieceSet,
    player: ObjectId,
    collision_group: Vec<ObjectId>,

    mode: Mode,
    endgame: Option<EndgameScript>,
    drawers: Drawers,

    /// Spherical look angles; the view vector is `-offset` where `offset`
    /// is the camera-distance-scaled direction they describe.
    theta: f32,
    phi: f32,
    distance: f32,
    position: Vec3,

    intent: MoveIntent,
    shift: bool,
    hovered: Option<ObjectId>,

    should_close: bool,
    exit_code: Option<i32>,
    reload_requested: bool,
}

impl Game {
    pub fn new(level: Level) -> Self {
        Self {
            scene: level.scene,
            pieces: level.pieces,
            player: level.player,
            collision_group: level.collision_group,
            mode: Mode::Intro(IntroFlythrough::new()),
            endgame: None,
            drawers: Drawers::default(),
            theta: FRAC_PI_2,
            phi: 0.0,
            distance: DEFAULT_CAMERA_DISTANCE,
            position: INTRO_EXIT,
            intent: MoveIntent::default(),
            shift: false,
            hovered: None,
            should_close: false,
            exit_code: None,
            reload_requested: false,
        }
    }

    /// Camera offset from the look target, in multiples of nothing in
    /// particular: its length is the camera distance, and the view vector
    /// `-offset` is used unnormalized throughout (picking and reveal
    /// thresholds are tuned against that length).
    fn spherical_offset(&self) -> Vec3 {
        let (st, ct) = self.theta.sin_cos();
        let (sp, cp) = self.phi.sin_cos();
        self.distance * Vec3::new(cp * st, sp, cp * ct)
    }

    fn free_view(&self) -> Vec3 {
        -self.spherical_offset()
    }

    fn inspecting(&self) -> bool {
        matches!(self.mode, Mode::Inspecting(_))
    }

    pub fn game_over(&self) -> bool {
        self.endgame.as_ref().is_some_and(|e| e.game_over())
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Advances everything by one frame.
    pub fn update(&mut self, dt: f32) -> Result<(), SceneError> {
        let mut next_mode = None;
        let mut place_piece = None;
        let mut finished_collect = None;

        match &mut self.mode {
            Mode::Intro(intro) => {
                if intro.update(dt) {
                    next_mode = Some(Mode::FreeRoam);
                }
            }
            Mode::Collecting(anim) => match anim.update(dt) {
                CollectEvent::Running => {}
                CollectEvent::PlacePiece => place_piece = Some(anim.piece().to_owned()),
                CollectEvent::Done => {
                    finished_collect = Some((anim.saved_camera(), anim.camera_position()));
                    next_mode = Some(Mode::FreeRoam);
                }
            },
            Mode::FreeRoam | Mode::Inspecting(_) => {}
        }

        if let Some(name) = place_piece {
            let rest = self.pieces.rest_model(&name)?;
            let piece = self.scene.get_mut(&name)?;
            piece.model = rest;
            piece.inspectable = false;
        }
        if let Some((saved, end)) = finished_collect {
            // The last collect completes the board, so the camera stays
            // beside it to watch the scripted game; otherwise free roam
            // resumes where it was interrupted.
            self.position = if self.pieces.all_at_rest(&self.scene) {
                end
            } else {
                saved
            };
        }
        if let Some(mode) = next_mode {
            self.mode = mode;
        }

        if self.endgame.is_none()
            && matches!(self.mode, Mode::FreeRoam)
            && self.pieces.all_at_rest(&self.scene)
        {
            self.endgame = Some(EndgameScript::new());
        }
        if let Some(script) = &mut self.endgame {
            if !script.game_over() {
                script.update(dt, &mut self.scene)?;
            }
        }

        self.drawers
            .update(dt, &mut self.scene, &self.pieces, self.player)?;

        // Movement stays enabled while any piece is away from its square,
        // so walking keeps working during inspection if the keys were
        // already held down when it started.
        let can_move = !matches!(self.mode, Mode::Intro(_) | Mode::Collecting(_))
            && !self.pieces.all_at_rest(&self.scene);
        if can_move {
            let offset = self.spherical_offset();
            let w = Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero();
            let u = Vec3::Y.cross(w).normalize_or_zero();
            let speed = if self.shift { RUN_SPEED } else { WALK_SPEED };
            self.position = slide_move(
                &self.scene,
                &self.collision_group,
                self.player,
                self.position,
                self.intent,
                w,
                u,
                dt,
                speed,
            );
        }
        self.scene.object_mut(self.player).set_position(self.position);

        self.hovered = if matches!(self.mode, Mode::FreeRoam) && self.endgame.is_none() {
            pick_interactable(
                &self.scene,
                &self.collision_group,
                self.position,
                self.free_view(),
            )
        } else {
            None
        };

        Ok(())
    }

    pub fn camera(&self) -> Camera {
        match &self.mode {
            Mode::Intro(intro) => {
                let position = intro.camera_position();
                Camera::new(position, intro.look_point() - position)
            }
            Mode::Collecting(anim) => {
                let position = anim.camera_position();
                Camera::new(position, BOARD_FOCUS - position)
            }
            Mode::Inspecting(state) => {
                let center = self.scene.object(state.target).world_center();
                let offset = self.spherical_offset();
                Camera::new(center + offset, -offset)
            }
            Mode::FreeRoam => {
                if self.endgame.is_some() {
                    Camera::new(self.position, BOARD_FOCUS - self.position)
                } else {
                    Camera::new(self.position, self.free_view())
                }
            }
        }
    }

    /// What to render this frame. During inspection only the inspected
    /// object (and a revealed hidden piece) is drawn, spun around the
    /// object's center by the accumulated drag rotation.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        if let Mode::Inspecting(state) = &self.mode {
            let obj = self.scene.object(state.target);
            let center = obj.world_center();
            let spin = Mat4::from_translation(center)
                * inspect_rotation(state.angles)
                * Mat4::from_translation(-center);

            let mut items = vec![DrawItem {
                mesh: obj.mesh,
                model: spin * obj.model,
                color: obj.material.color(),
            }];
            if let Some(name) = self.collect_candidate(state) {
                if let Ok(piece) = self.scene.get(&name) {
                    if piece.name != obj.name {
                        items.push(DrawItem {
                            mesh: piece.mesh,
                            model: spin * piece.model,
                            color: piece.material.color(),
                        });
                    }
                }
            }
            return items;
        }

        self.scene
            .objects()
            .iter()
            .filter(|o| o.name != "player")
            .map(|o| DrawItem {
                mesh: o.mesh,
                model: o.model,
                color: o.material.color(),
            })
            .collect()
    }

    /// Contextual prompts for the HUD, in draw order.
    pub fn hud(&self) -> Vec<Prompt> {
        if self.game_over() {
            return vec![Prompt::Lost, Prompt::CloseHint];
        }
        match &self.mode {
            Mode::Inspecting(state) => {
                if self.collect_candidate(state).is_some() {
                    vec![Prompt::Collect]
                } else {
                    vec![]
                }
            }
            Mode::FreeRoam => match self.hovered {
                Some(id) if self.is_drawer(id) => vec![Prompt::OpenClose],
                Some(_) => vec![Prompt::Inspect],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn is_drawer(&self, id: ObjectId) -> bool {
        matches!(
            self.scene.object(id).name.as_str(),
            "drawer_left" | "drawer_right"
        )
    }

    fn piece_at_rest(&self, name: &str) -> bool {
        match (self.pieces.rest_model(name), self.scene.get(name)) {
            (Ok(rest), Ok(obj)) => rest.w_axis == obj.model.w_axis,
            _ => true,
        }
    }

    /// The piece a press of F would collect right now, if any: either the
    /// inspected object itself when it is a stray piece, or the piece
    /// hidden in the inspected container once its reveal axis has been
    /// turned toward the camera.
    fn collect_candidate(&self, state: &InspectState) -> Option<String> {
        let obj = self.scene.object(state.target);
        if obj.is_piece() {
            return (!self.piece_at_rest(&obj.name)).then(|| obj.name.clone());
        }
        let (_, spot) = spot_for(&obj.name)?;
        if self.piece_at_rest(spot.piece) {
            return None;
        }
        let view = -self.spherical_offset();
        reveal_visible(spot, state.angles, view).then(|| spot.piece.to_owned())
    }

    pub fn key_pressed(&mut self, key: KeyCode) {
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.shift = true,
            KeyCode::KeyW if !self.inspecting() => self.intent.forward = true,
            KeyCode::KeyS if !self.inspecting() => self.intent.backward = true,
            KeyCode::KeyA if !self.inspecting() => self.intent.left = true,
            KeyCode::KeyD if !self.inspecting() => self.intent.right = true,
            KeyCode::Space if !self.inspecting() => self.intent.up = true,
            KeyCode::ControlLeft | KeyCode::ControlRight if !self.inspecting() => {
                self.intent.down = true
            }
            KeyCode::KeyE => self.try_inspect(),
            KeyCode::KeyF => self.interact(),
            KeyCode::KeyH => self.snap_all_pieces(),
            KeyCode::KeyR => self.reload_requested = true,
            KeyCode::Escape => self.escape(),
            _ => {
                if let Some(digit) = digit_of(key) {
                    if self.shift {
                        self.exit_code = Some(100 + digit);
                    }
                }
            }
        }
    }

    pub fn key_released(&mut self, key: KeyCode) {
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.shift = false,
            KeyCode::KeyW => self.intent.forward = false,
            KeyCode::KeyS => self.intent.backward = false,
            KeyCode::KeyA => self.intent.left = false,
            KeyCode::KeyD => self.intent.right = false,
            KeyCode::Space => self.intent.up = false,
            KeyCode::ControlLeft | KeyCode::ControlRight => self.intent.down = false,
            _ => {}
        }
    }

    pub fn mouse_dragged(&mut self, dx: f32, dy: f32) {
        match &mut self.mode {
            Mode::Inspecting(state) => {
                state.angles.y += INSPECT_SENSITIVITY * dx;
                state.angles.x += INSPECT_SENSITIVITY * dy;
            }
            Mode::FreeRoam => {
                self.theta -= LOOK_SENSITIVITY * dx;
                self.phi = (self.phi + LOOK_SENSITIVITY * dy).clamp(-FRAC_PI_2, FRAC_PI_2);
            }
            _ => {}
        }
    }

    pub fn scrolled(&mut self, delta: f32) {
        if self.inspecting() && (delta < 0.0 || self.distance > MIN_INSPECT_DISTANCE) {
            self.distance -= ZOOM_STEP * delta;
        }
    }

    fn try_inspect(&mut self) {
        if !matches!(self.mode, Mode::FreeRoam) || self.endgame.is_some() {
            return;
        }
        let Some(id) = self.hovered else {
            return;
        };
        let open = match self.scene.object(id).name.as_str() {
            "drawer_left" => self.drawers.left_open,
            "drawer_right" => self.drawers.right_open,
            _ => true,
        };
        if !open {
            return;
        }
        self.mode = Mode::Inspecting(InspectState {
            target: id,
            angles: Vec3::ZERO,
        });
    }

    fn interact(&mut self) {
        match &self.mode {
            Mode::FreeRoam => {
                if let Some(id) = self.hovered {
                    match self.scene.object(id).name.as_str() {
                        "drawer_left" => self.drawers.left_open = !self.drawers.left_open,
                        "drawer_right" => self.drawers.right_open = !self.drawers.right_open,
                        _ => {}
                    }
                }
            }
            Mode::Inspecting(state) => {
                let state = state.clone();
                if let Some(piece) = self.collect_candidate(&state) {
                    self.distance = DEFAULT_CAMERA_DISTANCE;
                    self.mode = Mode::Collecting(CollectAnimation::new(piece, self.position));
                }
            }
            _ => {}
        }
    }

    /// Debug shortcut: puts every piece back on its square, which lets the
    /// endgame trigger fire on the next frame.
    fn snap_all_pieces(&mut self) {
        for &id in self.pieces.members() {
            let name = self.scene.object(id).name.clone();
            if let Ok(rest) = self.pieces.rest_model(&name) {
                let piece = self.scene.object_mut(id);
                piece.model = rest;
                piece.inspectable = false;
            }
        }
    }

    fn escape(&mut self) {
        if self.game_over() {
            self.should_close = true;
            return;
        }
        match self.mode {
            Mode::Inspecting(_) => {
                self.distance = DEFAULT_CAMERA_DISTANCE;
                self.mode = Mode::FreeRoam;
            }
            Mode::FreeRoam => self.should_close = true,
            _ => {}
        }
    }
}

fn digit_of(key: KeyCode) -> Option<i32> {
    Some(match key {
        KeyCode::Digit0 => 0,
        KeyCode::Digit1 => 1,
        KeyCode::Digit2 => 2,
        KeyCode::Digit3 => 3,
        KeyCode::Digit4 => 4,
        KeyCode::Digit5 => 5,
        KeyCode::Digit6 => 6,
        KeyCode::Digit7 => 7,
        KeyCode::Digit8 => 8,
        KeyCode::Digit9 => 9,
        _ => return None,
    })
}
