//! Window and event loop glue: creates the GPU context, loads assets,
//! forwards input to the game, and renders each frame as a 3D pass followed
//! by the 2D HUD overlay.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::FontAtlas;
use crate::collide::Aabb;
use crate::draw2d::{Color, Draw2d};
use crate::game::Game;
use crate::geometry::load_obj;
use crate::gpu::GpuContext;
use crate::hot_shader::HotShader;
use crate::input::Input;
use crate::level::{self, MasterSet};
use crate::mesh::Mesh;
use crate::mesh_pass::{MeshDraw, MeshPass};
use crate::scene::MeshId;

/// The mesh shader ships embedded; the on-disk copy is only for live edits
/// with the R key.
const MESH_SHADER: &str = include_str!("shaders/mesh.wgsl");
const MESH_SHADER_PATH: &str = "src/shaders/mesh.wgsl";

const HUD_FONT_SIZE: f32 = 28.0;
/// Cap on a single simulation step, so a stall (window drag, debugger)
/// does not teleport the player through a wall.
const MAX_FRAME_DT: f32 = 0.1;

pub struct Options {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub assets_dir: PathBuf,
    /// Extra OBJ model to place in the room, from the command line.
    pub extra_model: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            title: "Gambit".to_string(),
            width: 1280,
            height: 720,
            assets_dir: PathBuf::from("assets"),
            extra_model: None,
        }
    }
}

/// Runs the game until the window closes or the game requests exit.
pub fn run(options: Options) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending { options };
    event_loop.run_app(&mut app)?;

    match app {
        App::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum App {
    Pending { options: Options },
    Running(Box<Running>),
    Failed(anyhow::Error),
    Done,
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    game: Game,
    input: Input,
    meshes: Vec<Mesh>,
    mesh_shader: HotShader,
    mesh_pass: MeshPass,
    draw2d: Draw2d,
    font: FontAtlas,
    last_frame: Instant,
    fps_frames: u32,
    fps_timer: f32,
    fps: f32,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        *self = App::Failed(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let App::Pending { options } = self else {
            return;
        };

        let window_attrs = WindowAttributes::default()
            .with_title(&options.title)
            .with_inner_size(winit::dpi::LogicalSize::new(options.width, options.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        match setup(window, std::mem::take(options)) {
            Ok(running) => *self = App::Running(Box::new(running)),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(running) = self else {
            return;
        };

        running.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                *self = App::Done;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                running.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = running.frame() {
                    return self.fail(event_loop, err);
                }
                if let Some(code) = running.game.exit_code() {
                    std::process::exit(code);
                }
                if running.game.should_close() {
                    *self = App::Done;
                    event_loop.exit();
                    return;
                }
                running.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn setup(window: Arc<Window>, options: Options) -> Result<Running> {
    let gpu = GpuContext::new(window.clone())?;

    let font = FontAtlas::load(
        &gpu,
        options.assets_dir.join("fonts/hud.ttf"),
        HUD_FONT_SIZE,
    )?;
    let draw2d = Draw2d::new(&gpu, &font);

    let mesh_shader = HotShader::new(MESH_SHADER_PATH, MESH_SHADER);
    let mesh_pass = MeshPass::new(&gpu, mesh_shader.source());

    let mut meshes = Vec::new();
    let mut masters = MasterSet::new();

    let mut register = |meshes: &mut Vec<Mesh>, mesh: Mesh, bounds: Aabb, name: &str| {
        let id = MeshId(meshes.len());
        meshes.push(mesh);
        masters.insert(name, id, bounds);
    };

    register(
        &mut meshes,
        Mesh::unit_plane(&gpu),
        Aabb::new(glam::Vec3::new(-1.0, 0.0, -1.0), glam::Vec3::new(1.0, 0.0, 1.0)),
        "plane",
    );
    register(&mut meshes, Mesh::unit_box(&gpu), Aabb::symmetric(1.0), "box");
    register(
        &mut meshes,
        Mesh::unit_sphere(&gpu, 32, 16),
        Aabb::symmetric(1.0),
        "sphere",
    );

    for (name, file) in level::MODEL_FILES {
        let path = options.assets_dir.join("models").join(file);
        let geometry =
            load_obj(&path).with_context(|| format!("loading master model {name}"))?;
        let bounds = geometry.bounds();
        register(&mut meshes, geometry.upload(&gpu), bounds, name);
    }

    if let Some(path) = &options.extra_model {
        let geometry = load_obj(path).context("loading the model given on the command line")?;
        let bounds = geometry.bounds();
        register(&mut meshes, geometry.upload(&gpu), bounds, "extra_model");
    }

    let mut level = level::furnish(&masters)?;

    // A model passed on the command line stands in the middle of the room,
    // inspectable like the furniture.
    if options.extra_model.is_some() {
        let mut object = masters.stamp("extra_model", "extra_model")?;
        object.set_position(glam::Vec3::new(0.0, 0.0, 0.0));
        let id = level.scene.add(object);
        level.collision_group.push(id);
    }

    info!(
        "room furnished: {} objects, {} meshes",
        level.scene.objects().len(),
        meshes.len()
    );

    Ok(Running {
        window,
        gpu,
        game: Game::new(level),
        input: Input::new(),
        meshes,
        mesh_shader,
        mesh_pass,
        draw2d,
        font,
        last_frame: Instant::now(),
        fps_frames: 0,
        fps_timer: 0.0,
        fps: 0.0,
    })
}

impl Running {
    fn frame(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_DT);
        self.last_frame = now;

        self.fps_frames += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.fps_frames as f32 / self.fps_timer;
            self.fps_frames = 0;
            self.fps_timer = 0.0;
        }

        for &key in self.input.pressed_keys() {
            self.game.key_pressed(key);
        }
        for &key in self.input.released_keys() {
            self.game.key_released(key);
        }
        let drag = self.input.drag_delta();
        if drag != glam::Vec2::ZERO {
            self.game.mouse_dragged(drag.x, drag.y);
        }
        let scroll = self.input.scroll_delta();
        if scroll != 0.0 {
            self.game.scrolled(scroll);
        }
        self.input.begin_frame();

        self.game.update(dt)?;

        if self.game.take_reload_request() && self.mesh_shader.reload() {
            self.mesh_pass
                .rebuild_pipeline(&self.gpu, self.mesh_shader.source());
        }

        self.render()
    }

    fn render(&mut self) -> Result<()> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gpu.resize(self.gpu.width(), self.gpu.height());
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.mesh_pass.ensure_depth_size(&self.gpu);

        self.draw2d.clear();
        self.layout_hud();

        let camera = self.game.camera();
        let draw_list = self.game.draw_list();
        let draws: Vec<MeshDraw> = draw_list
            .iter()
            .map(|item| MeshDraw {
                mesh: &self.meshes[item.mesh.0],
                model: item.model,
                color: item.color,
            })
            .collect();

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.mesh_pass.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.mesh_pass.render(&self.gpu, &mut pass, &camera, &draws);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("HUD Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.draw2d.render(&self.gpu, &mut pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Prompts stack centered above the bottom of the screen; the FPS
    /// readout sits in the top-right corner.
    fn layout_hud(&mut self) {
        let width = self.gpu.width() as f32;
        let height = self.gpu.height() as f32;
        let line = self.font.line_height();

        let prompts = self.game.hud();
        let base_y = height * 0.82 - prompts.len() as f32 * line;
        for (i, prompt) in prompts.iter().enumerate() {
            let text = prompt.text();
            let x = (width - self.font.measure(text)) / 2.0;
            let y = base_y + i as f32 * line;
            self.draw2d
                .text(&self.font, x, y, text, Color::rgb(0.1, 0.1, 0.1));
        }

        let fps_text = format!("FPS: {:.0}", self.fps);
        let fps_x = width - self.font.measure(&fps_text) - 10.0;
        self.draw2d
            .text(&self.font, fps_x, 10.0, &fps_text, Color::rgb(0.1, 0.1, 0.1));
    }
}
