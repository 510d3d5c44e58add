use anyhow::Result;
use log::{info, warn};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

mod core;
mod engine;
mod game;

use engine::clock::FrameClock;
use engine::renderer::Layer;
use game::scenes::{Scene, SceneKind};

/// Frames between periodic stats lines
const STATS_INTERVAL: u64 = 300;

fn scene_from_args() -> Result<SceneKind> {
    let name = std::env::args().nth(1);
    match name.as_deref() {
        None => Ok(SceneKind::BallDrop),
        Some(name) => SceneKind::from_name(name).ok_or_else(|| {
            let known: Vec<&str> = SceneKind::ALL.iter().map(|k| k.name()).collect();
            anyhow::anyhow!("Unknown scene '{}', expected one of: {}", name, known.join(", "))
        }),
    }
}

/// Keyboard shortcuts for the panel: D toggles collision shapes, Space drops, K kicks, P pauses
fn handle_key(scene: &mut Scene, key: &Key) {
    let result = match key {
        Key::Character(c) if c.as_str() == "d" && scene.has_control("collision shapes") => {
            scene.toggle("collision shapes").map(|v| info!("Collision shapes {}", if v { "on" } else { "off" }))
        }
        Key::Named(NamedKey::Space) if scene.has_control("drop") => scene.trigger("drop"),
        Key::Character(c) if c.as_str() == "k" && scene.has_control("kick") => scene.trigger("kick"),
        Key::Character(c) if c.as_str() == "p" => {
            let sim = &mut scene.stage_mut().sim;
            sim.toggle_pause();
            info!("Simulation {}", if sim.driver().is_paused() { "paused" } else { "resumed" });
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        warn!("{}", e);
    }
}

/// Panel layout and shadow setup, once at startup
fn log_scene_summary(scene: &Scene) {
    for folder in scene.panel().folders() {
        let controls: Vec<&str> = scene.panel().controls_in(folder).collect();
        info!("Panel [{}]: {}", folder, controls.join(", "));
    }

    let ctx = &scene.stage().ctx;
    info!(
        "{} nodes ({} casting shadows, {} receiving), {} lights ({} casting shadows)",
        ctx.graph.len(),
        ctx.graph.iter().filter(|(_, node)| node.cast_shadow).count(),
        ctx.graph.iter().filter(|(_, node)| node.receive_shadow).count(),
        ctx.lights.len(),
        ctx.lights.active().filter(|light| light.cast_shadow).count()
    );
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let kind = scene_from_args()?;
    info!("Starting physics stage with scene '{}'...", kind.name());

    let mut scene = kind.build()?;
    log_scene_summary(&scene);
    let mut clock = FrameClock::with_max_frame_delta(scene.stage().sim.config().driver.max_frame_delta);

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(format!("Physics Stage - {}", kind.name()))
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!(
                    "Close requested after {:.1}s and {} frames, shutting down...",
                    clock.elapsed().as_secs_f32(),
                    clock.frame_count()
                );
                scene.teardown();
                elwt.exit();
            }
            Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key,
                                state: ElementState::Pressed,
                                repeat: false,
                                ..
                            },
                        ..
                    },
                ..
            } => handle_key(&mut scene, &logical_key),
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                let delta = clock.tick();
                let report = scene.frame(delta);
                if report.pruned > 0 || report.commands_failed > 0 {
                    warn!(
                        "frame {}: {} bindings pruned, {} commands failed",
                        report.frame, report.pruned, report.commands_failed
                    );
                }

                if clock.frame_count() % STATS_INTERVAL == 0 {
                    let stage = scene.stage();
                    info!(
                        "frame {}: {:.1} fps, {} steps total, {} bodies in {} bindings, {} visible nodes ({} debug), {} lights, {} loads pending",
                        report.frame,
                        clock.fps(),
                        stage.sim.driver().step_count(),
                        stage.sim.world().body_count(),
                        stage.sim.registry().len(),
                        stage.ctx.graph.visible_nodes().count(),
                        stage.ctx.graph.count_on_layer(Layer::Debug),
                        stage.ctx.lights.active().count(),
                        stage.sim.gateway().pending()
                    );
                    window.set_title(&format!(
                        "Physics Stage - {} ({:.0} fps)",
                        kind.name(),
                        clock.fps()
                    ));
                }
            }
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
