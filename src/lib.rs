// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

mod config;
mod easing;
mod error;
mod model;
mod render;
mod scheduler;
mod solver;

pub use config::{Color, WheelConfig};
pub use easing::Easing;
pub use error::{Result, WheelError};
pub use model::{sector_index_at_pointer, Sector, WheelGeometry, WheelModel};
pub use render::{draw, Canvas};
pub use scheduler::{Phase, SpinParams, SpinScheduler};
pub use solver::solve;

// External crate imports
use pixels::{Pixels, SurfaceTexture};

// Standard library imports
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for type-safe wheel control from outside the frame loop.
///
/// The target index is decided by the sender (a weighted picker, a server
/// response, whatever). The wheel only reveals it.
#[derive(Debug, Clone)]
pub enum WheelCommand {
    /// Spin to the externally chosen sector.
    Spin { target_index: usize },
    /// Replace the sector list. Applied immediately between spins; deferred
    /// until settle or cancel if a spin is in flight.
    SetSectors(Vec<Sector>),
    /// Abort an in-flight spin without settling.
    Cancel,
}

/// Outbound notifications from the windowed shell.
#[derive(Debug, Clone)]
pub enum WheelEvent {
    /// The wheel came to rest with this sector under the pointer.
    Settled { index: usize, label: String },
}

/// A spinnable wheel bound to a window: configuration plus the sector list.
///
/// `show*` opens a winit window, owns a pixels surface, and runs the frame
/// loop until the window closes. The animation core ([`SpinScheduler`],
/// [`solve`], [`draw`]) is usable without any window; this type is the
/// convenience shell wiring them to a real surface and clock.
#[derive(Debug, Clone)]
pub struct Wheel {
    config: WheelConfig,
    model: WheelModel,
}

impl Wheel {
    pub fn new(config: WheelConfig, sectors: Vec<Sector>) -> Result<Self> {
        Ok(Self {
            config,
            model: WheelModel::new(sectors)?,
        })
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn model(&self) -> &WheelModel {
        &self.model
    }

    /// Open the window and render the wheel at rest.
    pub fn show(&self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        self.run_window(None, None)
    }

    /// Open the window and drain commands once per frame.
    pub fn show_with_commands(
        &self,
        receiver: Receiver<WheelCommand>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver), None)
    }

    /// Like [`show_with_commands`](Self::show_with_commands), additionally
    /// reporting settles over `events`.
    pub fn show_with_channels(
        &self,
        receiver: Receiver<WheelCommand>,
        events: Sender<WheelEvent>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver), Some(events))
    }

    fn run_window(
        &self,
        receiver: Option<Receiver<WheelCommand>>,
        events: Option<Sender<WheelEvent>>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let logical_width = self.config.window_width;
        let logical_height = self.config.window_height;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                logical_width as f64,
                logical_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let config = self.config.clone();
        let params = config.spin_params();
        let mut model = self.model.clone();
        let mut scheduler = SpinScheduler::new();
        // Sector swaps requested mid-spin wait here until the wheel is free.
        let mut pending_sectors: Option<Vec<Sector>> = None;

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / config.max_framerate);
        let mut last_frame = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        // Tear the frame loop down with the view; a spin that
                        // outlives its surface is a leak, not an animation.
                        scheduler.cancel();
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(receiver) = &receiver {
                            drain_commands(
                                receiver,
                                &mut model,
                                &mut scheduler,
                                &mut pending_sectors,
                                events.as_ref(),
                                params,
                            );
                        }

                        scheduler.advance(Instant::now());
                        if scheduler.phase() != Phase::Spinning {
                            if let Some(sectors) = pending_sectors.take() {
                                apply_sectors(&mut model, &mut scheduler, sectors);
                            }
                        }

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        let geometry =
                            WheelGeometry::from_surface(fb_width, fb_height, config.wheel_margin);
                        if let Err(err) = render::draw(
                            &mut canvas,
                            &geometry,
                            model.sectors(),
                            &config,
                            scheduler.current_angle(),
                            scheduler.settled_index(),
                        ) {
                            log::error!("wheel render failed: {err}");
                        }
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

fn drain_commands(
    receiver: &Receiver<WheelCommand>,
    model: &mut WheelModel,
    scheduler: &mut SpinScheduler,
    pending_sectors: &mut Option<Vec<Sector>>,
    events: Option<&Sender<WheelEvent>>,
    params: SpinParams,
) {
    while let Ok(command) = receiver.try_recv() {
        match command {
            WheelCommand::Spin { target_index } => {
                let label = model
                    .sectors()
                    .get(target_index)
                    .map(|s| s.label.clone())
                    .unwrap_or_default();
                let events = events.cloned();
                let result = scheduler.start(
                    model.sectors(),
                    target_index,
                    params,
                    |angle| log::trace!("tick: {angle:.4} rad"),
                    move |index| {
                        log::info!("settled on sector {index}");
                        if let Some(events) = events {
                            let _ = events.send(WheelEvent::Settled { index, label });
                        }
                    },
                );
                if let Err(err) = result {
                    log::warn!("spin command rejected: {err}");
                }
            }
            WheelCommand::SetSectors(sectors) => {
                if scheduler.phase() == Phase::Spinning {
                    log::debug!("sector swap deferred until the current spin ends");
                    *pending_sectors = Some(sectors);
                } else {
                    // applied directly; any earlier deferred swap is superseded
                    *pending_sectors = None;
                    apply_sectors(model, scheduler, sectors);
                }
            }
            WheelCommand::Cancel => scheduler.cancel(),
        }
    }
}

fn apply_sectors(model: &mut WheelModel, scheduler: &mut SpinScheduler, sectors: Vec<Sector>) {
    match WheelModel::new(sectors) {
        Ok(new_model) => {
            // A new sector list is a new wheel; any settled pose is stale.
            scheduler.cancel();
            *model = new_model;
        }
        Err(err) => log::warn!("sector swap rejected: {err}"),
    }
}
