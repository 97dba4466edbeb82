//! Dedicated render thread.
//!
//! The GPU context is created by a setup closure that runs *on* the render
//! thread, and the session it feeds never leaves that thread. Other threads
//! drive it through [`RenderThread`], whose methods forward commands over a
//! channel; the ones that return a value wait for the reply.

use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use anyhow::{Context, anyhow};

use crate::coords::ViewportSize;
use crate::device::GlApi;
use crate::render::{RenderConfig, RendererKind};

use super::config::SessionConfig;
use super::render_session::{NO_RENDERER, RenderSession};

/// Drawable the render thread presents into (EGL window surface, swap chain).
pub trait PresentSurface {
    /// Current size in physical pixels.
    fn size(&self) -> ViewportSize;

    /// Shows the frame that was just rendered.
    fn present(&mut self) -> anyhow::Result<()>;
}

enum Command {
    Init {
        kind: RendererKind,
        config: RenderConfig,
        reply: Sender<bool>,
    },
    RenderFrame,
    Resize { width: u32, height: u32 },
    Cleanup,
    Name { reply: Sender<&'static str> },
    FrameNumber { reply: Sender<u64> },
    Shutdown,
}

/// Handle to a thread that owns a GPU context and a [`RenderSession`].
///
/// Dropping the handle shuts the thread down; the session is cleaned up on
/// the render thread before it exits.
pub struct RenderThread {
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Starts the thread and runs `setup` on it to create the context and
    /// surface. Returns once setup has finished, with its error if it failed.
    pub fn spawn<G, S, F>(config: SessionConfig, setup: F) -> anyhow::Result<Self>
    where
        G: GlApi + 'static,
        S: PresentSurface + 'static,
        F: FnOnce() -> anyhow::Result<(Rc<G>, S)> + Send + 'static,
    {
        let (commands, inbox) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        let handle = std::thread::Builder::new()
            .name("gyre-render".to_string())
            .spawn(move || {
                let (gl, surface) = match setup() {
                    Ok(parts) => parts,
                    Err(e) => {
                        let _ = ready_tx.send(Err(format!("{e:#}")));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                run(RenderSession::new(gl, config), surface, inbox);
            })
            .context("failed to spawn render thread")?;

        let ready = ready_rx
            .recv()
            .map_err(|_| anyhow!("render thread exited during setup"))
            .and_then(|r| r.map_err(|e| anyhow!(e)));

        if let Err(e) = ready {
            let _ = handle.join();
            return Err(e).context("render thread setup failed");
        }

        log::info!("render thread started");
        Ok(Self {
            commands,
            handle: Some(handle),
        })
    }

    /// Replaces the active renderer. Returns `false` when initialization
    /// failed or the thread is gone.
    pub fn init(&self, kind: RendererKind, config: RenderConfig) -> bool {
        let (reply, answer) = mpsc::channel();
        let command = Command::Init {
            kind,
            config,
            reply,
        };
        if self.commands.send(command).is_err() {
            return false;
        }
        answer.recv().unwrap_or(false)
    }

    /// Queues one frame: render, then present if something was drawn.
    pub fn render_frame(&self) {
        let _ = self.commands.send(Command::RenderFrame);
    }

    pub fn resize(&self, width: u32, height: u32) {
        let _ = self.commands.send(Command::Resize { width, height });
    }

    /// Releases the active renderer's GPU resources.
    pub fn cleanup(&self) {
        let _ = self.commands.send(Command::Cleanup);
    }

    pub fn renderer_name(&self) -> &'static str {
        let (reply, answer) = mpsc::channel();
        if self.commands.send(Command::Name { reply }).is_err() {
            return NO_RENDERER;
        }
        answer.recv().unwrap_or(NO_RENDERER)
    }

    /// Frames rendered since the last successful `init`.
    pub fn frame_number(&self) -> u64 {
        let (reply, answer) = mpsc::channel();
        if self.commands.send(Command::FrameNumber { reply }).is_err() {
            return 0;
        }
        answer.recv().unwrap_or(0)
    }

    /// Stops the thread and waits for it to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.commands.send(Command::Shutdown);
        if handle.join().is_err() {
            log::error!("render thread panicked");
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<G: GlApi + 'static, S: PresentSurface>(
    mut session: RenderSession<G>,
    mut surface: S,
    inbox: Receiver<Command>,
) {
    let size = surface.size();
    let _ = session.resize(size.width, size.height);

    // A closed channel means every handle is gone; treat it as shutdown.
    while let Ok(command) = inbox.recv() {
        match command {
            Command::Init {
                kind,
                config,
                reply,
            } => {
                let ok = session.init(kind, &config).is_ok();
                let _ = reply.send(ok);
            }
            Command::RenderFrame => match session.render_frame() {
                Ok(true) => {
                    if let Err(e) = surface.present() {
                        log::error!("present failed: {e:#}");
                    }
                }
                Ok(false) => {}
                Err(e) => log::debug!("frame skipped: {e}"),
            },
            Command::Resize { width, height } => {
                let _ = session.resize(width, height);
            }
            Command::Cleanup => session.cleanup(),
            Command::Name { reply } => {
                let _ = reply.send(session.renderer_name());
            }
            Command::FrameNumber { reply } => {
                let _ = reply.send(session.frame_number());
            }
            Command::Shutdown => break,
        }
    }

    session.cleanup();
    log::info!("render thread exiting");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread::{self, ThreadId};

    use super::*;
    use crate::device::HeadlessGl;
    use crate::render::ShaderDialect;

    /// Records the thread of every present.
    struct RecordingSurface {
        size: ViewportSize,
        presents: Arc<Mutex<Vec<ThreadId>>>,
    }

    impl PresentSurface for RecordingSurface {
        fn size(&self) -> ViewportSize {
            self.size
        }

        fn present(&mut self) -> anyhow::Result<()> {
            self.presents.lock().unwrap().push(thread::current().id());
            Ok(())
        }
    }

    type Shared<T> = Arc<Mutex<T>>;

    fn spawn() -> (RenderThread, Shared<Vec<ThreadId>>, Shared<Option<ThreadId>>) {
        let presents = Arc::new(Mutex::new(Vec::new()));
        let setup_thread = Arc::new(Mutex::new(None));
        let (p, s) = (Arc::clone(&presents), Arc::clone(&setup_thread));
        let rt = RenderThread::spawn(SessionConfig::default(), move || {
            *s.lock().unwrap() = Some(thread::current().id());
            let surface = RecordingSurface {
                size: ViewportSize::new(800, 600),
                presents: p,
            };
            Ok((Rc::new(HeadlessGl::new()), surface))
        })
        .unwrap();
        (rt, presents, setup_thread)
    }

    #[test]
    fn gpu_work_stays_on_render_thread() {
        let (rt, presents, setup_thread) = spawn();
        assert!(rt.init(RendererKind::Triangle, RenderConfig::triangle_for(ShaderDialect::Core)));
        rt.render_frame();
        rt.render_frame();
        assert_eq!(rt.frame_number(), 2);

        let setup = setup_thread.lock().unwrap().unwrap();
        assert_ne!(setup, thread::current().id());
        let presents = presents.lock().unwrap();
        assert_eq!(presents.len(), 2);
        assert!(presents.iter().all(|id| *id == setup));
    }

    #[test]
    fn render_before_init_presents_nothing() {
        let (rt, presents, _) = spawn();
        rt.render_frame();
        assert_eq!(rt.renderer_name(), NO_RENDERER);
        assert!(presents.lock().unwrap().is_empty());
    }

    #[test]
    fn init_failure_reports_false() {
        let (rt, _, _) = spawn();
        let bad = RenderConfig::cube_for(ShaderDialect::Core).with_vertex_shader("");
        assert!(!rt.init(RendererKind::Cube, bad));
        assert_eq!(rt.renderer_name(), NO_RENDERER);
    }

    #[test]
    fn cleanup_round_trips() {
        let (rt, _, _) = spawn();
        assert!(rt.init(RendererKind::Cube, RenderConfig::cube_for(ShaderDialect::Core)));
        assert_eq!(rt.renderer_name(), "cube");
        rt.resize(1024, 768);
        rt.cleanup();
        assert_eq!(rt.renderer_name(), NO_RENDERER);
        rt.shutdown();
    }

    #[test]
    fn setup_error_is_returned() {
        let result = RenderThread::spawn::<HeadlessGl, RecordingSurface, _>(
            SessionConfig::default(),
            || Err(anyhow!("no display")),
        );
        let err = result.err().unwrap();
        assert!(format!("{err:#}").contains("no display"));
    }
}
