use super::state::AppEvent;
use eframe::egui;
use std::future::Future;
use std::sync::mpsc::{self as std_mpsc, Receiver, Sender};
use tokio::runtime::Runtime;

/// Runs remote calls off the UI thread and hands results back as events.
pub struct Dispatcher {
    runtime: Runtime,
    sender: Sender<AppEvent>,
    ctx: egui::Context,
}

impl Dispatcher {
    pub fn new(runtime: Runtime, ctx: egui::Context) -> (Self, Receiver<AppEvent>) {
        let (sender, receiver) = std_mpsc::channel();
        (
            Self {
                runtime,
                sender,
                ctx,
            },
            receiver,
        )
    }

    /// Run `task` on the runtime and deliver its event on the next frame.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let sender = self.sender.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = task.await;
            sender.send(event).unwrap_or_default();
            ctx.request_repaint();
        });
    }

    /// Like `spawn`, for tasks that report through their own channel.
    pub fn spawn_detached<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            task.await;
            ctx.request_repaint();
        });
    }
}
