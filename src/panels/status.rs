use eframe::egui;

use crate::PillowApp;

/// Seconds an informational message stays visible
pub const INFO_TIMEOUT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// One transient message shown at the bottom of the window
#[derive(Debug, Default)]
pub struct StatusLine {
    message: Option<(String, StatusKind)>,
    /// egui time at which the message was first shown
    shown_at: Option<f64>,
}

impl StatusLine {
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.set(message, StatusKind::Info);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.set(message, StatusKind::Error);
    }

    fn set(&mut self, message: String, kind: StatusKind) {
        self.message = Some((message, kind));
        self.shown_at = None;
    }

    pub fn current(&self) -> Option<(&str, StatusKind)> {
        self.message
            .as_ref()
            .map(|(message, kind)| (message.as_str(), *kind))
    }

    /// Expires informational messages; errors stay until replaced
    pub fn tick(&mut self, now: f64) {
        match (&self.message, self.shown_at) {
            (Some(_), None) => self.shown_at = Some(now),
            (Some((_, StatusKind::Info)), Some(at)) if now - at > INFO_TIMEOUT => {
                self.message = None;
                self.shown_at = None;
            }
            _ => {}
        }
    }
}

pub fn status_bar(app: &mut PillowApp, ctx: &egui::Context) {
    let now = ctx.input(|i| i.time);
    app.status.tick(now);

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            match app.status.current() {
                Some((message, StatusKind::Info)) => {
                    ui.label(message);
                }
                Some((message, StatusKind::Error)) => {
                    ui.colored_label(ui.visuals().error_fg_color, message);
                }
                None => {
                    ui.label("Ready");
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{:.0}%", app.canvas.view.zoom * 100.0));
                ui.separator();
                ui.label(format!("{} layers", app.project.layers().len()));
                if app.is_modified() {
                    ui.separator();
                    ui.label("Modified");
                }
            });
        });
    });
    if app.status.current().is_some() {
        ctx.request_repaint_after(std::time::Duration::from_secs(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_expires_but_error_stays() {
        let mut status = StatusLine::default();
        status.info("Saved");
        status.tick(10.0);
        status.tick(12.0);
        assert!(status.current().is_some());
        status.tick(15.5);
        assert!(status.current().is_none());

        status.error("Cannot open file");
        status.tick(20.0);
        status.tick(100.0);
        assert_eq!(status.current(), Some(("Cannot open file", StatusKind::Error)));
    }
}
