mod central_panel;
mod code_panel;
mod dialogs;
mod layer_panel;
mod menu_bar;
mod property_panel;
mod status;

pub use central_panel::central_panel;
pub use code_panel::{CodeView, code_panel};
pub use dialogs::{Dialog, PathPurpose, PendingAction, dialogs};
pub use layer_panel::layer_panel;
pub use menu_bar::menu_bar;
pub use property_panel::property_panel;
pub use status::{StatusKind, StatusLine, status_bar};

use eframe::egui;

use crate::PillowApp;

/// Left side: the layer stack above the selected item's properties
pub fn layers_side_panel(app: &mut PillowApp, ctx: &egui::Context) {
    egui::SidePanel::left("layers_panel")
        .resizable(true)
        .default_width(280.0)
        .show(ctx, |ui| {
            layer_panel(app, ui);
            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt("properties_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| property_panel(app, ui));
        });
}
