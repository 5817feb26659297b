use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(engine) = &state.engine else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state below.
    let cities = engine.table().cities();
    let project_types = engine.table().project_types();
    let years = engine.table().years();

    // ---- City ----
    ui.strong("City");
    let mut city = state.city.clone();
    egui::ComboBox::from_id_salt("city_dropdown")
        .width(ui.available_width())
        .selected_text(city.as_deref().unwrap_or("All cities"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut city, None, "All cities");
            for c in &cities {
                ui.selectable_value(&mut city, Some(c.clone()), c.as_str());
            }
        });
    state.set_city(city);
    ui.add_space(6.0);

    // ---- Project type ----
    ui.strong("Project type");
    let mut project_type = state.project_type.clone();
    ui.radio_value(&mut project_type, None, "Any");
    for pt in &project_types {
        ui.radio_value(&mut project_type, Some(pt.clone()), pt.as_str());
    }
    state.set_project_type(project_type);
    ui.add_space(6.0);

    // ---- Year ----
    ui.strong("Year");
    let mut year = state.year;
    ui.add(egui::Slider::new(&mut year, years.first..=years.last).step_by(1.0));
    state.set_year(year);
    ui.separator();

    // ---- Stations ----
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!(
            "Power stations  ({}/{})",
            state.selected.len(),
            state.station_options.len()
        ));
        if ui.small_button("Clear").clicked() {
            state.clear_selection();
        }
    });
    if state.selected.is_empty() {
        ui.label(
            RichText::new(format!(
                "Showing the first {} (bubble) / {} (lines) stations",
                state.config.bubble_default_count, state.config.series_default_count
            ))
            .italics()
            .weak(),
        );
    }

    let options = state.station_options.clone();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for name in &options {
                let mut checked = state.is_selected(name);
                let text = RichText::new(name).color(state.colors.color_for(name));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_station(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(
            RichText::new("Power Plants")
                .strong()
                .color(Color32::from_rgb(0x2E, 0x86, 0xC1)),
        );

        if let Some(engine) = &state.engine {
            ui.separator();
            ui.label(format!(
                "{} stations, {}–{}",
                engine.table().len(),
                engine.table().years().first,
                engine.table().years().last
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open power plant data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
