use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::config::BubbleAxis;
use crate::data::model::{Metric, Year};
use crate::data::query::StationSeries;
use crate::state::AppState;

const MIN_CHART_HEIGHT: f32 = 160.0;

// ---------------------------------------------------------------------------
// Central panel: the three charts
// ---------------------------------------------------------------------------

/// Render the bubble chart and both line charts stacked vertically.
pub fn charts(ui: &mut Ui, state: &AppState) {
    if state.engine.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to view power plants  (File → Open…)");
        });
        return;
    }

    let spacing = ui.spacing().item_spacing.y * 4.0 + 24.0;
    let height = ((ui.available_height() - spacing) / 3.0).max(MIN_CHART_HEIGHT);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            bubble_chart(ui, state, height);
            bubble_table(ui, state);
            ui.separator();
            line_chart(
                ui,
                state,
                "line_chart_generation",
                "Power Generation Over Time",
                Metric::PowerGeneration,
                &state.views.generation,
                height,
            );
            ui.separator();
            line_chart(
                ui,
                state,
                "line_chart_replacement_rate",
                "Component Replacement Rate Over Time",
                Metric::ReplacementRate,
                &state.views.replacement,
                height,
            );
        });
}

// ---------------------------------------------------------------------------
// Bubble chart
// ---------------------------------------------------------------------------

fn bubble_chart(ui: &mut Ui, state: &AppState, height: f32) {
    let year = state.year;
    let x_label = match state.config.bubble_x_axis {
        BubbleAxis::ReplacementRate => format!("Component Replacement Rate {year}"),
        BubbleAxis::ReplacementFreeRate => format!("Component Replacement-Free Rate {year}"),
    };
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(format!("{x_label} vs Power Generation ({year})"));
    });

    let factor = state.config.bubble_size_factor;
    Plot::new("bubble_chart")
        .height(height)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(format!("Power Generation {year}(MWh)"))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for point in &state.views.bubble {
                let markers = Points::new(PlotPoints::new(vec![[point.x, point.y]]))
                    .name(&point.station)
                    .color(state.colors.color_for(&point.station))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(bubble_radius(point.size, factor));
                plot_ui.points(markers);
            }
        });
}

/// Marker radius in points. `scale_mw * factor` is the diameter.
pub fn bubble_radius(scale_mw: f64, factor: f32) -> f32 {
    (scale_mw as f32 * factor / 2.0).clamp(2.0, 40.0)
}

fn bubble_table(ui: &mut Ui, state: &AppState) {
    egui::CollapsingHeader::new(format!("Chart data ({} stations)", state.views.bubble.len()))
        .id_salt("bubble_table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(160.0))
                .columns(Column::auto().at_least(90.0), 3)
                .header(20.0, |mut header| {
                    for title in ["Station", "Replacement rate", "Generation (MWh)", "Scale (MW)"] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|mut body| {
                    for point in &state.views.bubble {
                        body.row(18.0, |mut row| {
                            row.col(|ui: &mut Ui| {
                                ui.colored_label(
                                    state.colors.color_for(&point.station),
                                    point.station.as_str(),
                                );
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format!("{:.3}", point.x));
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format!("{:.1}", point.y));
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format!("{:.1}", point.size));
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Line charts
// ---------------------------------------------------------------------------

fn line_chart(
    ui: &mut Ui,
    state: &AppState,
    id: &str,
    title: &str,
    metric: Metric,
    series: &[StationSeries],
    height: f32,
) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(title);
    });

    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(metric.label())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series {
                let color = state.colors.color_for(&s.station);
                // Each run of present values is its own line, so gaps stay open.
                for segment in segments(&s.points) {
                    plot_ui.line(
                        Line::new(PlotPoints::new(segment))
                            .name(&s.station)
                            .color(color)
                            .width(2.0),
                    );
                }
                let present: Vec<[f64; 2]> = s
                    .points
                    .iter()
                    .filter_map(|&(year, value)| Some([year as f64, value?]))
                    .collect();
                plot_ui.points(
                    Points::new(PlotPoints::new(present))
                        .name(&s.station)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(3.5),
                );
            }
        });
}

/// Split a series into runs of consecutive present values.
pub fn segments(points: &[(Year, Option<f64>)]) -> Vec<Vec<[f64; 2]>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for &(year, value) in points {
        match value {
            Some(v) => current.push([year as f64, v]),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaps_split_segments() {
        let points = [
            (2016, None),
            (2017, Some(1.0)),
            (2018, Some(2.0)),
            (2019, None),
            (2020, Some(4.0)),
        ];
        let segs = segments(&points);
        assert_eq!(
            segs,
            vec![
                vec![[2017.0, 1.0], [2018.0, 2.0]],
                vec![[2020.0, 4.0]]
            ]
        );
        assert!(segments(&[(2016, None)]).is_empty());
    }

    #[test]
    fn bubble_radius_is_clamped() {
        assert_eq!(bubble_radius(10.0, 3.0), 15.0);
        assert_eq!(bubble_radius(0.1, 3.0), 2.0);
        assert_eq!(bubble_radius(500.0, 3.0), 40.0);
    }
}
