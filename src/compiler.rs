use crate::aggregate::AggregatedPoint;
use crate::config::{plot_size, BarConfig, Margin, ScatterConfig};
use crate::data::{format_number, format_significant};
use crate::dispatch::SelectionSet;
use crate::ir::{Anchor, DrawCommand, Orientation, SceneGraph};
use crate::palette::{mix, ColorScale};
use crate::scale::{extent, nice_ticks, zero_based_domain, BandScale, LinearScale};
use plotters::style::RGBColor;

const AXIS_COLOR: RGBColor = RGBColor(0x44, 0x44, 0x44);
const GRID_COLOR: RGBColor = RGBColor(0xdd, 0xdd, 0xdd);
const TITLE_COLOR: RGBColor = RGBColor(0x66, 0xcc, 0xff);
const WHITE: RGBColor = RGBColor(0xff, 0xff, 0xff);
const BLACK: RGBColor = RGBColor(0, 0, 0);

const TICK_SIZE: f64 = 6.0;
const TICK_FONT: f64 = 12.0;
const TITLE_FONT: f64 = 16.0;

/// Bars outside a non-empty selection are blended this far toward white
const FADE: f64 = 0.6;

const LEGEND_WIDTH: f64 = 20.0;
const LEGEND_HEIGHT: f64 = 200.0;
/// Legend distance from the right edge of the container
const LEGEND_INSET: f64 = 80.0;

pub const CALLOUT_TITLE: &str = "Zero-value Explanation";
pub const CALLOUT_LABEL: &str = "These zeros are real data points. Some publishers only released \
    games in certain regions, so their sales elsewhere are zero. Only part of the data is shown at a \
    time, which can make the values look unusual.";

/// Everything a bar chart redraw depends on
#[derive(Debug, Clone)]
pub struct BarScene<'a> {
    pub points: &'a [AggregatedPoint],
    pub colors: &'a ColorScale,
    pub selection: &'a SelectionSet,
    pub x_title: &'a str,
    pub y_title: &'a str,
    pub show_callout: bool,
    pub config: &'a BarConfig,
}

/// Everything a scatterplot redraw depends on
#[derive(Debug, Clone)]
pub struct ScatterScene<'a> {
    pub points: &'a [AggregatedPoint],
    pub colors: &'a ColorScale,
    pub x_title: &'a str,
    pub y_title: &'a str,
    /// Appended to legend tick labels
    pub legend_suffix: &'a str,
    pub config: &'a ScatterConfig,
}

/// Distance of the x-axis title below the plot; long publisher names need more room
pub fn x_title_offset(key_field: &str) -> f64 {
    if key_field.eq_ignore_ascii_case("Publisher") {
        130.0
    } else {
        90.0
    }
}

/// Radius of a circle symbol with the given area
pub fn symbol_radius(area: f64) -> f64 {
    (area.max(0.0) / std::f64::consts::PI).sqrt()
}

fn text(pos: (f64, f64), text: String, size: f64, color: RGBColor, anchor: Anchor) -> DrawCommand {
    DrawCommand::Text {
        pos,
        text,
        size,
        color,
        anchor,
        orientation: Orientation::Horizontal,
    }
}

fn vertical_text(pos: (f64, f64), text: String, size: f64, color: RGBColor, anchor: Anchor) -> DrawCommand {
    DrawCommand::Text {
        pos,
        text,
        size,
        color,
        anchor,
        orientation: Orientation::Vertical,
    }
}

fn line(points: Vec<(f64, f64)>, color: RGBColor) -> DrawCommand {
    DrawCommand::Line { points, color, width: 1 }
}

/// Y axis on the left edge of the plot with tick marks, labels and optional grid lines
fn y_axis(commands: &mut Vec<DrawCommand>, margin: &Margin, (w, h): (f64, f64), scale: &LinearScale, count: usize, grid: bool) {
    let (left, top) = (margin.left, margin.top);
    for tick in scale.ticks(count) {
        let y = top + scale.map(tick);
        if grid {
            commands.push(line(vec![(left - TICK_SIZE, y), (left + w, y)], GRID_COLOR));
        } else {
            commands.push(line(vec![(left - TICK_SIZE, y), (left, y)], AXIS_COLOR));
        }
        commands.push(text((left - TICK_SIZE - 3.0, y), format_number(tick), TICK_FONT, AXIS_COLOR, Anchor::End));
    }
    if !grid {
        commands.push(line(vec![(left, top), (left, top + h)], AXIS_COLOR));
    }
}

/// Compile a bar chart into draw commands.
///
/// Bars are laid out in the order of `points`, which is the ranked order.
pub fn compile_bar(scene: &BarScene) -> SceneGraph {
    let config = scene.config;
    let margin = &config.margin;
    let (w, h) = plot_size(config.container_width, config.container_height, margin);
    let mut graph = SceneGraph::new(config.container_width, config.container_height);
    let commands = &mut graph.commands;

    let labels: Vec<String> = scene.points.iter().map(|p| p.key.label()).collect();
    let band = BandScale::new(labels.clone(), (0.0, w), config.padding);
    let y = LinearScale::new(zero_based_domain(scene.points.iter().map(|p| p.value)), (h, 0.0));

    y_axis(commands, margin, (w, h), &y, config.y_ticks, false);

    // x axis: baseline plus one vertical label per band
    let baseline = margin.top + h;
    commands.push(line(vec![(margin.left, baseline), (margin.left + w, baseline)], AXIS_COLOR));
    for (idx, label) in labels.iter().enumerate() {
        let cx = margin.left + band.position_at(idx) + band.bandwidth() / 2.0;
        commands.push(line(vec![(cx, baseline), (cx, baseline + TICK_SIZE)], AXIS_COLOR));
        commands.push(vertical_text((cx, baseline + TICK_SIZE + 3.0), label.clone(), TICK_FONT, AXIS_COLOR, Anchor::End));
    }

    let filtering = !scene.selection.is_empty();
    for (idx, (point, label)) in scene.points.iter().zip(labels).enumerate() {
        let x0 = margin.left + band.position_at(idx);
        let active = scene.selection.contains(&label);
        let base = scene.colors.color_for(&point.key, point.value);
        let fill = if filtering && !active { mix(base, WHITE, FADE) } else { base };

        commands.push(DrawCommand::Rect {
            tl: (x0, margin.top + y.map(point.value)),
            br: (x0 + band.bandwidth(), baseline),
            fill,
            key: Some(label),
            active,
        });
    }

    commands.push(text(
        (margin.left + w / 2.0, baseline + x_title_offset(scene.x_title)),
        scene.x_title.to_string(),
        TITLE_FONT,
        TITLE_COLOR,
        Anchor::Middle,
    ));
    commands.push(vertical_text((15.0, margin.top + h / 2.0), scene.y_title.to_string(), TITLE_FONT, TITLE_COLOR, Anchor::Middle));

    if scene.show_callout {
        let (sx, sy) = (margin.left, margin.top + 200.0);
        commands.push(DrawCommand::Callout {
            subject_tl: (sx, sy),
            subject_br: (sx + 890.0_f64.min(w), sy + 20.0),
            note_pos: (sx + 30.0, sy - 15.0),
            title: CALLOUT_TITLE.to_string(),
            label: CALLOUT_LABEL.to_string(),
            wrap: 385,
        });
    }

    graph
}

/// Compile a scatterplot into draw commands: grid, symbols, titles and a
/// gradient legend when the color scale is sequential
pub fn compile_scatter(scene: &ScatterScene) -> SceneGraph {
    let config = scene.config;
    let margin = &config.margin;
    let (w, h) = plot_size(config.container_width, config.container_height, margin);
    let mut graph = SceneGraph::new(config.container_width, config.container_height);
    let commands = &mut graph.commands;

    let x = LinearScale::new(
        extent(scene.points.iter().filter_map(|p| p.key.as_f64())),
        (0.0, w),
    );
    let y = LinearScale::new(zero_based_domain(scene.points.iter().map(|p| p.value)), (h, 0.0));

    // grid lines run the full plot with a small overhang, no domain lines
    let bottom = margin.top + h;
    for tick in x.ticks(config.ticks) {
        let px = margin.left + x.map(tick);
        commands.push(line(vec![(px, margin.top - TICK_SIZE), (px, bottom + TICK_SIZE)], GRID_COLOR));
        commands.push(text((px, bottom + TICK_SIZE + 12.0), format_number(tick.round()), TICK_FONT, AXIS_COLOR, Anchor::Middle));
    }
    y_axis(commands, margin, (w, h), &y, config.ticks, true);

    let radius = symbol_radius(config.symbol_size);
    for point in scene.points {
        // Text keys have no position on a linear axis
        let Some(key) = point.key.as_f64() else { continue };
        commands.push(DrawCommand::Symbol {
            center: (margin.left + x.map(key), margin.top + y.map(point.value)),
            radius,
            fill: scene.colors.color_for(&point.key, point.value),
            stroke: BLACK,
            key: Some(point.key.label()),
        });
    }

    commands.push(text((margin.left + w / 2.0, bottom + 75.0), scene.x_title.to_string(), TITLE_FONT, TITLE_COLOR, Anchor::Middle));
    commands.push(vertical_text((15.0, margin.top + h / 2.0), scene.y_title.to_string(), TITLE_FONT, TITLE_COLOR, Anchor::Middle));

    if let (Some((low, high)), ColorScale::Sequential { domain }) = (scene.colors.gradient(), scene.colors) {
        legend(commands, config, *domain, (low, high), scene.legend_suffix);
    }

    graph
}

fn legend(commands: &mut Vec<DrawCommand>, config: &ScatterConfig, (d0, d1): (f64, f64), (low, high): (RGBColor, RGBColor), suffix: &str) {
    let left = config.container_width as f64 - LEGEND_INSET;
    let top = config.margin.top;
    let right = left + LEGEND_WIDTH;

    commands.push(DrawCommand::Gradient {
        tl: (left, top),
        br: (right, top + LEGEND_HEIGHT),
        bottom: low,
        top: high,
    });

    let scale = LinearScale::new((d0, d1), (top + LEGEND_HEIGHT, top));
    for tick in nice_ticks(d0, d1, config.legend_ticks) {
        let py = scale.map(tick);
        commands.push(line(vec![(right, py), (right + TICK_SIZE, py)], AXIS_COLOR));
        commands.push(text(
            (right + TICK_SIZE + 3.0, py),
            format!("{}{}", format_significant(tick, 4), suffix),
            TICK_FONT,
            AXIS_COLOR,
            Anchor::Start,
        ));
    }

    commands.push(text((left + LEGEND_WIDTH / 2.0, top - 10.0), "Legend".to_string(), 14.0, AXIS_COLOR, Anchor::Middle));
}
