use plotters::style::RGBColor;

// =============================================================================
// Scene Graph
// =============================================================================

/// Everything one chart view drew on its last redraw, in pixel space.
/// The backend executes these commands blindly.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl SceneGraph {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Iterate the data marks (bars and symbols) with their keys
    pub fn marks(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.mark_key().is_some())
    }

    /// Key of the topmost data mark under `(x, y)`
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&str> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            DrawCommand::Rect { tl, br, key: Some(key), .. } => {
                let inside = x >= tl.0.min(br.0) && x <= tl.0.max(br.0) && y >= tl.1.min(br.1) && y <= tl.1.max(br.1);
                inside.then_some(key.as_str())
            }
            DrawCommand::Symbol { center, radius, key: Some(key), .. } => {
                let (dx, dy) = (x - center.0, y - center.1);
                (dx * dx + dy * dy <= radius * radius).then_some(key.as_str())
            }
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    /// Rotated a quarter turn counter-clockwise, reading bottom to top
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        // Top-Left, Bottom-Right
        tl: (f64, f64),
        br: (f64, f64),
        fill: RGBColor,
        /// Data key when this rect is a bar
        key: Option<String>,
        /// Part of the current selection
        active: bool,
    },
    Symbol {
        center: (f64, f64),
        radius: f64,
        fill: RGBColor,
        stroke: RGBColor,
        key: Option<String>,
    },
    Line {
        points: Vec<(f64, f64)>,
        color: RGBColor,
        width: u32,
    },
    Text {
        pos: (f64, f64),
        text: String,
        size: f64,
        color: RGBColor,
        anchor: Anchor,
        orientation: Orientation,
    },
    /// Vertical gradient: `bottom` color at the bottom edge, `top` at the top edge
    Gradient {
        tl: (f64, f64),
        br: (f64, f64),
        bottom: RGBColor,
        top: RGBColor,
    },
    /// Outlined region with a titled note next to it
    Callout {
        subject_tl: (f64, f64),
        subject_br: (f64, f64),
        note_pos: (f64, f64),
        title: String,
        label: String,
        wrap: usize,
    },
}

impl DrawCommand {
    pub fn mark_key(&self) -> Option<&str> {
        match self {
            DrawCommand::Rect { key, .. } | DrawCommand::Symbol { key, .. } => key.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// Chart scenes laid out on a grid, one cell per chart slot
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub nrow: usize,
    pub ncol: usize,
    pub panels: Vec<PanelScene>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelScene {
    pub row: usize,
    pub col: usize,
    pub scene: SceneGraph,
}

impl Page {
    /// Place scenes left to right on a single row
    pub fn row(scenes: Vec<SceneGraph>) -> Self {
        let ncol = scenes.len().max(1);
        let panels = scenes
            .into_iter()
            .enumerate()
            .map(|(col, scene)| PanelScene { row: 0, col, scene })
            .collect();
        Self { nrow: 1, ncol, panels }
    }

    /// Cell size is the largest scene; the page is the grid of cells
    pub fn cell_size(&self) -> (u32, u32) {
        self.panels.iter().fold((1, 1), |(w, h), p| (w.max(p.scene.width), h.max(p.scene.height)))
    }

    pub fn size(&self) -> (u32, u32) {
        let (w, h) = self.cell_size();
        (w * self.ncol as u32, h * self.nrow as u32)
    }
}
