// Dashboard controllers: load data, rebuild charts on control changes, route interaction

use crate::aggregate::{Aggregation, SortOrder};
use crate::config::DashboardConfig;
use crate::csv_reader::{self, CsvData};
use crate::data::Dataset;
use crate::dispatch::{Dispatcher, FilterEvent, SelectionSet};
use crate::error::DashError;
use crate::ir::Page;
use crate::profile::{DashboardKind, Profile};
use crate::resolve::ResolvedFields;
use crate::summary::{chart_summary, ChartType};
use crate::tooltip::{HoverTarget, TooltipPayload};
use crate::view::{ActiveChart, BarChart, BarParams, ChartSlot, ScatterParams, Scatterplot};
use anyhow::{anyhow, bail, Context, Result};
use std::cell::RefCell;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

/// Input encoding of the data table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DataFormat {
    #[default]
    Csv,
    Json,
}

/// Current values of the dashboard's select controls
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub x_attr: String,
    pub y_attr: String,
    pub aggregation: Aggregation,
    pub sort_order: SortOrder,
}

impl Controls {
    pub fn defaults(kind: DashboardKind) -> Self {
        match kind {
            DashboardKind::Sales => Controls {
                x_attr: "Genre".to_string(),
                y_attr: "Global_Sales".to_string(),
                aggregation: Aggregation::Sum,
                sort_order: SortOrder::Desc,
            },
            DashboardKind::Trails => Controls {
                x_attr: "difficulty".to_string(),
                y_attr: "distance".to_string(),
                aggregation: Aggregation::Count,
                sort_order: SortOrder::Desc,
            },
        }
    }

    fn bar_params(&self) -> BarParams {
        BarParams {
            x_attr: self.x_attr.clone(),
            y_attr: self.y_attr.clone(),
            aggregation: self.aggregation,
            sort_order: self.sort_order,
        }
    }

    fn scatter_params(&self) -> ScatterParams {
        ScatterParams {
            y_attr: self.y_attr.clone(),
            aggregation: self.aggregation,
        }
    }

    /// Replace the attribute names with the headers a chart resolved them to
    fn canonical(mut self, fields: Option<&ResolvedFields>) -> Self {
        if let Some(fields) = fields {
            self.x_attr = fields.key_field.clone();
            self.y_attr = fields.measure_field.clone();
        }
        self
    }
}

fn unknown_x(profile: &Profile, x_attr: &str, with_ordinal: bool) -> DashError {
    let mut expected: Vec<&str> = profile.categorical_fields.iter().map(String::as_str).collect();
    if with_ordinal {
        expected.push(&profile.ordinal_field);
    }
    DashError::invalid_option("x", x_attr, &expected)
}

/// Read the data table for `profile` from `path`, or stdin when `path` is `None`.
///
/// Any failure here is terminal for the session.
pub fn load_dataset(path: Option<&Path>, format: DataFormat, profile: &Profile) -> Result<Dataset> {
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdin".to_string());

    let dataset = match format {
        DataFormat::Csv => {
            let csv: CsvData = match path {
                Some(p) => csv_reader::read_csv_from_path(p),
                None => csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin"),
            }
            .map_err(|e| DashError::load_failure(&source, format!("{:#}", e)))?;
            Dataset::from_csv(csv, &profile.numeric_fields)
        }
        DataFormat::Json => {
            let text = read_text(path).map_err(|e| DashError::load_failure(&source, format!("{:#}", e)))?;
            let value: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| DashError::load_failure(&source, e))?;
            Dataset::from_json(&value, &profile.numeric_fields)
        }
    }
    .with_context(|| format!("Failed to load {} data from {}", profile_name(profile.kind), source))?;

    info!(source = %source, rows = dataset.len(), "data loaded");
    Ok(dataset)
}

fn read_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("Failed to open '{}'", p.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .lock()
                .read_to_string(&mut text)
                .context("Failed to read JSON from stdin")?;
            Ok(text)
        }
    }
}

fn profile_name(kind: DashboardKind) -> &'static str {
    match kind {
        DashboardKind::Sales => "sales",
        DashboardKind::Trails => "trails",
    }
}

/// Locate the mark under a page position: `(column, key)`
fn hit_page(page: &Page, x: f64, y: f64) -> Option<(usize, String)> {
    let (cw, ch) = page.cell_size();
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let col = (x / cw as f64) as usize;
    let row = (y / ch as f64) as usize;
    let panel = page.panels.iter().find(|p| p.row == row && p.col == col)?;
    let key = panel
        .scene
        .hit_test(x - (col as u32 * cw) as f64, y - (row as u32 * ch) as f64)?;
    Some((col, key.to_string()))
}

/// The operations a user can perform on a dashboard
pub trait Dashboard {
    fn controls(&self) -> &Controls;

    /// Any control change rebuilds the charts
    fn apply_controls(&mut self, controls: Controls) -> Result<()>;

    fn hover(&self, target: &HoverTarget) -> Result<TooltipPayload>;

    fn toggle(&mut self, category: &str) -> Result<SelectionSet>;

    fn clear_selection(&mut self) -> Result<SelectionSet>;

    /// Every chart surface, left to right
    fn page(&self) -> Page;

    fn summary(&self) -> String;
}

// =============================================================================
// Sales
// =============================================================================

/// One chart area showing either a bar chart (categorical x) or a scatterplot (ordinal x)
#[derive(Debug)]
pub struct SalesDashboard {
    dataset: Rc<Dataset>,
    profile: Rc<Profile>,
    config: DashboardConfig,
    controls: Controls,
    slot: ChartSlot,
}

impl SalesDashboard {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Result<Self> {
        let profile = Profile::sales();
        let controls = Controls::defaults(profile.kind);
        let mut dashboard = Self {
            dataset: Rc::new(dataset),
            profile: Rc::new(profile),
            config,
            controls: controls.clone(),
            slot: ChartSlot::new(),
        };
        dashboard.draw(controls)?;
        Ok(dashboard)
    }

    /// Rebuild the chart for `controls`. The previous chart stays mounted if this fails.
    pub fn draw(&mut self, controls: Controls) -> Result<()> {
        self.dataset.field_index(&controls.x_attr)?;

        let view = if self.profile.is_categorical(&controls.x_attr) {
            let mut chart = BarChart::new(
                Rc::clone(&self.dataset),
                Rc::clone(&self.profile),
                self.config.bar.clone(),
                controls.bar_params(),
            );
            chart.render()?;
            ActiveChart::Bar(chart)
        } else if controls.x_attr.eq_ignore_ascii_case(&self.profile.ordinal_field) {
            let mut chart = Scatterplot::new(
                Rc::clone(&self.dataset),
                Rc::clone(&self.profile),
                self.config.scatter.clone(),
                controls.scatter_params(),
            );
            chart.render()?;
            ActiveChart::Scatter(chart)
        } else {
            return Err(unknown_x(&self.profile, &controls.x_attr, true).into());
        };

        let mounted = self.slot.mount(view);
        let chart_type = mounted.chart_type();
        self.controls = controls.canonical(mounted.fields());
        info!(chart = %chart_type, summary = %self.summary(), "chart drawn");
        Ok(())
    }

    pub fn active_chart(&self) -> Option<&ActiveChart> {
        self.slot.view()
    }
}

impl Dashboard for SalesDashboard {
    fn controls(&self) -> &Controls {
        &self.controls
    }

    fn apply_controls(&mut self, controls: Controls) -> Result<()> {
        self.draw(controls)
    }

    fn hover(&self, target: &HoverTarget) -> Result<TooltipPayload> {
        let chart = self.slot.view().ok_or_else(|| anyhow!("No chart has been drawn"))?;
        let key = match target {
            HoverTarget::Key(key) => key.clone(),
            HoverTarget::Point { x, y } => hit_page(&self.page(), *x, *y)
                .map(|(_, key)| key)
                .ok_or_else(|| anyhow!("No mark at ({}, {})", x, y))?,
        };
        Ok(chart.tooltip(&key)?)
    }

    fn toggle(&mut self, _category: &str) -> Result<SelectionSet> {
        bail!("The sales dashboard has no cross-filter; toggle is only available on the trails dashboard")
    }

    fn clear_selection(&mut self) -> Result<SelectionSet> {
        Ok(SelectionSet::new())
    }

    fn page(&self) -> Page {
        Page::row(self.slot.view().map(|v| v.scene().clone()).into_iter().collect())
    }

    fn summary(&self) -> String {
        let chart_type = self
            .slot
            .view()
            .map(ActiveChart::chart_type)
            .unwrap_or(ChartType::BarChart);
        chart_summary(
            &self.profile.vocabulary,
            &self.controls.x_attr,
            &self.controls.y_attr,
            chart_type,
            self.controls.aggregation,
        )
    }
}

// =============================================================================
// Trails
// =============================================================================

/// Bar chart of trails per category; toggling bars filters the scatterplot
#[derive(Debug)]
pub struct TrailsDashboard {
    profile: Rc<Profile>,
    controls: Controls,
    bar: BarChart,
    scatter: Rc<RefCell<Scatterplot>>,
    dispatcher: Dispatcher,
}

impl TrailsDashboard {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Result<Self> {
        let dataset = Rc::new(dataset);
        let profile = Rc::new(Profile::trails());
        let controls = Controls::defaults(profile.kind);

        let mut scatter = Scatterplot::new(
            Rc::clone(&dataset),
            Rc::clone(&profile),
            config.scatter.clone(),
            controls.scatter_params(),
        );
        scatter.render()?;
        let scatter = Rc::new(RefCell::new(scatter));

        let mut bar = BarChart::new(Rc::clone(&dataset), Rc::clone(&profile), config.bar.clone(), controls.bar_params());
        bar.render()?;

        let mut dispatcher = Dispatcher::new();
        let listener = Rc::clone(&scatter);
        dispatcher.subscribe(move |event| {
            let FilterEvent::FilterCategories(selection) = event;
            listener.borrow_mut().set_selection(selection)?;
            Ok(())
        });

        Ok(Self {
            profile,
            controls,
            bar,
            scatter,
            dispatcher,
        })
    }

    pub fn bar(&self) -> &BarChart {
        &self.bar
    }

    pub fn scatter(&self) -> Rc<RefCell<Scatterplot>> {
        Rc::clone(&self.scatter)
    }

    fn publish(&mut self, selection: SelectionSet) -> Result<SelectionSet> {
        self.dispatcher
            .publish(&FilterEvent::FilterCategories(selection.clone()))
            .context("Failed to apply cross-filter")?;
        Ok(selection)
    }
}

impl Dashboard for TrailsDashboard {
    fn controls(&self) -> &Controls {
        &self.controls
    }

    fn apply_controls(&mut self, controls: Controls) -> Result<()> {
        if !self.profile.is_categorical(&controls.x_attr) {
            return Err(unknown_x(&self.profile, &controls.x_attr, false).into());
        }
        self.bar.update(controls.bar_params())?;
        self.scatter.borrow_mut().update(controls.scatter_params())?;
        self.controls = controls.canonical(self.bar.fields());

        // the bar chart drops its selection when regrouped
        let selection = self.bar.selection().clone();
        self.publish(selection)?;
        info!(summary = %self.summary(), "charts redrawn");
        Ok(())
    }

    fn hover(&self, target: &HoverTarget) -> Result<TooltipPayload> {
        match target {
            HoverTarget::Key(key) => match self.bar.tooltip(key) {
                Ok(payload) => Ok(payload),
                Err(_) => Ok(self.scatter.borrow().tooltip(key)?),
            },
            HoverTarget::Point { x, y } => {
                let (col, key) = hit_page(&self.page(), *x, *y).ok_or_else(|| anyhow!("No mark at ({}, {})", x, y))?;
                if col == 0 {
                    Ok(self.bar.tooltip(&key)?)
                } else {
                    Ok(self.scatter.borrow().tooltip(&key)?)
                }
            }
        }
    }

    fn toggle(&mut self, category: &str) -> Result<SelectionSet> {
        let filter_field = self.profile.filter_field.as_deref().unwrap_or_default();
        if !self.bar.params().x_attr.eq_ignore_ascii_case(filter_field) {
            bail!(
                "Cross-filtering needs the bar chart grouped by '{}' (currently '{}')",
                filter_field,
                self.bar.params().x_attr
            );
        }

        let selection = self.bar.toggle_category(category)?;
        debug!(category, selection = %selection, "bar toggled");
        self.publish(selection)
    }

    fn clear_selection(&mut self) -> Result<SelectionSet> {
        let selection = self.bar.clear_selection();
        self.publish(selection)
    }

    fn page(&self) -> Page {
        Page::row(vec![self.bar.scene().clone(), self.scatter.borrow().scene().clone()])
    }

    fn summary(&self) -> String {
        chart_summary(
            &self.profile.vocabulary,
            &self.controls.x_attr,
            &self.controls.y_attr,
            ChartType::BarChart,
            self.controls.aggregation,
        )
    }
}
