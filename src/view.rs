//! Chart views.
//!
//! A view owns its parameters and the scene it drew last. Every call to
//! `update` stores the parameters, aggregates, recomputes scale domains and
//! compiles a fresh [`SceneGraph`]; identical parameters give an identical scene.

use crate::aggregate::{aggregate, rank_and_trim, sort_by_key, AggregatedPoint, Aggregation, SortOrder};
use crate::compiler::{compile_bar, compile_scatter, BarScene, ScatterScene};
use crate::config::{BarConfig, ScatterConfig};
use crate::data::{Dataset, Record};
use crate::dispatch::SelectionSet;
use crate::error::DashError;
use crate::ir::SceneGraph;
use crate::palette::ColorScale;
use crate::profile::{DashboardKind, Profile};
use crate::resolve::{resolve_fields, resolve_filter_field, ResolvedFields};
use crate::summary::ChartType;
use crate::tooltip::{bar_tooltip, scatter_tooltip, TooltipPayload};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Constructed, nothing drawn yet
    Configured,
    Rendered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarParams {
    pub x_attr: String,
    pub y_attr: String,
    pub aggregation: Aggregation,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterParams {
    pub y_attr: String,
    pub aggregation: Aggregation,
}

fn max_value(points: &[AggregatedPoint]) -> f64 {
    points.iter().map(|p| p.value).fold(0.0, f64::max)
}

fn find_point<'a>(points: &'a [AggregatedPoint], field: &str, key: &str) -> Result<&'a AggregatedPoint, DashError> {
    points
        .iter()
        .find(|p| p.key.label() == key)
        .ok_or_else(|| not_drawn(field, key))
}

/// No mark on screen carries this key
fn not_drawn(field: &str, key: &str) -> DashError {
    DashError::UnknownCategory {
        field: field.to_string(),
        category: key.to_string(),
    }
}

// =============================================================================
// Bar chart
// =============================================================================

/// Ranked bars over a categorical field
#[derive(Debug, Clone)]
pub struct BarChart {
    dataset: Rc<Dataset>,
    profile: Rc<Profile>,
    config: BarConfig,
    params: BarParams,
    fields: Option<ResolvedFields>,
    points: Vec<AggregatedPoint>,
    colors: ColorScale,
    selection: SelectionSet,
    scene: SceneGraph,
    state: ViewState,
}

impl BarChart {
    pub fn new(dataset: Rc<Dataset>, profile: Rc<Profile>, config: BarConfig, params: BarParams) -> Self {
        // sales bars shade by value, trail bars use the fixed difficulty palette
        let colors = match profile.kind {
            DashboardKind::Sales => ColorScale::blues(1.0),
            DashboardKind::Trails => ColorScale::difficulty(),
        };
        let scene = SceneGraph::new(config.container_width, config.container_height);
        Self {
            dataset,
            profile,
            config,
            params,
            fields: None,
            points: Vec::new(),
            colors,
            selection: SelectionSet::new(),
            scene,
            state: ViewState::Configured,
        }
    }

    /// Redraw with the parameters given at construction
    pub fn render(&mut self) -> Result<&SceneGraph, DashError> {
        self.update(self.params.clone())
    }

    pub fn update(&mut self, params: BarParams) -> Result<&SceneGraph, DashError> {
        debug!(
            x = %params.x_attr,
            y = %params.y_attr,
            aggregation = %params.aggregation,
            sort = %params.sort_order,
            "bar chart update"
        );

        let fields = resolve_fields(&self.dataset, &self.profile, &params.x_attr, &params.y_attr, params.aggregation)?;
        let grouped = aggregate(
            &self.dataset,
            self.dataset.records(),
            &fields.key_field,
            fields.value_field(),
            params.aggregation,
        )?;
        let points = rank_and_trim(grouped, params.sort_order, self.config.limit);

        if self.fields.as_ref().map(|f| f.key_idx) != Some(fields.key_idx) {
            self.selection.clear();
        }
        self.colors = self.colors.clone().with_max(max_value(&points));
        self.points = points;
        self.fields = Some(fields);
        self.params = params;
        self.redraw();
        debug!(bars = self.points.len(), "bar chart rendered");
        Ok(&self.scene)
    }

    fn show_callout(&self, fields: &ResolvedFields) -> bool {
        self.profile.kind == DashboardKind::Sales
            && fields.key_field == "Publisher"
            && self.params.sort_order == SortOrder::Asc
            && fields.measure_field != "Global_Sales"
            && fields.is_summed()
    }

    fn redraw(&mut self) {
        let Some(fields) = self.fields.as_ref() else { return };
        let y_title = self.profile.vocabulary.y_axis_title(&fields.measure_field, fields.is_summed());
        self.scene = compile_bar(&BarScene {
            points: &self.points,
            colors: &self.colors,
            selection: &self.selection,
            x_title: &fields.key_field,
            y_title: &y_title,
            show_callout: self.show_callout(fields),
            config: &self.config,
        });
        self.state = ViewState::Rendered;
    }

    /// Flip one bar in or out of the selection and redraw; returns the new selection
    pub fn toggle_category(&mut self, category: &str) -> Result<SelectionSet, DashError> {
        let field = self.fields.as_ref().map(|f| f.key_field.as_str()).unwrap_or(&self.params.x_attr);
        find_point(&self.points, field, category)?;
        self.selection.toggle(category);
        self.redraw();
        Ok(self.selection.clone())
    }

    pub fn clear_selection(&mut self) -> SelectionSet {
        self.selection.clear();
        self.redraw();
        self.selection.clone()
    }

    pub fn tooltip(&self, key: &str) -> Result<TooltipPayload, DashError> {
        let Some(fields) = self.fields.as_ref() else {
            return Err(not_drawn(&self.params.x_attr, key));
        };
        let point = find_point(&self.points, &fields.key_field, key)?;
        Ok(bar_tooltip(&self.profile.vocabulary, fields, point, self.dataset.records()))
    }

    pub fn params(&self) -> &BarParams {
        &self.params
    }

    /// Column names as resolved by the last successful update
    pub fn fields(&self) -> Option<&ResolvedFields> {
        self.fields.as_ref()
    }

    pub fn points(&self) -> &[AggregatedPoint] {
        &self.points
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn state(&self) -> ViewState {
        self.state
    }
}

// =============================================================================
// Scatterplot
// =============================================================================

/// Aggregated values over the profile's ordinal field, filterable by selection
#[derive(Debug, Clone)]
pub struct Scatterplot {
    dataset: Rc<Dataset>,
    profile: Rc<Profile>,
    config: ScatterConfig,
    params: ScatterParams,
    /// Indices into `dataset.records()` of the working subset
    active_subset: Vec<usize>,
    fields: Option<ResolvedFields>,
    points: Vec<AggregatedPoint>,
    colors: ColorScale,
    scene: SceneGraph,
    state: ViewState,
}

impl Scatterplot {
    pub fn new(dataset: Rc<Dataset>, profile: Rc<Profile>, config: ScatterConfig, params: ScatterParams) -> Self {
        let active_subset = (0..dataset.len()).collect();
        let scene = SceneGraph::new(config.container_width, config.container_height);
        Self {
            dataset,
            profile,
            config,
            params,
            active_subset,
            fields: None,
            points: Vec::new(),
            colors: ColorScale::blues(1.0),
            scene,
            state: ViewState::Configured,
        }
    }

    pub fn render(&mut self) -> Result<&SceneGraph, DashError> {
        self.update(self.params.clone())
    }

    pub fn update(&mut self, params: ScatterParams) -> Result<&SceneGraph, DashError> {
        debug!(y = %params.y_attr, aggregation = %params.aggregation, active = self.active_subset.len(), "scatterplot update");

        let fields = resolve_fields(
            &self.dataset,
            &self.profile,
            &self.profile.ordinal_field,
            &params.y_attr,
            params.aggregation,
        )?;
        let mut points = aggregate(
            &self.dataset,
            self.active_records(),
            &fields.key_field,
            fields.value_field(),
            params.aggregation,
        )?;
        sort_by_key(&mut points);

        self.colors = ColorScale::blues(max_value(&points));
        self.points = points;
        self.fields = Some(fields);
        self.params = params;
        self.redraw();
        debug!(points = self.points.len(), "scatterplot rendered");
        Ok(&self.scene)
    }

    fn redraw(&mut self) {
        let Some(fields) = self.fields.as_ref() else { return };
        let vocabulary = &self.profile.vocabulary;
        let y_title = vocabulary.y_axis_title(&fields.measure_field, fields.is_summed());
        let legend_suffix = if fields.is_summed() { vocabulary.unit_suffix.as_str() } else { "" };
        self.scene = compile_scatter(&ScatterScene {
            points: &self.points,
            colors: &self.colors,
            x_title: &self.profile.ordinal_label,
            y_title: &y_title,
            legend_suffix,
            config: &self.config,
        });
        self.state = ViewState::Rendered;
    }

    /// Restrict the working subset to records whose filter field is selected.
    /// An empty selection restores every record.
    pub fn set_selection(&mut self, selection: &SelectionSet) -> Result<&SceneGraph, DashError> {
        let filter_idx = resolve_filter_field(&self.dataset, &self.profile)?;
        self.active_subset = match filter_idx {
            Some(idx) if !selection.is_empty() => self
                .dataset
                .records()
                .iter()
                .enumerate()
                .filter(|(_, r)| selection.contains(&r.text(idx)))
                .map(|(i, _)| i)
                .collect(),
            _ => (0..self.dataset.len()).collect(),
        };
        self.render()
    }

    pub fn active_records(&self) -> impl Iterator<Item = &Record> + '_ {
        let records = self.dataset.records();
        self.active_subset.iter().filter_map(move |&i| records.get(i))
    }

    pub fn active_len(&self) -> usize {
        self.active_subset.len()
    }

    pub fn tooltip(&self, key: &str) -> Result<TooltipPayload, DashError> {
        let Some(fields) = self.fields.as_ref() else {
            return Err(not_drawn(&self.profile.ordinal_field, key));
        };
        let point = find_point(&self.points, &fields.key_field, key)?;
        Ok(scatter_tooltip(&self.profile.vocabulary, fields, point, self.active_records()))
    }

    pub fn params(&self) -> &ScatterParams {
        &self.params
    }

    pub fn fields(&self) -> Option<&ResolvedFields> {
        self.fields.as_ref()
    }

    pub fn points(&self) -> &[AggregatedPoint] {
        &self.points
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn state(&self) -> ViewState {
        self.state
    }
}

// =============================================================================
// Chart slot
// =============================================================================

#[derive(Debug, Clone)]
pub enum ActiveChart {
    Bar(BarChart),
    Scatter(Scatterplot),
}

impl ActiveChart {
    pub fn chart_type(&self) -> ChartType {
        match self {
            ActiveChart::Bar(_) => ChartType::BarChart,
            ActiveChart::Scatter(_) => ChartType::Scatterplot,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        match self {
            ActiveChart::Bar(chart) => chart.scene(),
            ActiveChart::Scatter(chart) => chart.scene(),
        }
    }

    pub fn fields(&self) -> Option<&ResolvedFields> {
        match self {
            ActiveChart::Bar(chart) => chart.fields(),
            ActiveChart::Scatter(chart) => chart.fields(),
        }
    }

    pub fn tooltip(&self, key: &str) -> Result<TooltipPayload, DashError> {
        match self {
            ActiveChart::Bar(chart) => chart.tooltip(key),
            ActiveChart::Scatter(chart) => chart.tooltip(key),
        }
    }
}

/// One drawing surface. Holds at most one view; mounting replaces the previous one.
#[derive(Debug, Default)]
pub struct ChartSlot {
    view: Option<ActiveChart>,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, view: ActiveChart) -> &mut ActiveChart {
        if let Some(old) = self.view.take() {
            debug!(chart = %old.chart_type(), "clearing chart area");
        }
        self.view.insert(view)
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn view(&self) -> Option<&ActiveChart> {
        self.view.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_none()
    }
}
