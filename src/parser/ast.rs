// Syntax tree for dashboard interaction scripts

use crate::aggregate::{Aggregation, SortOrder};
use crate::tooltip::HoverTarget;

/// A sequence of user interactions, replayed in order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Change one or more select controls; the charts rebuild once
    Controls(ControlChange),
    Hover(HoverTarget),
    /// Click a bar (trails dashboard)
    Toggle(String),
    /// Empty the bar selection
    Clear,
}

/// Control values to change. `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlChange {
    pub x: Option<String>,
    pub y: Option<String>,
    pub aggregation: Option<Aggregation>,
    pub sort: Option<SortOrder>,
}

impl ControlChange {
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.aggregation.is_none() && self.sort.is_none()
    }
}
