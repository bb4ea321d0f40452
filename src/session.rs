// Replay a parsed interaction script against a dashboard

use crate::controller::{Controls, Dashboard};
use crate::parser::{ControlChange, Event, Script};
use crate::tooltip::{HoverTarget, TooltipPayload};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

/// What one event produced, in script order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Outcome {
    Redrawn { summary: String },
    Tooltip(TooltipPayload),
    Selection { selected: Vec<String> },
}

fn merge(current: &Controls, change: &ControlChange) -> Controls {
    Controls {
        x_attr: change.x.clone().unwrap_or_else(|| current.x_attr.clone()),
        y_attr: change.y.clone().unwrap_or_else(|| current.y_attr.clone()),
        aggregation: change.aggregation.unwrap_or(current.aggregation),
        sort_order: change.sort.unwrap_or(current.sort_order),
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::Controls(_) => "controls".to_string(),
        Event::Hover(HoverTarget::Key(key)) => format!("hover {}", key),
        Event::Hover(HoverTarget::Point { x, y }) => format!("hover at ({}, {})", x, y),
        Event::Toggle(category) => format!("toggle {}", category),
        Event::Clear => "clear".to_string(),
    }
}

/// Apply one event
pub fn apply(dashboard: &mut dyn Dashboard, event: &Event) -> Result<Outcome> {
    let outcome = match event {
        Event::Controls(change) => {
            let controls = merge(dashboard.controls(), change);
            dashboard.apply_controls(controls)?;
            Outcome::Redrawn {
                summary: dashboard.summary(),
            }
        }
        Event::Hover(target) => Outcome::Tooltip(dashboard.hover(target)?),
        Event::Toggle(category) => {
            let selection = dashboard.toggle(category)?;
            Outcome::Selection {
                selected: selection.iter().map(str::to_string).collect(),
            }
        }
        Event::Clear => {
            let selection = dashboard.clear_selection()?;
            Outcome::Selection {
                selected: selection.iter().map(str::to_string).collect(),
            }
        }
    };
    Ok(outcome)
}

/// Apply every event in order. Stops at the first failure; earlier events stay applied.
pub fn replay(dashboard: &mut dyn Dashboard, script: &Script) -> Result<Vec<Outcome>> {
    let mut outcomes = Vec::with_capacity(script.events.len());
    for (i, event) in script.events.iter().enumerate() {
        debug!(index = i, event = %describe(event), "replaying");
        let outcome = apply(dashboard, event).with_context(|| format!("Event {} ({}) failed", i + 1, describe(event)))?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
