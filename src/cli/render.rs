//! Plain-text rendering of route updates

use yyc_route::{RenderUpdate, RouteAlternative, Step};

pub fn render_step(index: usize, step: &Step) -> String {
    format!("Step {}: Travel on {} ({:.2} km)", index + 1, step.name, step.length_meters / 1000.0)
}

/// One line per alternative, the emphasized one marked
pub fn render_alternatives(update: &RenderUpdate) -> Vec<String> {
    update
        .route_layers
        .iter()
        .enumerate()
        .map(|(idx, route)| {
            let marker = if update.emphasized == Some(idx) { "  ⭐ fastest" } else { "" };
            format!("Route {}: {}{marker}", idx + 1, alternative_label(route))
        })
        .collect()
}

fn alternative_label(route: &RouteAlternative) -> String {
    let totals = route.summary().totals();
    format!("{}, {}", totals.distance_label(), totals.formatted_time)
}

/// Full text for an update: markers, alternatives, steps, totals, then the status line
pub fn render_update(update: &RenderUpdate) -> String {
    let mut sections: Vec<Vec<String>> = Vec::new();

    let markers = [("📍 Start", update.start_marker), ("🏁 End", update.end_marker)];
    sections.push(
        markers
            .iter()
            .filter_map(|(label, point)| point.map(|p| format!("{label}: {p}")))
            .collect(),
    );

    if update.route_layers.len() > 1 {
        sections.push(render_alternatives(update));
    }

    sections.push(update.steps.iter().enumerate().map(|(i, step)| render_step(i, step)).collect());

    if let Some(totals) = &update.totals {
        sections.push(vec![
            format!("Total distance: {}", totals.distance_label()),
            format!("Estimated travel time: {}", totals.formatted_time),
        ]);
    }

    if !update.status_message.is_empty() {
        sections.push(vec![update.status_message.clone()]);
    }

    sections
        .into_iter()
        .filter(|section| !section.is_empty())
        .map(|section| section.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}
