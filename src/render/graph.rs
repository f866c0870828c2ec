//! Time-series projection of the variables over the displayed window.

use crate::core::{Cursor, GroupFilter, Step, TraceHistory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

const MARGIN: f64 = 30.0;

/// Per-variable visibility checkboxes plus the "all" checkbox.
///
/// Unknown variables are visible. The "all" box is checked exactly when
/// every known variable is visible, so unchecking any one variable
/// unchecks it and checking the last hidden one checks it again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableToggles {
    visible: BTreeMap<String, bool>,
}

impl VariableToggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register variables, visible unless already toggled.
    pub fn learn<'a, I>(&mut self, names: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for name in names {
            self.visible.entry(name.clone()).or_insert(true);
        }
    }

    pub fn set(&mut self, name: &str, visible: bool) {
        self.visible.insert(name.to_string(), visible);
    }

    /// Drive every variable from the "all" checkbox.
    pub fn set_all(&mut self, visible: bool) {
        for value in self.visible.values_mut() {
            *value = visible;
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.visible.get(name).copied().unwrap_or(true)
    }

    pub fn all_checked(&self) -> bool {
        self.visible.values().all(|v| *v)
    }

    /// Opacity of a variable's line, points and label.
    pub fn opacity(&self, name: &str) -> f64 {
        if self.is_visible(name) {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub position: usize,
    pub value: f64,
}

/// One polyline of the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
    pub opacity: f64,
}

/// Axis tick showing the transition label of a position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub position: usize,
    pub label: String,
}

/// Values displayed when a tick or data point is toggled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub position: usize,
    pub label: String,
    pub values: BTreeMap<String, f64>,
}

/// Graph of every numeric variable over `[begin, end]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub begin: usize,
    pub end: usize,
    pub series: Vec<Series>,
    pub ticks: Vec<Tick>,
    pub tooltip: Option<Tooltip>,
}

impl GraphView {
    /// Project the window of `history` under `cursor`.
    ///
    /// Only firings passing `filter` contribute points. A window reduced
    /// to a single point duplicates it so each series still has a
    /// (zero-length) segment.
    pub fn build(
        history: &TraceHistory<Step>,
        cursor: &Cursor,
        filter: &GroupFilter,
        toggles: &VariableToggles,
        tooltip: Option<usize>,
    ) -> Self {
        let included: Vec<(usize, &Step)> = history
            .window(cursor.begin(), cursor.end())
            .iter()
            .enumerate()
            .map(|(i, step)| (cursor.begin() + i, step))
            .filter(|(_, step)| filter.process_group(&step.variables.groups))
            .collect();

        let names: BTreeSet<&String> = included
            .iter()
            .flat_map(|(_, step)| step.variables.values.keys())
            .collect();

        let series = names
            .into_iter()
            .map(|name| {
                let mut points: Vec<Point> = included
                    .iter()
                    .filter_map(|(position, step)| {
                        step.variables.get(name).map(|value| Point {
                            position: *position,
                            value,
                        })
                    })
                    .collect();
                if let [single] = points.as_slice() {
                    points.push(*single);
                }
                Series {
                    name: name.clone(),
                    points,
                    opacity: toggles.opacity(name),
                }
            })
            .collect();

        let ticks = included
            .iter()
            .map(|(position, step)| Tick {
                position: *position,
                label: tick_label(*position, step),
            })
            .collect();

        let tooltip = tooltip.and_then(|p| {
            included
                .iter()
                .find(|(position, _)| *position == p)
                .map(|(position, step)| Tooltip {
                    position: *position,
                    label: tick_label(*position, step),
                    values: step.variables.values.clone(),
                })
        });

        Self {
            begin: cursor.begin(),
            end: cursor.end(),
            series,
            ticks,
            tooltip,
        }
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Render the graph as a standalone SVG document.
    pub fn to_svg(&self, width: f64, height: f64) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_svg(&mut out, width, height);
        out
    }

    pub fn write_svg<W: Write>(&self, out: &mut W, width: f64, height: f64) -> fmt::Result {
        let scale = Scale::new(self, width, height);

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        )?;
        writeln!(
            out,
            r#"<line class="axis" x1="{m}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/>"#,
            m = MARGIN,
            b = height - MARGIN,
            r = width - MARGIN,
        )?;
        for tick in &self.ticks {
            writeln!(
                out,
                r#"<text class="tick" data-position="{p}" x="{x:.1}" y="{y:.1}" text-anchor="middle">{label}</text>"#,
                p = tick.position,
                x = scale.x(tick.position),
                y = height - MARGIN / 3.0,
                label = escape(&tick.label),
            )?;
        }
        for (i, series) in self.series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points: Vec<String> = series
                .points
                .iter()
                .map(|p| format!("{:.1},{:.1}", scale.x(p.position), scale.y(p.value)))
                .collect();
            writeln!(
                out,
                r#"<g class="series" data-name="{name}" opacity="{opacity}">"#,
                name = escape(&series.name),
                opacity = series.opacity,
            )?;
            writeln!(
                out,
                r#"<polyline fill="none" stroke="{color}" points="{}"/>"#,
                points.join(" ")
            )?;
            for p in &series.points {
                writeln!(
                    out,
                    r#"<circle data-position="{}" cx="{:.1}" cy="{:.1}" r="3" fill="{color}"/>"#,
                    p.position,
                    scale.x(p.position),
                    scale.y(p.value),
                )?;
            }
            writeln!(
                out,
                r#"<text class="label" x="{:.1}" y="{:.1}" fill="{color}">{}</text>"#,
                width - MARGIN + 2.0,
                MARGIN + 12.0 * i as f64,
                escape(&series.name),
            )?;
            writeln!(out, "</g>")?;
        }
        if let Some(tooltip) = &self.tooltip {
            let values: Vec<String> = tooltip
                .values
                .iter()
                .map(|(name, value)| format!("{name} = {value}"))
                .collect();
            writeln!(
                out,
                r#"<text class="tooltip" x="{:.1}" y="{:.1}">{}: {}</text>"#,
                scale.x(tooltip.position),
                MARGIN / 2.0,
                escape(&tooltip.label),
                escape(&values.join(", ")),
            )?;
        }
        writeln!(out, "</svg>")
    }
}

fn tick_label(position: usize, step: &Step) -> String {
    if position == 0 && step.trace.fired.is_none() {
        "init".to_string()
    } else {
        step.variables.transition.clone()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Maps positions and values into the drawing area.
struct Scale {
    begin: usize,
    span: f64,
    min: f64,
    range: f64,
    width: f64,
    height: f64,
}

impl Scale {
    fn new(view: &GraphView, width: f64, height: f64) -> Self {
        let values = view
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.value));
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let (min, max) = if min.is_finite() && max > min {
            (min, max)
        } else if min.is_finite() {
            (min - 1.0, min + 1.0)
        } else {
            (0.0, 1.0)
        };
        Self {
            begin: view.begin,
            span: view.end.saturating_sub(view.begin) as f64,
            min,
            range: max - min,
            width,
            height,
        }
    }

    fn x(&self, position: usize) -> f64 {
        let inner = self.width - 2.0 * MARGIN;
        if self.span == 0.0 {
            MARGIN + inner / 2.0
        } else {
            MARGIN + inner * (position.saturating_sub(self.begin) as f64) / self.span
        }
    }

    fn y(&self, value: f64) -> f64 {
        let inner = self.height - 2.0 * MARGIN;
        self.height - MARGIN - inner * (value - self.min) / self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ModeRef, TraceEntry, Variables};
    use chrono::Utc;

    fn step(position: u64, x: f64, groups: &[&str]) -> Step {
        Step {
            trace: TraceEntry {
                action: if position == 0 {
                    "init".to_string()
                } else {
                    format!("t{position}")
                },
                state: position,
                fired: (position > 0).then(|| ModeRef {
                    state: position - 1,
                    mode: 0,
                }),
                recorded_at: Utc::now(),
            },
            variables: Variables {
                values: [("x".to_string(), x), ("y".to_string(), 10.0 - x)]
                    .into_iter()
                    .collect(),
                transition: format!("t{position}"),
                groups: groups.iter().map(|g| g.to_string()).collect(),
            },
            modes: vec![],
            data: vec![],
        }
    }

    fn history() -> TraceHistory<Step> {
        let mut history = TraceHistory::new(step(0, 0.0, &[]));
        history.append(step(1, 1.0, &["odd"]));
        history.append(step(2, 2.0, &["even"]));
        history.append(step(3, 3.0, &["odd"]));
        history
    }

    fn cursor(begin: usize, end: usize, len: usize) -> Cursor {
        let mut cursor = Cursor::new();
        cursor.jump(end, len);
        cursor.set_begin(begin);
        cursor
    }

    #[test]
    fn one_series_per_variable_over_window() {
        let history = history();
        let view = GraphView::build(
            &history,
            &cursor(1, 3, history.len()),
            &GroupFilter::all(["odd", "even"]),
            &VariableToggles::new(),
            None,
        );

        assert_eq!(view.series.len(), 2);
        let x = view.series("x").unwrap();
        let positions: Vec<usize> = x.points.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(view.ticks.len(), 3);
        assert_eq!(view.ticks[0].label, "t1");
    }

    #[test]
    fn ticks_are_labelled_with_the_fired_transition() {
        let mut history = TraceHistory::new(step(0, 0.0, &[]));
        let mut fired = step(1, 1.0, &[]);
        fired.trace.action = "<span class=\"trans\">t1</span>".to_string();
        fired.variables.transition = "t1 : {x=1}".to_string();
        history.append(fired);

        let view = GraphView::build(
            &history,
            &cursor(0, 1, history.len()),
            &GroupFilter::all(Vec::<String>::new()),
            &VariableToggles::new(),
            None,
        );

        let labels: Vec<&str> = view.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["init", "t1 : {x=1}"]);
    }

    #[test]
    fn filtered_firings_are_skipped() {
        let history = history();
        let mut filter = GroupFilter::all(["odd", "even"]);
        filter.set_group("odd", false);

        let view = GraphView::build(
            &history,
            &cursor(0, 3, history.len()),
            &filter,
            &VariableToggles::new(),
            None,
        );

        let positions: Vec<usize> = view.series("x").unwrap().points.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn single_point_is_duplicated() {
        let history = history();
        let view = GraphView::build(
            &history,
            &cursor(2, 2, history.len()),
            &GroupFilter::all(["odd", "even"]),
            &VariableToggles::new(),
            None,
        );

        let x = view.series("x").unwrap();
        assert_eq!(x.points.len(), 2);
        assert_eq!(x.points[0], x.points[1]);
        assert_eq!(view.ticks.len(), 1);
    }

    #[test]
    fn empty_window_has_empty_series() {
        let history = history();
        let mut filter = GroupFilter::all(["odd", "even"]);
        filter.set_group("even", false);
        let view = GraphView::build(
            &history,
            &cursor(2, 2, history.len()),
            &filter,
            &VariableToggles::new(),
            None,
        );
        assert!(view.series.is_empty());
        assert!(view.ticks.is_empty());
        assert!(view.to_svg(200.0, 100.0).contains("</svg>"));
    }

    #[test]
    fn hidden_variable_is_transparent() {
        let history = history();
        let mut toggles = VariableToggles::new();
        toggles.set("y", false);

        let view = GraphView::build(
            &history,
            &cursor(0, 3, history.len()),
            &GroupFilter::all(["odd", "even"]),
            &toggles,
            None,
        );
        assert_eq!(view.series("x").unwrap().opacity, 1.0);
        assert_eq!(view.series("y").unwrap().opacity, 0.0);
    }

    #[test]
    fn all_checkbox_tracks_individual_toggles() {
        let mut toggles = VariableToggles::new();
        toggles.learn(&["a".to_string(), "b".to_string()]);
        assert!(toggles.all_checked());

        toggles.set("a", false);
        assert!(!toggles.all_checked());

        toggles.set("a", true);
        assert!(toggles.all_checked());

        toggles.set_all(false);
        assert!(!toggles.is_visible("a"));
        assert!(!toggles.is_visible("b"));
        toggles.learn(&["a".to_string(), "c".to_string()]);
        assert!(!toggles.is_visible("a"));
        assert!(toggles.is_visible("c"));
    }

    #[test]
    fn tooltip_shows_values_of_position() {
        let history = history();
        let view = GraphView::build(
            &history,
            &cursor(0, 3, history.len()),
            &GroupFilter::all(["odd", "even"]),
            &VariableToggles::new(),
            Some(2),
        );
        let tooltip = view.tooltip.unwrap();
        assert_eq!(tooltip.position, 2);
        assert_eq!(tooltip.label, "t2");
        assert_eq!(tooltip.values.get("y"), Some(&8.0));
    }

    #[test]
    fn tooltip_outside_window_is_hidden() {
        let history = history();
        let view = GraphView::build(
            &history,
            &cursor(2, 3, history.len()),
            &GroupFilter::all(["odd", "even"]),
            &VariableToggles::new(),
            Some(0),
        );
        assert!(view.tooltip.is_none());
    }

    #[test]
    fn svg_contains_series_and_ticks() {
        let history = history();
        let view = GraphView::build(
            &history,
            &cursor(0, 3, history.len()),
            &GroupFilter::all(["odd", "even"]),
            &VariableToggles::new(),
            Some(1),
        );
        let svg = view.to_svg(400.0, 200.0);

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches(r#"class="tick""#).count(), 4);
        assert!(svg.contains(r#"data-name="x""#));
        assert!(svg.contains(r#"class="tooltip""#));
        assert!(svg.contains(">init<"));
    }
}
