//! Wire payloads of the simulation server and their validating decoder.
//!
//! Server answers are decoded from raw JSON so that every malformed field
//! is reported at once instead of failing on the first one. Individual
//! checks return a `Validation` and are accumulated into a single
//! [`PayloadError`].

use crate::core::Mode;
use crate::transport::DomOp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A state description as returned by `succ` (and nested in `init`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    /// Server id of the state
    pub id: u64,
    /// Display operations describing the state
    pub states: Vec<DomOp>,
    /// Enabled modes, flattened across mode lists
    pub modes: Vec<Mode>,
    /// Numeric variables exposed by the simulator
    pub variables: BTreeMap<String, f64>,
    /// All groups the server classifies firings into
    pub groups: Vec<String>,
}

/// Help bubble attached to a display element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEntry {
    pub title: String,
    pub content: String,
}

/// Extra user interface action offered by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiAction {
    pub label: String,
    pub id: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub script: String,
}

/// Answer of `init`: the initial state plus optional extension points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InitPayload {
    pub state: StatePayload,
    pub help: BTreeMap<String, HelpEntry>,
    pub ui: Vec<UiAction>,
}

/// A single problem found while decoding a payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadIssue {
    #[error("{path}: expected an object")]
    NotAnObject { path: String },

    #[error("{path}: expected a list")]
    NotAList { path: String },

    #[error("{path}: missing field '{field}'")]
    MissingField { path: String, field: &'static str },

    #[error("{path}: invalid '{field}': {reason}")]
    InvalidField {
        path: String,
        field: String,
        reason: String,
    },

    #[error("{path}: unknown operation '{op}'")]
    UnknownOp { path: String, op: String },
}

/// Every issue found in a malformed payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed server payload ({} issue(s))", .issues.len())]
pub struct PayloadError {
    pub issues: Vec<PayloadIssue>,
}

type Checked<T> = Validation<T, NonEmptyVec<PayloadIssue>>;

/// Decode the answer of `succ`.
pub fn decode_state(value: &Value) -> Result<StatePayload, PayloadError> {
    let mut issues = Vec::new();
    let payload = state_payload(value, "state").into_option(&mut issues);
    finish(payload, issues)
}

/// Decode the answer of `init`.
///
/// `help` and `ui` are optional; the state is required.
pub fn decode_init(value: &Value) -> Result<InitPayload, PayloadError> {
    let mut issues = Vec::new();
    let Some(obj) = object(value, "init").into_option(&mut issues) else {
        return finish(None, issues);
    };

    let state = required(obj, "init", "state")
        .and_then_check(|v| state_payload(v, "init.state"))
        .into_option(&mut issues);

    let help = match obj.get("help") {
        None | Some(Value::Null) => Some(BTreeMap::new()),
        Some(v) => typed::<BTreeMap<String, HelpEntry>>(v, "init", "help").into_option(&mut issues),
    };

    let ui = match obj.get("ui") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(v) => typed::<Vec<UiAction>>(v, "init", "ui").into_option(&mut issues),
    };

    let payload = match (state, help, ui) {
        (Some(state), Some(help), Some(ui)) => Some(InitPayload { state, help, ui }),
        _ => None,
    };
    finish(payload, issues)
}

fn finish<T>(value: Option<T>, issues: Vec<PayloadIssue>) -> Result<T, PayloadError> {
    match value {
        Some(value) if issues.is_empty() => Ok(value),
        _ => Err(PayloadError { issues }),
    }
}

trait CheckedExt<T> {
    fn into_option(self, issues: &mut Vec<PayloadIssue>) -> Option<T>;
    fn and_then_check<U, F>(self, f: F) -> Checked<U>
    where
        F: FnOnce(T) -> Checked<U>;
}

impl<T> CheckedExt<T> for Checked<T> {
    fn into_option(self, issues: &mut Vec<PayloadIssue>) -> Option<T> {
        match self {
            Validation::Success(value) => Some(value),
            Validation::Failure(errors) => {
                issues.extend(errors.iter().cloned());
                None
            }
        }
    }

    fn and_then_check<U, F>(self, f: F) -> Checked<U>
    where
        F: FnOnce(T) -> Checked<U>,
    {
        match self {
            Validation::Success(value) => f(value),
            Validation::Failure(errors) => Validation::Failure(errors),
        }
    }
}

fn state_payload(value: &Value, path: &str) -> Checked<StatePayload> {
    let mut issues = Vec::new();
    let Some(obj) = object(value, path).into_option(&mut issues) else {
        return fail_all(issues);
    };

    let id = required(obj, path, "id")
        .and_then_check(|v| id_value(v, path, "id"))
        .into_option(&mut issues);
    let states = list(obj.get("states"), path, "states")
        .and_then_check(|items| ops(items, &format!("{path}.states")))
        .into_option(&mut issues);
    let modes = list(obj.get("modes"), path, "modes")
        .and_then_check(|blocks| mode_blocks(blocks, &format!("{path}.modes")))
        .into_option(&mut issues);
    let variables = variables(obj.get("variables"), path).into_option(&mut issues);
    let groups = match obj.get("groups") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(v) => typed::<Vec<String>>(v, path, "groups").into_option(&mut issues),
    };

    match (id, states, modes, variables, groups) {
        (Some(id), Some(states), Some(modes), Some(variables), Some(groups)) if issues.is_empty() => {
            Validation::success(StatePayload {
                id,
                states,
                modes,
                variables,
                groups,
            })
        }
        _ => fail_all(issues),
    }
}

fn fail_all<T>(issues: Vec<PayloadIssue>) -> Checked<T> {
    let checks: Vec<Checked<()>> = issues.into_iter().map(Validation::fail).collect();
    match Validation::all_vec(checks) {
        Validation::Failure(errors) => Validation::Failure(errors),
        // only reachable with no issues at all, which callers never pass
        Validation::Success(_) => Validation::fail(PayloadIssue::NotAnObject {
            path: String::new(),
        }),
    }
}

fn object<'a>(value: &'a Value, path: &str) -> Checked<&'a Map<String, Value>> {
    match value.as_object() {
        Some(obj) => Validation::success(obj),
        None => Validation::fail(PayloadIssue::NotAnObject {
            path: path.to_string(),
        }),
    }
}

fn required<'a>(obj: &'a Map<String, Value>, path: &str, field: &'static str) -> Checked<&'a Value> {
    match obj.get(field) {
        Some(value) if !value.is_null() => Validation::success(value),
        _ => Validation::fail(PayloadIssue::MissingField {
            path: path.to_string(),
            field,
        }),
    }
}

/// Missing and `null` lists decode as empty.
fn list<'a>(value: Option<&'a Value>, path: &str, field: &str) -> Checked<&'a [Value]> {
    match value {
        None | Some(Value::Null) => Validation::success(&[][..]),
        Some(Value::Array(items)) => Validation::success(items.as_slice()),
        Some(_) => Validation::fail(PayloadIssue::NotAList {
            path: format!("{path}.{field}"),
        }),
    }
}

fn typed<T: for<'de> Deserialize<'de>>(value: &Value, path: &str, field: &str) -> Checked<T> {
    match T::deserialize(value) {
        Ok(decoded) => Validation::success(decoded),
        Err(e) => Validation::fail(PayloadIssue::InvalidField {
            path: path.to_string(),
            field: field.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Ids are non-negative integers; numeric strings are accepted.
fn id_value(value: &Value, path: &str, field: &str) -> Checked<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match parsed {
        Some(id) => Validation::success(id),
        None => Validation::fail(PayloadIssue::InvalidField {
            path: path.to_string(),
            field: field.to_string(),
            reason: format!("expected a non-negative integer, got {value}"),
        }),
    }
}

/// Text fields may carry numbers (the server sends state ids as text).
fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Finite numbers only; `"NaN"` and `"inf"` strings are rejected.
fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    n.filter(|n: &f64| n.is_finite())
}

fn ops(items: &[Value], path: &str) -> Checked<Vec<DomOp>> {
    let checks: Vec<Checked<DomOp>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| op(item, &format!("{path}[{i}]")))
        .collect();
    Validation::all_vec(checks)
}

fn op(value: &Value, path: &str) -> Checked<DomOp> {
    let mut issues = Vec::new();
    let Some(obj) = object(value, path).into_option(&mut issues) else {
        return fail_all(issues);
    };
    let name = required(obj, path, "do").into_option(&mut issues).map(text_value);
    let select = required(obj, path, "select")
        .into_option(&mut issues)
        .map(text_value);
    let (Some(name), Some(select)) = (name, select) else {
        return fail_all(issues);
    };

    let text = |field: &'static str| required(obj, path, field).map(text_value);
    match name.as_str() {
        "settext" => text("text").map(|text| DomOp::SetText { select, text }),
        "sethtml" => text("html").map(|html| DomOp::SetHtml { select, html }),
        "clear" => Validation::success(DomOp::Clear { select }),
        "setlist" => list(obj.get("items"), path, "items")
            .map(|items| items.iter().map(text_value).collect::<Vec<_>>())
            .map(|items| DomOp::SetList { select, items }),
        "dropclass" => text("class").map(|class| DomOp::DropClass { select, class }),
        "addclass" => text("class").map(|class| DomOp::AddClass { select, class }),
        other => Validation::fail(PayloadIssue::UnknownOp {
            path: path.to_string(),
            op: other.to_string(),
        }),
    }
}

fn mode_blocks(blocks: &[Value], path: &str) -> Checked<Vec<Mode>> {
    let checks: Vec<Checked<Vec<Mode>>> = blocks
        .iter()
        .enumerate()
        .map(|(i, block)| mode_block(block, &format!("{path}[{i}]")))
        .collect();
    Validation::all_vec(checks).map(|blocks| blocks.into_iter().flatten().collect())
}

fn mode_block(value: &Value, path: &str) -> Checked<Vec<Mode>> {
    let mut issues = Vec::new();
    let Some(obj) = object(value, path).into_option(&mut issues) else {
        return fail_all(issues);
    };
    let select = obj.get("select").map(text_value).unwrap_or_default();
    let Some(items) = list(obj.get("items"), path, "items").into_option(&mut issues) else {
        return fail_all(issues);
    };

    let checks: Vec<Checked<Mode>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| mode_item(item, &format!("{path}.items[{i}]"), &select))
        .collect();
    Validation::all_vec(checks)
}

fn mode_item(value: &Value, path: &str, select: &str) -> Checked<Mode> {
    let mut issues = Vec::new();
    let Some(obj) = object(value, path).into_option(&mut issues) else {
        return fail_all(issues);
    };
    let state = required(obj, path, "state")
        .and_then_check(|v| id_value(v, path, "state"))
        .into_option(&mut issues);
    let mode = required(obj, path, "mode")
        .and_then_check(|v| id_value(v, path, "mode"))
        .into_option(&mut issues);
    let groups = match obj.get("groups") {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(v) => typed::<Vec<String>>(v, path, "groups").into_option(&mut issues),
    };
    let action = obj
        .get("html")
        .or_else(|| obj.get("action"))
        .map(text_value)
        .unwrap_or_default();

    match (state, mode, groups) {
        (Some(state), Some(mode), Some(groups)) => Validation::success(Mode {
            action,
            state,
            mode,
            groups,
            select: select.to_string(),
        }),
        _ => fail_all(issues),
    }
}

fn variables(value: Option<&Value>, path: &str) -> Checked<BTreeMap<String, f64>> {
    let obj = match value {
        None | Some(Value::Null) => return Validation::success(BTreeMap::new()),
        Some(Value::Object(obj)) => obj,
        Some(_) => {
            return Validation::fail(PayloadIssue::NotAnObject {
                path: format!("{path}.variables"),
            })
        }
    };

    let checks: Vec<Checked<(String, f64)>> = obj
        .iter()
        .map(|(name, v)| match number_value(v) {
            Some(n) => Validation::success((name.clone(), n)),
            None => Validation::fail(PayloadIssue::InvalidField {
                path: format!("{path}.variables"),
                field: name.clone(),
                reason: format!("expected a number, got {v}"),
            }),
        })
        .collect();
    Validation::all_vec(checks).map(|pairs| pairs.into_iter().collect())
}
