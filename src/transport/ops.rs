//! Display update operations sent by the simulation server.

use serde::{Deserialize, Serialize};

/// One update of a display element, addressed by a CSS selector.
///
/// The server describes every state as a list of these; the set is closed
/// and dispatched with a plain `match`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "do", rename_all = "lowercase")]
pub enum DomOp {
    /// Replace the element content with plain text
    SetText { select: String, text: String },
    /// Replace the element content with markup
    SetHtml { select: String, html: String },
    /// Empty the element
    Clear { select: String },
    /// Replace the element content with a list of items
    SetList { select: String, items: Vec<String> },
    /// Remove a CSS class from the element
    DropClass { select: String, class: String },
    /// Add a CSS class to the element
    AddClass { select: String, class: String },
}

impl DomOp {
    /// Selector of the element this operation targets.
    pub fn select(&self) -> &str {
        match self {
            Self::SetText { select, .. }
            | Self::SetHtml { select, .. }
            | Self::Clear { select }
            | Self::SetList { select, .. }
            | Self::DropClass { select, .. }
            | Self::AddClass { select, .. } => select,
        }
    }

    /// Wire name of the operation (the `do` field).
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetText { .. } => "settext",
            Self::SetHtml { .. } => "sethtml",
            Self::Clear { .. } => "clear",
            Self::SetList { .. } => "setlist",
            Self::DropClass { .. } => "dropclass",
            Self::AddClass { .. } => "addclass",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_do_tag() {
        let op = DomOp::SetText {
            select: "#state".to_string(),
            text: "3".to_string(),
        };
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value, json!({"do": "settext", "select": "#state", "text": "3"}));
    }

    #[test]
    fn deserializes_every_operation() {
        let ops: Vec<DomOp> = serde_json::from_value(json!([
            {"do": "settext", "select": "#a", "text": "x"},
            {"do": "sethtml", "select": "#b", "html": "<b>x</b>"},
            {"do": "clear", "select": "#c"},
            {"do": "setlist", "select": "#d", "items": ["p = 1", "q = 2"]},
            {"do": "dropclass", "select": "#e", "class": "hot"},
            {"do": "addclass", "select": "#f", "class": "hot"},
        ]))
        .unwrap();

        let names: Vec<&str> = ops.iter().map(DomOp::name).collect();
        assert_eq!(
            names,
            vec!["settext", "sethtml", "clear", "setlist", "dropclass", "addclass"]
        );
        let selects: Vec<&str> = ops.iter().map(DomOp::select).collect();
        assert_eq!(selects, vec!["#a", "#b", "#c", "#d", "#e", "#f"]);
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let result: Result<DomOp, _> =
            serde_json::from_value(json!({"do": "explode", "select": "#a"}));
        assert!(result.is_err());
    }
}
