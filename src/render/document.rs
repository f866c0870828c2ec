//! Selector-addressed model of the simulator display panels.

use crate::transport::DomOp;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Content of one display element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    #[default]
    Empty,
    Text(String),
    Html(String),
    List(Vec<String>),
}

/// One display element: its content and CSS classes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub content: Content,
    pub classes: BTreeSet<String>,
}

/// Display panels keyed by selector, rebuilt from a state's operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    elements: BTreeMap<String, Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document by applying `ops` in order to an empty one.
    pub fn replay<'a, I>(ops: I) -> Self
    where
        I: IntoIterator<Item = &'a DomOp>,
    {
        let mut document = Self::new();
        for op in ops {
            document.apply(op);
        }
        document
    }

    pub fn apply(&mut self, op: &DomOp) {
        let element = self.elements.entry(op.select().to_string()).or_default();
        match op {
            DomOp::SetText { text, .. } => element.content = Content::Text(text.clone()),
            DomOp::SetHtml { html, .. } => element.content = Content::Html(html.clone()),
            DomOp::Clear { .. } => element.content = Content::Empty,
            DomOp::SetList { items, .. } => element.content = Content::List(items.clone()),
            DomOp::DropClass { class, .. } => {
                element.classes.remove(class);
            }
            DomOp::AddClass { class, .. } => {
                element.classes.insert(class.clone());
            }
        }
    }

    pub fn get(&self, select: &str) -> Option<&Element> {
        self.elements.get(select)
    }

    /// Plain text of an element; markup is stripped and list items joined
    /// with newlines.
    pub fn text(&self, select: &str) -> Option<String> {
        self.get(select).map(|element| match &element.content {
            Content::Empty => String::new(),
            Content::Text(text) => text.clone(),
            Content::Html(html) => strip_markup(html),
            Content::List(items) => items
                .iter()
                .map(|item| strip_markup(item))
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }

    pub fn has_class(&self, select: &str, class: &str) -> bool {
        self.get(select)
            .is_some_and(|element| element.classes.contains(class))
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }
}

/// Drop markup tags and decode the basic entities the server emits.
pub fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
