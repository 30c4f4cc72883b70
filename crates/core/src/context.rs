//! Design context - a small, read-only snapshot of the CAD session.
//!
//! The host captures this (document, workspace, selection, design counts and
//! an optional viewport screenshot) and pushes it to the palette. Every field
//! is optional and unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    #[serde(default)]
    pub count: u64,
    /// Object type -> number selected.
    #[serde(default)]
    pub types: BTreeMap<String, u64>,
    #[serde(default)]
    pub items: Vec<SelectedItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bodies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sketches: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Screenshot>,
}

impl DesignContext {
    /// Lenient conversion: fields that fail to parse are dropped one by one
    /// instead of discarding the whole context.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        fn field<T: serde::de::DeserializeOwned>(
            obj: &serde_json::Map<String, Value>,
            key: &str,
        ) -> Option<T> {
            obj.get(key)
                .filter(|v| !v.is_null())
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        }
        Self {
            document: field(obj, "document"),
            workspace: field(obj, "workspace"),
            selection: field(obj, "selection"),
            design: field(obj, "design"),
            screenshot: field(obj, "screenshot"),
        }
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref()?.name.as_deref()
    }

    pub fn workspace_name(&self) -> Option<&str> {
        self.workspace.as_ref()?.name.as_deref()
    }

    pub fn screenshot_base64(&self) -> Option<&str> {
        self.screenshot
            .as_ref()?
            .base64
            .as_deref()
            .filter(|b| !b.is_empty())
    }

    /// True when none of the fields the palette knows how to show are set.
    pub fn is_empty(&self) -> bool {
        self.document_name().is_none()
            && self.workspace_name().is_none()
            && self.selection.is_none()
            && self.screenshot_base64().is_none()
    }

    /// One-line description for the context entry in the log.
    pub fn summary_line(&self) -> Option<String> {
        let mut parts = Vec::new();
        match (self.workspace_name(), self.document_name()) {
            (Some(ws), Some(doc)) => parts.push(format!("Working in {ws} on {doc}.")),
            (Some(ws), None) => parts.push(format!("Working in {ws}.")),
            (None, Some(doc)) => parts.push(format!("Working on {doc}.")),
            (None, None) => {}
        }
        if let Some(selection) = &self.selection {
            parts.push(summarise_selection(selection));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// Human summary of what is selected, e.g.
/// `You have 3 item(s) selected. Types: 1× BRepEdge, 2× BRepFace`.
pub fn summarise_selection(selection: &SelectionSummary) -> String {
    if selection.count == 0 {
        return "You don't have anything selected yet.".to_string();
    }
    let mut out = format!("You have {} item(s) selected.", selection.count);
    if !selection.types.is_empty() {
        let bits: Vec<String> = selection
            .types
            .iter()
            .map(|(kind, n)| {
                let short = kind.rsplit("::").next().unwrap_or(kind);
                format!("{n}× {short}")
            })
            .collect();
        out.push_str(" Types: ");
        out.push_str(&bits.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_full() {
        let value = json!({
            "document": {"name": "Bracket v3"},
            "workspace": {"id": "FusionSolidEnvironment", "name": "Design"},
            "selection": {
                "count": 3,
                "types": {"adsk::fusion::BRepFace": 2, "adsk::fusion::BRepEdge": 1},
                "items": [{"objectType": "adsk::fusion::BRepFace", "name": null}]
            },
            "design": {"rootComponent": "Bracket", "bodies": 1, "sketches": 2},
            "screenshot": {"path": "/tmp/viewport.png", "base64": "iVBORw0KGgo="}
        });
        let ctx = DesignContext::from_value(&value);
        assert_eq!(ctx.document_name(), Some("Bracket v3"));
        assert_eq!(ctx.workspace_name(), Some("Design"));
        assert_eq!(ctx.selection.as_ref().unwrap().count, 3);
        assert_eq!(ctx.design.as_ref().unwrap().sketches, Some(2));
        assert_eq!(ctx.screenshot_base64(), Some("iVBORw0KGgo="));
        assert_eq!(
            ctx.summary_line().unwrap(),
            "Working in Design on Bracket v3. You have 3 item(s) selected. Types: 1× BRepEdge, 2× BRepFace"
        );
    }

    #[test]
    fn test_from_value_tolerates_bad_fields() {
        let value = json!({
            "document": "not an object",
            "workspace": {"name": "Design"},
            "extra": [1, 2, 3]
        });
        let ctx = DesignContext::from_value(&value);
        assert!(ctx.document.is_none());
        assert_eq!(ctx.workspace_name(), Some("Design"));
    }

    #[test]
    fn test_from_value_non_object() {
        assert!(DesignContext::from_value(&json!([1, 2])).is_empty());
        assert!(DesignContext::from_value(&json!("text")).is_empty());
    }

    #[test]
    fn test_empty_selection_summary() {
        let sel = SelectionSummary::default();
        assert_eq!(summarise_selection(&sel), "You don't have anything selected yet.");
    }
}
