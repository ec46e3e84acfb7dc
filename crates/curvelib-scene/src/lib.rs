#![warn(missing_docs)]

//! JSON scene documents for curvelib.
//!
//! A [`SceneDocument`] is a flat map of transform and curve nodes with parent
//! links and a selection list, stored as pretty-printed JSON. It implements
//! [`curvelib_library::Host`], so the shape library can run headless against
//! a file on disk instead of a live DCC application.
//!
//! ```
//! use curvelib_nurbs::{NurbsCurveData, Point3};
//! use curvelib_scene::SceneDocument;
//!
//! let mut doc = SceneDocument::new();
//! let ctrl = doc.add_transform("ctrl", None).unwrap();
//! let line = NurbsCurveData::polyline(vec![Point3::origin(), Point3::new(0.0, 1.0, 0.0)]);
//! doc.add_curve(ctrl, "ctrlShape", line).unwrap();
//! doc.select_names(&["ctrl"]).unwrap();
//!
//! let json = doc.to_json().unwrap();
//! assert_eq!(SceneDocument::from_json(&json).unwrap(), doc);
//! ```

mod error;
mod host;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use curvelib_nurbs::{CurveForm, NurbsCurveData};
use serde::{Deserialize, Serialize};

pub use error::SceneError;

/// Unique identifier for a node in a scene document.
pub type NodeId = u64;

/// Current document format version.
pub const FORMAT_VERSION: &str = "0.1";

/// What a node is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Grouping node that can own shapes.
    Transform,
    /// NURBS curve shape.
    NurbsCurve {
        /// Curve definition.
        curve: NurbsCurveData,
    },
    /// Any other node type, kept so documents can carry non-curve geometry.
    Other {
        /// Host type name reported for this node.
        type_name: String,
    },
}

impl NodeKind {
    /// Type name as a DCC would report it.
    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Transform => "transform",
            NodeKind::NurbsCurve { .. } => "nurbsCurve",
            NodeKind::Other { type_name } => type_name,
        }
    }
}

/// A node in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Unique identifier.
    pub id: NodeId,
    /// Node name, unique within the document.
    pub name: String,
    /// Parent transform, `None` for roots.
    pub parent: Option<NodeId>,
    /// Node payload.
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// A scene document: the `.json` files the CLI edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Format version string.
    pub version: String,
    /// All nodes, keyed by [`NodeId`].
    pub nodes: HashMap<NodeId, SceneNode>,
    /// Selected objects, in selection order.
    #[serde(default)]
    pub selection: Vec<NodeId>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            nodes: HashMap::new(),
            selection: Vec::new(),
        }
    }
}

impl SceneDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a JSON string and check references.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Read a document from disk.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = fs::read_to_string(path).map_err(|e| SceneError::io(path, e))?;
        let doc = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), nodes = doc.nodes.len(), "loaded scene");
        Ok(doc)
    }

    /// Write the document to disk.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| SceneError::io(path, e))?;
        tracing::debug!(path = %path.display(), nodes = self.nodes.len(), "saved scene");
        Ok(())
    }

    /// Check node keys, parent links and the selection.
    ///
    /// Every node must be stored under its own id, every parent and selection
    /// entry must name an existing node, and no parent chain may loop.
    pub fn validate(&self) -> Result<(), SceneError> {
        for (&key, node) in &self.nodes {
            if key != node.id {
                return Err(SceneError::IdMismatch { key, id: node.id });
            }
            if let Some(parent) = node.parent {
                if !self.nodes.contains_key(&parent) {
                    return Err(SceneError::DanglingReference {
                        node: node.id,
                        target: parent,
                    });
                }
            }
        }
        for &id in &self.selection {
            if !self.nodes.contains_key(&id) {
                return Err(SceneError::DanglingReference { node: 0, target: id });
            }
        }

        // nodes already known to reach a root
        let mut rooted = HashSet::new();
        for &start in self.nodes.keys() {
            let mut chain = HashSet::new();
            let mut current = Some(start);
            while let Some(id) = current {
                if rooted.contains(&id) {
                    break;
                }
                if !chain.insert(id) {
                    return Err(SceneError::ParentCycle(id));
                }
                current = self.nodes.get(&id).and_then(|n| n.parent);
            }
            rooted.extend(chain);
        }
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Node by id.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Id of the node called `name`.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.values().find(|n| n.name == name).map(|n| n.id)
    }

    /// Like [`find`](Self::find) but failing with [`SceneError::UnknownName`].
    pub fn require(&self, name: &str) -> Result<NodeId, SceneError> {
        self.find(name)
            .ok_or_else(|| SceneError::UnknownName(name.to_string()))
    }

    /// Direct children of `id`, in creation order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids: Vec<_> = self
            .nodes
            .values()
            .filter(|n| n.parent == Some(id))
            .map(|n| n.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Parentless nodes, in creation order.
    pub fn roots(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self
            .nodes
            .values()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Curve definition held by `id`.
    pub fn curve(&self, id: NodeId) -> Option<&NurbsCurveData> {
        match &self.nodes.get(&id)?.kind {
            NodeKind::NurbsCurve { curve } => Some(curve),
            _ => None,
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    fn next_id(&self) -> NodeId {
        self.nodes.keys().max().map_or(1, |max| max + 1)
    }

    /// `proposed`, or the first free variant with its trailing number bumped.
    pub fn unique_name(&self, proposed: &str) -> String {
        if self.find(proposed).is_none() {
            return proposed.to_string();
        }
        let base = proposed.trim_end_matches(|c: char| c.is_ascii_digit());
        let mut n: u64 = proposed[base.len()..].parse().unwrap_or(0);
        loop {
            n += 1;
            let candidate = format!("{base}{n}");
            if self.find(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn insert(&mut self, name: &str, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = self.next_id();
        let name = self.unique_name(name);
        self.nodes.insert(
            id,
            SceneNode {
                id,
                name,
                parent,
                kind,
            },
        );
        id
    }

    fn check_transform(&self, id: NodeId) -> Result<(), SceneError> {
        match self.nodes.get(&id) {
            Some(SceneNode {
                kind: NodeKind::Transform,
                ..
            }) => Ok(()),
            Some(_) => Err(SceneError::NotATransform(id)),
            None => Err(SceneError::UnknownNode(id)),
        }
    }

    /// Add a transform. Name clashes are resolved with [`unique_name`](Self::unique_name).
    pub fn add_transform(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            self.check_transform(parent)?;
        }
        Ok(self.insert(name, parent, NodeKind::Transform))
    }

    /// Add a curve shape under a transform.
    pub fn add_curve(
        &mut self,
        parent: NodeId,
        name: &str,
        curve: NurbsCurveData,
    ) -> Result<NodeId, SceneError> {
        self.check_transform(parent)?;
        Ok(self.insert(name, Some(parent), NodeKind::NurbsCurve { curve }))
    }

    /// Add a non-curve node of the given type.
    pub fn add_other(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        type_name: &str,
    ) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            self.check_transform(parent)?;
        }
        Ok(self.insert(
            name,
            parent,
            NodeKind::Other {
                type_name: type_name.to_string(),
            },
        ))
    }

    /// Replace the curve held by a curve shape.
    pub fn set_curve(&mut self, id: NodeId, curve: NurbsCurveData) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::NurbsCurve { curve: slot } => {
                *slot = curve;
                Ok(())
            }
            _ => Err(SceneError::NotACurve(id)),
        }
    }

    /// Remove a node and everything under it, dropping it from the selection.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::UnknownNode(id));
        }
        let mut doomed = HashSet::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if doomed.insert(next) {
                pending.extend(self.children(next));
            }
        }
        self.nodes.retain(|nid, _| !doomed.contains(nid));
        self.selection.retain(|s| !doomed.contains(s));
        Ok(())
    }

    /// Replace the selection with the named nodes.
    pub fn select_names(&mut self, names: &[&str]) -> Result<(), SceneError> {
        let ids = names
            .iter()
            .map(|name| self.require(name))
            .collect::<Result<Vec<_>, _>>()?;
        self.selection = ids;
        Ok(())
    }
}

/// Placeholder curve given to freshly created shapes until a definition is set.
pub(crate) fn empty_curve() -> NurbsCurveData {
    NurbsCurveData::new(1, 0, CurveForm::Open, Vec::new(), Vec::new())
}
