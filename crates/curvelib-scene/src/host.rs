//! [`Host`] implementation over a scene document.

use curvelib_library::{Host, HostError};
use curvelib_nurbs::{CurveSource, NurbsCurveData};

use crate::{empty_curve, NodeId, SceneDocument, SceneError};

impl From<SceneError> for HostError {
    fn from(e: SceneError) -> Self {
        HostError::new(e.to_string())
    }
}

impl Host for SceneDocument {
    type Handle = NodeId;

    fn create_container(&mut self, name: &str) -> Result<NodeId, HostError> {
        Ok(self.add_transform(name, None)?)
    }

    fn create_curve_shape(&mut self, parent: &NodeId, proposed_name: &str) -> Result<NodeId, HostError> {
        Ok(self.add_curve(*parent, proposed_name, empty_curve())?)
    }

    fn set_curve(&mut self, shape: &NodeId, curve: &NurbsCurveData) -> Result<(), HostError> {
        Ok(SceneDocument::set_curve(self, *shape, curve.clone())?)
    }

    fn curve(&self, handle: &NodeId) -> Option<&dyn CurveSource> {
        SceneDocument::curve(self, *handle).map(|c| c as &dyn CurveSource)
    }

    fn node_name(&self, handle: &NodeId) -> String {
        self.get(*handle).map(|n| n.name.clone()).unwrap_or_default()
    }

    fn node_type(&self, handle: &NodeId) -> String {
        self.get(*handle)
            .map_or("unknown", |n| n.kind.type_name())
            .to_string()
    }

    fn exists(&self, handle: &NodeId) -> bool {
        self.nodes.contains_key(handle)
    }

    fn selected_objects(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn curve_shapes_of(&self, object: &NodeId) -> Vec<NodeId> {
        self.children(*object)
            .into_iter()
            .filter(|&c| SceneDocument::curve(self, c).is_some())
            .collect()
    }

    fn delete_node(&mut self, handle: &NodeId) -> Result<(), HostError> {
        Ok(self.remove(*handle)?)
    }
}
