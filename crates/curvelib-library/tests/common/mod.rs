//! In-memory host used by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use curvelib_library::{Host, HostError};
use curvelib_nurbs::{CurveForm, CurveSource, NurbsCurveData, Point3};

#[derive(Debug, Clone)]
pub enum Kind {
    Container,
    Curve(NurbsCurveData),
    Mesh,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<usize>,
    pub kind: Kind,
}

#[derive(Debug, Default)]
pub struct MockHost {
    pub nodes: Vec<Option<Node>>,
    pub selection: Vec<usize>,
    /// Shape names whose `set_curve` call fails.
    pub reject_curves: HashSet<String>,
    /// Refuse to create any curve shape.
    pub refuse_shapes: bool,
}

impl MockHost {
    pub fn add(&mut self, name: &str, parent: Option<usize>, kind: Kind) -> usize {
        self.nodes.push(Some(Node {
            name: name.to_string(),
            parent,
            kind,
        }));
        self.nodes.len() - 1
    }

    /// Add a container with one curve child and return the container.
    pub fn add_curve_object(&mut self, name: &str, curve: NurbsCurveData) -> usize {
        let obj = self.add(name, None, Kind::Container);
        self.add(&format!("{name}Shape"), Some(obj), Kind::Curve(curve));
        obj
    }

    pub fn node(&self, handle: usize) -> Option<&Node> {
        self.nodes.get(handle).and_then(Option::as_ref)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.as_ref().is_some_and(|n| n.name == name))
    }

    pub fn children(&self, parent: usize) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.node(i).is_some_and(|n| n.parent == Some(parent)))
            .collect()
    }

    pub fn curve_data(&self, handle: usize) -> Option<&NurbsCurveData> {
        match &self.node(handle)?.kind {
            Kind::Curve(data) => Some(data),
            _ => None,
        }
    }
}

impl Host for MockHost {
    type Handle = usize;

    fn create_container(&mut self, name: &str) -> Result<usize, HostError> {
        Ok(self.add(name, None, Kind::Container))
    }

    fn create_curve_shape(&mut self, parent: &usize, proposed_name: &str) -> Result<usize, HostError> {
        if self.refuse_shapes {
            return Err(HostError::new("shape creation refused"));
        }
        let empty = NurbsCurveData::new(1, 0, CurveForm::Open, Vec::new(), Vec::new());
        Ok(self.add(proposed_name, Some(*parent), Kind::Curve(empty)))
    }

    fn set_curve(&mut self, shape: &usize, curve: &NurbsCurveData) -> Result<(), HostError> {
        let node = self
            .nodes
            .get_mut(*shape)
            .and_then(Option::as_mut)
            .ok_or_else(|| HostError::new("no such node"))?;
        if self.reject_curves.contains(&node.name) {
            return Err(HostError::new(format!("{} rejected the curve", node.name)));
        }
        node.kind = Kind::Curve(curve.clone());
        Ok(())
    }

    fn curve(&self, handle: &usize) -> Option<&dyn CurveSource> {
        match &self.node(*handle)?.kind {
            Kind::Curve(data) => Some(data),
            _ => None,
        }
    }

    fn node_name(&self, handle: &usize) -> String {
        self.node(*handle).map(|n| n.name.clone()).unwrap_or_default()
    }

    fn node_type(&self, handle: &usize) -> String {
        match self.node(*handle).map(|n| &n.kind) {
            Some(Kind::Container) => "transform".into(),
            Some(Kind::Curve(_)) => "nurbsCurve".into(),
            Some(Kind::Mesh) => "mesh".into(),
            None => "missing".into(),
        }
    }

    fn exists(&self, handle: &usize) -> bool {
        self.node(*handle).is_some()
    }

    fn selected_objects(&self) -> Vec<usize> {
        self.selection.clone()
    }

    fn curve_shapes_of(&self, object: &usize) -> Vec<usize> {
        self.children(*object)
            .into_iter()
            .filter(|&c| matches!(self.node(c).map(|n| &n.kind), Some(Kind::Curve(_))))
            .collect()
    }

    fn delete_node(&mut self, handle: &usize) -> Result<(), HostError> {
        for child in self.children(*handle) {
            self.delete_node(&child)?;
        }
        match self.nodes.get_mut(*handle) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(HostError::new("no such node")),
        }
    }
}

pub fn square() -> NurbsCurveData {
    NurbsCurveData::new(
        1,
        4,
        CurveForm::Open,
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
        vec![
            Point3::new(-1.0, 0.0, -1.0),
            Point3::new(-1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(-1.0, 0.0, -1.0),
        ],
    )
}

pub fn circle() -> NurbsCurveData {
    let ring = [
        Point3::new(0.78, 0.0, -0.78),
        Point3::new(0.0, 0.0, -1.1),
        Point3::new(-0.78, 0.0, -0.78),
        Point3::new(-1.1, 0.0, 0.0),
        Point3::new(-0.78, 0.0, 0.78),
        Point3::new(0.0, 0.0, 1.1),
        Point3::new(0.78, 0.0, 0.78),
        Point3::new(1.1, 0.0, 0.0),
    ];
    let mut cvs = ring.to_vec();
    cvs.extend_from_slice(&ring[..3]);
    NurbsCurveData::new(
        3,
        8,
        CurveForm::Periodic,
        (-2..=10).map(|k| k as f64).collect(),
        cvs,
    )
}
