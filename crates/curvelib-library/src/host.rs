//! Collaborator interfaces the library needs from its host application.
//!
//! The host owns the scene graph. curvelib only reads curves from it, creates
//! containers and curve shapes in it, and deletes the nodes it created or was
//! asked to replace. User interaction (prompts, confirmations, warnings) is a
//! separate collaborator so headless hosts can answer programmatically.

use std::fmt::Debug;

use curvelib_codec::{CodecError, CURVE_TYPE};
use curvelib_nurbs::{CurveSource, NurbsCurveData};

use crate::error::HostError;

/// Scene operations consumed by the library.
pub trait Host {
    /// Opaque node handle.
    type Handle: Clone + Debug + PartialEq;

    /// Create an empty container (transform) node named `name`.
    fn create_container(&mut self, name: &str) -> Result<Self::Handle, HostError>;

    /// Create an empty curve shape under `parent`.
    ///
    /// The host may pick a different name if `proposed_name` is taken.
    fn create_curve_shape(
        &mut self,
        parent: &Self::Handle,
        proposed_name: &str,
    ) -> Result<Self::Handle, HostError>;

    /// Assign a full curve definition to a curve shape.
    fn set_curve(&mut self, shape: &Self::Handle, curve: &NurbsCurveData) -> Result<(), HostError>;

    /// Read access to a curve shape, or `None` if the node is not a NURBS curve.
    fn curve(&self, handle: &Self::Handle) -> Option<&dyn CurveSource>;

    /// Name of a node.
    fn node_name(&self, handle: &Self::Handle) -> String;

    /// Type name of a node, used in error messages.
    fn node_type(&self, handle: &Self::Handle) -> String;

    /// Whether the node still exists.
    fn exists(&self, handle: &Self::Handle) -> bool;

    /// Currently selected objects, in selection order.
    fn selected_objects(&self) -> Vec<Self::Handle>;

    /// Curve shapes parented directly under `object`, in child order.
    fn curve_shapes_of(&self, object: &Self::Handle) -> Vec<Self::Handle>;

    /// Delete a node and its children.
    fn delete_node(&mut self, handle: &Self::Handle) -> Result<(), HostError>;
}

/// Interactive user collaborator.
pub trait Interaction {
    /// Ask for a line of text. `None` means the user cancelled.
    fn prompt_text(&mut self, title: &str, message: &str, default: &str) -> Option<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    /// Non-blocking notification.
    fn warn(&mut self, message: &str);
}

/// Look up every handle as a curve, failing with `TypeMismatch` on the first
/// node that is not a NURBS curve.
pub fn curves_of<'h, H: Host>(
    host: &'h H,
    handles: &[H::Handle],
) -> Result<Vec<&'h dyn CurveSource>, CodecError> {
    handles
        .iter()
        .map(|handle| {
            host.curve(handle)
                .ok_or_else(|| CodecError::type_mismatch(CURVE_TYPE, host.node_type(handle)))
        })
        .collect()
}

/// Interaction that answers every prompt from fixed values.
///
/// Useful for scripted and batch use. Warnings are collected for inspection.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInteraction {
    /// Queued answers to text prompts, consumed front to back. Empty = cancel.
    pub answers: Vec<Option<String>>,
    /// Answer to every confirmation.
    pub confirm_all: bool,
    /// Warnings received so far.
    pub warnings: Vec<String>,
}

impl ScriptedInteraction {
    /// Interaction that confirms everything and has no prompt answers.
    pub fn confirming() -> Self {
        Self {
            confirm_all: true,
            ..Self::default()
        }
    }

    /// Queue an answer for the next prompt.
    pub fn answer(mut self, text: Option<&str>) -> Self {
        self.answers.push(text.map(str::to_string));
        self
    }
}

impl Interaction for ScriptedInteraction {
    fn prompt_text(&mut self, _title: &str, _message: &str, _default: &str) -> Option<String> {
        if self.answers.is_empty() {
            None
        } else {
            self.answers.remove(0)
        }
    }

    fn confirm(&mut self, _title: &str, _message: &str) -> bool {
        self.confirm_all
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}
