//! Session: the operation boundary between the user and the library.
//!
//! A [`Session`] owns the host, the interaction collaborator and the library
//! for as long as the tool is open. Its operations never fail for
//! environmental reasons: missing shapes, I/O errors and broken commands are
//! reported through [`Interaction::warn`] and turned into `None`/`false`/empty
//! results. Only a non-curve handed in for saving is returned as an error.

use std::path::PathBuf;

use curvelib_codec::{serialize_curves, CodecError, CodecOptions};

use crate::config::LibraryConfig;
use crate::error::LibraryError;
use crate::host::{curves_of, Host, Interaction};
use crate::replay::{replay, ReplayReport};
use crate::store::ShapeLibrary;

/// Name of the preview container.
pub const PREVIEW_NAME: &str = "curvelib_PREVIEW_CRV";

/// An open shape-library session.
pub struct Session<H: Host, I: Interaction> {
    host: H,
    ui: I,
    library: ShapeLibrary,
    options: CodecOptions,
    default_curve_name: String,
    preview: Option<H::Handle>,
}

impl<H: Host, I: Interaction> Session<H, I> {
    /// Start a session over `library`.
    pub fn new(host: H, ui: I, library: ShapeLibrary, config: &LibraryConfig) -> Self {
        Self {
            host,
            ui,
            library,
            options: config.codec_options(),
            default_curve_name: config.default_curve_name.clone(),
            preview: None,
        }
    }

    /// Tear down the session, removing the preview, and hand back the collaborators.
    pub fn close(mut self) -> (H, I) {
        self.clear_preview();
        (self.host, self.ui)
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The interaction collaborator.
    pub fn ui(&self) -> &I {
        &self.ui
    }

    /// Mutable access to the interaction collaborator.
    pub fn ui_mut(&mut self) -> &mut I {
        &mut self.ui
    }

    /// The backing library.
    pub fn library(&self) -> &ShapeLibrary {
        &self.library
    }

    /// Current preview container, if any.
    pub fn preview_handle(&self) -> Option<&H::Handle> {
        self.preview.as_ref()
    }

    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
        self.ui.warn(message);
    }

    fn report(&mut self, err: &LibraryError) {
        self.warn(&err.to_string());
    }

    /// Prompt until the user gives a non-empty name or cancels.
    fn prompt_name(&mut self, title: &str, message: &str, default: &str) -> Option<String> {
        loop {
            let answer = self.ui.prompt_text(title, message, default)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Some(answer.to_string());
            }
        }
    }

    // =========================================================================
    // Library queries
    // =========================================================================

    /// Shape names, sorted. Empty (with a warning) if the directory is unreadable.
    pub fn list_shapes(&mut self) -> Vec<String> {
        match self.library.list_shapes() {
            Ok(names) => names.into_iter().collect(),
            Err(e) => {
                self.report(&e);
                Vec::new()
            }
        }
    }

    fn read_commands(&mut self, shape: &str) -> Option<Vec<String>> {
        match self.library.read(shape) {
            Ok(commands) => Some(commands),
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    // =========================================================================
    // Capturing curves
    // =========================================================================

    /// Curve shapes of the first selected object that has any.
    pub fn selected_curves(&self) -> Option<Vec<H::Handle>> {
        self.host
            .selected_objects()
            .iter()
            .map(|obj| {
                self.host
                    .curve_shapes_of(obj)
                    .into_iter()
                    .filter(|s| self.host.curve(s).is_some())
                    .collect::<Vec<_>>()
            })
            .find(|shapes| !shapes.is_empty())
    }

    /// Encode curve shapes. Fails with `TypeMismatch` if any handle is not a curve.
    pub fn serialize(&self, curves: &[H::Handle]) -> Result<Vec<String>, CodecError> {
        let sources = curves_of(&self.host, curves)?;
        serialize_curves(&sources, &self.options)
    }

    fn curves_or_selection(&mut self, curves: Option<&[H::Handle]>) -> Option<Vec<H::Handle>> {
        let found = match curves {
            Some(curves) if !curves.is_empty() => Some(curves.to_vec()),
            Some(_) => None,
            None => self.selected_curves(),
        };
        if found.is_none() {
            self.warn("Select a nurbsCurve and try again.");
        }
        found
    }

    /// Save curves (or the selection) as a new shape.
    ///
    /// Prompts for a name when `name` is `None`. Returns the written path, or
    /// `None` on cancellation or a reported failure.
    pub fn save_curve(
        &mut self,
        curves: Option<&[H::Handle]>,
        name: Option<&str>,
    ) -> Result<Option<PathBuf>, CodecError> {
        let Some(curves) = self.curves_or_selection(curves) else {
            return Ok(None);
        };
        let payload = self.serialize(&curves)?;

        let name = match name {
            Some(name) => Some(name.to_string()),
            None => self.prompt_name("Save Curve", "Enter a name for the shape file", ""),
        };

        match self.library.save(name.as_deref(), &payload) {
            Ok(path) => Ok(path),
            Err(e) => {
                self.warn(&format!(
                    "Encountered an error trying to save shape '{}': {e}",
                    name.unwrap_or_default()
                ));
                Ok(None)
            }
        }
    }

    /// Replace an existing shape's curves with `curves` (or the selection).
    pub fn overwrite_curve(
        &mut self,
        shape: &str,
        curves: Option<&[H::Handle]>,
    ) -> Result<Option<PathBuf>, CodecError> {
        let Some(curves) = self.curves_or_selection(curves) else {
            return Ok(None);
        };
        if let Err(e) = self.library.resolve_path(shape, false) {
            self.report(&e);
            return Ok(None);
        }
        let payload = self.serialize(&curves)?;

        match self.library.overwrite(shape, &payload) {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                self.warn(&format!(
                    "Encountered an error trying to overwrite shape '{shape}': {e}"
                ));
                Ok(None)
            }
        }
    }

    /// Delete a shape after confirmation. `true` only if the file was removed.
    pub fn delete_curve(&mut self, shape: &str) -> bool {
        match self.library.delete(shape, &mut self.ui) {
            Ok(removed) => removed,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    // =========================================================================
    // Rebuilding curves
    // =========================================================================

    fn replay_into(&mut self, shape: &str, commands: &[String], container: &H::Handle) -> Vec<H::Handle> {
        let ReplayReport { created, failures } = replay(&mut self.host, commands, container);
        for failure in &failures {
            self.warn(&format!(
                "An error occurred creating a curve of shape '{shape}': {failure}"
            ));
        }
        created
    }

    /// Create a new container holding the curves of `shape`.
    ///
    /// Prompts for the container name when `name` is `None`.
    pub fn create_curve(&mut self, shape: &str, name: Option<&str>) -> Option<H::Handle> {
        let commands = self.read_commands(shape)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let default = self.default_curve_name.clone();
                self.prompt_name("Curve Name", "Enter a name for the new curve", &default)?
            }
        };

        let container = match self.host.create_container(&name) {
            Ok(container) => container,
            Err(e) => {
                self.warn(&format!("Could not create '{name}': {e}"));
                return None;
            }
        };
        let created = self.replay_into(shape, &commands, &container);
        tracing::info!(shape, container = %name, curves = created.len(), "created curve");
        Some(container)
    }

    /// Add the curves of `shape` to each object (or the selection).
    ///
    /// Returns every curve shape created.
    pub fn append_curve(&mut self, shape: &str, objects: Option<&[H::Handle]>) -> Vec<H::Handle> {
        let Some(commands) = self.read_commands(shape) else {
            return Vec::new();
        };
        let objects = objects
            .map(<[H::Handle]>::to_vec)
            .unwrap_or_else(|| self.host.selected_objects());
        if objects.is_empty() {
            self.warn("Select at least one object and try again.");
            return Vec::new();
        }

        let mut created = Vec::new();
        for obj in &objects {
            created.extend(self.replay_into(shape, &commands, obj));
        }
        created
    }

    /// Swap the curve shapes of each object (or the selection) for those of `shape`.
    ///
    /// Only objects that already own curve shapes are touched.
    pub fn replace_curve(&mut self, shape: &str, objects: Option<&[H::Handle]>) -> Vec<H::Handle> {
        let Some(commands) = self.read_commands(shape) else {
            return Vec::new();
        };
        let objects = objects
            .map(<[H::Handle]>::to_vec)
            .unwrap_or_else(|| self.host.selected_objects());

        let targets: Vec<(H::Handle, Vec<H::Handle>)> = objects
            .into_iter()
            .filter_map(|obj| {
                let curves: Vec<_> = self
                    .host
                    .curve_shapes_of(&obj)
                    .into_iter()
                    .filter(|s| self.host.curve(s).is_some())
                    .collect();
                (!curves.is_empty()).then_some((obj, curves))
            })
            .collect();

        if targets.is_empty() {
            self.warn("Select at least one object with nurbsCurve shape nodes and try again.");
            return Vec::new();
        }

        let mut created = Vec::new();
        for (obj, old_curves) in &targets {
            for old in old_curves {
                if let Err(e) = self.host.delete_node(old) {
                    self.warn(&format!("Could not delete old curve shape: {e}"));
                }
            }
            created.extend(self.replay_into(shape, &commands, obj));
        }
        created
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Show `shape` in the preview container, or clear it for `None`.
    pub fn preview(&mut self, shape: Option<&str>) -> Option<H::Handle> {
        let Some(shape) = shape else {
            self.clear_preview();
            return None;
        };

        match self.preview.clone() {
            Some(existing) if self.host.exists(&existing) => {
                let existing_curves = self.host.curve_shapes_of(&existing);
                if existing_curves.is_empty() {
                    // replace_curve skips containers with no curves
                    let Some(commands) = self.read_commands(shape) else {
                        return Some(existing);
                    };
                    self.replay_into(shape, &commands, &existing);
                } else {
                    self.replace_curve(shape, Some(std::slice::from_ref(&existing)));
                }
                Some(existing)
            }
            _ => {
                self.preview = self.create_curve(shape, Some(PREVIEW_NAME));
                self.preview.clone()
            }
        }
    }

    /// Remove the preview container if it exists.
    pub fn clear_preview(&mut self) {
        if let Some(preview) = self.preview.take() {
            if self.host.exists(&preview) {
                if let Err(e) = self.host.delete_node(&preview) {
                    self.warn(&format!("Could not remove preview: {e}"));
                }
            }
        }
    }
}
