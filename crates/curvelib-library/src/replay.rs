//! Rebuild curve shapes from stored commands.
//!
//! Each command is parsed into a [`CurveRecord`](curvelib_codec::CurveRecord)
//! and applied to a freshly created curve shape through [`Host::set_curve`].
//! Nothing is executed as script.

use curvelib_codec::decode_checked;

use crate::error::LibraryError;
use crate::host::Host;

/// Outcome of replaying one shape's commands into one container.
#[derive(Debug)]
pub struct ReplayReport<T> {
    /// Curve shapes created, in command order.
    pub created: Vec<T>,
    /// One entry per command that failed.
    pub failures: Vec<LibraryError>,
}

impl<T> ReplayReport<T> {
    /// Whether every command produced a curve.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Name proposed for the `index`-th (1-based) curve shape under `container`.
pub fn shape_name(container: &str, index: usize) -> String {
    format!("{container}Shape{index}")
}

/// Replay `commands` under `container`.
///
/// A command that does not parse, or that the host refuses, leaves no node
/// behind: its shape is deleted and the failure recorded, and the remaining
/// commands still run. If the host cannot create a shape node at all, the rest
/// of this container's commands are skipped.
pub fn replay<H: Host>(
    host: &mut H,
    commands: &[String],
    container: &H::Handle,
) -> ReplayReport<H::Handle> {
    let container_name = host.node_name(container);
    let mut report = ReplayReport {
        created: Vec::with_capacity(commands.len()),
        failures: Vec::new(),
    };

    for (i, command) in commands.iter().enumerate() {
        let index = i + 1;
        let proposed = shape_name(&container_name, index);
        let shape = match host.create_curve_shape(container, &proposed) {
            Ok(shape) => shape,
            Err(e) => {
                tracing::warn!(container = %container_name, index, "curve shape creation failed: {e}");
                report.failures.push(LibraryError::CurveConstruction {
                    index,
                    command: command.clone(),
                    reason: format!("could not create curve shape '{proposed}': {e}"),
                });
                break;
            }
        };

        let applied = decode_checked(command)
            .map_err(|e| e.to_string())
            .and_then(|record| {
                host.set_curve(&shape, &record.curve)
                    .map_err(|e| e.to_string())
            });

        match applied {
            Ok(()) => {
                tracing::debug!(shape = %proposed, index, "replayed curve");
                report.created.push(shape);
            }
            Err(reason) => {
                tracing::warn!(shape = %proposed, index, "bad command: {command}");
                if let Err(e) = host.delete_node(&shape) {
                    tracing::warn!(shape = %proposed, "could not remove partial curve: {e}");
                }
                report.failures.push(LibraryError::CurveConstruction {
                    index,
                    command: command.clone(),
                    reason,
                });
            }
        }
    }

    report
}
