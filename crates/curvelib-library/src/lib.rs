#![warn(missing_docs)]

//! File-backed library of reusable NURBS curve shapes.
//!
//! A shape is a named `.crv` file holding one curve command per line (see
//! `curvelib-codec`). [`ShapeLibrary`] does the file work; [`Session`] wires
//! it to a [`Host`] scene and an [`Interaction`] collaborator and turns
//! failures into user warnings.
//!
//! # Example
//!
//! ```no_run
//! use curvelib_library::{LibraryConfig, ShapeLibrary};
//!
//! let config = LibraryConfig::load(None).unwrap();
//! let library = ShapeLibrary::from_config(&config).unwrap();
//! for name in library.list_shapes().unwrap() {
//!     println!("{name}");
//! }
//! ```

mod config;
mod error;
mod host;
mod replay;
mod session;
mod store;

pub use config::{default_prefs_root, LibraryConfig, CONFIG_FILE, PREFS_ENV};
pub use error::{HostError, LibraryError};
pub use host::{curves_of, Host, Interaction, ScriptedInteraction};
pub use replay::{replay, shape_name, ReplayReport};
pub use session::{Session, PREVIEW_NAME};
pub use store::{validate_name, ShapeLibrary, SHAPE_EXTENSION};
