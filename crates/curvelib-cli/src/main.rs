//! curvelib CLI - NURBS curve shape library
//!
//! Saves curves from a JSON scene into the shape library and rebuilds them,
//! with prompts and confirmations on the terminal.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use curvelib_library::{Interaction, LibraryConfig, Session, ShapeLibrary};
use curvelib_scene::SceneDocument;

mod prompt;

use prompt::TerminalInteraction;

#[derive(Parser)]
#[command(name = "curvelib")]
#[command(about = "Save and rebuild NURBS curve shapes", long_about = None)]
struct Cli {
    /// Preferences root (default: $CURVELIB_PREFS or the user config dir)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the shapes in the library
    List,
    /// Print the stored commands of a shape
    Show {
        /// Shape name
        shape: String,
    },
    /// Save the curves of a scene object as a new shape
    Save {
        /// Scene document (.json)
        scene: PathBuf,
        /// Shape name (prompted when omitted)
        shape: Option<String>,
        /// Object to take curves from (default: the scene selection)
        #[arg(short, long)]
        object: Option<String>,
    },
    /// Replace a shape with the curves of a scene object
    Overwrite {
        /// Scene document (.json)
        scene: PathBuf,
        /// Existing shape name
        shape: String,
        /// Object to take curves from (default: the scene selection)
        #[arg(short, long)]
        object: Option<String>,
    },
    /// Delete a shape from the library
    Delete {
        /// Shape name
        shape: String,
    },
    /// Create a new object in a scene from a shape
    Create {
        /// Scene document (.json)
        scene: PathBuf,
        /// Shape name
        shape: String,
        /// Name of the new object (prompted when omitted)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Add a shape's curves to existing scene objects
    Append {
        /// Scene document (.json)
        scene: PathBuf,
        /// Shape name
        shape: String,
        /// Target objects (default: the scene selection)
        objects: Vec<String>,
    },
    /// Swap the curves of scene objects for a shape's curves
    Replace {
        /// Scene document (.json)
        scene: PathBuf,
        /// Shape name
        shape: String,
        /// Target objects (default: the scene selection)
        objects: Vec<String>,
    },
    /// Print points evaluated along each curve of a shape
    Sample {
        /// Shape name
        shape: String,
        /// Points per curve
        #[arg(short, long, default_value_t = 16)]
        count: usize,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = LibraryConfig::load(cli.prefs.as_deref())?;
    let library = ShapeLibrary::from_config(&config)?;

    match cli.command {
        Commands::List => {
            for name in library.list_shapes()? {
                println!("{name}");
            }
        }
        Commands::Show { shape } => show_shape(&library, &shape)?,
        Commands::Save {
            scene,
            shape,
            object,
        } => {
            with_scene(&scene, &config, library, cli.yes, |session| {
                let curves = object_curves(session.host(), object.as_deref())?;
                match session.save_curve(curves.as_deref(), shape.as_deref())? {
                    Some(path) => println!("Saved {}", path.display()),
                    None => println!("Nothing saved"),
                }
                Ok(false)
            })?;
        }
        Commands::Overwrite {
            scene,
            shape,
            object,
        } => {
            with_scene(&scene, &config, library, cli.yes, |session| {
                let curves = object_curves(session.host(), object.as_deref())?;
                match session.overwrite_curve(&shape, curves.as_deref())? {
                    Some(path) => println!("Overwrote {}", path.display()),
                    None => println!("Nothing written"),
                }
                Ok(false)
            })?;
        }
        Commands::Delete { shape } => {
            // a missing or undeletable shape is reported, not fatal
            let mut ui = TerminalInteraction::stdio(cli.yes);
            match library.delete(&shape, &mut ui) {
                Ok(true) => println!("Deleted {shape}"),
                Ok(false) => println!("Nothing deleted"),
                Err(e) => {
                    tracing::warn!("{e}");
                    ui.warn(&e.to_string());
                    println!("Nothing deleted");
                }
            }
        }
        Commands::Create { scene, shape, name } => {
            with_scene(&scene, &config, library, cli.yes, |session| {
                let Some(obj) = session.create_curve(&shape, name.as_deref()) else {
                    anyhow::bail!("Could not create a curve from shape '{shape}'");
                };
                println!("Created {}", session.host().get(obj).map_or("?", |n| n.name.as_str()));
                Ok(true)
            })?;
        }
        Commands::Append {
            scene,
            shape,
            objects,
        } => {
            with_scene(&scene, &config, library, cli.yes, |session| {
                let targets = resolve_objects(session.host(), &objects)?;
                let created = session.append_curve(&shape, targets.as_deref());
                println!("Added {} curve shape(s)", created.len());
                Ok(!created.is_empty())
            })?;
        }
        Commands::Replace {
            scene,
            shape,
            objects,
        } => {
            with_scene(&scene, &config, library, cli.yes, |session| {
                let targets = resolve_objects(session.host(), &objects)?;
                let created = session.replace_curve(&shape, targets.as_deref());
                println!("Replaced with {} curve shape(s)", created.len());
                Ok(!created.is_empty())
            })?;
        }
        Commands::Sample { shape, count } => sample_shape(&library, &shape, count)?,
        Commands::Config => print!("{}", config.to_toml_string()?),
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

type CliSession = Session<SceneDocument, TerminalInteraction<std::io::StdinLock<'static>, std::io::Stderr>>;

/// Run `op` in a session over the scene at `path`, saving the scene when `op`
/// reports a change.
fn with_scene(
    path: &Path,
    config: &LibraryConfig,
    library: ShapeLibrary,
    yes: bool,
    op: impl FnOnce(&mut CliSession) -> Result<bool>,
) -> Result<()> {
    let doc = SceneDocument::load(path)
        .with_context(|| format!("Failed to load scene {}", path.display()))?;
    let mut session = Session::new(doc, TerminalInteraction::stdio(yes), library, config);
    let changed = op(&mut session)?;
    let (doc, _) = session.close();
    if changed {
        doc.save(path)?;
        tracing::info!(scene = %path.display(), "scene updated");
    }
    Ok(())
}

/// Curve shapes under `object`, or `None` to use the scene selection.
fn object_curves(doc: &SceneDocument, object: Option<&str>) -> Result<Option<Vec<u64>>> {
    let Some(object) = object else {
        return Ok(None);
    };
    let id = doc.require(object)?;
    // a curve shape named directly is saved as-is
    if doc.curve(id).is_some() {
        return Ok(Some(vec![id]));
    }
    let shapes: Vec<_> = doc
        .children(id)
        .into_iter()
        .filter(|&c| doc.curve(c).is_some())
        .collect();
    if shapes.is_empty() {
        anyhow::bail!("'{object}' has no nurbsCurve shapes");
    }
    Ok(Some(shapes))
}

fn resolve_objects(doc: &SceneDocument, names: &[String]) -> Result<Option<Vec<u64>>> {
    if names.is_empty() {
        return Ok(None);
    }
    let ids = names
        .iter()
        .map(|name| doc.require(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(ids))
}

fn show_shape(library: &ShapeLibrary, shape: &str) -> Result<()> {
    let commands = library.read(shape)?;
    println!("{shape}: {} curve(s)", commands.len());
    for (i, command) in commands.iter().enumerate() {
        match curvelib_codec::decode(command) {
            Ok(record) => {
                let curve = &record.curve;
                println!(
                    "  {}: degree {}, {} spans, {}, {} CVs",
                    i + 1,
                    curve.degree,
                    curve.spans,
                    curve.form,
                    curve.num_cvs()
                );
            }
            Err(e) => println!("  {}: unreadable ({e})", i + 1),
        }
        println!("    {command}");
    }
    Ok(())
}

fn sample_shape(library: &ShapeLibrary, shape: &str, count: usize) -> Result<()> {
    for (i, command) in library.read(shape)?.iter().enumerate() {
        let record = curvelib_codec::decode_checked(command)
            .with_context(|| format!("Curve {} of '{shape}'", i + 1))?;
        let Some(spline) = record.curve.to_bspline() else {
            anyhow::bail!("Curve {} of '{shape}' cannot be evaluated", i + 1);
        };
        println!("# curve {}", i + 1);
        for p in spline.sample(count) {
            println!("{:.6} {:.6} {:.6}", p.x, p.y, p.z);
        }
    }
    Ok(())
}
