//! Command-line surface: one subcommand per edit, each a load/apply/save cycle.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sketchkit::{CanvasId, LoadOutcome, MemoryScene, SceneSession, Tool, Workspace};
use sketchkit_scene::{Color, SceneEngine, ToolEffect};

/// Versioned shape documents for a 2D drawing surface
#[derive(Parser, Debug)]
#[command(name = "sketchkit")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config file (TOML or JSON); defaults to the platform config dir
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty drawing and print its id
    New,
    /// Print the stored document of a drawing
    Show {
        canvas: String,
        /// Print the whole document as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply tools in order, then save
    Draw {
        canvas: String,
        #[arg(required = true, value_name = "TOOL")]
        tools: Vec<Tool>,
    },
    /// Delete the shape at a render-order index
    Delete { canvas: String, index: usize },
    /// Recolor the shape at a render-order index
    Recolor {
        canvas: String,
        index: usize,
        color: String,
    },
    /// Replace the text of the text box at a render-order index
    Retext {
        canvas: String,
        index: usize,
        text: String,
    },
}

pub async fn run(command: Command, workspace: &Workspace) -> Result<()> {
    match command {
        Command::New => {
            let canvas_id = workspace.create_canvas().await?;
            println!("{}", canvas_id);
        }
        Command::Show { canvas, json } => {
            let (session, outcome) = workspace.open(CanvasId::new(canvas)).await?;
            report_load(&outcome);
            let document = session.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                let canvas = &document.canvas_properties;
                println!(
                    "{}x{} background {} ({} shapes)",
                    canvas.width,
                    canvas.height,
                    canvas.background_color,
                    document.shape_count()
                );
                for (index, shape) in document.shapes.iter().enumerate() {
                    println!("{:>4}  {}", index, serde_json::to_string(shape)?);
                }
            }
            session.close();
        }
        Command::Draw { canvas, tools } => {
            edit(workspace, canvas, |session, controller| {
                let engine = session.engine();
                let mut engine = engine.lock();
                for tool in &tools {
                    match controller.select_tool(*tool, &mut *engine)? {
                        ToolEffect::Inserted(handle) => println!("{} inserted {}", tool, handle),
                        ToolEffect::Drawing(brush) => {
                            println!("{} brush {} width {}", tool, brush.color, brush.width)
                        }
                        ToolEffect::ModeChanged => {}
                    }
                }
                Ok(())
            })
            .await?;
        }
        Command::Delete { canvas, index } => {
            edit(workspace, canvas, |session, controller| {
                let engine = session.engine();
                let mut engine = engine.lock();
                select_index(&mut *engine, index)?;
                controller
                    .delete_selection(&mut *engine)
                    .context("Nothing was deleted")?;
                Ok(())
            })
            .await?;
        }
        Command::Recolor {
            canvas,
            index,
            color,
        } => {
            let color = Color::parse(&color)?;
            edit(workspace, canvas, |session, controller| {
                let engine = session.engine();
                let mut engine = engine.lock();
                select_index(&mut *engine, index)?;
                if !controller.set_color(color, &mut *engine) {
                    anyhow::bail!("Shape {} was not recolored", index);
                }
                Ok(())
            })
            .await?;
        }
        Command::Retext {
            canvas,
            index,
            text,
        } => {
            edit(workspace, canvas, |session, controller| {
                let engine = session.engine();
                let mut engine = engine.lock();
                select_index(&mut *engine, index)?;
                if !controller.set_selected_text(&text, &mut *engine) {
                    anyhow::bail!("Shape {} is not a text box", index);
                }
                Ok(())
            })
            .await?;
        }
    }
    Ok(())
}

/// Open, apply, save and close
async fn edit<F>(workspace: &Workspace, canvas: String, apply: F) -> Result<()>
where
    F: FnOnce(&SceneSession<MemoryScene>, &mut sketchkit::ToolController) -> Result<()>,
{
    let (session, outcome) = workspace.open(CanvasId::new(canvas)).await?;
    report_load(&outcome);

    let mut controller = workspace.tool_controller()?;
    apply(&session, &mut controller)?;

    let receipt = session.save().await.context("Save failed")?;
    println!(
        "Saved {} ({} shapes) at {}",
        receipt.canvas_id,
        receipt.shape_count,
        receipt.last_modified.to_rfc3339()
    );
    session.close();
    Ok(())
}

fn select_index(engine: &mut MemoryScene, index: usize) -> Result<()> {
    let instances = engine.list_instances();
    let object = instances
        .get(index)
        .with_context(|| format!("No shape at index {} ({} shapes)", index, instances.len()))?;
    engine.set_active_selection(Some(object.handle));
    Ok(())
}

fn report_load(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Restored { skipped, .. } if *skipped > 0 => {
            eprintln!("warning: {} stored shapes could not be restored", skipped)
        }
        LoadOutcome::Legacy { objects } => {
            eprintln!(
                "note: legacy drawing ({} objects); the next save upgrades it",
                objects
            )
        }
        _ => {}
    }
}
