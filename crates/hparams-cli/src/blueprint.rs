//! # Blueprint Subcommand
//!
//! Create blueprints from YAML definitions, print stored blueprints and list the
//! blueprints in the configured directory.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};

use hparams_core::RecordKind;
use hparams_schema::Blueprint;

use crate::context::Context;
use crate::definition::{read_definition, BlueprintDef};

/// Arguments for the `hparams blueprint` subcommand.
#[derive(Args, Debug)]
pub struct BlueprintArgs {
    #[command(subcommand)]
    pub command: BlueprintCommand,
}

/// Blueprint subcommands.
#[derive(Subcommand, Debug)]
pub enum BlueprintCommand {
    /// Build a blueprint from a YAML definition and save it.
    Create {
        /// Path to the blueprint definition.
        #[arg(value_name = "FILE")]
        definition: PathBuf,
        /// Curate catalog fields interactively.
        #[arg(long)]
        interactive: bool,
        /// Replace an existing record with the same id.
        #[arg(long)]
        overwrite: bool,
    },

    /// Print a stored blueprint.
    Show {
        /// Blueprint id.
        id: String,
    },

    /// List stored blueprint ids.
    List,
}

/// Execute the blueprint subcommand.
pub fn run_blueprint(args: &BlueprintArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        BlueprintCommand::Create {
            definition,
            interactive,
            overwrite,
        } => cmd_create(ctx, definition, *interactive, *overwrite),
        BlueprintCommand::Show { id } => cmd_show(ctx, id),
        BlueprintCommand::List => cmd_list(ctx),
    }
}

fn cmd_create(ctx: &Context, def_path: &Path, interactive: bool, overwrite: bool) -> Result<u8> {
    let definition: BlueprintDef = read_definition(def_path)?;
    let id = definition.id.clone();
    let inputs = definition.into_inputs(&ctx.registry, interactive)?;
    let blueprint = Blueprint::build(&id, ctx.registry.clone(), inputs)
        .with_context(|| format!("failed to build blueprint '{id}'"))?;

    ctx.config.ensure_dirs()?;
    let path = blueprint
        .save(&ctx.config.blueprint_store(), ctx.save_mode(overwrite))
        .with_context(|| format!("failed to save blueprint '{id}'"))?;
    println!("OK: saved blueprint {id} ({} fields) to {}", blueprint.len(), path.display());
    Ok(0)
}

fn cmd_show(ctx: &Context, id: &str) -> Result<u8> {
    let blueprint = Blueprint::from_store(id, ctx.registry.clone(), &ctx.config.blueprint_store())
        .with_context(|| format!("failed to load blueprint '{id}'"))?;
    println!("{blueprint}");
    Ok(0)
}

fn cmd_list(ctx: &Context) -> Result<u8> {
    for id in ctx.config.blueprint_store().list(RecordKind::Blueprint)? {
        println!("{id}");
    }
    Ok(0)
}
