//! # Params Subcommand
//!
//! Create hyperparameter sets from YAML definitions against a stored blueprint,
//! print stored sets with their nested defaults, and list stored sets.
//!
//! With `--interactive`, the definition's values are applied first and the
//! wizard asks for every declared field still unset.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};

use hparams_core::{RecordKind, Value};
use hparams_schema::Blueprint;
use hparams_set::{share, HyperParameters, SharedBlueprint};

use crate::context::Context;
use crate::definition::{read_definition, ParamsDef};
use crate::wizard::ParamsWizard;

/// Arguments for the `hparams params` subcommand.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    #[command(subcommand)]
    pub command: ParamsCommand,
}

/// Params subcommands.
#[derive(Subcommand, Debug)]
pub enum ParamsCommand {
    /// Build a hyperparameter set from a YAML definition and save it.
    Create {
        /// Path to the hyperparameter definition.
        #[arg(value_name = "FILE")]
        definition: PathBuf,
        /// Ask for unset fields and constructor overrides on the terminal.
        #[arg(long)]
        interactive: bool,
        /// Replace an existing record with the same id.
        #[arg(long)]
        overwrite: bool,
    },

    /// Print a stored hyperparameter set.
    Show {
        /// Id of the blueprint the set was built against.
        blueprint: String,
        /// Hyperparameter set id.
        id: String,
    },

    /// List stored hyperparameter set ids.
    List,
}

/// Execute the params subcommand.
pub fn run_params(args: &ParamsArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        ParamsCommand::Create {
            definition,
            interactive,
            overwrite,
        } => cmd_create(ctx, definition, *interactive, *overwrite),
        ParamsCommand::Show { blueprint, id } => cmd_show(ctx, blueprint, id),
        ParamsCommand::List => cmd_list(ctx),
    }
}

fn load_blueprint(ctx: &Context, id: &str) -> Result<SharedBlueprint> {
    let blueprint = Blueprint::from_store(id, ctx.registry.clone(), &ctx.config.blueprint_store())
        .with_context(|| format!("failed to load blueprint '{id}'"))?;
    Ok(share(blueprint))
}

/// Fill the unset fields of `params` from the wizard's answers.
///
/// Overrides are stored like any other field; an answer the blueprint
/// rejects fails the whole run.
fn complete<R: BufRead, W: Write>(
    params: &mut HyperParameters,
    wizard: &mut ParamsWizard<R, W>,
) -> Result<()> {
    let answers = wizard.run(params).context("interactive input failed")?;
    for (name, value) in answers {
        params
            .set_field(name.as_str(), value)
            .with_context(|| format!("field '{name}'"))?;
    }
    Ok(())
}

fn cmd_create(ctx: &Context, def_path: &Path, interactive: bool, overwrite: bool) -> Result<u8> {
    let definition: ParamsDef = read_definition(def_path)?;
    let blueprint = load_blueprint(ctx, &definition.blueprint)?;
    let values = definition
        .values
        .into_iter()
        .map(|(name, value)| {
            let value = value
                .into_value(&ctx.registry)
                .with_context(|| format!("field '{name}'"))?;
            Ok((name, value))
        })
        .collect::<Result<Vec<(String, Value)>>>()?;

    let offered = values.len();
    let mut params = HyperParameters::build(&definition.id, blueprint, values);
    if params.len() < offered {
        tracing::warn!(
            id = %definition.id,
            skipped = offered - params.len(),
            "some values were skipped; run with -v for details"
        );
    }

    if interactive {
        complete(&mut params, &mut ParamsWizard::stdio())?;
    }

    ctx.config.ensure_dirs()?;
    let path = params
        .save(&ctx.config.hyperparameter_store(), ctx.save_mode(overwrite))
        .with_context(|| format!("failed to save hyperparameters '{}'", definition.id))?;
    println!(
        "OK: saved hyperparameters {} ({} values, {offered} from the definition) to {}",
        definition.id,
        params.len(),
        path.display()
    );
    Ok(0)
}

fn cmd_show(ctx: &Context, blueprint_id: &str, id: &str) -> Result<u8> {
    let blueprint = load_blueprint(ctx, blueprint_id)?;
    let params = HyperParameters::from_store(id, blueprint, &ctx.config.hyperparameter_store())
        .with_context(|| format!("failed to load hyperparameters '{id}'"))?;
    println!("{params}");
    Ok(0)
}

fn cmd_list(ctx: &Context) -> Result<u8> {
    for id in ctx
        .config
        .hyperparameter_store()
        .list(RecordKind::HyperParameters)?
    {
        println!("{id}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hparams_core::{ClassDescriptor, ClassRegistry, Parameter, SaveMode, ScalarKind, StorageConfig};
    use hparams_schema::FieldInput;
    use hparams_set::ParamValue;

    fn ctx(root: &Path) -> Context {
        let mut reg = ClassRegistry::new();
        let sgd = reg
            .register(ClassDescriptor::new("torch.optim.sgd", "SGD").with_params([
                Parameter::required("params"),
                Parameter::optional("lr", 0.01),
            ]))
            .unwrap();
        reg.reexport("torch.optim", &sgd).unwrap();
        let ctx = Context {
            config: StorageConfig::with_root(root),
            registry: Arc::new(reg),
        };
        ctx.config.ensure_dirs().unwrap();
        Blueprint::build(
            "train",
            ctx.registry.clone(),
            vec![
                ("epochs", FieldInput::of_type(ScalarKind::Int)),
                ("optimizer", FieldInput::catalog("torch.optim")),
            ],
        )
        .unwrap()
        .save(&ctx.config.blueprint_store(), SaveMode::CreateNew)
        .unwrap();
        ctx
    }

    #[test]
    fn test_create_and_show() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        let definition = dir.path().join("run.yaml");
        std::fs::write(
            &definition,
            "id: run-1\nblueprint: train\nvalues:\n  epochs: 3\n  optimizer: { class: torch.optim.SGD }\n  colour: red\n",
        )
        .unwrap();

        assert_eq!(cmd_create(&ctx, &definition, false, false).unwrap(), 0);
        let saved = HyperParameters::from_store(
            "run-1",
            load_blueprint(&ctx, "train").unwrap(),
            &ctx.config.hyperparameter_store(),
        )
        .unwrap();
        assert_eq!(saved.len(), 2);
        assert!(!saved.contains("colour"));

        assert_eq!(cmd_show(&ctx, "train", "run-1").unwrap(), 0);
        assert_eq!(cmd_list(&ctx).unwrap(), 0);
    }

    #[test]
    fn test_interactive_answers_and_overrides_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        let blueprint = load_blueprint(&ctx, "train").unwrap();
        let mut params = HyperParameters::build("run-2", blueprint.clone(), vec![("epochs", Value::from(4))]);

        let input = "0\n0\n0.05\n\n";
        let mut wizard = ParamsWizard::new(std::io::Cursor::new(input.as_bytes().to_vec()), Vec::<u8>::new());
        complete(&mut params, &mut wizard).unwrap();
        params
            .save(&ctx.config.hyperparameter_store(), SaveMode::CreateNew)
            .unwrap();

        let saved =
            HyperParameters::from_store("run-2", blueprint, &ctx.config.hyperparameter_store()).unwrap();
        assert_eq!(saved.raw("epochs"), Some(&Value::from(4)));
        let Some(ParamValue::Class(class, defaults)) = saved.get("optimizer") else {
            panic!("optimizer should be a class");
        };
        assert_eq!(class.name(), "SGD");
        assert_eq!(defaults["lr"], Value::from(0.05));
    }

    #[test]
    fn test_interactive_input_cut_short_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        let mut params = HyperParameters::new("run-3", load_blueprint(&ctx, "train").unwrap());
        let mut wizard = ParamsWizard::new(std::io::Cursor::new(b"2\n".to_vec()), Vec::<u8>::new());
        let err = complete(&mut params, &mut wizard).unwrap_err();
        assert!(format!("{err:#}").contains("interactive input failed"));
    }

    #[test]
    fn test_create_against_missing_blueprint() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        let definition = dir.path().join("run.yaml");
        std::fs::write(&definition, "id: run-1\nblueprint: nope\n").unwrap();
        let err = cmd_create(&ctx, &definition, false, false).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load blueprint 'nope'"));
    }

    #[test]
    fn test_create_with_unknown_class() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(dir.path());
        let definition = dir.path().join("run.yaml");
        std::fs::write(
            &definition,
            "id: run-1\nblueprint: train\nvalues:\n  optimizer: { class: torch.optim.Nadam }\n",
        )
        .unwrap();
        let err = cmd_create(&ctx, &definition, false, false).unwrap_err();
        assert!(format!("{err:#}").contains("torch.optim.Nadam"));
    }
}
