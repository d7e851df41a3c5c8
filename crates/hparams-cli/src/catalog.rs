//! # Catalog Subcommand
//!
//! Lists the public classes of a registry namespace, indexed the way a
//! catalog field would enumerate them. Without a namespace, lists every
//! declared namespace instead.

use anyhow::{Context as _, Result};
use clap::Args;

use crate::context::Context;

/// Arguments for the `hparams catalog` subcommand.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Namespace to enumerate (e.g. "torch.optim").
    pub namespace: Option<String>,
}

/// Execute the catalog subcommand.
pub fn run_catalog(args: &CatalogArgs, ctx: &Context) -> Result<u8> {
    let Some(namespace) = &args.namespace else {
        for namespace in ctx.registry.namespaces() {
            println!("{namespace}");
        }
        return Ok(0);
    };
    let catalog = ctx.registry.catalog(namespace).with_context(|| {
        let roots: Vec<&str> = ctx.registry.roots().into_iter().collect();
        format!("unknown namespace: {namespace} (known roots: {})", roots.join(", "))
    })?;
    if catalog.is_empty() {
        println!("No public classes in {}", catalog.namespace());
        return Ok(0);
    }
    for candidate in catalog.candidates() {
        println!("{candidate}");
    }
    Ok(0)
}
