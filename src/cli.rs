use clap::{ArgAction, Parser};
use color_eyre::eyre::{eyre, Result, WrapErr};
use lazy_static::lazy_static;

use crate::config::Settings;
use crate::entity::EntityName;
use crate::juju::JujuCli;
use crate::remove::{remove, Outcome, Removal};

/// One-line summary shown by `juju help plugins`.
const DESCRIPTION: &str = "Remove an application, machine, relation, or unit from a model";

lazy_static! {
    static ref LONG_VERSION: String = format!(
        "{}{}+g{}",
        env!("CARGO_PKG_VERSION"),
        match env!("VERGEN_CARGO_OPT_LEVEL") {
            "0" | "1" => "-debug",
            _ => "",
        },
        env!("VERGEN_GIT_SHA"),
    );
}

/// Removes entities from a Juju model, without needing to remember which specific command to use.
///
/// Supports applications, machines, relations, and units. The kind of entity is
/// inferred from the name: `0` is a machine, `mysql/0` a unit, `mysql` an
/// application, and `mysql prometheus` or `mysql:db wordpress:db` a relation.
/// Entities are always removed with `--force`.
#[derive(Debug, Parser)]
#[command(name = "juju-remove", version, long_version = LONG_VERSION.as_str(), about, max_term_width = 100)]
pub(crate) struct Cli {
    /// Controller to operate in [default: current]
    #[arg(short, long, value_name = "controller")]
    controller: Option<String>,

    /// Model to operate in [default: current]
    #[arg(short, long, value_name = "model")]
    model: Option<String>,

    /// Provide verbose output (can be set multiple times)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Print a one-line description of this plugin and exit
    #[arg(long, exclusive = true)]
    description: bool,

    /// An application, machine, unit, or relation
    #[arg(value_name = "modelled-entity", required_unless_present = "description")]
    entity: Option<EntityName>,
}

impl Cli {
    /// Consume the command line arguments and remove the requested entity.
    pub(crate) async fn run(self) -> Result<()> {
        if self.description {
            println!("{DESCRIPTION}");
            return Ok(());
        }

        let entity = self
            .entity
            .ok_or_else(|| eyre!("missing <modelled-entity>"))?;

        let settings = Settings::load().await.wrap_err("Failed to load settings")?;
        let juju = JujuCli::from(&settings.juju);

        let removal = Removal {
            entity,
            controller: self.controller.or(settings.controller),
            model: self.model.or(settings.model),
            verbose: self.verbose > 0,
        };

        match remove(&juju, &removal).await? {
            Outcome::Removed(kind) => tracing::info!(%kind, entity = %removal.entity, "removed"),
            Outcome::NotFound => tracing::debug!(entity = %removal.entity, "nothing to remove"),
        }

        Ok(())
    }
}
