use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use derive_more::Constructor;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::process::Command;

use super::status::FullStatus;
use super::{ControllerHandle, Entity, Juju, ModelHandle};
use crate::config::JujuSettings;
use crate::error::{Error, Result};

/// Talks to Juju by running the `juju` client.
#[derive(Debug, Clone, Constructor)]
pub(crate) struct JujuCli {
    binary: PathBuf,
    no_prompt: bool,
}

impl From<&JujuSettings> for JujuCli {
    fn from(settings: &JujuSettings) -> Self {
        Self::new(settings.binary.clone(), settings.no_prompt)
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(rename = "current-model")]
    current_model: Option<String>,
}

fn command_line(binary: &Path, args: &[&str]) -> String {
    std::iter::once(binary.to_string_lossy())
        .chain(args.iter().map(|arg| Cow::from(*arg)))
        .map(shell_escape::escape)
        .join(" ")
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.trim() {
        "" => format!("juju exited with {}", output.status),
        message => message.to_owned(),
    }
}

impl JujuCli {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn run(&self, args: &[&str]) -> Result<Output> {
        let command = command_line(&self.binary, args);
        tracing::debug!(%command, "running juju");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;

        tracing::trace!(status = %output.status, stdout = output.stdout.len(), "juju finished");
        Ok(output)
    }

    /// Run a read-only query, decoding its JSON output. Any failure is a connection failure to `target`.
    async fn query<T: DeserializeOwned>(&self, target: &str, args: &[&str]) -> Result<T> {
        let output = self.run(args).await?;

        if !output.status.success() {
            return Err(Error::Connection {
                target: target.to_owned(),
                reason: stderr_of(&output),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| Error::Decode {
            command: command_line(&self.binary, args),
            source,
        })
    }

    fn destroy_args<'a>(&self, model: &'a str, entity: &'a Entity, force: bool) -> Vec<Cow<'a, str>> {
        let mut args: Vec<Cow<'a, str>> = Vec::new();
        let prompts = match entity {
            Entity::Machine(id) => {
                args.extend(["remove-machine".into(), "-m".into(), model.into(), id.into()]);
                true
            }
            Entity::Unit(name) => {
                args.extend(["remove-unit".into(), "-m".into(), model.into(), name.into()]);
                true
            }
            Entity::Application(name) => {
                args.extend([
                    "remove-application".into(),
                    "-m".into(),
                    model.into(),
                    name.into(),
                ]);
                true
            }
            Entity::Relation(relation) => {
                args.extend(["remove-relation".into(), "-m".into(), model.into()]);
                args.extend(relation.endpoints.iter().map(|e| e.to_string().into()));
                false
            }
        };

        if force {
            args.push("--force".into());
        }
        if prompts && self.no_prompt {
            args.push("--no-prompt".into());
        }
        args
    }
}

impl Juju for JujuCli {
    async fn connect_controller(&self, name: Option<&str>) -> Result<ControllerHandle> {
        let target = match name {
            Some(name) => format!("controller {name}"),
            None => "the current controller".to_owned(),
        };

        let mut args = vec!["show-controller"];
        args.extend(name);
        args.extend(["--format", "json"]);

        let controllers: BTreeMap<String, serde_json::Value> = self.query(&target, &args).await?;
        let name = controllers
            .into_keys()
            .next()
            .ok_or_else(|| Error::Connection {
                target,
                reason: "no controller found".to_owned(),
            })?;

        tracing::debug!(controller = %name, "connected to controller");
        Ok(ControllerHandle::new(name))
    }

    async fn connect_model(
        &self,
        controller: &ControllerHandle,
        name: Option<&str>,
    ) -> Result<ModelHandle> {
        let name = match name {
            Some(name) => name.to_owned(),
            None => {
                let target = format!("the current model on {}", controller.name);
                let models: ModelList = self
                    .query(
                        &target,
                        &["models", "-c", controller.name.as_str(), "--format", "json"],
                    )
                    .await?;
                models.current_model.ok_or_else(|| Error::Connection {
                    target,
                    reason: "no current model is set".to_owned(),
                })?
            }
        };

        let qualified = format!("{}:{}", controller.name, name);
        let status: FullStatus = self
            .query(
                &format!("model {qualified}"),
                &["status", "-m", qualified.as_str(), "--format", "json"],
            )
            .await?;

        tracing::debug!(
            controller = %status.model.controller,
            model = %status.model.name,
            "connected to model"
        );

        // keep the name as given; status may report it without the owner prefix
        Ok(ModelHandle::new(
            controller.name.clone(),
            name,
            status.into_state(),
        ))
    }

    async fn destroy(&self, model: &ModelHandle, entity: &Entity, force: bool) -> Result<()> {
        let qualified = model.qualified_name();
        let args = self.destroy_args(&qualified, entity, force);
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        let output = self.run(&args).await?;
        if !output.status.success() {
            return Err(Error::Destroy {
                entity: entity.to_string(),
                reason: stderr_of(&output),
            });
        }

        tracing::info!(%entity, model = %qualified, "removal requested");
        Ok(())
    }

    async fn disconnect(&self, model: ModelHandle) -> Result<()> {
        // the client holds no connection between commands; only the snapshot is released
        tracing::debug!(model = %model.qualified_name(), "disconnected");
        drop(model);
        Ok(())
    }
}
