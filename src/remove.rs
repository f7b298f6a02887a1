use crate::entity::{EntityKind, EntityName};
use crate::error::Result;
use crate::juju::{ControllerHandle, Juju, ModelHandle};

const CURRENT: &str = "<current>";

/// A single removal, as requested on the command line.
#[derive(Debug, Clone)]
pub(crate) struct Removal {
    pub entity: EntityName,
    pub controller: Option<String>,
    pub model: Option<String>,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The entity was found and removal was requested.
    Removed(EntityKind),
    /// Nothing in the model has that name.
    NotFound,
}

/// Find the entity named by `removal` in its model and force-destroy it.
///
/// The model is always disconnected once connected, including when the
/// removal fails; in that case the removal error is returned.
#[tracing::instrument(skip_all, fields(entity = %removal.entity))]
pub(crate) async fn remove<J: Juju>(juju: &J, removal: &Removal) -> Result<Outcome> {
    if removal.verbose {
        eprintln!(
            "connecting to model {} on controller {}",
            removal.model.as_deref().unwrap_or(CURRENT),
            removal.controller.as_deref().unwrap_or(CURRENT),
        );
    }

    let controller = juju
        .connect_controller(removal.controller.as_deref())
        .await?;
    let model = juju
        .connect_model(&controller, removal.model.as_deref())
        .await?;

    let outcome = remove_from(juju, &controller, &model, removal).await;
    let disconnected = juju.disconnect(model).await;

    let outcome = outcome?;
    disconnected?;
    Ok(outcome)
}

async fn remove_from<J: Juju>(
    juju: &J,
    controller: &ControllerHandle,
    model: &ModelHandle,
    removal: &Removal,
) -> Result<Outcome> {
    let entity = &removal.entity;

    if removal.verbose {
        eprintln!(
            "[i] interpreting \"{entity}\" as a {} on {}:{}",
            entity.kind(),
            controller.name,
            model.name
        );
    }

    let Some(live) = model.state.find(entity) else {
        eprintln!("{entity} not found");
        return Ok(Outcome::NotFound);
    };

    tracing::debug!(%live, "found");
    juju.destroy(model, &live, true).await?;
    Ok(Outcome::Removed(live.kind()))
}
