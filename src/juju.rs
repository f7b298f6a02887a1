//! The parts of a Juju controller this tool talks to.

mod cli;
mod status;

use std::collections::BTreeSet;
use std::fmt::Display;

use derive_more::Constructor;
use itertools::Itertools;

pub(crate) use cli::JujuCli;

use crate::entity::{EntityKind, EntityName};
use crate::error::Result;

/// Access to a Juju controller and the models it manages.
pub(crate) trait Juju {
    /// Connect to the named controller, or the current one if `name` is `None`.
    async fn connect_controller(&self, name: Option<&str>) -> Result<ControllerHandle>;

    /// Connect to the named model on `controller`, or that controller's current model.
    async fn connect_model(
        &self,
        controller: &ControllerHandle,
        name: Option<&str>,
    ) -> Result<ModelHandle>;

    async fn destroy(&self, model: &ModelHandle, entity: &Entity, force: bool) -> Result<()>;

    async fn disconnect(&self, model: ModelHandle) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub(crate) struct ControllerHandle {
    pub name: String,
}

/// A connection to a single model, with a snapshot of what it contains.
#[derive(Debug, Clone, Constructor)]
pub(crate) struct ModelHandle {
    pub controller: String,
    pub name: String,
    pub state: ModelState,
}

impl ModelHandle {
    /// The `<controller>:<model>` form accepted by `juju -m`.
    pub(crate) fn qualified_name(&self) -> String {
        format!("{}:{}", self.controller, self.name)
    }
}

/// The live entities of a model, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ModelState {
    pub machines: BTreeSet<String>,
    pub units: BTreeSet<String>,
    pub applications: BTreeSet<String>,
    pub relations: Vec<Relation>,
}

impl ModelState {
    /// Look `name` up in the collection that matches its kind.
    pub(crate) fn find(&self, name: &EntityName) -> Option<Entity> {
        let key = name.as_str();
        match name.kind() {
            EntityKind::Machine => self
                .machines
                .contains(key)
                .then(|| Entity::Machine(key.to_owned())),
            EntityKind::Unit => self
                .units
                .contains(key)
                .then(|| Entity::Unit(key.to_owned())),
            EntityKind::Application => self
                .applications
                .contains(key)
                .then(|| Entity::Application(key.to_owned())),
            EntityKind::Relation => self
                .relations
                .iter()
                .find(|relation| relation.matches(key))
                .map(|relation| Entity::Relation(relation.resolve(key))),
            // rejected when the name is parsed
            EntityKind::Unknown => None,
        }
    }
}

/// A live entity that can be destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entity {
    Machine(String),
    Unit(String),
    Application(String),
    Relation(Relation),
}

impl Entity {
    pub(crate) fn kind(&self) -> EntityKind {
        match self {
            Entity::Machine(_) => EntityKind::Machine,
            Entity::Unit(_) => EntityKind::Unit,
            Entity::Application(_) => EntityKind::Application,
            Entity::Relation(_) => EntityKind::Relation,
        }
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Machine(id) => write!(f, "machine {id}"),
            Entity::Unit(name) => write!(f, "unit {name}"),
            Entity::Application(name) => write!(f, "application {name}"),
            Entity::Relation(relation) => write!(f, "relation {relation}"),
        }
    }
}

/// One side of a relation. The endpoint name is unknown for some remote applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Constructor)]
pub(crate) struct Endpoint {
    pub application: String,
    pub name: Option<String>,
}

impl Endpoint {
    /// An unknown endpoint name accepts any requested name.
    fn accepts(&self, application: &str, name: Option<&str>) -> bool {
        self.application == application
            && match (name, self.name.as_deref()) {
                (Some(wanted), Some(known)) => wanted == known,
                _ => true,
            }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", self.application, name),
            None => f.write_str(&self.application),
        }
    }
}

/// An integration between application endpoints. Peer relations have a single endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Constructor)]
pub(crate) struct Relation {
    pub endpoints: Vec<Endpoint>,
}

fn parse_spec(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once(':') {
        Some((application, endpoint)) => (application, Some(endpoint)),
        None => (spec, None),
    }
}

impl Relation {
    /// Pairs each spec with a different endpoint that accepts it.
    fn bind<'a>(&'a self, specs: &'a str) -> Option<Vec<(&'a Endpoint, Option<&'a str>)>> {
        let specs: Vec<_> = specs.split_whitespace().map(parse_spec).collect();
        if specs.is_empty() {
            return None;
        }

        self.endpoints
            .iter()
            .permutations(specs.len())
            .find_map(|endpoints| {
                endpoints
                    .iter()
                    .zip(&specs)
                    .all(|(endpoint, (application, name))| endpoint.accepts(application, *name))
                    .then(|| endpoints.into_iter().zip(specs.iter().map(|(_, name)| *name)).collect())
            })
    }

    /// Whether `specs` could have been used to create this relation.
    ///
    /// `specs` is a whitespace separated list of `<application>[:<endpoint>]`,
    /// each naming a different endpoint of the relation. A spec without an
    /// endpoint name matches any endpoint of that application.
    pub(crate) fn matches(&self, specs: &str) -> bool {
        self.bind(specs).is_some()
    }

    /// This relation with unknown endpoint names taken from `specs`.
    pub(crate) fn resolve(&self, specs: &str) -> Relation {
        let Some(bound) = self.bind(specs) else {
            return self.clone();
        };

        let endpoints = self
            .endpoints
            .iter()
            .map(|endpoint| {
                let requested = bound
                    .iter()
                    .find(|(candidate, _)| std::ptr::eq(*candidate, endpoint))
                    .and_then(|(_, name)| *name);
                Endpoint::new(
                    endpoint.application.clone(),
                    endpoint.name.clone().or_else(|| requested.map(str::to_owned)),
                )
            })
            .collect();
        Relation::new(endpoints)
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoints.iter().join(" "))
    }
}
