use std::fmt::Display;
use std::str::FromStr;

use derive_more::Display as MoreDisplay;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

// less strict than the rules juju itself applies, but much easier to read
const APPLICATION: &str = "[a-z][a-z0-9_-]*";

lazy_static! {
    static ref APPLICATION_RE: Regex = Regex::new(&format!("^{APPLICATION}$")).unwrap();
    static ref UNIT_RE: Regex = Regex::new(&format!("^{APPLICATION}/[0-9]+$")).unwrap();
    static ref RELATION_RES: [Regex; 4] = [
        // implicit: "app app"
        Regex::new(&format!("^{APPLICATION} {APPLICATION}$")).unwrap(),
        // endpoint on the left: "app:endpoint app"
        Regex::new(&format!("^{APPLICATION}:{APPLICATION} {APPLICATION}$")).unwrap(),
        // endpoint on the right: "app app:endpoint"
        Regex::new(&format!("^{APPLICATION} {APPLICATION}:{APPLICATION}$")).unwrap(),
        // explicit: "app:endpoint app:endpoint"
        Regex::new(&format!("^{APPLICATION}:{APPLICATION} {APPLICATION}:{APPLICATION}$")).unwrap(),
    ];
}

/// The kind of modelled entity a name refers to, judged by its syntax alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, MoreDisplay)]
pub(crate) enum EntityKind {
    #[display(fmt = "machine")]
    Machine,
    #[display(fmt = "unit")]
    Unit,
    #[display(fmt = "application")]
    Application,
    #[display(fmt = "relation")]
    Relation,
    #[display(fmt = "unknown")]
    Unknown,
}

pub(crate) fn looks_like_machine(name: &str) -> bool {
    // TODO: container ids such as 0/lxd/1
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn looks_like_unit(name: &str) -> bool {
    UNIT_RE.is_match(name)
}

pub(crate) fn looks_like_application(name: &str) -> bool {
    APPLICATION_RE.is_match(name)
}

pub(crate) fn looks_like_relation(name: &str) -> bool {
    RELATION_RES.iter().any(|re| re.is_match(name))
}

/// Infers the kind of entity from the shape of `name`.
///
/// Rules are tried in a fixed order and the first match wins:
/// machine, unit, application, then relation.
pub(crate) fn classify(name: &str) -> EntityKind {
    if looks_like_machine(name) {
        EntityKind::Machine
    } else if looks_like_unit(name) {
        EntityKind::Unit
    } else if looks_like_application(name) {
        EntityKind::Application
    } else if looks_like_relation(name) {
        EntityKind::Relation
    } else {
        EntityKind::Unknown
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{value}\" does not look like an application, machine, relation, or unit")]
pub(crate) struct ParseEntityError {
    value: String,
}

/// A name given on the command line, along with the kind it was classified as.
///
/// The kind is never [`EntityKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntityName {
    name: String,
    kind: EntityKind,
}

impl EntityName {
    pub(crate) fn as_str(&self) -> &str {
        &self.name
    }

    pub(crate) fn kind(&self) -> EntityKind {
        self.kind
    }
}

impl FromStr for EntityName {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match classify(s) {
            EntityKind::Unknown => Err(ParseEntityError {
                value: s.to_owned(),
            }),
            kind => Ok(EntityName {
                name: s.to_owned(),
                kind,
            }),
        }
    }
}

impl Display for EntityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
