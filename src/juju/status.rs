//! Output of `juju status --format=json`, reduced to the fields needed to find entities.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use super::{Endpoint, ModelState, Relation};

#[derive(Debug, Deserialize)]
pub(crate) struct FullStatus {
    pub model: ModelInfo,
    #[serde(default)]
    pub machines: BTreeMap<String, MachineStatus>,
    #[serde(default)]
    pub applications: BTreeMap<String, ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelInfo {
    pub name: String,
    pub controller: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MachineStatus {
    #[serde(default)]
    containers: BTreeMap<String, MachineStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationStatus {
    #[serde(default)]
    units: BTreeMap<String, UnitStatus>,
    /// endpoint name -> applications related through it
    #[serde(default)]
    relations: BTreeMap<String, Vec<RelatedApplication>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UnitStatus {
    #[serde(default)]
    subordinates: BTreeMap<String, UnitStatus>,
}

/// Older clients list bare application names, newer ones an object per relation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RelatedApplication {
    Name(String),
    Detailed {
        #[serde(rename = "related-application")]
        application: String,
        #[serde(default)]
        interface: Option<String>,
    },
}

impl RelatedApplication {
    fn application(&self) -> &str {
        match self {
            RelatedApplication::Name(application)
            | RelatedApplication::Detailed { application, .. } => application,
        }
    }

    fn interface(&self) -> Option<&str> {
        match self {
            RelatedApplication::Name(_) => None,
            RelatedApplication::Detailed { interface, .. } => interface.as_deref(),
        }
    }
}

fn collect_machines(machines: &BTreeMap<String, MachineStatus>, out: &mut BTreeSet<String>) {
    for (id, machine) in machines {
        out.insert(id.clone());
        collect_machines(&machine.containers, out);
    }
}

fn collect_units(units: &BTreeMap<String, UnitStatus>, out: &mut BTreeSet<String>) {
    for (name, unit) in units {
        out.insert(name.clone());
        collect_units(&unit.subordinates, out);
    }
}

impl FullStatus {
    /// The endpoint on `remote` that relates it back to `local`, when the status pins it down.
    ///
    /// `None` when no endpoint, or more than one, could be the other side.
    fn remote_endpoint(&self, local: &str, remote: &str, interface: Option<&str>) -> Option<&str> {
        let mut candidates = self
            .applications
            .get(remote)?
            .relations
            .iter()
            .flat_map(|(endpoint, related)| related.iter().map(move |r| (endpoint.as_str(), r)))
            .filter(|(_, related)| related.application() == local)
            .filter(|(_, related)| interface.is_none() || related.interface() == interface);

        match (candidates.next(), candidates.next()) {
            (Some((endpoint, _)), None) => Some(endpoint),
            _ => None,
        }
    }

    fn relations(&self) -> Vec<Relation> {
        let mut relations = Vec::new();

        for (local, application) in &self.applications {
            for (endpoint, related) in &application.relations {
                for related in related {
                    let remote = related.application();

                    // listed under both applications; keep the one from the first in name order
                    if remote < local.as_str() && self.applications.contains_key(remote) {
                        continue;
                    }

                    let mut endpoints = vec![Endpoint::new(local.clone(), Some(endpoint.clone()))];
                    if remote != local {
                        let remote_endpoint = self
                            .remote_endpoint(local, remote, related.interface())
                            .map(str::to_owned);
                        endpoints.push(Endpoint::new(remote.to_owned(), remote_endpoint));
                    }
                    relations.push(Relation::new(endpoints));
                }
            }
        }

        relations
    }

    pub(crate) fn into_state(self) -> ModelState {
        let mut machines = BTreeSet::new();
        collect_machines(&self.machines, &mut machines);

        let mut units = BTreeSet::new();
        for application in self.applications.values() {
            collect_units(&application.units, &mut units);
        }

        ModelState {
            machines,
            units,
            applications: self.applications.keys().cloned().collect(),
            relations: self.relations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_2_9: &str = r#"{
        "model": {"name": "default", "type": "iaas", "controller": "lxd", "cloud": "localhost"},
        "machines": {
            "0": {"juju-status": {"current": "started"}, "containers": {"0/lxd/0": {}}},
            "1": {"juju-status": {"current": "started"}}
        },
        "applications": {
            "mysql": {
                "charm": "mysql",
                "units": {"mysql/0": {"machine": "0"}},
                "relations": {"cluster": ["mysql"], "db": ["wordpress"]}
            },
            "wordpress": {
                "charm": "wordpress",
                "units": {"wordpress/0": {"machine": "1", "subordinates": {"telegraf/0": {}}}},
                "relations": {"db": ["mysql"], "juju-info": ["telegraf"]}
            },
            "telegraf": {
                "charm": "telegraf",
                "relations": {"juju-info": ["wordpress"]}
            }
        }
    }"#;

    const STATUS_3: &str = r#"{
        "model": {"name": "admin/metrics", "controller": "microk8s"},
        "applications": {
            "mysql": {
                "units": {"mysql/0": {}},
                "relations": {
                    "metrics-endpoint": [{"related-application": "prometheus", "interface": "prometheus_scrape", "scope": "global"}]
                }
            },
            "prometheus": {
                "units": {"prometheus/0": {}},
                "relations": {
                    "ingress": [{"related-application": "traefik", "interface": "ingress", "scope": "global"}],
                    "metrics-endpoint": [{"related-application": "mysql", "interface": "prometheus_scrape", "scope": "global"}]
                }
            }
        }
    }"#;

    fn relation(endpoints: &[(&str, Option<&str>)]) -> Relation {
        Relation::new(
            endpoints
                .iter()
                .map(|(app, name)| Endpoint::new((*app).to_owned(), name.map(str::to_owned)))
                .collect(),
        )
    }

    #[test]
    fn decode_legacy_status() {
        let status: FullStatus = serde_json::from_str(STATUS_2_9).unwrap();
        assert_eq!(status.model.name, "default");
        assert_eq!(status.model.controller, "lxd");

        let state = status.into_state();
        assert_eq!(
            state.machines.iter().collect::<Vec<_>>(),
            ["0", "0/lxd/0", "1"]
        );
        assert_eq!(
            state.units.iter().collect::<Vec<_>>(),
            ["mysql/0", "telegraf/0", "wordpress/0"]
        );
        assert_eq!(
            state.applications.iter().collect::<Vec<_>>(),
            ["mysql", "telegraf", "wordpress"]
        );
        assert_eq!(
            state.relations,
            vec![
                relation(&[("mysql", Some("cluster"))]),
                relation(&[("mysql", Some("db")), ("wordpress", Some("db"))]),
                relation(&[
                    ("telegraf", Some("juju-info")),
                    ("wordpress", Some("juju-info"))
                ]),
            ]
        );
    }

    #[test]
    fn decode_detailed_relations() {
        let status: FullStatus = serde_json::from_str(STATUS_3).unwrap();
        let state = status.into_state();

        assert!(state.machines.is_empty());
        assert_eq!(
            state.relations,
            vec![
                relation(&[
                    ("mysql", Some("metrics-endpoint")),
                    ("prometheus", Some("metrics-endpoint"))
                ]),
                // traefik is not in this model, so its endpoint is unknown
                relation(&[("prometheus", Some("ingress")), ("traefik", None)]),
            ]
        );
    }

    #[test]
    fn pair_endpoints_by_interface() {
        let status: FullStatus = serde_json::from_str(
            r#"{
                "model": {"name": "m", "controller": "c"},
                "applications": {
                    "a": {"relations": {
                        "x": [{"related-application": "b", "interface": "http"}],
                        "y": [{"related-application": "b", "interface": "mysql"}]
                    }},
                    "b": {"relations": {
                        "db": [{"related-application": "a", "interface": "mysql"}],
                        "web": [{"related-application": "a", "interface": "http"}]
                    }}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            status.into_state().relations,
            vec![
                relation(&[("a", Some("x")), ("b", Some("web"))]),
                relation(&[("a", Some("y")), ("b", Some("db"))]),
            ]
        );
    }

    #[test]
    fn ambiguous_endpoints_stay_unknown() {
        let status: FullStatus = serde_json::from_str(
            r#"{
                "model": {"name": "openstack", "controller": "maas"},
                "applications": {
                    "keystone": {"relations": {"identity-service": ["nova"], "shared-db": ["nova"]}},
                    "nova": {"relations": {"identity-service": ["keystone"], "shared-db": ["keystone"]}}
                }
            }"#,
        )
        .unwrap();
        let state = status.into_state();

        assert_eq!(
            state.relations,
            vec![
                relation(&[("keystone", Some("identity-service")), ("nova", None)]),
                relation(&[("keystone", Some("shared-db")), ("nova", None)]),
            ]
        );

        let find = |name: &str| state.find(&name.parse().unwrap()).map(|e| e.to_string());
        assert_eq!(
            find("keystone:shared-db nova:shared-db").as_deref(),
            Some("relation keystone:shared-db nova:shared-db")
        );
        assert_eq!(
            find("keystone:shared-db nova").as_deref(),
            Some("relation keystone:shared-db nova")
        );
        assert_eq!(
            find("nova:identity-service keystone:identity-service").as_deref(),
            Some("relation keystone:identity-service nova:identity-service")
        );
    }

    #[test]
    fn decode_rejects_missing_model() {
        assert!(serde_json::from_str::<FullStatus>(r#"{"applications": {}}"#).is_err());
    }
}
