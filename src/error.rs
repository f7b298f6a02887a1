use thiserror::Error;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures talking to Juju.
#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("failed to connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    #[error("failed to remove {entity}: {reason}")]
    Destroy { entity: String, reason: String },

    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected output from `{command}`")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}
