use std::path::{Path, PathBuf};

use cap_core::{Dataset, DatasetError, DatasetKind, Session};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: DatasetError,
    },
}

/// Outcome of one dataset load, sent back to the event loop.
#[derive(Debug)]
pub struct LoadEvent {
    pub kind: DatasetKind,
    pub outcome: Result<Dataset, LoadError>,
}

pub async fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    debug!(path = %path.display(), "reading dataset");
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Dataset::from_slice(&bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Starts one task per dataset. The channel closes once every task reported.
pub fn spawn_loads(config: &AppConfig) -> mpsc::Receiver<LoadEvent> {
    let (sender, receiver) = mpsc::channel(DatasetKind::ALL.len());

    for kind in DatasetKind::ALL {
        let path = config.dataset_path(kind).to_path_buf();
        let sender = sender.clone();
        tokio::spawn(async move {
            let outcome = load_dataset(&path).await;
            if sender.send(LoadEvent { kind, outcome }).await.is_err() {
                debug!(dataset = %kind, "load finished after the receiver closed");
            }
        });
    }

    receiver
}

/// Loads every dataset and waits for all of them.
pub async fn load_session(config: &AppConfig) -> Session {
    let mut session = Session::new();
    let mut receiver = spawn_loads(config);

    while let Some(event) = receiver.recv().await {
        session.complete(event.kind, event.outcome);
    }

    info!(loading = session.is_loading(), "all dataset loads settled");
    session
}
