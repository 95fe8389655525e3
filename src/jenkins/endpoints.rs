//! URL construction for the Jenkins REST API.
//!
//! Job names containing `/` address folders: `team/app` becomes
//! `job/team/job/app`. Each path segment is percent-encoded by [`url::Url`].

use url::Url;

use crate::error::RemoteError;

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let base = Url::parse(base_url)
            .map_err(|e| RemoteError::Other(format!("invalid Jenkins URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::Other(format!(
                "invalid Jenkins URL '{}': not a base URL",
                base_url
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/{segments...}`
    pub fn root(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `{base}/job/{a}/job/{b}/{tail...}`
    pub fn job(&self, job_name: &str, tail: &[&str]) -> Url {
        let mut segments = job_path(job_name);
        segments.extend_from_slice(tail);
        self.root(&segments)
    }

    /// `{base}/job/.../{number}/{tail...}`
    pub fn build(&self, job_name: &str, number: u64, tail: &[&str]) -> Url {
        let number = number.to_string();
        let mut segments = job_path(job_name);
        segments.push(&number);
        segments.extend_from_slice(tail);
        self.root(&segments)
    }

    /// Parent folder of a job (or the root) plus `tail`, used by `createItem`.
    pub fn parent(&self, job_name: &str, tail: &[&str]) -> Url {
        match split_parent(job_name) {
            (Some(parent), _) => self.job(parent, tail),
            (None, _) => self.root(tail),
        }
    }

    /// `{base}/computer/{name}/{tail...}`
    pub fn node(&self, node_name: &str, tail: &[&str]) -> Url {
        let mut segments = vec!["computer", node_name];
        segments.extend_from_slice(tail);
        self.root(&segments)
    }
}

fn job_path(job_name: &str) -> Vec<&str> {
    job_name
        .split('/')
        .filter(|part| !part.is_empty())
        .flat_map(|part| ["job", part])
        .collect()
}

/// Splits `a/b/c` into `(Some("a/b"), "c")`.
pub fn split_parent(job_name: &str) -> (Option<&str>, &str) {
    let trimmed = job_name.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, trimmed),
    }
}

/// Extracts the queue id from a `Location` header such as
/// `http://host/queue/item/123/`.
pub fn queue_id_from_location(location: &str) -> Option<u64> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .find_map(|part| part.parse().ok())
}
