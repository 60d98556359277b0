use url::form_urlencoded;

pub const BADGE_PATH_PREFIX: &str = "/badge/";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("organization is missing")]
    MissingOrganization,
    #[error("neither a repository name nor a project id was given")]
    MissingSelector,
    #[error("invalid path segment {0:?}")]
    InvalidSegment(String),
    #[error("expected /badge/<organization>/<repository>/, got {0}")]
    MalformedPath(String),
}

/// The repository (or projects) a badge is requested for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BadgeRequest {
    organization: String,
    repository_name: String,
    project_ids: Vec<String>,
}

impl BadgeRequest {
    /// Fails unless the organization is set and at least one of repository
    /// name or project ids is.
    pub fn new(
        organization: impl Into<String>,
        repository_name: impl Into<String>,
        project_ids: Vec<String>,
    ) -> Result<Self, RequestError> {
        let organization = organization.into();
        let repository_name = repository_name.into();

        if organization.is_empty() {
            return Err(RequestError::MissingOrganization);
        }
        if repository_name.is_empty() && project_ids.is_empty() {
            return Err(RequestError::MissingSelector);
        }

        Ok(Self {
            organization,
            repository_name,
            project_ids,
        })
    }

    /// Parses `/badge/{organization}/{repository}/`. The trailing slash is optional.
    pub fn from_path(path: &str) -> Result<Self, RequestError> {
        let malformed = || RequestError::MalformedPath(path.to_string());

        let rest = path.strip_prefix(BADGE_PATH_PREFIX).ok_or_else(malformed)?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let mut segments = rest.split('/');
        let (Some(organization), Some(repository), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(malformed());
        };

        for segment in [organization, repository] {
            if !is_valid_segment(segment) {
                return Err(RequestError::InvalidSegment(segment.to_string()));
            }
        }

        Self::new(organization, repository, Vec::new())
    }

    /// Parses `org=..&name=..&id=..&id=..`. The first `org` and `name` win,
    /// every non-empty `id` is kept in order.
    pub fn from_query(query: Option<&str>) -> Result<Self, RequestError> {
        let mut organization = None;
        let mut repository_name = None;
        let mut project_ids = Vec::new();

        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "org" => {
                    organization.get_or_insert(value);
                }
                "name" => {
                    repository_name.get_or_insert(value);
                }
                "id" if !value.is_empty() => project_ids.push(value.into_owned()),
                _ => {}
            }
        }

        Self::new(
            organization.unwrap_or_default(),
            repository_name.unwrap_or_default(),
            project_ids,
        )
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn project_ids(&self) -> &[String] {
        &self.project_ids
    }

    /// Snyk names projects `{org}/{repo}:{manifest}`. `None` when only
    /// project ids were requested.
    pub fn name_prefix(&self) -> Option<String> {
        if self.repository_name.is_empty() {
            return None;
        }
        Some(format!("{}/{}:", self.organization, self.repository_name))
    }
}

/// `^[a-zA-Z0-9-]+$`
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
