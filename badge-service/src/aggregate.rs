//! Matching requested repositories against the Snyk project list.
//!
//! A project matches when its name starts with `{org}/{repo}:` or when its id
//! equals a requested project id. With zero or one project id the first
//! project (in upstream order) satisfying either condition is used. With
//! several ids every id is resolved on its own, preferring the project with
//! that exact id over the first name match, and the issue totals of all
//! distinct matched projects are summed.

use crate::request::BadgeRequest;
use crate::snyk::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Aggregate {
    /// Issues across all matched projects
    pub total: u64,
    /// Number of distinct projects that contributed to `total`
    pub matched: usize,
}

pub fn aggregate(projects: &[Project], request: &BadgeRequest) -> Aggregate {
    let prefix = request.name_prefix();
    let prefix = prefix.as_deref();

    let matched: Vec<usize> = match request.project_ids() {
        [] => first_match(projects, prefix, None).into_iter().collect(),
        [project_id] => first_match(projects, prefix, Some(project_id.as_str()))
            .into_iter()
            .collect(),
        project_ids => {
            let mut matched = Vec::with_capacity(project_ids.len());
            for project_id in project_ids {
                match resolve_project_id(projects, prefix, project_id) {
                    Some(index) if !matched.contains(&index) => matched.push(index),
                    _ => {}
                }
            }
            matched
        }
    };

    Aggregate {
        total: matched
            .iter()
            .map(|&index| projects[index].issue_total())
            .fold(0, u64::saturating_add),
        matched: matched.len(),
    }
}

fn first_match(
    projects: &[Project],
    prefix: Option<&str>,
    project_id: Option<&str>,
) -> Option<usize> {
    projects
        .iter()
        .position(|project| matches_name(project, prefix) || matches_id(project, project_id))
}

// An exact id match wins over a name match, so two ids of the same
// repository resolve to their own projects.
fn resolve_project_id(
    projects: &[Project],
    prefix: Option<&str>,
    project_id: &str,
) -> Option<usize> {
    projects
        .iter()
        .position(|project| matches_id(project, Some(project_id)))
        .or_else(|| first_match(projects, prefix, None))
}

fn matches_name(project: &Project, prefix: Option<&str>) -> bool {
    match (project.name.as_deref(), prefix) {
        (Some(name), Some(prefix)) => name.starts_with(prefix),
        _ => false,
    }
}

fn matches_id(project: &Project, project_id: Option<&str>) -> bool {
    match (project.id.as_deref(), project_id) {
        (Some(id), Some(project_id)) => id == project_id,
        _ => false,
    }
}
