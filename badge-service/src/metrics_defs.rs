use shared::metrics_defs::{MetricDef, MetricType};

pub const BADGE_REQUESTS: MetricDef = MetricDef {
    name: "badge.requests",
    metric_type: MetricType::Counter,
    description: "Badges served. Tagged with state (unknown, clean, vulnerable).",
};

pub const BADGE_REJECTED: MetricDef = MetricDef {
    name: "badge.rejected",
    metric_type: MetricType::Counter,
    description: "Badge requests that failed path or query validation",
};

pub const SNYK_ERRORS: MetricDef = MetricDef {
    name: "snyk.errors",
    metric_type: MetricType::Counter,
    description: "Failed project list fetches. Tagged with kind (transport, status, malformed).",
};

pub const SNYK_DURATION: MetricDef = MetricDef {
    name: "snyk.duration",
    metric_type: MetricType::Histogram,
    description: "Project list fetch duration in seconds, including failures",
};

pub const RENDER_FALLBACK: MetricDef = MetricDef {
    name: "render.fallback",
    metric_type: MetricType::Counter,
    description: "Responses that carried the badge URL because the badge service failed",
};

pub const ALL_METRICS: &[MetricDef] = &[
    BADGE_REQUESTS,
    BADGE_REJECTED,
    SNYK_ERRORS,
    SNYK_DURATION,
    RENDER_FALLBACK,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique() {
        let names: HashSet<_> = ALL_METRICS.iter().map(|def| def.name).collect();
        assert_eq!(names.len(), ALL_METRICS.len());
    }
}
