use crate::models::{IssueLink, LinkDirection, RawIssueLink};

pub const UNKNOWN_LINK_TYPE: &str = "unknown";

/// Normalizes one raw `issuelinks` entry.
///
/// Entries that reference neither an inward nor an outward issue are dropped.
pub fn normalize_link(raw: &RawIssueLink) -> Option<IssueLink> {
    let (linked, direction) = match (&raw.inward_issue, &raw.outward_issue) {
        (Some(inward), _) => (inward, LinkDirection::Inward),
        (None, Some(outward)) => (outward, LinkDirection::Outward),
        (None, None) => return None,
    };
    let issue_key = linked.key.clone()?;

    let link_type = raw.link_type.as_ref();
    let relationship = link_type.and_then(|t| match direction {
        LinkDirection::Inward => t.inward.clone(),
        LinkDirection::Outward => t.outward.clone(),
    });

    Some(IssueLink {
        issue_key,
        link_type: link_type
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| UNKNOWN_LINK_TYPE.to_string()),
        relationship: relationship.unwrap_or_default(),
        direction,
    })
}

pub fn normalize_links(raw: &[RawIssueLink]) -> Vec<IssueLink> {
    raw.iter().filter_map(normalize_link).collect()
}

/// Keeps links whose type matches `link_type`, ignoring case. `None` keeps all.
pub fn filter_links(links: Vec<IssueLink>, link_type: Option<&str>) -> Vec<IssueLink> {
    let Some(wanted) = link_type.map(str::to_lowercase) else {
        return links;
    };
    links
        .into_iter()
        .filter(|link| link.link_type.to_lowercase() == wanted)
        .collect()
}
