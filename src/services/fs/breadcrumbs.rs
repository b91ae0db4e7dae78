use crate::models::Breadcrumb;

pub const HOME_LABEL: &str = "Home";

/// Splits a root-relative path into navigation crumbs, starting with `Home`.
pub fn breadcrumbs(relative_path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb::new(HOME_LABEL, "")];
    let mut current = String::new();

    for segment in relative_path.split('/').filter(|s| !s.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        crumbs.push(Breadcrumb::new(segment, current.clone()));
    }

    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(crumbs: &[Breadcrumb]) -> Vec<(&str, &str)> {
        crumbs
            .iter()
            .map(|c| (c.label.as_str(), c.path.as_str()))
            .collect()
    }

    #[test]
    fn empty_path_is_home_only() {
        assert_eq!(pairs(&breadcrumbs("")), vec![("Home", "")]);
        assert_eq!(pairs(&breadcrumbs("/")), vec![("Home", "")]);
    }

    #[test]
    fn nested_path_accumulates_prefixes() {
        assert_eq!(
            pairs(&breadcrumbs("a/b/c")),
            vec![("Home", ""), ("a", "a"), ("b", "a/b"), ("c", "a/b/c")]
        );
    }

    #[test]
    fn empty_segments_are_discarded() {
        assert_eq!(
            pairs(&breadcrumbs("/docs//2024/")),
            vec![("Home", ""), ("docs", "docs"), ("2024", "docs/2024")]
        );
    }
}
