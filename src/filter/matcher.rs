//! Match rules shared by every filtered list.

use crate::domain::Filterable;

/// Splits a query into lowercase terms on whitespace and commas.
#[must_use]
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Splits tag text on commas only, trimming each segment.
#[must_use]
pub fn comma_segments(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Prepared, lowercased criteria for one filtering pass.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    terms: Vec<String>,
    tags: Vec<String>,
    status: Option<String>,
}

impl Criteria {
    #[must_use]
    pub fn new(query: &str, tags: &[String], status: Option<&str>) -> Self {
        Self {
            terms: tokenize(query),
            tags: tags.iter().map(|tag| tag.to_lowercase()).collect(),
            status: status.map(String::from),
        }
    }

    /// `true` when no criterion is set and every item passes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.tags.is_empty() && self.status.is_none()
    }

    /// Conjunction of the status, tag and text criteria.
    #[must_use]
    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        if let Some(status) = &self.status {
            if item.status() != Some(status.as_str()) {
                return false;
            }
        }

        let item_tags: Vec<String> = item.tags().iter().map(|tag| tag.to_lowercase()).collect();
        if !self.tags.iter().all(|selected| item_tags.contains(selected)) {
            return false;
        }

        if self.terms.is_empty() {
            return true;
        }
        let name = item.display_name().to_lowercase();
        let body = item.body().to_lowercase();
        let joined_tags = item_tags.join(" ");
        self.terms.iter().all(|term| {
            name.contains(term.as_str())
                || body.contains(term.as_str())
                || joined_tags.contains(term.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Post;

    fn post(id: &str, name: &str, content: &str, tags: &[&str], kind: Option<&str>) -> Post {
        serde_json::from_value(serde_json::json!({
            "post_id": id,
            "author": {"user_id": "1", "first_name": name},
            "content": content,
            "skill_tags": tags,
            "post_type": kind,
        }))
        .unwrap()
    }

    #[test]
    fn tokenizes_on_spaces_and_commas() {
        assert_eq!(tokenize(" Rust,Go  , Docker\tK8s "), vec!["rust", "go", "docker", "k8s"]);
        assert!(tokenize(" , ,").is_empty());
    }

    #[test]
    fn every_term_must_hit_some_field() {
        let p = post("1", "Anna", "Looking for a designer", &["Figma", "UX"], None);
        assert!(Criteria::new("anna figma", &[], None).matches(&p));
        assert!(Criteria::new("DESIGN", &[], None).matches(&p));
        assert!(!Criteria::new("anna rust", &[], None).matches(&p));
    }

    #[test]
    fn tags_are_case_insensitive_and_all_required() {
        let p = post("1", "Anna", "", &["Figma", "UX"], None);
        assert!(Criteria::new("", &["figma".into()], None).matches(&p));
        assert!(Criteria::new("", &["FIGMA".into(), "ux".into()], None).matches(&p));
        assert!(!Criteria::new("", &["Figma".into(), "Rust".into()], None).matches(&p));
    }

    #[test]
    fn status_must_equal() {
        let p = post("1", "Anna", "", &[], Some("offering"));
        assert!(Criteria::new("", &[], Some("offering")).matches(&p));
        assert!(!Criteria::new("", &[], Some("looking")).matches(&p));
        let untyped = post("2", "Bo", "", &[], None);
        assert!(!Criteria::new("", &[], Some("looking")).matches(&untyped));
    }
}
