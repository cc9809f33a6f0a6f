use crate::routes::{split_segments, strip_query};
use crate::{BreadcrumbItem, OverrideRegistry, RouteTable};

pub const DEFAULT_HOME_TITLE: &str = "Home";

/// Translates a URL path into a breadcrumb trail.
///
/// Resolution is a pure function of the path, the route table and the
/// override snapshot passed in; the resolver itself holds no mutable state.
#[derive(Debug, Clone)]
pub struct BreadcrumbResolver {
    table: RouteTable,
    home_title: String,
    base_path: String,
}

impl BreadcrumbResolver {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            home_title: DEFAULT_HOME_TITLE.to_string(),
            base_path: "/".to_string(),
        }
    }

    pub fn with_home_title(mut self, title: impl Into<String>) -> Self {
        self.home_title = title.into();
        self
    }

    /// Prefix applied to every rendered href; the root entry links here.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let trimmed = base_path.trim_end_matches('/');
        self.base_path = format!("{trimmed}/");
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn home_title(&self) -> &str {
        &self.home_title
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn resolve(&self, path: &str, overrides: &OverrideRegistry) -> Vec<BreadcrumbItem> {
        let segments: Vec<&str> = split_segments(strip_query(path)).collect();
        if segments.is_empty() {
            return vec![BreadcrumbItem {
                title: self.home_title.clone(),
                href: None,
                is_current_page: true,
            }];
        }

        let mut items = Vec::with_capacity(segments.len() + 1);
        items.push(BreadcrumbItem {
            title: self.home_title.clone(),
            href: Some(self.base_path.clone()),
            is_current_page: false,
        });

        let mut prefix = String::new();
        for (index, segment) in segments.iter().enumerate() {
            prefix.push('/');
            prefix.push_str(segment);
            let is_last = index + 1 == segments.len();
            items.push(BreadcrumbItem {
                title: self.title_for(&prefix, segment, overrides),
                href: (!is_last).then(|| self.href_for(&prefix)),
                is_current_page: is_last,
            });
        }
        items
    }

    fn title_for(&self, prefix: &str, segment: &str, overrides: &OverrideRegistry) -> String {
        if let Some(title) = overrides.get(prefix) {
            return title.to_string();
        }
        if let Some(entry) = self.table.lookup(prefix) {
            return entry.title.clone();
        }
        generated_title(segment)
    }

    fn href_for(&self, prefix: &str) -> String {
        format!("{}{}", self.base_path, prefix.trim_start_matches('/'))
    }
}

/// `some-unmapped-page` becomes `Some Unmapped Page`.
pub fn generated_title(segment: &str) -> String {
    let title = segment
        .split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        segment.to_string()
    } else {
        title
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
