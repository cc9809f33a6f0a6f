use crate::Phase;

/// What a rendering layer sees of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceView<T> {
    pub data: Option<T>,
    pub phase: Phase,
    pub loading: bool,
    pub error: Option<String>,
}

/// One entry of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbItem {
    pub title: String,
    /// `None` on the entry for the current page.
    pub href: Option<String>,
    pub is_current_page: bool,
}
