use std::sync::mpsc;
use std::time::Duration;

use judge_client::{
    AsyncResource, ChannelStateSink, Endpoints, Producer, SharedOverrides, TitleRegistration,
};
use judge_core::{canonical_path, ResourceView, RouteTable};
use judge_logging::{judge_info, judge_warn};
use tokio::runtime::Handle;

/// Which view a path opens, keyed by the route pattern it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    ProblemList,
    Problem { id: String },
    Contests,
    Contest { id: String },
    ForumCategory { slug: String },
    Static,
}

impl PageKind {
    pub fn for_path(table: &RouteTable, path: &str) -> Self {
        let path = canonical_path(path);
        let last = path.rsplit('/').next().unwrap_or_default().to_string();
        let Some(entry) = table.lookup(&path) else {
            return PageKind::Static;
        };
        match entry.pattern.to_string().as_str() {
            "/problems" => PageKind::ProblemList,
            "/problems/:id" => PageKind::Problem { id: last },
            "/contests" => PageKind::Contests,
            "/contests/:id" => PageKind::Contest { id: last },
            "/forum/:slug" => PageKind::ForumCategory { slug: last },
            _ => PageKind::Static,
        }
    }
}

/// A mounted view: one resource plus the breadcrumb title it announces.
pub struct Page<T: Clone + Send + 'static> {
    path: String,
    overrides: SharedOverrides,
    title_of: fn(&T) -> Option<String>,
    registration: Option<TitleRegistration>,
    updates: mpsc::Receiver<ResourceView<T>>,
    resource: AsyncResource<T>,
}

impl<T: Clone + Send + 'static> Page<T> {
    pub fn open(
        runtime: &Handle,
        path: &str,
        producer: impl Producer<T> + 'static,
        overrides: SharedOverrides,
        title_of: fn(&T) -> Option<String>,
    ) -> Self {
        let (tx, updates) = mpsc::channel();
        let resource = AsyncResource::builder(producer)
            .name(path)
            .sink(ChannelStateSink::new(tx))
            .bind(runtime);
        Self {
            path: path.to_string(),
            overrides,
            title_of,
            registration: None,
            updates,
            resource,
        }
    }

    /// Blocks until the resource settles or `timeout` passes, returning the
    /// latest view either way.
    pub fn wait_settled(&mut self, timeout: Duration) -> ResourceView<T> {
        while let Ok(view) = self.updates.recv_timeout(timeout) {
            self.apply(&view);
            if !view.loading {
                return view;
            }
        }
        self.resource.view()
    }

    pub fn retry(&self) {
        self.resource.refetch();
    }

    fn apply(&mut self, view: &ResourceView<T>) {
        let Some(title) = view.data.as_ref().and_then(self.title_of) else {
            return;
        };
        match &mut self.registration {
            Some(registration) => registration.update(&title),
            None => {
                judge_info!("{}: breadcrumb title {:?}", self.path, title);
                self.registration = self.overrides.register_title(&self.path, Some(&title));
            }
        }
    }
}

/// How long to wait for a page, and how many retries the caller asked for.
#[derive(Debug, Clone, Copy)]
pub struct LoadPolicy {
    pub timeout: Duration,
    pub retries: u32,
}

/// Loads the data behind `kind`; `None` for pages without data.
pub fn open_page(
    runtime: &Handle,
    kind: &PageKind,
    path: &str,
    endpoints: &Endpoints,
    overrides: &SharedOverrides,
    policy: LoadPolicy,
) -> Option<PageOutcome> {
    let outcome = match kind {
        PageKind::ProblemList => summarize(
            Page::open(runtime, path, endpoints.problems(), overrides.clone(), |_| None),
            policy,
            |problems| format!("{} problems", problems.len()),
        ),
        PageKind::Problem { id } => summarize(
            Page::open(runtime, path, endpoints.problem(id), overrides.clone(), |problem| {
                Some(problem.title.clone())
            }),
            policy,
            |problem| problem.title.clone(),
        ),
        PageKind::Contests => summarize(
            Page::open(runtime, path, endpoints.contests(), overrides.clone(), |_| None),
            policy,
            |contests| format!("{} contests", contests.len()),
        ),
        PageKind::Contest { id } => summarize(
            Page::open(runtime, path, endpoints.contest(id), overrides.clone(), |contest| {
                Some(contest.title.clone())
            }),
            policy,
            |contest| format!("{} ({} problems)", contest.title, contest.problems.len()),
        ),
        PageKind::ForumCategory { slug } => summarize(
            Page::open(
                runtime,
                path,
                endpoints.forum_threads(Some(slug)),
                overrides.clone(),
                |_| None,
            ),
            policy,
            |threads| format!("{} threads", threads.len()),
        ),
        PageKind::Static => return None,
    };
    Some(outcome)
}

/// What the page showed, plus the title registration keeping its breadcrumb
/// alive while the trail is rendered.
pub struct PageOutcome {
    pub summary: Result<String, String>,
    _registration: Option<TitleRegistration>,
}

fn summarize<T: Clone + Send + 'static>(
    mut page: Page<T>,
    policy: LoadPolicy,
    describe: impl Fn(&T) -> String,
) -> PageOutcome {
    let mut view = page.wait_settled(policy.timeout);
    let mut attempts = 0;
    while view.error.is_some() && attempts < policy.retries {
        attempts += 1;
        judge_warn!("{}: retrying after error ({} of {})", page.path, attempts, policy.retries);
        page.retry();
        view = page.wait_settled(policy.timeout);
    }
    let summary = match (&view.data, &view.error) {
        (_, Some(error)) => Err(error.clone()),
        (Some(data), None) => Ok(describe(data)),
        (None, None) => Err("still loading".to_string()),
    };
    PageOutcome {
        summary,
        _registration: page.registration.take(),
    }
}
