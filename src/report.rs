//! HTML report over the recorded graphs.
//!
//! While a run is in progress the report embeds the backend query URLs, so
//! opening it shows current data. Once the run is over it embeds the
//! downloaded images instead, and the report keeps working after the
//! backend has aged the data out.

use pcpgraph_types::{GraphRecord, ReportMode};

use crate::collection::GraphCollection;

/// File name of the report inside the output directory.
pub const REPORT_FILE_NAME: &str = "pcp.html";

/// Text shown in place of a graph that could not be downloaded.
pub const UNAVAILABLE: &str = "graph unavailable";

const STYLE: &str = "body { font-family: sans-serif; margin: 2em; }\n\
                     .graph { margin-bottom: 2em; }\n\
                     .graph img { max-width: 100%; }\n\
                     .unavailable { color: #a00; font-style: italic; }\n";

/// Renders the report document.
///
/// Rendering is pure: nothing is read from or written to disk or network.
///
/// # Example
///
/// ```rust
/// use pcpgraph::{GraphCollection, ReportRenderer};
/// use pcpgraph_types::ReportMode;
///
/// let graphs = GraphCollection::new();
/// let html = ReportRenderer::new()
///     .run_id(Some("teuthology-2016-01-20_11:53:26"))
///     .render(&graphs, ReportMode::Live);
/// assert!(html.contains("teuthology-2016-01-20_11:53:26"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportRenderer<'a> {
    run_id: Option<&'a str>,
    dashboard_url: Option<&'a str>,
}

impl<'a> ReportRenderer<'a> {
    /// Renderer with no run id and no dashboard link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identify the run in the title and heading.
    pub fn run_id(mut self, run_id: Option<&'a str>) -> Self {
        self.run_id = run_id;
        self
    }

    /// Link a dashboard covering the whole run.
    pub fn dashboard(mut self, dashboard_url: Option<&'a str>) -> Self {
        self.dashboard_url = dashboard_url;
        self
    }

    /// Render the report for `graphs`.
    pub fn render(&self, graphs: &GraphCollection, mode: ReportMode) -> String {
        let title = match self.run_id {
            Some(run_id) => format!("PCP graphs for {}", escape_html(run_id)),
            None => "PCP graphs".to_string(),
        };

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", title));
        html.push_str(&format!("<style>\n{}</style>\n", STYLE));
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", title));

        html.push_str(match mode {
            ReportMode::Live => {
                "<p class=\"mode\">Run in progress. Graphs show live data from the backend.</p>\n"
            }
            ReportMode::Final => {
                "<p class=\"mode\">Run complete. Graphs were saved when the run ended.</p>\n"
            }
        });

        if let Some(url) = self.dashboard_url {
            html.push_str(&format!(
                "<p class=\"dashboard\"><a href=\"{}\">Grafana dashboard</a></p>\n",
                escape_html(url)
            ));
        }

        if graphs.is_empty() {
            html.push_str("<p>No graphs were recorded.</p>\n");
        }
        for record in graphs.records() {
            html.push_str(&render_graph(record, mode));
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn render_graph(record: &GraphRecord, mode: ReportMode) -> String {
    let name = escape_html(record.metric.name());

    let src = match mode {
        ReportMode::Live => Some(record.url.clone()),
        ReportMode::Final if record.fetch_failed => None,
        // The report sits next to the images, so link them relatively
        ReportMode::Final => record
            .artifact()
            .and_then(|path| path.file_name())
            .map(|file| file.to_string_lossy().into_owned()),
    };

    let body = match src {
        Some(src) => {
            let src = escape_html(&src);
            format!(
                "<a href=\"{}\"><img src=\"{}\" alt=\"{}\"></a>",
                src, src, name
            )
        }
        None => format!("<p class=\"unavailable\">{}</p>", UNAVAILABLE),
    };

    format!(
        "<div class=\"graph\">\n<h2>{}</h2>\n{}\n</div>\n",
        name, body
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
