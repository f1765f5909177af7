/// A validated analysis result for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub base_url: String,
    pub html_version: String,
    pub page_title: String,
    pub h1_count: u32,
    pub h2_count: u32,
    pub h3_count: u32,
    pub h4_count: u32,
    pub internal_links_count: u32,
    pub external_links_count: u32,
    pub broken_links: Vec<BrokenLink>,
    pub has_login_form: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub url: String,
    pub status_code: i64,
}

/// Why an analysis attempt did not produce a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisFailure {
    /// Network error or non-success HTTP status.
    FetchFailure,
    /// Response body did not match the report schema.
    ParseFailure,
    /// The attempt was aborted by the user.
    UserCancellation,
}

impl std::fmt::Display for AnalysisFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisFailure::FetchFailure => write!(f, "fetch failed"),
            AnalysisFailure::ParseFailure => write!(f, "unexpected response"),
            AnalysisFailure::UserCancellation => write!(f, "cancelled by user"),
        }
    }
}
