use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One CI workflow definition belonging to a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    /// Location of the workflow definition inside the repository.
    pub path: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, path: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_default,
        }
    }
}

/// Outcome of `Repository::mark_default_pipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPipelineMark {
    Marked,
    NotFound,
    /// Several workflows share the name; carries the match count.
    Ambiguous(usize),
}

/// A registered target repository, unique by `name` within the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    pub default_branch: String,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

impl Repository {
    /// Unenriched registration stub: only the URL and provenance are known.
    pub fn stub(
        id: impl Into<String>,
        url: impl Into<String>,
        added_by: impl Into<String>,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            url: url.into(),
            default_branch: String::new(),
            added_by: added_by.into(),
            added_at,
            pipelines: Vec::new(),
        }
    }

    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|pipeline| pipeline.name == name)
    }

    /// Flags `pipeline_name` as the only default. Flags are left untouched unless the
    /// name matches exactly one pipeline.
    pub fn mark_default_pipeline(&mut self, pipeline_name: &str) -> DefaultPipelineMark {
        let matches = self
            .pipelines
            .iter()
            .filter(|pipeline| pipeline.name == pipeline_name)
            .count();
        match matches {
            0 => return DefaultPipelineMark::NotFound,
            1 => {}
            matches => return DefaultPipelineMark::Ambiguous(matches),
        }
        for pipeline in &mut self.pipelines {
            pipeline.is_default = pipeline.name == pipeline_name;
        }
        DefaultPipelineMark::Marked
    }
}
