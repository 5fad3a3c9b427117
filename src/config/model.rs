// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// The file is optional; every field has a default matching the behaviour of
/// a bare `pairdag submit` invocation:
///
/// ```toml
/// [discover]
/// patterns = ["*.txt"]
///
/// [submit]
/// universe = "vanilla"
/// request_cpus = 1
/// request_memory = "1G"
/// request_disk = "1G"
/// requirements = '(OSGVO_OS_STRING == "RHEL 7") && Arch == "X86_64"'
/// accounting_group = "group_topology"
/// project = "TDAPipeline"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Item discovery settings from `[discover]`.
    #[serde(default)]
    pub discover: DiscoverSection,

    /// Scheduler submit-description settings from `[submit]`.
    #[serde(default)]
    pub submit: SubmitSection,
}

/// `[discover]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverSection {
    /// Glob patterns matched against *file names* (not full paths) when
    /// walking the input directory. A file is an item if any pattern matches.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

fn default_patterns() -> Vec<String> {
    vec!["*.txt".to_string()]
}

impl Default for DiscoverSection {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }
}

/// `[submit]` section.
///
/// These values are copied into every generated submit description. The
/// accounting group and project tag used to come from the environment; they
/// are explicit configuration now so a submission is reproducible from its
/// inputs alone.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitSection {
    /// Scheduler universe for all generated jobs.
    #[serde(default = "default_universe")]
    pub universe: String,

    /// CPUs requested per job.
    #[serde(default = "default_request_cpus")]
    pub request_cpus: u32,

    /// Memory requested per job (scheduler syntax, e.g. `"1G"`).
    #[serde(default = "default_request_memory")]
    pub request_memory: String,

    /// Scratch disk requested per job.
    #[serde(default = "default_request_disk")]
    pub request_disk: String,

    /// Optional `requirements` expression copied verbatim into submit files.
    #[serde(default)]
    pub requirements: Option<String>,

    /// Optional accounting group tag (`accounting_group = ...`).
    #[serde(default)]
    pub accounting_group: Option<String>,

    /// Optional project tag (`+ProjectName = ...`).
    #[serde(default)]
    pub project: Option<String>,
}

fn default_universe() -> String {
    "vanilla".to_string()
}

fn default_request_cpus() -> u32 {
    1
}

fn default_request_memory() -> String {
    "1G".to_string()
}

fn default_request_disk() -> String {
    "1G".to_string()
}

impl Default for SubmitSection {
    fn default() -> Self {
        Self {
            universe: default_universe(),
            request_cpus: default_request_cpus(),
            request_memory: default_request_memory(),
            request_disk: default_request_disk(),
            requirements: None,
            accounting_group: None,
            project: None,
        }
    }
}

/// Validated configuration.
///
/// Constructed via `TryFrom<RawConfigFile>` (see `config::validate`), which
/// is the only place allowed to call [`ConfigFile::new_unchecked`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    discover: DiscoverSection,
    submit: SubmitSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(discover: DiscoverSection, submit: SubmitSection) -> Self {
        Self { discover, submit }
    }

    pub fn discover(&self) -> &DiscoverSection {
        &self.discover
    }

    pub fn submit(&self) -> &SubmitSection {
        &self.submit
    }

    /// Mutable access for CLI overrides applied after validation; the
    /// overridable fields are free-form, so validity is preserved.
    pub fn submit_mut(&mut self) -> &mut SubmitSection {
        &mut self.submit
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        // Raw defaults always pass validation.
        Self::new_unchecked(DiscoverSection::default(), SubmitSection::default())
    }
}
