//! SCM branch sources and their XML encodings
//!
//! Each source kind maps to one Jenkins `SCMSource` class. Encoding writes a
//! `source` element under a `jenkins.branch.BranchSource`; decoding
//! dispatches on that element's `class` attribute.

use serde::ser::SerializeStruct;
use serde::{
    Deserialize,
    Serialize,
    Serializer,
};

use crate::error::{
    CodecError,
    CodecResult,
};
use crate::xml::Element;

const GIT_BRANCH_DISCOVERY: &str = "jenkins.plugins.git.traits.BranchDiscoveryTrait";
const GIT_TAG_DISCOVERY: &str = "jenkins.plugins.git.traits.TagDiscoveryTrait";

const GITHUB_BRANCH_DISCOVERY: &str =
    "org.jenkinsci.plugins.github__branch__source.BranchDiscoveryTrait";
const GITHUB_ORIGIN_PR_DISCOVERY: &str =
    "org.jenkinsci.plugins.github__branch__source.OriginPullRequestDiscoveryTrait";
const GITHUB_FORK_PR_DISCOVERY: &str =
    "org.jenkinsci.plugins.github__branch__source.ForkPullRequestDiscoveryTrait";
const GITHUB_TAG_DISCOVERY: &str = "org.jenkinsci.plugins.github__branch__source.TagDiscoveryTrait";
const FORK_TRUST_CLASS_PREFIX: &str =
    "org.jenkinsci.plugins.github_branch_source.ForkPullRequestDiscoveryTrait$";

const SVN_MODULE_LOCATION: &str = "hudson.scm.SubversionSCM_-ModuleLocation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Git,
    Github,
    Svn,
    SingleSvn,
}

struct SourceClass {
    name: &'static str,
    class_name: &'static str,
    plugin: &'static str,
}

const GIT_CLASS: SourceClass = SourceClass {
    name: "git",
    class_name: "jenkins.plugins.git.GitSCMSource",
    plugin: "git",
};

const GITHUB_CLASS: SourceClass = SourceClass {
    name: "github",
    class_name: "org.jenkinsci.plugins.github_branch_source.GitHubSCMSource",
    plugin: "github-branch-source",
};

const SVN_CLASS: SourceClass = SourceClass {
    name: "svn",
    class_name: "jenkins.scm.impl.subversion.SubversionSCMSource",
    plugin: "subversion",
};

const SINGLE_SVN_CLASS: SourceClass = SourceClass {
    name: "single_svn",
    class_name: "jenkins.scm.impl.SingleSCMSource",
    plugin: "scm-api",
};

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Git,
        SourceKind::Github,
        SourceKind::Svn,
        SourceKind::SingleSvn,
    ];

    fn class(self) -> &'static SourceClass {
        match self {
            SourceKind::Git => &GIT_CLASS,
            SourceKind::Github => &GITHUB_CLASS,
            SourceKind::Svn => &SVN_CLASS,
            SourceKind::SingleSvn => &SINGLE_SVN_CLASS,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.class().name
    }

    pub fn class_name(self) -> &'static str {
        self.class().class_name
    }

    pub fn plugin(self) -> &'static str {
        self.class().plugin
    }

    pub fn from_class_name(class_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.class_name() == class_name)
    }
}

impl std::str::FromStr for SourceKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CodecError::UnsupportedSourceType(s.to_string()))
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch source of a multi-branch pipeline.
///
/// Serialized as `{"type": "<kind>", "define": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSource")]
pub enum Source {
    Git(GitSource),
    Github(GithubSource),
    Svn(SvnSource),
    SingleSvn(SingleSvnSource),
}

#[derive(Deserialize)]
struct RawSource {
    #[serde(rename = "type")]
    source_type: String,
    #[serde(default)]
    define: serde_json::Value,
}

impl TryFrom<RawSource> for Source {
    type Error = CodecError;

    fn try_from(raw: RawSource) -> Result<Self, Self::Error> {
        Source::from_parts(&raw.source_type, raw.define)
    }
}

impl Serialize for Source {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Source", 2)?;
        state.serialize_field("type", self.kind().as_str())?;
        match self {
            Source::Git(define) => state.serialize_field("define", define)?,
            Source::Github(define) => state.serialize_field("define", define)?,
            Source::Svn(define) => state.serialize_field("define", define)?,
            Source::SingleSvn(define) => state.serialize_field("define", define)?,
        }
        state.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSource {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub credential_id: String,
    pub discover_branches: bool,
    pub discover_tags: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSource {
    pub owner: String,
    pub repo: String,
    pub credential_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_uri: String,
    /// Branch discovery strategy id, 0 disables discovery
    pub discover_branches: u32,
    /// Origin pull request discovery strategy id, 0 disables discovery
    pub discover_pr_from_origin: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discover_pr_from_forks: Option<ForkDiscovery>,
    pub discover_tags: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkDiscovery {
    pub strategy: u32,
    pub trust: ForkTrust,
}

/// Who may have pull requests from forks built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ForkTrust {
    Contributors = 1,
    Everyone = 2,
    Permission = 3,
    Nobody = 4,
}

impl ForkTrust {
    pub const ALL: [ForkTrust; 4] = [
        ForkTrust::Contributors,
        ForkTrust::Everyone,
        ForkTrust::Permission,
        ForkTrust::Nobody,
    ];

    /// Suffix of the nested trust class in the fork discovery trait
    pub fn class_suffix(self) -> &'static str {
        match self {
            ForkTrust::Contributors => "TrustContributors",
            ForkTrust::Everyone => "TrustEveryone",
            ForkTrust::Permission => "TrustPermission",
            ForkTrust::Nobody => "TrustNobody",
        }
    }

    pub fn class_name(self) -> String {
        format!("{FORK_TRUST_CLASS_PREFIX}{}", self.class_suffix())
    }

    pub fn from_class_name(class_name: &str) -> CodecResult<Self> {
        let suffix = class_name
            .rsplit_once('$')
            .map(|(_, suffix)| suffix)
            .ok_or_else(|| CodecError::InvalidTrustValue(class_name.to_string()))?;

        Self::ALL
            .into_iter()
            .find(|trust| trust.class_suffix() == suffix)
            .ok_or_else(|| CodecError::InvalidTrustValue(class_name.to_string()))
    }
}

impl TryFrom<u8> for ForkTrust {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|trust| *trust as u8 == value)
            .ok_or_else(|| CodecError::InvalidTrustValue(value.to_string()))
    }
}

/// Reports a fork trust outside 1..=4 as [`CodecError::InvalidTrustValue`]
/// before serde folds it into a generic definition error.
fn check_fork_trust(define: &serde_json::Value) -> CodecResult<()> {
    let Some(trust) = define.pointer("/discover_pr_from_forks/trust") else {
        return Ok(());
    };
    let value = trust
        .as_u64()
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| CodecError::InvalidTrustValue(trust.to_string()))?;
    ForkTrust::try_from(value).map(|_| ())
}

impl From<ForkTrust> for u8 {
    fn from(trust: ForkTrust) -> Self {
        trust as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvnSource {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remote: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub credential_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub includes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub excludes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleSvnSource {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remote: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub credential_id: String,
}

impl Source {
    /// Builds a source from its API type name and untyped definition
    pub fn from_parts(source_type: &str, define: serde_json::Value) -> CodecResult<Self> {
        let kind: SourceKind = source_type.parse()?;
        let define = if define.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            define
        };

        let invalid = |e: serde_json::Error| CodecError::InvalidSourceDefinition {
            kind: kind.to_string(),
            reason: e.to_string(),
        };

        Ok(match kind {
            SourceKind::Git => Source::Git(serde_json::from_value(define).map_err(invalid)?),
            SourceKind::Github => {
                check_fork_trust(&define)?;
                Source::Github(serde_json::from_value(define).map_err(invalid)?)
            }
            SourceKind::Svn => Source::Svn(serde_json::from_value(define).map_err(invalid)?),
            SourceKind::SingleSvn => {
                Source::SingleSvn(serde_json::from_value(define).map_err(invalid)?)
            }
        })
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Git(_) => SourceKind::Git,
            Source::Github(_) => SourceKind::Github,
            Source::Svn(_) => SourceKind::Svn,
            Source::SingleSvn(_) => SourceKind::SingleSvn,
        }
    }

    /// Appends the `source` element for this branch source to `parent`
    pub fn encode(&self, parent: &mut Element, id: &str) -> CodecResult<()> {
        let kind = self.kind();
        let source = parent.create_element("source");
        source
            .set_attr("class", kind.class_name())
            .set_attr("plugin", kind.plugin());
        source.create_element("id").set_text(id);

        match self {
            Source::Git(git) => encode_git(source, git),
            Source::Github(github) => encode_github(source, github),
            Source::Svn(svn) => encode_svn(source, svn),
            Source::SingleSvn(single_svn) => encode_single_svn(source, single_svn),
        }
        Ok(())
    }

    /// Reads a `source` element. Unknown source classes are an error here;
    /// callers that only need a partial view should check
    /// [`SourceKind::from_class_name`] first.
    pub fn decode(source: &Element) -> CodecResult<Self> {
        let class_name = source.attr("class").unwrap_or_default();
        let kind = SourceKind::from_class_name(class_name)
            .ok_or_else(|| CodecError::UnrecognizedSourceClass(class_name.to_string()))?;

        Ok(match kind {
            SourceKind::Git => Source::Git(decode_git(source)),
            SourceKind::Github => Source::Github(decode_github(source)?),
            SourceKind::Svn => Source::Svn(decode_svn(source)),
            SourceKind::SingleSvn => Source::SingleSvn(decode_single_svn(source)),
        })
    }
}

fn create_text_if_present(parent: &mut Element, tag: &str, value: &str) {
    if !value.is_empty() {
        parent.create_element(tag).set_text(value);
    }
}

fn encode_git(source: &mut Element, git: &GitSource) {
    source.create_element("remote").set_text(&git.url);
    create_text_if_present(source, "credentialsId", &git.credential_id);

    let traits = source.create_element("traits");
    if git.discover_branches {
        traits.create_element(GIT_BRANCH_DISCOVERY);
    }
    if git.discover_tags {
        traits.create_element(GIT_TAG_DISCOVERY);
    }
}

fn decode_git(source: &Element) -> GitSource {
    let traits = source.select_element("traits");
    let has_trait = |name: &str| traits.and_then(|t| t.select_element(name)).is_some();

    GitSource {
        url: source.child_text("remote"),
        credential_id: source.child_text("credentialsId"),
        discover_branches: has_trait(GIT_BRANCH_DISCOVERY),
        discover_tags: has_trait(GIT_TAG_DISCOVERY),
    }
}

fn encode_github(source: &mut Element, github: &GithubSource) {
    source
        .create_element("credentialsId")
        .set_text(&github.credential_id);
    source.create_element("repoOwner").set_text(&github.owner);
    source.create_element("repository").set_text(&github.repo);
    create_text_if_present(source, "apiUri", &github.api_uri);

    let traits = source.create_element("traits");
    if github.discover_branches != 0 {
        traits
            .create_element(GITHUB_BRANCH_DISCOVERY)
            .create_element("strategyId")
            .set_text(github.discover_branches.to_string());
    }
    if github.discover_pr_from_origin != 0 {
        traits
            .create_element(GITHUB_ORIGIN_PR_DISCOVERY)
            .create_element("strategyId")
            .set_text(github.discover_pr_from_origin.to_string());
    }
    if let Some(forks) = &github.discover_pr_from_forks {
        let fork_trait = traits.create_element(GITHUB_FORK_PR_DISCOVERY);
        fork_trait
            .create_element("strategyId")
            .set_text(forks.strategy.to_string());
        fork_trait
            .create_element("trust")
            .set_attr("class", forks.trust.class_name());
    }
    if github.discover_tags {
        traits.create_element(GITHUB_TAG_DISCOVERY);
    }
}

fn strategy_id(discovery_trait: &Element) -> CodecResult<u32> {
    let text = discovery_trait.child_text("strategyId");
    text.trim()
        .parse()
        .map_err(|_| CodecError::InvalidStrategyId(text))
}

fn decode_github(source: &Element) -> CodecResult<GithubSource> {
    let mut github = GithubSource {
        owner: source.child_text("repoOwner"),
        repo: source.child_text("repository"),
        credential_id: source.child_text("credentialsId"),
        api_uri: source.child_text("apiUri"),
        ..Default::default()
    };

    let Some(traits) = source.select_element("traits") else {
        return Ok(github);
    };

    if let Some(branches) = traits.select_element(GITHUB_BRANCH_DISCOVERY) {
        github.discover_branches = strategy_id(branches)?;
    }
    if let Some(origin) = traits.select_element(GITHUB_ORIGIN_PR_DISCOVERY) {
        github.discover_pr_from_origin = strategy_id(origin)?;
    }
    if let Some(forks) = traits.select_element(GITHUB_FORK_PR_DISCOVERY) {
        let trust_class = forks
            .select_element("trust")
            .and_then(|trust| trust.attr("class"))
            .unwrap_or_default();
        github.discover_pr_from_forks = Some(ForkDiscovery {
            strategy: strategy_id(forks)?,
            trust: ForkTrust::from_class_name(trust_class)?,
        });
    }
    github.discover_tags = traits.select_element(GITHUB_TAG_DISCOVERY).is_some();

    Ok(github)
}

fn encode_svn(source: &mut Element, svn: &SvnSource) {
    create_text_if_present(source, "credentialsId", &svn.credential_id);
    create_text_if_present(source, "remoteBase", &svn.remote);
    create_text_if_present(source, "includes", &svn.includes);
    create_text_if_present(source, "excludes", &svn.excludes);
}

fn decode_svn(source: &Element) -> SvnSource {
    SvnSource {
        remote: source.child_text("remoteBase"),
        credential_id: source.child_text("credentialsId"),
        includes: source.child_text("includes"),
        excludes: source.child_text("excludes"),
    }
}

fn encode_single_svn(source: &mut Element, single_svn: &SingleSvnSource) {
    source.create_element("name").set_text("master");

    let scm = source.create_element("scm");
    scm.set_attr("class", "hudson.scm.SubversionSCM")
        .set_attr("plugin", "subversion");

    let location = scm
        .create_element("locations")
        .create_element(SVN_MODULE_LOCATION);
    create_text_if_present(location, "remote", &single_svn.remote);
    create_text_if_present(location, "credentialsId", &single_svn.credential_id);
    location.create_element("local").set_text(".");
    location.create_element("depthOption").set_text("infinity");
    location
        .create_element("ignoreExternalsOption")
        .set_text("true");
    location
        .create_element("cancelProcessOnExternalsFail")
        .set_text("true");

    for empty in [
        "excludedRegions",
        "includedRegions",
        "excludedUsers",
        "excludedRevprop",
        "excludedCommitMessages",
    ] {
        source.create_element(empty);
    }
    source
        .create_element("workspaceUpdater")
        .set_attr("class", "hudson.scm.subversion.UpdateUpdater");
    source
        .create_element("ignoreDirPropChanges")
        .set_text("false");
    source.create_element("filterChangelog").set_text("false");
    source.create_element("quietOperation").set_text("true");
}

fn decode_single_svn(source: &Element) -> SingleSvnSource {
    match source.select_path(&["scm", "locations", SVN_MODULE_LOCATION]) {
        Some(location) => SingleSvnSource {
            remote: location.child_text("remote"),
            credential_id: location.child_text("credentialsId"),
        },
        None => SingleSvnSource::default(),
    }
}
