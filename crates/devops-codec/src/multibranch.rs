//! Multi-branch pipeline (`WorkflowMultiBranchProject`) job configs

use crate::error::{
    CodecError,
    CodecResult,
};
use crate::schedule::to_schedule;
use crate::source::{
    Source,
    SourceKind,
};
use crate::types::{
    DiscarderProperty,
    MultiBranchPipeline,
    ScmInfo,
    TimerTrigger,
};
use crate::version::{
    rewrite_declared_version,
    JENKINS_XML_VERSION,
    WORKING_XML_VERSION,
};
use crate::xml::{
    Document,
    Element,
};

pub const MULTI_BRANCH_ROOT: &str =
    "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject";

const MULTI_BRANCH_TEMPLATE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject plugin="workflow-multibranch">
  <actions/>
  <properties>
    <org.jenkinsci.plugins.pipeline.modeldefinition.config.FolderConfig plugin="pipeline-model-definition">
      <dockerLabel></dockerLabel>
      <registry plugin="docker-commons"/>
    </org.jenkinsci.plugins.pipeline.modeldefinition.config.FolderConfig>
  </properties>
  <folderViews class="jenkins.branch.MultiBranchProjectViewHolder" plugin="branch-api">
    <owner class="org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject" reference="../.."/>
  </folderViews>
  <healthMetrics>
    <com.cloudbees.hudson.plugins.folder.health.WorstChildHealthMetric plugin="cloudbees-folder">
      <nonRecursive>false</nonRecursive>
    </com.cloudbees.hudson.plugins.folder.health.WorstChildHealthMetric>
  </healthMetrics>
  <icon class="jenkins.branch.MetadataActionFolderIcon" plugin="branch-api">
    <owner class="org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject" reference="../.."/>
  </icon>
</org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject>"#;

const ORPHANED_ITEM_STRATEGY: &str =
    "com.cloudbees.hudson.plugins.folder.computed.DefaultOrphanedItemStrategy";
const PERIODIC_FOLDER_TRIGGER: &str =
    "com.cloudbees.hudson.plugins.folder.computed.PeriodicFolderTrigger";
const BRANCH_SOURCE_LIST: &str = "jenkins.branch.MultiBranchProject$BranchSourceList";
const BRANCH_SOURCE: &str = "jenkins.branch.BranchSource";
const BRANCH_PROPERTY_STRATEGY: &str = "jenkins.branch.NamedExceptionsBranchPropertyStrategy";
const BRANCH_PROJECT_FACTORY: &str =
    "org.jenkinsci.plugins.workflow.multibranch.WorkflowBranchProjectFactory";

fn create_owner(parent: &mut Element) {
    parent
        .create_element("owner")
        .set_attr("class", MULTI_BRANCH_ROOT)
        .set_attr("reference", "../..");
}

/// Renders a multi-branch pipeline as a Jenkins job config. The branch
/// source id is derived from the project and pipeline names.
pub fn encode_multi_branch_pipeline(
    project_name: &str, pipeline: &MultiBranchPipeline,
) -> CodecResult<String> {
    let source = pipeline
        .source
        .as_ref()
        .ok_or(CodecError::MissingBranchSource)?;

    let mut doc = Document::parse(MULTI_BRANCH_TEMPLATE)?;
    let project = doc
        .select_root_mut(MULTI_BRANCH_ROOT)
        .ok_or(CodecError::MissingMultiBranchDefinition)?;

    project
        .create_element("description")
        .set_text(&pipeline.description);

    if let Some(discarder) = &pipeline.discarder {
        let strategy = project.create_element("orphanedItemStrategy");
        strategy
            .set_attr("class", ORPHANED_ITEM_STRATEGY)
            .set_attr("plugin", "cloudbees-folder");
        strategy.create_element("pruneDeadBranches").set_text("true");
        strategy
            .create_element("daysToKeep")
            .set_text(&discarder.days_to_keep);
        strategy
            .create_element("numToKeep")
            .set_text(&discarder.num_to_keep);
    }

    let triggers = project.create_element("triggers");
    if let Some(timer) = &pipeline.timer_trigger {
        let millis: i64 = timer
            .interval
            .trim()
            .parse()
            .map_err(|_| CodecError::IntervalParseError(timer.interval.clone()))?;

        let trigger = triggers.create_element(PERIODIC_FOLDER_TRIGGER);
        trigger.set_attr("plugin", "cloudbees-folder");
        trigger.create_element("spec").set_text(to_schedule(millis));
        trigger.create_element("interval").set_text(&timer.interval);
        triggers.create_element("disabled").set_text("false");
    }

    let sources = project.create_element("sources");
    sources
        .set_attr("class", BRANCH_SOURCE_LIST)
        .set_attr("plugin", "branch-api");
    create_owner(sources);

    let branch_source = sources
        .create_element("data")
        .create_element(BRANCH_SOURCE);
    let strategy = branch_source.create_element("strategy");
    strategy.set_attr("class", BRANCH_PROPERTY_STRATEGY);
    strategy
        .create_element("defaultProperties")
        .set_attr("class", "empty-list");
    strategy
        .create_element("namedExceptions")
        .set_attr("class", "empty-list");
    source.encode(branch_source, &format!("{project_name}{}", pipeline.name))?;

    let factory = project.create_element("factory");
    factory.set_attr("class", BRANCH_PROJECT_FACTORY);
    create_owner(factory);
    factory
        .create_element("scriptPath")
        .set_text(&pipeline.script_path);

    let xml = doc.to_xml_string()?;
    Ok(rewrite_declared_version(
        &xml,
        WORKING_XML_VERSION,
        JENKINS_XML_VERSION,
    ))
}

fn parse_project(xml: &str) -> CodecResult<Document> {
    let xml = rewrite_declared_version(xml, JENKINS_XML_VERSION, WORKING_XML_VERSION);
    let doc = Document::parse(&xml)?;
    if doc.select_root(MULTI_BRANCH_ROOT).is_none() {
        return Err(CodecError::MissingMultiBranchDefinition);
    }
    Ok(doc)
}

fn select_source(project: &Element) -> Option<&Element> {
    project.select_path(&["sources", "data", BRANCH_SOURCE, "source"])
}

/// Reads a Jenkins job config back into a multi-branch pipeline. The
/// returned name is empty.
///
/// A config without a branch source decodes with `source: None`, while a
/// branch source of an unknown class is an error: silently dropping it
/// would make the next update erase it.
pub fn decode_multi_branch_pipeline(xml: &str) -> CodecResult<MultiBranchPipeline> {
    let doc = parse_project(xml)?;
    let project = doc.root();

    let mut pipeline = MultiBranchPipeline {
        description: project.child_text("description"),
        script_path: project
            .select_path(&["factory", "scriptPath"])
            .map(|path| path.text().to_string())
            .unwrap_or_default(),
        ..Default::default()
    };

    if let Some(strategy) = project.select_element("orphanedItemStrategy") {
        pipeline.discarder = Some(DiscarderProperty {
            days_to_keep: strategy.child_text("daysToKeep"),
            num_to_keep: strategy.child_text("numToKeep"),
        });
    }

    if let Some(trigger) = project.select_path(&["triggers", PERIODIC_FOLDER_TRIGGER]) {
        pipeline.timer_trigger = Some(TimerTrigger {
            interval: trigger.child_text("interval"),
            ..Default::default()
        });
    }

    pipeline.source = select_source(project).map(Source::decode).transpose()?;
    if pipeline.source.is_none() {
        let has_branch_source = project
            .select_path(&["sources", "data", BRANCH_SOURCE])
            .is_some();
        tracing::debug!(has_branch_source, "Multi-branch config has no branch source");
    }

    Ok(pipeline)
}

/// Extracts the repository summary shown for a multi-branch job. Only git
/// and GitHub sources have one; other or missing sources yield `None`.
pub fn decode_scm_summary(xml: &str) -> CodecResult<Option<ScmInfo>> {
    let doc = parse_project(xml)?;
    let project = doc.root();

    let Some(source) = select_source(project) else {
        return Ok(None);
    };
    let kind = source
        .attr("class")
        .and_then(SourceKind::from_class_name);

    let mut info = ScmInfo {
        path: project
            .select_path(&["factory", "scriptPath"])
            .map(|path| path.text().to_string())
            .unwrap_or_default(),
        ..Default::default()
    };

    match kind {
        Some(SourceKind::Github) => {
            info.scm_type = SourceKind::Github.to_string();
            if let (Some(owner), Some(repository)) = (
                source.select_element("repoOwner"),
                source.select_element("repository"),
            ) {
                info.repo = format!("{}:{}", owner.text(), repository.text());
            }
            info.api_uri = source.child_text("apiUri");
        }
        Some(SourceKind::Git) => {
            info.scm_type = SourceKind::Git.to_string();
            info.repo = source.child_text("remote");
        }
        Some(SourceKind::Svn) | Some(SourceKind::SingleSvn) | None => return Ok(None),
    }

    Ok(Some(info))
}
