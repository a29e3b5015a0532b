//! Single pipeline (`flow-definition`) job configs

use crate::error::{
    CodecError,
    CodecResult,
};
use crate::types::{
    DiscarderProperty,
    Parameter,
    ParameterKind,
    ParameterType,
    Pipeline,
    RemoteTrigger,
    TimerTrigger,
    UNKNOWN_PARAMETER_DEFAULT,
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

pub const PIPELINE_ROOT: &str = "flow-definition";

const PIPELINE_TEMPLATE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<flow-definition plugin="workflow-job">
  <actions>
    <org.jenkinsci.plugins.pipeline.modeldefinition.actions.DeclarativeJobAction plugin="pipeline-model-definition"/>
    <org.jenkinsci.plugins.pipeline.modeldefinition.actions.DeclarativeJobPropertyTrackerAction plugin="pipeline-model-definition">
      <jobProperties/>
      <triggers/>
      <parameters/>
      <options/>
    </org.jenkinsci.plugins.pipeline.modeldefinition.actions.DeclarativeJobPropertyTrackerAction>
  </actions>
</flow-definition>"#;

const DISABLE_CONCURRENT_PROPERTY: &str =
    "org.jenkinsci.plugins.workflow.job.properties.DisableConcurrentBuildsJobProperty";
const BUILD_DISCARDER_PROPERTY: &str = "jenkins.model.BuildDiscarderProperty";
const LOG_ROTATOR_CLASS: &str = "hudson.tasks.LogRotator";
const PARAMETERS_PROPERTY: &str = "hudson.model.ParametersDefinitionProperty";
const TRIGGERS_PROPERTY: &str =
    "org.jenkinsci.plugins.workflow.job.properties.PipelineTriggersJobProperty";
const TIMER_TRIGGER: &str = "hudson.triggers.TimerTrigger";
const CPS_FLOW_DEFINITION: &str = "org.jenkinsci.plugins.workflow.cps.CpsFlowDefinition";

/// Renders a pipeline as a Jenkins job config
pub fn encode_pipeline(pipeline: &Pipeline) -> CodecResult<String> {
    let mut doc = Document::parse(PIPELINE_TEMPLATE)?;
    let flow = doc
        .select_root_mut(PIPELINE_ROOT)
        .ok_or(CodecError::MissingPipelineDefinition)?;

    flow.create_element("description")
        .set_text(&pipeline.description);

    let properties = flow.create_element("properties");
    if pipeline.disable_concurrent {
        properties.create_element(DISABLE_CONCURRENT_PROPERTY);
    }
    if let Some(discarder) = &pipeline.discarder {
        let strategy = properties
            .create_element(BUILD_DISCARDER_PROPERTY)
            .create_element("strategy");
        strategy.set_attr("class", LOG_ROTATOR_CLASS);
        strategy
            .create_element("daysToKeep")
            .set_text(&discarder.days_to_keep);
        strategy
            .create_element("numToKeep")
            .set_text(&discarder.num_to_keep);
        strategy.create_element("artifactDaysToKeep").set_text("-1");
        strategy.create_element("artifactNumToKeep").set_text("-1");
    }
    if !pipeline.parameters.is_empty() {
        let definitions = properties
            .create_element(PARAMETERS_PROPERTY)
            .create_element("parameterDefinitions");
        for parameter in &pipeline.parameters {
            encode_parameter(definitions, parameter)?;
        }
    }
    if let Some(timer) = &pipeline.timer_trigger {
        properties
            .create_element(TRIGGERS_PROPERTY)
            .create_element("triggers")
            .create_element(TIMER_TRIGGER)
            .create_element("spec")
            .set_text(&timer.cron);
    }

    let definition = flow.create_element("definition");
    definition
        .set_attr("class", CPS_FLOW_DEFINITION)
        .set_attr("plugin", "workflow-cps");
    definition.create_element("script").set_text(&pipeline.script);
    definition.create_element("sandbox").set_text("true");

    flow.create_element("triggers");
    if let Some(remote) = &pipeline.remote_trigger {
        flow.create_element("authToken").set_text(&remote.token);
    }
    flow.create_element("disabled").set_text("false");

    let xml = doc.to_xml_string()?;
    Ok(rewrite_declared_version(
        &xml,
        WORKING_XML_VERSION,
        JENKINS_XML_VERSION,
    ))
}

/// Class names of parameters this codec does not model are written back as
/// the element name, so they must at least be valid XML names.
fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => chars
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')),
        _ => false,
    }
}

fn encode_parameter(definitions: &mut Element, parameter: &Parameter) -> CodecResult<()> {
    let class_name = match &parameter.parameter_type {
        ParameterType::Known(kind) => kind.class_name(),
        ParameterType::Unknown(class_name) if is_element_name(class_name) => class_name.as_str(),
        ParameterType::Unknown(class_name) => {
            return Err(CodecError::InvalidParameterType(class_name.clone()))
        }
    };

    let define = definitions.create_element(class_name);
    define.create_element("name").set_text(&parameter.name);
    define
        .create_element("description")
        .set_text(&parameter.description);

    match parameter.parameter_type.kind() {
        Some(ParameterKind::Choice) => {
            let choices = define.create_element("choices");
            choices.set_attr("class", "java.util.Arrays$ArrayList");
            let array = choices.create_element("a");
            array.set_attr("class", "string-array");
            for choice in parameter.default_value.split('\n') {
                array.create_element("string").set_text(choice);
            }
        }
        Some(ParameterKind::File) | None => {}
        Some(_) => {
            define
                .create_element("defaultValue")
                .set_text(&parameter.default_value);
        }
    }
    Ok(())
}

/// Reads a Jenkins job config back into a pipeline. The returned name is
/// empty; job configs do not carry their own name.
pub fn decode_pipeline(xml: &str) -> CodecResult<Pipeline> {
    let xml = rewrite_declared_version(xml, JENKINS_XML_VERSION, WORKING_XML_VERSION);
    let doc = Document::parse(&xml)?;
    let flow = doc
        .select_root(PIPELINE_ROOT)
        .ok_or(CodecError::MissingPipelineDefinition)?;

    let mut pipeline = Pipeline {
        description: flow.child_text("description"),
        ..Default::default()
    };

    if let Some(properties) = flow.select_element("properties") {
        pipeline.disable_concurrent = properties
            .select_element(DISABLE_CONCURRENT_PROPERTY)
            .is_some();

        if let Some(discarder) = properties.select_element(BUILD_DISCARDER_PROPERTY) {
            pipeline.discarder = Some(match discarder.select_element("strategy") {
                Some(strategy) => DiscarderProperty {
                    days_to_keep: strategy.child_text("daysToKeep"),
                    num_to_keep: strategy.child_text("numToKeep"),
                },
                None => DiscarderProperty::default(),
            });
        }

        if let Some(definitions) =
            properties.select_path(&[PARAMETERS_PROPERTY, "parameterDefinitions"])
        {
            pipeline.parameters = definitions
                .child_elements()
                .iter()
                .map(decode_parameter)
                .collect();
        }

        if let Some(timer) =
            properties.select_path(&[TRIGGERS_PROPERTY, "triggers", TIMER_TRIGGER])
        {
            pipeline.timer_trigger = Some(TimerTrigger {
                cron: timer.child_text("spec"),
                ..Default::default()
            });
        }
    }

    if let Some(token) = flow.select_element("authToken") {
        pipeline.remote_trigger = Some(RemoteTrigger {
            token: token.text().to_string(),
        });
    }
    if let Some(script) = flow.select_path(&["definition", "script"]) {
        pipeline.script = script.text().to_string();
    }

    Ok(pipeline)
}

/// Parameters of unknown classes degrade to a placeholder instead of failing
/// the whole document; plugins add parameter kinds faster than we model them.
fn decode_parameter(define: &Element) -> Parameter {
    let name = define.child_text("name");
    let description = define.child_text("description");

    let Some(kind) = ParameterKind::from_class_name(define.tag()) else {
        tracing::debug!(class = define.tag(), "Unknown parameter class");
        return Parameter {
            name,
            default_value: UNKNOWN_PARAMETER_DEFAULT.to_string(),
            parameter_type: ParameterType::Unknown(define.tag().to_string()),
            description,
        };
    };

    let default_value = match kind {
        ParameterKind::Choice => define
            .select_path(&["choices", "a"])
            .map(|array| {
                array
                    .select_elements("string")
                    .map(Element::text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default(),
        ParameterKind::File => String::new(),
        _ => define.child_text("defaultValue"),
    };

    Parameter {
        name,
        default_value,
        parameter_type: kind.into(),
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter(name: &str, kind: ParameterKind, default_value: &str) -> Parameter {
        Parameter {
            name: name.to_string(),
            default_value: default_value.to_string(),
            parameter_type: kind.into(),
            description: format!("{name} parameter"),
        }
    }

    fn full_pipeline() -> Pipeline {
        Pipeline {
            name: String::new(),
            description: "for test".to_string(),
            discarder: Some(DiscarderProperty {
                days_to_keep: "3".to_string(),
                num_to_keep: "5".to_string(),
            }),
            parameters: vec![
                parameter("branch", ParameterKind::String, "master"),
                parameter("env", ParameterKind::Choice, "dev\nstaging\nprod"),
                parameter("notes", ParameterKind::Text, "line one\nline two"),
                parameter("verbose", ParameterKind::Boolean, "true"),
                parameter("artifact", ParameterKind::File, ""),
                parameter("secret", ParameterKind::Password, "hunter2"),
            ],
            disable_concurrent: true,
            timer_trigger: Some(TimerTrigger {
                cron: "H H * * *".to_string(),
                interval: String::new(),
            }),
            remote_trigger: Some(RemoteTrigger {
                token: "abc".to_string(),
            }),
            script: "pipeline {\n  agent any\n  stages {\n    stage('a') { steps { sh 'echo \"<ok>\" && exit 0' } }\n  }\n}".to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let pipeline = full_pipeline();
        let xml = encode_pipeline(&pipeline).unwrap();
        assert_eq!(decode_pipeline(&xml).unwrap(), pipeline);
    }

    #[test]
    fn test_minimal_round_trip() {
        let pipeline = Pipeline {
            script: "node {}".to_string(),
            ..Default::default()
        };
        let xml = encode_pipeline(&pipeline).unwrap();
        assert_eq!(decode_pipeline(&xml).unwrap(), pipeline);
    }

    #[test]
    fn test_encoded_document_shape() {
        let xml = encode_pipeline(&full_pipeline()).unwrap();
        assert_eq!(xml.lines().next(), Some("<?xml version='1.1' encoding='UTF-8'?>"));

        let doc = Document::parse(&xml).unwrap();
        let flow = doc.select_root(PIPELINE_ROOT).unwrap();
        assert_eq!(flow.attr("plugin"), Some("workflow-job"));

        let tags: Vec<&str> = flow.child_elements().iter().map(Element::tag).collect();
        assert_eq!(
            tags,
            [
                "actions",
                "description",
                "properties",
                "definition",
                "triggers",
                "authToken",
                "disabled"
            ]
        );

        let strategy = flow
            .select_path(&["properties", BUILD_DISCARDER_PROPERTY, "strategy"])
            .unwrap();
        assert_eq!(strategy.attr("class"), Some(LOG_ROTATOR_CLASS));
        assert_eq!(strategy.child_text("artifactDaysToKeep"), "-1");
        assert_eq!(strategy.child_text("artifactNumToKeep"), "-1");

        let definition = flow.select_element("definition").unwrap();
        assert_eq!(definition.attr("class"), Some(CPS_FLOW_DEFINITION));
        assert_eq!(definition.child_text("sandbox"), "true");
        assert_eq!(flow.child_text("disabled"), "false");

        let file = flow
            .select_path(&[
                "properties",
                PARAMETERS_PROPERTY,
                "parameterDefinitions",
                "hudson.model.FileParameterDefinition",
            ])
            .unwrap();
        assert!(file.select_element("defaultValue").is_none());
    }

    #[test]
    fn test_absent_blocks_are_not_emitted() {
        let xml = encode_pipeline(&Pipeline::default()).unwrap();
        let doc = Document::parse(&xml).unwrap();
        let flow = doc.root();

        assert!(flow
            .select_element("properties")
            .unwrap()
            .child_elements()
            .is_empty());
        assert!(flow.select_element("authToken").is_none());
    }

    #[test]
    fn test_empty_discarder_values_are_preserved() {
        let pipeline = Pipeline {
            discarder: Some(DiscarderProperty {
                days_to_keep: String::new(),
                num_to_keep: "10".to_string(),
            }),
            ..Default::default()
        };
        let decoded = decode_pipeline(&encode_pipeline(&pipeline).unwrap()).unwrap();
        assert_eq!(decoded.discarder, pipeline.discarder);
    }

    #[test]
    fn test_choice_order_is_preserved() {
        let pipeline = Pipeline {
            parameters: vec![parameter("env", ParameterKind::Choice, "a\nb\nc")],
            ..Default::default()
        };
        let xml = encode_pipeline(&pipeline).unwrap();

        let doc = Document::parse(&xml).unwrap();
        let array = doc
            .root()
            .select_path(&[
                "properties",
                PARAMETERS_PROPERTY,
                "parameterDefinitions",
                "hudson.model.ChoiceParameterDefinition",
                "choices",
                "a",
            ])
            .unwrap();
        let choices: Vec<&str> = array.select_elements("string").map(Element::text).collect();
        assert_eq!(choices, ["a", "b", "c"]);

        let decoded = decode_pipeline(&xml).unwrap();
        assert_eq!(decoded.parameters[0].default_value, "a\nb\nc");
    }

    #[test]
    fn test_password_default_is_read_from_default_value() {
        let xml = r#"<?xml version='1.1' encoding='UTF-8'?>
<flow-definition plugin="workflow-job">
  <properties>
    <hudson.model.ParametersDefinitionProperty>
      <parameterDefinitions>
        <hudson.model.PasswordParameterDefinition>
          <name>token</name>
          <description></description>
          <defaultValue>s3cret</defaultValue>
        </hudson.model.PasswordParameterDefinition>
      </parameterDefinitions>
    </hudson.model.ParametersDefinitionProperty>
  </properties>
</flow-definition>"#;

        let pipeline = decode_pipeline(xml).unwrap();
        assert_eq!(pipeline.parameters[0].default_value, "s3cret");
    }

    #[test]
    fn test_unknown_parameter_degrades() {
        let xml = r#"<?xml version='1.1' encoding='UTF-8'?>
<flow-definition plugin="workflow-job">
  <description>weird</description>
  <properties>
    <hudson.model.ParametersDefinitionProperty>
      <parameterDefinitions>
        <com.example.WeirdParam>
          <name>x</name>
          <description>d</description>
          <weirdness>11</weirdness>
        </com.example.WeirdParam>
      </parameterDefinitions>
    </hudson.model.ParametersDefinitionProperty>
  </properties>
  <definition class="org.jenkinsci.plugins.workflow.cps.CpsFlowDefinition" plugin="workflow-cps">
    <script>node {}</script>
    <sandbox>true</sandbox>
  </definition>
</flow-definition>"#;

        let pipeline = decode_pipeline(xml).unwrap();
        assert_eq!(pipeline.description, "weird");
        assert_eq!(pipeline.script, "node {}");
        assert_eq!(
            pipeline.parameters,
            vec![Parameter {
                name: "x".to_string(),
                default_value: "unknown".to_string(),
                parameter_type: ParameterType::Unknown("com.example.WeirdParam".to_string()),
                description: "d".to_string(),
            }]
        );

        let reencoded = encode_pipeline(&pipeline).unwrap();
        let doc = Document::parse(&reencoded).unwrap();
        let weird = doc
            .root()
            .select_path(&[
                "properties",
                PARAMETERS_PROPERTY,
                "parameterDefinitions",
                "com.example.WeirdParam",
            ])
            .unwrap();
        let tags: Vec<&str> = weird.child_elements().iter().map(Element::tag).collect();
        assert_eq!(tags, ["name", "description"]);
    }

    #[test]
    fn test_unknown_parameter_type_must_be_an_element_name() {
        let pipeline = Pipeline {
            parameters: vec![Parameter {
                name: "x".to_string(),
                default_value: String::new(),
                parameter_type: ParameterType::Unknown("not a class".to_string()),
                description: String::new(),
            }],
            ..Default::default()
        };
        assert_eq!(
            encode_pipeline(&pipeline),
            Err(CodecError::InvalidParameterType("not a class".to_string()))
        );
    }

    #[test]
    fn test_decode_requires_flow_definition() {
        assert_eq!(
            decode_pipeline("<?xml version='1.1' encoding='UTF-8'?>\n<project/>"),
            Err(CodecError::MissingPipelineDefinition)
        );
    }

    #[test]
    fn test_decode_rejects_malformed_xml() {
        assert!(matches!(
            decode_pipeline("<flow-definition><description></flow-definition>"),
            Err(CodecError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_decode_accepts_undeclared_version() {
        let pipeline = decode_pipeline(
            "<flow-definition><description>old</description><authToken>t</authToken></flow-definition>",
        )
        .unwrap();
        assert_eq!(pipeline.description, "old");
        assert_eq!(pipeline.remote_trigger.unwrap().token, "t");
    }
}
