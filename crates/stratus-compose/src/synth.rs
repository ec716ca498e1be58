//! Synthesis: dependency resolution and reference substitution.
//!
//! Builds one dependency graph across every unit of an application, orders it,
//! and renders one [`UnitDocument`] per selected unit. References become
//! deferred tokens; no runtime value is ever computed here.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use stratus_common::config::OutputFormat;
use stratus_common::error::{Result, StratusError};

use crate::app::ApplicationRoot;
use crate::graph::{DependencyGraph, NodeKey};
use crate::resource::{Category, ResourceDescriptor, ResourceKind};
use crate::value::Value;

/// The synthesized description of one unit, handed to the provisioning engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDocument {
    /// Unit name.
    pub unit: String,
    /// Units this unit imports.
    pub imports: Vec<String>,
    /// Resources in dependency order.
    pub resources: Vec<SynthesizedResource>,
    /// Outputs keyed by name.
    pub outputs: BTreeMap<String, SynthesizedOutput>,
}

/// One resource in a [`UnitDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedResource {
    /// Identifier within the unit.
    pub id: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Family of the kind.
    pub category: Category,
    /// Direct dependencies, sorted; cross-unit entries are written `unit::identifier`.
    pub depends_on: Vec<String>,
    /// Configuration with every reference replaced by its deferred token.
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// One output in a [`UnitDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedOutput {
    /// Deferred token of the exposed attribute.
    pub value: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UnitDocument {
    /// Serializes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serializes the document in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Yaml => self.to_yaml(),
        }
    }

    /// Looks up a resource by identifier.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&SynthesizedResource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Position of a resource in the dependency order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.id == id)
    }
}

/// Renders several documents as one stream.
///
/// JSON produces a single array; YAML produces `---`-separated documents.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_documents(documents: &[UnitDocument], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(documents)?),
        OutputFormat::Yaml => Ok(documents
            .iter()
            .map(UnitDocument::to_yaml)
            .collect::<Result<Vec<_>>>()?
            .join("---\n")),
    }
}

/// Synthesizes `app`, optionally restricted to the units named in `filter`.
///
/// The whole application is always validated, so a cycle through an
/// unselected unit still fails. Documents come back in definition order.
///
/// # Errors
///
/// - [`StratusError::UnknownUnit`] if `filter` names an unknown unit.
/// - [`StratusError::CyclicDependency`] if the reference graph has a cycle.
/// - [`StratusError::Config`] if a configuration holds a non-finite float.
pub fn synthesize(app: &ApplicationRoot, filter: Option<&[&str]>) -> Result<Vec<UnitDocument>> {
    if let Some(names) = filter {
        if let Some(missing) = names.iter().find(|n| app.unit(n).is_none()) {
            return Err(StratusError::UnknownUnit {
                name: (*missing).to_owned(),
            });
        }
    }
    tracing::info!(units = app.units().len(), "synthesizing application");

    let order = build_graph(app)?.resolve_order()?;

    let mut documents = Vec::new();
    for unit in app.units() {
        if filter.is_some_and(|names| !names.contains(&unit.name())) {
            continue;
        }
        let by_id: HashMap<&str, &ResourceDescriptor> = unit
            .resources()
            .iter()
            .map(|r| (r.identifier(), r))
            .collect();

        let mut resources = Vec::with_capacity(by_id.len());
        for key in order.iter().filter(|k| k.unit == unit.name()) {
            if let Some(resource) = by_id.get(key.identifier.as_str()) {
                resources.push(render_resource(unit.name(), resource)?);
            }
        }

        let outputs = unit
            .outputs()
            .iter()
            .map(|(name, output)| {
                (
                    name.clone(),
                    SynthesizedOutput {
                        value: output.reference().token(unit.name()),
                        description: output.description().map(str::to_owned),
                    },
                )
            })
            .collect();

        tracing::info!(unit = unit.name(), resources = resources.len(), "unit synthesized");
        documents.push(UnitDocument {
            unit: unit.name().to_owned(),
            imports: unit.imports().to_vec(),
            resources,
            outputs,
        });
    }

    Ok(documents)
}

/// Adds every resource of every unit as a node, then an edge for each
/// reference and explicit dependency.
fn build_graph(app: &ApplicationRoot) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new();
    let mut nodes = HashMap::new();

    for unit in app.units() {
        for resource in unit.resources() {
            let key = NodeKey::new(unit.name(), resource.identifier());
            let idx = graph.add_resource(key.clone());
            let _ = nodes.insert(key, idx);
        }
    }

    for unit in app.units() {
        for resource in unit.resources() {
            let dependent = NodeKey::new(unit.name(), resource.identifier());
            for target in direct_dependencies(unit.name(), resource) {
                match (nodes.get(&dependent), nodes.get(&target)) {
                    (Some(&from), Some(&to)) => graph.add_dependency(from, to),
                    _ => {
                        return Err(StratusError::UnknownIdentifier {
                            unit: target.unit,
                            identifier: target.identifier,
                        });
                    }
                }
            }
        }
    }

    tracing::debug!(resources = graph.len(), "dependency graph built");
    Ok(graph)
}

fn direct_dependencies(unit: &str, resource: &ResourceDescriptor) -> BTreeSet<NodeKey> {
    let mut targets: BTreeSet<NodeKey> = resource
        .properties()
        .references()
        .into_iter()
        .map(|r| NodeKey::new(r.unit(), r.identifier()))
        .collect();
    targets.extend(
        resource
            .depends_on()
            .iter()
            .map(|id| NodeKey::new(unit, id.as_str())),
    );
    targets
}

fn render_resource(unit: &str, resource: &ResourceDescriptor) -> Result<SynthesizedResource> {
    let depends_on = direct_dependencies(unit, resource)
        .into_iter()
        .map(|key| {
            if key.unit == unit {
                key.identifier
            } else {
                format!("{}::{}", key.unit, key.identifier)
            }
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut properties = BTreeMap::new();
    for (key, value) in resource.properties().iter() {
        let rendered = render_value(unit, resource.identifier(), key, value)?;
        let _ = properties.insert(key.clone(), rendered);
    }

    Ok(SynthesizedResource {
        id: resource.identifier().to_owned(),
        kind: resource.kind(),
        category: resource.kind().category(),
        depends_on,
        properties,
    })
}

fn render_value(unit: &str, identifier: &str, key: &str, value: &Value) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| StratusError::Config {
                message: format!(
                    "property \"{key}\" of \"{identifier}\" in unit \"{unit}\" is not a finite number"
                ),
            })?,
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| render_value(unit, identifier, key, item))
                .collect::<Result<_>>()?,
        ),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| render_value(unit, identifier, key, v).map(|rendered| (k.clone(), rendered)))
                .collect::<Result<_>>()?,
        ),
        Value::Ref(reference) => serde_json::Value::String(reference.token(unit)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Properties;

    fn net_app() -> ApplicationRoot {
        let mut app = ApplicationRoot::new();
        app.define("Net", |unit| {
            let srv_placeholder = Properties::new()
                .with("instanceType", "t2.micro")
                .with("machineImage", "amazon-linux-2");
            let vpc = unit.declare(ResourceKind::Vpc, "vpc1", Properties::new())?;
            let _ = unit.declare(
                ResourceKind::Instance,
                "srv1",
                srv_placeholder.with("vpc", vpc.attr("id")?),
            )?;
            unit.add_output("VpcId", vpc.attr("id")?)?;
            Ok(())
        })
        .expect("define Net");
        app
    }

    #[test]
    fn references_become_local_tokens() {
        let docs = net_app().synth().expect("synth");
        let srv = docs[0].resource("srv1").expect("srv1");
        assert_eq!(
            srv.properties.get("vpc"),
            Some(&serde_json::Value::String("${vpc1.id}".into()))
        );
        assert_eq!(srv.depends_on, vec!["vpc1"]);
        assert_eq!(docs[0].outputs["VpcId"].value, "${vpc1.id}");
    }

    #[test]
    fn dependency_precedes_dependent() {
        let docs = net_app().synth().expect("synth");
        let vpc = docs[0].position("vpc1").expect("vpc1");
        let srv = docs[0].position("srv1").expect("srv1");
        assert!(vpc < srv);
    }

    #[test]
    fn rendered_stream_parses_as_every_document() {
        let mut app = net_app();
        app.define("Edge", |unit| {
            let _ = unit.declare(ResourceKind::Bucket, "assets", Properties::new())?;
            Ok(())
        })
        .expect("define Edge");
        let docs = app.synth().expect("synth");

        let json = render_documents(&docs, OutputFormat::Json).expect("json");
        let parsed: Vec<UnitDocument> = serde_json::from_str(&json).expect("parse json");
        assert_eq!(parsed, docs);

        let yaml = render_documents(&docs, OutputFormat::Yaml).expect("yaml");
        assert_eq!(serde_yaml::Deserializer::from_str(&yaml).count(), 2);
    }

    #[test]
    fn unknown_unit_in_filter_fails() {
        let err = net_app().synth_units(&["Nope"]).unwrap_err();
        assert!(
            matches!(err, StratusError::UnknownUnit { ref name } if name == "Nope"),
            "got: {err}"
        );
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let mut app = ApplicationRoot::new();
        app.define("Bad", |unit| {
            let _ = unit.declare(
                ResourceKind::Bucket,
                "Bucket",
                Properties::new().with("ratio", f64::NAN),
            )?;
            Ok(())
        })
        .expect("define");
        let msg = app.synth().unwrap_err().to_string();
        assert!(msg.contains("not a finite number"), "got: {msg}");
    }

    #[test]
    fn explicit_dependency_orders_without_reference() {
        let mut app = ApplicationRoot::new();
        app.define("Store", |unit| {
            let _ = unit.declare(ResourceKind::Bucket, "Logs", Properties::new())?;
            let _ = unit.declare(ResourceKind::Bucket, "Data", Properties::new())?;
            unit.depend_on("Logs", "Data")?;
            Ok(())
        })
        .expect("define");
        let docs = app.synth().expect("synth");
        let ids: Vec<_> = docs[0].resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Data", "Logs"]);
        assert_eq!(docs[0].resources[1].depends_on, vec!["Data"]);
    }

    #[test]
    fn yaml_rendering_contains_tokens() {
        let docs = net_app().synth().expect("synth");
        let yaml = docs[0].render(OutputFormat::Yaml).expect("yaml");
        assert!(yaml.contains("${vpc1.id}"), "got: {yaml}");
        assert!(yaml.contains("unit: Net"), "got: {yaml}");
    }
}
