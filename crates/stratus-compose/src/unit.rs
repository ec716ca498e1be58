//! Composite unit construction.
//!
//! A [`UnitBuilder`] accumulates resource declarations, references, and outputs
//! for one deployable unit. Every check runs at the moment a declaration is made,
//! so an invalid unit never reaches synthesis. [`UnitBuilder::finish`] freezes the
//! result into an immutable [`CompositeUnit`].

use std::collections::{BTreeMap, HashMap};

use stratus_common::error::{Result, StratusError};

use crate::app::ApplicationRoot;
use crate::resource::{ResourceDescriptor, ResourceKind};
use crate::value::{Properties, Reference, Value};

/// Checks that a unit name, resource identifier, or output name is well formed.
///
/// Names must be non-empty ASCII alphanumerics, `-`, or `_`, which keeps
/// deferred tokens and qualified identifiers unambiguous.
///
/// # Errors
///
/// Returns a configuration error naming `what` if the name is malformed.
pub fn validate_name(what: &str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StratusError::Config {
            message: format!(
                "invalid {what} \"{name}\": use ASCII letters, digits, '-' or '_'"
            ),
        })
    }
}

/// Lightweight handle to a declared resource.
///
/// Returned by [`UnitBuilder::declare`]; use [`ResourceHandle::attr`] to point
/// another resource's configuration at one of its runtime attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    unit: String,
    identifier: String,
    kind: ResourceKind,
}

impl ResourceHandle {
    /// Unit owning the resource.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Identifier of the resource.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Kind of the resource.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Creates a reference to one of the resource's runtime attributes.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidAttributeAccess`] if the resource kind
    /// does not expose `attribute`.
    pub fn attr(&self, attribute: &str) -> Result<Reference> {
        if !self.kind.has_attribute(attribute) {
            return Err(StratusError::InvalidAttributeAccess {
                unit: self.unit.clone(),
                identifier: self.identifier.clone(),
                kind: self.kind.to_string(),
                attribute: attribute.to_owned(),
            });
        }
        Ok(Reference::new(&self.unit, &self.identifier, attribute))
    }
}

/// A named value a unit exposes to the outside world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    reference: Reference,
    description: Option<String>,
}

impl Output {
    /// Creates an output exposing `reference`.
    #[must_use]
    pub const fn new(reference: Reference) -> Self {
        Self {
            reference,
            description: None,
        }
    }

    /// Attaches a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The exposed reference.
    #[must_use]
    pub const fn reference(&self) -> &Reference {
        &self.reference
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl From<Reference> for Output {
    fn from(reference: Reference) -> Self {
        Self::new(reference)
    }
}

/// A finished, immutable deployable unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeUnit {
    name: String,
    resources: Vec<ResourceDescriptor>,
    outputs: BTreeMap<String, Output>,
    imports: Vec<String>,
}

impl CompositeUnit {
    /// Unit name, unique within its application.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resources in declaration order.
    #[must_use]
    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    /// Looks up a resource by identifier.
    #[must_use]
    pub fn resource(&self, identifier: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.identifier == identifier)
    }

    /// Outputs keyed by name.
    #[must_use]
    pub const fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    /// Names of the units this unit imports, in import order.
    #[must_use]
    pub fn imports(&self) -> &[String] {
        &self.imports
    }
}

/// Accumulates the declarations of one unit.
#[derive(Debug)]
pub struct UnitBuilder<'app> {
    app: &'app ApplicationRoot,
    name: String,
    resources: Vec<ResourceDescriptor>,
    index: HashMap<String, usize>,
    outputs: BTreeMap<String, Output>,
    imports: Vec<String>,
}

impl<'app> UnitBuilder<'app> {
    /// Starts a new unit inside `app`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed or already used in `app`.
    pub fn new(app: &'app ApplicationRoot, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name("unit name", &name)?;
        if app.unit(&name).is_some() {
            return Err(StratusError::DuplicateUnitName { name });
        }
        tracing::info!(unit = %name, "defining unit");
        Ok(Self {
            app,
            name,
            resources: Vec::new(),
            index: HashMap::new(),
            outputs: BTreeMap::new(),
            imports: Vec::new(),
        })
    }

    /// Name of the unit being built.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a resource.
    ///
    /// The kind's documented defaults are merged under `configuration`; keys
    /// supplied explicitly always win.
    ///
    /// # Errors
    ///
    /// - [`StratusError::DuplicateIdentifier`] if `identifier` is taken in this unit.
    /// - [`StratusError::Config`] if the identifier is malformed or a required
    ///   key is still missing after defaults.
    /// - Any error from validating a reference inside `configuration`.
    pub fn declare(
        &mut self,
        kind: ResourceKind,
        identifier: impl Into<String>,
        configuration: Properties,
    ) -> Result<ResourceHandle> {
        let identifier = identifier.into();
        validate_name("resource identifier", &identifier)?;
        if self.index.contains_key(&identifier) {
            return Err(StratusError::DuplicateIdentifier {
                unit: self.name.clone(),
                identifier,
            });
        }
        for reference in configuration.references() {
            self.check_reference(reference)?;
        }

        let mut properties = kind.defaults();
        for (key, value) in configuration {
            let _ = properties.insert(key, value);
        }
        self.check_required(kind, &identifier, &properties)?;

        tracing::debug!(unit = %self.name, identifier = %identifier, %kind, "declared resource");
        let _ = self.index.insert(identifier.clone(), self.resources.len());
        self.resources.push(ResourceDescriptor {
            kind,
            identifier: identifier.clone(),
            properties,
            depends_on: Vec::new(),
        });

        Ok(ResourceHandle {
            unit: self.name.clone(),
            identifier,
            kind,
        })
    }

    /// Returns a handle to a resource declared in this unit.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::UnknownIdentifier`] if it was never declared.
    pub fn resource(&self, identifier: &str) -> Result<ResourceHandle> {
        let idx = self.position(identifier)?;
        Ok(ResourceHandle {
            unit: self.name.clone(),
            identifier: identifier.to_owned(),
            kind: self.resources[idx].kind,
        })
    }

    /// Creates a reference to an attribute of a resource declared in this unit.
    ///
    /// # Errors
    ///
    /// - [`StratusError::UnknownIdentifier`] if `identifier` was never declared.
    /// - [`StratusError::InvalidAttributeAccess`] if its kind lacks `attribute`.
    pub fn reference(&self, identifier: &str, attribute: &str) -> Result<Reference> {
        self.resource(identifier)?.attr(attribute)
    }

    /// Makes the resources of a previously defined unit referenceable.
    ///
    /// Importing the same unit twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::UnknownUnit`] if `app` has no such unit.
    pub fn import(&mut self, unit: &str) -> Result<()> {
        if self.app.unit(unit).is_none() {
            return Err(StratusError::UnknownUnit { name: unit.into() });
        }
        if !self.imports.iter().any(|i| i == unit) {
            tracing::info!(unit = %self.name, imported = unit, "importing unit");
            self.imports.push(unit.to_owned());
        }
        Ok(())
    }

    /// Returns a handle to a resource of an imported unit.
    ///
    /// # Errors
    ///
    /// - [`StratusError::UnknownUnit`] if `unit` was not imported.
    /// - [`StratusError::UnknownIdentifier`] if `unit` has no such resource.
    pub fn imported_resource(&self, unit: &str, identifier: &str) -> Result<ResourceHandle> {
        let resource = self.imported_descriptor(unit, identifier)?;
        Ok(ResourceHandle {
            unit: unit.to_owned(),
            identifier: identifier.to_owned(),
            kind: resource.kind,
        })
    }

    /// Creates a reference to an attribute of a resource in an imported unit.
    ///
    /// # Errors
    ///
    /// Same as [`UnitBuilder::imported_resource`], plus
    /// [`StratusError::InvalidAttributeAccess`] if the kind lacks `attribute`.
    pub fn reference_imported(
        &self,
        unit: &str,
        identifier: &str,
        attribute: &str,
    ) -> Result<Reference> {
        self.imported_resource(unit, identifier)?.attr(attribute)
    }

    /// Sets one configuration key of an already declared resource.
    ///
    /// The resource is left untouched when the call fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is unknown, `value` holds an invalid
    /// reference, or the change would unset a required key.
    pub fn configure(
        &mut self,
        identifier: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        for reference in value.references() {
            self.check_reference(reference)?;
        }
        let idx = self.position(identifier)?;
        let resource = &self.resources[idx];
        let mut properties = resource.properties.clone();
        let _ = properties.insert(key, value);
        self.check_required(resource.kind, identifier, &properties)?;
        self.resources[idx].properties = properties;
        Ok(())
    }

    /// Appends `value` to a list-valued configuration key, creating the list if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is unknown, `value` holds an invalid
    /// reference, or the key holds something other than a list.
    pub fn append(
        &mut self,
        identifier: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let value = value.into();
        for reference in value.references() {
            self.check_reference(reference)?;
        }
        let idx = self.position(identifier)?;
        let unit = &self.name;
        let properties = &mut self.resources[idx].properties;
        match properties.get_mut(key) {
            None | Some(Value::Null) => {
                let _ = properties.insert(key, Value::List(vec![value]));
            }
            Some(Value::List(items)) => items.push(value),
            Some(_) => {
                return Err(StratusError::Config {
                    message: format!(
                        "property \"{key}\" of \"{identifier}\" in unit \"{unit}\" is not a list"
                    ),
                });
            }
        }
        // Appending can only create or grow a list, so a required key stays set.
        Ok(())
    }

    /// Orders `identifier` after `dependency` without a configuration reference.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::UnknownIdentifier`] if either resource is unknown.
    pub fn depend_on(&mut self, identifier: &str, dependency: &str) -> Result<()> {
        let _ = self.position(dependency)?;
        let idx = self.position(identifier)?;
        let depends_on = &mut self.resources[idx].depends_on;
        if !depends_on.iter().any(|d| d == dependency) {
            depends_on.push(dependency.to_owned());
        }
        Ok(())
    }

    /// Registers a named output.
    ///
    /// # Errors
    ///
    /// - [`StratusError::DuplicateOutputName`] if `name` is already registered.
    /// - [`StratusError::Config`] if `name` is malformed.
    /// - Any error from validating the output's reference.
    pub fn add_output(&mut self, name: impl Into<String>, output: impl Into<Output>) -> Result<()> {
        let name = name.into();
        let output = output.into();
        validate_name("output name", &name)?;
        if self.outputs.contains_key(&name) {
            return Err(StratusError::DuplicateOutputName {
                unit: self.name.clone(),
                name,
            });
        }
        self.check_reference(output.reference())?;
        let _ = self.outputs.insert(name, output);
        Ok(())
    }

    /// Freezes the unit.
    #[must_use]
    pub fn finish(self) -> CompositeUnit {
        tracing::info!(
            unit = %self.name,
            resources = self.resources.len(),
            outputs = self.outputs.len(),
            "unit defined"
        );
        CompositeUnit {
            name: self.name,
            resources: self.resources,
            outputs: self.outputs,
            imports: self.imports,
        }
    }

    fn position(&self, identifier: &str) -> Result<usize> {
        self.index
            .get(identifier)
            .copied()
            .ok_or_else(|| StratusError::UnknownIdentifier {
                unit: self.name.clone(),
                identifier: identifier.to_owned(),
            })
    }

    fn imported_descriptor(&self, unit: &str, identifier: &str) -> Result<&'app ResourceDescriptor> {
        if !self.imports.iter().any(|i| i == unit) {
            return Err(StratusError::UnknownUnit { name: unit.into() });
        }
        self.app
            .unit(unit)
            .and_then(|u| u.resource(identifier))
            .ok_or_else(|| StratusError::UnknownIdentifier {
                unit: unit.to_owned(),
                identifier: identifier.to_owned(),
            })
    }

    fn check_required(
        &self,
        kind: ResourceKind,
        identifier: &str,
        properties: &Properties,
    ) -> Result<()> {
        for key in kind.required_keys() {
            if matches!(properties.get(key), None | Some(Value::Null)) {
                return Err(StratusError::Config {
                    message: format!(
                        "{kind} \"{identifier}\" in unit \"{}\" is missing required property \"{key}\"",
                        self.name
                    ),
                });
            }
        }
        Ok(())
    }

    /// References are built from validated handles, but a handle can outlive
    /// its builder, so every reference is checked again against this unit's scope.
    fn check_reference(&self, reference: &Reference) -> Result<()> {
        let kind = if reference.unit() == self.name {
            self.resources[self.position(reference.identifier())?].kind
        } else {
            self.imported_descriptor(reference.unit(), reference.identifier())?
                .kind
        };
        if kind.has_attribute(reference.attribute()) {
            Ok(())
        } else {
            Err(StratusError::InvalidAttributeAccess {
                unit: reference.unit().to_owned(),
                identifier: reference.identifier().to_owned(),
                kind: kind.to_string(),
                attribute: reference.attribute().to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vpc_props() -> Properties {
        Properties::new().with("maxAzs", 2)
    }

    #[test]
    fn validate_name_accepts_letters_digits_dash_underscore() {
        assert!(validate_name("unit name", "My-Unit_2").is_ok());
    }

    #[test]
    fn validate_name_rejects_dots_and_empty() {
        assert!(validate_name("unit name", "").is_err());
        let msg = validate_name("resource identifier", "vpc.1")
            .unwrap_err()
            .to_string();
        assert!(msg.contains("invalid resource identifier \"vpc.1\""), "got: {msg}");
    }

    #[test]
    fn declare_merges_defaults_under_explicit_configuration() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let _ = unit
            .declare(ResourceKind::Vpc, "vpc1", vpc_props())
            .expect("declare");
        let built = unit.finish();
        let vpc = built.resource("vpc1").expect("vpc1");
        assert_eq!(vpc.properties().get("maxAzs").and_then(Value::as_i64), Some(2));
        assert_eq!(
            vpc.properties().get("cidr").and_then(Value::as_str),
            Some("10.0.0.0/16")
        );
    }

    #[test]
    fn duplicate_identifier_fails_regardless_of_kind() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let _ = unit
            .declare(ResourceKind::Vpc, "main", vpc_props())
            .expect("declare");
        let err = unit
            .declare(ResourceKind::Bucket, "main", Properties::new())
            .unwrap_err();
        assert!(
            matches!(err, StratusError::DuplicateIdentifier { ref unit, ref identifier }
                if unit == "Net" && identifier == "main"),
            "got: {err}"
        );
    }

    #[test]
    fn missing_required_property_fails() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Keys").expect("builder");
        let err = unit
            .declare(ResourceKind::KeyPair, "key", Properties::new())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing required property \"keyName\""), "got: {msg}");
    }

    #[test]
    fn reference_to_undeclared_identifier_fails() {
        let app = ApplicationRoot::new();
        let unit = UnitBuilder::new(&app, "Net").expect("builder");
        let err = unit.reference("ghost", "id").unwrap_err();
        assert!(
            matches!(err, StratusError::UnknownIdentifier { ref identifier, .. } if identifier == "ghost"),
            "got: {err}"
        );
    }

    #[test]
    fn reference_to_missing_attribute_fails_at_construction() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let vpc = unit
            .declare(ResourceKind::Vpc, "vpc1", vpc_props())
            .expect("declare");
        let err = vpc.attr("arn").unwrap_err();
        assert!(
            matches!(err, StratusError::InvalidAttributeAccess { ref attribute, .. } if attribute == "arn"),
            "got: {err}"
        );
        assert!(unit.reference("vpc1", "arn").is_err());
        assert!(unit.reference("vpc1", "id").is_ok());
    }

    #[test]
    fn duplicate_output_name_fails() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let vpc = unit
            .declare(ResourceKind::Vpc, "vpc1", vpc_props())
            .expect("declare");
        unit.add_output("VpcId", vpc.attr("id").expect("attr"))
            .expect("first output");
        let err = unit
            .add_output("VpcId", vpc.attr("cidrBlock").expect("attr"))
            .unwrap_err();
        assert!(
            matches!(err, StratusError::DuplicateOutputName { ref name, .. } if name == "VpcId"),
            "got: {err}"
        );
    }

    #[test]
    fn append_creates_then_extends_list() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let vpc = unit
            .declare(ResourceKind::Vpc, "vpc1", vpc_props())
            .expect("declare");
        let _ = unit
            .declare(
                ResourceKind::SecurityGroup,
                "sg",
                Properties::new().with("vpc", vpc.attr("id").expect("attr")),
            )
            .expect("declare sg");
        unit.append("sg", "ingressRules", Properties::new().with("port", 22))
            .expect("append");
        unit.append("sg", "ingressRules", Properties::new().with("port", 80))
            .expect("append");
        unit.append("sg", "tags", "web").expect("append new key");

        let built = unit.finish();
        let sg = built.resource("sg").expect("sg");
        let rules = sg.properties().get("ingressRules").and_then(Value::as_list);
        assert_eq!(rules.map(<[Value]>::len), Some(2));
        let tags = sg.properties().get("tags").and_then(Value::as_list);
        assert_eq!(tags.map(<[Value]>::len), Some(1));
    }

    #[test]
    fn configure_cannot_unset_required_property() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let vpc = unit
            .declare(ResourceKind::Vpc, "vpc1", vpc_props())
            .expect("declare");
        let _ = unit
            .declare(
                ResourceKind::SecurityGroup,
                "sg",
                Properties::new().with("vpc", vpc.attr("id").expect("attr")),
            )
            .expect("declare sg");

        let err = unit.configure("sg", "vpc", Value::Null).unwrap_err();
        assert!(matches!(err, StratusError::Config { .. }), "got: {err}");
        assert!(err.to_string().contains("missing required property \"vpc\""), "got: {err}");

        unit.configure("sg", "description", "web tier")
            .expect("optional key");
        let built = unit.finish();
        let sg = built.resource("sg").expect("sg");
        let kept = sg.properties().get("vpc").and_then(Value::as_reference);
        assert_eq!(kept.map(Reference::identifier), Some("vpc1"));
    }

    #[test]
    fn append_to_scalar_fails() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let _ = unit
            .declare(ResourceKind::Vpc, "vpc1", vpc_props())
            .expect("declare");
        let err = unit.append("vpc1", "maxAzs", 3).unwrap_err();
        assert!(err.to_string().contains("is not a list"), "got: {err}");
    }

    #[test]
    fn depend_on_requires_both_resources() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Net").expect("builder");
        let _ = unit
            .declare(ResourceKind::Vpc, "vpc1", vpc_props())
            .expect("declare");
        assert!(unit.depend_on("vpc1", "ghost").is_err());
        assert!(unit.depend_on("ghost", "vpc1").is_err());
    }

    #[test]
    fn import_of_unknown_unit_fails() {
        let app = ApplicationRoot::new();
        let mut unit = UnitBuilder::new(&app, "Web").expect("builder");
        let err = unit.import("Net").unwrap_err();
        assert!(
            matches!(err, StratusError::UnknownUnit { ref name } if name == "Net"),
            "got: {err}"
        );
    }

    #[test]
    fn reference_into_unimported_unit_is_rejected() {
        let mut app = ApplicationRoot::new();
        app.define("Net", |unit| {
            let _ = unit.declare(ResourceKind::Vpc, "vpc1", vpc_props())?;
            Ok(())
        })
        .expect("define Net");

        let mut web = UnitBuilder::new(&app, "Web").expect("builder");
        assert!(web.reference_imported("Net", "vpc1", "id").is_err());
        web.import("Net").expect("import");
        let vpc_id = web.reference_imported("Net", "vpc1", "id").expect("reference");
        assert_eq!(vpc_id.token("Web"), "${Net::vpc1.id}");
    }

    #[test]
    fn foreign_reference_fails_in_declare() {
        let mut app = ApplicationRoot::new();
        app.define("Net", |unit| {
            let _ = unit.declare(ResourceKind::Vpc, "vpc1", vpc_props())?;
            Ok(())
        })
        .expect("define Net");

        let mut net_builder = UnitBuilder::new(&app, "Other").expect("builder");
        let vpc = net_builder
            .declare(ResourceKind::Vpc, "vpc9", vpc_props())
            .expect("declare");

        let mut web = UnitBuilder::new(&app, "Web").expect("builder");
        let err = web
            .declare(
                ResourceKind::SecurityGroup,
                "sg",
                Properties::new().with("vpc", vpc.attr("id").expect("attr")),
            )
            .unwrap_err();
        assert!(
            matches!(err, StratusError::UnknownUnit { ref name } if name == "Other"),
            "got: {err}"
        );
    }
}
