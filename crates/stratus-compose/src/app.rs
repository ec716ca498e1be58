//! The application root.
//!
//! An [`ApplicationRoot`] is an explicit value created once per process. Units
//! are defined against it in order, and it drives synthesis once every unit
//! is in place.

use stratus_common::error::{Result, StratusError};

use crate::synth::{self, UnitDocument};
use crate::unit::{CompositeUnit, UnitBuilder};

/// A reusable unit definition, instantiated under a caller-chosen name.
pub trait Stack {
    /// Populates `unit` with this stack's resources and outputs.
    ///
    /// # Errors
    ///
    /// Returns the first validation error raised while declaring.
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()>;
}

impl<F> Stack for F
where
    F: Fn(&mut UnitBuilder<'_>) -> Result<()>,
{
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        self(unit)
    }
}

/// The top-level container of every unit.
#[derive(Debug, Default)]
pub struct ApplicationRoot {
    units: Vec<CompositeUnit>,
}

impl ApplicationRoot {
    /// Creates an empty application.
    #[must_use]
    pub const fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Defines a unit named `name` by running `build` against a fresh builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is malformed or taken, or if `build` fails.
    pub fn define<F>(&mut self, name: impl Into<String>, build: F) -> Result<()>
    where
        F: FnOnce(&mut UnitBuilder<'_>) -> Result<()>,
    {
        let unit = {
            let mut builder = UnitBuilder::new(self, name)?;
            build(&mut builder)?;
            builder.finish()
        };
        self.units.push(unit);
        Ok(())
    }

    /// Instantiates `stack` as a unit named `name`.
    ///
    /// # Errors
    ///
    /// Same as [`ApplicationRoot::define`].
    pub fn add_stack(&mut self, name: impl Into<String>, stack: &dyn Stack) -> Result<()> {
        self.define(name, |unit| stack.build(unit))
    }

    /// Adds a unit finished through [`UnitBuilder::finish`].
    ///
    /// # Errors
    ///
    /// - [`StratusError::DuplicateUnitName`] if the name is taken.
    /// - [`StratusError::UnknownUnit`] if the unit imports a unit this
    ///   application does not contain.
    pub fn add_unit(&mut self, unit: CompositeUnit) -> Result<()> {
        if self.unit(unit.name()).is_some() {
            return Err(StratusError::DuplicateUnitName {
                name: unit.name().to_owned(),
            });
        }
        if let Some(missing) = unit.imports().iter().find(|i| self.unit(i).is_none()) {
            return Err(StratusError::UnknownUnit {
                name: missing.clone(),
            });
        }
        self.units.push(unit);
        Ok(())
    }

    /// Looks up a unit by name.
    #[must_use]
    pub fn unit(&self, name: &str) -> Option<&CompositeUnit> {
        self.units.iter().find(|u| u.name() == name)
    }

    /// Units in definition order.
    #[must_use]
    pub fn units(&self) -> &[CompositeUnit] {
        &self.units
    }

    /// Synthesizes every unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference graph has a cycle.
    pub fn synth(&self) -> Result<Vec<UnitDocument>> {
        synth::synthesize(self, None)
    }

    /// Synthesizes only the named units, validating the whole application.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::UnknownUnit`] for an unknown name, or any
    /// error [`ApplicationRoot::synth`] can return.
    pub fn synth_units<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<UnitDocument>> {
        let names: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        synth::synthesize(self, Some(&names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;
    use crate::value::Properties;

    fn one_bucket(unit: &mut UnitBuilder<'_>) -> Result<()> {
        let _ = unit.declare(ResourceKind::Bucket, "Bucket", Properties::new())?;
        Ok(())
    }

    #[test]
    fn define_keeps_definition_order() {
        let mut app = ApplicationRoot::new();
        app.define("B", one_bucket).expect("define B");
        app.define("A", one_bucket).expect("define A");
        let names: Vec<_> = app.units().iter().map(CompositeUnit::name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn duplicate_unit_name_fails() {
        let mut app = ApplicationRoot::new();
        app.define("A", one_bucket).expect("define A");
        let err = app.define("A", one_bucket).unwrap_err();
        assert!(
            matches!(err, StratusError::DuplicateUnitName { ref name } if name == "A"),
            "got: {err}"
        );
    }

    #[test]
    fn failed_definition_leaves_application_unchanged() {
        let mut app = ApplicationRoot::new();
        let result = app.define("Broken", |unit| {
            let _ = unit.declare(ResourceKind::KeyPair, "Key", Properties::new())?;
            Ok(())
        });
        assert!(result.is_err());
        assert!(app.units().is_empty());
    }

    #[test]
    fn add_stack_accepts_plain_functions() {
        let mut app = ApplicationRoot::new();
        app.add_stack("Storage", &one_bucket).expect("add stack");
        assert!(app.unit("Storage").is_some());
    }

    #[test]
    fn add_unit_rejects_imports_from_another_application() {
        let mut source = ApplicationRoot::new();
        source.define("Net", one_bucket).expect("define Net");
        let mut builder = UnitBuilder::new(&source, "Web").expect("builder");
        builder.import("Net").expect("import");
        let web = builder.finish();

        let mut target = ApplicationRoot::new();
        let err = target.add_unit(web).unwrap_err();
        assert!(
            matches!(err, StratusError::UnknownUnit { ref name } if name == "Net"),
            "got: {err}"
        );
    }
}
