//! Serverless sample stacks.

use stratus_common::error::Result;
use stratus_compose::{Output, Properties, ResourceHandle, ResourceKind, Stack, UnitBuilder};

/// Runtime shared by every sample function.
pub const NODEJS_20_X: &str = "nodejs20.x";

/// Entry point inside the function bundle.
pub const DEFAULT_HANDLER: &str = "index.handler";

/// Local folder holding the function code.
pub const FUNCTION_CODE: &str = "lambda";

/// Local folder holding the layer code.
pub const LAYER_CODE: &str = "lambda-layer";

fn function(
    unit: &mut UnitBuilder<'_>,
    identifier: &str,
    extra: Properties,
) -> Result<ResourceHandle> {
    let mut properties = Properties::new()
        .with("runtime", NODEJS_20_X)
        .with("handler", DEFAULT_HANDLER)
        .with("code", FUNCTION_CODE);
    for (key, value) in extra {
        let _ = properties.insert(key, value);
    }
    unit.declare(ResourceKind::Function, identifier, properties)
}

fn utils_layer(unit: &mut UnitBuilder<'_>, extra: Properties) -> Result<ResourceHandle> {
    let mut properties = Properties::new()
        .with("code", LAYER_CODE)
        .with("compatibleRuntimes", vec![NODEJS_20_X])
        .with("description", "Common utilities layer");
    for (key, value) in extra {
        let _ = properties.insert(key, value);
    }
    unit.declare(ResourceKind::LayerVersion, "UtilsLayer", properties)
}

fn development_environment() -> Properties {
    Properties::new().with("ENVIRONMENT", "development")
}

/// One function with a custom timeout and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLambdaStack {
    /// Memory in MiB.
    pub memory_size: u32,
    /// Timeout in seconds.
    pub timeout_seconds: u32,
}

impl Default for BasicLambdaStack {
    fn default() -> Self {
        Self {
            memory_size: 128,
            timeout_seconds: 30,
        }
    }
}

impl Stack for BasicLambdaStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let _ = function(
            unit,
            "HelloFunction",
            Properties::new()
                .with("memorySize", self.memory_size)
                .with("timeout", self.timeout_seconds)
                .with("environment", development_environment()),
        )?;
        Ok(())
    }
}

/// A function using a shared layer, exposed through a proxy REST API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LambdaWithLayerStack;

impl Stack for LambdaWithLayerStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let layer = utils_layer(unit, Properties::new())?;
        let handler = function(
            unit,
            "FunctionWithLayer",
            Properties::new()
                .with("layers", vec![layer.attr("arn")?])
                .with("environment", development_environment()),
        )?;
        let _ = unit.declare(
            ResourceKind::RestApi,
            "LambdaAPI",
            Properties::new()
                .with("handler", handler.attr("arn")?)
                .with("proxy", true)
                .with("stageName", "dev"),
        )?;
        Ok(())
    }
}

/// Layer, named function, published version, `dev` and `prod` aliases, and a
/// REST API routed to the `prod` alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaCompleteStack {
    /// Layer name.
    pub layer_name: String,
    /// Function name, unique per account and region.
    pub function_name: String,
    /// REST API name.
    pub api_name: String,
}

impl Default for LambdaCompleteStack {
    fn default() -> Self {
        Self {
            layer_name: "MyutilsLayer".to_owned(),
            function_name: "MyCustomaLambdaFunction".to_owned(),
            api_name: "MyLambdaAPI".to_owned(),
        }
    }
}

impl LambdaCompleteStack {
    fn alias(
        unit: &mut UnitBuilder<'_>,
        identifier: &str,
        alias_name: &str,
        function: &ResourceHandle,
        version: &ResourceHandle,
    ) -> Result<ResourceHandle> {
        unit.declare(
            ResourceKind::Alias,
            identifier,
            Properties::new()
                .with("aliasName", alias_name)
                .with("functionName", function.attr("name")?)
                .with("version", version.attr("version")?),
        )
    }
}

impl Stack for LambdaCompleteStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let layer = utils_layer(
            unit,
            Properties::new().with("layerVersionName", self.layer_name.as_str()),
        )?;
        let func = function(
            unit,
            "MyFunction",
            Properties::new()
                .with("functionName", self.function_name.as_str())
                .with("layers", vec![layer.attr("arn")?]),
        )?;
        let version = unit.declare(
            ResourceKind::FunctionVersion,
            "CurrentVersion",
            Properties::new().with("function", func.attr("name")?),
        )?;

        let _ = Self::alias(unit, "DevAlias", "dev", &func, &version)?;
        let prod = Self::alias(unit, "ProdAlias", "prod", &func, &version)?;

        let _ = unit.declare(
            ResourceKind::RestApi,
            "MyAPIGateway",
            Properties::new()
                .with("restApiName", self.api_name.as_str())
                .with("handler", prod.attr("arn")?)
                .with("proxy", true)
                .with("stageName", "dev"),
        )?;

        unit.add_output(
            "FunctionArn",
            Output::new(func.attr("arn")?).with_description("Lambda function arn"),
        )?;
        unit.add_output(
            "LayerArn",
            Output::new(layer.attr("arn")?).with_description("Lambda layer Arn"),
        )?;
        unit.add_output(
            "ProdAliasArn",
            Output::new(prod.attr("arn")?).with_description("Production alias Arn"),
        )?;
        Ok(())
    }
}

/// A function behind a proxy REST API on the default stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearningCdkStack;

impl Stack for LearningCdkStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let handler = function(unit, "HelloLamda", Properties::new())?;
        let _ = unit.declare(
            ResourceKind::RestApi,
            "myAPIgateway",
            Properties::new()
                .with("handler", handler.attr("arn")?)
                .with("proxy", true),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_compose::ApplicationRoot;

    #[test]
    fn basic_function_overrides_timeout_default() {
        let mut app = ApplicationRoot::new();
        app.add_stack("BasicLambdaStack", &BasicLambdaStack::default())
            .expect("stack");
        let docs = app.synth().expect("synth");
        let f = docs[0].resource("HelloFunction").expect("function");
        assert_eq!(f.properties["timeout"], 30);
        assert_eq!(f.properties["runtime"], NODEJS_20_X);
        assert_eq!(f.properties["environment"]["ENVIRONMENT"], "development");
    }

    #[test]
    fn complete_stack_orders_version_before_aliases_and_api() {
        let mut app = ApplicationRoot::new();
        app.add_stack("LambdaCompleteStack", &LambdaCompleteStack::default())
            .expect("stack");
        let docs = app.synth().expect("synth");
        let ids: Vec<_> = docs[0].resources.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "UtilsLayer",
                "MyFunction",
                "CurrentVersion",
                "DevAlias",
                "ProdAlias",
                "MyAPIGateway"
            ]
        );
        let api = docs[0].resource("MyAPIGateway").expect("api");
        assert_eq!(api.properties["handler"], "${ProdAlias.arn}");
        assert_eq!(
            docs[0].outputs["ProdAliasArn"].description.as_deref(),
            Some("Production alias Arn")
        );
    }

    #[test]
    fn default_stage_comes_from_rest_api_defaults() {
        let mut app = ApplicationRoot::new();
        app.add_stack("LearningCdkStack", &LearningCdkStack).expect("stack");
        let docs = app.synth().expect("synth");
        let api = docs[0].resource("myAPIgateway").expect("api");
        assert_eq!(api.properties["stageName"], "prod");
        assert_eq!(api.depends_on, vec!["HelloLamda"]);
    }
}
