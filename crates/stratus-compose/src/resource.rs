//! Resource kinds and resource descriptors.
//!
//! Every resource is one [`ResourceDescriptor`] tagged with a [`ResourceKind`].
//! Kind-specific behavior lives in three static tables per kind:
//!
//! - **attributes**: runtime attributes another resource may reference.
//! - **defaults**: documented values merged under the explicit configuration.
//! - **required keys**: keys that must be present once defaults are applied.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{Properties, Value};

/// Broad family a resource kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Virtual networks and subnets.
    Network,
    /// Security groups, key pairs, and access policies.
    Security,
    /// Virtual machines and their scaling.
    Compute,
    /// Container clusters, tasks, and services.
    Container,
    /// Functions and their versions.
    Serverless,
    /// Object storage.
    Storage,
    /// Load balancers, listeners, and target groups.
    LoadBalancer,
    /// HTTP API front doors.
    Api,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::Security => "security",
            Self::Compute => "compute",
            Self::Container => "container",
            Self::Serverless => "serverless",
            Self::Storage => "storage",
            Self::LoadBalancer => "load-balancer",
            Self::Api => "api",
        };
        f.write_str(s)
    }
}

/// The kind of a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Virtual private network.
    Vpc,
    /// Subnet inside a VPC.
    Subnet,
    /// Stateful firewall attached to instances or load balancers.
    SecurityGroup,
    /// SSH key pair, usually imported by name.
    KeyPair,
    /// Single virtual machine.
    Instance,
    /// Reusable instance launch configuration.
    LaunchTemplate,
    /// Group of instances scaled between a minimum and maximum capacity.
    AutoScalingGroup,
    /// Application load balancer.
    LoadBalancer,
    /// Load balancer listener on one port.
    Listener,
    /// Set of targets a listener forwards to.
    TargetGroup,
    /// Container cluster.
    EcsCluster,
    /// Container task definition.
    TaskDefinition,
    /// Container inside a task definition.
    ContainerDefinition,
    /// Long-running service of serverless container tasks.
    FargateService,
    /// Serverless function.
    Function,
    /// Shared code layer for functions.
    LayerVersion,
    /// Immutable published version of a function.
    FunctionVersion,
    /// Named pointer to a function version.
    Alias,
    /// REST API proxying to a function.
    RestApi,
    /// Object storage bucket.
    Bucket,
    /// Resource policy attached to a bucket.
    BucketPolicy,
    /// Upload of local assets into a bucket.
    BucketDeployment,
}

impl ResourceKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 22] = [
        Self::Vpc,
        Self::Subnet,
        Self::SecurityGroup,
        Self::KeyPair,
        Self::Instance,
        Self::LaunchTemplate,
        Self::AutoScalingGroup,
        Self::LoadBalancer,
        Self::Listener,
        Self::TargetGroup,
        Self::EcsCluster,
        Self::TaskDefinition,
        Self::ContainerDefinition,
        Self::FargateService,
        Self::Function,
        Self::LayerVersion,
        Self::FunctionVersion,
        Self::Alias,
        Self::RestApi,
        Self::Bucket,
        Self::BucketPolicy,
        Self::BucketDeployment,
    ];

    /// Family this kind belongs to.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Vpc | Self::Subnet => Category::Network,
            Self::SecurityGroup | Self::KeyPair | Self::BucketPolicy => Category::Security,
            Self::Instance | Self::LaunchTemplate | Self::AutoScalingGroup => Category::Compute,
            Self::EcsCluster
            | Self::TaskDefinition
            | Self::ContainerDefinition
            | Self::FargateService => Category::Container,
            Self::Function | Self::LayerVersion | Self::FunctionVersion | Self::Alias => {
                Category::Serverless
            }
            Self::Bucket | Self::BucketDeployment => Category::Storage,
            Self::LoadBalancer | Self::Listener | Self::TargetGroup => Category::LoadBalancer,
            Self::RestApi => Category::Api,
        }
    }

    /// Runtime attributes other resources may reference.
    #[must_use]
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::Vpc => &[
                "id",
                "cidrBlock",
                "defaultSecurityGroup",
                "publicSubnetIds",
                "firstPublicSubnetId",
                "privateSubnetIds",
                "availabilityZones",
            ],
            Self::Subnet => &["id", "availabilityZone", "routeTableId"],
            Self::SecurityGroup => &["id", "vpcId"],
            Self::KeyPair => &["name", "fingerprint"],
            Self::Instance => &[
                "id",
                "privateIp",
                "publicIp",
                "publicDnsName",
                "availabilityZone",
            ],
            Self::LaunchTemplate => &["id", "latestVersionNumber", "defaultVersionNumber"],
            Self::AutoScalingGroup => &["name", "arn"],
            Self::LoadBalancer => &[
                "arn",
                "dnsName",
                "fullName",
                "canonicalHostedZoneId",
                "securityGroupId",
            ],
            Self::Listener => &["arn"],
            Self::TargetGroup => &["arn", "name", "fullName"],
            Self::EcsCluster | Self::FargateService => &["name", "arn"],
            Self::TaskDefinition => &["arn", "family"],
            Self::ContainerDefinition => &["name"],
            Self::Function => &["name", "arn", "roleArn"],
            Self::LayerVersion => &["arn"],
            Self::FunctionVersion => &["version", "arn"],
            Self::Alias => &["name", "arn"],
            Self::RestApi => &["id", "url", "rootResourceId"],
            Self::Bucket => &[
                "name",
                "arn",
                "domainName",
                "regionalDomainName",
                "websiteUrl",
            ],
            Self::BucketPolicy => &[],
            Self::BucketDeployment => &["destinationBucketName"],
        }
    }

    /// Whether `attribute` may be referenced on this kind.
    #[must_use]
    pub fn has_attribute(self, attribute: &str) -> bool {
        self.attributes().contains(&attribute)
    }

    /// Keys that must be set once defaults are applied.
    #[must_use]
    pub const fn required_keys(self) -> &'static [&'static str] {
        match self {
            Self::Vpc | Self::TaskDefinition | Self::Bucket => &[],
            Self::SecurityGroup | Self::EcsCluster | Self::LoadBalancer => &["vpc"],
            Self::Subnet => &["vpc", "cidrBlock"],
            Self::KeyPair => &["keyName"],
            Self::Instance | Self::LaunchTemplate => &["instanceType", "machineImage"],
            Self::AutoScalingGroup => &["vpc", "launchTemplate"],
            Self::Listener => &["loadBalancer", "port"],
            Self::TargetGroup => &["listener", "port"],
            Self::ContainerDefinition => &["taskDefinition", "image"],
            Self::FargateService => &["cluster", "taskDefinition"],
            Self::Function => &["runtime", "handler", "code"],
            Self::LayerVersion => &["code"],
            Self::FunctionVersion => &["function"],
            Self::Alias => &["aliasName", "version"],
            Self::RestApi => &["handler"],
            Self::BucketPolicy => &["bucket", "statements"],
            Self::BucketDeployment => &["sources", "destinationBucket"],
        }
    }

    /// Documented defaults merged under the explicit configuration.
    #[must_use]
    pub fn defaults(self) -> Properties {
        match self {
            Self::Vpc => Properties::new()
                .with("cidr", "10.0.0.0/16")
                .with("maxAzs", 3)
                .with("enableDnsHostnames", true)
                .with("enableDnsSupport", true),
            Self::Subnet => Properties::new().with("mapPublicIpOnLaunch", false),
            Self::SecurityGroup => Properties::new()
                .with("allowAllOutbound", true)
                .with("ingressRules", Value::list()),
            Self::AutoScalingGroup => Properties::new().with("minCapacity", 1),
            Self::LoadBalancer => Properties::new()
                .with("internetFacing", false)
                .with("type", "application"),
            Self::Listener => Properties::new()
                .with("protocol", "HTTP")
                .with("open", true),
            Self::TargetGroup => Properties::new()
                .with("protocol", "HTTP")
                .with("targets", Value::list()),
            Self::TaskDefinition => Properties::new()
                .with("cpu", 256)
                .with("memoryLimitMiB", 512)
                .with("compatibility", "FARGATE"),
            Self::FargateService => Properties::new()
                .with("desiredCount", 1)
                .with("assignPublicIp", false),
            Self::Function => Properties::new().with("memorySize", 128).with("timeout", 3),
            Self::RestApi => Properties::new()
                .with("proxy", true)
                .with("stageName", "prod"),
            Self::Bucket => Properties::new()
                .with("versioned", false)
                .with("publicReadAccess", false)
                .with("removalPolicy", "RETAIN"),
            Self::BucketDeployment => Properties::new().with("prune", true),
            Self::KeyPair
            | Self::Instance
            | Self::LaunchTemplate
            | Self::EcsCluster
            | Self::ContainerDefinition
            | Self::LayerVersion
            | Self::FunctionVersion
            | Self::Alias
            | Self::BucketPolicy => Properties::new(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An immutable declaration of one resource inside a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub(crate) kind: ResourceKind,
    pub(crate) identifier: String,
    pub(crate) properties: Properties,
    pub(crate) depends_on: Vec<String>,
}

impl ResourceDescriptor {
    /// Kind of the resource.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Identifier, unique within the owning unit.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Configuration after defaults were applied.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Explicit ordering dependencies on resources of the same unit.
    #[must_use]
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}
