//! Network building blocks shared by the sample stacks.
//!
//! Also holds the shared-network application: a `Net` unit owning a VPC and a
//! `Web` unit that imports it and places a server inside it.

use stratus_common::error::Result;
use stratus_compose::{Output, Properties, Reference, ResourceHandle, ResourceKind, Stack, UnitBuilder};

/// CIDR matching every IPv4 address.
pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Default instance type for every sample server.
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

/// Amazon Linux machine image.
pub const AMAZON_LINUX: &str = "AMAZON_LINUX";

/// Latest Amazon Linux 2 machine image.
pub const AMAZON_LINUX_2: &str = "AMAZON_LINUX_2";

/// Declares a VPC with one public `/24` subnet per availability zone.
///
/// # Errors
///
/// Returns an error if `identifier` is malformed or taken.
pub fn public_vpc(unit: &mut UnitBuilder<'_>, identifier: &str, max_azs: u32) -> Result<ResourceHandle> {
    unit.declare(
        ResourceKind::Vpc,
        identifier,
        Properties::new().with("maxAzs", max_azs).with(
            "subnetConfiguration",
            vec![
                Properties::new()
                    .with("cidrMask", 24)
                    .with("name", "PublicSubnet")
                    .with("subnetType", "PUBLIC"),
            ],
        ),
    )
}

/// Declares a security group in `vpc` that allows all outbound traffic.
///
/// # Errors
///
/// Returns an error if `identifier` is malformed or taken.
pub fn security_group(
    unit: &mut UnitBuilder<'_>,
    identifier: &str,
    vpc: &ResourceHandle,
    description: &str,
) -> Result<ResourceHandle> {
    unit.declare(
        ResourceKind::SecurityGroup,
        identifier,
        Properties::new()
            .with("vpc", vpc.attr("id")?)
            .with("description", description)
            .with("allowAllOutbound", true),
    )
}

/// Opens `port`/tcp to any IPv4 address on the security group `group`.
///
/// # Errors
///
/// Returns an error if `group` was not declared in this unit.
pub fn allow_tcp(unit: &mut UnitBuilder<'_>, group: &str, port: u16, description: &str) -> Result<()> {
    unit.append(
        group,
        "ingressRules",
        Properties::new()
            .with("peer", ANY_IPV4)
            .with("protocol", "tcp")
            .with("port", port)
            .with("description", description),
    )
}

/// Declares a reference to an existing key pair.
///
/// # Errors
///
/// Returns an error if `identifier` is malformed or taken.
pub fn key_pair(unit: &mut UnitBuilder<'_>, identifier: &str, key_name: &str) -> Result<ResourceHandle> {
    unit.declare(
        ResourceKind::KeyPair,
        identifier,
        Properties::new().with("keyName", key_name),
    )
}

/// Identifiers of the three resources behind [`http_load_balancer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBalancerIds<'a> {
    /// Load balancer identifier.
    pub load_balancer: &'a str,
    /// Listener identifier.
    pub listener: &'a str,
    /// Target group identifier.
    pub target_group: &'a str,
}

/// Declares an internet-facing application load balancer in `vpc`.
///
/// Its open listener on port 80 forwards to a target group that health-checks
/// `target` on `/` every 30 seconds.
///
/// # Errors
///
/// Returns an error if any identifier is malformed or taken.
pub fn http_load_balancer(
    unit: &mut UnitBuilder<'_>,
    vpc: &ResourceHandle,
    ids: LoadBalancerIds<'_>,
    target: Reference,
) -> Result<ResourceHandle> {
    let lb = unit.declare(
        ResourceKind::LoadBalancer,
        ids.load_balancer,
        Properties::new()
            .with("vpc", vpc.attr("id")?)
            .with("internetFacing", true),
    )?;
    let listener = unit.declare(
        ResourceKind::Listener,
        ids.listener,
        Properties::new()
            .with("loadBalancer", lb.attr("arn")?)
            .with("port", 80)
            .with("open", true),
    )?;
    let _ = unit.declare(
        ResourceKind::TargetGroup,
        ids.target_group,
        Properties::new()
            .with("listener", listener.attr("arn")?)
            .with("port", 80)
            .with("targets", vec![target])
            .with(
                "healthCheck",
                Properties::new().with("path", "/").with("intervalSeconds", 30),
            ),
    )?;
    Ok(lb)
}

/// Owns the VPC that other units of the application share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedNetworkStack {
    /// Number of availability zones the VPC spans.
    pub max_azs: u32,
}

impl Default for SharedNetworkStack {
    fn default() -> Self {
        Self { max_azs: 2 }
    }
}

impl Stack for SharedNetworkStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let vpc = public_vpc(unit, "SharedVpc", self.max_azs)?;
        unit.add_output(
            "VpcId",
            Output::new(vpc.attr("id")?).with_description("Shared VPC id"),
        )?;
        unit.add_output("PublicSubnetIds", vpc.attr("publicSubnetIds")?)?;
        Ok(())
    }
}

/// Runs a web server inside the VPC of another unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebTierStack {
    /// Name of the unit that owns `SharedVpc`.
    pub network_unit: String,
    /// Instance type of the web server.
    pub instance_type: String,
}

impl Default for WebTierStack {
    fn default() -> Self {
        Self {
            network_unit: "Net".to_owned(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_owned(),
        }
    }
}

impl Stack for WebTierStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        unit.import(&self.network_unit)?;
        let vpc = unit.imported_resource(&self.network_unit, "SharedVpc")?;

        let sg = security_group(unit, "WebSecurityGroup", &vpc, "Allow HTTP")?;
        allow_tcp(unit, sg.identifier(), 80, "Allow HTTP")?;

        let server = unit.declare(
            ResourceKind::Instance,
            "WebServer",
            Properties::new()
                .with("vpc", vpc.attr("id")?)
                .with("instanceType", self.instance_type.as_str())
                .with("machineImage", AMAZON_LINUX_2)
                .with("securityGroup", sg.attr("id")?),
        )?;
        unit.add_output("WebServerDns", server.attr("publicDnsName")?)?;
        Ok(())
    }
}
