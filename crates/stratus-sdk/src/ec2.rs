//! EC2 sample stacks: a lone instance, a launch template, and an auto scaling
//! group behind a load balancer.

use stratus_common::error::Result;
use stratus_compose::{Properties, ResourceKind, Stack, UnitBuilder};

use crate::network::{
    AMAZON_LINUX, AMAZON_LINUX_2, DEFAULT_INSTANCE_TYPE, LoadBalancerIds, allow_tcp,
    http_load_balancer, key_pair, public_vpc, security_group,
};

/// Name of the pre-existing SSH key pair every EC2 sample uses.
pub const DEFAULT_KEY_NAME: &str = "my-ssh-key";

/// One instance reachable over SSH and on an application port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ec2InstanceStack {
    /// Existing key pair name.
    pub key_name: String,
    /// Instance type.
    pub instance_type: String,
    /// Extra TCP port opened for the application.
    pub app_port: u16,
}

impl Default for Ec2InstanceStack {
    fn default() -> Self {
        Self {
            key_name: DEFAULT_KEY_NAME.to_owned(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_owned(),
            app_port: 3000,
        }
    }
}

impl Stack for Ec2InstanceStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let vpc = public_vpc(unit, "MyVpc", 2)?;
        let sg = security_group(unit, "MySecurityGroup", &vpc, "Allow SSH access")?;
        allow_tcp(unit, sg.identifier(), 22, "Allow SSH")?;
        allow_tcp(unit, sg.identifier(), self.app_port, "Allow Node.js application")?;
        let key = key_pair(unit, "MyKeyPair", &self.key_name)?;

        let instance = unit.declare(
            ResourceKind::Instance,
            "MyInstance",
            Properties::new()
                .with("vpc", vpc.attr("id")?)
                .with("instanceType", self.instance_type.as_str())
                .with("machineImage", AMAZON_LINUX)
                .with("keyPair", key.attr("name")?)
                .with("securityGroup", sg.attr("id")?),
        )?;

        unit.add_output("InstanceId", instance.attr("id")?)?;
        Ok(())
    }
}

/// A launch template and one instance started from it in a public subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplateStack {
    /// Existing key pair name.
    pub key_name: String,
    /// Instance type recorded in the template.
    pub instance_type: String,
}

impl Default for LaunchTemplateStack {
    fn default() -> Self {
        Self {
            key_name: DEFAULT_KEY_NAME.to_owned(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_owned(),
        }
    }
}

impl Stack for LaunchTemplateStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let vpc = public_vpc(unit, "MyVPC", 2)?;
        let sg = security_group(unit, "MySecurityGroup", &vpc, "Allow SSH access")?;
        allow_tcp(unit, sg.identifier(), 22, "Allow SSH")?;
        let key = key_pair(unit, "MyKeyPair", &self.key_name)?;

        let template = unit.declare(
            ResourceKind::LaunchTemplate,
            "MyLaunchTemplate",
            Properties::new()
                .with("instanceType", self.instance_type.as_str())
                .with("machineImage", AMAZON_LINUX)
                .with("keyPair", key.attr("name")?)
                .with("securityGroup", sg.attr("id")?),
        )?;
        unit.add_output("LaunchTemplateId", template.attr("id")?)?;

        // Instances always carry a type and image, even when launched from a template.
        let instance = unit.declare(
            ResourceKind::Instance,
            "MyEc2Instance",
            Properties::new()
                .with("instanceType", self.instance_type.as_str())
                .with("machineImage", AMAZON_LINUX)
                .with(
                    "launchTemplate",
                    Properties::new()
                        .with("launchTemplateId", template.attr("id")?)
                        .with("version", template.attr("latestVersionNumber")?),
                )
                .with("subnet", vpc.attr("firstPublicSubnetId")?),
        )?;
        unit.add_output("Instanceid", instance.attr("id")?)?;
        Ok(())
    }
}

/// Auto scaling group of web servers behind an internet-facing load balancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ec2AutoscalingStack {
    /// Existing key pair name.
    pub key_name: String,
    /// Instance type of every group member.
    pub instance_type: String,
    /// Smallest group size.
    pub min_capacity: u32,
    /// Largest group size.
    pub max_capacity: u32,
    /// Initial group size.
    pub desired_capacity: u32,
}

impl Default for Ec2AutoscalingStack {
    fn default() -> Self {
        Self {
            key_name: DEFAULT_KEY_NAME.to_owned(),
            instance_type: DEFAULT_INSTANCE_TYPE.to_owned(),
            min_capacity: 1,
            max_capacity: 5,
            desired_capacity: 2,
        }
    }
}

impl Stack for Ec2AutoscalingStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let vpc = public_vpc(unit, "MyVpc", 2)?;
        let sg = security_group(unit, "InstanceSG", &vpc, "Allow SSH and HTTP")?;
        allow_tcp(unit, sg.identifier(), 22, "Allow SSH")?;
        allow_tcp(unit, sg.identifier(), 80, "Allow HTTP")?;
        let key = key_pair(unit, "MyKeyPair", &self.key_name)?;

        let template = unit.declare(
            ResourceKind::LaunchTemplate,
            "MyLaunchTemplate",
            Properties::new()
                .with("instanceType", self.instance_type.as_str())
                .with("machineImage", AMAZON_LINUX_2)
                .with("keyPair", key.attr("name")?)
                .with("securityGroup", sg.attr("id")?),
        )?;

        let group = unit.declare(
            ResourceKind::AutoScalingGroup,
            "MyAutoScaling",
            Properties::new()
                .with("vpc", vpc.attr("id")?)
                .with("launchTemplate", template.attr("id")?)
                .with("minCapacity", self.min_capacity)
                .with("maxCapacity", self.max_capacity)
                .with("desiredCapacity", self.desired_capacity)
                .with("vpcSubnets", Properties::new().with("subnetType", "PUBLIC")),
        )?;

        let alb = http_load_balancer(
            unit,
            &vpc,
            LoadBalancerIds {
                load_balancer: "MyALB",
                listener: "Listener",
                target_group: "TargetGroup",
            },
            group.attr("name")?,
        )?;

        unit.add_output("LoadBalancerDNS", alb.attr("dnsName")?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_compose::ApplicationRoot;

    #[test]
    fn instance_stack_references_its_network() {
        let mut app = ApplicationRoot::new();
        app.add_stack("EC2InstanceStack", &Ec2InstanceStack::default())
            .expect("stack");
        let docs = app.synth().expect("synth");
        let instance = docs[0].resource("MyInstance").expect("instance");
        assert_eq!(
            instance.depends_on,
            vec!["MyKeyPair", "MySecurityGroup", "MyVpc"]
        );
        assert_eq!(
            instance.properties["keyPair"],
            serde_json::Value::String("${MyKeyPair.name}".into())
        );
        assert_eq!(docs[0].outputs["InstanceId"].value, "${MyInstance.id}");
    }

    #[test]
    fn launch_template_instance_follows_template_and_subnet() {
        let mut app = ApplicationRoot::new();
        app.add_stack("LaunchTemplate", &LaunchTemplateStack::default())
            .expect("stack");
        let docs = app.synth().expect("synth");
        let doc = &docs[0];
        let instance = doc.position("MyEc2Instance").expect("instance");
        assert!(doc.position("MyLaunchTemplate").expect("template") < instance);
        assert!(doc.position("MyVPC").expect("vpc") < instance);
        let properties = &doc.resource("MyEc2Instance").expect("instance").properties;
        assert_eq!(properties["subnet"], "${MyVPC.firstPublicSubnetId}");
        assert_eq!(
            properties["launchTemplate"]["version"],
            "${MyLaunchTemplate.latestVersionNumber}"
        );
    }

    #[test]
    fn autoscaling_capacity_is_configurable() {
        let stack = Ec2AutoscalingStack {
            desired_capacity: 3,
            ..Ec2AutoscalingStack::default()
        };
        let mut app = ApplicationRoot::new();
        app.add_stack("Ec2AutoscalingStack", &stack).expect("stack");
        let docs = app.synth().expect("synth");
        let group = docs[0].resource("MyAutoScaling").expect("group");
        assert_eq!(group.properties["desiredCapacity"], 3);
        assert_eq!(group.properties["maxCapacity"], 5);
        assert_eq!(docs[0].outputs["LoadBalancerDNS"].value, "${MyALB.dnsName}");
    }
}
