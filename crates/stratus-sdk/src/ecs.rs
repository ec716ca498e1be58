//! Container sample stack: a Fargate service behind a load balancer.

use stratus_common::error::Result;
use stratus_compose::{Properties, ResourceKind, Stack, UnitBuilder};

use crate::network::{LoadBalancerIds, http_load_balancer};

/// Load-balanced Fargate service running one container image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcsFargateStack {
    /// Container image pulled from a public registry.
    pub image: String,
    /// Task memory in MiB.
    pub memory_limit_mib: u32,
    /// Task CPU units.
    pub cpu: u32,
    /// Number of running tasks.
    pub desired_count: u32,
    /// Log stream prefix of the `awslogs` driver.
    pub log_stream_prefix: String,
}

impl Default for EcsFargateStack {
    fn default() -> Self {
        Self {
            image: "amazon/amazon-ecs-sample".to_owned(),
            memory_limit_mib: 512,
            cpu: 256,
            desired_count: 2,
            log_stream_prefix: "MyApp".to_owned(),
        }
    }
}

impl Stack for EcsFargateStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let vpc = unit.declare(
            ResourceKind::Vpc,
            "MyVpc",
            Properties::new().with("maxAzs", 2),
        )?;
        let cluster = unit.declare(
            ResourceKind::EcsCluster,
            "MyCluster",
            Properties::new().with("vpc", vpc.attr("id")?),
        )?;

        let task = unit.declare(
            ResourceKind::TaskDefinition,
            "MyTaskDef",
            Properties::new()
                .with("memoryLimitMiB", self.memory_limit_mib)
                .with("cpu", self.cpu),
        )?;
        let container = unit.declare(
            ResourceKind::ContainerDefinition,
            "MyContainer",
            Properties::new()
                .with("taskDefinition", task.attr("arn")?)
                .with("image", self.image.as_str())
                .with(
                    "logging",
                    Properties::new()
                        .with("driver", "awslogs")
                        .with("streamPrefix", self.log_stream_prefix.as_str()),
                ),
        )?;

        let service = unit.declare(
            ResourceKind::FargateService,
            "MyFargateService",
            Properties::new()
                .with("cluster", cluster.attr("arn")?)
                .with("taskDefinition", task.attr("arn")?)
                .with("desiredCount", self.desired_count),
        )?;
        // The task definition is incomplete until its container is registered.
        unit.depend_on(service.identifier(), container.identifier())?;

        let lb = http_load_balancer(
            unit,
            &vpc,
            LoadBalancerIds {
                load_balancer: "LB",
                listener: "Listener",
                target_group: "ECS",
            },
            service.attr("name")?,
        )?;

        unit.add_output("LoadBalancerDNS", lb.attr("dnsName")?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_compose::ApplicationRoot;

    fn synth_default() -> stratus_compose::UnitDocument {
        let mut app = ApplicationRoot::new();
        app.add_stack("EcsFargateStack", &EcsFargateStack::default())
            .expect("stack");
        app.synth().expect("synth").remove(0)
    }

    #[test]
    fn service_waits_for_container() {
        let doc = synth_default();
        let service = doc.position("MyFargateService").expect("service");
        assert!(doc.position("MyContainer").expect("container") < service);
        assert_eq!(
            doc.resource("MyFargateService").expect("service").depends_on,
            vec!["MyCluster", "MyContainer", "MyTaskDef"]
        );
    }

    #[test]
    fn targets_point_at_the_service() {
        let doc = synth_default();
        let targets = doc.resource("ECS").expect("target group");
        assert_eq!(targets.properties["targets"][0], "${MyFargateService.name}");
        assert_eq!(targets.properties["healthCheck"]["path"], "/");
        assert_eq!(doc.resources.last().map(|r| r.id.as_str()), Some("ECS"));
    }

    #[test]
    fn task_size_overrides_defaults() {
        let doc = synth_default();
        let task = doc.resource("MyTaskDef").expect("task");
        assert_eq!(task.properties["memoryLimitMiB"], 512);
        assert_eq!(task.properties["compatibility"], "FARGATE");
    }
}
