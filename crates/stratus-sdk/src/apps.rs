//! Catalog of the sample applications.
//!
//! Each [`SampleApp`] instantiates its stacks, in a fixed order, into a fresh
//! [`ApplicationRoot`].

use std::fmt;
use std::str::FromStr;

use stratus_common::error::{Result, StratusError};
use stratus_compose::{ApplicationRoot, Stack};

use crate::ec2::{Ec2AutoscalingStack, Ec2InstanceStack, LaunchTemplateStack};
use crate::ecs::EcsFargateStack;
use crate::lambda::{BasicLambdaStack, LambdaCompleteStack, LambdaWithLayerStack, LearningCdkStack};
use crate::network::{SharedNetworkStack, WebTierStack};
use crate::s3::{S3ReactAppStack, S3Stack};

/// A bundled sample application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleApp {
    /// Instance, launch template, and auto scaling stacks.
    Ec2,
    /// Storage bucket and static website stacks.
    Storage,
    /// Lambda function stacks.
    Serverless,
    /// Fargate service stack.
    Containers,
    /// Two units sharing one VPC.
    Network,
}

impl SampleApp {
    /// Every sample application.
    pub const ALL: [Self; 5] = [
        Self::Ec2,
        Self::Storage,
        Self::Serverless,
        Self::Containers,
        Self::Network,
    ];

    /// Name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ec2 => "ec2",
            Self::Storage => "s3",
            Self::Serverless => "lambda",
            Self::Containers => "fargate",
            Self::Network => "network",
        }
    }

    /// Unit names in definition order.
    #[must_use]
    pub const fn units(self) -> &'static [&'static str] {
        match self {
            Self::Ec2 => &["EC2InstanceStack", "LaunchTemplate", "Ec2AutoscalingStack"],
            Self::Storage => &["S3Stack", "S3ReactAppStack"],
            Self::Serverless => &[
                "BasicLambdaStack",
                "LambdaWithLayerStack",
                "LambdaCompleteStack",
                "LearningCdkStack",
            ],
            Self::Containers => &["EcsFargateStack"],
            Self::Network => &["Net", "Web"],
        }
    }

    fn stacks(self) -> Vec<Box<dyn Stack>> {
        match self {
            Self::Ec2 => vec![
                Box::new(Ec2InstanceStack::default()),
                Box::new(LaunchTemplateStack::default()),
                Box::new(Ec2AutoscalingStack::default()),
            ],
            Self::Storage => vec![
                Box::new(S3Stack::default()),
                Box::new(S3ReactAppStack::default()),
            ],
            Self::Serverless => vec![
                Box::new(BasicLambdaStack::default()),
                Box::new(LambdaWithLayerStack),
                Box::new(LambdaCompleteStack::default()),
                Box::new(LearningCdkStack),
            ],
            Self::Containers => vec![Box::new(EcsFargateStack::default())],
            Self::Network => vec![
                Box::new(SharedNetworkStack::default()),
                Box::new(WebTierStack::default()),
            ],
        }
    }

    /// Builds the application with default props for every stack.
    ///
    /// # Errors
    ///
    /// Returns the first validation error raised by any stack.
    pub fn build(self) -> Result<ApplicationRoot> {
        tracing::info!(app = self.name(), "building sample application");
        let mut app = ApplicationRoot::new();
        for (name, stack) in self.units().iter().zip(self.stacks()) {
            app.add_stack(*name, stack.as_ref())?;
        }
        Ok(app)
    }
}

impl fmt::Display for SampleApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleApp {
    type Err = StratusError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|app| app.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StratusError::Config {
                message: format!(
                    "unknown application \"{s}\", expected one of: {}",
                    Self::ALL.map(Self::name).join(", ")
                ),
            })
    }
}
