//! Storage sample stacks.

use stratus_common::error::Result;
use stratus_compose::{Properties, ResourceKind, Stack, UnitBuilder, Value};

/// Versioned bucket that archives objects to Glacier, seeded from a local folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Stack {
    /// Globally unique bucket name.
    pub bucket_name: String,
    /// Local folder uploaded into the bucket.
    pub asset_path: String,
    /// Days before objects move to Glacier.
    pub glacier_after_days: u32,
    /// Days before objects expire.
    pub expire_after_days: u32,
}

impl Default for S3Stack {
    fn default() -> Self {
        Self {
            bucket_name: "my-awesome-bucket-123455".to_owned(),
            asset_path: "./assets".to_owned(),
            glacier_after_days: 30,
            expire_after_days: 365,
        }
    }
}

impl Stack for S3Stack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let lifecycle = Properties::new()
            .with("id", "MoveToGlacier")
            .with(
                "transitions",
                vec![
                    Properties::new()
                        .with("storageClass", "GLACIER")
                        .with("transitionAfterDays", self.glacier_after_days),
                ],
            )
            .with("expirationDays", self.expire_after_days);

        let bucket = unit.declare(
            ResourceKind::Bucket,
            "MyBucket",
            Properties::new()
                .with("bucketName", self.bucket_name.as_str())
                .with("versioned", true)
                .with("removalPolicy", "DESTROY")
                .with("lifecycleRules", vec![lifecycle]),
        )?;

        let _ = unit.declare(
            ResourceKind::BucketDeployment,
            "DeployFiles",
            Properties::new()
                .with("sources", vec![self.asset_path.as_str()])
                .with("destinationBucket", bucket.attr("name")?),
        )?;

        unit.add_output("BucketName", bucket.attr("name")?)?;
        Ok(())
    }
}

/// Public static website bucket for a single-page application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ReactAppStack {
    /// Globally unique bucket name.
    pub bucket_name: String,
    /// Local build output uploaded into the bucket.
    pub build_dir: String,
}

impl Default for S3ReactAppStack {
    fn default() -> Self {
        Self {
            bucket_name: "my-react-app-12344567".to_owned(),
            build_dir: "./react-app/dist".to_owned(),
        }
    }
}

impl Stack for S3ReactAppStack {
    fn build(&self, unit: &mut UnitBuilder<'_>) -> Result<()> {
        let bucket = unit.declare(
            ResourceKind::Bucket,
            "ReactAppBucket",
            Properties::new()
                .with("bucketName", self.bucket_name.as_str())
                // Client-side routing serves index.html for every path.
                .with("websiteIndexDocument", "index.html")
                .with("websiteErrorDocument", "index.html")
                .with(
                    "blockPublicAccess",
                    Properties::new()
                        .with("blockPublicPolicy", false)
                        .with("blockPublicAcls", false)
                        .with("ignorePublicAcls", false)
                        .with("restrictPublicBuckets", false),
                )
                .with("publicReadAccess", true)
                .with("removalPolicy", "DESTROY"),
        )?;

        let _ = unit.declare(
            ResourceKind::BucketPolicy,
            "ReactAppBucketPolicy",
            Properties::new()
                .with("bucket", bucket.attr("name")?)
                .with("statements", Value::list()),
        )?;
        unit.append(
            "ReactAppBucketPolicy",
            "statements",
            Properties::new()
                .with("effect", "Allow")
                .with("principal", "*")
                .with("actions", vec!["s3:GetObject"])
                .with(
                    "resources",
                    vec![
                        Properties::new()
                            .with("bucketArn", bucket.attr("arn")?)
                            .with("objectKey", "*"),
                    ],
                ),
        )?;

        let _ = unit.declare(
            ResourceKind::BucketDeployment,
            "DeployReactApp",
            Properties::new()
                .with("sources", vec![self.build_dir.as_str()])
                .with("destinationBucket", bucket.attr("name")?),
        )?;

        unit.add_output("WebsiteUrl", bucket.attr("websiteUrl")?)?;
        Ok(())
    }
}
