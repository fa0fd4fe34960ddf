//! Deterministic resource naming and tagging.

use crate::naming::ambient::AmbientContextProvider;
use crate::naming::identity::{Environment, EnvironmentSet, IdentityContext, DEFAULT_PIPELINE};
use crate::naming::region::region_code;
use crate::naming::validation::{
    validate_account_id, validate_moniker, validate_non_empty, validate_region, validate_semver,
    ValidationError,
};
use crate::shared::logging;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_REGION: &str = "eu-central-2";
pub const ACCOUNT_ID_SENTINEL: &str = "000000000000";
pub const MANAGED_BY: &str = "terraform";

const STATE_SUFFIX: &str = "tfstate";

/// Which identifier a resource template is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdForm {
    Full,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    S3Bucket,
    IamRole,
    IamPolicy,
    EksCluster,
    Rds,
    Alb,
    Nlb,
    TargetGroup,
    EcrRepository,
    Lambda,
    KmsAlias,
    SecurityGroup,
    SqsQueue,
    SnsTopic,
    DynamodbTable,
    Secret,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 16] = [
        ResourceKind::S3Bucket,
        ResourceKind::IamRole,
        ResourceKind::IamPolicy,
        ResourceKind::EksCluster,
        ResourceKind::Rds,
        ResourceKind::Alb,
        ResourceKind::Nlb,
        ResourceKind::TargetGroup,
        ResourceKind::EcrRepository,
        ResourceKind::Lambda,
        ResourceKind::KmsAlias,
        ResourceKind::SecurityGroup,
        ResourceKind::SqsQueue,
        ResourceKind::SnsTopic,
        ResourceKind::DynamodbTable,
        ResourceKind::Secret,
    ];

    fn template(&self) -> (&'static str, IdForm) {
        match self {
            ResourceKind::S3Bucket => ("s3-", IdForm::Short),
            ResourceKind::IamRole => ("iam-role-", IdForm::Full),
            ResourceKind::IamPolicy => ("iam-policy-", IdForm::Full),
            ResourceKind::EksCluster => ("eks-", IdForm::Full),
            ResourceKind::Rds => ("rds-", IdForm::Full),
            ResourceKind::Alb => ("alb-", IdForm::Short),
            ResourceKind::Nlb => ("nlb-", IdForm::Short),
            ResourceKind::TargetGroup => ("tg-", IdForm::Short),
            ResourceKind::EcrRepository => ("ecr-", IdForm::Full),
            ResourceKind::Lambda => ("lambda-", IdForm::Full),
            ResourceKind::KmsAlias => ("alias/kms-", IdForm::Full),
            ResourceKind::SecurityGroup => ("sg-", IdForm::Full),
            ResourceKind::SqsQueue => ("sqs-", IdForm::Full),
            ResourceKind::SnsTopic => ("sns-", IdForm::Full),
            ResourceKind::DynamodbTable => ("ddb-", IdForm::Full),
            ResourceKind::Secret => ("secret-", IdForm::Full),
        }
    }

    /// Maximum name length used for this resource type.
    ///
    /// IAM roles allow 64 characters but are cut at 50 so callers can append
    /// a purpose suffix.
    pub fn max_len(&self) -> usize {
        match self {
            ResourceKind::S3Bucket => 63,
            ResourceKind::IamRole => 50,
            ResourceKind::IamPolicy => 128,
            ResourceKind::EksCluster => 100,
            ResourceKind::Rds => 63,
            ResourceKind::Alb | ResourceKind::Nlb => 32,
            ResourceKind::TargetGroup => 28,
            ResourceKind::EcrRepository => 256,
            ResourceKind::Lambda => 64,
            ResourceKind::KmsAlias => 256,
            ResourceKind::SecurityGroup => 255,
            ResourceKind::SqsQueue => 80,
            ResourceKind::SnsTopic => 256,
            ResourceKind::DynamodbTable => 255,
            ResourceKind::Secret => 512,
        }
    }

    fn lowercase(&self) -> bool {
        matches!(
            self,
            ResourceKind::S3Bucket | ResourceKind::Rds | ResourceKind::EcrRepository
        )
    }

    fn untruncated(&self, id: &str, id_short: &str) -> String {
        let (prefix, form) = self.template();
        let name = match form {
            IdForm::Full => format!("{}{}", prefix, id),
            IdForm::Short => format!("{}{}", prefix, id_short),
        };
        if self.lowercase() {
            name.to_lowercase()
        } else {
            name
        }
    }
}

/// Deployment-wide resolution settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    pub environment_set: EnvironmentSet,
    pub default_region: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            environment_set: EnvironmentSet::default(),
            default_region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Account and region after ambient defaults were applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTarget {
    pub account_id: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNaming {
    pub id: String,
    pub id_short: String,
    pub environment: Environment,
    pub layer: String,
    pub region: String,
    pub region_code: String,
    pub account_id: String,
    pub prefixes: BTreeMap<ResourceKind, String>,
    pub log_group: String,
    pub tags: BTreeMap<String, String>,
}

impl ResolvedNaming {
    pub fn prefix(&self, kind: ResourceKind) -> &str {
        self.prefixes.get(&kind).map(String::as_str).unwrap_or_default()
    }

    /// Remote state bucket created by the bootstrap layer
    pub fn state_bucket(&self) -> String {
        let base = ResourceKind::S3Bucket.untruncated(&self.id, &self.id_short);
        truncate(
            &format!("{}-{}", base, STATE_SUFFIX),
            ResourceKind::S3Bucket.max_len(),
        )
    }

    /// Alias of the KMS key encrypting remote state
    pub fn state_kms_alias(&self) -> String {
        let base = ResourceKind::KmsAlias.untruncated(&self.id, &self.id_short);
        truncate(
            &format!("{}-{}", base, STATE_SUFFIX),
            ResourceKind::KmsAlias.max_len(),
        )
    }
}

/// Hard character cutoff, not word-aware
pub fn truncate(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

fn compact_join(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("-")
}

/// Resolve names and tags for an identity whose account and region are known.
///
/// Pure: the same inputs always produce the same output.
pub fn resolve(
    ctx: &IdentityContext,
    target: &AccountTarget,
    rules: &NamingRules,
) -> Result<ResolvedNaming, ValidationError> {
    validate_non_empty("org", &ctx.org)?;
    validate_moniker("org_moniker", &ctx.org_moniker)?;
    validate_non_empty(ctx.tenant_kind.name_field(), &ctx.tenant)?;
    validate_moniker(ctx.tenant_kind.moniker_field(), &ctx.tenant_moniker)?;

    let environment = ctx
        .environment
        .parse::<Environment>()
        .ok()
        .filter(|env| rules.environment_set.contains(*env))
        .ok_or_else(|| {
            ValidationError::new(
                "environment",
                &ctx.environment,
                format!("must be one of: {}", rules.environment_set.describe()),
            )
        })?;

    validate_non_empty("layer", &ctx.layer)?;
    validate_region(&target.region)?;
    validate_account_id(&target.account_id)?;
    validate_semver(&ctx.semantic_version)?;

    let code = region_code(&target.region);
    let id = compact_join(&[
        &ctx.org_moniker,
        &ctx.tenant_moniker,
        environment.as_str(),
        &code,
    ]);
    let id_short = compact_join(&[
        &ctx.org_moniker,
        &ctx.tenant_moniker,
        environment.short_code(),
        &code,
    ]);

    let prefixes = ResourceKind::ALL
        .iter()
        .map(|kind| {
            (
                *kind,
                truncate(&kind.untruncated(&id, &id_short), kind.max_len()),
            )
        })
        .collect();

    let log_group = format!(
        "/{}",
        [
            ctx.org_moniker.as_str(),
            ctx.tenant_moniker.as_str(),
            environment.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
    );

    Ok(ResolvedNaming {
        tags: build_tags(ctx, environment),
        id,
        id_short,
        environment,
        layer: ctx.layer.clone(),
        region: target.region.clone(),
        region_code: code,
        account_id: target.account_id.clone(),
        prefixes,
        log_group,
    })
}

fn build_tags(ctx: &IdentityContext, environment: Environment) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert("org:Name".to_string(), ctx.org.clone());
    tags.insert(
        ctx.tenant_kind.id_tag_key().to_string(),
        ctx.tenant_moniker.clone(),
    );
    tags.insert(
        "product:Environment".to_string(),
        environment.as_str().to_string(),
    );
    tags.insert("layer:Name".to_string(), ctx.layer.clone());
    tags.insert(
        "governance:SemanticVersion".to_string(),
        ctx.semantic_version.clone(),
    );
    tags.insert("automation:ManagedBy".to_string(), MANAGED_BY.to_string());
    tags.insert(
        "automation:Pipeline".to_string(),
        ctx.pipeline
            .clone()
            .unwrap_or_else(|| DEFAULT_PIPELINE.to_string()),
    );
    tags.insert(
        "cost:CostCenter".to_string(),
        ctx.cost_center
            .clone()
            .unwrap_or_else(|| ctx.tenant_moniker.clone()),
    );
    tags.insert("cost:Project".to_string(), ctx.tenant.clone());

    if let Some(domain) = &ctx.org_domain {
        tags.insert("org:Domain".to_string(), domain.clone());
    }
    if let Some(residency) = &ctx.data_residency {
        tags.insert("org:DataResidency".to_string(), residency.clone());
    }
    tags
}

/// Resolver that fills a missing account id or region from ambient context.
pub struct NamingResolver<'a> {
    ambient: &'a dyn AmbientContextProvider,
    rules: NamingRules,
}

impl<'a> NamingResolver<'a> {
    pub fn new(ambient: &'a dyn AmbientContextProvider, rules: NamingRules) -> Self {
        Self { ambient, rules }
    }

    pub fn resolve(&self, ctx: &IdentityContext) -> Result<ResolvedNaming, ValidationError> {
        let target = self.account_target(ctx);
        resolve(ctx, &target, &self.rules)
    }

    /// Explicit values win; lookup failures degrade to the default region and
    /// the zero account id instead of failing.
    pub fn account_target(&self, ctx: &IdentityContext) -> AccountTarget {
        let region = match &ctx.aws_region {
            Some(region) => region.clone(),
            None => match self.ambient.region() {
                Ok(region) => region,
                Err(e) => {
                    logging::warn(&format!(
                        "Region lookup failed ({}), falling back to {}",
                        e, self.rules.default_region
                    ));
                    self.rules.default_region.clone()
                }
            },
        };

        let account_id = match &ctx.aws_account_id {
            Some(account_id) => account_id.clone(),
            None => match self.ambient.account_id() {
                Ok(account_id) => account_id,
                Err(e) => {
                    logging::warn(&format!(
                        "Account id lookup failed ({}), falling back to {}",
                        e, ACCOUNT_ID_SENTINEL
                    ));
                    ACCOUNT_ID_SENTINEL.to_string()
                }
            },
        };

        AccountTarget { account_id, region }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::ambient::StaticAmbient;
    use crate::naming::identity::TenantKind;

    fn identity() -> IdentityContext {
        IdentityContext {
            org: "Dragonfly".to_string(),
            org_moniker: "df".to_string(),
            tenant_kind: TenantKind::Product,
            tenant: "Unique".to_string(),
            tenant_moniker: "unique".to_string(),
            environment: "sbx".to_string(),
            layer: "bootstrap".to_string(),
            aws_region: Some("eu-central-2".to_string()),
            aws_account_id: Some("123456789012".to_string()),
            semantic_version: "1.2.3".to_string(),
            org_domain: None,
            data_residency: None,
            pipeline: None,
            cost_center: None,
        }
    }

    fn resolve_offline(ctx: &IdentityContext) -> Result<ResolvedNaming, ValidationError> {
        let ambient = StaticAmbient::offline();
        NamingResolver::new(&ambient, NamingRules::default()).resolve(ctx)
    }

    #[test]
    fn test_scenario_ids() {
        let naming = resolve_offline(&identity()).unwrap();
        assert_eq!(naming.id, "df-unique-sbx-euc2");
        assert_eq!(naming.id_short, "df-unique-x-euc2");
        assert_eq!(naming.prefix(ResourceKind::S3Bucket), "s3-df-unique-x-euc2");
        assert_eq!(naming.prefix(ResourceKind::EksCluster), "eks-df-unique-sbx-euc2");
        assert_eq!(naming.log_group, "/df/unique/sbx");
        assert_eq!(naming.state_bucket(), "s3-df-unique-x-euc2-tfstate");
        assert_eq!(naming.state_kms_alias(), "alias/kms-df-unique-sbx-euc2-tfstate");
    }

    #[test]
    fn test_truncation_points() {
        let mut ctx = identity();
        ctx.org_moniker = "abcdefghij".to_string();
        ctx.tenant_moniker = "klmnopqrst".to_string();
        ctx.environment = "prod".to_string();
        ctx.aws_region = Some("ap-southeast-2".to_string());
        let naming = resolve_offline(&ctx).unwrap();

        assert_eq!(naming.id, "abcdefghij-klmnopqrst-prod-apse2");
        assert_eq!(naming.id_short, "abcdefghij-klmnopqrst-p-apse2");
        // "tg-" + 29 chars cut to 28
        assert_eq!(
            naming.prefix(ResourceKind::TargetGroup),
            "tg-abcdefghij-klmnopqrst-p-a"
        );
        assert_eq!(
            naming.prefix(ResourceKind::Alb),
            "alb-abcdefghij-klmnopqrst-p-apse"
        );
        assert_eq!(naming.prefix(ResourceKind::Alb).len(), 32);
        assert_eq!(
            naming.prefix(ResourceKind::IamRole),
            "iam-role-abcdefghij-klmnopqrst-prod-apse2"
        );
    }

    #[test]
    fn test_truncation_is_literal_prefix() {
        let mut ctx = identity();
        ctx.org_moniker = "abcdefghij".to_string();
        ctx.tenant_moniker = "klmnopqrs".to_string();
        ctx.aws_region = Some("eu-west-1".to_string());
        let naming = resolve_offline(&ctx).unwrap();

        assert_eq!(
            naming.prefix(ResourceKind::TargetGroup),
            "tg-abcdefghij-klmnopqrs-x-eu"
        );
        for kind in ResourceKind::ALL {
            let full = kind.untruncated(&naming.id, &naming.id_short);
            let prefix = naming.prefix(kind);
            assert!(prefix.len() <= kind.max_len(), "{:?} too long", kind);
            assert!(full.starts_with(prefix), "{:?} is not a literal cut", kind);
        }
    }

    #[test]
    fn test_truncate_is_not_word_aware() {
        assert_eq!(truncate("tg-ab-cd", 6), "tg-ab-");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn test_environment_outside_set_rejected() {
        let mut ctx = identity();
        ctx.environment = "test".to_string();
        let err = resolve_offline(&ctx).unwrap_err();
        assert_eq!(err.field, "environment");

        let ambient = StaticAmbient::offline();
        let rules = NamingRules {
            environment_set: EnvironmentSet::Legacy,
            ..NamingRules::default()
        };
        let naming = NamingResolver::new(&ambient, rules).resolve(&ctx).unwrap();
        assert_eq!(naming.id_short, "df-unique-t-euc2");
    }

    #[test]
    fn test_ambient_fallbacks() {
        let mut ctx = identity();
        ctx.aws_region = None;
        ctx.aws_account_id = None;
        let naming = resolve_offline(&ctx).unwrap();
        assert_eq!(naming.region, DEFAULT_REGION);
        assert_eq!(naming.account_id, ACCOUNT_ID_SENTINEL);
    }

    #[test]
    fn test_ambient_values_used_when_absent() {
        let mut ctx = identity();
        ctx.aws_region = None;
        ctx.aws_account_id = None;
        let ambient = StaticAmbient {
            account_id: Some("210987654321".to_string()),
            region: Some("us-east-1".to_string()),
            ..StaticAmbient::default()
        };
        let naming = NamingResolver::new(&ambient, NamingRules::default())
            .resolve(&ctx)
            .unwrap();
        assert_eq!(naming.account_id, "210987654321");
        assert_eq!(naming.id, "df-unique-sbx-use1");
    }

    #[test]
    fn test_client_tag_key() {
        let mut ctx = identity();
        ctx.tenant_kind = TenantKind::Client;
        let naming = resolve_offline(&ctx).unwrap();
        assert_eq!(naming.tags.get("client:Id").map(String::as_str), Some("unique"));
        assert!(!naming.tags.contains_key("product:Id"));
    }

    #[test]
    fn test_client_errors_name_client_fields() {
        let mut ctx = identity();
        ctx.tenant_kind = TenantKind::Client;
        ctx.tenant_moniker = "Acme".to_string();
        let err = resolve_offline(&ctx).unwrap_err();
        assert_eq!(err.field, "client_moniker");

        let mut ctx = identity();
        ctx.tenant_kind = TenantKind::Client;
        ctx.tenant = String::new();
        let err = resolve_offline(&ctx).unwrap_err();
        assert_eq!(err.field, "client");
        assert!(err.to_string().starts_with("invalid client ''"));

        let mut ctx = identity();
        ctx.tenant_moniker = "Acme".to_string();
        assert_eq!(resolve_offline(&ctx).unwrap_err().field, "product_moniker");
    }

    #[test]
    fn test_invalid_account_id() {
        let mut ctx = identity();
        ctx.aws_account_id = Some("1234".to_string());
        let err = resolve_offline(&ctx).unwrap_err();
        assert_eq!(err.field, "aws_account_id");
    }
}
