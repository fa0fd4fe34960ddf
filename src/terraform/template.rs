//! Literal placeholder substitution for backend-config templates.
//!
//! Placeholders are written `{{NAME}}`. Only the known names are replaced;
//! anything else, including unknown placeholders and HCL interpolation, is
//! copied through untouched.

use crate::terraform::backend_config::BackendConfig;

pub const TEMPLATE_FILE_NAME: &str = "backend.conf.template";

/// Template written by `lzctl scaffold`
pub const DEFAULT_BACKEND_TEMPLATE: &str = r#"# Remote state for environment {{ENV}}
bucket       = "{{BUCKET}}"
key          = "{{KEY}}"
region       = "{{REGION}}"
encrypt      = true
kms_key_id   = "{{KMS_ALIAS}}"
use_lockfile = true
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Bucket,
    Key,
    Region,
    KmsAlias,
    Env,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::Bucket,
        Placeholder::Key,
        Placeholder::Region,
        Placeholder::KmsAlias,
        Placeholder::Env,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Bucket => "{{BUCKET}}",
            Placeholder::Key => "{{KEY}}",
            Placeholder::Region => "{{REGION}}",
            Placeholder::KmsAlias => "{{KMS_ALIAS}}",
            Placeholder::Env => "{{ENV}}",
        }
    }

    fn value<'a>(&self, config: &'a BackendConfig) -> &'a str {
        match self {
            Placeholder::Bucket => &config.bucket,
            Placeholder::Key => &config.key,
            Placeholder::Region => &config.region,
            Placeholder::KmsAlias => &config.kms_key_id,
            Placeholder::Env => &config.env_label,
        }
    }
}

/// Single left-to-right pass; substituted values are never rescanned.
pub fn render_template(template: &str, config: &BackendConfig) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        rendered.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match Placeholder::ALL
            .iter()
            .find(|placeholder| candidate.starts_with(placeholder.token()))
        {
            Some(placeholder) => {
                rendered.push_str(placeholder.value(config));
                rest = &candidate[placeholder.token().len()..];
            }
            None => {
                rendered.push_str("{{");
                rest = &candidate[2..];
            }
        }
    }
    rendered.push_str(rest);
    rendered
}
