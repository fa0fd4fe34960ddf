#![allow(dead_code)]

use lzctl::bootstrap::StateBackend;
use lzctl::naming::resolver::{resolve, AccountTarget, NamingRules, ResolvedNaming};
use lzctl::naming::{IdentityContext, TenantKind};
use lzctl::terraform::layers::{Layer, LayerPaths};
use lzctl::terraform::template::DEFAULT_BACKEND_TEMPLATE;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

pub const IDENTITY_TFVARS: &str = r#"# Identity shared by every layer
org_name         = "Dragonfly"
org_moniker      = "df"
product_name     = "Unique"
product_moniker  = "unique"
environment      = "sbx"
aws_region       = "eu-central-2"
aws_account_id   = "123456789012"
semantic_version = "1.4.0"
"#;

/// What the fake remote backend has seen and holds
#[derive(Debug, Default)]
pub struct FakeRemote {
    pub exists: bool,
    pub calls: Vec<String>,
    pub fail_on: Option<&'static str>,
    pub outputs: HashMap<String, String>,
}

impl FakeRemote {
    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub remote: Rc<RefCell<FakeRemote>>,
}

impl FakeBackend {
    pub fn with_existing_remote() -> Self {
        let backend = Self::default();
        backend.remote.borrow_mut().exists = true;
        backend
    }

    pub fn failing_on(call: &'static str) -> Self {
        let backend = Self::default();
        backend.remote.borrow_mut().fail_on = Some(call);
        backend
    }

    fn record(&self, call: &str) -> anyhow::Result<()> {
        let mut remote = self.remote.borrow_mut();
        remote.calls.push(call.to_string());
        if remote.fail_on == Some(call) {
            return Err(anyhow::anyhow!("{} failed", call));
        }
        Ok(())
    }

    fn require_remote(&self) -> anyhow::Result<()> {
        if self.remote.borrow().exists {
            Ok(())
        } else {
            Err(anyhow::anyhow!("S3 bucket does not exist"))
        }
    }
}

impl StateBackend for FakeBackend {
    fn disable_remote_backend(&mut self) -> anyhow::Result<()> {
        self.record("disable_remote_backend")
    }

    fn enable_remote_backend(&mut self) -> anyhow::Result<()> {
        self.record("enable_remote_backend")
    }

    fn init_local(&mut self) -> anyhow::Result<()> {
        self.record("init_local")
    }

    fn init_remote(&mut self, backend_config: &Path) -> anyhow::Result<()> {
        self.record("init_remote")?;
        if !backend_config.exists() {
            return Err(anyhow::anyhow!("missing {}", backend_config.display()));
        }
        self.require_remote()
    }

    fn list_state(&mut self) -> anyhow::Result<Vec<String>> {
        self.record("list_state")?;
        self.require_remote()?;
        Ok(vec![
            "aws_s3_bucket.state".to_string(),
            "aws_kms_key.state".to_string(),
        ])
    }

    fn plan(&mut self) -> anyhow::Result<()> {
        self.record("plan")
    }

    fn apply(&mut self, _auto_approve: bool) -> anyhow::Result<()> {
        self.record("apply")
    }

    fn outputs(&mut self) -> anyhow::Result<HashMap<String, String>> {
        self.record("outputs")?;
        Ok(self.remote.borrow().outputs.clone())
    }

    fn migrate_state(&mut self, _backend_config: &Path) -> anyhow::Result<()> {
        self.record("migrate_state")?;
        self.remote.borrow_mut().exists = true;
        Ok(())
    }
}

pub fn identity() -> IdentityContext {
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
        semantic_version: "1.4.0".to_string(),
        org_domain: None,
        data_residency: None,
        pipeline: None,
        cost_center: None,
    }
}

pub fn bootstrap_naming() -> ResolvedNaming {
    let target = AccountTarget {
        account_id: "123456789012".to_string(),
        region: "eu-central-2".to_string(),
    };
    resolve(&identity(), &target, &NamingRules::default()).expect("valid identity")
}

/// A landing-zone tree with every layer templated and sbx identity vars
pub fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for layer in Layer::ALL {
        let paths = LayerPaths::new(dir.path(), layer);
        std::fs::create_dir_all(&paths.directory).expect("create layer dir");
        std::fs::write(paths.template(), DEFAULT_BACKEND_TEMPLATE).expect("write template");
    }

    let tfvars = LayerPaths::new(dir.path(), Layer::Bootstrap)
        .tfvars(lzctl::naming::Environment::Sbx);
    std::fs::create_dir_all(tfvars.parent().expect("tfvars parent")).expect("create env dir");
    std::fs::write(tfvars, IDENTITY_TFVARS).expect("write tfvars");
    dir
}

pub fn remove_template(root: &Path, layer: Layer) {
    std::fs::remove_file(LayerPaths::new(root, layer).template()).expect("remove template");
}

/// Contents of every generated backend config, by layer
pub fn generated_configs(root: &Path) -> Vec<(Layer, String)> {
    Layer::ALL
        .into_iter()
        .filter_map(|layer| {
            let path = LayerPaths::new(root, layer).backend_config(lzctl::naming::Environment::Sbx);
            std::fs::read_to_string(path).ok().map(|content| (layer, content))
        })
        .collect()
}
