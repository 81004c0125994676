// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use harness::{Cli, HarnessConfig, k8s};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{DeleteParams, ObjectMeta, PostParams};
use kube::{Api, Client};
use log::info;
use poller::Poller;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

/// A namespace of its own plus a CLI and API client pointed at it.
pub struct TestContext {
    client: Client,
    cli: Cli,
    poller: Poller,
    test_namespace: String,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        INIT.call_once(|| {
            let _ = env_logger::builder().is_test(true).try_init();
        });

        let config_path = std::env::var_os("HARNESS_CONFIG").map(PathBuf::from);
        let mut config = HarnessConfig::load(config_path.as_deref())?;
        let poller = config.poll.poller().with_immediate(true);

        let client = Client::try_default().await?;
        let namespace = test_namespace_name();
        create_test_namespace(&client, &namespace, &poller).await?;
        config.namespace = Some(namespace.clone());

        Ok(Self {
            client,
            cli: Cli::new(config),
            poller,
            test_namespace: namespace,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    pub fn namespace(&self) -> &str {
        &self.test_namespace
    }

    pub async fn cleanup(&self) -> anyhow::Result<()> {
        cleanup_test_namespace(&self.client, &self.test_namespace, &self.poller).await
    }
}

#[macro_export]
macro_rules! setup {
    () => {{ $crate::common::TestContext::new() }};
}

/// Creates a labelled namespace through the API and waits until it can be read back.
pub async fn create_test_namespace(client: &Client, name: &str, poller: &Poller) -> anyhow::Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let namespace = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([(
                "cluster-poll/e2e".to_string(),
                "true".to_string(),
            )])),
            ..Default::default()
        },
        ..Default::default()
    };
    namespaces.create(&PostParams::default(), &namespace).await?;
    k8s::wait_for_resource(&namespaces, name, poller).await?;
    info!("Running in namespace {name}");
    Ok(())
}

/// Deletes the namespace and waits for it to be gone. A namespace that is
/// already gone counts as cleaned up.
pub async fn cleanup_test_namespace(client: &Client, name: &str, poller: &Poller) -> anyhow::Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    match namespaces.delete(name, &DeleteParams::background()).await {
        Ok(_) => {}
        Err(kube::Error::Api(ae)) if ae.code == 404 => return Ok(()),
        Err(e) => return Err(e.into()),
    }
    k8s::wait_for_resource_deleted(&namespaces, name, poller).await?;
    info!("Namespace {name} removed");
    Ok(())
}

pub fn test_namespace_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("e2e-{}", &id[..10])
}
