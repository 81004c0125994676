// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

//! Waits that observe the cluster through the Kubernetes API.

use std::fmt::Debug;

use k8s_openapi::api::apps::v1::Deployment;
use kube::Api;
use log::info;
use poller::{Equals, Poller, WaitError};
use serde::de::DeserializeOwned;

use crate::conditions::Presence;

/// Waits until `name` can be fetched and returns it.
pub async fn wait_for_resource<K>(api: &Api<K>, name: &str, poller: &Poller) -> Result<K, WaitError>
where
    K: kube::Resource + Clone + Debug + DeserializeOwned,
{
    poller
        .wait_async(
            || {
                let api = api.clone();
                let name = name.to_string();
                async move { api.get(&name).await }
            },
            |_: &K| true,
        )
        .await
}

/// Waits until fetching `name` returns 404. Other API errors count as failed
/// observations and follow the poller's error policy.
pub async fn wait_for_resource_deleted<K>(
    api: &Api<K>,
    resource_name: &str,
    poller: &Poller,
) -> Result<(), WaitError>
where
    K: kube::Resource + Clone + Debug + DeserializeOwned,
{
    poller
        .wait_async(
            || {
                let api = api.clone();
                let name = resource_name.to_string();
                async move {
                    match api.get(&name).await {
                        Ok(_) => Ok(Presence::Present),
                        Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(Presence::Absent),
                        Err(e) => Err(e),
                    }
                }
            },
            Equals(Presence::Absent),
        )
        .await?;
    info!("{resource_name} is deleted");
    Ok(())
}

/// Waits until the deployment reports `replicas` available replicas.
pub async fn wait_for_deployment_available(
    api: &Api<Deployment>,
    deployment_name: &str,
    replicas: i32,
    poller: &Poller,
) -> Result<i32, WaitError> {
    let available = poller
        .wait_async(
            || {
                let api = api.clone();
                let name = deployment_name.to_string();
                async move {
                    let deployment = api.get(&name).await?;
                    Ok::<_, kube::Error>(
                        deployment
                            .status
                            .and_then(|s| s.available_replicas)
                            .unwrap_or(0),
                    )
                }
            },
            Equals(replicas),
        )
        .await?;
    info!("{deployment_name} deployment has {available} available replica(s)");
    Ok(available)
}
