//! Given steps for deployment lifecycle BDD scenarios.

use super::world::{DeploymentWorld, run_async};
use agentregistry::catalog::{
    domain::{CatalogServer, Package, PackageTransport, RegistryType},
    ports::CatalogRepository,
};
use agentregistry::deployment::{
    domain::{PlatformKey, Provider, ProviderId},
    ports::ProviderRepository,
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a provider "{provider_id}" on platform "{platform}""#)]
fn provider_on_platform(
    world: &mut DeploymentWorld,
    provider_id: String,
    platform: String,
) -> Result<(), eyre::Report> {
    let provider = Provider::new(
        ProviderId::new(provider_id.as_str())?,
        format!("{provider_id} provider"),
        PlatformKey::new(platform)?,
    )?;
    run_async(world.providers.register(&provider)).wrap_err("register scenario provider")?;
    Ok(())
}

#[given(r#"the catalog publishes "{name}" version "{version}" as an npm stdio package"#)]
fn npm_stdio_server(
    world: &mut DeploymentWorld,
    name: String,
    version: String,
) -> Result<(), eyre::Report> {
    let package = Package::new(RegistryType::Npm, "@example/echo", version.as_str())?;
    let server = CatalogServer::new(name, version.as_str())?.with_package(package);
    run_async(world.catalog.publish_server(&server)).wrap_err("publish stdio server")?;
    Ok(())
}

#[given(
    r#"the catalog publishes "{name}" version "{version}" as an OCI HTTP package on port {port:u16}"#
)]
fn oci_http_server(
    world: &mut DeploymentWorld,
    name: String,
    version: String,
    port: u16,
) -> Result<(), eyre::Report> {
    let package = Package::new(
        RegistryType::Oci,
        "ghcr.io/example/echo",
        version.as_str(),
    )?
    .with_transport(PackageTransport::StreamableHttp {
        port: Some(port),
        path: None,
    });
    let server = CatalogServer::new(name, version.as_str())?.with_package(package);
    run_async(world.catalog.publish_server(&server)).wrap_err("publish http server")?;
    Ok(())
}

#[given("the container runtime rejects every apply")]
fn container_runtime_rejects(world: &mut DeploymentWorld) {
    world
        .compose
        .set_failure(Some("Cannot connect to the Docker daemon".to_owned()));
}
