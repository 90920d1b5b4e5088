//! When steps for deployment lifecycle BDD scenarios.

use super::world::{DeploymentWorld, run_async};
use agentregistry::deployment::{domain::ResourceType, services::DeployRequest};
use rstest_bdd_macros::when;

#[when(r#""{name}" version "{version}" is deployed to "{provider_id}""#)]
fn deploy_resource(
    world: &mut DeploymentWorld,
    name: String,
    version: String,
    provider_id: String,
) {
    let request = DeployRequest::new(name, version, ResourceType::Mcp, provider_id);
    world.last_deploy = Some(run_async(world.service.deploy(request)));
}
