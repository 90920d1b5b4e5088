//! Then steps for deployment lifecycle BDD scenarios.

use super::world::{DeploymentWorld, run_async};
use agentregistry::deployment::{domain::DeploymentStatus, ports::DeploymentRepository};
use agentregistry::runtime::translation::{COMPOSE_FILE, ComposeProject, GATEWAY_CONFIG_FILE};
use rstest_bdd_macros::then;
use serde_yaml::Value;

fn read_compose(world: &DeploymentWorld) -> Result<ComposeProject, eyre::Report> {
    let raw = std::fs::read_to_string(world.runtime_file(COMPOSE_FILE)?)?;
    Ok(serde_yaml::from_str(&raw)?)
}

fn gateway_target(world: &DeploymentWorld, name: &str) -> Result<Value, eyre::Report> {
    let raw = std::fs::read_to_string(world.runtime_file(GATEWAY_CONFIG_FILE)?)?;
    let document: Value = serde_yaml::from_str(&raw)?;
    let binds = document["binds"].as_sequence().cloned().unwrap_or_default();
    binds
        .iter()
        .flat_map(|bind| bind["listeners"].as_sequence().cloned().unwrap_or_default())
        .flat_map(|listener| listener["routes"].as_sequence().cloned().unwrap_or_default())
        .flat_map(|route| route["backends"].as_sequence().cloned().unwrap_or_default())
        .flat_map(|backend| {
            backend["mcp"]["targets"]
                .as_sequence()
                .cloned()
                .unwrap_or_default()
        })
        .find(|target| target["name"].as_str() == Some(name))
        .ok_or_else(|| eyre::eyre!("gateway has no MCP target named {name}"))
}

#[then(r#"the deployment is "{status}""#)]
fn deployment_status_is(world: &DeploymentWorld, status: String) -> Result<(), eyre::Report> {
    let expected = DeploymentStatus::try_from(status.as_str())?;
    let deployment = world.deployed()?;
    if deployment.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            deployment.status()
        ));
    }
    Ok(())
}

#[then(r#"the gateway runs "{name}" with npx "{args}""#)]
fn gateway_runs_with_npx(
    world: &DeploymentWorld,
    name: String,
    args: String,
) -> Result<(), eyre::Report> {
    let target = gateway_target(world, &name)?;
    let stdio = &target["stdio"];
    if stdio["cmd"].as_str() != Some("npx") {
        return Err(eyre::eyre!("expected npx stdio target, got {target:?}"));
    }
    let expected: Vec<&str> = args.split_whitespace().collect();
    let actual: Vec<&str> = stdio["args"]
        .as_sequence()
        .map(|values| values.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if actual != expected {
        return Err(eyre::eyre!("expected npx args {expected:?}, got {actual:?}"));
    }
    Ok(())
}

#[then(r#"the gateway routes "{name}" to "{address}""#)]
fn gateway_routes_to(
    world: &DeploymentWorld,
    name: String,
    address: String,
) -> Result<(), eyre::Report> {
    let target = gateway_target(world, &name)?;
    let http = &target["mcp"];
    let actual = format!(
        "{}:{}{}",
        http["host"].as_str().unwrap_or_default(),
        http["port"].as_u64().unwrap_or_default(),
        http["path"].as_str().unwrap_or_default()
    );
    if actual != address {
        return Err(eyre::eyre!("expected {address}, gateway routes to {actual}"));
    }
    Ok(())
}

#[then(r#"the compose project has a service "{name}""#)]
fn compose_has_service(world: &DeploymentWorld, name: String) -> Result<(), eyre::Report> {
    let compose = read_compose(world)?;
    if !compose.services.contains_key(&name) {
        return Err(eyre::eyre!(
            "compose services {:?} lack {name}",
            compose.services.keys().collect::<Vec<_>>()
        ));
    }
    Ok(())
}

#[then(r#"the compose project has no service "{name}""#)]
fn compose_lacks_service(world: &DeploymentWorld, name: String) -> Result<(), eyre::Report> {
    let compose = read_compose(world)?;
    if compose.services.contains_key(&name) {
        return Err(eyre::eyre!("compose unexpectedly defines service {name}"));
    }
    Ok(())
}

#[then(r#"the deploy fails with "{message}""#)]
fn deploy_fails_with(world: &DeploymentWorld, message: String) -> Result<(), eyre::Report> {
    match world.last_deploy.as_ref() {
        Some(Err(err)) if err.to_string().contains(&message) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected error containing {message:?}, got {err}")),
        Some(Ok(deployment)) => Err(eyre::eyre!("deploy unexpectedly succeeded: {deployment:?}")),
        None => Err(eyre::eyre!("no deploy attempted in scenario")),
    }
}

#[then("no deployments are recorded")]
fn no_deployments_recorded(world: &DeploymentWorld) -> Result<(), eyre::Report> {
    let recorded = run_async(world.deployments.list_all())?;
    if !recorded.is_empty() {
        return Err(eyre::eyre!("expected no deployments, found {recorded:?}"));
    }
    Ok(())
}

#[then(r#"the "{platform}" adapter received "{call}""#)]
fn adapter_received(
    world: &DeploymentWorld,
    platform: String,
    call: String,
) -> Result<(), eyre::Report> {
    if platform != "acme" {
        return Err(eyre::eyre!("scenario world only records the acme platform"));
    }
    let calls = world.acme.calls();
    if !calls.contains(&call) {
        return Err(eyre::eyre!("acme adapter calls {calls:?} lack {call:?}"));
    }
    Ok(())
}

#[then("the container runtime was not invoked")]
fn container_runtime_not_invoked(world: &DeploymentWorld) -> Result<(), eyre::Report> {
    let invocations = world.compose.invocations();
    if !invocations.is_empty() {
        return Err(eyre::eyre!("expected no compose invocations, got {invocations:?}"));
    }
    Ok(())
}
