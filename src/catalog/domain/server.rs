//! Published MCP server definitions.

use super::{CatalogDomainError, error::normalize_required};
use serde::{Deserialize, Serialize};

/// Package registry a server package is published to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryType {
    /// Node package run through `npx`.
    Npm,
    /// Python package run through `uvx`.
    Pypi,
    /// Container image.
    Oci,
    /// Any other registry; runnable only with a known runtime hint.
    #[serde(untagged)]
    Other(String),
}

impl RegistryType {
    /// Returns the registry name as published.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Npm => "npm",
            Self::Pypi => "pypi",
            Self::Oci => "oci",
            Self::Other(name) => name,
        }
    }
}

/// Transport a packaged server speaks once started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum PackageTransport {
    /// MCP over the process standard streams.
    #[default]
    Stdio,
    /// MCP over streamable HTTP.
    StreamableHttp {
        /// Port the server listens on.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<u16>,
        /// Request path, `/mcp` when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    /// MCP over HTTP server-sent events.
    Sse {
        /// Port the server listens on.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<u16>,
        /// Request path, `/sse` when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

/// One argument passed to a packaged server or its runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PackageArgument {
    /// A bare value at a fixed position.
    Positional {
        /// Literal value.
        value: String,
    },
    /// A `--name value` pair.
    Named {
        /// Flag name without leading dashes.
        name: String,
        /// Default value; the flag is emitted alone when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
}

impl PackageArgument {
    /// Creates a positional argument.
    #[must_use]
    pub fn positional(value: impl Into<String>) -> Self {
        Self::Positional {
            value: value.into(),
        }
    }

    /// Creates a named argument with a default value.
    #[must_use]
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Named {
            name: name.into().trim_start_matches('-').to_owned(),
            value: Some(value.into()),
        }
    }
}

/// Environment variable declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariable {
    /// Variable name.
    pub name: String,
    /// Default value applied when the deployment does not override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A runnable distribution of a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Registry the package is published to.
    pub registry_type: RegistryType,
    /// Package identifier (package name or image reference).
    pub identifier: String,
    /// Package version.
    pub version: String,
    /// Interpreter command suggested by the publisher (`npx`, `uvx`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_hint: Option<String>,
    /// Transport spoken by the started server.
    #[serde(default)]
    pub transport: PackageTransport,
    /// Arguments for the interpreter, placed before the package reference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime_arguments: Vec<PackageArgument>,
    /// Arguments for the server, placed after the package reference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_arguments: Vec<PackageArgument>,
    /// Environment variables read by the server.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment_variables: Vec<EnvironmentVariable>,
}

impl Package {
    /// Creates a package speaking stdio with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyPackageIdentifier`] when the
    /// identifier is empty after trimming.
    pub fn new(
        registry_type: RegistryType,
        identifier: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        Ok(Self {
            registry_type,
            identifier: normalize_required(identifier, CatalogDomainError::EmptyPackageIdentifier)?,
            version: version.into().trim().to_owned(),
            runtime_hint: None,
            transport: PackageTransport::Stdio,
            runtime_arguments: Vec::new(),
            package_arguments: Vec::new(),
            environment_variables: Vec::new(),
        })
    }

    /// Sets the transport.
    #[must_use]
    pub fn with_transport(mut self, transport: PackageTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Sets the runtime hint.
    #[must_use]
    pub fn with_runtime_hint(mut self, hint: impl Into<String>) -> Self {
        self.runtime_hint = Some(hint.into());
        self
    }

    /// Replaces the package arguments.
    #[must_use]
    pub fn with_package_arguments(
        mut self,
        arguments: impl IntoIterator<Item = PackageArgument>,
    ) -> Self {
        self.package_arguments = arguments.into_iter().collect();
        self
    }

    /// Declares an environment variable with an optional default.
    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, default: Option<String>) -> Self {
        self.environment_variables.push(EnvironmentVariable {
            name: name.into(),
            default,
        });
        self
    }
}

/// Transport of a remotely hosted server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteTransport {
    /// Streamable HTTP.
    StreamableHttp,
    /// Server-sent events.
    Sse,
}

impl RemoteTransport {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StreamableHttp => "streamable-http",
            Self::Sse => "sse",
        }
    }
}

/// Header sent to a remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHeader {
    /// Header name.
    pub name: String,
    /// Default value; deployments supply it through `HEADER_` overrides when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Endpoint of a remotely hosted server or agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoint {
    /// Transport spoken at the endpoint.
    #[serde(rename = "type")]
    pub transport: RemoteTransport,
    /// Endpoint URL.
    pub url: String,
    /// Headers to send.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<RemoteHeader>,
}

impl RemoteEndpoint {
    /// Creates a remote endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::InvalidRemoteUrl`] when the URL does not
    /// start with `http://` or `https://`.
    pub fn new(
        transport: RemoteTransport,
        url: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        let normalized = url.into().trim().to_owned();
        if !(normalized.starts_with("http://") || normalized.starts_with("https://")) {
            return Err(CatalogDomainError::InvalidRemoteUrl(normalized));
        }
        Ok(Self {
            transport,
            url: normalized,
            headers: Vec::new(),
        })
    }

    /// Adds a header with an optional default value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.headers.push(RemoteHeader {
            name: name.into(),
            value,
        });
        self
    }
}

/// A published MCP server version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogServer {
    /// Reverse-DNS style server name, for example `io.example/echo`.
    pub name: String,
    /// Published version.
    pub version: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Runnable packages, in publisher preference order.
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Hosted endpoints, in publisher preference order.
    #[serde(default)]
    pub remotes: Vec<RemoteEndpoint>,
}

impl CatalogServer {
    /// Creates a server entry with no packages or remotes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError`] when the name or version is empty.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        Ok(Self {
            name: normalize_required(name, CatalogDomainError::EmptyName)?,
            version: normalize_required(version, CatalogDomainError::EmptyVersion)?,
            description: String::new(),
            packages: Vec::new(),
            remotes: Vec::new(),
        })
    }

    /// Adds a package.
    #[must_use]
    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    /// Adds a remote endpoint.
    #[must_use]
    pub fn with_remote(mut self, remote: RemoteEndpoint) -> Self {
        self.remotes.push(remote);
        self
    }

    /// Returns the preferred package, if any.
    #[must_use]
    pub fn primary_package(&self) -> Option<&Package> {
        self.packages.first()
    }

    /// Returns the preferred remote endpoint, if any.
    #[must_use]
    pub fn primary_remote(&self) -> Option<&RemoteEndpoint> {
        self.remotes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn package_deserializes_registry_style_json() {
        let package: Package = serde_json::from_value(json!({
            "registryType": "npm",
            "identifier": "@example/echo",
            "version": "1.0.0",
            "transport": {"type": "streamable-http", "port": 3000},
            "packageArguments": [{"type": "named", "name": "verbose"}]
        }))
        .expect("package should deserialize");

        assert_eq!(package.registry_type, RegistryType::Npm);
        assert_eq!(
            package.transport,
            PackageTransport::StreamableHttp {
                port: Some(3000),
                path: None
            }
        );
        assert_eq!(package.package_arguments.len(), 1);
    }

    #[test]
    fn unknown_registry_type_is_preserved() {
        let registry: RegistryType =
            serde_json::from_value(json!("nuget")).expect("registry type should deserialize");

        assert_eq!(registry, RegistryType::Other("nuget".to_owned()));
    }

    #[test]
    fn remote_endpoint_requires_http_scheme() {
        let result = RemoteEndpoint::new(RemoteTransport::Sse, "ftp://example.com");

        assert!(matches!(
            result,
            Err(CatalogDomainError::InvalidRemoteUrl(_))
        ));
    }

    #[test]
    fn named_argument_strips_leading_dashes() {
        let argument = PackageArgument::named("--port", "8000");

        assert_eq!(
            argument,
            PackageArgument::Named {
                name: "port".to_owned(),
                value: Some("8000".to_owned())
            }
        );
    }
}
