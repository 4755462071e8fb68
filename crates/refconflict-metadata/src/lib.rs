//! Module metadata access.
//!
//! [`provider::MetadataProvider`] is the seam between the graph builder and
//! whatever reads module files. [`dotnet::DotnetProvider`] implements it for
//! .NET assemblies using `dotscope`, falling back to [`probe::GlobalProbe`]
//! when a module has to be found by full name. [`appconfig`] reads the
//! binding redirects of an application configuration file.

pub mod appconfig;
pub mod dotnet;
pub mod probe;
pub mod provider;
