//! SUT and case registries: immutable-after-population catalogs of
//! factories, generalizing `catalog::Catalog` and `schema::catalog::SchemaCatalog`'s
//! register/lookup/duplicate-check shape from relation schemas to SUT and
//! case factories.

mod case_registry;
mod error;
mod sut_registry;

pub use case_registry::CaseRegistry;
pub use error::RegistryError;
pub use sut_registry::SutRegistry;
