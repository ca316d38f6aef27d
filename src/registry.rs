//! Process-wide registry of schema descriptors
//!
//! Every schema builds its [`JsonSupport`] lazily on first use, independently of this
//! registry. Registering a schema additionally makes its descriptor discoverable by
//! name, which is what [`descriptor_by_name`] and [`json_module!`](crate::json_module) rely on.

use std::{
    any::TypeId,
    collections::{hash_map::Entry, HashMap},
    sync::{PoisonError, RwLock},
};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::{
    descriptor::{ObjectDescriptor, SchemaDefinitionError, SchemaId},
    schema::{JsonSchema, JsonSupport},
};

/// Error which occurred while obtaining the descriptor of a schema
#[non_exhaustive]
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum SchemaResolutionError {
    /// No schema with the name has been registered
    #[error("no schema named '{0}' has been registered")]
    NotRegistered(String),
    /// The descriptor of the schema could not be built
    #[error("schema {schema} is invalid: {source}")]
    InvalidSchema {
        /// Name of the schema
        schema: &'static str,
        /// Reason why the descriptor could not be built
        #[source]
        source: SchemaDefinitionError,
    },
    /// A different type has already been registered under the same schema name
    #[error("schema name '{name}' is already registered for a different type")]
    NameConflict {
        /// The conflicting schema name
        name: &'static str,
    },
}

static SCHEMAS_BY_NAME: Lazy<RwLock<HashMap<&'static str, &'static ObjectDescriptor>>> =
    Lazy::new(Default::default);

/// Gets the support of schema `T` and registers its descriptor
pub fn support<T: JsonSchema>() -> Result<&'static JsonSupport<T>, SchemaResolutionError> {
    let support = T::support()?;
    register_descriptor(support.descriptor())?;
    Ok(support)
}

/// Registers the descriptor of schema `T`, building it if necessary
///
/// Registering the same schema again has no effect.
pub fn register<T: JsonSchema>() -> Result<&'static ObjectDescriptor, SchemaResolutionError> {
    support::<T>().map(JsonSupport::descriptor)
}

fn register_descriptor(descriptor: &'static ObjectDescriptor) -> Result<(), SchemaResolutionError> {
    let id = descriptor.described_type();
    let check_existing = |existing: &ObjectDescriptor| {
        if existing.described_type() == id {
            Ok(())
        } else {
            Err(SchemaResolutionError::NameConflict { name: id.name() })
        }
    };

    if let Some(existing) = SCHEMAS_BY_NAME
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(id.name())
    {
        return check_existing(existing);
    }

    let mut schemas = SCHEMAS_BY_NAME
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    match schemas.entry(id.name()) {
        Entry::Occupied(entry) => check_existing(entry.get()),
        Entry::Vacant(entry) => {
            entry.insert(descriptor);
            log::debug!("registered schema {id}");
            Ok(())
        }
    }
}

/// Gets the descriptor of a registered schema by its name
pub fn descriptor_by_name(name: &str) -> Result<&'static ObjectDescriptor, SchemaResolutionError> {
    SCHEMAS_BY_NAME
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .copied()
        .ok_or_else(|| SchemaResolutionError::NotRegistered(name.to_owned()))
}

/// Gets the descriptor of a registered schema by its type
pub fn descriptor_by_type(type_id: TypeId) -> Option<&'static ObjectDescriptor> {
    SCHEMAS_BY_NAME
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .find(|descriptor| descriptor.described_type().type_id() == type_id)
        .copied()
}

/// Ids of all registered schemas, sorted by name
pub fn registered_schemas() -> Vec<SchemaId> {
    let mut schemas: Vec<SchemaId> = SCHEMAS_BY_NAME
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .map(|descriptor| descriptor.described_type())
        .collect();
    schemas.sort_by_key(|id| id.name());
    schemas
}

/// Declares a group of schemas which are registered together
///
/// Generates a unit struct with an associated `register` function registering every listed
/// schema, and a `schemas` function returning their ids.
///
/// ```
/// # use jsonbind::{json_module, json_schema, registry};
/// json_schema! {
///     pub struct UserAccount {
///         pub user_id: String as "userId",
///         pub id: i64,
///     }
/// }
///
/// json_module! {
///     /// Schemas of the accounts service
///     pub AccountsModule { UserAccount }
/// }
///
/// AccountsModule::register()?;
/// assert!(registry::descriptor_by_name("UserAccount")?.find_property("userId").is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[macro_export]
macro_rules! json_module {
    (
        $(#[$meta:meta])*
        $vis:vis $module:ident { $($schema:ty),* $(,)? }
    ) => {
        $(#[$meta])*
        $vis struct $module;

        impl $module {
            /// Registers all schemas of this module
            pub fn register() -> ::core::result::Result<(), $crate::registry::SchemaResolutionError> {
                $( $crate::registry::register::<$schema>()?; )*
                Ok(())
            }

            /// Ids of all schemas of this module, in declaration order
            pub fn schemas() -> ::std::vec::Vec<$crate::descriptor::SchemaId> {
                ::std::vec![$( $crate::descriptor::SchemaId::of::<$schema>() ),*]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        descriptor::{ObjectDescriptorBuilder, PropertyDescriptor},
        error::JsonError,
        reader::JsonReader,
        writer::JsonWriter,
    };

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    /// Schema implemented by hand, whose name collides with [`OtherNamedSample`]
    #[derive(Default)]
    struct NamedSample {
        value: i32,
    }

    impl JsonSchema for NamedSample {
        const NAME: &'static str = "RegistryTestSample";

        fn describe(builder: &mut ObjectDescriptorBuilder) -> Result<(), SchemaResolutionError> {
            builder.add_property(PropertyDescriptor::new(
                "value",
                "value",
                0,
                SchemaId::of::<Self>(),
            ));
            Ok(())
        }

        fn support() -> Result<&'static JsonSupport<Self>, SchemaResolutionError> {
            static SUPPORT: once_cell::sync::OnceCell<JsonSupport<NamedSample>> =
                once_cell::sync::OnceCell::new();
            SUPPORT.get_or_try_init(JsonSupport::build)
        }

        fn read_property<R: JsonReader + ?Sized>(
            &mut self,
            property: &PropertyDescriptor,
            reader: &mut R,
        ) -> Result<bool, JsonError> {
            match property.read_index() {
                0 => {
                    self.value = reader.next_int()?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        fn write_property<W: JsonWriter + ?Sized>(
            &self,
            property: &PropertyDescriptor,
            writer: &mut W,
        ) -> Result<bool, JsonError> {
            match property.write_index() {
                0 => {
                    writer.name(property.json_name())?;
                    writer.long_value(i64::from(self.value))?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    #[derive(Default)]
    struct OtherNamedSample;

    impl JsonSchema for OtherNamedSample {
        const NAME: &'static str = "RegistryTestSample";

        fn describe(_builder: &mut ObjectDescriptorBuilder) -> Result<(), SchemaResolutionError> {
            Ok(())
        }

        fn support() -> Result<&'static JsonSupport<Self>, SchemaResolutionError> {
            static SUPPORT: once_cell::sync::OnceCell<JsonSupport<OtherNamedSample>> =
                once_cell::sync::OnceCell::new();
            SUPPORT.get_or_try_init(JsonSupport::build)
        }

        fn read_property<R: JsonReader + ?Sized>(
            &mut self,
            _property: &PropertyDescriptor,
            _reader: &mut R,
        ) -> Result<bool, JsonError> {
            Ok(false)
        }

        fn write_property<W: JsonWriter + ?Sized>(
            &self,
            _property: &PropertyDescriptor,
            _writer: &mut W,
        ) -> Result<bool, JsonError> {
            Ok(false)
        }
    }

    #[test]
    fn register_and_lookup() -> TestResult {
        let descriptor = register::<NamedSample>()?;
        // Registering again returns the same descriptor
        assert!(std::ptr::eq(descriptor, register::<NamedSample>()?));
        assert!(std::ptr::eq(
            descriptor,
            descriptor_by_name("RegistryTestSample")?
        ));
        assert!(std::ptr::eq(
            descriptor,
            descriptor_by_type(TypeId::of::<NamedSample>()).unwrap()
        ));
        assert!(registered_schemas().contains(&SchemaId::of::<NamedSample>()));

        assert_eq!(
            SchemaResolutionError::NameConflict {
                name: "RegistryTestSample"
            },
            register::<OtherNamedSample>().unwrap_err()
        );
        // Support is still usable without registration
        assert!(OtherNamedSample::support().is_ok());
        Ok(())
    }

    #[test]
    fn unknown_name() {
        assert_eq!(
            SchemaResolutionError::NotRegistered("DoesNotExist".to_owned()),
            descriptor_by_name("DoesNotExist").unwrap_err()
        );
        assert!(descriptor_by_type(TypeId::of::<String>()).is_none());
    }
}
