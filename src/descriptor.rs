//! Descriptors of schema types and of their JSON properties
//!
//! An [`ObjectDescriptor`] is built once per schema type and then shared by every read and
//! write of that type. It maps JSON member names to [`PropertyDescriptor`]s, whose precomputed
//! read and write indices are what the generated dispatchers match on.

use std::{
    any::TypeId,
    collections::HashMap,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

use thiserror::Error;

/// Identity of a schema type
///
/// Two ids are equal if they refer to the same Rust type; the name is only used for
/// diagnostics and for the [registry](crate::registry).
#[derive(Clone, Copy, Debug)]
pub struct SchemaId {
    name: &'static str,
    type_id: TypeId,
}

impl SchemaId {
    /// Creates the id of type `T` with the given schema name
    pub fn new<T: 'static>(name: &'static str) -> Self {
        SchemaId {
            name,
            type_id: TypeId::of::<T>(),
        }
    }

    /// Creates the id of a schema type, using its [`NAME`](crate::JsonSchema::NAME)
    pub fn of<T: crate::JsonSchema>() -> Self {
        SchemaId::new::<T>(T::NAME)
    }

    /// Name of the schema
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// [`TypeId`] of the schema type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Whether this id refers to the type `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for SchemaId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SchemaId {}

impl Hash for SchemaId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Display for SchemaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Describes one JSON property of a schema
///
/// Read and write indices are two independent numbering spaces; each of them is unique
/// within the [`ObjectDescriptor`] declaring the property.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PropertyDescriptor {
    json_name: &'static str,
    internal_name: &'static str,
    read_index: u32,
    write_index: u32,
    reader_type: SchemaId,
    writer_type: SchemaId,
}

impl PropertyDescriptor {
    /// Creates a property which is read and written by the dispatchers of `owner`,
    /// using the same index for reading and writing
    pub fn new(
        json_name: &'static str,
        internal_name: &'static str,
        index: u32,
        owner: SchemaId,
    ) -> Self {
        PropertyDescriptor::with_indices(json_name, internal_name, index, index, owner, owner)
    }

    /// Creates a property with separate read and write indices and dispatch owners
    pub fn with_indices(
        json_name: &'static str,
        internal_name: &'static str,
        read_index: u32,
        write_index: u32,
        reader_type: SchemaId,
        writer_type: SchemaId,
    ) -> Self {
        PropertyDescriptor {
            json_name,
            internal_name,
            read_index,
            write_index,
            reader_type,
            writer_type,
        }
    }

    /// Name of the member in JSON documents
    pub fn json_name(&self) -> &'static str {
        self.json_name
    }

    /// Name of the Rust field
    pub fn internal_name(&self) -> &'static str {
        self.internal_name
    }

    /// Index matched by the read dispatcher
    pub fn read_index(&self) -> u32 {
        self.read_index
    }

    /// Index matched by the write dispatcher
    pub fn write_index(&self) -> u32 {
        self.write_index
    }

    /// Schema whose read dispatcher stores the value of this property
    pub fn reader_type(&self) -> SchemaId {
        self.reader_type
    }

    /// Schema whose write dispatcher emits this property
    pub fn writer_type(&self) -> SchemaId {
        self.writer_type
    }
}

/// Error for an inconsistent schema declaration, detected when its descriptor is built
#[non_exhaustive]
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum SchemaDefinitionError {
    /// [`ObjectDescriptorBuilder::set_described_type`] was not called
    #[error("described type of the object descriptor has not been set")]
    MissingDescribedType,
    /// A property has an empty JSON name
    #[error("property '{property}' of {schema} has an empty JSON name")]
    EmptyPropertyName {
        /// Name of the schema
        schema: &'static str,
        /// Rust name of the property
        property: &'static str,
    },
    /// Two properties of the same schema have the same JSON name
    #[error("{schema} declares the JSON name '{name}' more than once")]
    DuplicatePropertyName {
        /// Name of the schema
        schema: &'static str,
        /// The duplicate JSON name
        name: &'static str,
    },
    /// Two properties of the same schema have the same read index
    #[error("{schema} uses read index {index} for more than one property")]
    DuplicateReadIndex {
        /// Name of the schema
        schema: &'static str,
        /// The duplicate index
        index: u32,
    },
    /// Two properties of the same schema have the same write index
    #[error("{schema} uses write index {index} for more than one property")]
    DuplicateWriteIndex {
        /// Name of the schema
        schema: &'static str,
        /// The duplicate index
        index: u32,
    },
    /// A property redeclares a JSON name which an ancestor schema already declares
    #[error("property '{name}' of {schema} shadows the property of the same name in {ancestor}")]
    ShadowedPropertyName {
        /// Name of the schema
        schema: &'static str,
        /// The shadowed JSON name
        name: &'static str,
        /// Name of the ancestor schema declaring `name`
        ancestor: &'static str,
    },
}

/// Describes the JSON properties of a schema type
///
/// Immutable once built. Properties of ancestor schemas are not copied; they are
/// found through the [super descriptor](Self::super_descriptor) chain.
#[derive(Debug)]
pub struct ObjectDescriptor {
    described_type: SchemaId,
    super_descriptor: Option<&'static ObjectDescriptor>,
    /// Own properties, in declaration order
    properties: Vec<PropertyDescriptor>,
    properties_by_json_name: HashMap<&'static str, usize>,
    properties_by_read_index: HashMap<u32, usize>,
    properties_by_write_index: HashMap<u32, usize>,
}

impl ObjectDescriptor {
    /// Type described by this descriptor
    pub fn described_type(&self) -> SchemaId {
        self.described_type
    }

    /// Descriptor of the base schema, if any
    pub fn super_descriptor(&self) -> Option<&'static ObjectDescriptor> {
        self.super_descriptor
    }

    /// Own properties in declaration order, without the inherited ones
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Finds an own property by its JSON name
    pub fn find_own_property(&self, json_name: &str) -> Option<&PropertyDescriptor> {
        self.properties_by_json_name
            .get(json_name)
            .map(|&index| &self.properties[index])
    }

    /// Finds a property by its JSON name, first among the own properties and then in the
    /// ancestor chain
    pub fn find_property(&self, json_name: &str) -> Option<&PropertyDescriptor> {
        self.self_and_ancestors()
            .find_map(|descriptor| descriptor.find_own_property(json_name))
    }

    /// Finds an own property by its read index
    pub fn property_by_read_index(&self, read_index: u32) -> Option<&PropertyDescriptor> {
        self.properties_by_read_index
            .get(&read_index)
            .map(|&index| &self.properties[index])
    }

    /// Finds an own property by its write index
    pub fn property_by_write_index(&self, write_index: u32) -> Option<&PropertyDescriptor> {
        self.properties_by_write_index
            .get(&write_index)
            .map(|&index| &self.properties[index])
    }

    /// Iterates over this descriptor followed by its ancestors, ending with the root schema
    pub fn self_and_ancestors(&self) -> impl Iterator<Item = &ObjectDescriptor> + '_ {
        std::iter::successors(Some(self), |descriptor| descriptor.super_descriptor)
    }

    /// All properties including inherited ones, in the order in which they are written:
    /// properties of the root schema first, own properties last
    pub fn all_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> + '_ {
        let mut chain: Vec<&ObjectDescriptor> = self.self_and_ancestors().collect();
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|descriptor| descriptor.properties.iter())
    }
}

/// Builder for an [`ObjectDescriptor`]
///
/// ```
/// # use jsonbind::descriptor::*;
/// # #[allow(dead_code)]
/// struct Account;
/// let account = SchemaId::new::<Account>("Account");
///
/// let mut builder = ObjectDescriptorBuilder::new();
/// builder
///     .set_described_type(account)
///     .add_property(PropertyDescriptor::new("userId", "user_id", 0, account))
///     .add_property(PropertyDescriptor::new("id", "id", 1, account));
/// let descriptor = builder.build()?;
///
/// assert_eq!(1, descriptor.find_property("id").unwrap().read_index());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default, Debug)]
pub struct ObjectDescriptorBuilder {
    described_type: Option<SchemaId>,
    super_descriptor: Option<&'static ObjectDescriptor>,
    properties: Vec<PropertyDescriptor>,
}

impl ObjectDescriptorBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        ObjectDescriptorBuilder::default()
    }

    /// Sets the type described by the built descriptor; required
    pub fn set_described_type(&mut self, described_type: SchemaId) -> &mut Self {
        self.described_type = Some(described_type);
        self
    }

    /// Sets the descriptor of the base schema
    pub fn set_super_descriptor(&mut self, super_descriptor: &'static ObjectDescriptor) -> &mut Self {
        self.super_descriptor = Some(super_descriptor);
        self
    }

    /// Adds an own property; declaration order is the write order
    pub fn add_property(&mut self, property: PropertyDescriptor) -> &mut Self {
        self.properties.push(property);
        self
    }

    /// Validates the properties and builds the descriptor
    pub fn build(self) -> Result<ObjectDescriptor, SchemaDefinitionError> {
        let described_type = self
            .described_type
            .ok_or(SchemaDefinitionError::MissingDescribedType)?;
        let schema = described_type.name();

        let mut properties_by_json_name = HashMap::with_capacity(self.properties.len());
        let mut properties_by_read_index = HashMap::with_capacity(self.properties.len());
        let mut properties_by_write_index = HashMap::with_capacity(self.properties.len());

        for (index, property) in self.properties.iter().enumerate() {
            let name = property.json_name;
            if name.is_empty() {
                return Err(SchemaDefinitionError::EmptyPropertyName {
                    schema,
                    property: property.internal_name,
                });
            }
            if properties_by_json_name.insert(name, index).is_some() {
                return Err(SchemaDefinitionError::DuplicatePropertyName { schema, name });
            }
            if properties_by_read_index
                .insert(property.read_index, index)
                .is_some()
            {
                return Err(SchemaDefinitionError::DuplicateReadIndex {
                    schema,
                    index: property.read_index,
                });
            }
            if properties_by_write_index
                .insert(property.write_index, index)
                .is_some()
            {
                return Err(SchemaDefinitionError::DuplicateWriteIndex {
                    schema,
                    index: property.write_index,
                });
            }

            let shadowed = self.super_descriptor.and_then(|super_descriptor| {
                super_descriptor
                    .self_and_ancestors()
                    .find(|ancestor| ancestor.find_own_property(name).is_some())
            });
            if let Some(ancestor) = shadowed {
                return Err(SchemaDefinitionError::ShadowedPropertyName {
                    schema,
                    name,
                    ancestor: ancestor.described_type.name(),
                });
            }
        }

        Ok(ObjectDescriptor {
            described_type,
            super_descriptor: self.super_descriptor,
            properties: self.properties,
            properties_by_json_name,
            properties_by_read_index,
            properties_by_write_index,
        })
    }
}
