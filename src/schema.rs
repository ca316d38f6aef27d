//! Traits connecting schema types to JSON readers and writers
//!
//! [`JsonSchema`] is implemented for every record type, normally by the
//! [`json_schema!`](crate::json_schema) macro. Its provided methods contain the object read and
//! write loops; the implementor only supplies the two index-based dispatchers.
//! [`JsonField`] describes how a single field value is read and written, it is implemented for
//! the supported primitive types, strings, `Option`, `Box`, collections and all schema types.

use std::{
    collections::{LinkedList, VecDeque},
    fmt::{Debug, Formatter},
};

use duplicate::duplicate_item;

use crate::{
    descriptor::{ObjectDescriptor, ObjectDescriptorBuilder, PropertyDescriptor, SchemaId},
    error::JsonError,
    reader::{JsonReader, Token},
    registry::SchemaResolutionError,
    writer::JsonWriter,
};

/// A record type which can be read from and written to a JSON object
///
/// Implementations are normally generated by [`json_schema!`](crate::json_schema), which
/// dispatches on the precomputed [read index](PropertyDescriptor::read_index) and
/// [write index](PropertyDescriptor::write_index) of a property with a `match`, so no
/// member name is compared after the descriptor lookup.
pub trait JsonSchema: Default + Sized + 'static {
    /// Name of the schema, used in error messages and by the [registry](crate::registry)
    const NAME: &'static str;

    /// Adds the properties of this schema to the descriptor builder
    ///
    /// The described type has already been set. Schemas which extend a base schema set the
    /// descriptor of the base as super descriptor.
    fn describe(builder: &mut ObjectDescriptorBuilder) -> Result<(), SchemaResolutionError>;

    /// Gets the lazily built support triple of this schema
    ///
    /// The support is built at most once per process; concurrent first calls wait for that
    /// build and then all observe the same instance.
    fn support() -> Result<&'static JsonSupport<Self>, SchemaResolutionError>;

    /// Reads the value of `property` and stores it in the corresponding field
    ///
    /// Returns `false` if this schema has no field for the property, the caller then skips
    /// the value.
    fn read_property<R: JsonReader + ?Sized>(
        &mut self,
        property: &PropertyDescriptor,
        reader: &mut R,
    ) -> Result<bool, JsonError>;

    /// Writes the member name and value of `property`
    ///
    /// Returns `false` if this schema has no field for the property.
    fn write_property<W: JsonWriter + ?Sized>(
        &self,
        property: &PropertyDescriptor,
        writer: &mut W,
    ) -> Result<bool, JsonError>;

    /// Gets the descriptor of this schema
    fn descriptor() -> Result<&'static ObjectDescriptor, SchemaResolutionError> {
        Ok(Self::support()?.descriptor())
    }

    /// Reads a JSON object as new value of this schema
    ///
    /// Fields without a member in the JSON object keep their default value.
    fn read_json<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Self, JsonError> {
        let mut value = Self::default();
        value.read_json_into(reader)?;
        Ok(value)
    }

    /// Reads a JSON object into this value, overwriting the fields for which the object
    /// has a member
    ///
    /// Members without a corresponding property are skipped, including their value.
    fn read_json_into<R: JsonReader + ?Sized>(&mut self, reader: &mut R) -> Result<(), JsonError> {
        let descriptor = Self::descriptor()?;
        reader.begin_object()?;
        while reader.has_next()? {
            let property = descriptor.find_property(reader.next_name()?);
            let handled = match property {
                Some(property) => self.read_property(property, reader)?,
                None => false,
            };
            if !handled {
                log::trace!("skipping unknown member {} of {}", reader.path(), Self::NAME);
                reader.skip_value()?;
            }
        }
        reader.end_object()?;
        Ok(())
    }

    /// Writes this value as JSON object
    ///
    /// Properties of base schemas are written first, then the own properties in
    /// declaration order.
    fn write_json<W: JsonWriter + ?Sized>(&self, writer: &mut W) -> Result<(), JsonError> {
        let descriptor = Self::descriptor()?;
        writer.begin_object()?;
        write_properties(self, descriptor, writer)?;
        writer.end_object()?;
        Ok(())
    }
}

fn write_properties<T: JsonSchema, W: JsonWriter + ?Sized>(
    value: &T,
    descriptor: &ObjectDescriptor,
    writer: &mut W,
) -> Result<(), JsonError> {
    if let Some(super_descriptor) = descriptor.super_descriptor() {
        write_properties(value, super_descriptor, writer)?;
    }
    for property in descriptor.properties() {
        value.write_property(property, writer)?;
    }
    Ok(())
}

/// A type which can be the type of a schema field
///
/// Using a field type without implementation in [`json_schema!`](crate::json_schema) is a
/// compile error.
pub trait JsonField: Sized {
    /// Reads a value of this type
    fn read_field<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Self, JsonError>;

    /// Writes this value
    fn write_field<W: JsonWriter + ?Sized>(&self, writer: &mut W) -> Result<(), JsonError>;

    /// Reads a value of this type, or `None` for a JSON `null`
    fn read_nullable<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Option<Self>, JsonError> {
        if reader.peek()? == Token::Null {
            reader.next_null()?;
            return Ok(None);
        }
        Self::read_field(reader).map(Some)
    }
}

// Use `duplicate` crate to avoid repeating code for all supported types, see https://stackoverflow.com/a/61467564
#[duplicate_item(
    field_type  read_method             read_boxed_method               write_method    wide_type;
    [i8]        [next_byte]             [next_boxed_byte]               [long_value]    [i64];
    [i16]       [next_short]            [next_boxed_short]              [long_value]    [i64];
    [i32]       [next_int]              [next_boxed_int]                [long_value]    [i64];
    [i64]       [next_long]             [next_boxed_long]               [long_value]    [i64];
    [u8]        [next_unsigned_byte]    [next_boxed_unsigned_byte]      [long_value]    [i64];
    [u16]       [next_unsigned_short]   [next_boxed_unsigned_short]     [long_value]    [i64];
    [f32]       [next_float]            [next_boxed_float]              [double_value]  [f64];
    [f64]       [next_double]           [next_boxed_double]             [double_value]  [f64];
    [bool]      [next_bool]             [next_boxed_bool]               [bool_value]    [bool]
)]
impl JsonField for field_type {
    fn read_field<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Self, JsonError> {
        Ok(reader.read_method()?)
    }

    fn write_field<W: JsonWriter + ?Sized>(&self, writer: &mut W) -> Result<(), JsonError> {
        writer.write_method(wide_type::from(*self))?;
        Ok(())
    }

    fn read_nullable<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Option<Self>, JsonError> {
        Ok(reader.read_boxed_method()?)
    }
}

impl JsonField for String {
    fn read_field<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Self, JsonError> {
        Ok(reader.next_string()?)
    }

    fn write_field<W: JsonWriter + ?Sized>(&self, writer: &mut W) -> Result<(), JsonError> {
        writer.string_value(self)?;
        Ok(())
    }

    fn read_nullable<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Option<Self>, JsonError> {
        Ok(reader.next_boxed_string()?)
    }
}

impl<T: JsonField> JsonField for Option<T> {
    fn read_field<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Self, JsonError> {
        T::read_nullable(reader)
    }

    fn write_field<W: JsonWriter + ?Sized>(&self, writer: &mut W) -> Result<(), JsonError> {
        match self {
            Some(value) => value.write_field(writer),
            None => {
                writer.null_value()?;
                Ok(())
            }
        }
    }
}

impl<T: JsonField> JsonField for Box<T> {
    fn read_field<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Self, JsonError> {
        T::read_field(reader).map(Box::new)
    }

    fn write_field<W: JsonWriter + ?Sized>(&self, writer: &mut W) -> Result<(), JsonError> {
        T::write_field(self, writer)
    }

    fn read_nullable<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Option<Self>, JsonError> {
        Ok(T::read_nullable(reader)?.map(Box::new))
    }
}

#[duplicate_item(collection; [Vec<T>]; [VecDeque<T>]; [LinkedList<T>])]
impl<T: JsonField> JsonField for collection {
    fn read_field<R: JsonReader + ?Sized>(reader: &mut R) -> Result<Self, JsonError> {
        read_collection::<T, _, _>(reader, Self::default())
    }

    fn write_field<W: JsonWriter + ?Sized>(&self, writer: &mut W) -> Result<(), JsonError> {
        write_collection(writer, self)
    }
}

/// Reads a JSON array into the given collection
///
/// Every element is read with [`JsonField::read_field`] and appended to `collection`, which is
/// then returned; the caller therefore decides the concrete collection type.
///
/// ```
/// # use std::collections::LinkedList;
/// # use jsonbind::{reader::JsonStreamReader, read_collection};
/// let mut json_reader = JsonStreamReader::new("[3, 1, 2]".as_bytes());
/// let values = read_collection::<i32, _, _>(&mut json_reader, LinkedList::new())?;
/// assert_eq!(vec![3, 1, 2], values.into_iter().collect::<Vec<_>>());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn read_collection<T: JsonField, C: Extend<T>, R: JsonReader + ?Sized>(
    reader: &mut R,
    mut collection: C,
) -> Result<C, JsonError> {
    reader.begin_array()?;
    while reader.has_next()? {
        collection.extend(std::iter::once(T::read_field(reader)?));
    }
    reader.end_array()?;
    Ok(collection)
}

/// Writes the items as JSON array, in iteration order
pub fn write_collection<'a, T, I, W>(writer: &mut W, items: I) -> Result<(), JsonError>
where
    T: JsonField + 'a,
    I: IntoIterator<Item = &'a T>,
    W: JsonWriter + ?Sized,
{
    writer.begin_array()?;
    for item in items {
        item.write_field(writer)?;
    }
    writer.end_array()?;
    Ok(())
}

/// Function reading a value of schema `T` from a JSON reader
pub type ReaderFn<T> = fn(&mut dyn JsonReader) -> Result<T, JsonError>;
/// Function writing a value of schema `T` to a JSON writer
pub type WriterFn<T> = fn(&T, &mut dyn JsonWriter) -> Result<(), JsonError>;

fn read_dyn<T: JsonSchema>(reader: &mut dyn JsonReader) -> Result<T, JsonError> {
    T::read_json(reader)
}

fn write_dyn<T: JsonSchema>(value: &T, writer: &mut dyn JsonWriter) -> Result<(), JsonError> {
    value.write_json(writer)
}

/// Descriptor, reader and writer of a schema
///
/// Obtained with [`JsonSchema::support`] or [`registry::support`](crate::registry::support).
/// The reader and writer work on trait objects, so the same instance serves every
/// reader and writer implementation.
pub struct JsonSupport<T: 'static> {
    descriptor: ObjectDescriptor,
    reader: ReaderFn<T>,
    writer: WriterFn<T>,
}

impl<T: JsonSchema> JsonSupport<T> {
    /// Builds the descriptor of `T` and creates its support
    ///
    /// Normally called only once per schema, by [`JsonSchema::support`].
    pub fn build() -> Result<Self, SchemaResolutionError> {
        let mut builder = ObjectDescriptorBuilder::new();
        builder.set_described_type(SchemaId::of::<T>());
        T::describe(&mut builder)?;
        let descriptor = builder
            .build()
            .map_err(|source| SchemaResolutionError::InvalidSchema {
                schema: T::NAME,
                source,
            })?;
        log::debug!(
            "built descriptor of {} with {} own properties",
            T::NAME,
            descriptor.properties().len()
        );

        Ok(JsonSupport {
            descriptor,
            reader: read_dyn::<T>,
            writer: write_dyn::<T>,
        })
    }

    /// Descriptor of the schema
    pub fn descriptor(&self) -> &ObjectDescriptor {
        &self.descriptor
    }

    /// The reader function, reading one JSON object
    pub fn reader_fn(&self) -> ReaderFn<T> {
        self.reader
    }

    /// The writer function, writing one JSON object
    pub fn writer_fn(&self) -> WriterFn<T> {
        self.writer
    }

    /// Reads one JSON object
    pub fn read(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        (self.reader)(reader)
    }

    /// Writes one JSON object
    pub fn write(&self, value: &T, writer: &mut dyn JsonWriter) -> Result<(), JsonError> {
        (self.writer)(value, writer)
    }

    /// Reads a JSON array of objects into the given collection
    pub fn read_collection<C: Extend<T>>(
        &self,
        reader: &mut dyn JsonReader,
        mut collection: C,
    ) -> Result<C, JsonError> {
        reader.begin_array()?;
        while reader.has_next()? {
            collection.extend(std::iter::once(self.read(reader)?));
        }
        reader.end_array()?;
        Ok(collection)
    }

    /// Writes the values as JSON array of objects
    pub fn write_collection<'a, I: IntoIterator<Item = &'a T>>(
        &self,
        writer: &mut dyn JsonWriter,
        values: I,
    ) -> Result<(), JsonError> {
        writer.begin_array()?;
        for value in values {
            self.write(value, writer)?;
        }
        writer.end_array()?;
        Ok(())
    }
}

impl<T: 'static> Debug for JsonSupport<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSupport")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
