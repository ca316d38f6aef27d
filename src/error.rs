//! Error type of schema reading and writing

use thiserror::Error;

use crate::{reader::ReaderError, registry::SchemaResolutionError, writer::WriterError};

/// Error which occurred while reading or writing a schema value
///
/// Errors raised for a property are wrapped in [`JsonError::Property`], once per nesting
/// level, so the message names the full property chain:
/// ```text
/// property 'innerRef' of ReferencedTypes: property 'baseTypes' of InnerRef: property 'l4' of BaseTypes: value ...
/// ```
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JsonError {
    /// Reading or writing the value of a property failed
    #[error("property '{property}' of {schema}: {source}")]
    Property {
        /// Name of the schema declaring the property
        schema: &'static str,
        /// JSON name of the property
        property: &'static str,
        /// The error for the property value
        #[source]
        source: Box<JsonError>,
    },
    /// Error reported by the JSON reader
    #[error(transparent)]
    Reader(#[from] ReaderError),
    /// Error reported by the JSON writer
    #[error(transparent)]
    Writer(#[from] WriterError),
    /// The descriptor of a schema could not be obtained
    #[error(transparent)]
    Resolution(#[from] SchemaResolutionError),
}

impl JsonError {
    /// Wraps an error which occurred for a property
    pub fn property(schema: &'static str, property: &'static str, source: JsonError) -> Self {
        JsonError::Property {
            schema,
            property,
            source: Box::new(source),
        }
    }

    /// Dotted chain of JSON property names leading to the failing value, for example
    /// `innerRef.baseTypes.l4`
    ///
    /// `None` if the error did not occur for a property.
    pub fn property_path(&self) -> Option<String> {
        let mut names = Vec::new();
        let mut error = self;
        while let JsonError::Property {
            property, source, ..
        } = error
        {
            names.push(*property);
            error = source.as_ref();
        }
        if names.is_empty() {
            None
        } else {
            Some(names.join("."))
        }
    }

    /// The innermost error, below all [`Property`](Self::Property) wrappers
    pub fn root_cause(&self) -> &JsonError {
        let mut error = self;
        while let JsonError::Property { source, .. } = error {
            error = source.as_ref();
        }
        error
    }
}
