/// Declares a schema struct together with its [`JsonSchema`](crate::JsonSchema) implementation
///
/// Every field is a property of the schema. By default the JSON member name is the field
/// name, without the `r#` prefix of a raw identifier; `as "name"` overrides it. `= expr` overrides the initial value of the field, which
/// otherwise is its [`Default`]. The struct gets a generated `Default` implementation, so
/// `Default` must not be derived.
///
/// `extends base: Base` embeds the schema `Base` as field `base`. The properties of `Base`
/// are then also properties of the declared schema; reading and writing them is delegated
/// to the embedded value.
///
/// The generated dispatchers map the read and write index of a property to the field with
/// a `match`, so no member name is compared after the descriptor lookup. A field type
/// which does not implement [`JsonField`](crate::JsonField) is a compile error.
///
/// # Examples
/// ```
/// # use jsonbind::json_schema;
/// json_schema! {
///     #[derive(PartialEq, Debug)]
///     pub struct UserData {
///         pub user_name: String as "userName",
///         pub password_hash: String as "password-hash",
///         pub kind: i32 as "type" = -1,
///         pub active: bool,
///     }
/// }
///
/// let user: UserData = jsonbind::from_str(r#"{"userName": "alice", "active": true}"#)?;
/// assert_eq!("alice", user.user_name);
/// assert_eq!(-1, user.kind);
///
/// assert_eq!(
///     r#"{"userName":"alice","password-hash":"","type":-1,"active":true}"#,
///     jsonbind::to_string(&user)?
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Extending another schema:
/// ```
/// # use jsonbind::json_schema;
/// json_schema! {
///     #[derive(Debug)]
///     pub struct Entity {
///         pub id: i64,
///     }
/// }
///
/// json_schema! {
///     #[derive(Debug)]
///     pub struct Account extends entity: Entity {
///         pub owner: Option<String>,
///     }
/// }
///
/// let account: Account = jsonbind::from_str(r#"{"owner": null, "id": 3}"#)?;
/// assert_eq!(3, account.entity.id);
/// assert_eq!(r#"{"id":3,"owner":null}"#, jsonbind::to_string(&account)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[macro_export]
macro_rules! json_schema {
    (@default) => {
        ::core::default::Default::default()
    };
    (@default $default:expr) => {
        $default
    };
    (@name $field:ident) => {
        $crate::__private::field_json_name(::core::stringify!($field))
    };
    (@name $field:ident $json:literal) => {
        $json
    };
    (@read_base $self:ident $property:ident $reader:ident) => {
        ::core::result::Result::Ok(false)
    };
    (@read_base $self:ident $property:ident $reader:ident $base:ident) => {
        $crate::JsonSchema::read_property(&mut $self.$base, $property, $reader)
    };
    (@write_base $self:ident $property:ident $writer:ident) => {
        ::core::result::Result::Ok(false)
    };
    (@write_base $self:ident $property:ident $writer:ident $base:ident) => {
        $crate::JsonSchema::write_property(&$self.$base, $property, $writer)
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(extends $base_field:ident : $base_ty:ty)? {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_ty:ty $(as $json:literal)? $(= $default:expr)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                #[allow(missing_docs)]
                $vis $base_field: $base_ty,
            )?
            $(
                $(#[$field_meta])*
                $field_vis $field: $field_ty,
            )*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                $name {
                    $( $base_field: ::core::default::Default::default(), )?
                    $( $field: $crate::json_schema!(@default $($default)?), )*
                }
            }
        }

        const _: () = {
            // Dense field table in declaration order; the discriminant is the property index
            #[allow(non_camel_case_types)]
            #[derive(Clone, Copy)]
            enum FieldIndex {
                $( $field, )*
            }

            const FIELDS: &[FieldIndex] = &[$( FieldIndex::$field, )*];

            impl $crate::JsonSchema for $name {
                const NAME: &'static str = ::core::stringify!($name);

                fn describe(
                    builder: &mut $crate::descriptor::ObjectDescriptorBuilder,
                ) -> ::core::result::Result<(), $crate::registry::SchemaResolutionError> {
                    $(
                        builder.set_super_descriptor(<$base_ty as $crate::JsonSchema>::descriptor()?);
                    )?
                    $(
                        builder.add_property($crate::descriptor::PropertyDescriptor::new(
                            $crate::json_schema!(@name $field $($json)?),
                            ::core::stringify!($field),
                            FieldIndex::$field as u32,
                            $crate::descriptor::SchemaId::of::<Self>(),
                        ));
                    )*
                    ::core::result::Result::Ok(())
                }

                fn support() -> ::core::result::Result<
                    &'static $crate::JsonSupport<Self>,
                    $crate::registry::SchemaResolutionError,
                > {
                    static SUPPORT: $crate::__private::OnceCell<$crate::JsonSupport<$name>> =
                        $crate::__private::OnceCell::new();
                    SUPPORT.get_or_try_init($crate::JsonSupport::build)
                }

                fn read_property<R: $crate::reader::JsonReader + ?Sized>(
                    &mut self,
                    property: &$crate::descriptor::PropertyDescriptor,
                    reader: &mut R,
                ) -> ::core::result::Result<bool, $crate::JsonError> {
                    if !property.reader_type().is::<Self>() {
                        return $crate::json_schema!(@read_base self property reader $($base_field)?);
                    }
                    match FIELDS.get(property.read_index() as usize) {
                        $(
                            ::core::option::Option::Some(FieldIndex::$field) => {
                                self.$field = <$field_ty as $crate::JsonField>::read_field(reader)
                                    .map_err(|e| {
                                        $crate::JsonError::property(Self::NAME, property.json_name(), e)
                                    })?;
                                ::core::result::Result::Ok(true)
                            }
                        )*
                        _ => ::core::result::Result::Ok(false),
                    }
                }

                fn write_property<W: $crate::writer::JsonWriter + ?Sized>(
                    &self,
                    property: &$crate::descriptor::PropertyDescriptor,
                    writer: &mut W,
                ) -> ::core::result::Result<bool, $crate::JsonError> {
                    if !property.writer_type().is::<Self>() {
                        return $crate::json_schema!(@write_base self property writer $($base_field)?);
                    }
                    match FIELDS.get(property.write_index() as usize) {
                        $(
                            ::core::option::Option::Some(FieldIndex::$field) => {
                                writer.name(property.json_name())?;
                                $crate::JsonField::write_field(&self.$field, writer).map_err(|e| {
                                    $crate::JsonError::property(Self::NAME, property.json_name(), e)
                                })?;
                                ::core::result::Result::Ok(true)
                            }
                        )*
                        _ => ::core::result::Result::Ok(false),
                    }
                }
            }

            impl $crate::JsonField for $name {
                fn read_field<R: $crate::reader::JsonReader + ?Sized>(
                    reader: &mut R,
                ) -> ::core::result::Result<Self, $crate::JsonError> {
                    <Self as $crate::JsonSchema>::read_json(reader)
                }

                fn write_field<W: $crate::writer::JsonWriter + ?Sized>(
                    &self,
                    writer: &mut W,
                ) -> ::core::result::Result<(), $crate::JsonError> {
                    $crate::JsonSchema::write_json(self, writer)
                }
            }
        };
    };
}

#[cfg(test)]
mod tests {
    use std::collections::LinkedList;

    use crate::{
        descriptor::SchemaDefinitionError, error::JsonError, reader::ReaderError,
        registry::SchemaResolutionError, JsonSchema,
    };

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    json_schema! {
        #[derive(PartialEq, Clone, Debug)]
        struct Sample {
            int_field: i32 as "_intField1" = -1,
            text: String = "a".to_owned(),
            nullable: Option<i64>,
            list: LinkedList<u8>,
        }
    }

    json_schema! {
        #[derive(Debug)]
        struct Empty {}
    }

    json_schema! {
        #[derive(Debug)]
        struct Derived extends sample: Sample {
            extra: bool,
        }
    }

    json_schema! {
        #[derive(Debug)]
        struct Shadowing extends sample: Sample {
            text: String,
        }
    }

    json_schema! {
        #[derive(Debug)]
        struct Keywords {
            r#type: i32,
            r#match: bool as "matches",
        }
    }

    json_schema! {
        #[derive(Debug)]
        struct Duplicate {
            a: i32 as "x",
            b: i32 as "x",
        }
    }

    #[test]
    fn defaults() {
        let sample = Sample::default();
        assert_eq!(-1, sample.int_field);
        assert_eq!("a", sample.text);
        assert_eq!(None, sample.nullable);
        assert!(sample.list.is_empty());
    }

    #[test]
    fn descriptor_contents() -> TestResult {
        let descriptor = Sample::descriptor()?;
        assert_eq!("Sample", descriptor.described_type().name());
        let names: Vec<_> = descriptor.properties().iter().map(|p| p.json_name()).collect();
        assert_eq!(vec!["_intField1", "text", "nullable", "list"], names);

        let property = descriptor.find_property("_intField1").unwrap();
        assert_eq!("int_field", property.internal_name());
        assert_eq!(0, property.read_index());
        assert_eq!(3, descriptor.find_property("list").unwrap().write_index());
        assert!(descriptor.find_property("int_field").is_none());

        assert!(Empty::descriptor()?.properties().is_empty());
        Ok(())
    }

    #[test]
    fn read_and_write() -> TestResult {
        let sample: Sample = crate::from_str(
            r#"{"list": [3, 1], "unknown": {"a": [1, {}]}, "_intField1": 5, "nullable": null}"#,
        )?;
        assert_eq!(5, sample.int_field);
        assert_eq!("a", sample.text);
        assert_eq!(vec![3, 1], sample.list.iter().copied().collect::<Vec<_>>());

        assert_eq!(
            r#"{"_intField1":5,"text":"a","nullable":null,"list":[3,1]}"#,
            crate::to_string(&sample)?
        );

        let empty: Empty = crate::from_str(r#"{"a": 1}"#)?;
        assert_eq!("{}", crate::to_string(&empty)?);
        Ok(())
    }

    #[test]
    fn inherited_properties() -> TestResult {
        let descriptor = Derived::descriptor()?;
        assert_eq!(1, descriptor.properties().len());
        assert_eq!(
            "Sample",
            descriptor.find_property("text").unwrap().reader_type().name()
        );

        let derived: Derived = crate::from_str(r#"{"extra": true, "text": "b"}"#)?;
        assert_eq!(true, derived.extra);
        assert_eq!("b", derived.sample.text);
        assert_eq!(-1, derived.sample.int_field);
        assert_eq!(
            r#"{"_intField1":-1,"text":"b","nullable":null,"list":[],"extra":true}"#,
            crate::to_string(&derived)?
        );
        Ok(())
    }

    #[test]
    fn raw_identifier_fields() -> TestResult {
        let descriptor = Keywords::descriptor()?;
        let property = descriptor.find_property("type").unwrap();
        assert_eq!("r#type", property.internal_name());
        assert!(descriptor.find_property("r#type").is_none());

        let keywords: Keywords = crate::from_str(r#"{"type": 3, "matches": true}"#)?;
        assert_eq!(3, keywords.r#type);
        assert!(keywords.r#match);
        assert_eq!(r#"{"type":3,"matches":true}"#, crate::to_string(&keywords)?);
        Ok(())
    }

    #[test]
    fn invalid_schemas() {
        match Shadowing::support() {
            Err(SchemaResolutionError::InvalidSchema { schema, source }) => {
                assert_eq!("Shadowing", schema);
                assert!(matches!(
                    source,
                    SchemaDefinitionError::ShadowedPropertyName { .. }
                ));
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        match Duplicate::support() {
            Err(SchemaResolutionError::InvalidSchema { source, .. }) => assert_eq!(
                SchemaDefinitionError::DuplicatePropertyName {
                    schema: "Duplicate",
                    name: "x"
                },
                source
            ),
            other => panic!("Unexpected result: {other:?}"),
        }

        // Reading reports the failed build instead of any data error
        assert!(matches!(
            crate::from_str::<Duplicate>("{}"),
            Err(JsonError::Resolution(SchemaResolutionError::InvalidSchema { .. }))
        ));
    }

    #[test]
    fn property_error_context() {
        match crate::from_str::<Sample>(r#"{"list": [1, 256]}"#) {
            Err(error) => {
                assert_eq!(Some("list".to_owned()), error.property_path());
                assert!(matches!(
                    error.root_cause(),
                    JsonError::Reader(ReaderError::RangeError { .. })
                ));
                assert!(error.to_string().starts_with("property 'list' of Sample: "));
            }
            Ok(sample) => panic!("Unexpected result: {sample:?}"),
        }
    }
}
