//! Writes randomly generated values and reads them back

use jsonbind::{
    reader::JsonStreamReader,
    writer::{JsonStreamWriter, JsonWriter},
    JsonSchema,
};
use proptest::prelude::*;

use crate::test_lib::{BaseTypes, ReadWriteTestModel};

mod test_lib;

// Boundary values are mixed in explicitly, uniform sampling almost never produces them

fn int_value() -> impl Strategy<Value = i32> {
    prop_oneof![Just(i32::MIN), Just(i32::MAX), Just(0), any::<i32>()]
}

fn long_value() -> impl Strategy<Value = i64> {
    prop_oneof![Just(i64::MIN), Just(i64::MAX), Just(0), any::<i64>()]
}

fn short_value() -> impl Strategy<Value = i16> {
    prop_oneof![Just(i16::MIN), Just(i16::MAX), any::<i16>()]
}

fn byte_value() -> impl Strategy<Value = i8> {
    prop_oneof![Just(-128_i8), Just(127_i8), any::<i8>()]
}

fn float_value() -> impl Strategy<Value = f32> {
    prop_oneof![
        Just(f32::MAX),
        Just(f32::MIN),
        Just(f32::MIN_POSITIVE),
        Just(0.0_f32),
        -1.0e30_f32..1.0e30_f32,
    ]
}

fn double_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(f64::MAX),
        Just(f64::MIN),
        Just(f64::MIN_POSITIVE),
        -1.0e300..1.0e300_f64,
    ]
}

fn base_types() -> impl Strategy<Value = BaseTypes> {
    (
        int_value(),
        proptest::option::of(int_value()),
        long_value(),
        proptest::option::of(long_value()),
        byte_value(),
        proptest::option::of(byte_value()),
        any::<bool>(),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(i1, i2, l1, l2, byte1, byte2, b1, b2)| BaseTypes {
            i1,
            i2,
            l1,
            l2,
            byte1,
            byte2,
            b1,
            b2,
            ..Default::default()
        })
}

fn read_write_model() -> impl Strategy<Value = ReadWriteTestModel> {
    (
        (
            int_value(),
            int_value(),
            proptest::option::of(any::<String>()),
            any::<bool>(),
            long_value(),
            short_value(),
            prop_oneof![Just(u16::MAX), any::<u16>()],
            double_value(),
        ),
        (
            byte_value(),
            prop_oneof![Just(0_u8), Just(u8::MAX), any::<u8>()],
            float_value(),
            proptest::option::of(byte_value()),
            proptest::option::of(float_value()),
            proptest::option::of(base_types()),
        ),
    )
        .prop_map(
            |(
                (
                    int_field1,
                    int_field2,
                    string_field,
                    boolean_field,
                    long_field,
                    short_field,
                    unsigned_field,
                    double_field,
                ),
                (
                    byte_field,
                    unsigned_byte_field,
                    float_field,
                    nullable_byte,
                    nullable_float,
                    base_types,
                ),
            )| ReadWriteTestModel {
                int_field1,
                int_field2,
                string_field,
                boolean_field,
                long_field,
                short_field,
                unsigned_field,
                double_field,
                byte_field,
                unsigned_byte_field,
                float_field,
                nullable_byte,
                nullable_float,
                base_types,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn read_write(model in read_write_model()) {
        let mut json_writer = JsonStreamWriter::new(Vec::<u8>::new());
        model.write_json(&mut json_writer)?;
        json_writer.close()?;
        let json = json_writer.into_inner()?;

        let mut json_reader = JsonStreamReader::new(json.as_slice());
        let read = ReadWriteTestModel::read_json(&mut json_reader)?;
        json_reader.consume_trailing_whitespace()?;
        prop_assert_eq!(model, read);
    }

    #[test]
    fn read_write_pretty(model in read_write_model()) {
        let json = jsonbind::to_string_pretty(&model)?;
        let read: ReadWriteTestModel = jsonbind::from_str(&json)?;
        prop_assert_eq!(&model, &read);

        // Output is valid JSON for other parsers as well
        let value: serde_json::Value = serde_json::from_str(&json)?;
        prop_assert_eq!(model.long_field, value["longField"].as_i64().unwrap());
    }
}

#[test]
fn boundary_values() -> Result<(), Box<dyn std::error::Error>> {
    let models = [
        ReadWriteTestModel {
            byte_field: -128,
            unsigned_byte_field: u8::MAX,
            short_field: i16::MIN,
            float_field: f32::MAX,
            long_field: i64::MAX,
            nullable_byte: Some(127),
            nullable_float: Some(f32::MIN_POSITIVE),
            ..Default::default()
        },
        ReadWriteTestModel {
            byte_field: 127,
            unsigned_byte_field: 0,
            short_field: i16::MAX,
            float_field: f32::MIN,
            long_field: i64::MIN,
            nullable_byte: None,
            nullable_float: None,
            base_types: Some(BaseTypes {
                l1: i64::MIN,
                byte1: -128,
                ..Default::default()
            }),
            ..Default::default()
        },
    ];
    for model in models {
        let json = jsonbind::to_string(&model)?;
        let read: ReadWriteTestModel = jsonbind::from_str(&json)?;
        assert_eq!(model, read, "{json}");
    }
    Ok(())
}
