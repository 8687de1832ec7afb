//! Property tests for the scalar encoding and the annotated format.

use annostream::prelude::*;
use proptest::prelude::*;

fn byte_order() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::LittleEndian), Just(ByteOrder::BigEndian)]
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e6_f32..1.0e6_f32).prop_map(|float| Value::Float(Float::from(float))),
        ".{0,32}".prop_map(Value::String),
    ]
}

fn encode(order: ByteOrder, value: &Value) -> Vec<u8> {
    let mut stream = MemoryStream::default();
    stream.set_byte_order(order);
    stream.write_value(value).unwrap();
    stream.into_inner()
}

proptest! {
    #[test]
    fn scalar_round_trip(order in byte_order(), value in value()) {
        let mut stream = MemoryStream::new(1).unwrap();
        stream.set_byte_order(order);
        stream.write_value(&value).unwrap();
        stream.seek(0).unwrap();

        prop_assert_eq!(stream.read_value(value.tag()).unwrap(), value);
        prop_assert_eq!(stream.pos(), stream.size());
    }

    #[test]
    fn big_endian_integer_is_reversed_little_endian(number in any::<i64>()) {
        let mut little = encode(ByteOrder::LittleEndian, &Value::Integer(number));
        little.reverse();
        prop_assert_eq!(encode(ByteOrder::BigEndian, &Value::Integer(number)), little);
    }

    #[test]
    fn dummy_and_memory_sizes_agree(values in proptest::collection::vec(value(), 0..16)) {
        let mut dummy = DummyStream::new();
        let mut memory = MemoryStream::new(4).unwrap();
        for value in &values {
            dummy.write_value(value).unwrap();
            memory.write_value(value).unwrap();
        }
        prop_assert_eq!(dummy.size(), memory.size());
        prop_assert_eq!(dummy.pos(), memory.pos());
    }

    #[test]
    fn annotated_last_write_wins(
        order in byte_order(),
        writes in proptest::collection::vec(("[a-c]", value()), 1..24),
    ) {
        let mut stream = MemoryStream::default();
        stream.set_byte_order(order);

        let mut writer = AnnotatedStream::new(&mut stream, true).unwrap();
        for (name, value) in &writes {
            writer.set_value(name, value).unwrap();
        }
        writer.close().unwrap();
        drop(writer);

        let mut reader = AnnotatedStream::new(&mut stream, true).unwrap();
        prop_assert_eq!(reader.len(), writes.len());
        for name in reader.keys() {
            let latest = writes.iter().rev().find(|(written, _)| *written == name).map(|(_, value)| value.clone());
            prop_assert_eq!(reader.get_value(&name).unwrap(), latest);
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let config = AnnotatedConfig::lenient().with_mode(OpenMode::Read);
        if let Ok(mut reader) = AnnotatedStream::with_config(MemoryStream::from_vec(bytes), config) {
            let entries = reader.entries().to_vec();
            for entry in &entries {
                let _ = reader.read_entry(entry);
            }
        }
    }
}
