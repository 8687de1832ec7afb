//! End-to-end tests of annotated streams over every backend.

use std::{fs, path::PathBuf};

use annostream::prelude::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "annostream_it_{}_{}.bin",
        name,
        std::process::id()
    ))
}

fn write_scene<S: Stream>(stream: S) -> Result<()> {
    let mut writer = AnnotatedStream::new(stream, true)?;
    writer.set("version", &3_i64)?;
    writer.set("compressed", &false)?;
    writer.push("header")?;
    writer.set("width", &1920_i64)?;
    writer.set("height", &1080_i64)?;
    writer.set("scale", &(1.5 as Float))?;
    writer.set("title", &"untitled".to_string())?;
    writer.pop()?;
    writer.close()
}

fn check_scene<S: Stream>(stream: S) -> Result<()> {
    let mut reader = AnnotatedStream::new(stream, true)?;
    assert!(!reader.is_writer());
    assert_eq!(reader.keys(), vec!["version", "compressed"]);
    assert_eq!(reader.get::<i64>("version")?, Some(3));
    assert_eq!(reader.get::<bool>("compressed")?, Some(false));

    reader.push("header")?;
    assert_eq!(reader.namespace(), "header");
    assert_eq!(reader.keys(), vec!["width", "height", "scale", "title"]);
    assert_eq!(reader.get::<i64>("width")?, Some(1920));
    assert_eq!(reader.get::<i64>("height")?, Some(1080));
    assert_eq!(reader.get::<Float>("scale")?, Some(1.5));
    assert_eq!(reader.get::<String>("title")?.as_deref(), Some("untitled"));
    reader.pop()?;

    reader.close()
}

#[test]
fn memory_round_trip_every_byte_order() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let mut stream = MemoryStream::default();
        stream.set_byte_order(order);
        write_scene(&mut stream).unwrap();

        // A fresh stream defaults to little endian; the reader adopts the recorded order.
        let mut copy = MemoryStream::from_vec(stream.data().to_vec());
        check_scene(&mut copy).unwrap();
        assert_eq!(copy.byte_order(), order);
    }
}

#[test]
fn file_round_trip() {
    let path = temp_path("scene");
    let _ = fs::remove_file(&path);

    write_scene(FileStream::new(&path, false).unwrap()).unwrap();
    check_scene(FileStream::new(&path, true).unwrap()).unwrap();

    fs::remove_file(&path).unwrap();
}

#[test]
fn dummy_dry_run_predicts_size() {
    let mut dummy = DummyStream::new();
    write_scene(&mut dummy).unwrap();

    let mut memory = MemoryStream::default();
    write_scene(&mut memory).unwrap();

    assert_eq!(dummy.size(), memory.size());
}

#[test]
fn header_example() {
    let mut stream = MemoryStream::new(512).unwrap();
    {
        let mut writer = AnnotatedStream::new(&mut stream, true).unwrap();
        writer.set("version", &3_i64).unwrap();
        writer.push("header").unwrap();
        writer.set("width", &1920_i64).unwrap();
        writer.set("height", &1080_i64).unwrap();
        writer.pop().unwrap();
    }

    let mut reader = AnnotatedStream::new(&mut stream, true).unwrap();
    assert_eq!(reader.keys(), vec!["version"]);
    reader.push("header").unwrap();
    assert_eq!(reader.keys(), vec!["width", "height"]);

    let mut height = 0_i64;
    assert!(reader.get_into("height", &mut height).unwrap());
    assert_eq!(height, 1080);
}

#[test]
fn reopened_entries_match_written() {
    let mut stream = MemoryStream::default();
    let mut writer = AnnotatedStream::new(&mut stream, true).unwrap();
    writer.set("a", &1_i64).unwrap();
    writer.push("n").unwrap();
    writer.set("a", &true).unwrap();
    writer.set_value("b", &Value::from("text")).unwrap();
    writer.pop().unwrap();
    writer.set("a", &2_i64).unwrap();
    let written = writer.entries().to_vec();
    writer.close().unwrap();
    drop(writer);

    let reader = AnnotatedStream::new(&mut stream, true).unwrap();
    assert_eq!(reader.entries(), written.as_slice());
    assert_eq!(reader.keys(), vec!["a"]);
}

#[test]
fn dump_every_entry() {
    let mut stream = MemoryStream::default();
    let mut writer = AnnotatedStream::new(&mut stream, true).unwrap();
    writer.set("x", &1_i64).unwrap();
    writer.set("x", &2_i64).unwrap();
    writer.push("s").unwrap();
    writer.set("y", &"why".to_string()).unwrap();
    writer.pop().unwrap();
    writer.close().unwrap();
    drop(writer);

    let mut reader = AnnotatedStream::new(&mut stream, true).unwrap();
    let entries = reader.entries().to_vec();
    let values: Vec<(String, Value)> = entries
        .iter()
        .map(|entry| (entry.name.clone(), reader.read_entry(entry).unwrap()))
        .collect();

    assert_eq!(
        values,
        vec![
            ("x".to_string(), Value::Integer(1)),
            ("x".to_string(), Value::Integer(2)),
            ("s.y".to_string(), Value::String("why".to_string())),
        ]
    );
}

#[test]
fn truncated_region_is_rejected() {
    let mut stream = MemoryStream::default();
    write_scene(&mut stream).unwrap();
    let bytes = stream.into_inner();

    for cut in [0, 3, 23, bytes.len() / 2, bytes.len() - 1] {
        let truncated = MemoryStream::from_vec(bytes[..cut].to_vec());
        let result = AnnotatedStream::with_config(
            truncated,
            AnnotatedConfig::strict().with_mode(OpenMode::Read),
        );
        assert!(result.is_err(), "cut at {cut} was accepted");
    }
}

#[test]
fn corrupt_magic_is_malformed() {
    let mut stream = MemoryStream::default();
    write_scene(&mut stream).unwrap();
    let mut bytes = stream.into_inner();
    bytes[0] = b'X';

    assert!(matches!(
        AnnotatedStream::new(MemoryStream::from_vec(bytes), true),
        Err(Error::Malformed { .. })
    ));
}

#[test]
fn read_only_file_cannot_host_writer() {
    let path = temp_path("read_only_writer");
    fs::write(&path, b"").unwrap();

    let stream = FileStream::new(&path, true).unwrap();
    assert!(matches!(
        AnnotatedStream::writer(stream, true),
        Err(Error::InvalidOperation(_))
    ));

    fs::remove_file(&path).unwrap();
}

#[test]
fn empty_read_only_file_is_read_not_written() {
    let path = temp_path("empty_read_only");
    fs::write(&path, b"").unwrap();

    let stream = FileStream::new(&path, true).unwrap();
    assert!(matches!(
        AnnotatedStream::new(stream, true),
        Err(Error::Malformed { .. })
    ));

    fs::remove_file(&path).unwrap();
}

#[test]
fn lenient_reader_reports_misses() {
    let mut stream = MemoryStream::default();
    write_scene(&mut stream).unwrap();

    let mut reader = AnnotatedStream::new(&mut stream, false).unwrap();
    assert_eq!(reader.get::<i64>("nonexistent").unwrap(), None);
    assert!(!reader.contains("width"));
    reader.push("header").unwrap();
    assert!(reader.contains("width"));
    assert_eq!(reader.entry("width").map(|entry| entry.tag), Some(TypeTag::Integer));
}
