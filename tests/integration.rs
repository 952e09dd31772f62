//! Integration tests: text table -> processor -> binary artifact -> decoded rows, and
//! batch runs over a directory of sources.

use std::path::Path;
use tablegen::dump::decode_data_rows;
use tablegen::runtime::read_rows;
use tablegen::{
    DataTableJob, DataTableLayout, DataTableProcessor, DataTableTargets, GeneratorConfig, RowEncoder,
    SourceFormat, TableError, TableProcessor, TypeRegistry, Value,
};

/// Join cells with tabs and rows with newlines.
fn table(rows: &[&[&str]]) -> String {
    rows.iter().map(|r| r.join("\t") + "\n").collect()
}

fn processor(source: &str) -> DataTableProcessor {
    DataTableProcessor::from_source(
        source,
        &SourceFormat::default(),
        DataTableLayout::default(),
        &TypeRegistry::default(),
    )
    .expect("processor")
}

fn monsters() -> String {
    table(&[
        &["#", "Monsters", "", "", "", "", "", ""],
        &["#", "Id", "Name", "Level", "Hp", "Speed", "Boss", "Spawn"],
        &["#", "int", "string", "short", "long", "double", "bool", "Vector2"],
        &["#", "monster id", "", "", "", "", "", ""],
        &["", "1", "\"Slime\"", "-3", "9000000000", "0.125", "false", "1,2"],
        &["#", "9", "skipped", "0", "0", "0", "false", "0,0"],
        &["", "-7", "", "32767", "-1", "-2.5", "TRUE", "-0.5,4"],
    ])
}

#[test]
fn test_binary_rows_decode_to_text_values() {
    let source = monsters();
    let p = processor(&source);
    let schema = p.schema().expect("schema");
    let bytes = p.encode_rows().expect("encode");
    let decoded = decode_data_rows(&schema, &bytes).expect("decode");

    let lines: Vec<&str> = source.lines().collect();
    let text: Vec<Vec<Value>> = p
        .content_rows()
        .expect("rows")
        .into_iter()
        .map(|row| schema.parse_text_row(lines[row], &['"']).expect("text row"))
        .collect();

    assert_eq!(decoded, text);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0][0], Value::Int32(1));
    assert_eq!(decoded[0][1], Value::String("Slime".to_string()));
    assert_eq!(decoded[0][3], Value::Int64(9_000_000_000));
    assert_eq!(decoded[1][0], Value::Int32(-7));
    assert_eq!(decoded[1][1], Value::String(String::new()));
    assert_eq!(decoded[1][5], Value::Bool(true));
    assert_eq!(
        decoded[1][6],
        Value::Composite(vec![Value::Float(-0.5), Value::Float(4.0)])
    );
}

#[test]
fn test_varint_widths() {
    let source = table(&[
        &["#", "Sizes"],
        &["#", "Id"],
        &["#", "int"],
        &["#", ""],
        &["", "0"],
        &["", "127"],
        &["", "128"],
        &["", "16384"],
    ]);
    let bytes = processor(&source).encode_rows().expect("encode");
    assert_eq!(bytes, vec![0x00, 0x7F, 0x80, 0x01, 0x80, 0x80, 0x01]);

    let negative = table(&[&["#", "T"], &["#", "Id"], &["#", "int"], &["#", ""], &["", "-1"]]);
    let bytes = processor(&negative).encode_rows().expect("encode");
    assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    let ids = read_rows(&bytes, |r| r.read_7bit_encoded_i32()).expect("decode");
    assert_eq!(ids, vec![-1]);
}

#[test]
fn test_comment_rows_and_columns_are_not_encoded() {
    let source = table(&[
        &["#", "T", ""],
        &["#", "Id", "#Memo"],
        &["#", "int", "whatever"],
        &["#", "", ""],
        &["#", "1", "x"],
        &["", "2", "not a number"],
    ]);
    assert_eq!(processor(&source).encode_rows().expect("encode"), vec![2]);
}

#[test]
fn test_conversion_error_names_the_cell() {
    let source = table(&[
        &["#", "T", ""],
        &["#", "Id", "Count"],
        &["#", "int", "byte"],
        &["#", "", ""],
        &["", "1", "255"],
        &["", "2", "256"],
    ]);
    match processor(&source).encode_rows() {
        Err(TableError::Conversion { row, column, .. }) => assert_eq!((row, column), (5, 2)),
        other => panic!("expected conversion error, got {:?}", other),
    }
}

#[test]
fn test_property_collections_from_suffixes() {
    let source = table(&[
        &["#", "Quests", "", "", "", ""],
        &["#", "Id", "Reward1", "Reward2", "Bonus1", "RewardAlpha"],
        &["#", "int", "int", "int", "string", "int"],
        &["#", "", "", "", "", ""],
    ]);
    let schema = processor(&source).schema().expect("schema");
    let collections = schema.property_collections().expect("collections");
    let summary: Vec<(&str, Vec<i32>)> = collections.iter().map(|c| (c.name.as_str(), c.keys())).collect();
    assert_eq!(summary, vec![("Reward", vec![1, 2]), ("Bonus", vec![1])]);
    assert_eq!(collections[1].keyword, "String");
    assert_eq!(collections[0].items[1].column, 3);
}

fn batch_config(root: &Path) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.data_tables.source_dir = root.join("tables");
    config.data_tables.output_dir = root.join("bytes");
    config.code.code_dir = root.join("rows");
    std::fs::create_dir_all(&config.data_tables.source_dir).expect("mkdir");
    config
}

fn write_source(config: &GeneratorConfig, name: &str, source: &str) {
    std::fs::write(config.data_tables.source_path(name), source).expect("write source");
}

fn job<'a>(config: &'a GeneratorConfig, types: &'a TypeRegistry) -> DataTableJob<'a> {
    DataTableJob {
        config,
        types,
        targets: DataTableTargets::Both,
        timestamp: "2024-01-01 00:00:00.000".to_string(),
    }
}

#[test]
fn test_batch_isolates_failing_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = batch_config(dir.path());
    let ragged = "#\tT\t\n#\tId\tName\n#\tint\tstring\n#\t\t\n\t1\tA\textra\n";
    write_source(&config, "monster", &monsters());
    write_source(&config, "broken", ragged);
    write_source(&config, "quest", &table(&[&["#", "Q"], &["#", "Id"], &["#", "int"], &["#", ""], &["", "5"]]));

    let types = TypeRegistry::default();
    let names: Vec<String> = ["monster", "broken", "quest"].iter().map(|s| s.to_string()).collect();
    let report = job(&config, &types).run(&names).expect("run");

    assert_eq!(report.succeeded, vec!["monster", "quest"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "broken");
    assert!(matches!(report.failed[0].error, TableError::Configuration(_)));
    assert!(!report.is_success());

    let monster = std::fs::read(config.data_tables.data_path("monster")).expect("monster bytes");
    assert_eq!(monster, processor(&monsters()).encode_rows().expect("encode"));
    assert_eq!(std::fs::read(config.data_tables.data_path("quest")).expect("quest bytes"), vec![5]);
    assert!(!config.data_tables.data_path("broken").exists());

    assert!(config.code.code_dir.join("dr_monster.rs").is_file());
    assert!(config.code.code_dir.join("dr_quest.rs").is_file());
    assert!(!config.code.code_dir.join("dr_broken.rs").exists());
}

#[test]
fn test_regeneration_is_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = batch_config(dir.path());
    write_source(&config, "monster", &monsters());
    let types = TypeRegistry::default();
    let names = vec!["monster".to_string()];
    let data = config.data_tables.data_path("monster");
    let code = config.code.code_dir.join("dr_monster.rs");

    job(&config, &types).run(&names).expect("first run");
    let first = (std::fs::read(&data).expect("data"), std::fs::read(&code).expect("code"));
    job(&config, &types).run(&names).expect("second run");
    let second = (std::fs::read(&data).expect("data"), std::fs::read(&code).expect("code"));
    assert_eq!(first, second);
}

#[test]
fn test_failed_regeneration_removes_previous_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = batch_config(dir.path());
    let types = TypeRegistry::default();
    let names = vec!["monster".to_string()];
    write_source(&config, "monster", &monsters());
    job(&config, &types).run(&names).expect("run");
    assert!(config.data_tables.data_path("monster").is_file());

    write_source(&config, "monster", &monsters().replace("9000000000", "lots"));
    let report = job(&config, &types).run(&names).expect("run");
    assert!(matches!(report.failed[0].error, TableError::Conversion { .. }));
    assert!(!config.data_tables.data_path("monster").exists());
    assert!(config.code.code_dir.join("dr_monster.rs").is_file());
}

#[test]
fn test_bad_cell_still_generates_row_type() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = batch_config(dir.path());
    let types = TypeRegistry::default();
    write_source(&config, "monster", &monsters().replace("9000000000", "lots"));

    let report = job(&config, &types).run(&["monster".to_string()]).expect("run");
    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, TableError::Conversion { row: 4, column: 4, .. }));
    assert!(!config.data_tables.data_path("monster").exists());
    assert!(config.code.code_dir.join("dr_monster.rs").is_file());
}

#[test]
fn test_invalid_column_name_removes_both_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = batch_config(dir.path());
    let types = TypeRegistry::default();
    let names = vec!["monster".to_string()];
    let data = config.data_tables.data_path("monster");
    let code = config.code.code_dir.join("dr_monster.rs");

    write_source(&config, "monster", &monsters());
    job(&config, &types).run(&names).expect("run");
    assert!(data.is_file() && code.is_file());

    write_source(&config, "monster", &monsters().replace("Name", "bad-name"));
    let report = job(&config, &types).run(&names).expect("run");
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, TableError::Identifier(_)));
    assert!(!data.exists());
    assert!(!code.exists());
}
