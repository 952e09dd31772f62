//! Benchmark: parse a synthetic 10k-row data table, encode it, and decode the artifact
//! back with the schema.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tablegen::dump::decode_data_rows;
use tablegen::{DataTableLayout, DataTableProcessor, RowEncoder, SourceFormat, TypeRegistry};

fn synthetic_table(rows: usize) -> String {
    let mut s = String::from(
        "#\tMonsters\t\t\t\t\t\n\
         #\tId\tName\tLevel\tHp\tSpeed\tSpawn\n\
         #\tint\tstring\tshort\tlong\tfloat\tVector3\n\
         #\tid\tname\tlevel\thit points\tmove speed\tspawn point\n",
    );
    for i in 0..rows {
        s.push_str(&format!(
            "\t{}\t\"monster_{}\"\t{}\t{}\t{}\t{},{},{}\n",
            i,
            i,
            i % 100,
            (i as i64) * 1_000_003,
            i as f32 * 0.5,
            i,
            -(i as i64),
            i * 2
        ));
    }
    s
}

fn bench_encode(c: &mut Criterion) {
    let source = synthetic_table(10_000);
    let format = SourceFormat::default();
    let types = TypeRegistry::default();

    c.bench_function("parse_table_10k", |b| {
        b.iter(|| {
            DataTableProcessor::from_source(black_box(&source), &format, DataTableLayout::default(), &types)
                .expect("processor")
        })
    });

    let processor = DataTableProcessor::from_source(&source, &format, DataTableLayout::default(), &types)
        .expect("processor");
    c.bench_function("encode_table_10k", |b| {
        b.iter(|| black_box(&processor).encode_rows().expect("encode"))
    });

    let schema = processor.schema().expect("schema");
    let bytes = processor.encode_rows().expect("encode");
    c.bench_function("decode_table_10k", |b| {
        b.iter(|| decode_data_rows(&schema, black_box(&bytes)).expect("decode"))
    });
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
