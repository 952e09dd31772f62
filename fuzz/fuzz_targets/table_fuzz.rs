//! Table fuzz target: feed arbitrary text through the source parser, the data-table
//! processor and the encoder. Nothing may panic; every stage returns Ok or Err.
//! Build with: cargo fuzz run table_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use tablegen::{DataTableLayout, DataTableProcessor, RowEncoder, SourceFormat, TableProcessor, TypeRegistry};

    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = tablegen::parser::parse(s, &['"']);
    let processor = match DataTableProcessor::from_source(
        s,
        &SourceFormat::default(),
        DataTableLayout::default(),
        &TypeRegistry::default(),
    ) {
        Ok(p) => p,
        Err(_) => return,
    };
    if let Ok(schema) = processor.schema() {
        let _ = tablegen::lint::lint(&schema);
        if let Ok(bytes) = processor.encode_rows() {
            let rows = tablegen::dump::decode_data_rows(&schema, &bytes).expect("encoded rows decode");
            assert_eq!(rows.len(), processor.content_rows().map(|r| r.len()).unwrap_or(0));
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run table_fuzz");
}
