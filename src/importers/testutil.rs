use std::io::Write;
use std::path::Path;

use goldenfile::Mint;

use crate::directive::format_journal;
use crate::importers::importer::StatementImporter;

pub fn golden_test(importer: &mut dyn StatementImporter, input: &Path, golden_path: &str) {
    let mut mint = Mint::new("testdata/importers");
    let differ = Box::new(goldenfile::differs::text_diff);
    let mut out = mint
        .new_goldenfile_with_differ(golden_path, differ)
        .expect("new goldenfile");

    assert!(importer.identify(input), "importer should claim {:?}", input);
    let directives = importer.extract(input).expect("perform import");

    let mut s = format_journal(&directives);
    // Ensure that the file only ends in a single newline to make git
    // checks happy.
    while s.ends_with("\n\n") {
        s.pop();
    }

    out.write_all(s.as_bytes()).expect("write output");
}
