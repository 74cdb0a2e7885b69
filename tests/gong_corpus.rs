//! Optional corpus test: point `GONG_PARSER_CORPUS` at a directory of
//! `.gong` files and every one of them must parse cleanly.

use gong_parser::{parse_source, Mode};
use walkdir::WalkDir;

#[test]
fn parses_corpus_if_configured() {
    let Some(root) = std::env::var_os("GONG_PARSER_CORPUS") else {
        eprintln!("GONG_PARSER_CORPUS not set; skipping corpus test");
        return;
    };

    let root = root.to_string_lossy().to_string();
    let mut total = 0usize;

    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("gong") {
            continue;
        }

        total += 1;
        let src = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => continue,
        };

        let p = parse_source(&src, Mode::DECLARATION_ERRORS | Mode::PARSE_COMMENTS);
        if !p.errors.is_empty() {
            eprintln!("FAILED: {}", path.display());
            for e in p.errors.iter().take(8) {
                eprintln!("  {e}");
            }
            // stop early so failures are fast to triage
            panic!("corpus parse failed after {total} files");
        }
    }

    eprintln!("parsed {total} gong files successfully");
}
