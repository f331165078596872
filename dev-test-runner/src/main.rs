//! Converts every schema under `fixtures/` and prints a summary.
//!
//! Schemas under `fixtures/invalid/` are expected to fail.
use anyhow::{Context, Result};
use json_typegraph::{convert_schema, emit, ConvertOptions};

fn main() -> Result<()> {
    let root = concat!(env!("CARGO_MANIFEST_DIR"), "/../fixtures");
    let options = ConvertOptions::default();
    let mut unexpected = 0usize;

    for entry in glob::glob(&format!("{root}/**/*.json"))? {
        let path = entry?;
        let expect_failure = path.components().any(|c| c.as_os_str() == "invalid");
        let src = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let document: serde_json::Value = serde_json::from_str(&src)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        match (convert_schema(&document, &options), expect_failure) {
            (Ok(conv), false) => {
                let described = emit::describe(&conv.graph, conv.root);
                let reachable = described["types"].as_object().map_or(0, |m| m.len());
                println!("✅ {} ({reachable} reachable types)", path.display());
            }
            (Err(err), true) => println!("✅ {} (failed as expected: {err})", path.display()),
            (Ok(_), true) => {
                unexpected += 1;
                println!("❌ {}: expected failure, converted", path.display());
            }
            (Err(err), false) => {
                unexpected += 1;
                println!("❌ {}: {err}", path.display());
            }
        }
    }

    if unexpected > 0 {
        anyhow::bail!("{unexpected} unexpected result(s)");
    }
    Ok(())
}
