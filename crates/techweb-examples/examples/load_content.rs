//! Content example: load a tech set from data files, dump a tech, and
//! round-trip the index through a snapshot.
//!
//! Run with: `cargo run -p techweb-examples --example load_content [DIR]`
//!
//! Without an argument the starter content bundled with techweb-data's
//! tests is used.

use std::path::PathBuf;
use techweb_core::TechIndex;
use techweb_data::load_tech_set;

fn main() {
    tracing_subscriber::fmt::init();

    let dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../techweb-data/tests/data/starter")
    });

    let index = match load_tech_set(&dir) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("failed to load {}: {err}", dir.display());
            std::process::exit(1);
        }
    };

    for category in index.category_names() {
        println!("{category}:");
        for tech in index.iter_category(category) {
            let marker = if tech.researchable() { "" } else { " (unresearchable)" };
            println!("  {}{marker}", tech.name());
        }
    }

    if let Some(tech) = index.lookup("GRO_GENETIC_ENG") {
        println!("\n{}", tech.dump());
    }

    let bytes = index.to_snapshot().expect("encode snapshot");
    let restored = TechIndex::from_snapshot(&bytes).expect("decode snapshot");
    println!(
        "Snapshot: {} bytes, {} techs restored.",
        bytes.len(),
        restored.tech_count()
    );
}
