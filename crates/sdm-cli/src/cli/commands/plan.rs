//! `sdm plan <size>` – show the section ranges for a given size.

use anyhow::Result;
use sdm_core::config;
use sdm_core::segmenter::{self, ByteRange};

fn print_plan(ranges: &[ByteRange]) {
    println!("  {:>7}  {:>20}  {:>20}  {:>12}", "Section", "Start", "End", "Bytes");
    for (i, r) in ranges.iter().enumerate() {
        if r.is_empty() {
            println!("  {:>7}  {:>20}  {:>20}  {:>12}", i, "-", "-", 0);
        } else {
            println!("  {:>7}  {:>20}  {:>20}  {:>12}", i, r.start, r.end, r.len());
        }
    }
}

pub fn run_plan(size: u64, sections: Option<usize>, json: bool) -> Result<()> {
    let sections = match sections {
        Some(n) => n,
        None => config::load_or_init()?.sections,
    };
    let ranges = segmenter::plan(size, sections)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ranges)?);
    } else {
        print_plan(&ranges);
    }
    Ok(())
}
