//! # Folio CLI
//!
//! Usage:
//!   folio input.json -o pages.json
//!   echo '{ ... }' | folio
//!   folio --example > report.json
//!
//! Set `RUST_LOG=debug` to watch pages open and close.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    let input = match read_input(&args) {
        Ok(input) => input,
        Err(e) => fail(&format!("Failed to read input: {e}")),
    };

    // Parse output path; without -o the pages go to stdout
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone());

    let laid_out = match folio::layout_json(&input) {
        Ok(doc) => doc,
        Err(e) => fail(&e.to_string()),
    };
    let json = match laid_out.to_json() {
        Ok(json) => json,
        Err(e) => fail(&e.to_string()),
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                fail(&format!("Failed to write {path}: {e}"));
            }
            eprintln!("✓ Laid out {} page(s) to {}", laid_out.page_count(), path);
        }
        None => println!("{json}"),
    }
}

fn read_input(args: &[String]) -> io::Result<String> {
    match args.get(1) {
        Some(path) if !path.starts_with('-') => fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {message}");
    process::exit(1);
}

fn example_report_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Quarterly Operations Report",
    "author": "Folio"
  },
  "page": {
    "size": "Letter",
    "margin": { "top": 72, "right": 72, "bottom": 72, "left": 72 }
  },
  "styles": [
    {
      "name": "Body",
      "parent": "Normal",
      "fontFamily": "Times-Roman",
      "fontSize": 11,
      "textAlign": "Justify",
      "spacingAfter": 6
    },
    {
      "name": "Cell",
      "parent": "Normal",
      "fontSize": 9,
      "padding": { "top": 3, "right": 4, "bottom": 3, "left": 4 },
      "borderWidth": 0.5,
      "borderColor": "#999999"
    },
    {
      "name": "HeaderCell",
      "parent": "Cell",
      "fontWeight": 700,
      "color": "#ffffff",
      "backgroundColor": "#2b3a55"
    },
    {
      "name": "NumberCell",
      "parent": "Cell",
      "textAlign": "Right"
    },
    {
      "name": "Table",
      "parent": "Cell",
      "spacingBefore": 6,
      "spacingAfter": 12
    }
  ],
  "blocks": [
    { "type": "Title", "text": "Quarterly Operations Report", "style": "Title" },
    { "type": "Heading", "text": "1. Summary", "style": "Heading1", "level": 1 },
    {
      "type": "Paragraph",
      "style": "Body",
      "text": "Throughput rose across every site this quarter. The table below lists each site with its order volume, on-time rate, and open incidents at quarter close."
    },
    {
      "type": "Table",
      "style": "Table",
      "columns": [180, 96, 96, 96],
      "headerRow": 0,
      "regions": [
        { "region": { "kind": "AllCells" }, "style": "Cell" },
        { "region": { "kind": "Column", "index": 1 }, "style": "NumberCell" },
        { "region": { "kind": "Column", "index": 2 }, "style": "NumberCell" },
        { "region": { "kind": "Column", "index": 3 }, "style": "NumberCell" },
        { "region": { "kind": "HeaderRow" }, "style": "HeaderCell" }
      ],
      "rows": [
        ["Site", "Orders", "On time", "Incidents"],
        ["North Depot", "12,480", "97.2%", "3"],
        ["South Depot", "9,915", "95.8%", "5"],
        ["East Hub", "14,202", "98.1%", "1"],
        ["West Hub", "8,377", "93.4%", "7"],
        ["Central Warehouse", "21,640", "96.6%", "4"]
      ]
    },
    { "type": "Spacer", "height": 18 },
    { "type": "Heading", "text": "2. Incidents", "style": "Heading2", "level": 2 },
    {
      "type": "Paragraph",
      "style": "Body",
      "text": "Most incidents were short conveyor stoppages. West Hub accounts for the largest share and is scheduled for a maintenance window next quarter."
    },
    { "type": "PageBreak" },
    { "type": "Heading", "text": "Appendix", "style": "Heading1" },
    { "type": "Paragraph", "style": "Code", "text": "orders = sum(site.orders for site in sites)" }
  ]
}
"##
}
