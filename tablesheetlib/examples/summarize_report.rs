//! Print the mismatch summary of a report without writing a workbook.

use tablesheetlib::parse_file;
use std::env;

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| "report.txt".to_string());

    let tables = parse_file(&path).expect("Failed to read report");

    println!("Mismatch summary for {}", path);
    println!("==========================");
    println!();
    println!(
        "Column                         | Count\n\
         -------------------------------|-------------"
    );
    for table in &tables {
        let name = table.name().unwrap_or("(no header)");
        println!("{:<31}| {:12}", name, table.mismatch_count());
    }
    println!("-------------------------------|-------------");
    println!(
        "{:<31}| {:12}",
        format!("Total ({} tables)", tables.len()),
        tables.iter().map(|t| t.mismatch_count()).sum::<usize>()
    );
}
