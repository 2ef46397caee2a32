//! Enroll a few random subjects, query them back and print the database.
//!
//! Run with: cargo run --example enroll_and_query [path]

use featdb::{Database, Feature};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo_features.db".to_string());
    let dim = 128;

    let mut db = Database::open(&path, dim)?;
    println!("Opened {} ({})\n", path, db.count());

    let subjects: Vec<Feature> = ["alice", "bob", "carol"]
        .iter()
        .map(|name| {
            let mut f = Feature::random_unit(0, dim as usize);
            f.name = name.to_string();
            f
        })
        .collect();

    for subject in &subjects {
        let id = db.enroll(&subject.data, &subject.name)?;
        println!("Enrolled {:<6} as {}", subject.name, id);
    }

    println!("\n=== Self-Match Test ===\n");
    for subject in &subjects {
        let hits = db.query(&subject.data, 0.5, 1)?;
        match hits.first() {
            Some(hit) => println!(
                "{:<6} -> id {} ({}) similarity {:.4}",
                subject.name, hit.id, hit.name, hit.similarity
            ),
            None => println!("{:<6} -> no match", subject.name),
        }
    }

    let removed = db.delete_last()?;
    println!("\nDeleted identity {}\n", removed);
    print!("{}", db);

    Ok(())
}
