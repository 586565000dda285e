//! Example: Repeater Locators
//!
//! Demonstrates: rows, columns and cells of a repeated list, run against
//! the in-process browser, plus the script text a remote driver would get.
//!
//! Run with: `RUST_LOG=probar_ng=debug cargo run --example repeater_demo`

use probar_ng::script::library::FIND_REPEATER_ELEMENT;
use probar_ng::{AngularClient, By, LocalBrowser, NgConfig, NgResult, ScriptRegistry};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<html><body>
<table>
  <tr ng-repeat="book in library.books"><td>{{book.title}}</td><td>{{book.author}}</td></tr>
  <tr ng-repeat="book in library.books"><td>{{book.title}}</td><td>{{book.author}}</td></tr>
  <tr ng-repeat="book in library.books"><td>{{book.title}}</td><td>{{book.author}}</td></tr>
</table>
</body></html>"#;

#[tokio::main]
async fn main() -> NgResult<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    println!("=== Repeater Locator Example ===\n");

    let config = NgConfig::default();
    let registry = Arc::new(ScriptRegistry::builtin(&config)?);
    let by = By::new(Arc::clone(&registry));
    let client = AngularClient::new(LocalBrowser::new(PAGE), config)?;
    let document = client.executor().document();

    // 1. Every row
    let books = by.repeater("book in library.books");
    let rows = client.find_elements(&books).await?;
    println!("1. {} -> {} rows", books.message(), rows.len());

    // 2. One column across all rows
    let titles = books.column("book.title");
    for handle in client.find_elements(&titles).await? {
        if let Some(node) = document.resolve(&handle) {
            println!("2. {} -> {}", titles.message(), document.rendered_text(node));
        }
    }

    // 3. A single cell, written in both orders
    for cell in [books.row(1).column("book.author"), books.column("book.author").row(1)] {
        let handle = client.find_element(&cell).await?;
        println!("3. {} -> {handle}", cell.message());
    }

    // 4. What a remote driver would receive for the cell lookup
    let script = registry.to_executable_string(FIND_REPEATER_ELEMENT)?;
    println!("\n4. {FIND_REPEATER_ELEMENT}: {} bytes of wrapped script", script.len());

    println!("\n✅ Repeater example completed!");
    Ok(())
}
