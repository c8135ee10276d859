//! Store a few documents, update a counter, then query them.
//!
//! ```bash
//! KVDOC_LOG=kvdoc=debug cargo run -p kvdoc --example documents -- --path /tmp/kvdoc-demo
//! ```

use std::path::PathBuf;

use clap::Parser;
use kvdoc::{Database, DatabaseConfig, Error, QueryOptions, RangeOptions};
use kvdoc_serde_store::{parse_json, value_to_json};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "kvdoc walkthrough")]
struct Args {
    /// Database directory; a temporary one when omitted
    #[arg(long, short)]
    path: Option<PathBuf>,

    /// Page size for the cursor scan
    #[arg(long, default_value_t = 2)]
    page: usize,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("KVDOC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let scratch = tempfile::tempdir().map_err(|e| Error::Other {
        message: e.to_string(),
    })?;
    let path = args
        .path
        .unwrap_or_else(|| scratch.path().to_path_buf());

    let db = Database::open(DatabaseConfig::from_env(&path))?;
    println!("opened {}", path.display());

    let posts = [
        ("posts:1", r#"{"title": "Layered stores", "tags": ["rust", "db"], "draft": false}"#),
        ("posts:2", r#"{"title": "Notes", "tags": ["misc"], "draft": true}"#),
        ("posts:3", r#"{"title": "Matching", "tags": ["rust"], "draft": false}"#),
    ];
    for (key, json) in posts {
        db.set(key, parse_json(json)?)?;
    }
    db.set("visits", 0i64)?;
    db.increase_value("visits", 3i64)?;

    let fresh = db.if_no_exists("posts:4", |txn| {
        txn.set("posts:4", parse_json(r#"{"title": "Ranges", "tags": ["db"], "draft": false}"#)?)
    })?;
    println!("posts:4 created: {fresh}");

    println!("visits = {:?}", db.get("visits")?);

    let range = RangeOptions::all()
        .start(kvdoc::key!("posts:"))
        .end(kvdoc::key!("posts;"))
        .reverse(true);
    for key in db.get_keys(&range)? {
        println!("range: {key}");
    }

    let published = parse_json(r#"{"tags": [["rust", "db"]], "draft": false}"#)?;
    for entry in db.find_many(&QueryOptions::new(published.clone()))? {
        println!("{} => {}", entry.key, value_to_json(entry.value));
    }

    let mut after = None;
    loop {
        let page = db.find_page(&published, after.as_ref(), args.page)?;
        println!("page: {:?}", page.entries.iter().map(|e| e.key.as_str()).collect::<Vec<_>>());
        match page.next {
            Some(next) => after = Some(next),
            None => break,
        }
    }

    db.close()
}
